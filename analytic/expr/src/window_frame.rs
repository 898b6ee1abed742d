// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Window frame module
//!
//! The frame specification determines which rows contribute to one row's
//! analytic function result. It consists of a frame type (ROWS or RANGE) and
//! a starting and ending frame boundary. An analytic expression without a
//! frame spans the whole partition on both axes; that absence is represented
//! as `Option<WindowFrame>::None` by the callers of this module and matches
//! only another absent frame.

use std::fmt::{self, Display, Formatter};

use analytic_common::{plan_err, Result};

/// The frame specification of one analytic expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowFrame {
    /// Frame type - either `ROWS` or `RANGE`
    pub units: WindowFrameUnits,
    /// Starting frame boundary
    pub start_bound: WindowFrameBound,
    /// Ending frame boundary
    pub end_bound: WindowFrameBound,
}

impl WindowFrame {
    /// Creates a frame, rejecting boundary combinations that cannot delimit
    /// a window.
    pub fn try_new(
        units: WindowFrameUnits,
        start_bound: WindowFrameBound,
        end_bound: WindowFrameBound,
    ) -> Result<Self> {
        if let WindowFrameBound::Following(None) = start_bound {
            return plan_err!("Invalid window frame: start bound cannot be UNBOUNDED FOLLOWING");
        }
        if let WindowFrameBound::Preceding(None) = end_bound {
            return plan_err!("Invalid window frame: end bound cannot be UNBOUNDED PRECEDING");
        }
        Ok(Self {
            units,
            start_bound,
            end_bound,
        })
    }

    /// The frame spanning the whole partition, from unbounded preceding to
    /// unbounded following.
    pub fn unbounded(units: WindowFrameUnits) -> Self {
        Self {
            units,
            start_bound: WindowFrameBound::Preceding(None),
            end_bound: WindowFrameBound::Following(None),
        }
    }
}

impl Display for WindowFrame {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{} BETWEEN {} AND {}",
            self.units, self.start_bound, self.end_bound
        )
    }
}

/// One boundary of a window frame. An offset of `None` denotes the unbounded
/// variant of the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WindowFrameBound {
    /// A boundary before the current row: `UNBOUNDED PRECEDING` or
    /// `<offset> PRECEDING`.
    Preceding(Option<u64>),
    /// The current row.
    CurrentRow,
    /// A boundary after the current row: `<offset> FOLLOWING` or
    /// `UNBOUNDED FOLLOWING`.
    Following(Option<u64>),
}

impl WindowFrameBound {
    pub fn is_unbounded(&self) -> bool {
        matches!(
            self,
            WindowFrameBound::Preceding(None) | WindowFrameBound::Following(None)
        )
    }
}

impl Display for WindowFrameBound {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            WindowFrameBound::Preceding(None) => f.write_str("UNBOUNDED PRECEDING"),
            WindowFrameBound::Preceding(Some(n)) => write!(f, "{n} PRECEDING"),
            WindowFrameBound::CurrentRow => f.write_str("CURRENT ROW"),
            WindowFrameBound::Following(Some(n)) => write!(f, "{n} FOLLOWING"),
            WindowFrameBound::Following(None) => f.write_str("UNBOUNDED FOLLOWING"),
        }
    }
}

/// The two frame types: ROWS counts physical rows relative to the current
/// row, RANGE delimits the frame by the value of the ordering expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowFrameUnits {
    Rows,
    Range,
}

impl Display for WindowFrameUnits {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            WindowFrameUnits::Rows => "ROWS",
            WindowFrameUnits::Range => "RANGE",
        })
    }
}
