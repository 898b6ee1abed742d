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

//! Analytic (window) function expressions

use std::fmt::{self, Display, Formatter};

use arrow_schema::DataType;

use crate::expr::Expr;
use crate::sort_expr::SortExpr;
use crate::window_frame::WindowFrame;

/// The function call evaluated by an analytic expression, together with the
/// type information planning needs.
#[derive(Debug, Clone)]
pub struct AnalyticFnCall {
    /// Function name, uppercase by convention (`RANK`, `SUM`, ...)
    pub name: String,
    /// Function arguments, bound to the planner's input tuples
    pub args: Vec<Expr>,
    /// Type of the final per-row result
    pub return_type: DataType,
    /// Type of the accumulator state while the function is being evaluated,
    /// if that state has a representation distinct from the final result
    /// (e.g. the (sum, count) pair behind AVG). `None` means the function
    /// accumulates directly into the result representation.
    pub intermediate_type: Option<DataType>,
}

impl AnalyticFnCall {
    pub fn new(name: impl Into<String>, args: Vec<Expr>, return_type: DataType) -> Self {
        Self {
            name: name.into(),
            args,
            return_type,
            intermediate_type: None,
        }
    }

    /// Declare a distinct accumulator representation for this function.
    pub fn with_intermediate_type(mut self, intermediate_type: DataType) -> Self {
        self.intermediate_type = Some(intermediate_type);
        self
    }
}

/// True if evaluating any of `fn_calls` needs accumulator state whose
/// representation differs from its final result, in which case the planner
/// materializes a separate intermediate tuple.
pub fn requires_intermediate_tuple(fn_calls: &[AnalyticFnCall]) -> bool {
    fn_calls.iter().any(|f| f.intermediate_type.is_some())
}

impl Display for AnalyticFnCall {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

/// One analytic expression of a query block: a function call plus the
/// partitioning, ordering and windowing specification it is evaluated over.
/// Produced by semantic analysis; read-only to the planner.
#[derive(Debug, Clone)]
pub struct AnalyticExpr {
    /// The evaluated function
    pub fn_call: AnalyticFnCall,
    /// PARTITION BY expressions; an unordered set, may be empty
    pub partition_by: Vec<Expr>,
    /// ORDER BY elements; an ordered sequence, may be empty
    pub order_by: Vec<SortExpr>,
    /// The window frame; `None` spans the whole partition and is
    /// distinct from any explicit frame
    pub window: Option<WindowFrame>,
}

impl AnalyticExpr {
    pub fn new(
        fn_call: AnalyticFnCall,
        partition_by: Vec<Expr>,
        order_by: Vec<SortExpr>,
        window: Option<WindowFrame>,
    ) -> Self {
        Self {
            fn_call,
            partition_by,
            order_by,
            window,
        }
    }
}

impl Display for AnalyticExpr {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} OVER (", self.fn_call)?;
        let mut need_space = false;
        if !self.partition_by.is_empty() {
            write!(f, "PARTITION BY ")?;
            for (i, expr) in self.partition_by.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{expr}")?;
            }
            need_space = true;
        }
        if !self.order_by.is_empty() {
            if need_space {
                write!(f, " ")?;
            }
            write!(f, "ORDER BY ")?;
            for (i, element) in self.order_by.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{element}")?;
            }
            need_space = true;
        }
        if let Some(window) = &self.window {
            if need_space {
                write!(f, " ")?;
            }
            write!(f, "{window}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window_frame::WindowFrameUnits;
    use analytic_common::SlotId;

    #[test]
    fn intermediate_tuple_requirement() {
        let rank = AnalyticFnCall::new("RANK", vec![], DataType::Int64);
        let avg = AnalyticFnCall::new(
            "AVG",
            vec![Expr::slot_ref(SlotId::new(2), "x")],
            DataType::Float64,
        )
        .with_intermediate_type(DataType::Utf8);
        assert!(!requires_intermediate_tuple(&[rank.clone()]));
        assert!(requires_intermediate_tuple(&[rank, avg]));
        assert!(!requires_intermediate_tuple(&[]));
    }

    #[test]
    fn analytic_expr_display() {
        let expr = AnalyticExpr::new(
            AnalyticFnCall::new(
                "SUM",
                vec![Expr::slot_ref(SlotId::new(2), "x")],
                DataType::Int64,
            ),
            vec![Expr::slot_ref(SlotId::new(0), "a")],
            vec![SortExpr::new(Expr::slot_ref(SlotId::new(1), "b"), true, true)],
            Some(WindowFrame::unbounded(WindowFrameUnits::Rows)),
        );
        assert_eq!(
            expr.to_string(),
            "SUM(x@2) OVER (PARTITION BY a@0 ORDER BY b@1 ASC NULLS FIRST \
             ROWS BETWEEN UNBOUNDED PRECEDING AND UNBOUNDED FOLLOWING)"
        );
    }
}
