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

//! Analytic planner error types

use std::error;
use std::fmt::{Display, Formatter};
use std::result;

/// Result type for operations that could result in a [PlannerError]
pub type Result<T, E = PlannerError> = result::Result<T, E>;

/// Planner error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannerError {
    /// Error raised when one of the planner's internal invariants is not
    /// verified during plan generation. This error should not happen in
    /// normal usage and indicates a bug in the planner or in one of its
    /// upstream collaborators, not a problem with the query.
    Internal(String),
    /// This error happens whenever a plan is not valid. Examples include
    /// an invalid window frame or non-boolean connective operands.
    Plan(String),
    /// This error is thrown when the descriptor catalog cannot allocate
    /// another tuple or slot for the current compilation.
    ResourcesExhausted(String),
}

impl Display for PlannerError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            PlannerError::Internal(desc) => {
                write!(f, "Internal error: {desc}. This was likely caused by a bug in the analytic planner's code and we would welcome that you file an bug report in our issue tracker")
            }
            PlannerError::Plan(desc) => {
                write!(f, "Error during planning: {desc}")
            }
            PlannerError::ResourcesExhausted(desc) => {
                write!(f, "Resources exhausted: {desc}")
            }
        }
    }
}

impl error::Error for PlannerError {}

/// Unwraps the message of an error, discarding the variant prefix.
impl PlannerError {
    pub fn message(&self) -> &str {
        match self {
            PlannerError::Internal(desc)
            | PlannerError::Plan(desc)
            | PlannerError::ResourcesExhausted(desc) => desc,
        }
    }
}

#[macro_export]
macro_rules! internal_err {
    ($($arg:tt)*) => {
        Err($crate::error::PlannerError::Internal(format!($($arg)*)))
    };
}

#[macro_export]
macro_rules! plan_err {
    ($($arg:tt)*) => {
        Err($crate::error::PlannerError::Plan(format!($($arg)*)))
    };
}

#[macro_export]
macro_rules! resources_err {
    ($($arg:tt)*) => {
        Err($crate::error::PlannerError::ResourcesExhausted(format!($($arg)*)))
    };
}
