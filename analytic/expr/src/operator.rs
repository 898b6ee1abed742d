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

//! Binary operators appearing in planner-built predicates

use std::fmt;

/// Operators applied to expressions. The planner only ever constructs
/// comparisons and the logical connectives that combine them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equals operator, like `=`
    Eq,
    /// Less than operator, like `<`
    Lt,
    /// Logical AND, like `&&`
    And,
    /// Logical OR, like `||`
    Or,
}

impl Operator {
    /// Return true if the operator is a comparison producing a boolean
    pub fn is_comparison_operator(&self) -> bool {
        matches!(self, Operator::Eq | Operator::Lt)
    }

    /// Return true if the operator is a logical connective over booleans
    pub fn is_logic_operator(&self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }

    /// Get the operator precedence used when displaying expressions without
    /// redundant parentheses
    pub fn precedence(&self) -> u8 {
        match self {
            Operator::Or => 5,
            Operator::And => 10,
            Operator::Eq => 20,
            Operator::Lt => 20,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let display = match self {
            Operator::Eq => "=",
            Operator::Lt => "<",
            Operator::And => "AND",
            Operator::Or => "OR",
        };
        write!(f, "{display}")
    }
}
