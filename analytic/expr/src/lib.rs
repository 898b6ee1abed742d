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

//! Expression representation for the analytic planner: slot references,
//! boolean predicates, sort keys, window frames and analytic function calls,
//! together with the structural equality and substitution machinery that
//! planning relies on. Expressions here are value types; two expressions are
//! "the same" when they are structurally equal, never by reference identity.

pub mod analytic_expr;
pub mod expr;
pub mod operator;
pub mod sort_expr;
pub mod substitution;
pub mod window_frame;

pub use analytic_expr::{requires_intermediate_tuple, AnalyticExpr, AnalyticFnCall};
pub use expr::{
    binary_expr, equal_lists, equal_sets, exprs_contains, substitute_list, BinaryExpr, Expr,
    SlotRef,
};
pub use operator::Operator;
pub use sort_expr::{sort_key_exprs, SortExpr};
pub use substitution::ExprSubstitutionMap;
pub use window_frame::{WindowFrame, WindowFrameBound, WindowFrameUnits};
