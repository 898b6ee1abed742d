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

//! Analytic evaluation node

use analytic_common::TupleId;
use analytic_expr::{AnalyticFnCall, Expr, ExprSubstitutionMap, SortExpr, WindowFrame};

/// Evaluates one window group: a set of analytic function calls sharing one
/// partitioning, ordering and window frame, against the sorted stream
/// produced by the node below it.
///
/// At execution time the node buffers the previous row in `buffered_tuple`
/// and applies the boundary predicates to recognize partition and
/// order-key changes between the current and the buffered row.
#[derive(Debug)]
pub struct AnalyticEvalNode {
    /// The function calls of the window group
    pub fn_calls: Vec<AnalyticFnCall>,
    /// PARTITION BY expressions shared by the function calls
    pub partition_by: Vec<Expr>,
    /// ORDER BY elements shared by the sort group
    pub order_by: Vec<SortExpr>,
    /// The shared window frame, if any
    pub window: Option<WindowFrame>,
    /// Physical tuple holding accumulator state; equals `output_tuple` when
    /// no function needs a distinct intermediate representation
    pub intermediate_tuple: TupleId,
    /// Physical tuple holding the per-row function results
    pub output_tuple: TupleId,
    /// Maps each logical output slot to its physical counterpart in
    /// `output_tuple`
    pub logical_to_physical_smap: ExprSubstitutionMap,
    /// True when the current row belongs to an earlier partition than the
    /// buffered row; absent for unpartitioned groups
    pub partition_by_lt: Option<Expr>,
    /// True when the current row's order keys precede the buffered row's;
    /// absent for unordered groups
    pub order_by_lt: Option<Expr>,
    /// Structural copy of the sort tuple holding the buffered previous row;
    /// absent when the group needs no sort
    pub buffered_tuple: Option<TupleId>,
}
