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

//! Sort node and sort specification

use analytic_common::{internal_err, Result, TupleId};
use analytic_expr::Expr;
use arrow_schema::SortOptions;

use super::DataPartition;

/// Describes a total sort of the input stream: the sort keys (bound to the
/// sort tuple), their directions, and the tuple the sort materializes its
/// entire input row into.
#[derive(Debug)]
pub struct SortInfo {
    /// Sort key expressions, bound to `sort_tuple`
    pub ordering_exprs: Vec<Expr>,
    /// Direction and null placement, parallel to `ordering_exprs`
    pub sort_options: Vec<SortOptions>,
    /// The tuple holding the materialized input row
    pub sort_tuple: TupleId,
    /// For every slot of `sort_tuple`, the input-bound expression whose
    /// value the sort materializes into that slot
    pub materialized_exprs: Vec<Expr>,
}

impl SortInfo {
    pub fn try_new(
        ordering_exprs: Vec<Expr>,
        sort_options: Vec<SortOptions>,
        sort_tuple: TupleId,
        materialized_exprs: Vec<Expr>,
    ) -> Result<Self> {
        if ordering_exprs.len() != sort_options.len() {
            return internal_err!(
                "sort info with {} ordering exprs but {} sort options",
                ordering_exprs.len(),
                sort_options.len()
            );
        }
        Ok(Self {
            ordering_exprs,
            sort_options,
            sort_tuple,
            materialized_exprs,
        })
    }
}

/// A total sort feeding one or more analytic eval nodes.
#[derive(Debug)]
pub struct SortNode {
    pub sort_info: SortInfo,
    /// Sorts emitted by the analytic planner are always analytic sorts;
    /// the tag distinguishes them from ORDER BY sorts elsewhere in a plan.
    pub is_analytic_sort: bool,
    /// The partitioning this sort requires of its input. `None` means the
    /// input's existing partitioning is already suitable.
    pub input_partition: Option<DataPartition>,
}
