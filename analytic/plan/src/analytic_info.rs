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

//! Semantic-analysis result consumed by the analytic planner

use analytic_common::{internal_err, Result, TupleId};
use analytic_expr::AnalyticExpr;

use crate::descriptors::DescriptorTable;

/// The analytic expressions of one query block together with their logical
/// intermediate and output tuples. The i-th analytic expression owns the
/// i-th slot of each tuple.
///
/// Produced by semantic analysis before planning starts; the planner only
/// reads it. Dead analytic expressions are flagged by leaving their logical
/// output slot non-materialized.
#[derive(Debug)]
pub struct AnalyticInfo {
    analytic_exprs: Vec<AnalyticExpr>,
    intermediate_tuple: TupleId,
    output_tuple: TupleId,
}

impl AnalyticInfo {
    pub fn try_new(
        analytic_exprs: Vec<AnalyticExpr>,
        intermediate_tuple: TupleId,
        output_tuple: TupleId,
        desc_tbl: &DescriptorTable,
    ) -> Result<Self> {
        if analytic_exprs.is_empty() {
            return internal_err!("analytic info without analytic expressions");
        }
        let intermediate_slots = desc_tbl.tuple(intermediate_tuple)?.slots().len();
        let output_slots = desc_tbl.tuple(output_tuple)?.slots().len();
        if intermediate_slots != analytic_exprs.len() || output_slots != analytic_exprs.len() {
            return internal_err!(
                "analytic info slot mismatch: {} exprs, {intermediate_slots} intermediate slots, \
                 {output_slots} output slots",
                analytic_exprs.len()
            );
        }
        Ok(Self {
            analytic_exprs,
            intermediate_tuple,
            output_tuple,
        })
    }

    pub fn analytic_exprs(&self) -> &[AnalyticExpr] {
        &self.analytic_exprs
    }

    pub fn intermediate_tuple(&self) -> TupleId {
        self.intermediate_tuple
    }

    pub fn output_tuple(&self) -> TupleId {
        self.output_tuple
    }
}
