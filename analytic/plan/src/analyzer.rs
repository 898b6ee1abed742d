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

//! Shared analysis state for one query compilation

use analytic_common::{internal_err, Result, SlotId, TupleId};
use analytic_expr::Expr;
use arrow_schema::DataType;

use crate::descriptors::DescriptorTable;

/// The mutable analysis state shared across one query compilation: the
/// descriptor catalog plus the value-transfer facts accumulated during
/// planning.
///
/// An `Analyzer` is scoped to a single compilation. Hosts compiling
/// multiple queries concurrently must use an independent instance per
/// compilation; nothing here survives one planning call's lifetime.
#[derive(Debug, Default)]
pub struct Analyzer {
    desc_tbl: DescriptorTable,
    value_transfers: Vec<(SlotId, SlotId)>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn desc_tbl(&self) -> &DescriptorTable {
        &self.desc_tbl
    }

    pub fn desc_tbl_mut(&mut self) -> &mut DescriptorTable {
        &mut self.desc_tbl
    }

    /// Copies slot `src` into tuple `dst`, returning the new slot's id.
    pub fn copy_slot_descriptor(&mut self, src: SlotId, dst: TupleId) -> Result<SlotId> {
        self.desc_tbl.copy_slot_descriptor(src, dst)
    }

    /// Re-validates a constructed expression: every referenced slot must
    /// resolve in the descriptor catalog, comparisons must compare values of
    /// one type, and logical connectives must combine booleans. Violations
    /// are internal errors; the planner only ever analyzes expressions it
    /// built itself.
    pub fn analyze(&self, expr: &Expr) -> Result<()> {
        self.expr_type(expr).map(|_| ())
    }

    fn expr_type(&self, expr: &Expr) -> Result<DataType> {
        match expr {
            Expr::SlotRef(slot_ref) => {
                Ok(self.desc_tbl.slot(slot_ref.slot_id)?.data_type().clone())
            }
            Expr::Literal(value) => Ok(value.data_type()),
            Expr::BinaryExpr(binary) => {
                let left = self.expr_type(&binary.left)?;
                let right = self.expr_type(&binary.right)?;
                if binary.op.is_comparison_operator() && left != right {
                    return internal_err!(
                        "comparison between incompatible types {left} and {right} in {expr}"
                    );
                }
                if binary.op.is_logic_operator()
                    && (left != DataType::Boolean || right != DataType::Boolean)
                {
                    return internal_err!(
                        "logical connective over non-boolean operands in {expr}"
                    );
                }
                Ok(DataType::Boolean)
            }
        }
    }

    /// Registers a batch of mutual value transfers: each pair states that
    /// the two slots carry equal values, so later predicate reasoning can
    /// treat them interchangeably. Registration is a single bulk operation
    /// per planning pass, never interleaved per group.
    pub fn bulk_update_value_transfers(&mut self, pairs: Vec<(SlotId, SlotId)>) {
        self.value_transfers.extend(pairs);
    }

    pub fn value_transfers(&self) -> &[(SlotId, SlotId)] {
        &self.value_transfers
    }
}
