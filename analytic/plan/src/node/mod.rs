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

//! Physical plan nodes
//!
//! The planner emits a closed set of operators, represented as one struct
//! carrying the fields every node shares and a tagged variant for the
//! node-specific payload. Consumers dispatch by matching on the tag.

mod analytic_eval;
mod sort;

pub use analytic_eval::AnalyticEvalNode;
pub use sort::{SortInfo, SortNode};

use std::fmt::{self, Display, Formatter};

use analytic_common::{PlanNodeId, TupleId};
use analytic_expr::Expr;

/// One node of a physical plan tree.
#[derive(Debug)]
pub struct PlanNode {
    /// Node identifier, unique within one compilation
    pub id: PlanNodeId,
    /// Ids of the tuples whose slots are visible in this node's output rows
    pub tuple_ids: Vec<TupleId>,
    /// Input nodes; every node emitted by the analytic planner has exactly
    /// one child
    pub children: Vec<PlanNode>,
    /// Node-specific payload
    pub kind: PlanNodeKind,
}

/// The closed set of node kinds appearing in analytic plan subtrees.
#[derive(Debug)]
pub enum PlanNodeKind {
    /// Leaf standing in for the already-planned input subtree the analytic
    /// nodes are stacked onto.
    Scan { label: String },
    /// Total sort of its input, tagged with the partitioning its input must
    /// satisfy.
    Sort(SortNode),
    /// Evaluates one window group over the sorted stream produced below it.
    AnalyticEval(AnalyticEvalNode),
}

impl PlanNode {
    /// Creates a leaf node producing rows of the given tuples.
    pub fn scan(id: PlanNodeId, tuple_ids: Vec<TupleId>, label: impl Into<String>) -> Self {
        Self {
            id,
            tuple_ids,
            children: vec![],
            kind: PlanNodeKind::Scan {
                label: label.into(),
            },
        }
    }

    /// Creates a sort node on top of `input`. The node's output rows consist
    /// of the sort tuple alone.
    pub fn sort(id: PlanNodeId, input: PlanNode, sort: SortNode) -> Self {
        Self {
            id,
            tuple_ids: vec![sort.sort_info.sort_tuple],
            children: vec![input],
            kind: PlanNodeKind::Sort(sort),
        }
    }

    /// Creates an analytic eval node on top of `input`. Output rows are the
    /// input rows extended with the physical output tuple.
    pub fn analytic_eval(id: PlanNodeId, input: PlanNode, eval: AnalyticEvalNode) -> Self {
        let mut tuple_ids = input.tuple_ids.clone();
        tuple_ids.push(eval.output_tuple);
        Self {
            id,
            tuple_ids,
            children: vec![input],
            kind: PlanNodeKind::AnalyticEval(eval),
        }
    }

    /// The operator name shown in plan renderings.
    pub fn name(&self) -> &str {
        match &self.kind {
            PlanNodeKind::Scan { .. } => "Scan",
            PlanNodeKind::Sort(_) => "Sort",
            PlanNodeKind::AnalyticEval(_) => "AnalyticEval",
        }
    }

    pub fn child(&self, i: usize) -> &PlanNode {
        &self.children[i]
    }
}

/// The partitioning a sort node requires of its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataPartition {
    /// All rows flow through a single partition.
    Unpartitioned,
    /// Rows are hash-distributed on the given expressions.
    HashPartitioned(Vec<Expr>),
}

impl Display for DataPartition {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            DataPartition::Unpartitioned => write!(f, "Unpartitioned"),
            DataPartition::HashPartitioned(exprs) => {
                write!(f, "Hash([")?;
                for (i, expr) in exprs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{expr}")?;
                }
                write!(f, "])")
            }
        }
    }
}
