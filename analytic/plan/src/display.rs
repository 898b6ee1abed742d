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

//! Plan tree rendering, one indented line per node

use std::fmt::{self, Display, Formatter};

use arrow_schema::SortOptions;

use crate::node::{PlanNode, PlanNodeKind};

/// Return a wrapper around `plan` that renders the subtree as an indented
/// tree, top node first.
pub fn displayable(plan: &PlanNode) -> DisplayablePlan<'_> {
    DisplayablePlan { plan }
}

pub struct DisplayablePlan<'a> {
    plan: &'a PlanNode,
}

impl Display for DisplayablePlan<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        fmt_node(f, self.plan, 0)
    }
}

fn fmt_node(f: &mut Formatter, node: &PlanNode, indent: usize) -> fmt::Result {
    write!(f, "{:indent$}", "", indent = indent * 2)?;
    match &node.kind {
        PlanNodeKind::Scan { label } => writeln!(f, "Scan: {label}")?,
        PlanNodeKind::Sort(sort) => {
            write!(f, "Sort: key=[")?;
            for (i, (expr, options)) in sort
                .sort_info
                .ordering_exprs
                .iter()
                .zip(sort.sort_info.sort_options.iter())
                .enumerate()
            {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{expr} {}", fmt_sort_options(options))?;
            }
            write!(f, "]")?;
            if sort.is_analytic_sort {
                write!(f, ", analytic")?;
            }
            if let Some(partition) = &sort.input_partition {
                write!(f, ", partition={partition}")?;
            }
            writeln!(f)?;
        }
        PlanNodeKind::AnalyticEval(eval) => {
            write!(f, "AnalyticEval: fns=[")?;
            for (i, fn_call) in eval.fn_calls.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{fn_call}")?;
            }
            write!(f, "], partition_by=[")?;
            for (i, expr) in eval.partition_by.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{expr}")?;
            }
            write!(f, "], order_by=[")?;
            for (i, element) in eval.order_by.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{element}")?;
            }
            write!(f, "]")?;
            if let Some(window) = &eval.window {
                write!(f, ", window=[{window}]")?;
            }
            writeln!(f)?;
        }
    }
    for child in &node.children {
        fmt_node(f, child, indent + 1)?;
    }
    Ok(())
}

fn fmt_sort_options(options: &SortOptions) -> String {
    format!(
        "{} {}",
        if options.descending { "DESC" } else { "ASC" },
        if options.nulls_first {
            "NULLS FIRST"
        } else {
            "NULLS LAST"
        }
    )
}
