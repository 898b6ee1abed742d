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

//! Physical plan generation for analytic (window) functions.
//!
//! The [AnalyticPlanner] stacks plan nodes onto an existing plan tree to
//! evaluate the analytic expressions of a query block. It exploits
//! similarities among the expressions with respect to partitioning, ordering
//! and windowing to reduce the number of exchanges and sorts (the result is
//! reduced, not minimal). The generated plan has the following structure:
//!
//! ```text
//! ...
//! (
//!  (
//!    (
//!      analytic eval node  <-- group of analytic exprs with compatible window
//!    )+                    <-- group of analytic exprs with compatible ordering
//!    sort node?
//!  )+                      <-- group of analytic exprs with compatible partitioning
//!  hash exchange?
//! )*                       <-- groups of analytic exprs with different partitioning
//! input plan node
//! ...
//! ```
//!
//! [AnalyticPlanner]: analytic_planner::AnalyticPlanner

pub mod analytic_info;
pub mod analytic_planner;
pub mod analyzer;
pub mod descriptors;
pub mod display;
pub mod node;

pub use analytic_info::AnalyticInfo;
pub use analytic_planner::AnalyticPlanner;
pub use analyzer::Analyzer;
pub use descriptors::{DescriptorTable, SlotDescriptor, TupleDescriptor};
pub use display::displayable;
pub use node::{AnalyticEvalNode, DataPartition, PlanNode, PlanNodeKind, SortInfo, SortNode};
