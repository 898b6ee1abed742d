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

//! Runtime configuration for the analytic planner

/// Options that influence how the analytic planner generates plans.
///
/// One instance is handed to each planning invocation; the planner never
/// reads configuration from global state.
#[derive(Debug, Clone)]
pub struct PlannerOptions {
    /// Should the planner require data to be hash-repartitioned on the
    /// partition keys so analytic functions can be evaluated in parallel.
    /// When disabled, the first sort of every partition group requires
    /// unpartitioned input instead.
    pub repartition_analytics: bool,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            repartition_analytics: true,
        }
    }
}
