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

//! The analytic planner
//!
//! Groups the analytic expressions of a query block by compatible
//! partitioning, ordering and windowing, then stacks one sort node per sort
//! group and one analytic eval node per window group onto the input plan.
//! See the crate documentation for the shape of the generated subtree.

use analytic_common::{
    internal_err, IdGenerator, PlanNodeId, PlannerOptions, Result, SlotId, TupleId,
};
use analytic_expr::{
    equal_sets, requires_intermediate_tuple, sort_key_exprs, substitute_list, AnalyticExpr,
    AnalyticFnCall, Expr, ExprSubstitutionMap, SortExpr, WindowFrame,
};
use arrow_schema::SortOptions;
use itertools::{izip, Itertools};
use log::{debug, trace};

use crate::analytic_info::AnalyticInfo;
use crate::analyzer::Analyzer;
use crate::node::{AnalyticEvalNode, DataPartition, PlanNode, SortInfo, SortNode};

/// Adds plan nodes to an existing plan tree that evaluate the analytic
/// expressions of one [AnalyticInfo].
///
/// A planner instance is built for a single planning invocation: it borrows
/// the compilation's [Analyzer] and plan-node id generator and is discarded
/// together with the transient grouping structures once
/// [Self::create_single_node_plan] returns.
pub struct AnalyticPlanner<'a> {
    /// Tuple ids materialized by the originating statement. When the
    /// statement materializes more than one tuple, the last one must be the
    /// analytic output tuple.
    stmt_tuple_ids: Vec<TupleId>,
    analytic_info: &'a AnalyticInfo,
    analyzer: &'a mut Analyzer,
    id_gen: &'a mut IdGenerator<PlanNodeId>,
    options: PlannerOptions,
    /// Accumulated substitution from the slots the analytic exprs were
    /// analyzed against to the slots visible at the current plan root.
    /// Every sort node composes its own substitution onto this map.
    root_smap: ExprSubstitutionMap,
}

impl<'a> AnalyticPlanner<'a> {
    pub fn try_new(
        stmt_tuple_ids: Vec<TupleId>,
        analytic_info: &'a AnalyticInfo,
        analyzer: &'a mut Analyzer,
        id_gen: &'a mut IdGenerator<PlanNodeId>,
        options: PlannerOptions,
    ) -> Result<Self> {
        let Some(last_tuple_id) = stmt_tuple_ids.last() else {
            return internal_err!("analytic planner without stmt tuples");
        };
        if stmt_tuple_ids.len() > 1 && *last_tuple_id != analytic_info.output_tuple() {
            return internal_err!(
                "last stmt tuple {last_tuple_id} is not the analytic output tuple {}",
                analytic_info.output_tuple()
            );
        }
        Ok(Self {
            stmt_tuple_ids,
            analytic_info,
            analyzer,
            id_gen,
            options,
            root_smap: ExprSubstitutionMap::new(),
        })
    }

    /// Augments `root` with plan nodes that implement single-node evaluation
    /// of all analytic expressions, then registers the value transfers
    /// between logical and physical output slots with the analyzer.
    pub fn create_single_node_plan(&mut self, mut root: PlanNode) -> Result<PlanNode> {
        let window_groups = self.collect_window_groups()?;
        let sort_groups = collect_sort_groups(window_groups)?;
        let mut partition_groups = collect_partition_groups(sort_groups)?;
        debug!(
            "planning {} analytic expression(s) as {} partition group(s) over stmt tuples [{}]",
            self.analytic_info.analytic_exprs().len(),
            partition_groups.len(),
            self.stmt_tuple_ids.iter().join(", ")
        );

        for partition_group in &mut partition_groups {
            for i in 0..partition_group.sort_groups.len() {
                root =
                    self.create_sort_group_plan(root, &mut partition_group.sort_groups[i], i == 0)?;
            }
        }

        // Bulk update the value transfers based on the new physical output
        // slots of all window groups. A single batch keeps the analyzer
        // from observing partially registered equivalences.
        let mut value_transfers = vec![];
        for partition_group in &partition_groups {
            for sort_group in &partition_group.sort_groups {
                for window_group in &sort_group.window_groups {
                    for (logical, physical) in window_group.logical_to_physical_smap.iter() {
                        value_transfers.push((logical, physical.slot_id));
                    }
                }
            }
        }
        self.analyzer.bulk_update_value_transfers(value_transfers);

        Ok(root)
    }

    /// Extract the window groups from the analytic expressions: greedy
    /// first-fit over the expressions in input order, attaching each one to
    /// the first group with a matching signature.
    fn collect_window_groups(&self) -> Result<Vec<WindowGroup>> {
        let desc_tbl = self.analyzer.desc_tbl();
        let output_slots = desc_tbl
            .tuple(self.analytic_info.output_tuple())?
            .slots()
            .to_vec();
        let intermediate_slots = desc_tbl
            .tuple(self.analytic_info.intermediate_tuple())?
            .slots()
            .to_vec();

        let mut groups: Vec<WindowGroup> = vec![];
        for (i, analytic_expr) in self.analytic_info.analytic_exprs().iter().enumerate() {
            // Do not generate a plan for analytic exprs eliminated as dead code.
            if !desc_tbl.slot(output_slots[i])?.is_materialized() {
                continue;
            }
            match groups.iter_mut().find(|g| g.is_compatible(analytic_expr)) {
                Some(group) => group.add(analytic_expr, output_slots[i], intermediate_slots[i])?,
                None => groups.push(WindowGroup::new(
                    analytic_expr,
                    output_slots[i],
                    intermediate_slots[i],
                )),
            }
        }
        Ok(groups)
    }

    /// Create a [SortInfo] that materializes the entire input row into a
    /// fresh sort tuple and sorts it on `sort_exprs`. Also returns the
    /// substitution map from input slots to sort tuple slots.
    fn create_sort_info(
        &mut self,
        input: &PlanNode,
        sort_exprs: Vec<Expr>,
        sort_options: Vec<SortOptions>,
    ) -> Result<(SortInfo, ExprSubstitutionMap)> {
        let sort_tuple = self.analyzer.desc_tbl_mut().create_tuple_descriptor();
        let mut sort_smap = ExprSubstitutionMap::new();
        let mut materialized_exprs = vec![];
        for tuple_id in &input.tuple_ids {
            let input_slots = self.analyzer.desc_tbl().tuple(*tuple_id)?.slots().to_vec();
            for input_slot in input_slots {
                if !self.analyzer.desc_tbl().slot(input_slot)?.is_materialized() {
                    continue;
                }
                let sort_slot = self.analyzer.copy_slot_descriptor(input_slot, sort_tuple)?;
                // all slots of the sort output are materialized
                self.analyzer
                    .desc_tbl_mut()
                    .slot_mut(sort_slot)?
                    .set_is_materialized(true);
                sort_smap.put(input_slot, self.analyzer.desc_tbl().slot_ref(sort_slot)?);
                materialized_exprs.push(Expr::SlotRef(
                    self.analyzer.desc_tbl().slot_ref(input_slot)?,
                ));
            }
        }
        let ordering_exprs = substitute_list(&sort_exprs, &sort_smap);
        debug!("sort info exprs: {}", ordering_exprs.iter().join(", "));
        self.analyzer.desc_tbl_mut().compute_mem_layout(sort_tuple)?;
        let sort_info =
            SortInfo::try_new(ordering_exprs, sort_options, sort_tuple, materialized_exprs)?;
        Ok((sort_info, sort_smap))
    }

    /// Create the plan subtree for an entire sort group, including all
    /// contained window groups. Only the first sort group of a partition
    /// group gets an input partitioning requirement.
    fn create_sort_group_plan(
        &mut self,
        mut root: PlanNode,
        sort_group: &mut SortGroup,
        is_first_in_partition: bool,
    ) -> Result<PlanNode> {
        let partition_by = sort_group.partition_by.clone();
        let order_by = sort_group.order_by.clone();
        let mut partition_by_lt = None;
        let mut order_by_lt = None;
        let mut buffered_tuple = None;

        // Sort on the partition-by exprs followed by the order-by exprs, and
        // create the pb/ob boundary predicates over the sorted rows.
        if !partition_by.is_empty() || !order_by.is_empty() {
            // The pb/ob exprs were analyzed against the original input
            // slots; remap them to the slots visible at the current root
            // before using them as sort keys.
            //
            // The direction of the partition-by keys is irrelevant: only
            // equality between neighboring rows matters for boundary
            // detection, so any deterministic choice works.
            let mut sort_exprs = substitute_list(&partition_by, &self.root_smap);
            let mut sort_options = vec![
                SortOptions {
                    descending: false,
                    nulls_first: true,
                };
                sort_exprs.len()
            ];
            for element in &order_by {
                sort_exprs.push(element.expr.substitute(&self.root_smap));
                sort_options.push(element.sort_options());
            }

            let (sort_info, sort_smap) = self.create_sort_info(&root, sort_exprs, sort_options)?;
            let sort_tuple = sort_info.sort_tuple;
            let input_partition = if is_first_in_partition {
                Some(self.required_input_partition(&partition_by))
            } else {
                None
            };
            root = PlanNode::sort(
                self.id_gen.next_id(),
                root,
                SortNode {
                    sort_info,
                    is_analytic_sort: true,
                    input_partition,
                },
            );
            self.root_smap = ExprSubstitutionMap::compose(&self.root_smap, &sort_smap);
            trace!("root smap: {}", self.root_smap);

            // The pb/ob predicates compare the output of the sort to a
            // buffered row of the same stream. The buffered row needs its
            // own tuple descriptor, shaped exactly like the sort tuple, so
            // a predicate can refer to the two row instances independently.
            let buffered = self
                .analyzer
                .desc_tbl_mut()
                .copy_tuple_descriptor(sort_tuple)?;
            self.analyzer.desc_tbl_mut().compute_mem_layout(buffered)?;
            trace!("desc tbl:\n{}", self.analyzer.desc_tbl().debug_string());

            // map from the sort output to the buffered tuple
            let mut buffered_smap = ExprSubstitutionMap::new();
            let input_slots = self.analyzer.desc_tbl().tuple(sort_tuple)?.slots().to_vec();
            let buffered_slots = self.analyzer.desc_tbl().tuple(buffered)?.slots().to_vec();
            for (input_slot, buffered_slot) in izip!(input_slots, buffered_slots) {
                buffered_smap.put(input_slot, self.analyzer.desc_tbl().slot_ref(buffered_slot)?);
            }

            // remap the pb/ob exprs to the sort output before building
            // each predicate
            if !partition_by.is_empty() {
                let exprs = substitute_list(&partition_by, &self.root_smap);
                let less_than = self.create_less_than(&exprs, sort_tuple, &buffered_smap)?;
                trace!("partition-by less-than: {less_than}");
                partition_by_lt = Some(less_than);
            }
            if !order_by.is_empty() {
                let exprs = substitute_list(&sort_key_exprs(&order_by), &self.root_smap);
                let less_than = self.create_less_than(&exprs, sort_tuple, &buffered_smap)?;
                trace!("order-by less-than: {less_than}");
                order_by_lt = Some(less_than);
            }
            buffered_tuple = Some(buffered);
        }

        // Create the physical intermediate and output tuples plus the smap
        // for every window group, then stack one eval node per group; the
        // groups of one sort group chain linearly over the shared sort.
        for window_group in &mut sort_group.window_groups {
            window_group.finalize(self.analyzer)?;
            let (Some(intermediate_tuple), Some(output_tuple)) = (
                window_group.physical_intermediate_tuple,
                window_group.physical_output_tuple,
            ) else {
                return internal_err!("window group not finalized before plan assembly");
            };
            let eval = AnalyticEvalNode {
                fn_calls: window_group.fn_calls.clone(),
                partition_by: window_group.partition_by.clone(),
                order_by: order_by.clone(),
                window: window_group.window.clone(),
                intermediate_tuple,
                output_tuple,
                logical_to_physical_smap: window_group.logical_to_physical_smap.clone(),
                partition_by_lt: partition_by_lt.clone(),
                order_by_lt: order_by_lt.clone(),
                buffered_tuple,
            };
            root = PlanNode::analytic_eval(self.id_gen.next_id(), root, eval);
        }
        Ok(root)
    }

    /// The input partitioning required by the first sort of a partition
    /// group.
    fn required_input_partition(&self, partition_by: &[Expr]) -> DataPartition {
        if partition_by.is_empty() || !self.options.repartition_analytics {
            DataPartition::Unpartitioned
        } else {
            DataPartition::HashPartitioned(partition_by.to_vec())
        }
    }

    /// Create a '<' predicate between the key exprs of the input row and
    /// the buffered row (`exprs` refers to the input row):
    ///
    /// ```text
    /// (input_expr0 < buffered_expr0)
    ///   OR (input_expr0 = buffered_expr0 AND input_expr1 < buffered_expr1)
    ///   OR ...
    /// ```
    fn create_less_than(
        &self,
        exprs: &[Expr],
        input_tuple: TupleId,
        buffered_smap: &ExprSubstitutionMap,
    ) -> Result<Expr> {
        let Some(first) = exprs.first() else {
            return internal_err!("boundary predicate over an empty key list");
        };
        let input_slots = self.analyzer.desc_tbl().tuple(input_tuple)?.slots().to_vec();
        trace!("expr0: {first}");
        if !first.is_bound(&input_slots) {
            return internal_err!("key expr {first} is not bound to tuple {input_tuple}");
        }
        let mut result = first.clone().lt(first.substitute(buffered_smap));
        for i in 1..exprs.len() {
            let prev = &exprs[i - 1];
            let eq_clause = prev.clone().eq(prev.substitute(buffered_smap));
            let current = &exprs[i];
            if !current.is_bound(&input_slots) {
                return internal_err!("key expr {current} is not bound to tuple {input_tuple}");
            }
            let lt_clause = current.clone().lt(current.substitute(buffered_smap));
            result = result.or(eq_clause.and(lt_clause));
        }
        self.analyzer.analyze(&result)?;
        Ok(result)
    }
}

/// Collection of analytic exprs that share the same partition-by, order-by
/// and window specification, stored broken up into their constituent parts.
#[derive(Debug)]
struct WindowGroup {
    partition_by: Vec<Expr>,
    order_by: Vec<SortExpr>,
    window: Option<WindowFrame>,

    /// Function calls of the contained analytic exprs and their logical
    /// intermediate and output slots, parallel lists in containment order.
    fn_calls: Vec<AnalyticFnCall>,
    logical_output_slots: Vec<SlotId>,
    logical_intermediate_slots: Vec<SlotId>,

    // Physical output and intermediate tuples as well as the smap from
    // logical to physical output slots. Set exactly once, in finalize().
    physical_output_tuple: Option<TupleId>,
    physical_intermediate_tuple: Option<TupleId>,
    logical_to_physical_smap: ExprSubstitutionMap,
}

impl WindowGroup {
    fn new(
        analytic_expr: &AnalyticExpr,
        logical_output_slot: SlotId,
        logical_intermediate_slot: SlotId,
    ) -> Self {
        Self {
            partition_by: analytic_expr.partition_by.clone(),
            order_by: analytic_expr.order_by.clone(),
            window: analytic_expr.window.clone(),
            fn_calls: vec![analytic_expr.fn_call.clone()],
            logical_output_slots: vec![logical_output_slot],
            logical_intermediate_slots: vec![logical_intermediate_slot],
            physical_output_tuple: None,
            physical_intermediate_tuple: None,
            logical_to_physical_smap: ExprSubstitutionMap::new(),
        }
    }

    /// True if the partition exprs, ordering elements and window of
    /// `analytic_expr` match ours. Partition exprs compare as an unordered
    /// set; ordering elements compare element-wise; an absent window only
    /// matches an absent window.
    fn is_compatible(&self, analytic_expr: &AnalyticExpr) -> bool {
        equal_sets(&analytic_expr.partition_by, &self.partition_by)
            && analytic_expr.order_by == self.order_by
            && analytic_expr.window == self.window
    }

    /// Adds the given analytic expr and its logical slots to this group.
    fn add(
        &mut self,
        analytic_expr: &AnalyticExpr,
        logical_output_slot: SlotId,
        logical_intermediate_slot: SlotId,
    ) -> Result<()> {
        if !self.is_compatible(analytic_expr) {
            return internal_err!("analytic expr {analytic_expr} added to incompatible group");
        }
        self.fn_calls.push(analytic_expr.fn_call.clone());
        self.logical_output_slots.push(logical_output_slot);
        self.logical_intermediate_slots.push(logical_intermediate_slot);
        Ok(())
    }

    /// Creates the physical output and intermediate tuples, fills in the
    /// logical to physical smap, and computes the mem layout of the new
    /// tuples. Must run exactly once per group, after grouping is frozen and
    /// before the group is wired into a plan node.
    fn finalize(&mut self, analyzer: &mut Analyzer) -> Result<()> {
        if self.physical_output_tuple.is_some() || self.physical_intermediate_tuple.is_some() {
            return internal_err!("window group finalized more than once");
        }
        if self.fn_calls.len() != self.logical_output_slots.len()
            || self.fn_calls.len() != self.logical_intermediate_slots.len()
        {
            return internal_err!("window group slot lists out of sync");
        }

        // When a distinct intermediate tuple is needed, create it first so
        // its id stays below the output tuple's id.
        let requires_intermediate = requires_intermediate_tuple(&self.fn_calls);
        let desc_tbl = analyzer.desc_tbl_mut();
        let (intermediate_tuple, output_tuple) = if requires_intermediate {
            let intermediate = desc_tbl.create_tuple_descriptor();
            (intermediate, desc_tbl.create_tuple_descriptor())
        } else {
            let output = desc_tbl.create_tuple_descriptor();
            (output, output)
        };

        for (logical_output, logical_intermediate) in
            izip!(&self.logical_output_slots, &self.logical_intermediate_slots)
        {
            let physical_output = desc_tbl.copy_slot_descriptor(*logical_output, output_tuple)?;
            desc_tbl.slot_mut(physical_output)?.set_is_materialized(true);
            if requires_intermediate {
                let physical_intermediate =
                    desc_tbl.copy_slot_descriptor(*logical_intermediate, intermediate_tuple)?;
                desc_tbl
                    .slot_mut(physical_intermediate)?
                    .set_is_materialized(true);
            }
            let substitute = desc_tbl.slot_ref(physical_output)?;
            self.logical_to_physical_smap.put(*logical_output, substitute);
        }
        desc_tbl.compute_mem_layout(output_tuple)?;
        if requires_intermediate {
            desc_tbl.compute_mem_layout(intermediate_tuple)?;
        }
        self.physical_output_tuple = Some(output_tuple);
        self.physical_intermediate_tuple = Some(intermediate_tuple);
        Ok(())
    }
}

/// Collection of window groups that share the same partition-by and
/// order-by specification and execute against one sorted stream.
#[derive(Debug)]
struct SortGroup {
    partition_by: Vec<Expr>,
    order_by: Vec<SortExpr>,
    window_groups: Vec<WindowGroup>,
}

impl SortGroup {
    fn new(window_group: WindowGroup) -> Self {
        Self {
            partition_by: window_group.partition_by.clone(),
            order_by: window_group.order_by.clone(),
            window_groups: vec![window_group],
        }
    }

    /// True if the partition and ordering exprs of `window_group` match
    /// ours; the window frame is ignored.
    fn is_compatible(&self, window_group: &WindowGroup) -> bool {
        equal_sets(&window_group.partition_by, &self.partition_by)
            && window_group.order_by == self.order_by
    }

    fn add(&mut self, window_group: WindowGroup) -> Result<()> {
        if !self.is_compatible(&window_group) {
            return internal_err!("window group added to incompatible sort group");
        }
        self.window_groups.push(window_group);
        Ok(())
    }
}

/// Partitions the window groups into sort groups: greedy first-fit in
/// extraction order.
fn collect_sort_groups(window_groups: Vec<WindowGroup>) -> Result<Vec<SortGroup>> {
    let mut sort_groups: Vec<SortGroup> = vec![];
    for window_group in window_groups {
        match sort_groups
            .iter_mut()
            .find(|g| g.is_compatible(&window_group))
        {
            Some(group) => group.add(window_group)?,
            None => sort_groups.push(SortGroup::new(window_group)),
        }
    }
    Ok(sort_groups)
}

/// Collection of sort groups that share the same partition-by set; at most
/// one repartition exchange is required for the whole group.
#[derive(Debug)]
struct PartitionGroup {
    partition_by: Vec<Expr>,
    sort_groups: Vec<SortGroup>,
}

impl PartitionGroup {
    fn new(sort_group: SortGroup) -> Self {
        Self {
            partition_by: sort_group.partition_by.clone(),
            sort_groups: vec![sort_group],
        }
    }

    /// True if the partition exprs of `sort_group` are compatible with
    /// ours. For now that means set equality; ordering is ignored.
    fn is_compatible(&self, sort_group: &SortGroup) -> bool {
        equal_sets(&sort_group.partition_by, &self.partition_by)
    }

    fn add(&mut self, sort_group: SortGroup) -> Result<()> {
        if !self.is_compatible(&sort_group) {
            return internal_err!("sort group added to incompatible partition group");
        }
        self.sort_groups.push(sort_group);
        Ok(())
    }
}

/// Partitions the sort groups into partition groups: greedy first-fit in
/// extraction order.
fn collect_partition_groups(sort_groups: Vec<SortGroup>) -> Result<Vec<PartitionGroup>> {
    let mut partition_groups: Vec<PartitionGroup> = vec![];
    for sort_group in sort_groups {
        match partition_groups
            .iter_mut()
            .find(|g| g.is_compatible(&sort_group))
        {
            Some(group) => group.add(sort_group)?,
            None => partition_groups.push(PartitionGroup::new(sort_group)),
        }
    }
    Ok(partition_groups)
}
