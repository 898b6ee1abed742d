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

//! End-to-end tests for analytic plan generation

use analytic_common::{IdGenerator, PlannerOptions, Result, SlotId, TupleId};
use analytic_expr::{
    AnalyticExpr, AnalyticFnCall, Expr, SortExpr, WindowFrame, WindowFrameBound, WindowFrameUnits,
};
use analytic_plan::{
    displayable, AnalyticInfo, AnalyticPlanner, Analyzer, DataPartition, PlanNode, PlanNodeKind,
};
use arrow_schema::DataType;

/// Input tuple with columns a (Int32), b (Int32) and x (Int64), all
/// materialized.
fn input_tuple(analyzer: &mut Analyzer) -> Result<(TupleId, SlotId, SlotId, SlotId)> {
    let desc_tbl = analyzer.desc_tbl_mut();
    let tuple = desc_tbl.create_tuple_descriptor();
    let a = desc_tbl.add_slot_descriptor(tuple, DataType::Int32, "a")?;
    let b = desc_tbl.add_slot_descriptor(tuple, DataType::Int32, "b")?;
    let x = desc_tbl.add_slot_descriptor(tuple, DataType::Int64, "x")?;
    for slot in [a, b, x] {
        desc_tbl.slot_mut(slot)?.set_is_materialized(true);
    }
    Ok((tuple, a, b, x))
}

/// Builds the logical intermediate and output tuples for `exprs`, with every
/// output slot materialized.
fn analytic_fixture(analyzer: &mut Analyzer, exprs: Vec<AnalyticExpr>) -> Result<AnalyticInfo> {
    let desc_tbl = analyzer.desc_tbl_mut();
    let intermediate = desc_tbl.create_tuple_descriptor();
    let output = desc_tbl.create_tuple_descriptor();
    for expr in &exprs {
        let intermediate_type = expr
            .fn_call
            .intermediate_type
            .clone()
            .unwrap_or_else(|| expr.fn_call.return_type.clone());
        desc_tbl.add_slot_descriptor(
            intermediate,
            intermediate_type,
            expr.fn_call.name.to_lowercase(),
        )?;
    }
    for expr in &exprs {
        let output_slot = desc_tbl.add_slot_descriptor(
            output,
            expr.fn_call.return_type.clone(),
            expr.fn_call.name.to_lowercase(),
        )?;
        desc_tbl.slot_mut(output_slot)?.set_is_materialized(true);
    }
    AnalyticInfo::try_new(exprs, intermediate, output, analyzer.desc_tbl())
}

fn default_frame() -> WindowFrame {
    WindowFrame::try_new(
        WindowFrameUnits::Range,
        WindowFrameBound::Preceding(None),
        WindowFrameBound::CurrentRow,
    )
    .expect("valid frame")
}

fn asc(slot: SlotId, label: &str) -> SortExpr {
    SortExpr::new(Expr::slot_ref(slot, label), true, true)
}

fn count_hash_repartitions(node: &PlanNode) -> usize {
    let own = match &node.kind {
        PlanNodeKind::Sort(sort) => {
            matches!(sort.input_partition, Some(DataPartition::HashPartitioned(_))) as usize
        }
        _ => 0,
    };
    own + node
        .children
        .iter()
        .map(count_hash_repartitions)
        .sum::<usize>()
}

/// Plans `RANK() OVER (PARTITION BY a ORDER BY b)`, `SUM(x)` over the same
/// window, and `COUNT() OVER (PARTITION BY a)`, returning the plan root and
/// the analyzer state after planning.
fn plan_shared_partition_scenario(options: PlannerOptions) -> Result<(PlanNode, Analyzer)> {
    let _ = env_logger::try_init();
    let mut analyzer = Analyzer::new();
    let (input, a, b, x) = input_tuple(&mut analyzer)?;
    let partition_by = vec![Expr::slot_ref(a, "a")];
    let order_by = vec![asc(b, "b")];
    let info = analytic_fixture(
        &mut analyzer,
        vec![
            AnalyticExpr::new(
                AnalyticFnCall::new("RANK", vec![], DataType::Int64),
                partition_by.clone(),
                order_by.clone(),
                Some(default_frame()),
            ),
            AnalyticExpr::new(
                AnalyticFnCall::new("SUM", vec![Expr::slot_ref(x, "x")], DataType::Int64),
                partition_by.clone(),
                order_by,
                Some(default_frame()),
            ),
            AnalyticExpr::new(
                AnalyticFnCall::new("COUNT", vec![], DataType::Int64),
                partition_by,
                vec![],
                None,
            ),
        ],
    )?;

    let mut id_gen = IdGenerator::new();
    let scan = PlanNode::scan(id_gen.next_id(), vec![input], "t");
    let mut planner = AnalyticPlanner::try_new(
        vec![input, info.output_tuple()],
        &info,
        &mut analyzer,
        &mut id_gen,
        options,
    )?;
    let plan = planner.create_single_node_plan(scan)?;
    Ok((plan, analyzer))
}

#[test]
fn shared_partition_with_two_sort_groups() -> Result<()> {
    let (plan, analyzer) = plan_shared_partition_scenario(PlannerOptions::default())?;

    // Bottom to top: one sort per sort group, one eval node per window
    // group, and a single hash repartition for the shared partition group.
    assert_eq!(
        displayable(&plan).to_string(),
        "AnalyticEval: fns=[COUNT()], partition_by=[a@0], order_by=[]\n\
         \x20 Sort: key=[a@17 ASC NULLS FIRST], analytic\n\
         \x20   AnalyticEval: fns=[RANK(), SUM(x@2)], partition_by=[a@0], \
         order_by=[b@1 ASC NULLS FIRST], window=[RANGE BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW]\n\
         \x20     Sort: key=[a@9 ASC NULLS FIRST, b@10 ASC NULLS FIRST], analytic, \
         partition=Hash([a@0])\n\
         \x20       Scan: t\n"
    );
    assert_eq!(count_hash_repartitions(&plan), 1);

    // the top eval node evaluates COUNT over the second sorted stream
    let PlanNodeKind::AnalyticEval(count_eval) = &plan.kind else {
        panic!("expected eval node at the root");
    };
    assert_eq!(count_eval.fn_calls.len(), 1);
    assert_eq!(count_eval.window, None);
    assert!(count_eval.order_by_lt.is_none());
    assert_eq!(count_eval.intermediate_tuple, count_eval.output_tuple);
    assert_eq!(count_eval.buffered_tuple, Some(TupleId::new(7)));
    // partition boundary: sort output slot vs. buffered slot
    assert_eq!(
        count_eval.partition_by_lt,
        Some(Expr::slot_ref(SlotId::new(17), "a").lt(Expr::slot_ref(SlotId::new(22), "a")))
    );

    let PlanNodeKind::Sort(count_sort) = &plan.child(0).kind else {
        panic!("expected sort below the top eval node");
    };
    assert!(count_sort.is_analytic_sort);
    // later sort group of the partition group: partitioning already satisfied
    assert_eq!(count_sort.input_partition, None);

    let rank_sum_eval_node = plan.child(0).child(0);
    let PlanNodeKind::AnalyticEval(rank_sum_eval) = &rank_sum_eval_node.kind else {
        panic!("expected eval node for the rank/sum window group");
    };
    assert_eq!(rank_sum_eval.fn_calls.len(), 2);
    assert_eq!(rank_sum_eval.buffered_tuple, Some(TupleId::new(4)));
    assert_eq!(
        rank_sum_eval.partition_by_lt,
        Some(Expr::slot_ref(SlotId::new(9), "a").lt(Expr::slot_ref(SlotId::new(12), "a")))
    );
    assert_eq!(
        rank_sum_eval.order_by_lt,
        Some(Expr::slot_ref(SlotId::new(10), "b").lt(Expr::slot_ref(SlotId::new(13), "b")))
    );

    let PlanNodeKind::Sort(rank_sum_sort) = &rank_sum_eval_node.child(0).kind else {
        panic!("expected sort at the bottom of the analytic subtree");
    };
    assert_eq!(
        rank_sum_sort.input_partition,
        Some(DataPartition::HashPartitioned(vec![Expr::slot_ref(
            SlotId::new(0),
            "a"
        )]))
    );
    // the sort materializes the entire input row
    assert_eq!(rank_sum_sort.sort_info.materialized_exprs.len(), 3);

    // one batch of logical to physical value transfers for all window groups
    assert_eq!(
        analyzer.value_transfers(),
        &[
            (SlotId::new(6), SlotId::new(15)),
            (SlotId::new(7), SlotId::new(16)),
            (SlotId::new(8), SlotId::new(27)),
        ]
    );
    Ok(())
}

#[test]
fn planning_is_deterministic() -> Result<()> {
    let (first_plan, first_analyzer) = plan_shared_partition_scenario(PlannerOptions::default())?;
    let (second_plan, second_analyzer) = plan_shared_partition_scenario(PlannerOptions::default())?;
    assert_eq!(
        displayable(&first_plan).to_string(),
        displayable(&second_plan).to_string()
    );
    assert_eq!(
        first_analyzer.value_transfers(),
        second_analyzer.value_transfers()
    );
    Ok(())
}

#[test]
fn repartitioning_can_be_disabled() -> Result<()> {
    let (plan, _) = plan_shared_partition_scenario(PlannerOptions {
        repartition_analytics: false,
    })?;
    assert_eq!(count_hash_repartitions(&plan), 0);
    // the first sort of the partition group still carries an explicit
    // requirement, it just demands unpartitioned input
    let PlanNodeKind::Sort(bottom_sort) = &plan.child(0).child(0).child(0).kind else {
        panic!("expected sort above the scan");
    };
    assert_eq!(
        bottom_sort.input_partition,
        Some(DataPartition::Unpartitioned)
    );
    Ok(())
}

#[test]
fn unpartitioned_unordered_group_needs_no_sort() -> Result<()> {
    let _ = env_logger::try_init();
    let mut analyzer = Analyzer::new();
    let (input, _, _, x) = input_tuple(&mut analyzer)?;
    let info = analytic_fixture(
        &mut analyzer,
        vec![AnalyticExpr::new(
            AnalyticFnCall::new("SUM", vec![Expr::slot_ref(x, "x")], DataType::Int64),
            vec![],
            vec![],
            None,
        )],
    )?;

    let mut id_gen = IdGenerator::new();
    let scan = PlanNode::scan(id_gen.next_id(), vec![input], "t");
    let mut planner = AnalyticPlanner::try_new(
        vec![input, info.output_tuple()],
        &info,
        &mut analyzer,
        &mut id_gen,
        PlannerOptions::default(),
    )?;
    let plan = planner.create_single_node_plan(scan)?;

    let PlanNodeKind::AnalyticEval(eval) = &plan.kind else {
        panic!("expected a single eval node");
    };
    assert!(matches!(plan.child(0).kind, PlanNodeKind::Scan { .. }));
    assert!(eval.partition_by_lt.is_none());
    assert!(eval.order_by_lt.is_none());
    assert_eq!(eval.buffered_tuple, None);
    Ok(())
}

#[test]
fn ordered_unpartitioned_group_requires_unpartitioned_input() -> Result<()> {
    let _ = env_logger::try_init();
    let mut analyzer = Analyzer::new();
    let (input, _, b, _) = input_tuple(&mut analyzer)?;
    let info = analytic_fixture(
        &mut analyzer,
        vec![AnalyticExpr::new(
            AnalyticFnCall::new("RANK", vec![], DataType::Int64),
            vec![],
            vec![asc(b, "b")],
            None,
        )],
    )?;

    let mut id_gen = IdGenerator::new();
    let scan = PlanNode::scan(id_gen.next_id(), vec![input], "t");
    let mut planner = AnalyticPlanner::try_new(
        vec![input, info.output_tuple()],
        &info,
        &mut analyzer,
        &mut id_gen,
        PlannerOptions::default(),
    )?;
    let plan = planner.create_single_node_plan(scan)?;

    let PlanNodeKind::AnalyticEval(eval) = &plan.kind else {
        panic!("expected an eval node at the root");
    };
    assert!(eval.partition_by_lt.is_none());
    assert!(eval.order_by_lt.is_some());
    let PlanNodeKind::Sort(sort) = &plan.child(0).kind else {
        panic!("expected a sort below the eval node");
    };
    assert_eq!(sort.input_partition, Some(DataPartition::Unpartitioned));
    Ok(())
}

#[test]
fn distinct_partitionings_repartition_once_each() -> Result<()> {
    let _ = env_logger::try_init();
    let mut analyzer = Analyzer::new();
    let (input, a, b, _) = input_tuple(&mut analyzer)?;
    let info = analytic_fixture(
        &mut analyzer,
        vec![
            AnalyticExpr::new(
                AnalyticFnCall::new("RANK", vec![], DataType::Int64),
                vec![Expr::slot_ref(a, "a")],
                vec![asc(b, "b")],
                None,
            ),
            AnalyticExpr::new(
                AnalyticFnCall::new("COUNT", vec![], DataType::Int64),
                vec![Expr::slot_ref(b, "b")],
                vec![],
                None,
            ),
        ],
    )?;

    let mut id_gen = IdGenerator::new();
    let scan = PlanNode::scan(id_gen.next_id(), vec![input], "t");
    let mut planner = AnalyticPlanner::try_new(
        vec![input, info.output_tuple()],
        &info,
        &mut analyzer,
        &mut id_gen,
        PlannerOptions::default(),
    )?;
    let plan = planner.create_single_node_plan(scan)?;

    assert_eq!(count_hash_repartitions(&plan), 2);
    Ok(())
}

#[test]
fn distinct_intermediate_tuple_precedes_output_tuple() -> Result<()> {
    let _ = env_logger::try_init();
    let mut analyzer = Analyzer::new();
    let (input, a, _, x) = input_tuple(&mut analyzer)?;
    let info = analytic_fixture(
        &mut analyzer,
        vec![AnalyticExpr::new(
            AnalyticFnCall::new("AVG", vec![Expr::slot_ref(x, "x")], DataType::Float64)
                .with_intermediate_type(DataType::Utf8),
            vec![Expr::slot_ref(a, "a")],
            vec![],
            None,
        )],
    )?;

    let mut id_gen = IdGenerator::new();
    let scan = PlanNode::scan(id_gen.next_id(), vec![input], "t");
    let mut planner = AnalyticPlanner::try_new(
        vec![input, info.output_tuple()],
        &info,
        &mut analyzer,
        &mut id_gen,
        PlannerOptions::default(),
    )?;
    let plan = planner.create_single_node_plan(scan)?;

    let PlanNodeKind::AnalyticEval(eval) = &plan.kind else {
        panic!("expected an eval node at the root");
    };
    assert!(eval.intermediate_tuple < eval.output_tuple);
    Ok(())
}
