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

//! Logical expression representation (`Expr`)

use std::fmt::{self, Display, Formatter};

use analytic_common::{ScalarValue, SlotId};

use crate::operator::Operator;
use crate::substitution::ExprSubstitutionMap;

/// Represents an expression handled by the analytic planner.
///
/// This is a closed set: slot references into materialized tuples, literal
/// constants, and the binary predicates the planner builds out of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A reference to a slot of a tuple descriptor.
    SlotRef(SlotRef),
    /// A constant value.
    Literal(ScalarValue),
    /// A binary expression such as `a < b`.
    BinaryExpr(BinaryExpr),
}

/// A reference to a slot, labeled with the column name it carries.
///
/// Two slot references are equal iff they reference the same slot id; the
/// label only serves display purposes and never participates in equality.
#[derive(Debug, Clone, Eq)]
pub struct SlotRef {
    pub slot_id: SlotId,
    pub label: String,
}

impl SlotRef {
    pub fn new(slot_id: SlotId, label: impl Into<String>) -> Self {
        Self {
            slot_id,
            label: label.into(),
        }
    }
}

impl PartialEq for SlotRef {
    fn eq(&self, other: &Self) -> bool {
        self.slot_id == other.slot_id
    }
}

impl Display for SlotRef {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}@{}", self.label, self.slot_id)
    }
}

/// Binary expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryExpr {
    /// Left-hand side of the expression
    pub left: Box<Expr>,
    /// The operator
    pub op: Operator,
    /// Right-hand side of the expression
    pub right: Box<Expr>,
}

impl BinaryExpr {
    pub fn new(left: Box<Expr>, op: Operator, right: Box<Expr>) -> Self {
        Self { left, op, right }
    }
}

impl Expr {
    /// Create a slot reference expression.
    pub fn slot_ref(slot_id: SlotId, label: impl Into<String>) -> Expr {
        Expr::SlotRef(SlotRef::new(slot_id, label))
    }

    /// Create a literal expression.
    pub fn literal(value: ScalarValue) -> Expr {
        Expr::Literal(value)
    }

    /// Return `self = other`
    pub fn eq(self, other: Expr) -> Expr {
        binary_expr(self, Operator::Eq, other)
    }

    /// Return `self < other`
    pub fn lt(self, other: Expr) -> Expr {
        binary_expr(self, Operator::Lt, other)
    }

    /// Return `self AND other`
    pub fn and(self, other: Expr) -> Expr {
        binary_expr(self, Operator::And, other)
    }

    /// Return `self OR other`
    pub fn or(self, other: Expr) -> Expr {
        binary_expr(self, Operator::Or, other)
    }

    /// Collects the ids of all slots referenced by this expression, in
    /// depth-first left-to-right order.
    pub fn slot_ids(&self) -> Vec<SlotId> {
        let mut ids = vec![];
        self.collect_slot_ids(&mut ids);
        ids
    }

    fn collect_slot_ids(&self, ids: &mut Vec<SlotId>) {
        match self {
            Expr::SlotRef(slot_ref) => ids.push(slot_ref.slot_id),
            Expr::Literal(_) => {}
            Expr::BinaryExpr(binary) => {
                binary.left.collect_slot_ids(ids);
                binary.right.collect_slot_ids(ids);
            }
        }
    }

    /// True if every slot referenced by this expression is one of `slots`,
    /// i.e. the expression can be evaluated against rows of the tuple that
    /// owns those slots.
    pub fn is_bound(&self, slots: &[SlotId]) -> bool {
        self.slot_ids().iter().all(|id| slots.contains(id))
    }

    /// Returns a copy of this expression with every slot reference that has
    /// a mapping in `smap` replaced by its substitute. Slots without a
    /// mapping are left untouched.
    pub fn substitute(&self, smap: &ExprSubstitutionMap) -> Expr {
        match self {
            Expr::SlotRef(slot_ref) => match smap.get(slot_ref.slot_id) {
                Some(substitute) => Expr::SlotRef(substitute.clone()),
                None => self.clone(),
            },
            Expr::Literal(_) => self.clone(),
            Expr::BinaryExpr(binary) => Expr::BinaryExpr(BinaryExpr::new(
                Box::new(binary.left.substitute(smap)),
                binary.op,
                Box::new(binary.right.substitute(smap)),
            )),
        }
    }
}

/// Return a new expression `left <op> right`
pub fn binary_expr(left: Expr, op: Operator, right: Expr) -> Expr {
    Expr::BinaryExpr(BinaryExpr::new(Box::new(left), op, Box::new(right)))
}

/// Apply `Expr::substitute` to every expression of a list.
pub fn substitute_list(exprs: &[Expr], smap: &ExprSubstitutionMap) -> Vec<Expr> {
    exprs.iter().map(|e| e.substitute(smap)).collect()
}

/// Check whether `expr` structurally equals any expression of `exprs`.
pub fn exprs_contains(exprs: &[Expr], expr: &Expr) -> bool {
    exprs.iter().any(|e| e == expr)
}

/// Unordered, duplicate-insensitive set equality over expression lists:
/// every element of each list occurs in the other.
pub fn equal_sets(lhs: &[Expr], rhs: &[Expr]) -> bool {
    lhs.iter().all(|e| exprs_contains(rhs, e)) && rhs.iter().all(|e| exprs_contains(lhs, e))
}

/// Element-wise equality over expression lists.
pub fn equal_lists(lhs: &[Expr], rhs: &[Expr]) -> bool {
    lhs.len() == rhs.len() && lhs.iter().zip(rhs.iter()).all(|(l, r)| l == r)
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Expr::SlotRef(slot_ref) => write!(f, "{slot_ref}"),
            Expr::Literal(value) => write!(f, "{value}"),
            Expr::BinaryExpr(binary) => {
                // Put parentheses around child binary expressions only when
                // required by operator precedence, so that `(a OR b) AND c`
                // and `a OR (b AND c)` read differently.
                fn write_child(
                    f: &mut Formatter<'_>,
                    expr: &Expr,
                    precedence: u8,
                ) -> fmt::Result {
                    match expr {
                        Expr::BinaryExpr(child) => {
                            if child.op.precedence() < precedence {
                                write!(f, "({expr})")?;
                            } else {
                                write!(f, "{expr}")?;
                            }
                        }
                        _ => write!(f, "{expr}")?,
                    }
                    Ok(())
                }

                let precedence = binary.op.precedence();
                write_child(f, binary.left.as_ref(), precedence)?;
                write!(f, " {} ", binary.op)?;
                write_child(f, binary.right.as_ref(), precedence)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: usize, label: &str) -> Expr {
        Expr::slot_ref(SlotId::new(id), label)
    }

    #[test]
    fn slot_ref_equality_ignores_label() {
        assert_eq!(slot(1, "a"), slot(1, "renamed"));
        assert_ne!(slot(1, "a"), slot(2, "a"));
    }

    #[test]
    fn equal_sets_is_order_and_duplicate_insensitive() {
        let ab = vec![slot(1, "a"), slot(2, "b")];
        let ba = vec![slot(2, "b"), slot(1, "a")];
        let aab = vec![slot(1, "a"), slot(1, "a"), slot(2, "b")];
        let ac = vec![slot(1, "a"), slot(3, "c")];
        assert!(equal_sets(&ab, &ba));
        assert!(equal_sets(&ab, &aab));
        assert!(!equal_sets(&ab, &ac));
        assert!(!equal_sets(&ab, &ab[..1]));
        assert!(equal_sets(&[], &[]));
    }

    #[test]
    fn equal_lists_is_element_wise() {
        let ab = vec![slot(1, "a"), slot(2, "b")];
        let ba = vec![slot(2, "b"), slot(1, "a")];
        assert!(equal_lists(&ab, &ab.clone()));
        assert!(!equal_lists(&ab, &ba));
        assert!(!equal_lists(&ab, &ab[..1]));
    }

    #[test]
    fn substitute_rewrites_mapped_slots() {
        let mut smap = ExprSubstitutionMap::new();
        smap.put(SlotId::new(1), SlotRef::new(SlotId::new(10), "a"));
        let pred = slot(1, "a").lt(slot(2, "b"));
        let substituted = pred.substitute(&smap);
        assert_eq!(substituted, slot(10, "a").lt(slot(2, "b")));
        // the original is untouched
        assert_eq!(pred.slot_ids(), vec![SlotId::new(1), SlotId::new(2)]);
    }

    #[test]
    fn is_bound_checks_every_slot() {
        let pred = slot(1, "a").eq(slot(2, "b"));
        assert!(pred.is_bound(&[SlotId::new(1), SlotId::new(2), SlotId::new(3)]));
        assert!(!pred.is_bound(&[SlotId::new(1)]));
        assert!(Expr::literal(ScalarValue::Int64(Some(1))).is_bound(&[]));
    }

    #[test]
    fn display_omits_redundant_parentheses() {
        let lt = slot(1, "a").lt(slot(3, "a"));
        let eq_and_lt = slot(1, "a")
            .eq(slot(3, "a"))
            .and(slot(2, "b").lt(slot(4, "b")));
        assert_eq!(
            lt.clone().or(eq_and_lt).to_string(),
            "a@1 < a@3 OR a@1 = a@3 AND b@2 < b@4"
        );
        // forcing the other association requires parentheses
        let or_then_and = slot(1, "a")
            .lt(slot(3, "a"))
            .or(slot(1, "a").eq(slot(3, "a")))
            .and(slot(2, "b").lt(slot(4, "b")));
        assert_eq!(
            or_then_and.to_string(),
            "(a@1 < a@3 OR a@1 = a@3) AND b@2 < b@4"
        );
    }
}
