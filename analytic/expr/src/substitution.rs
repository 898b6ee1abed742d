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

//! Slot substitution maps

use std::fmt::{self, Display, Formatter};

use analytic_common::SlotId;
use indexmap::IndexMap;

use crate::expr::SlotRef;

/// Maps source slots to substitute slot references, keyed by stable slot id.
///
/// Entries iterate in insertion order, which keeps everything derived from a
/// map (substituted expression lists, value-transfer batches) deterministic
/// for a fixed input order.
#[derive(Debug, Clone, Default)]
pub struct ExprSubstitutionMap {
    map: IndexMap<SlotId, SlotRef>,
}

impl ExprSubstitutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `to` as the substitute for references to `from`. A later
    /// mapping for the same slot replaces the earlier one.
    pub fn put(&mut self, from: SlotId, to: SlotRef) {
        self.map.insert(from, to);
    }

    pub fn get(&self, from: SlotId) -> Option<&SlotRef> {
        self.map.get(&from)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over (source slot, substitute) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &SlotRef)> {
        self.map.iter().map(|(from, to)| (*from, to))
    }

    /// Returns the composition of two maps: every substitute of `f` is
    /// remapped through `g`, and mappings of `g` whose source `f` does not
    /// cover are carried over. Substituting through the result behaves like
    /// substituting through `f` and then through `g`.
    pub fn compose(f: &Self, g: &Self) -> Self {
        let mut result = Self::new();
        for (from, to) in f.iter() {
            let to = g.get(to.slot_id).unwrap_or(to).clone();
            result.put(from, to);
        }
        for (from, to) in g.iter() {
            if f.get(from).is_none() {
                result.put(from, to.clone());
            }
        }
        result
    }
}

impl Display for ExprSubstitutionMap {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "smap(")?;
        for (i, (from, to)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{from}:{to}")?;
        }
        write!(f, ")")
    }
}
