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

//! Tuple and slot descriptors
//!
//! A tuple descriptor describes the physical layout of one materialized row
//! format; a slot descriptor describes one value inside it. The
//! [DescriptorTable] is the compilation-scoped catalog that allocates both
//! and computes their memory layouts.

use std::fmt::Write as _;

use analytic_common::{internal_err, IdGenerator, PlannerError, Result, SlotId, TupleId};
use analytic_expr::SlotRef;
use arrow_schema::DataType;

/// Describes one value slot of a tuple.
#[derive(Debug, Clone)]
pub struct SlotDescriptor {
    id: SlotId,
    parent: TupleId,
    data_type: DataType,
    label: String,
    is_materialized: bool,
    byte_offset: Option<usize>,
}

impl SlotDescriptor {
    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn parent(&self) -> TupleId {
        self.parent
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_materialized(&self) -> bool {
        self.is_materialized
    }

    pub fn set_is_materialized(&mut self, is_materialized: bool) {
        self.is_materialized = is_materialized;
    }

    /// Byte offset inside the parent tuple, available once the tuple's
    /// memory layout has been computed.
    pub fn byte_offset(&self) -> Option<usize> {
        self.byte_offset
    }
}

/// Describes one materialized row format as a sequence of slots.
#[derive(Debug, Clone)]
pub struct TupleDescriptor {
    id: TupleId,
    slots: Vec<SlotId>,
    byte_size: Option<usize>,
}

impl TupleDescriptor {
    pub fn id(&self) -> TupleId {
        self.id
    }

    pub fn slots(&self) -> &[SlotId] {
        &self.slots
    }

    /// Total tuple width in bytes, available once the memory layout has
    /// been computed.
    pub fn byte_size(&self) -> Option<usize> {
        self.byte_size
    }
}

/// Compilation-scoped catalog of tuple and slot descriptors.
///
/// Owns the id generators for both descriptor kinds, so ids are dense and
/// monotonically increasing in creation order within one compilation.
#[derive(Debug, Default)]
pub struct DescriptorTable {
    tuple_id_gen: IdGenerator<TupleId>,
    slot_id_gen: IdGenerator<SlotId>,
    tuples: Vec<TupleDescriptor>,
    slots: Vec<SlotDescriptor>,
}

impl DescriptorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new, empty tuple descriptor.
    pub fn create_tuple_descriptor(&mut self) -> TupleId {
        let id = self.tuple_id_gen.next_id();
        self.tuples.push(TupleDescriptor {
            id,
            slots: vec![],
            byte_size: None,
        });
        id
    }

    /// Adds a new slot with the given type and label to `tuple`. The slot
    /// starts out non-materialized.
    pub fn add_slot_descriptor(
        &mut self,
        tuple: TupleId,
        data_type: DataType,
        label: impl Into<String>,
    ) -> Result<SlotId> {
        self.tuple(tuple)?;
        let id = self.slot_id_gen.next_id();
        self.slots.push(SlotDescriptor {
            id,
            parent: tuple,
            data_type,
            label: label.into(),
            is_materialized: false,
            byte_offset: None,
        });
        self.tuple_mut(tuple)?.slots.push(id);
        Ok(id)
    }

    /// Copies the slot descriptor `src` into `dst`: the copy gets a fresh
    /// id, inherits type and label, and starts out non-materialized with no
    /// layout assigned.
    pub fn copy_slot_descriptor(&mut self, src: SlotId, dst: TupleId) -> Result<SlotId> {
        let (data_type, label) = {
            let src = self.slot(src)?;
            (src.data_type.clone(), src.label.clone())
        };
        self.add_slot_descriptor(dst, data_type, label)
    }

    /// Creates a structural copy of `src`: a fresh tuple whose slots copy
    /// the slots of `src` one by one, in order, preserving their
    /// materialized state.
    pub fn copy_tuple_descriptor(&mut self, src: TupleId) -> Result<TupleId> {
        let src_slots = self.tuple(src)?.slots.clone();
        let copy = self.create_tuple_descriptor();
        for src_slot in src_slots {
            let materialized = self.slot(src_slot)?.is_materialized;
            let copied = self.copy_slot_descriptor(src_slot, copy)?;
            self.slot_mut(copied)?.is_materialized = materialized;
        }
        Ok(copy)
    }

    pub fn tuple(&self, id: TupleId) -> Result<&TupleDescriptor> {
        self.tuples
            .get(id.as_usize())
            .ok_or_else(|| PlannerError::Internal(format!("unknown tuple id {id}")))
    }

    fn tuple_mut(&mut self, id: TupleId) -> Result<&mut TupleDescriptor> {
        self.tuples
            .get_mut(id.as_usize())
            .ok_or_else(|| PlannerError::Internal(format!("unknown tuple id {id}")))
    }

    pub fn slot(&self, id: SlotId) -> Result<&SlotDescriptor> {
        self.slots
            .get(id.as_usize())
            .ok_or_else(|| PlannerError::Internal(format!("unknown slot id {id}")))
    }

    pub fn slot_mut(&mut self, id: SlotId) -> Result<&mut SlotDescriptor> {
        self.slots
            .get_mut(id.as_usize())
            .ok_or_else(|| PlannerError::Internal(format!("unknown slot id {id}")))
    }

    /// Builds a [SlotRef] to `id`, labeled with the slot's label.
    pub fn slot_ref(&self, id: SlotId) -> Result<SlotRef> {
        Ok(SlotRef::new(id, self.slot(id)?.label.clone()))
    }

    /// Computes the memory layout of `tuple`: slots are placed by
    /// descending type width (ties broken by slot id) and one null
    /// indicator bit per slot is appended after the data bytes. The layout
    /// is deterministic for a fixed slot set.
    pub fn compute_mem_layout(&mut self, tuple: TupleId) -> Result<()> {
        let slot_ids = self.tuple(tuple)?.slots.clone();
        let mut widths = Vec::with_capacity(slot_ids.len());
        for slot_id in &slot_ids {
            widths.push((*slot_id, slot_byte_width(&self.slot(*slot_id)?.data_type)?));
        }
        widths.sort_by_key(|(id, width)| (std::cmp::Reverse(*width), *id));

        let mut offset = 0;
        for (slot_id, width) in &widths {
            self.slot_mut(*slot_id)?.byte_offset = Some(offset);
            offset += width;
        }
        let null_indicator_bytes = (slot_ids.len() + 7) / 8;
        self.tuple_mut(tuple)?.byte_size = Some(offset + null_indicator_bytes);
        Ok(())
    }

    /// One line per tuple, for trace logging.
    pub fn debug_string(&self) -> String {
        let mut out = String::new();
        for tuple in &self.tuples {
            let _ = write!(out, "tuple {}: [", tuple.id);
            for (i, slot_id) in tuple.slots.iter().enumerate() {
                if i > 0 {
                    let _ = write!(out, " ");
                }
                let slot = &self.slots[slot_id.as_usize()];
                let _ = write!(
                    out,
                    "{}:{}{}",
                    slot.id,
                    slot.label,
                    if slot.is_materialized { "*" } else { "" }
                );
            }
            let _ = writeln!(
                out,
                "] size={}",
                tuple
                    .byte_size
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "?".to_string())
            );
        }
        out
    }
}

/// Width in bytes of a materialized value of the given type.
fn slot_byte_width(data_type: &DataType) -> Result<usize> {
    match data_type {
        DataType::Boolean => Ok(1),
        DataType::Utf8 | DataType::LargeUtf8 => Ok(16),
        other => match other.primitive_width() {
            Some(width) => Ok(width),
            None => internal_err!("type {other} cannot be materialized into a slot"),
        },
    }
}
