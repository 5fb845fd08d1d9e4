//! Transactional record of one operation's writes.

use std::collections::HashMap;

use serde::Serialize;
use voxedit_core::{BlockPos, BlockValue, VoxelStore};

/// One changed cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MutationRecord {
    pub pos: BlockPos,
    /// Value before the operation first touched the cell.
    pub previous: BlockValue,
    /// Value after the operation's last write to the cell.
    pub current: BlockValue,
}

/// Ordered writes of one operation, one record per cell.
///
/// A repeated write to a cell keeps the first `previous` and only updates
/// `current`, so undoing restores the pre-operation value.
#[derive(Debug, Clone, Default)]
pub struct MutationBatch {
    records: Vec<MutationRecord>,
    index: HashMap<BlockPos, usize>,
}

impl MutationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a write that has already been applied to the store.
    pub fn record(&mut self, pos: BlockPos, previous: BlockValue, current: BlockValue) {
        match self.index.get(&pos) {
            Some(&slot) => self.records[slot].current = current,
            None => {
                self.index.insert(pos, self.records.len());
                self.records.push(MutationRecord {
                    pos,
                    previous,
                    current,
                });
            }
        }
    }

    /// Number of distinct cells changed.
    pub fn affected(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        self.index.contains_key(&pos)
    }

    pub fn records(&self) -> &[MutationRecord] {
        &self.records
    }

    /// Restore every `previous` value, newest record first.
    pub fn undo<S: VoxelStore + ?Sized>(&self, store: &mut S) -> usize {
        self.records
            .iter()
            .rev()
            .filter(|record| store.set_block(record.pos, record.previous))
            .count()
    }

    /// Re-apply every `current` value in recorded order.
    pub fn redo<S: VoxelStore + ?Sized>(&self, store: &mut S) -> usize {
        self.records
            .iter()
            .filter(|record| store.set_block(record.pos, record.current))
            .count()
    }

    /// Undo and discard the batch.
    pub fn rollback<S: VoxelStore + ?Sized>(self, store: &mut S) -> usize {
        self.undo(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxedit_core::block::ids;
    use voxedit_testkit::MemStore;

    fn apply(batch: &mut MutationBatch, store: &mut MemStore, pos: BlockPos, value: BlockValue) {
        let previous = store.block(pos);
        if store.set_block(pos, value) {
            batch.record(pos, previous, value);
        }
    }

    #[test]
    fn repeated_writes_keep_first_previous() {
        let mut store = MemStore::new(0, 15);
        let pos = BlockPos::new(1, 1, 1);
        store.set_block(pos, BlockValue::of(ids::DIRT));

        let mut batch = MutationBatch::new();
        apply(&mut batch, &mut store, pos, BlockValue::of(ids::STONE));
        apply(&mut batch, &mut store, pos, BlockValue::of(ids::GRASS));
        assert_eq!(batch.affected(), 1);
        assert_eq!(batch.records()[0].previous, BlockValue::of(ids::DIRT));
        assert_eq!(batch.records()[0].current, BlockValue::of(ids::GRASS));

        batch.rollback(&mut store);
        assert_eq!(store.block(pos), BlockValue::of(ids::DIRT));
    }

    #[test]
    fn undo_then_redo_roundtrips() {
        let mut store = MemStore::new(0, 15);
        let mut batch = MutationBatch::new();
        for x in 0..4 {
            apply(&mut batch, &mut store, BlockPos::new(x, 0, 0), BlockValue::of(ids::STONE));
        }
        let after = store.clone();
        assert_eq!(batch.undo(&mut store), 4);
        assert_eq!(store.solid_count(), 0);
        assert_eq!(batch.redo(&mut store), 4);
        assert_eq!(store, after);
    }
}
