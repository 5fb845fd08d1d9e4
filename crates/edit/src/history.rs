//! Bounded undo/redo stack of committed batches.

use std::collections::VecDeque;

use voxedit_core::VoxelStore;

use crate::batch::MutationBatch;

#[derive(Debug, Clone)]
pub struct EditHistory {
    batches: VecDeque<MutationBatch>,
    /// Number of batches currently applied; `batches[cursor..]` is the redo tail.
    cursor: usize,
    capacity: usize,
}

impl EditHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            batches: VecDeque::with_capacity(capacity),
            cursor: 0,
            capacity,
        }
    }

    /// Push a committed batch, discarding the redo tail and the oldest
    /// entries beyond capacity.
    pub fn push(&mut self, batch: MutationBatch) {
        if self.capacity == 0 || batch.is_empty() {
            return;
        }
        self.batches.truncate(self.cursor);
        self.batches.push_back(batch);
        while self.batches.len() > self.capacity {
            self.batches.pop_front();
        }
        self.cursor = self.batches.len();
    }

    /// Undo the newest applied batch. Returns false when nothing is left.
    pub fn undo<S: VoxelStore + ?Sized>(&mut self, store: &mut S) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.batches[self.cursor].undo(store);
        true
    }

    /// Re-apply the oldest undone batch. Returns false when nothing is left.
    pub fn redo<S: VoxelStore + ?Sized>(&mut self, store: &mut S) -> bool {
        let Some(batch) = self.batches.get(self.cursor) else {
            return false;
        };
        batch.redo(store);
        self.cursor += 1;
        true
    }

    pub fn undo_depth(&self) -> usize {
        self.cursor
    }

    pub fn redo_depth(&self) -> usize {
        self.batches.len() - self.cursor
    }
}
