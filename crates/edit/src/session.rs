//! One in-flight operation against a store.
//!
//! The session holds the store's exclusive borrow for its whole lifetime, so
//! two operations can never interleave on one store. Every write goes through
//! [`EditSession::set_block`], which enforces the clip region, cancellation
//! and the change limit before recording into the batch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use voxedit_core::{BlockPos, BlockValue, VoxelStore};

use crate::batch::MutationBatch;
use crate::error::{EditError, EditResult};
use crate::region::Region;

/// Shared flag that aborts a running operation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Clear the flag so the token can guard another operation.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

pub struct EditSession<'a, S: VoxelStore + ?Sized> {
    store: &'a mut S,
    batch: MutationBatch,
    change_limit: Option<usize>,
    clip: Option<&'a Region>,
    cancel: Option<CancelToken>,
}

impl<'a, S: VoxelStore + ?Sized> EditSession<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self {
            store,
            batch: MutationBatch::new(),
            change_limit: None,
            clip: None,
            cancel: None,
        }
    }

    /// Abort with [`EditError::ChangeLimit`] once more than `limit` cells would change.
    pub fn with_change_limit(mut self, limit: Option<usize>) -> Self {
        self.change_limit = limit;
        self
    }

    /// Silently skip writes outside `clip`.
    pub fn with_clip(mut self, clip: Option<&'a Region>) -> Self {
        self.clip = clip;
        self
    }

    pub fn with_cancel(mut self, cancel: Option<CancelToken>) -> Self {
        self.cancel = cancel;
        self
    }

    #[inline]
    pub fn block(&self, pos: BlockPos) -> BlockValue {
        self.store.block(pos)
    }

    pub fn min_y(&self) -> i32 {
        self.store.min_y()
    }

    pub fn max_y(&self) -> i32 {
        self.store.max_y()
    }

    pub fn contains_y(&self, y: i32) -> bool {
        self.store.contains_y(y)
    }

    pub fn highest_block_y(&self, x: i32, z: i32) -> Option<i32> {
        self.store.highest_block_y(x, z)
    }

    /// Fail fast when the operation has been cancelled.
    pub fn checkpoint(&self) -> EditResult<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(EditError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Write `value` at `pos`. Returns `Ok(true)` only when the cell changed.
    pub fn set_block(&mut self, pos: BlockPos, value: BlockValue) -> EditResult<bool> {
        self.checkpoint()?;
        if self.clip.is_some_and(|clip| !clip.contains(pos)) {
            return Ok(false);
        }
        let previous = self.store.block(pos);
        if previous == value {
            return Ok(false);
        }
        if let Some(limit) = self.change_limit {
            if self.batch.affected() >= limit && !self.batch.contains(pos) {
                return Err(EditError::ChangeLimit { limit });
            }
        }
        if !self.store.set_block(pos, value) {
            return Ok(false);
        }
        self.batch.record(pos, previous, value);
        Ok(true)
    }

    /// Cells changed so far.
    pub fn affected(&self) -> usize {
        self.batch.affected()
    }

    /// Keep the writes and hand back their record.
    pub fn commit(self) -> MutationBatch {
        self.batch
    }

    /// Undo every write made through this session. Returns the cells restored.
    pub fn rollback(self) -> usize {
        self.batch.rollback(self.store)
    }
}
