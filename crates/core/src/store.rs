//! The voxel storage contract used by the edit engine.

use crate::{BlockPos, BlockValue};

/// Read/write access to block values at world coordinates.
///
/// Implementations own their persistence; the engine only reads and writes
/// through this trait. Positions outside `min_y()..=max_y()` read as air and
/// ignore writes.
pub trait VoxelStore {
    /// Block currently stored at `pos`.
    fn block(&self, pos: BlockPos) -> BlockValue;

    /// Store `value` at `pos`. Returns `true` only when the stored value changed.
    fn set_block(&mut self, pos: BlockPos, value: BlockValue) -> bool;

    /// Lowest addressable layer.
    fn min_y(&self) -> i32 {
        0
    }

    /// Highest addressable layer.
    fn max_y(&self) -> i32;

    /// Y of the topmost non-air block in the column, if any.
    ///
    /// The default scans down from `max_y()`; stores with a height cache
    /// should override it.
    fn highest_block_y(&self, x: i32, z: i32) -> Option<i32> {
        (self.min_y()..=self.max_y())
            .rev()
            .find(|&y| !self.block(BlockPos::new(x, y, z)).is_air())
    }

    /// True when `y` is addressable.
    fn contains_y(&self, y: i32) -> bool {
        (self.min_y()..=self.max_y()).contains(&y)
    }
}
