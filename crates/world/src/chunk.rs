use std::fmt;

use voxedit_core::{BlockPos, BlockValue};

/// Chunk width (X axis) in voxels.
pub const CHUNK_SIZE_X: usize = 16;
/// Chunk height (Y axis) in voxels.
pub const CHUNK_SIZE_Y: usize = 256;
/// Chunk depth (Z axis) in voxels.
pub const CHUNK_SIZE_Z: usize = 16;
/// Total voxel count per chunk.
pub const CHUNK_VOLUME: usize = CHUNK_SIZE_X * CHUNK_SIZE_Y * CHUNK_SIZE_Z;

/// Lowest world layer.
pub const WORLD_MIN_Y: i32 = 0;
/// Highest world layer.
pub const WORLD_MAX_Y: i32 = CHUNK_SIZE_Y as i32 - 1;

const NO_HEIGHT: i16 = -1;

/// Chunk-local position (X, Y, Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalPos {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl LocalPos {
    /// Split a world position into its chunk and local offset.
    ///
    /// Returns `None` when `pos.y` is outside the world's vertical range.
    pub fn from_world(pos: BlockPos) -> Option<(ChunkPos, LocalPos)> {
        if !(WORLD_MIN_Y..=WORLD_MAX_Y).contains(&pos.y) {
            return None;
        }
        let local = LocalPos {
            x: pos.x.rem_euclid(CHUNK_SIZE_X as i32) as usize,
            y: (pos.y - WORLD_MIN_Y) as usize,
            z: pos.z.rem_euclid(CHUNK_SIZE_Z as i32) as usize,
        };
        Some((ChunkPos::containing(pos.x, pos.z), local))
    }

    /// Convert to a linear index within the voxel array.
    pub fn index(self) -> usize {
        debug_assert!(self.x < CHUNK_SIZE_X);
        debug_assert!(self.y < CHUNK_SIZE_Y);
        debug_assert!(self.z < CHUNK_SIZE_Z);
        (self.y * CHUNK_SIZE_Z + self.z) * CHUNK_SIZE_X + self.x
    }

    fn column(self) -> usize {
        self.z * CHUNK_SIZE_X + self.x
    }
}

/// Chunk coordinate (X,Z) in chunk space.
/// Implements Ord for deterministic iteration in BTreeMap/BTreeSet (sorts by x, then z).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk holding the world column (x, z).
    pub fn containing(x: i32, z: i32) -> Self {
        Self::new(
            x.div_euclid(CHUNK_SIZE_X as i32),
            z.div_euclid(CHUNK_SIZE_Z as i32),
        )
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// Dirty flags set whenever chunk data changes.
    pub struct DirtyFlags: u8 {
        const BLOCKS = 0b0000_0001;
        const HEIGHTS = 0b0000_0010;
    }
}

impl Default for DirtyFlags {
    fn default() -> Self {
        DirtyFlags::empty()
    }
}

/// Chunk storing block values plus a per-column height cache.
#[derive(Debug)]
pub struct Chunk {
    position: ChunkPos,
    voxels: Vec<BlockValue>,
    /// Local Y of the topmost non-air block per column, `NO_HEIGHT` when empty.
    heights: Vec<i16>,
    dirty: DirtyFlags,
}

impl Chunk {
    /// Allocate a fresh chunk filled with air.
    pub fn new(position: ChunkPos) -> Self {
        Self {
            position,
            voxels: vec![BlockValue::AIR; CHUNK_VOLUME],
            heights: vec![NO_HEIGHT; CHUNK_SIZE_X * CHUNK_SIZE_Z],
            dirty: DirtyFlags::empty(),
        }
    }

    #[inline]
    pub fn position(&self) -> ChunkPos {
        self.position
    }

    /// Fetch a block copy.
    pub fn block(&self, local: LocalPos) -> BlockValue {
        self.voxels[local.index()]
    }

    /// Set a block, keeping the height cache current.
    ///
    /// Returns `true` when the stored value changed.
    pub fn set_block(&mut self, local: LocalPos, value: BlockValue) -> bool {
        let idx = local.index();
        if self.voxels[idx] == value {
            return false;
        }
        self.voxels[idx] = value;
        self.dirty.insert(DirtyFlags::BLOCKS);

        let column = local.column();
        let top = self.heights[column];
        let y = local.y as i16;
        if !value.is_air() && y > top {
            self.heights[column] = y;
            self.dirty.insert(DirtyFlags::HEIGHTS);
        } else if value.is_air() && y == top {
            self.heights[column] = self.scan_height(local.x, local.y, local.z);
            self.dirty.insert(DirtyFlags::HEIGHTS);
        }
        true
    }

    /// Fill one whole layer with `value`.
    pub fn fill_layer(&mut self, local_y: usize, value: BlockValue) {
        for z in 0..CHUNK_SIZE_Z {
            for x in 0..CHUNK_SIZE_X {
                self.set_block(LocalPos { x, y: local_y, z }, value);
            }
        }
    }

    /// Local Y of the topmost non-air block in column (x, z).
    pub fn highest_block(&self, x: usize, z: usize) -> Option<usize> {
        let top = self.heights[z * CHUNK_SIZE_X + x];
        (top != NO_HEIGHT).then_some(top as usize)
    }

    fn scan_height(&self, x: usize, below: usize, z: usize) -> i16 {
        (0..below)
            .rev()
            .find(|&y| !self.voxels[LocalPos { x, y, z }.index()].is_air())
            .map_or(NO_HEIGHT, |y| y as i16)
    }

    /// Whether changes are pending since the last [`take_dirty_flags`](Self::take_dirty_flags).
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Consume and return the current dirty flags.
    pub fn take_dirty_flags(&mut self) -> DirtyFlags {
        let flags = self.dirty;
        self.dirty = DirtyFlags::empty();
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxedit_core::block::ids;

    fn local(x: usize, y: usize, z: usize) -> LocalPos {
        LocalPos { x, y, z }
    }

    #[test]
    fn set_and_get_block_marks_dirty() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        assert!(chunk.take_dirty_flags().is_empty());
        let value = BlockValue::new(5, 1);
        assert!(chunk.set_block(local(1, 2, 3), value));
        assert_eq!(chunk.block(local(1, 2, 3)), value);
        assert!(chunk.take_dirty_flags().contains(DirtyFlags::BLOCKS));
    }

    #[test]
    fn test_local_pos_index() {
        assert_eq!(local(0, 0, 0).index(), 0);
        assert_eq!(local(15, 0, 0).index(), 15);
        assert_eq!(local(0, 1, 0).index(), CHUNK_SIZE_Z * CHUNK_SIZE_X);
    }

    #[test]
    fn local_pos_from_world_handles_negative_columns() {
        let (chunk, pos) = LocalPos::from_world(BlockPos::new(-1, 70, 17)).unwrap();
        assert_eq!(chunk, ChunkPos::new(-1, 1));
        assert_eq!(pos, local(15, 70, 1));
        assert!(LocalPos::from_world(BlockPos::new(0, -1, 0)).is_none());
        assert!(LocalPos::from_world(BlockPos::new(0, 256, 0)).is_none());
    }

    #[test]
    fn test_chunk_pos_display() {
        assert_eq!(format!("{}", ChunkPos::new(5, -3)), "(5, -3)");
    }

    #[test]
    fn chunk_pos_containing_floors_negative_columns() {
        assert_eq!(ChunkPos::containing(-17, 33), ChunkPos::new(-2, 2));
        assert_eq!(ChunkPos::containing(-16, 15), ChunkPos::new(-1, 0));
        assert_eq!(ChunkPos::containing(0, -1), ChunkPos::new(0, -1));
    }

    #[test]
    fn test_set_same_block_no_dirty() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        assert!(!chunk.set_block(local(0, 0, 0), BlockValue::AIR));
        assert!(chunk.take_dirty_flags().is_empty());
    }

    #[test]
    fn height_cache_tracks_placement_and_removal() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        assert_eq!(chunk.highest_block(4, 4), None);

        chunk.set_block(local(4, 10, 4), BlockValue::of(ids::STONE));
        chunk.set_block(local(4, 20, 4), BlockValue::of(ids::DIRT));
        assert_eq!(chunk.highest_block(4, 4), Some(20));

        chunk.set_block(local(4, 20, 4), BlockValue::AIR);
        assert_eq!(chunk.highest_block(4, 4), Some(10));

        chunk.set_block(local(4, 10, 4), BlockValue::AIR);
        assert_eq!(chunk.highest_block(4, 4), None);
        assert!(chunk.take_dirty_flags().contains(DirtyFlags::HEIGHTS));
    }

    #[test]
    fn removing_a_lower_block_keeps_height() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        chunk.set_block(local(0, 5, 0), BlockValue::of(ids::STONE));
        chunk.set_block(local(0, 8, 0), BlockValue::of(ids::STONE));
        chunk.set_block(local(0, 5, 0), BlockValue::AIR);
        assert_eq!(chunk.highest_block(0, 0), Some(8));
    }

    #[test]
    fn fill_layer_covers_every_column() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        chunk.fill_layer(3, BlockValue::of(ids::GRASS));
        for z in 0..CHUNK_SIZE_Z {
            for x in 0..CHUNK_SIZE_X {
                assert_eq!(chunk.block(local(x, 3, z)).id, ids::GRASS);
                assert_eq!(chunk.highest_block(x, z), Some(3));
            }
        }
    }

    #[test]
    fn test_chunk_pos_ordering() {
        assert!(ChunkPos::new(0, 0) < ChunkPos::new(1, 0));
        assert!(ChunkPos::new(0, 0) < ChunkPos::new(0, 1));
    }
}
