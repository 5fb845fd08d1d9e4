//! Small stores and terrain builders shared by edit tests.

use std::collections::{BTreeMap, HashMap};

use voxedit_core::block::ids;
use voxedit_core::{BlockPos, BlockValue, DimensionId, VoxelStore};
use voxedit_world::{FlatGenerator, FlatLayer, World};

/// Sparse in-memory store with a configurable vertical range.
///
/// Reads outside the range are air and writes outside it are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct MemStore {
    cells: HashMap<BlockPos, BlockValue>,
    min_y: i32,
    max_y: i32,
}

impl MemStore {
    /// Empty store spanning `min_y..=max_y`.
    pub fn new(min_y: i32, max_y: i32) -> Self {
        Self {
            cells: HashMap::new(),
            min_y,
            max_y,
        }
    }

    /// Number of non-air cells.
    pub fn solid_count(&self) -> usize {
        self.cells.len()
    }

    /// Every non-air cell, sorted by position.
    pub fn cells(&self) -> Vec<(BlockPos, BlockValue)> {
        let mut cells: Vec<_> = self.cells.iter().map(|(p, v)| (*p, *v)).collect();
        cells.sort();
        cells
    }
}

impl VoxelStore for MemStore {
    fn block(&self, pos: BlockPos) -> BlockValue {
        self.cells.get(&pos).copied().unwrap_or(BlockValue::AIR)
    }

    fn set_block(&mut self, pos: BlockPos, value: BlockValue) -> bool {
        if !self.contains_y(pos.y) || self.block(pos) == value {
            return false;
        }
        if value.is_air() {
            self.cells.remove(&pos);
        } else {
            self.cells.insert(pos, value);
        }
        true
    }

    fn min_y(&self) -> i32 {
        self.min_y
    }

    fn max_y(&self) -> i32 {
        self.max_y
    }
}

/// Inclusive cuboid walk in x, z, y order.
pub fn cuboid(min: BlockPos, max: BlockPos) -> impl Iterator<Item = BlockPos> {
    (min.y..=max.y).flat_map(move |y| {
        (min.z..=max.z).flat_map(move |z| (min.x..=max.x).map(move |x| BlockPos::new(x, y, z)))
    })
}

/// Set every cell of the inclusive cuboid to `value`.
pub fn fill_cuboid<S: VoxelStore>(store: &mut S, min: BlockPos, max: BlockPos, value: BlockValue) {
    for pos in cuboid(min, max) {
        store.set_block(pos, value);
    }
}

/// Count cells of the inclusive cuboid satisfying `pred`.
pub fn count_cells<S, F>(store: &S, min: BlockPos, max: BlockPos, mut pred: F) -> usize
where
    S: VoxelStore,
    F: FnMut(BlockValue) -> bool,
{
    cuboid(min, max).filter(|pos| pred(store.block(*pos))).count()
}

/// Histogram of block names (with metadata when set) inside the inclusive
/// cuboid, air included.
pub fn block_histogram<S: VoxelStore>(
    store: &S,
    min: BlockPos,
    max: BlockPos,
) -> BTreeMap<String, usize> {
    let mut histogram = BTreeMap::new();
    for pos in cuboid(min, max) {
        *histogram.entry(store.block(pos).to_string()).or_insert(0) += 1;
    }
    histogram
}

/// Solid stone floor: every cell of the square `-half..=half` from y = 0 to
/// `surface_y` inclusive.
pub fn stone_slab(half: i32, surface_y: i32, max_y: i32) -> MemStore {
    let mut store = MemStore::new(0, max_y);
    fill_cuboid(
        &mut store,
        BlockPos::new(-half, 0, -half),
        BlockPos::new(half, surface_y, half),
        BlockValue::of(ids::STONE),
    );
    store
}

/// Flat overworld of `chunk_radius` chunks around the origin whose grass
/// surface sits at `surface_y`.
pub fn flat_world(surface_y: i32, chunk_radius: i32) -> World {
    let generator = FlatGenerator::new(vec![
        FlatLayer::new(ids::STONE, (surface_y - 1).max(0) as u32),
        FlatLayer::new(ids::DIRT, 1),
        FlatLayer::new(ids::GRASS, 1),
    ]);
    World::flat(DimensionId::Overworld, &generator, chunk_radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_store_respects_vertical_range() {
        let mut store = MemStore::new(0, 15);
        assert!(!store.set_block(BlockPos::new(0, 16, 0), BlockValue::of(ids::STONE)));
        assert!(store.set_block(BlockPos::new(0, 15, 0), BlockValue::of(ids::STONE)));
        assert!(store.set_block(BlockPos::new(0, 15, 0), BlockValue::AIR));
        assert_eq!(store.solid_count(), 0);
    }

    #[test]
    fn stone_slab_fills_square() {
        let store = stone_slab(2, 3, 15);
        assert_eq!(store.solid_count(), 5 * 5 * 4);
        assert_eq!(store.highest_block_y(2, -2), Some(3));
    }

    #[test]
    fn flat_world_surface_matches_request() {
        let world = flat_world(10, 0);
        assert_eq!(world.highest_block_y(3, 3), Some(10));
        assert_eq!(world.block(BlockPos::new(3, 9, 3)).id, ids::DIRT);
    }

    #[test]
    fn histogram_names_blocks() {
        let store = stone_slab(0, 0, 15);
        let histogram = block_histogram(&store, BlockPos::ZERO, BlockPos::new(0, 1, 0));
        assert_eq!(histogram.get("stone"), Some(&1));
        assert_eq!(histogram.get("air"), Some(&1));
    }
}
