//! Property-based tests for block storage across chunk seams
//!
//! Critical invariants:
//! - A write is read back at the same world position, including negative columns
//! - The cached column height always equals a full downward scan
//! - Only chunks that actually changed are reported dirty

use std::collections::BTreeSet;

use proptest::prelude::*;
use voxedit_core::{BlockPos, BlockValue, DimensionId, VoxelStore};
use voxedit_world::{ChunkPos, World, WORLD_MAX_Y};

fn scanned_height(world: &World, x: i32, z: i32) -> Option<i32> {
    (0..=WORLD_MAX_Y)
        .rev()
        .find(|&y| !world.block(BlockPos::new(x, y, z)).is_air())
}

fn write_strategy() -> impl Strategy<Value = (BlockPos, BlockValue)> {
    (
        -40i32..40,
        0i32..=WORLD_MAX_Y,
        -40i32..40,
        prop_oneof![Just(0u16), 1u16..20],
    )
        .prop_map(|(x, y, z, id)| (BlockPos::new(x, y, z), BlockValue::of(id)))
}

proptest! {
    /// Property: the height cache agrees with a scan after any write sequence
    #[test]
    fn height_cache_matches_scan(writes in prop::collection::vec(write_strategy(), 1..200)) {
        let mut world = World::new(DimensionId::Overworld, 64);
        for (pos, value) in &writes {
            world.set_block(*pos, *value);
        }
        for (pos, _) in &writes {
            prop_assert_eq!(
                world.highest_block_y(pos.x, pos.z),
                scanned_height(&world, pos.x, pos.z),
                "column ({}, {})", pos.x, pos.z
            );
        }
    }

    /// Property: the last write to a position wins, on either side of a seam
    #[test]
    fn last_write_wins(writes in prop::collection::vec(write_strategy(), 1..100)) {
        let mut world = World::new(DimensionId::Overworld, 64);
        let mut expected = std::collections::HashMap::new();
        for (pos, value) in &writes {
            world.set_block(*pos, *value);
            expected.insert(*pos, *value);
        }
        for (pos, value) in expected {
            prop_assert_eq!(world.block(pos), value);
        }
    }

    /// Property: dirty chunks are exactly the chunks holding changed cells
    #[test]
    fn dirty_chunks_cover_changed_cells(writes in prop::collection::vec(write_strategy(), 1..100)) {
        let mut world = World::new(DimensionId::Overworld, 64);
        let mut changed = BTreeSet::new();
        for (pos, value) in &writes {
            if world.set_block(*pos, *value) {
                changed.insert(ChunkPos::containing(pos.x, pos.z));
            }
        }
        let dirty: BTreeSet<_> = world.take_dirty_chunks().into_iter().collect();
        prop_assert_eq!(dirty, changed);
    }
}
