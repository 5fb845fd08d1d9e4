use voxedit_core::VoxelStore;

use crate::error::EditResult;
use crate::mask::{selects, BlockMask};
use crate::pattern::Pattern;
use crate::region::Region;
use crate::session::EditSession;

/// Overwrite every selected cell of `region` with `to`.
///
/// With `count_unchanged`, selected cells that already hold the generated
/// value are counted too; otherwise only real changes are.
pub fn replace_blocks<S: VoxelStore + ?Sized>(
    session: &mut EditSession<'_, S>,
    region: &Region,
    from: Option<&BlockMask>,
    to: &mut Pattern,
    count_unchanged: bool,
) -> EditResult<usize> {
    let mut affected = 0;
    let (min_y, max_y) = (session.min_y(), session.max_y());
    for pos in region.positions(min_y, max_y) {
        session.checkpoint()?;
        let current = session.block(pos);
        if !selects(from, current) {
            continue;
        }
        let next = to.generate(pos);
        if next == current {
            if count_unchanged {
                affected += 1;
            }
            continue;
        }
        if session.set_block(pos, next)? {
            affected += 1;
        }
    }
    Ok(affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxedit_core::block::ids;
    use voxedit_core::{BlockPos, BlockValue, MatchMode};
    use voxedit_testkit::{fill_cuboid, MemStore};

    fn checkerboard() -> MemStore {
        let mut store = MemStore::new(0, 15);
        for x in 0..4 {
            for z in 0..4 {
                let value = if (x + z) % 2 == 0 {
                    BlockValue::new(ids::CLOTH, 14)
                } else {
                    BlockValue::new(ids::CLOTH, 1)
                };
                store.set_block(BlockPos::new(x, 0, z), value);
            }
        }
        store
    }

    fn whole() -> Region {
        Region::cuboid(BlockPos::ZERO, BlockPos::new(3, 1, 3))
    }

    #[test]
    fn no_mask_replaces_all_non_air() {
        let mut store = checkerboard();
        let mut session = EditSession::new(&mut store);
        let affected = replace_blocks(
            &mut session,
            &whole(),
            None,
            &mut BlockValue::of(ids::STONE).into(),
            false,
        )
        .unwrap();
        session.commit();
        assert_eq!(affected, 16);
        assert!(store.block(BlockPos::new(0, 1, 0)).is_air());
    }

    #[test]
    fn exact_mask_selects_pinned_metadata() {
        let mut store = checkerboard();
        let mask = BlockMask::parse("cloth:14", MatchMode::Exact).unwrap();
        let mut session = EditSession::new(&mut store);
        let affected = replace_blocks(
            &mut session,
            &whole(),
            Some(&mask),
            &mut BlockValue::of(ids::STONE).into(),
            false,
        )
        .unwrap();
        assert_eq!(affected, 8);
    }

    #[test]
    fn ignore_data_mask_selects_every_colour() {
        let mut store = checkerboard();
        let mask = BlockMask::parse("cloth:14", MatchMode::IgnoreData).unwrap();
        let mut session = EditSession::new(&mut store);
        let affected = replace_blocks(
            &mut session,
            &whole(),
            Some(&mask),
            &mut BlockValue::of(ids::STONE).into(),
            false,
        )
        .unwrap();
        assert_eq!(affected, 16);
    }

    #[test]
    fn unchanged_writes_count_only_when_configured() {
        let mut store = MemStore::new(0, 15);
        fill_cuboid(
            &mut store,
            BlockPos::ZERO,
            BlockPos::new(1, 0, 1),
            BlockValue::of(ids::STONE),
        );
        let region = Region::cuboid(BlockPos::ZERO, BlockPos::new(1, 0, 1));
        let mut to: Pattern = BlockValue::of(ids::STONE).into();

        let mut session = EditSession::new(&mut store);
        assert_eq!(replace_blocks(&mut session, &region, None, &mut to, false).unwrap(), 0);
        assert_eq!(replace_blocks(&mut session, &region, None, &mut to, true).unwrap(), 4);
        assert_eq!(session.affected(), 0);
    }

    #[test]
    fn layers_outside_the_store_are_never_visited() {
        let mut store = MemStore::new(0, 15);
        let region = Region::cuboid(BlockPos::new(0, -1_000, 0), BlockPos::new(0, 1_000, 0));
        let mask = BlockMask::parse("air", MatchMode::Exact).unwrap();
        let mut session = EditSession::new(&mut store);
        let counted = replace_blocks(
            &mut session,
            &region,
            Some(&mask),
            &mut BlockValue::AIR.into(),
            true,
        )
        .unwrap();
        assert_eq!(counted, 16);
    }
}
