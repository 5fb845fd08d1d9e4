use voxedit_core::block::{can_pass_through, ids, is_liquid, is_translucent, is_water};
use voxedit_core::{BlockPos, BlockValue, VoxelStore};

use super::disk_columns;
use crate::error::EditResult;
use crate::session::EditSession;

/// Freeze topmost water and cover exposed solid tops with a snow layer.
pub fn simulate_snow<S: VoxelStore + ?Sized>(
    session: &mut EditSession<'_, S>,
    origin: BlockPos,
    radius: f64,
) -> EditResult<usize> {
    let mut affected = 0;
    for (x, z) in disk_columns(origin, radius) {
        session.checkpoint()?;
        let Some(y) = session.highest_block_y(x, z) else {
            continue;
        };
        let top = BlockPos::new(x, y, z);
        let id = session.block(top).id;
        let changed = if is_water(id) {
            session.set_block(top, BlockValue::of(ids::ICE))?
        } else if is_translucent(id) || y >= session.max_y() {
            false
        } else {
            session.set_block(top.up(), BlockValue::of(ids::SNOW))?
        };
        if changed {
            affected += 1;
        }
    }
    Ok(affected)
}

/// Melt topmost ice to water and clear topmost snow layers.
pub fn thaw<S: VoxelStore + ?Sized>(
    session: &mut EditSession<'_, S>,
    origin: BlockPos,
    radius: f64,
) -> EditResult<usize> {
    let mut affected = 0;
    for (x, z) in disk_columns(origin, radius) {
        session.checkpoint()?;
        let Some(y) = session.highest_block_y(x, z) else {
            continue;
        };
        let top = BlockPos::new(x, y, z);
        let replacement = match session.block(top).id {
            ids::ICE => BlockValue::of(ids::STATIONARY_WATER),
            ids::SNOW => BlockValue::AIR,
            _ => continue,
        };
        if session.set_block(top, replacement)? {
            affected += 1;
        }
    }
    Ok(affected)
}

/// Turn the topmost dirt of each column into grass, looking past plants and
/// other pass-through blocks.
pub fn green<S: VoxelStore + ?Sized>(
    session: &mut EditSession<'_, S>,
    origin: BlockPos,
    radius: f64,
) -> EditResult<usize> {
    let mut affected = 0;
    for (x, z) in disk_columns(origin, radius) {
        session.checkpoint()?;
        let Some(top) = session.highest_block_y(x, z) else {
            continue;
        };
        for y in (session.min_y()..=top).rev() {
            let pos = BlockPos::new(x, y, z);
            let id = session.block(pos).id;
            if id == ids::DIRT {
                if session.set_block(pos, BlockValue::of(ids::GRASS))? {
                    affected += 1;
                }
                break;
            }
            if is_liquid(id) || !can_pass_through(id) {
                break;
            }
        }
    }
    Ok(affected)
}
