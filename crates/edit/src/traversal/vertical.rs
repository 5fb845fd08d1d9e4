use voxedit_core::{BlockId, BlockPos, BlockValue, VoxelStore};

use crate::error::EditResult;
use crate::session::EditSession;

fn clear_columns<S, F>(
    session: &mut EditSession<'_, S>,
    origin: BlockPos,
    size: i32,
    layers: std::ops::RangeInclusive<i32>,
    mut wanted: F,
) -> EditResult<usize>
where
    S: VoxelStore + ?Sized,
    F: FnMut(BlockValue) -> bool,
{
    let mut affected = 0;
    for x in origin.x.saturating_sub(size)..=origin.x.saturating_add(size) {
        for z in origin.z.saturating_sub(size)..=origin.z.saturating_add(size) {
            session.checkpoint()?;
            for y in layers.clone() {
                let pos = BlockPos::new(x, y, z);
                let value = session.block(pos);
                if !value.is_air() && wanted(value) && session.set_block(pos, BlockValue::AIR)? {
                    affected += 1;
                }
            }
        }
    }
    Ok(affected)
}

/// Clear the `height` layers above `origin` over the square of half-width `size`.
pub fn remove_above<S: VoxelStore + ?Sized>(
    session: &mut EditSession<'_, S>,
    origin: BlockPos,
    size: i32,
    height: i32,
) -> EditResult<usize> {
    let top = origin.y.saturating_add(height).min(session.max_y());
    let bottom = (origin.y + 1).max(session.min_y());
    clear_columns(session, origin, size, bottom..=top, |_| true)
}

/// Clear the `height` layers below `origin` over the square of half-width `size`.
pub fn remove_below<S: VoxelStore + ?Sized>(
    session: &mut EditSession<'_, S>,
    origin: BlockPos,
    size: i32,
    height: i32,
) -> EditResult<usize> {
    let bottom = origin.y.saturating_sub(height).max(session.min_y());
    let top = (origin.y - 1).min(session.max_y());
    clear_columns(session, origin, size, bottom..=top, |_| true)
}

/// Clear every cell of type `id` (any metadata) in the square of half-width
/// `size`, over the store's whole height.
pub fn remove_near<S: VoxelStore + ?Sized>(
    session: &mut EditSession<'_, S>,
    origin: BlockPos,
    id: BlockId,
    size: i32,
) -> EditResult<usize> {
    let layers = session.min_y()..=session.max_y();
    clear_columns(session, origin, size, layers, |value| value.id == id)
}
