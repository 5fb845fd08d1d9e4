use std::collections::HashSet;

use voxedit_core::{BlockPos, VoxelStore};

use super::within_disk;
use crate::error::EditResult;
use crate::pattern::Pattern;
use crate::session::EditSession;

/// Fill the hole below `origin`.
///
/// The origin layer is flooded through 4-connected air inside the disk of
/// `radius`; each reached column is then filled downward while air, at most
/// `depth` cells deep.
pub fn fill<S: VoxelStore + ?Sized>(
    session: &mut EditSession<'_, S>,
    origin: BlockPos,
    pattern: &mut Pattern,
    radius: f64,
    depth: i32,
) -> EditResult<usize> {
    if !session.contains_y(origin.y) {
        return Ok(0);
    }
    let bottom = (origin.y - depth + 1).max(session.min_y());
    let mut affected = 0;
    let mut visited = HashSet::new();
    let mut stack = vec![origin];

    while let Some(pos) = stack.pop() {
        session.checkpoint()?;
        if !visited.insert(pos) {
            continue;
        }
        if !within_disk(origin, pos, radius) || !session.block(pos).is_air() {
            continue;
        }
        affected += fill_column(session, pos, bottom, pattern)?;
        stack.extend(
            pos.lateral_neighbors()
                .into_iter()
                .filter(|next| !visited.contains(next)),
        );
    }
    Ok(affected)
}

fn fill_column<S: VoxelStore + ?Sized>(
    session: &mut EditSession<'_, S>,
    top: BlockPos,
    bottom: i32,
    pattern: &mut Pattern,
) -> EditResult<usize> {
    let mut affected = 0;
    for y in (bottom..=top.y).rev() {
        let pos = BlockPos::new(top.x, y, top.z);
        if !session.block(pos).is_air() {
            break;
        }
        if session.set_block(pos, pattern.generate(pos))? {
            affected += 1;
        }
    }
    Ok(affected)
}

/// Fill every air cell 6-connected to `origin` inside the cylinder of
/// `radius` reaching `depth` layers down from the origin layer.
pub fn fill_recursive<S: VoxelStore + ?Sized>(
    session: &mut EditSession<'_, S>,
    origin: BlockPos,
    pattern: &mut Pattern,
    radius: f64,
    depth: i32,
) -> EditResult<usize> {
    let bottom = (origin.y - depth + 1).max(session.min_y());
    let top = origin.y.min(session.max_y());
    let mut affected = 0;
    let mut visited = HashSet::new();
    let mut stack = vec![origin];

    while let Some(pos) = stack.pop() {
        session.checkpoint()?;
        if !visited.insert(pos) {
            continue;
        }
        if pos.y < bottom || pos.y > top || !within_disk(origin, pos, radius) {
            continue;
        }
        if !session.block(pos).is_air() {
            continue;
        }
        if session.set_block(pos, pattern.generate(pos))? {
            affected += 1;
        }
        stack.extend(
            pos.neighbors()
                .into_iter()
                .filter(|next| !visited.contains(next)),
        );
    }
    Ok(affected)
}
