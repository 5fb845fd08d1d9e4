use std::collections::HashSet;

use voxedit_core::block::{ids, is_liquid};
use voxedit_core::{BlockId, BlockPos, BlockValue, VoxelStore};

use super::{seed_cube, within_disk};
use crate::error::EditResult;
use crate::session::EditSession;

/// A liquid's flowing/stationary id pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liquid {
    Water,
    Lava,
}

impl Liquid {
    pub const fn flowing(self) -> BlockId {
        match self {
            Liquid::Water => ids::WATER,
            Liquid::Lava => ids::LAVA,
        }
    }

    pub const fn stationary(self) -> BlockId {
        match self {
            Liquid::Water => ids::STATIONARY_WATER,
            Liquid::Lava => ids::STATIONARY_LAVA,
        }
    }

    fn is_either(self, id: BlockId) -> bool {
        id == self.flowing() || id == self.stationary()
    }
}

/// Replace every liquid cell connected to the 3×3×3 around `origin` with air.
pub fn drain_area<S: VoxelStore + ?Sized>(
    session: &mut EditSession<'_, S>,
    origin: BlockPos,
    radius: f64,
) -> EditResult<usize> {
    let mut affected = 0;
    let mut visited = HashSet::new();
    let mut stack: Vec<BlockPos> = seed_cube(origin).collect();

    while let Some(pos) = stack.pop() {
        session.checkpoint()?;
        if !visited.insert(pos) {
            continue;
        }
        if !session.contains_y(pos.y) || !within_disk(origin, pos, radius) {
            continue;
        }
        if !is_liquid(session.block(pos).id) {
            continue;
        }
        if session.set_block(pos, BlockValue::AIR)? {
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

/// Turn every flowing cell of `liquid` connected to the 3×3×3 around
/// `origin` into its stationary form. Spreads sideways and down only.
pub fn fix_liquid<S: VoxelStore + ?Sized>(
    session: &mut EditSession<'_, S>,
    origin: BlockPos,
    radius: f64,
    liquid: Liquid,
) -> EditResult<usize> {
    let stationary = BlockValue::of(liquid.stationary());
    let mut affected = 0;
    let mut visited = HashSet::new();
    let mut stack: Vec<BlockPos> = seed_cube(origin).collect();

    while let Some(pos) = stack.pop() {
        session.checkpoint()?;
        if !visited.insert(pos) {
            continue;
        }
        if !session.contains_y(pos.y) || !within_disk(origin, pos, radius) {
            continue;
        }
        let id = session.block(pos).id;
        if !liquid.is_either(id) {
            continue;
        }
        if id == liquid.flowing() && session.set_block(pos, stationary)? {
            affected += 1;
        }
        let [north, south, east, west] = pos.lateral_neighbors();
        for next in [north, south, east, west, pos.down()] {
            if !visited.contains(&next) {
                stack.push(next);
            }
        }
    }
    Ok(affected)
}
