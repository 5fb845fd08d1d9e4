//! Operation entry points.
//!
//! Each block operation validates its radius, runs one traversal inside a
//! fresh [`EditSession`], then commits the batch into the undo history or
//! rolls it back when the traversal failed.

use tracing::{debug, instrument, warn};
use voxedit_core::block::ids;
use voxedit_core::{BlockId, BlockPos, VoxelStore};
use voxedit_world::{EntityTypeFilter, KillFlags, Universe, World};

use crate::config::EditConfig;
use crate::error::EditResult;
use crate::history::EditHistory;
use crate::mask::BlockMask;
use crate::pattern::Pattern;
use crate::region::Region;
use crate::session::{CancelToken, EditSession};
use crate::traversal::{self, Liquid};

pub struct EditEngine {
    config: EditConfig,
    history: EditHistory,
    clip: Option<Region>,
    cancel: Option<CancelToken>,
}

impl EditEngine {
    pub fn new(config: EditConfig) -> Self {
        let history = EditHistory::new(config.history_size);
        Self {
            config,
            history,
            clip: None,
            cancel: None,
        }
    }

    pub fn config(&self) -> &EditConfig {
        &self.config
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    /// Restrict future writes to `clip`; `None` removes the restriction.
    pub fn set_clip(&mut self, clip: Option<Region>) {
        self.clip = clip;
    }

    /// Token observed by every future operation.
    pub fn set_cancel_token(&mut self, token: Option<CancelToken>) {
        self.cancel = token;
    }

    /// Fail when `radius` exceeds the configured maximum.
    pub fn check_max_radius(&self, radius: f64) -> EditResult<()> {
        self.config.check_max_radius(radius)
    }

    fn run<'s, S, F>(&'s mut self, store: &'s mut S, op: &'static str, traverse: F) -> EditResult<usize>
    where
        S: VoxelStore + ?Sized,
        F: FnOnce(&mut EditSession<'s, S>) -> EditResult<usize>,
    {
        let mut session = EditSession::new(store)
            .with_change_limit(self.config.change_limit())
            .with_clip(self.clip.as_ref())
            .with_cancel(self.cancel.clone());
        match traverse(&mut session) {
            Ok(affected) => {
                let batch = session.commit();
                debug!(op, affected, records = batch.affected(), "edit committed");
                self.history.push(batch);
                Ok(affected)
            }
            Err(err) => {
                let restored = session.rollback();
                warn!(op, %err, restored, "edit rolled back");
                Err(err)
            }
        }
    }

    /// Fill the hole under `origin` column by column.
    #[instrument(skip(self, store, pattern))]
    pub fn fill<S: VoxelStore + ?Sized>(
        &mut self,
        store: &mut S,
        origin: BlockPos,
        pattern: &mut Pattern,
        radius: f64,
        depth: i32,
    ) -> EditResult<usize> {
        self.check_max_radius(radius)?;
        self.run(store, "fill", |session| {
            traversal::fill(session, origin, pattern, radius, depth)
        })
    }

    /// Fill every air cell connected to `origin` within the radius/depth cylinder.
    #[instrument(skip(self, store, pattern))]
    pub fn fill_recursive<S: VoxelStore + ?Sized>(
        &mut self,
        store: &mut S,
        origin: BlockPos,
        pattern: &mut Pattern,
        radius: f64,
        depth: i32,
    ) -> EditResult<usize> {
        self.check_max_radius(radius)?;
        self.run(store, "fill_recursive", |session| {
            traversal::fill_recursive(session, origin, pattern, radius, depth)
        })
    }

    #[instrument(skip(self, store))]
    pub fn drain_area<S: VoxelStore + ?Sized>(
        &mut self,
        store: &mut S,
        origin: BlockPos,
        radius: f64,
    ) -> EditResult<usize> {
        self.check_max_radius(radius)?;
        self.run(store, "drain", |session| {
            traversal::drain_area(session, origin, radius)
        })
    }

    #[instrument(skip(self, store))]
    pub fn fix_liquid<S: VoxelStore + ?Sized>(
        &mut self,
        store: &mut S,
        origin: BlockPos,
        radius: f64,
        liquid: Liquid,
    ) -> EditResult<usize> {
        self.check_max_radius(radius)?;
        let op = match liquid {
            Liquid::Water => "fix_water",
            Liquid::Lava => "fix_lava",
        };
        self.run(store, op, |session| {
            traversal::fix_liquid(session, origin, radius, liquid)
        })
    }

    #[instrument(skip(self, store))]
    pub fn remove_above<S: VoxelStore + ?Sized>(
        &mut self,
        store: &mut S,
        origin: BlockPos,
        size: i32,
        height: i32,
    ) -> EditResult<usize> {
        self.check_max_radius(f64::from(size))?;
        self.run(store, "remove_above", |session| {
            traversal::remove_above(session, origin, size, height)
        })
    }

    #[instrument(skip(self, store))]
    pub fn remove_below<S: VoxelStore + ?Sized>(
        &mut self,
        store: &mut S,
        origin: BlockPos,
        size: i32,
        height: i32,
    ) -> EditResult<usize> {
        self.check_max_radius(f64::from(size))?;
        self.run(store, "remove_below", |session| {
            traversal::remove_below(session, origin, size, height)
        })
    }

    #[instrument(skip(self, store))]
    pub fn remove_near<S: VoxelStore + ?Sized>(
        &mut self,
        store: &mut S,
        origin: BlockPos,
        id: BlockId,
        size: i32,
    ) -> EditResult<usize> {
        self.check_max_radius(f64::from(size))?;
        self.run(store, "remove_near", |session| {
            traversal::remove_near(session, origin, id, size)
        })
    }

    /// `remove_near` on fire.
    pub fn extinguish<S: VoxelStore + ?Sized>(
        &mut self,
        store: &mut S,
        origin: BlockPos,
        size: i32,
    ) -> EditResult<usize> {
        self.remove_near(store, origin, ids::FIRE, size)
    }

    /// Replace selected cells of `region`. The caller checks the radius it
    /// derived the region from.
    #[instrument(skip(self, store, region, from, to))]
    pub fn replace_blocks<S: VoxelStore + ?Sized>(
        &mut self,
        store: &mut S,
        region: &Region,
        from: Option<&BlockMask>,
        to: &mut Pattern,
    ) -> EditResult<usize> {
        let count_unchanged = self.config.count_unchanged_replacements;
        self.run(store, "replace", |session| {
            traversal::replace_blocks(session, region, from, to, count_unchanged)
        })
    }

    #[instrument(skip(self, store))]
    pub fn simulate_snow<S: VoxelStore + ?Sized>(
        &mut self,
        store: &mut S,
        origin: BlockPos,
        radius: f64,
    ) -> EditResult<usize> {
        self.check_max_radius(radius)?;
        self.run(store, "snow", |session| {
            traversal::simulate_snow(session, origin, radius)
        })
    }

    #[instrument(skip(self, store))]
    pub fn thaw<S: VoxelStore + ?Sized>(
        &mut self,
        store: &mut S,
        origin: BlockPos,
        radius: f64,
    ) -> EditResult<usize> {
        self.check_max_radius(radius)?;
        self.run(store, "thaw", |session| traversal::thaw(session, origin, radius))
    }

    #[instrument(skip(self, store))]
    pub fn green<S: VoxelStore + ?Sized>(
        &mut self,
        store: &mut S,
        origin: BlockPos,
        radius: f64,
    ) -> EditResult<usize> {
        self.check_max_radius(radius)?;
        self.run(store, "green", |session| traversal::green(session, origin, radius))
    }

    /// Kill mobs in one world; a negative radius covers the whole world.
    pub fn kill_mobs(&self, world: &mut World, origin: BlockPos, radius: i32, flags: KillFlags) -> usize {
        world.kill_mobs(origin, f64::from(radius), flags)
    }

    /// Kill mobs in every loaded world, measuring from each world's origin.
    pub fn kill_mobs_everywhere(&self, universe: &mut Universe, radius: i32, flags: KillFlags) -> usize {
        universe
            .worlds_mut()
            .map(|world| world.kill_mobs(BlockPos::ZERO, f64::from(radius), flags))
            .sum()
    }

    /// Mark entities of one category for removal; radius -1 is unbounded.
    pub fn remove_entities(
        &self,
        world: &mut World,
        filter: EntityTypeFilter,
        origin: BlockPos,
        radius: i32,
    ) -> usize {
        world.remove_entities(filter, origin, radius)
    }

    /// Undo the newest committed operation.
    pub fn undo<S: VoxelStore + ?Sized>(&mut self, store: &mut S) -> bool {
        let undone = self.history.undo(store);
        debug!(undone, depth = self.history.undo_depth(), "undo");
        undone
    }

    /// Re-apply the newest undone operation.
    pub fn redo<S: VoxelStore + ?Sized>(&mut self, store: &mut S) -> bool {
        let redone = self.history.redo(store);
        debug!(redone, depth = self.history.redo_depth(), "redo");
        redone
    }
}

impl Default for EditEngine {
    fn default() -> Self {
        Self::new(EditConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditError;
    use voxedit_core::{BlockValue, DimensionId};
    use voxedit_testkit::{stone_slab, MemStore};

    #[test]
    fn radius_is_checked_before_any_write() {
        let mut engine = EditEngine::new(EditConfig {
            max_radius: 4,
            ..EditConfig::default()
        });
        let mut store = MemStore::new(0, 15);
        let mut pattern: Pattern = BlockValue::of(ids::STONE).into();
        let err = engine
            .fill(&mut store, BlockPos::new(0, 5, 0), &mut pattern, 5.0, 1)
            .unwrap_err();
        assert_eq!(err, EditError::MaxRadius { max: 4 });
        assert_eq!(store.solid_count(), 0);
        assert_eq!(engine.history().undo_depth(), 0);
    }

    #[test]
    fn change_limit_rolls_back_everything() {
        let mut engine = EditEngine::new(EditConfig {
            max_changed_blocks: 10,
            ..EditConfig::default()
        });
        let mut store = stone_slab(5, 3, 15);
        let before = store.clone();
        let err = engine
            .remove_above(&mut store, BlockPos::new(0, -1, 0), 5, 10)
            .unwrap_err();
        assert_eq!(err, EditError::ChangeLimit { limit: 10 });
        assert_eq!(store, before);
        assert_eq!(engine.history().undo_depth(), 0);
    }

    #[test]
    fn rollback_restores_chunks_pushed_out_of_residency() {
        let mut engine = EditEngine::new(EditConfig {
            max_changed_blocks: 20,
            ..EditConfig::default()
        });
        let mut world = World::new(DimensionId::Overworld, 1);
        for x in 0..16 {
            for z in 0..16 {
                for y in 0..=4 {
                    world.set_block(BlockPos::new(x, y, z), BlockValue::of(ids::STONE));
                }
            }
        }
        let mut pattern: Pattern = BlockValue::of(ids::DIRT).into();
        let err = engine
            .fill(&mut world, BlockPos::new(15, 5, 3), &mut pattern, 6.0, 1)
            .unwrap_err();
        assert_eq!(err, EditError::ChangeLimit { limit: 20 });
        assert!(world.chunk_evictions() > 0);
        assert_eq!(world.block(BlockPos::new(3, 2, 3)).id, ids::STONE);
        assert_eq!(world.block(BlockPos::new(15, 4, 3)).id, ids::STONE);
        assert!(world.block(BlockPos::new(15, 5, 3)).is_air());
        assert!(world.block(BlockPos::new(16, 5, 3)).is_air());
    }

    #[test]
    fn cancelled_operation_leaves_store_untouched() {
        let mut engine = EditEngine::default();
        let token = CancelToken::new();
        token.cancel();
        engine.set_cancel_token(Some(token));
        let mut store = stone_slab(3, 3, 15);
        let before = store.clone();
        let err = engine
            .green(&mut store, BlockPos::new(0, 4, 0), 3.0)
            .unwrap_err();
        assert_eq!(err, EditError::Cancelled);
        assert_eq!(store, before);
    }

    #[test]
    fn committed_edits_can_be_undone_and_redone() {
        let mut engine = EditEngine::default();
        let mut store = stone_slab(3, 3, 15);
        let before = store.clone();
        let removed = engine.remove_below(&mut store, BlockPos::new(0, 4, 0), 1, 2).unwrap();
        assert_eq!(removed, 18);
        let after = store.clone();

        assert!(engine.undo(&mut store));
        assert_eq!(store, before);
        assert!(!engine.undo(&mut store));
        assert!(engine.redo(&mut store));
        assert_eq!(store, after);
        assert!(!engine.redo(&mut store));
    }

    #[test]
    fn empty_operations_are_not_pushed_to_history() {
        let mut engine = EditEngine::default();
        let mut store = MemStore::new(0, 15);
        assert_eq!(engine.drain_area(&mut store, BlockPos::ZERO, 5.0).unwrap(), 0);
        assert_eq!(engine.history().undo_depth(), 0);
    }

    #[test]
    fn clip_limits_writes() {
        let mut engine = EditEngine::default();
        engine.set_clip(Some(Region::cuboid(
            BlockPos::new(0, 0, 0),
            BlockPos::new(0, 15, 0),
        )));
        let mut store = stone_slab(2, 3, 15);
        let removed = engine.remove_below(&mut store, BlockPos::new(0, 4, 0), 2, 10).unwrap();
        assert_eq!(removed, 4);
    }
}
