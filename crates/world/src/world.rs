//! A loaded dimension: chunked voxels, entities and pending world effects.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;
use voxedit_core::{BlockPos, BlockValue, DimensionId, SimTick, VoxelStore};

use crate::chunk::{ChunkPos, LocalPos, CHUNK_SIZE_X, CHUNK_SIZE_Z, WORLD_MAX_Y, WORLD_MIN_Y};
use crate::entity::{EntityId, EntityKind, EntityStore, EntityTypeFilter, KillFlags};
use crate::flat::FlatGenerator;
use crate::storage::ChunkStorage;

/// Default number of resident chunks per world.
pub const DEFAULT_CHUNK_CAPACITY: usize = 4096;

/// Side effects produced by world operations, drained by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum WorldEffect {
    /// Cosmetic lightning strike.
    Lightning { x: f64, y: f64, z: f64, tick: u64 },
}

/// One dimension's state.
#[derive(Debug)]
pub struct World {
    dimension: DimensionId,
    chunks: ChunkStorage,
    entities: EntityStore,
    tick: SimTick,
    effects: Vec<WorldEffect>,
    dirty_chunks: BTreeSet<ChunkPos>,
}

impl World {
    pub fn new(dimension: DimensionId, chunk_capacity: usize) -> Self {
        Self {
            dimension,
            chunks: ChunkStorage::new(chunk_capacity),
            entities: EntityStore::new(),
            tick: SimTick::ZERO,
            effects: Vec::new(),
            dirty_chunks: BTreeSet::new(),
        }
    }

    /// Create a world with the square of chunks `-radius..=radius` generated flat.
    pub fn flat(dimension: DimensionId, generator: &FlatGenerator, chunk_radius: i32) -> Self {
        let side = (2 * chunk_radius.max(0) + 1) as usize;
        let mut world = Self::new(dimension, DEFAULT_CHUNK_CAPACITY.max(side * side));
        world.generate_flat(generator, chunk_radius);
        world
    }

    /// Overwrite the square of chunks `-radius..=radius` with flat terrain.
    pub fn generate_flat(&mut self, generator: &FlatGenerator, chunk_radius: i32) {
        for cz in -chunk_radius..=chunk_radius {
            for cx in -chunk_radius..=chunk_radius {
                let pos = ChunkPos::new(cx, cz);
                *self.chunks.ensure_chunk(pos) = generator.generate_chunk(pos);
            }
        }
        debug!(dimension = %self.dimension, chunks = self.chunks.len(), "flat terrain generated");
    }

    pub fn dimension(&self) -> DimensionId {
        self.dimension
    }

    pub fn tick_count(&self) -> SimTick {
        self.tick
    }

    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    /// Resident chunk count.
    pub fn loaded_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Chunks spilled out of the resident set so far; their blocks are kept.
    pub fn chunk_evictions(&self) -> u64 {
        self.chunks.evictions()
    }

    pub fn spawn_entity(&mut self, kind: EntityKind, x: f64, y: f64, z: f64) -> EntityId {
        self.entities.spawn(kind, x, y, z)
    }

    /// Kill mobs around `origin`; a negative radius covers the whole world.
    ///
    /// With [`KillFlags::WITH_LIGHTNING`] a lightning effect is queued at each
    /// victim's position before it is removed.
    pub fn kill_mobs(&mut self, origin: BlockPos, radius: f64, flags: KillFlags) -> usize {
        let victims = self.entities.kill_mobs(origin, radius, flags);
        if flags.contains(KillFlags::WITH_LIGHTNING) {
            let tick = self.tick.0;
            self.effects.extend(victims.iter().map(|victim| WorldEffect::Lightning {
                x: victim.x,
                y: victim.y,
                z: victim.z,
                tick,
            }));
        }
        debug!(
            dimension = %self.dimension,
            killed = victims.len(),
            flags = ?flags,
            "killed mobs"
        );
        victims.len()
    }

    /// Mark entities of one category for removal on the next tick.
    pub fn remove_entities(&mut self, filter: EntityTypeFilter, origin: BlockPos, radius: i32) -> usize {
        let marked = self.entities.remove_entities(filter, origin, radius);
        debug!(dimension = %self.dimension, ?filter, marked, "marked entities for removal");
        marked
    }

    /// Advance one tick and purge entities marked for removal.
    pub fn tick(&mut self) {
        self.tick = self.tick.advance(1);
        let purged = self.entities.purge_removed();
        if purged > 0 {
            debug!(dimension = %self.dimension, tick = self.tick.0, purged, "purged entities");
        }
    }

    /// Drain queued world effects.
    pub fn take_effects(&mut self) -> Vec<WorldEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Drain the set of chunks whose blocks changed since the last call.
    pub fn take_dirty_chunks(&mut self) -> Vec<ChunkPos> {
        for chunk in self.chunks.iter_mut() {
            chunk.take_dirty_flags();
        }
        std::mem::take(&mut self.dirty_chunks).into_iter().collect()
    }
}

impl VoxelStore for World {
    fn block(&self, pos: BlockPos) -> BlockValue {
        LocalPos::from_world(pos)
            .and_then(|(chunk_pos, local)| self.chunks.get(chunk_pos).map(|c| c.block(local)))
            .unwrap_or(BlockValue::AIR)
    }

    fn set_block(&mut self, pos: BlockPos, value: BlockValue) -> bool {
        let Some((chunk_pos, local)) = LocalPos::from_world(pos) else {
            return false;
        };
        let changed = match self.chunks.get_mut(chunk_pos) {
            Some(chunk) => chunk.set_block(local, value),
            // Writing air into an absent chunk is a no-op.
            None if value.is_air() => false,
            None => self.chunks.ensure_chunk(chunk_pos).set_block(local, value),
        };
        if changed {
            self.dirty_chunks.insert(chunk_pos);
        }
        changed
    }

    fn min_y(&self) -> i32 {
        WORLD_MIN_Y
    }

    fn max_y(&self) -> i32 {
        WORLD_MAX_Y
    }

    fn highest_block_y(&self, x: i32, z: i32) -> Option<i32> {
        let chunk = self.chunks.get(ChunkPos::containing(x, z))?;
        let local_x = x.rem_euclid(CHUNK_SIZE_X as i32) as usize;
        let local_z = z.rem_euclid(CHUNK_SIZE_Z as i32) as usize;
        chunk
            .highest_block(local_x, local_z)
            .map(|y| y as i32 + WORLD_MIN_Y)
    }
}

/// Every loaded world, keyed by dimension.
#[derive(Debug, Default)]
pub struct Universe {
    worlds: BTreeMap<DimensionId, World>,
}

impl Universe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a world, replacing any existing world of the same dimension.
    pub fn insert(&mut self, world: World) -> Option<World> {
        self.worlds.insert(world.dimension(), world)
    }

    pub fn get(&self, dimension: DimensionId) -> Option<&World> {
        self.worlds.get(&dimension)
    }

    pub fn get_mut(&mut self, dimension: DimensionId) -> Option<&mut World> {
        self.worlds.get_mut(&dimension)
    }

    /// Worlds in dimension order.
    pub fn worlds_mut(&mut self) -> impl Iterator<Item = &mut World> + '_ {
        self.worlds.values_mut()
    }

    pub fn len(&self) -> usize {
        self.worlds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worlds.is_empty()
    }

    /// Tick every world once.
    pub fn tick_all(&mut self) {
        for world in self.worlds.values_mut() {
            world.tick();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::MobType;
    use voxedit_core::block::ids;

    #[test]
    fn reads_outside_loaded_chunks_are_air() {
        let world = World::new(DimensionId::Overworld, 4);
        assert!(world.block(BlockPos::new(1000, 10, -1000)).is_air());
        assert!(world.block(BlockPos::new(0, -5, 0)).is_air());
        assert_eq!(world.highest_block_y(0, 0), None);
    }

    #[test]
    fn set_block_tracks_dirty_chunks_and_heights() {
        let mut world = World::new(DimensionId::Overworld, 4);
        assert!(world.set_block(BlockPos::new(-1, 40, 3), BlockValue::of(ids::STONE)));
        assert!(!world.set_block(BlockPos::new(-1, 40, 3), BlockValue::of(ids::STONE)));
        assert!(!world.set_block(BlockPos::new(0, 300, 0), BlockValue::of(ids::STONE)));
        assert_eq!(world.highest_block_y(-1, 3), Some(40));
        assert_eq!(world.take_dirty_chunks(), vec![ChunkPos::new(-1, 0)]);
        assert!(world.take_dirty_chunks().is_empty());
    }

    #[test]
    fn writing_air_does_not_allocate_chunks() {
        let mut world = World::new(DimensionId::Overworld, 4);
        assert!(!world.set_block(BlockPos::new(50, 10, 50), BlockValue::AIR));
        assert_eq!(world.loaded_chunks(), 0);
    }

    #[test]
    fn blocks_survive_leaving_the_resident_set() {
        let mut world = World::new(DimensionId::Overworld, 1);
        let stone = BlockPos::new(3, 2, 3);
        world.set_block(stone, BlockValue::of(ids::STONE));
        world.set_block(BlockPos::new(40, 2, 3), BlockValue::of(ids::DIRT));
        assert_eq!(world.loaded_chunks(), 1);
        assert_eq!(world.chunk_evictions(), 1);
        assert_eq!(world.block(stone).id, ids::STONE);
        assert_eq!(world.highest_block_y(3, 3), Some(2));

        assert!(world.set_block(stone, BlockValue::AIR));
        assert!(world.block(stone).is_air());
        assert_eq!(world.block(BlockPos::new(40, 2, 3)).id, ids::DIRT);
    }

    #[test]
    fn flat_world_has_surface() {
        let world = World::flat(DimensionId::Overworld, &FlatGenerator::default(), 1);
        assert_eq!(world.loaded_chunks(), 9);
        assert_eq!(world.highest_block_y(-20, 20), Some(62));
        assert_eq!(world.block(BlockPos::new(5, 62, 5)).id, ids::GRASS);
    }

    #[test]
    fn lightning_is_recorded_per_victim() {
        let mut world = World::new(DimensionId::Overworld, 4);
        world.spawn_entity(EntityKind::mob(MobType::Zombie), 1.5, 64.0, 1.5);
        world.spawn_entity(EntityKind::mob(MobType::Skeleton), 2.5, 64.0, 1.5);
        let killed = world.kill_mobs(BlockPos::new(0, 64, 0), 10.0, KillFlags::WITH_LIGHTNING);
        assert_eq!(killed, 2);
        let effects = world.take_effects();
        assert_eq!(effects.len(), 2);
        assert!(matches!(effects[0], WorldEffect::Lightning { x, .. } if x == 1.5));
    }

    #[test]
    fn tick_purges_marked_entities() {
        let mut world = World::new(DimensionId::Overworld, 4);
        world.spawn_entity(EntityKind::Item, 0.0, 64.0, 0.0);
        assert_eq!(world.remove_entities(EntityTypeFilter::Items, BlockPos::ZERO, -1), 1);
        assert_eq!(world.entities().len(), 1);
        world.tick();
        assert!(world.entities().is_empty());
        assert_eq!(world.tick_count(), SimTick(1));
    }

    #[test]
    fn universe_iterates_in_dimension_order() {
        let mut universe = Universe::new();
        universe.insert(World::new(DimensionId::End, 1));
        universe.insert(World::new(DimensionId::Overworld, 1));
        let order: Vec<_> = universe.worlds_mut().map(|w| w.dimension()).collect();
        assert_eq!(order, vec![DimensionId::Overworld, DimensionId::End]);
    }
}
