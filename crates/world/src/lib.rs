mod chunk;
pub mod entity;
mod flat;
mod storage;
mod world;

pub use chunk::*;
pub use entity::{
    Entity, EntityId, EntityKind, EntityStore, EntityTypeFilter, KillFlags, MobCategory, MobType,
};
pub use flat::*;
pub use storage::*;
pub use world::*;
