//! Entities living in a world and the predicates used to sweep them.
//!
//! Removal is deferred: sweeps only set the `removed` mark and the owning
//! [`World`](crate::World) purges marked entities on its next tick.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use voxedit_core::BlockPos;

/// Stable entity identifier, unique within one world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Types of mobs that can live in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MobType {
    // Animals
    Pig,
    Cow,
    Sheep,
    Chicken,
    Squid,
    /// Tameable; counts as a pet once tamed.
    Wolf,
    /// Tameable; counts as a pet once tamed.
    Ocelot,

    // NPCs
    Villager,

    // Neutral
    ZombiePigman,
    Enderman,
    IronGolem,

    // Hostile
    Zombie,
    Skeleton,
    Spider,
    Creeper,
    Slime,
    Blaze,
    Ghast,
}

impl MobType {
    /// Category of an untamed mob of this type.
    pub const fn base_category(self) -> MobCategory {
        match self {
            MobType::Pig
            | MobType::Cow
            | MobType::Sheep
            | MobType::Chicken
            | MobType::Squid
            | MobType::Wolf
            | MobType::Ocelot => MobCategory::Animal,
            MobType::Villager => MobCategory::Npc,
            MobType::ZombiePigman | MobType::Enderman | MobType::IronGolem => {
                MobCategory::Neutral
            }
            MobType::Zombie
            | MobType::Skeleton
            | MobType::Spider
            | MobType::Creeper
            | MobType::Slime
            | MobType::Blaze
            | MobType::Ghast => MobCategory::Hostile,
        }
    }

    /// Whether a player can tame this mob.
    pub const fn is_tameable(self) -> bool {
        matches!(self, MobType::Wolf | MobType::Ocelot)
    }
}

/// Classification used by mob sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MobCategory {
    Hostile,
    Neutral,
    Animal,
    /// A tamed animal.
    Pet,
    Npc,
}

bitflags::bitflags! {
    /// Opt-in flags for mob sweeps.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct KillFlags: u8 {
        const PETS = 1 << 0;
        const NPCS = 1 << 1;
        const ANIMALS = 1 << 2;
        const WITH_LIGHTNING = 1 << 3;
    }
}

/// Categories a sweep may only touch when the paired flag is present.
/// Categories absent from the table are always eligible.
const CATEGORY_GATES: &[(MobCategory, KillFlags)] = &[
    (MobCategory::Pet, KillFlags::PETS),
    (MobCategory::Npc, KillFlags::NPCS),
    (MobCategory::Animal, KillFlags::ANIMALS),
];

impl KillFlags {
    /// Whether a mob of `category` may be killed under these flags.
    pub fn permits(self, category: MobCategory) -> bool {
        CATEGORY_GATES
            .iter()
            .find(|(gated, _)| *gated == category)
            .map_or(true, |(_, required)| self.contains(*required))
    }
}

/// What an entity is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityKind {
    Player { name: String },
    Mob { mob: MobType, tamed: bool },
    Arrow,
    Item,
    Painting,
    Boat,
    Minecart,
    PrimedTnt,
    ExperienceOrb,
}

impl EntityKind {
    /// Convenience constructor for an untamed mob.
    pub fn mob(mob: MobType) -> Self {
        EntityKind::Mob { mob, tamed: false }
    }

    /// Players and mobs are living entities.
    pub fn is_living(&self) -> bool {
        matches!(self, EntityKind::Player { .. } | EntityKind::Mob { .. })
    }

    /// Sweep category of a mob, `None` for anything else.
    pub fn mob_category(&self) -> Option<MobCategory> {
        match self {
            EntityKind::Mob { mob, tamed } if *tamed && mob.is_tameable() => Some(MobCategory::Pet),
            EntityKind::Mob { mob, .. } => Some(mob.base_category()),
            _ => None,
        }
    }
}

/// Non-living entity categories accepted by the remove sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityTypeFilter {
    Arrows,
    Items,
    Paintings,
    Boats,
    Minecarts,
    Tnt,
    XpOrbs,
}

impl EntityTypeFilter {
    /// Canonical names, as listed to users.
    pub const ACCEPTABLE: &'static str =
        "arrows, items, paintings, boats, minecarts, tnt, xp";

    /// Parse a user-supplied type name. Matching ignores case and
    /// surrounding whitespace, like command aliases do.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "arrow" | "arrows" => Some(Self::Arrows),
            "item" | "items" | "drop" | "drops" => Some(Self::Items),
            "painting" | "paintings" | "art" => Some(Self::Paintings),
            "boat" | "boats" => Some(Self::Boats),
            "minecart" | "minecarts" | "cart" | "carts" => Some(Self::Minecarts),
            "tnt" => Some(Self::Tnt),
            "xp" => Some(Self::XpOrbs),
            _ => None,
        }
    }

    /// Whether `kind` belongs to this category.
    pub fn matches(self, kind: &EntityKind) -> bool {
        matches!(
            (self, kind),
            (Self::Arrows, EntityKind::Arrow)
                | (Self::Items, EntityKind::Item)
                | (Self::Paintings, EntityKind::Painting)
                | (Self::Boats, EntityKind::Boat)
                | (Self::Minecarts, EntityKind::Minecart)
                | (Self::Tnt, EntityKind::PrimedTnt)
                | (Self::XpOrbs, EntityKind::ExperienceOrb)
        )
    }
}

/// An entity instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Marked for removal; purged on the next world tick.
    pub removed: bool,
}

impl Entity {
    /// Squared distance to the minimum corner of block `origin`.
    pub fn distance_sq(&self, origin: BlockPos) -> f64 {
        let dx = self.x - f64::from(origin.x);
        let dy = self.y - f64::from(origin.y);
        let dz = self.z - f64::from(origin.z);
        dx * dx + dy * dy + dz * dz
    }
}

/// A mob removed by a sweep, with the position it died at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Victim {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Entities of one world keyed by id.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct EntityStore {
    entities: BTreeMap<EntityId, Entity>,
    next_id: u64,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity and return its id.
    pub fn spawn(&mut self, kind: EntityKind, x: f64, y: f64, z: f64) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(
            id,
            Entity {
                id,
                kind,
                x,
                y,
                z,
                removed: false,
            },
        );
        id
    }

    /// All entities, marked ones included, in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Remove every living non-player entity within `radius` of `origin`
    /// that `flags` permits. A negative radius sweeps the whole store.
    pub fn kill_mobs(&mut self, origin: BlockPos, radius: f64, flags: KillFlags) -> Vec<Victim> {
        let radius_sq = radius * radius;
        let mut victims = Vec::new();
        for entity in self.entities.values_mut() {
            if entity.removed {
                continue;
            }
            let Some(category) = entity.kind.mob_category() else {
                continue;
            };
            if !flags.permits(category) {
                continue;
            }
            if radius >= 0.0 && entity.distance_sq(origin) > radius_sq {
                continue;
            }
            entity.removed = true;
            victims.push(Victim {
                id: entity.id,
                x: entity.x,
                y: entity.y,
                z: entity.z,
            });
        }
        victims
    }

    /// Mark every entity of `filter`'s category within `radius` of `origin`.
    /// A negative radius is unbounded.
    pub fn remove_entities(&mut self, filter: EntityTypeFilter, origin: BlockPos, radius: i32) -> usize {
        let radius_sq = f64::from(radius) * f64::from(radius);
        let mut marked = 0;
        for entity in self.entities.values_mut() {
            if entity.removed || !filter.matches(&entity.kind) {
                continue;
            }
            if radius >= 0 && entity.distance_sq(origin) > radius_sq {
                continue;
            }
            entity.removed = true;
            marked += 1;
        }
        marked
    }

    /// Drop marked entities. Returns how many were purged.
    pub fn purge_removed(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|_, entity| !entity.removed);
        before - self.entities.len()
    }
}
