//! Property-based tests for mob sweeps
//!
//! Critical invariants:
//! - Without flags, pets, NPCs and animals always survive
//! - Each flag unlocks exactly its own category
//! - Players are never killed, and nothing outside the radius is

use proptest::prelude::*;
use voxedit_core::{BlockPos, DimensionId};
use voxedit_world::{EntityKind, KillFlags, MobCategory, MobType, World};

const MOBS: [MobType; 18] = [
    MobType::Pig,
    MobType::Cow,
    MobType::Sheep,
    MobType::Chicken,
    MobType::Squid,
    MobType::Wolf,
    MobType::Ocelot,
    MobType::Villager,
    MobType::ZombiePigman,
    MobType::Enderman,
    MobType::IronGolem,
    MobType::Zombie,
    MobType::Skeleton,
    MobType::Spider,
    MobType::Creeper,
    MobType::Slime,
    MobType::Blaze,
    MobType::Ghast,
];

fn entity_strategy() -> impl Strategy<Value = (EntityKind, (f64, f64, f64))> {
    let kind = prop_oneof![
        (prop::sample::select(MOBS.to_vec()), any::<bool>())
            .prop_map(|(mob, tamed)| EntityKind::Mob { mob, tamed }),
        Just(EntityKind::Player {
            name: "bystander".to_string()
        }),
        Just(EntityKind::Arrow),
        Just(EntityKind::PrimedTnt),
    ];
    (kind, (-30.0f64..30.0, 0.0f64..80.0, -30.0f64..30.0))
}

fn flags_strategy() -> impl Strategy<Value = KillFlags> {
    (0u8..16).prop_map(KillFlags::from_bits_truncate)
}

fn required_flag(category: MobCategory) -> Option<KillFlags> {
    match category {
        MobCategory::Pet => Some(KillFlags::PETS),
        MobCategory::Npc => Some(KillFlags::NPCS),
        MobCategory::Animal => Some(KillFlags::ANIMALS),
        MobCategory::Hostile | MobCategory::Neutral => None,
    }
}

proptest! {
    /// Property: a mob dies iff it is in range and its category is permitted
    #[test]
    fn sweep_respects_categories_and_radius(
        entities in prop::collection::vec(entity_strategy(), 0..60),
        flags in flags_strategy(),
        radius in prop_oneof![Just(-1.0f64), 0.0f64..40.0],
    ) {
        let mut world = World::new(DimensionId::Overworld, 16);
        for (kind, (x, y, z)) in &entities {
            world.spawn_entity(kind.clone(), *x, *y, *z);
        }
        let origin = BlockPos::new(0, 40, 0);
        let killed = world.kill_mobs(origin, radius, flags);

        let mut expected = 0;
        for entity in world.entities().iter() {
            let in_range = radius < 0.0 || entity.distance_sq(origin) <= radius * radius;
            let should_die = match entity.kind.mob_category() {
                Some(category) => {
                    in_range && required_flag(category).map_or(true, |flag| flags.contains(flag))
                }
                None => false,
            };
            prop_assert_eq!(entity.removed, should_die, "{:?}", entity.kind);
            if should_die {
                expected += 1;
            }
        }
        prop_assert_eq!(killed, expected);
    }

    /// Property: PETS alone never touches NPCs or animals
    #[test]
    fn pets_flag_spares_npcs_and_animals(entities in prop::collection::vec(entity_strategy(), 0..60)) {
        let mut world = World::new(DimensionId::Overworld, 16);
        for (kind, (x, y, z)) in &entities {
            world.spawn_entity(kind.clone(), *x, *y, *z);
        }
        world.kill_mobs(BlockPos::ZERO, -1.0, KillFlags::PETS);
        for entity in world.entities().iter() {
            if matches!(entity.kind.mob_category(), Some(MobCategory::Npc | MobCategory::Animal)) {
                prop_assert!(!entity.removed);
            }
            if matches!(entity.kind, EntityKind::Player { .. }) {
                prop_assert!(!entity.removed);
            }
        }
    }
}
