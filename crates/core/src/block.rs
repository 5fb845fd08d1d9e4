//! Block identity, metadata and the legacy block id table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric block type identifier (legacy ids).
pub type BlockId = u16;
/// Per-block metadata bits (orientation, liquid level, colour, ...).
pub type BlockData = u8;

/// Legacy block ids used throughout the engine.
pub mod ids {
    use super::BlockId;

    /// Empty cell.
    pub const AIR: BlockId = 0;
    /// Stone.
    pub const STONE: BlockId = 1;
    /// Grass block.
    pub const GRASS: BlockId = 2;
    /// Dirt.
    pub const DIRT: BlockId = 3;
    /// Cobblestone.
    pub const COBBLESTONE: BlockId = 4;
    /// Wooden planks.
    pub const WOOD: BlockId = 5;
    /// Sapling.
    pub const SAPLING: BlockId = 6;
    /// Bedrock.
    pub const BEDROCK: BlockId = 7;
    /// Flowing water.
    pub const WATER: BlockId = 8;
    /// Stationary (source) water.
    pub const STATIONARY_WATER: BlockId = 9;
    /// Flowing lava.
    pub const LAVA: BlockId = 10;
    /// Stationary (source) lava.
    pub const STATIONARY_LAVA: BlockId = 11;
    /// Sand.
    pub const SAND: BlockId = 12;
    /// Gravel.
    pub const GRAVEL: BlockId = 13;
    /// Gold ore.
    pub const GOLD_ORE: BlockId = 14;
    /// Iron ore.
    pub const IRON_ORE: BlockId = 15;
    /// Coal ore.
    pub const COAL_ORE: BlockId = 16;
    /// Log.
    pub const LOG: BlockId = 17;
    /// Leaves.
    pub const LEAVES: BlockId = 18;
    /// Sponge.
    pub const SPONGE: BlockId = 19;
    /// Glass.
    pub const GLASS: BlockId = 20;
    /// Sandstone.
    pub const SANDSTONE: BlockId = 24;
    /// Bed.
    pub const BED: BlockId = 26;
    /// Cobweb.
    pub const WEB: BlockId = 30;
    /// Tall grass.
    pub const LONG_GRASS: BlockId = 31;
    /// Dead bush.
    pub const DEAD_BUSH: BlockId = 32;
    /// Wool.
    pub const CLOTH: BlockId = 35;
    /// Dandelion.
    pub const YELLOW_FLOWER: BlockId = 37;
    /// Rose.
    pub const RED_ROSE: BlockId = 38;
    /// Brown mushroom.
    pub const BROWN_MUSHROOM: BlockId = 39;
    /// Red mushroom.
    pub const RED_MUSHROOM: BlockId = 40;
    /// Gold block.
    pub const GOLD_BLOCK: BlockId = 41;
    /// Iron block.
    pub const IRON_BLOCK: BlockId = 42;
    /// Half slab.
    pub const STEP: BlockId = 44;
    /// Brick.
    pub const BRICK: BlockId = 45;
    /// TNT block.
    pub const TNT: BlockId = 46;
    /// Bookshelf.
    pub const BOOKCASE: BlockId = 47;
    /// Mossy cobblestone.
    pub const MOSSY_COBBLESTONE: BlockId = 48;
    /// Obsidian.
    pub const OBSIDIAN: BlockId = 49;
    /// Torch.
    pub const TORCH: BlockId = 50;
    /// Fire.
    pub const FIRE: BlockId = 51;
    /// Wooden stairs.
    pub const WOODEN_STAIRS: BlockId = 53;
    /// Chest.
    pub const CHEST: BlockId = 54;
    /// Redstone wire.
    pub const REDSTONE_WIRE: BlockId = 55;
    /// Crops.
    pub const CROPS: BlockId = 59;
    /// Farmland.
    pub const SOIL: BlockId = 60;
    /// Sign post.
    pub const SIGN_POST: BlockId = 63;
    /// Wooden door.
    pub const WOODEN_DOOR: BlockId = 64;
    /// Ladder.
    pub const LADDER: BlockId = 65;
    /// Rails.
    pub const MINECART_TRACKS: BlockId = 66;
    /// Wall sign.
    pub const WALL_SIGN: BlockId = 68;
    /// Lever.
    pub const LEVER: BlockId = 69;
    /// Stone pressure plate.
    pub const STONE_PRESSURE_PLATE: BlockId = 70;
    /// Wooden pressure plate.
    pub const WOODEN_PRESSURE_PLATE: BlockId = 72;
    /// Unlit redstone torch.
    pub const REDSTONE_TORCH_OFF: BlockId = 75;
    /// Lit redstone torch.
    pub const REDSTONE_TORCH_ON: BlockId = 76;
    /// Stone button.
    pub const STONE_BUTTON: BlockId = 77;
    /// Snow layer.
    pub const SNOW: BlockId = 78;
    /// Ice.
    pub const ICE: BlockId = 79;
    /// Snow block.
    pub const SNOW_BLOCK: BlockId = 80;
    /// Cactus.
    pub const CACTUS: BlockId = 81;
    /// Clay.
    pub const CLAY: BlockId = 82;
    /// Sugar cane.
    pub const REED: BlockId = 83;
    /// Fence.
    pub const FENCE: BlockId = 85;
    /// Netherrack.
    pub const NETHERRACK: BlockId = 87;
    /// Soul sand.
    pub const SLOW_SAND: BlockId = 88;
    /// Glowstone.
    pub const LIGHTSTONE: BlockId = 89;
    /// Nether portal.
    pub const PORTAL: BlockId = 90;
    /// Glass pane.
    pub const GLASS_PANE: BlockId = 102;
    /// Vines.
    pub const VINE: BlockId = 106;
    /// Lily pad.
    pub const LILY_PAD: BlockId = 111;
}

/// Names accepted by the block parser. The first name listed for an id is its
/// canonical name.
const BLOCK_NAMES: &[(&str, BlockId)] = &[
    ("air", ids::AIR),
    ("stone", ids::STONE),
    ("rock", ids::STONE),
    ("grass", ids::GRASS),
    ("dirt", ids::DIRT),
    ("cobblestone", ids::COBBLESTONE),
    ("cobble", ids::COBBLESTONE),
    ("wood", ids::WOOD),
    ("planks", ids::WOOD),
    ("sapling", ids::SAPLING),
    ("bedrock", ids::BEDROCK),
    ("adminium", ids::BEDROCK),
    ("water", ids::WATER),
    ("waterflowing", ids::WATER),
    ("stationarywater", ids::STATIONARY_WATER),
    ("stillwater", ids::STATIONARY_WATER),
    ("lava", ids::LAVA),
    ("lavaflowing", ids::LAVA),
    ("stationarylava", ids::STATIONARY_LAVA),
    ("stilllava", ids::STATIONARY_LAVA),
    ("sand", ids::SAND),
    ("gravel", ids::GRAVEL),
    ("goldore", ids::GOLD_ORE),
    ("ironore", ids::IRON_ORE),
    ("coalore", ids::COAL_ORE),
    ("log", ids::LOG),
    ("tree", ids::LOG),
    ("leaves", ids::LEAVES),
    ("sponge", ids::SPONGE),
    ("glass", ids::GLASS),
    ("sandstone", ids::SANDSTONE),
    ("bed", ids::BED),
    ("web", ids::WEB),
    ("cobweb", ids::WEB),
    ("longgrass", ids::LONG_GRASS),
    ("tallgrass", ids::LONG_GRASS),
    ("deadbush", ids::DEAD_BUSH),
    ("cloth", ids::CLOTH),
    ("wool", ids::CLOTH),
    ("yellowflower", ids::YELLOW_FLOWER),
    ("dandelion", ids::YELLOW_FLOWER),
    ("redrose", ids::RED_ROSE),
    ("rose", ids::RED_ROSE),
    ("brownmushroom", ids::BROWN_MUSHROOM),
    ("redmushroom", ids::RED_MUSHROOM),
    ("goldblock", ids::GOLD_BLOCK),
    ("ironblock", ids::IRON_BLOCK),
    ("step", ids::STEP),
    ("slab", ids::STEP),
    ("brick", ids::BRICK),
    ("tnt", ids::TNT),
    ("bookcase", ids::BOOKCASE),
    ("bookshelf", ids::BOOKCASE),
    ("mossycobblestone", ids::MOSSY_COBBLESTONE),
    ("obsidian", ids::OBSIDIAN),
    ("torch", ids::TORCH),
    ("fire", ids::FIRE),
    ("woodenstairs", ids::WOODEN_STAIRS),
    ("chest", ids::CHEST),
    ("redstonewire", ids::REDSTONE_WIRE),
    ("crops", ids::CROPS),
    ("soil", ids::SOIL),
    ("farmland", ids::SOIL),
    ("signpost", ids::SIGN_POST),
    ("woodendoor", ids::WOODEN_DOOR),
    ("ladder", ids::LADDER),
    ("minecarttracks", ids::MINECART_TRACKS),
    ("rails", ids::MINECART_TRACKS),
    ("wallsign", ids::WALL_SIGN),
    ("lever", ids::LEVER),
    ("stonepressureplate", ids::STONE_PRESSURE_PLATE),
    ("woodenpressureplate", ids::WOODEN_PRESSURE_PLATE),
    ("redstonetorchoff", ids::REDSTONE_TORCH_OFF),
    ("redstonetorchon", ids::REDSTONE_TORCH_ON),
    ("redstonetorch", ids::REDSTONE_TORCH_ON),
    ("stonebutton", ids::STONE_BUTTON),
    ("snow", ids::SNOW),
    ("ice", ids::ICE),
    ("snowblock", ids::SNOW_BLOCK),
    ("cactus", ids::CACTUS),
    ("clay", ids::CLAY),
    ("reed", ids::REED),
    ("sugarcane", ids::REED),
    ("fence", ids::FENCE),
    ("netherrack", ids::NETHERRACK),
    ("slowsand", ids::SLOW_SAND),
    ("soulsand", ids::SLOW_SAND),
    ("lightstone", ids::LIGHTSTONE),
    ("glowstone", ids::LIGHTSTONE),
    ("portal", ids::PORTAL),
    ("glasspane", ids::GLASS_PANE),
    ("vine", ids::VINE),
    ("lilypad", ids::LILY_PAD),
];

/// Look up a block id by name. Case, underscores, dashes and spaces are ignored.
pub fn id_by_name(name: &str) -> Option<BlockId> {
    let key: String = name
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect();
    BLOCK_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, id)| *id)
}

/// Canonical name for a block id, if it is known.
pub fn name_of(id: BlockId) -> Option<&'static str> {
    BLOCK_NAMES
        .iter()
        .find(|(_, candidate)| *candidate == id)
        .map(|(name, _)| *name)
}

/// True for every state of water and lava.
pub const fn is_liquid(id: BlockId) -> bool {
    matches!(
        id,
        ids::WATER | ids::STATIONARY_WATER | ids::LAVA | ids::STATIONARY_LAVA
    )
}

/// True for flowing or stationary water.
pub const fn is_water(id: BlockId) -> bool {
    matches!(id, ids::WATER | ids::STATIONARY_WATER)
}

/// Blocks that snow cannot settle on.
pub const fn is_translucent(id: BlockId) -> bool {
    matches!(
        id,
        ids::AIR
            | ids::SAPLING
            | ids::WATER
            | ids::STATIONARY_WATER
            | ids::LAVA
            | ids::STATIONARY_LAVA
            | ids::LEAVES
            | ids::GLASS
            | ids::BED
            | ids::WEB
            | ids::LONG_GRASS
            | ids::DEAD_BUSH
            | ids::YELLOW_FLOWER
            | ids::RED_ROSE
            | ids::BROWN_MUSHROOM
            | ids::RED_MUSHROOM
            | ids::STEP
            | ids::WOODEN_STAIRS
            | ids::TORCH
            | ids::FIRE
            | ids::CHEST
            | ids::REDSTONE_WIRE
            | ids::CROPS
            | ids::SIGN_POST
            | ids::WOODEN_DOOR
            | ids::LADDER
            | ids::MINECART_TRACKS
            | ids::WALL_SIGN
            | ids::LEVER
            | ids::STONE_PRESSURE_PLATE
            | ids::WOODEN_PRESSURE_PLATE
            | ids::REDSTONE_TORCH_OFF
            | ids::REDSTONE_TORCH_ON
            | ids::STONE_BUTTON
            | ids::SNOW
            | ids::ICE
            | ids::CACTUS
            | ids::REED
            | ids::FENCE
            | ids::PORTAL
            | ids::GLASS_PANE
            | ids::VINE
            | ids::LILY_PAD
    )
}

/// Blocks an entity can walk through; surface scans look past them.
pub const fn can_pass_through(id: BlockId) -> bool {
    matches!(
        id,
        ids::AIR
            | ids::SAPLING
            | ids::WEB
            | ids::LONG_GRASS
            | ids::DEAD_BUSH
            | ids::YELLOW_FLOWER
            | ids::RED_ROSE
            | ids::BROWN_MUSHROOM
            | ids::RED_MUSHROOM
            | ids::TORCH
            | ids::FIRE
            | ids::REDSTONE_WIRE
            | ids::CROPS
            | ids::SIGN_POST
            | ids::LADDER
            | ids::MINECART_TRACKS
            | ids::WALL_SIGN
            | ids::LEVER
            | ids::STONE_PRESSURE_PLATE
            | ids::WOODEN_PRESSURE_PLATE
            | ids::REDSTONE_TORCH_OFF
            | ids::REDSTONE_TORCH_ON
            | ids::STONE_BUTTON
            | ids::SNOW
            | ids::REED
            | ids::PORTAL
            | ids::VINE
    )
}

/// How metadata takes part in block comparisons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchMode {
    /// Type and metadata must both match.
    #[default]
    Exact,
    /// Only the type id is compared.
    IgnoreData,
}

/// A block type plus its metadata.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BlockValue {
    /// Block type id.
    pub id: BlockId,
    /// Metadata bits.
    pub data: BlockData,
}

impl BlockValue {
    /// The empty cell.
    pub const AIR: Self = Self::of(ids::AIR);

    /// Create a value with explicit metadata.
    pub const fn new(id: BlockId, data: BlockData) -> Self {
        Self { id, data }
    }

    /// Create a value with zero metadata.
    pub const fn of(id: BlockId) -> Self {
        Self { id, data: 0 }
    }

    /// True for the empty cell.
    #[inline]
    pub const fn is_air(self) -> bool {
        self.id == ids::AIR
    }

    /// Compare under the given match mode.
    pub fn matches(self, other: BlockValue, mode: MatchMode) -> bool {
        match mode {
            MatchMode::Exact => self == other,
            MatchMode::IgnoreData => self.id == other.id,
        }
    }
}

impl From<BlockId> for BlockValue {
    fn from(id: BlockId) -> Self {
        Self::of(id)
    }
}

impl fmt::Display for BlockValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match name_of(self.id) {
            Some(name) if self.data == 0 => write!(f, "{name}"),
            Some(name) => write!(f, "{name}:{}", self.data),
            None if self.data == 0 => write!(f, "{}", self.id),
            None => write!(f, "{}:{}", self.id, self.data),
        }
    }
}
