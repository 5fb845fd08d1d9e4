use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fs, path::Path};
use tracing::warn;
use voxedit_core::DimensionId;
use voxedit_edit::{parse_block_id, EditConfig};
use voxedit_world::{EntityKind, FlatGenerator, FlatLayer, Universe, World, DEFAULT_CHUNK_CAPACITY};

use crate::commands::PlayerSender;

pub const DEFAULT_CONFIG_PATH: &str = "config/voxedit.toml";

/// Everything the runner reads from `voxedit.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub edit: EditConfig,
    pub world: WorldConfig,
    pub player: PlayerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Resident chunk budget per dimension.
    pub chunk_capacity: usize,
    /// Chunks generated around the origin, in each direction.
    pub chunk_radius: i32,
    pub dimensions: Vec<DimensionId>,
    /// Flat layers from y = 0 upward. Empty means the default generator.
    pub layers: Vec<LayerConfig>,
    pub entities: Vec<SpawnConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LayerConfig {
    /// Block name or numeric id.
    pub block: String,
    pub thickness: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SpawnConfig {
    #[serde(default)]
    pub dimension: DimensionId,
    pub entity: EntityKind,
    pub pos: [f64; 3],
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub name: String,
    pub dimension: DimensionId,
    pub position: [f64; 3],
    /// Permission nodes; `*` and `prefix.*` wildcards are honoured.
    pub permissions: BTreeSet<String>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
            chunk_radius: 2,
            dimensions: vec![DimensionId::Overworld],
            layers: Vec::new(),
            entities: Vec::new(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            name: "editor".to_string(),
            dimension: DimensionId::Overworld,
            position: [0.5, 63.0, 0.5],
            permissions: BTreeSet::from(["worldedit.*".to_string()]),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|err| {
                warn!("Failed to parse {}: {err:#}. Using defaults", path.display());
                AppConfig::default()
            }),
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!("Config not found at {}. Using defaults", path.display());
                }
                AppConfig::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

impl WorldConfig {
    pub fn generator(&self) -> Result<FlatGenerator> {
        if self.layers.is_empty() {
            return Ok(FlatGenerator::default());
        }
        let layers = self
            .layers
            .iter()
            .map(|layer| {
                let block = parse_block_id(&layer.block)
                    .with_context(|| format!("invalid world layer '{}'", layer.block))?;
                Ok(FlatLayer::new(block, layer.thickness))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(FlatGenerator::new(layers))
    }

    /// Generate every configured dimension and place the configured entities.
    pub fn build_universe(&self) -> Result<Universe> {
        let generator = self.generator()?;
        let mut universe = Universe::new();
        for &dimension in &self.dimensions {
            let mut world = World::new(dimension, self.chunk_capacity);
            world.generate_flat(&generator, self.chunk_radius);
            universe.insert(world);
        }
        for spawn in &self.entities {
            let world = universe
                .get_mut(spawn.dimension)
                .with_context(|| format!("entity spawn in unloaded dimension {}", spawn.dimension))?;
            let [x, y, z] = spawn.pos;
            world.spawn_entity(spawn.entity.clone(), x, y, z);
        }
        Ok(universe)
    }
}

impl PlayerConfig {
    pub fn sender(&self) -> PlayerSender {
        let [x, y, z] = self.position;
        PlayerSender::new(self.name.clone(), self.dimension, (x, y, z))
            .with_permissions(self.permissions.iter().cloned())
    }

    #[cfg(test)]
    pub fn block_pos(&self) -> voxedit_core::BlockPos {
        let [x, y, z] = self.position;
        voxedit_core::BlockPos::from_f64(x, y, z)
    }
}
