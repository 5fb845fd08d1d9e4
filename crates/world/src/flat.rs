//! Flat terrain generation from a bottom-up layer list.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use voxedit_core::block::ids;
use voxedit_core::{BlockId, BlockValue};

use crate::chunk::{Chunk, ChunkPos, CHUNK_SIZE_Y};

/// One horizontal band of identical blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatLayer {
    pub block: BlockId,
    pub thickness: u32,
}

impl FlatLayer {
    pub const fn new(block: BlockId, thickness: u32) -> Self {
        Self { block, thickness }
    }
}

/// Generator that stacks layers from y = 0 upward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatGenerator {
    layers: Vec<FlatLayer>,
}

impl Default for FlatGenerator {
    /// Bedrock, 58 stone, 3 dirt and a grass top at y = 62.
    fn default() -> Self {
        Self::new(vec![
            FlatLayer::new(ids::BEDROCK, 1),
            FlatLayer::new(ids::STONE, 58),
            FlatLayer::new(ids::DIRT, 3),
            FlatLayer::new(ids::GRASS, 1),
        ])
    }
}

impl FlatGenerator {
    pub fn new(layers: Vec<FlatLayer>) -> Self {
        Self { layers }
    }

    pub fn layers(&self) -> &[FlatLayer] {
        &self.layers
    }

    /// Y of the topmost generated layer, `None` when no layer has thickness.
    pub fn surface_y(&self) -> Option<i32> {
        let total: u32 = self.layers.iter().map(|layer| layer.thickness).sum();
        let total = total.min(CHUNK_SIZE_Y as u32);
        (total > 0).then(|| total as i32 - 1)
    }

    /// Build one chunk. Layers past the build ceiling are cut off.
    #[instrument(skip(self), fields(chunk_pos = %chunk_pos))]
    pub fn generate_chunk(&self, chunk_pos: ChunkPos) -> Chunk {
        let mut chunk = Chunk::new(chunk_pos);
        let mut y = 0usize;
        'layers: for layer in &self.layers {
            let value = BlockValue::of(layer.block);
            for _ in 0..layer.thickness {
                if y >= CHUNK_SIZE_Y {
                    break 'layers;
                }
                if !value.is_air() {
                    chunk.fill_layer(y, value);
                }
                y += 1;
            }
        }
        debug!(layers = self.layers.len(), top = y, "generated flat chunk");
        chunk.take_dirty_flags();
        chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::LocalPos;

    #[test]
    fn default_generator_puts_grass_on_top() {
        let generator = FlatGenerator::default();
        assert_eq!(generator.surface_y(), Some(62));
        let chunk = generator.generate_chunk(ChunkPos::new(0, 0));
        assert_eq!(chunk.highest_block(7, 7), Some(62));
        assert_eq!(chunk.block(LocalPos { x: 7, y: 62, z: 7 }).id, ids::GRASS);
        assert_eq!(chunk.block(LocalPos { x: 7, y: 0, z: 7 }).id, ids::BEDROCK);
    }

    #[test]
    fn air_layers_leave_gaps() {
        let generator = FlatGenerator::new(vec![
            FlatLayer::new(ids::STONE, 2),
            FlatLayer::new(ids::AIR, 3),
            FlatLayer::new(ids::DIRT, 1),
        ]);
        let chunk = generator.generate_chunk(ChunkPos::new(-1, 4));
        assert!(chunk.block(LocalPos { x: 0, y: 3, z: 0 }).is_air());
        assert_eq!(chunk.highest_block(0, 0), Some(5));
    }

    #[test]
    fn oversized_stack_is_clamped_to_ceiling() {
        let generator = FlatGenerator::new(vec![FlatLayer::new(ids::STONE, 1000)]);
        assert_eq!(generator.surface_y(), Some(255));
        let chunk = generator.generate_chunk(ChunkPos::new(0, 0));
        assert_eq!(chunk.highest_block(0, 0), Some(255));
    }

    #[test]
    fn empty_generator_has_no_surface() {
        assert_eq!(FlatGenerator::new(Vec::new()).surface_y(), None);
    }
}
