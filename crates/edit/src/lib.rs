//! Area-bounded world mutation: fills, liquid fixes, removals, replacements
//! and surface simulation over any [`VoxelStore`](voxedit_core::VoxelStore),
//! with transactional batches and undo history.

mod batch;
mod config;
mod engine;
mod error;
mod history;
mod mask;
mod pattern;
mod region;
mod session;
pub mod traversal;

pub use batch::{MutationBatch, MutationRecord};
pub use config::{EditConfig, EXTINGUISH_RADIUS};
pub use engine::EditEngine;
pub use error::{EditError, EditResult};
pub use history::EditHistory;
pub use mask::{selects, BlockMask};
pub use pattern::{parse_block, parse_block_id, parse_block_spec, Pattern, RandomPattern};
pub use region::Region;
pub use session::{CancelToken, EditSession};
pub use traversal::Liquid;
