//! Block membership sets used to select replacement candidates.

use std::collections::HashSet;

use voxedit_core::{BlockData, BlockId, BlockValue, MatchMode};

use crate::error::EditResult;
use crate::pattern::parse_block_spec;

/// A set of block types, some pinned to a specific metadata value.
///
/// Entries given without data match any metadata. Under
/// [`MatchMode::IgnoreData`] every entry matches any metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockMask {
    exact: HashSet<BlockValue>,
    any_data: HashSet<BlockId>,
}

impl BlockMask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(id, data)` entries under `mode`.
    pub fn from_entries<I>(entries: I, mode: MatchMode) -> Self
    where
        I: IntoIterator<Item = (BlockId, Option<BlockData>)>,
    {
        let mut mask = Self::new();
        for (id, data) in entries {
            match (data, mode) {
                (Some(data), MatchMode::Exact) => {
                    mask.exact.insert(BlockValue::new(id, data));
                }
                _ => {
                    mask.any_data.insert(id);
                }
            }
        }
        mask
    }

    /// Parse a comma-separated block list (`stone,cloth:14,3`).
    pub fn parse(input: &str, mode: MatchMode) -> EditResult<Self> {
        let entries = input
            .split(',')
            .map(parse_block_spec)
            .collect::<EditResult<Vec<_>>>()?;
        Ok(Self::from_entries(entries, mode))
    }

    /// True when the mask lists nothing.
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.any_data.is_empty()
    }

    /// Membership test.
    pub fn contains(&self, value: BlockValue) -> bool {
        self.any_data.contains(&value.id) || self.exact.contains(&value)
    }
}

/// Whether a replacement may touch `value`: an absent or empty mask selects
/// every non-air cell.
pub fn selects(mask: Option<&BlockMask>, value: BlockValue) -> bool {
    match mask {
        Some(mask) if !mask.is_empty() => mask.contains(value),
        _ => !value.is_air(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxedit_core::block::ids;

    #[test]
    fn exact_entries_pin_metadata() {
        let mask = BlockMask::parse("cloth:14,stone", MatchMode::Exact).unwrap();
        assert!(mask.contains(BlockValue::new(ids::CLOTH, 14)));
        assert!(!mask.contains(BlockValue::new(ids::CLOTH, 1)));
        assert!(mask.contains(BlockValue::new(ids::STONE, 3)));
        assert!(!mask.contains(BlockValue::of(ids::DIRT)));
    }

    #[test]
    fn ignore_data_widens_pinned_entries() {
        let mask = BlockMask::parse("cloth:14", MatchMode::IgnoreData).unwrap();
        assert!(mask.contains(BlockValue::new(ids::CLOTH, 1)));
    }

    #[test]
    fn empty_or_missing_mask_selects_non_air() {
        let empty = BlockMask::new();
        assert!(selects(Some(&empty), BlockValue::of(ids::STONE)));
        assert!(!selects(Some(&empty), BlockValue::AIR));
        assert!(selects(None, BlockValue::of(ids::DIRT)));
        assert!(!selects(None, BlockValue::AIR));
    }

    #[test]
    fn mask_may_select_air() {
        let mask = BlockMask::parse("air", MatchMode::Exact).unwrap();
        assert!(selects(Some(&mask), BlockValue::AIR));
        assert!(!selects(Some(&mask), BlockValue::of(ids::STONE)));
    }

    #[test]
    fn unknown_entries_fail_parsing() {
        assert!(BlockMask::parse("stone,bogus", MatchMode::Exact).is_err());
    }
}
