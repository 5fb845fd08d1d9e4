//! Block parsing and the value generators used by fills and replacements.
//!
//! Syntax:
//! - block: `name` or `id`, optionally followed by `:data` (`cloth:14`, `35:14`)
//! - pattern: comma-separated blocks, each optionally prefixed by a weight
//!   (`stone`, `50%stone,50%dirt`, `3%cloth:14,dirt`)

use std::str::FromStr;

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;
use voxedit_core::block::id_by_name;
use voxedit_core::{BlockData, BlockId, BlockPos, BlockValue};

use crate::error::{EditError, EditResult};

fn invalid(input: &str, reason: impl Into<String>) -> EditError {
    EditError::InvalidPattern {
        input: input.to_string(),
        reason: reason.into(),
    }
}

/// Resolve a block name or numeric id.
pub fn parse_block_id(input: &str) -> EditResult<BlockId> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(EditError::UnknownBlock(input.to_string()));
    }
    if let Ok(id) = trimmed.parse::<BlockId>() {
        return Ok(id);
    }
    id_by_name(trimmed).ok_or_else(|| EditError::UnknownBlock(trimmed.to_string()))
}

/// Parse `block[:data]`, returning the explicit data when one was given.
pub fn parse_block_spec(input: &str) -> EditResult<(BlockId, Option<BlockData>)> {
    match input.split_once(':') {
        Some((name, data)) => {
            let id = parse_block_id(name)?;
            let data = data
                .trim()
                .parse::<BlockData>()
                .map_err(|_| invalid(input, format!("bad block data '{data}'")))?;
            Ok((id, Some(data)))
        }
        None => Ok((parse_block_id(input)?, None)),
    }
}

/// Parse `block[:data]` into a concrete value (missing data is 0).
pub fn parse_block(input: &str) -> EditResult<BlockValue> {
    let (id, data) = parse_block_spec(input)?;
    Ok(BlockValue::new(id, data.unwrap_or(0)))
}

/// Weighted random choice among block values.
#[derive(Debug, Clone)]
pub struct RandomPattern {
    blocks: Vec<BlockValue>,
    index: WeightedIndex<f64>,
    rng: StdRng,
}

impl RandomPattern {
    /// Build from `(value, weight)` pairs. Weights must be finite and not all zero.
    pub fn new(entries: Vec<(BlockValue, f64)>, rng: StdRng) -> EditResult<Self> {
        let (blocks, weights): (Vec<_>, Vec<_>) = entries.into_iter().unzip();
        let index = WeightedIndex::new(&weights).map_err(|err| {
            invalid(
                &format!("{blocks:?}"),
                format!("weights cannot be sampled: {err}"),
            )
        })?;
        Ok(Self {
            blocks,
            index,
            rng,
        })
    }

    fn next(&mut self) -> BlockValue {
        self.blocks[self.index.sample(&mut self.rng)]
    }
}

/// Source of the value written at each coordinate.
#[derive(Debug, Clone)]
pub enum Pattern {
    Single(BlockValue),
    Random(RandomPattern),
}

impl Pattern {
    /// Parse pattern syntax with an explicit seed for reproducible runs.
    pub fn parse_seeded(input: &str, seed: u64) -> EditResult<Self> {
        Self::parse_with(input, StdRng::seed_from_u64(seed))
    }

    fn parse_with(input: &str, rng: StdRng) -> EditResult<Self> {
        let mut entries = Vec::new();
        let mut weighted = false;
        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid(input, "empty entry"));
            }
            let (weight, block) = match part.split_once('%') {
                Some((weight, block)) => {
                    let weight: f64 = weight
                        .trim()
                        .parse()
                        .map_err(|_| invalid(input, format!("bad weight '{weight}'")))?;
                    if !weight.is_finite() || weight < 0.0 {
                        return Err(invalid(input, format!("bad weight '{weight}'")));
                    }
                    weighted = true;
                    (weight, block)
                }
                None => (1.0, part),
            };
            entries.push((parse_block(block)?, weight));
        }
        match entries.as_slice() {
            [(value, _)] if !weighted => Ok(Pattern::Single(*value)),
            _ => RandomPattern::new(entries, rng)
                .map(Pattern::Random)
                .map_err(|_| invalid(input, "weights sum to zero")),
        }
    }

    /// The value to write at `pos`.
    pub fn generate(&mut self, _pos: BlockPos) -> BlockValue {
        match self {
            Pattern::Single(value) => *value,
            Pattern::Random(random) => random.next(),
        }
    }
}

impl From<BlockValue> for Pattern {
    fn from(value: BlockValue) -> Self {
        Pattern::Single(value)
    }
}

impl FromStr for Pattern {
    type Err = EditError;

    fn from_str(input: &str) -> EditResult<Self> {
        Self::parse_with(input, StdRng::from_entropy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxedit_core::block::ids;

    #[test]
    fn blocks_parse_by_name_and_id() {
        assert_eq!(parse_block("stone").unwrap(), BlockValue::of(ids::STONE));
        assert_eq!(parse_block("35:14").unwrap(), BlockValue::new(ids::CLOTH, 14));
        assert_eq!(parse_block("Wool:3").unwrap(), BlockValue::new(ids::CLOTH, 3));
        assert_eq!(parse_block_spec("wool").unwrap(), (ids::CLOTH, None));
    }

    #[test]
    fn unknown_block_is_reported() {
        assert_eq!(
            parse_block("unobtainium"),
            Err(EditError::UnknownBlock("unobtainium".into()))
        );
        assert!(matches!(
            parse_block("stone:x"),
            Err(EditError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn single_block_pattern_is_constant() {
        let mut pattern: Pattern = "dirt".parse().unwrap();
        assert!(matches!(pattern, Pattern::Single(value) if value == BlockValue::of(ids::DIRT)));
        assert_eq!(pattern.generate(BlockPos::ZERO), BlockValue::of(ids::DIRT));
    }

    #[test]
    fn weighted_pattern_only_yields_listed_blocks() {
        let mut pattern = Pattern::parse_seeded("70%stone,30%cloth:4", 7).unwrap();
        assert!(matches!(pattern, Pattern::Random(_)));
        for i in 0..200 {
            let value = pattern.generate(BlockPos::new(i, 0, 0));
            assert!(value == BlockValue::of(ids::STONE) || value == BlockValue::new(ids::CLOTH, 4));
        }
    }

    #[test]
    fn zero_weight_entries_are_never_chosen() {
        let mut pattern = Pattern::parse_seeded("0%stone,5%dirt", 1).unwrap();
        for _ in 0..100 {
            assert_eq!(pattern.generate(BlockPos::ZERO).id, ids::DIRT);
        }
    }

    #[test]
    fn seeded_patterns_are_reproducible() {
        let mut a = Pattern::parse_seeded("stone,dirt,grass", 42).unwrap();
        let mut b = Pattern::parse_seeded("stone,dirt,grass", 42).unwrap();
        let run_a: Vec<_> = (0..50).map(|_| a.generate(BlockPos::ZERO)).collect();
        let run_b: Vec<_> = (0..50).map(|_| b.generate(BlockPos::ZERO)).collect();
        assert_eq!(run_a, run_b);
    }

    #[test]
    fn malformed_patterns_are_rejected() {
        assert!("".parse::<Pattern>().is_err());
        assert!("stone,,dirt".parse::<Pattern>().is_err());
        assert!("x%stone".parse::<Pattern>().is_err());
        assert!("0%stone".parse::<Pattern>().is_err());
        assert!("-5%stone,dirt".parse::<Pattern>().is_err());
    }
}
