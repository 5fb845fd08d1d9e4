//! Dimension identifiers.
//!
//! Every loaded world is one dimension. Console-issued sweeps iterate all of
//! them in this order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a world dimension.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum DimensionId {
    /// The Overworld dimension.
    #[default]
    Overworld = 0,
    /// The Nether dimension.
    Nether = 1,
    /// The End dimension.
    End = 2,
}

impl DimensionId {
    /// Default (Overworld) dimension.
    pub const DEFAULT: Self = Self::Overworld;

    /// All dimensions in iteration order.
    pub const ALL: [Self; 3] = [Self::Overworld, Self::Nether, Self::End];

    /// Canonical string key used in configs/logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overworld => "overworld",
            Self::Nether => "nether",
            Self::End => "end",
        }
    }

    /// Parse a canonical key (case-insensitive).
    pub fn parse(input: &str) -> Option<Self> {
        let key = input.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|dim| dim.as_str() == key)
    }
}

impl fmt::Display for DimensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
