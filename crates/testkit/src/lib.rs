#![warn(missing_docs)]
//! Deterministic testing surfaces: in-memory stores, terrain fixtures and
//! golden JSON snapshots.

mod fixtures;
mod scenario;
mod snapshot;

pub use fixtures::*;
pub use scenario::*;
pub use snapshot::*;
