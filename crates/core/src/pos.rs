//! Integer world coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Block coordinate in world space.
///
/// Implements `Ord` (x, then y, then z) so positions can key `BTreeMap`s and
/// sort deterministically.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BlockPos {
    /// East/west axis.
    pub x: i32,
    /// Vertical axis.
    pub y: i32,
    /// North/south axis.
    pub z: i32,
}

impl BlockPos {
    /// World origin.
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// Create a position.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Position floored from continuous coordinates.
    pub fn from_f64(x: f64, y: f64, z: f64) -> Self {
        Self::new(x.floor() as i32, y.floor() as i32, z.floor() as i32)
    }

    /// Translate by the given deltas.
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// The cell directly above.
    pub const fn up(self) -> Self {
        self.offset(0, 1, 0)
    }

    /// The cell directly below.
    pub const fn down(self) -> Self {
        self.offset(0, -1, 0)
    }

    /// Face neighbors: down, up, north, south, east, west.
    pub fn neighbors(self) -> [BlockPos; 6] {
        [
            self.down(),
            self.up(),
            self.offset(0, 0, -1),
            self.offset(0, 0, 1),
            self.offset(1, 0, 0),
            self.offset(-1, 0, 0),
        ]
    }

    /// Same-layer neighbors: north, south, east, west.
    pub fn lateral_neighbors(self) -> [BlockPos; 4] {
        [
            self.offset(0, 0, -1),
            self.offset(0, 0, 1),
            self.offset(1, 0, 0),
            self.offset(-1, 0, 0),
        ]
    }

    /// Squared euclidean distance.
    pub fn distance_sq(self, other: BlockPos) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        let dz = f64::from(self.z - other.z);
        dx * dx + dy * dy + dz * dz
    }

    /// Squared distance on the XZ plane, ignoring height.
    pub fn horizontal_distance_sq(self, other: BlockPos) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dz = f64::from(self.z) - f64::from(other.z);
        dx * dx + dz * dz
    }

    /// Distance on the XZ plane, ignoring height.
    pub fn horizontal_distance(self, other: BlockPos) -> f64 {
        self.horizontal_distance_sq(other).sqrt()
    }
}

impl From<(i32, i32, i32)> for BlockPos {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
