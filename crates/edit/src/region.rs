//! Regions: membership tests plus deterministic enumeration.

use std::collections::HashSet;

use voxedit_core::BlockPos;

/// A set of coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    /// Axis-aligned box, both corners inclusive.
    Cuboid { min: BlockPos, max: BlockPos },
    /// Vertical cylinder around `center`, layers `min_y..=max_y` inclusive.
    Cylinder {
        center: BlockPos,
        radius: f64,
        min_y: i32,
        max_y: i32,
    },
    /// Arbitrary hashed point set.
    Points(HashSet<BlockPos>),
}

impl Region {
    /// Cuboid spanning two arbitrary corners.
    pub fn cuboid(a: BlockPos, b: BlockPos) -> Self {
        Region::Cuboid {
            min: BlockPos::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: BlockPos::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Cube of half-width `half` centred on `center`, clamped to the i32
    /// coordinate space.
    pub fn centered_cube(center: BlockPos, half: i32) -> Self {
        let half = half.max(0);
        Region::Cuboid {
            min: BlockPos::new(
                center.x.saturating_sub(half),
                center.y.saturating_sub(half),
                center.z.saturating_sub(half),
            ),
            max: BlockPos::new(
                center.x.saturating_add(half),
                center.y.saturating_add(half),
                center.z.saturating_add(half),
            ),
        }
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        match self {
            Region::Cuboid { min, max } => {
                (min.x..=max.x).contains(&pos.x)
                    && (min.y..=max.y).contains(&pos.y)
                    && (min.z..=max.z).contains(&pos.z)
            }
            Region::Cylinder {
                center,
                radius,
                min_y,
                max_y,
            } => {
                (*min_y..=*max_y).contains(&pos.y)
                    && pos.horizontal_distance_sq(*center) <= radius * radius
            }
            Region::Points(points) => points.contains(&pos),
        }
    }

    /// Members whose layer lies in `min_y..=max_y`, lazily, sorted by (x, y, z).
    pub fn positions(&self, min_y: i32, max_y: i32) -> Box<dyn Iterator<Item = BlockPos> + '_> {
        match self {
            Region::Cuboid { min, max } => {
                let layers = min.y.max(min_y)..=max.y.min(max_y);
                let (min, max) = (*min, *max);
                Box::new((min.x..=max.x).flat_map(move |x| {
                    layers.clone().flat_map(move |y| {
                        (min.z..=max.z).map(move |z| BlockPos::new(x, y, z))
                    })
                }))
            }
            Region::Cylinder {
                center,
                radius,
                min_y: bottom,
                max_y: top,
            } => {
                let reach = radius.max(0.0).floor() as i32;
                let layers = (*bottom).max(min_y)..=(*top).min(max_y);
                let center = *center;
                let xs = center.x.saturating_sub(reach)..=center.x.saturating_add(reach);
                let zs = center.z.saturating_sub(reach)..=center.z.saturating_add(reach);
                Box::new(xs.flat_map(move |x| {
                    let zs = zs.clone();
                    layers.clone().flat_map(move |y| {
                        zs.clone().map(move |z| BlockPos::new(x, y, z))
                    })
                })
                .filter(move |pos| self.contains(*pos)))
            }
            Region::Points(points) => {
                let mut members: Vec<_> = points
                    .iter()
                    .copied()
                    .filter(|pos| (min_y..=max_y).contains(&pos.y))
                    .collect();
                members.sort();
                Box::new(members.into_iter())
            }
        }
    }
}
