//! Area traversals. Each takes an [`EditSession`](crate::EditSession), walks
//! its envelope and returns the number of cells it changed.

mod fill;
mod liquid;
mod replace;
mod surface;
mod vertical;

pub use fill::{fill, fill_recursive};
pub use liquid::{drain_area, fix_liquid, Liquid};
pub use replace::replace_blocks;
pub use surface::{green, simulate_snow, thaw};
pub use vertical::{remove_above, remove_below, remove_near};

use voxedit_core::BlockPos;

/// Horizontal reach of a radius, in whole blocks.
fn reach(radius: f64) -> i32 {
    radius.max(0.0).floor() as i32
}

fn within_disk(origin: BlockPos, pos: BlockPos, radius: f64) -> bool {
    pos.horizontal_distance_sq(origin) <= radius * radius
}

/// Columns (x, z) of the flat disk of `radius` around `origin`, row by row.
/// Columns past the edge of the i32 coordinate space are skipped.
fn disk_columns(origin: BlockPos, radius: f64) -> impl Iterator<Item = (i32, i32)> {
    let reach = reach(radius);
    let radius_sq = radius * radius;
    (-reach..=reach).flat_map(move |dx| {
        let x = origin.x.checked_add(dx);
        (-reach..=reach).filter_map(move |dz| {
            let dist_sq = f64::from(dx).powi(2) + f64::from(dz).powi(2);
            if dist_sq > radius_sq {
                return None;
            }
            Some((x?, origin.z.checked_add(dz)?))
        })
    })
}

/// The 3×3×3 cube around `origin`, origin first.
fn seed_cube(origin: BlockPos) -> impl Iterator<Item = BlockPos> {
    std::iter::once(origin).chain((-1..=1).flat_map(move |dx| {
        (-1..=1).flat_map(move |dy| {
            (-1..=1).filter_map(move |dz| {
                ((dx, dy, dz) != (0, 0, 0)).then_some(origin.offset(dx, dy, dz))
            })
        })
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disk_of_radius_one_is_a_plus() {
        let columns: Vec<_> = disk_columns(BlockPos::new(10, 0, 10), 1.0).collect();
        assert_eq!(columns.len(), 5);
        assert!(columns.contains(&(11, 10)));
        assert!(!columns.contains(&(11, 11)));
    }

    #[test]
    fn zero_radius_disk_is_the_origin_column() {
        let columns: Vec<_> = disk_columns(BlockPos::new(3, 0, -4), 0.0).collect();
        assert_eq!(columns, vec![(3, -4)]);
    }

    #[test]
    fn huge_disk_starts_at_its_western_rim() {
        let mut columns = disk_columns(BlockPos::ZERO, 50_000.0);
        assert_eq!(columns.next(), Some((-50_000, 0)));
        assert_eq!(columns.next().map(|(x, _)| x), Some(-49_999));
    }

    #[test]
    fn disk_at_the_coordinate_edge_skips_unrepresentable_columns() {
        let columns: Vec<_> = disk_columns(BlockPos::new(i32::MAX, 0, i32::MIN), 1.0).collect();
        assert_eq!(
            columns,
            vec![
                (i32::MAX - 1, i32::MIN),
                (i32::MAX, i32::MIN),
                (i32::MAX, i32::MIN + 1)
            ]
        );
    }

    #[test]
    fn seed_cube_has_27_distinct_cells() {
        let cells: std::collections::HashSet<_> = seed_cube(BlockPos::ZERO).collect();
        assert_eq!(cells.len(), 27);
    }
}
