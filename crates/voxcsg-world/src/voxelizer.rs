//! Rasterization of axis-aligned primitives onto the integer grid.
//!
//! Both rasterizers clip against the grid bounds before enumerating, so a
//! primitive far outside the grid costs nothing. Neither touches the voxel
//! set: the caller appends the returned records.

use glam::{DVec3, IVec3};
use voxcsg_core::bounds::GridBounds;
use voxcsg_core::math::{cube_axis, cylinder_axis, cylinder_height_axis};
use voxcsg_core::types::{Sign, VoxelRecord};

/// Every cell of the closed box `center ± floor(size / 2)` on each axis.
pub fn rasterize_cube(
    center: DVec3,
    size: DVec3,
    sign: Sign,
    bounds: &GridBounds,
) -> Vec<VoxelRecord> {
    let full = [
        cube_axis(center.x, size.x),
        cube_axis(center.y, size.y),
        cube_axis(center.z, size.z),
    ];
    let xs = bounds.clip_axis(full[0].clone());
    let ys = bounds.clip_axis(full[1].clone());
    let zs = bounds.clip_axis(full[2].clone());

    let capacity = xs.len() * ys.len() * zs.len();
    // Finite extents can still span more cells than fit in a u64.
    let unclipped = full
        .iter()
        .map(|r| r.end.saturating_sub(r.start).max(0) as u64)
        .fold(1u64, u64::saturating_mul);
    log_clipped("cube", unclipped, capacity as u64);

    let mut records = Vec::with_capacity(capacity);
    for x in xs {
        for y in ys.clone() {
            for z in zs.clone() {
                records.push(VoxelRecord::new(IVec3::new(x, y, z), sign));
            }
        }
    }

    log_generated("cube", &records, || {
        format!("size {}x{}x{} at {}", size.x, size.y, size.z, center)
    });
    records
}

/// Cells within `radius` of the vertical axis through `center`, for every
/// `z` in `[center.z, center.z + height]`. The base sits at `center.z`.
pub fn rasterize_cylinder(
    center: DVec3,
    radius: f64,
    height: f64,
    sign: Sign,
    bounds: &GridBounds,
) -> Vec<VoxelRecord> {
    let xs = bounds.clip_axis(cylinder_axis(center.x, radius));
    let ys = bounds.clip_axis(cylinder_axis(center.y, radius));
    let zs = bounds.clip_axis(cylinder_height_axis(center.z, height));

    let radius_sq = radius * radius;
    let mut disc = Vec::new();
    for x in xs {
        for y in ys.clone() {
            let dx = x as f64 - center.x;
            let dy = y as f64 - center.y;
            if dx * dx + dy * dy <= radius_sq && radius >= 0.0 {
                disc.push((x, y));
            }
        }
    }

    let mut records = Vec::with_capacity(disc.len() * zs.len());
    for &(x, y) in &disc {
        for z in zs.clone() {
            records.push(VoxelRecord::new(IVec3::new(x, y, z), sign));
        }
    }

    log_generated("cylinder", &records, || {
        format!("radius {} height {} at {}", radius, height, center)
    });
    records
}

fn log_clipped(kind: &str, unclipped: u64, kept: u64) {
    if kept < unclipped {
        log::debug!(
            "{} clipped to grid bounds: {} of {} cells dropped",
            kind,
            unclipped - kept,
            unclipped
        );
    }
}

fn log_generated(kind: &str, records: &[VoxelRecord], describe: impl FnOnce() -> String) {
    if records.is_empty() {
        log::info!("No voxels generated for {} ({})", kind, describe());
    } else {
        log::debug!("Generated {} voxels for {} ({})", records.len(), kind, describe());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxcsg_core::math::cube_cell_count;

    fn big() -> GridBounds {
        GridBounds::new(1000)
    }

    #[test]
    fn test_cube_count_matches_floor_formula() {
        for &(l, w, h) in &[(7.0, 8.0, 9.0), (4.0, 4.0, 4.0), (3.2, 1.0, 10.5)] {
            let recs = rasterize_cube(
                DVec3::new(100.0, 100.0, 100.0),
                DVec3::new(l, w, h),
                Sign::Positive,
                &big(),
            );
            assert_eq!(recs.len() as u64, cube_cell_count(l, w, h));
        }
    }

    #[test]
    fn test_cube_inclusive_ends() {
        let recs = rasterize_cube(
            DVec3::new(10.0, 10.0, 10.0),
            DVec3::new(4.0, 2.0, 0.0),
            Sign::Negative,
            &big(),
        );
        let xs: Vec<i32> = recs.iter().map(|r| r.coord.x).collect();
        assert_eq!(*xs.iter().min().unwrap(), 8);
        assert_eq!(*xs.iter().max().unwrap(), 12);
        assert!(recs.iter().all(|r| r.coord.z == 10));
        assert!(recs.iter().all(|r| r.sign == Sign::Negative));
    }

    #[test]
    fn test_cube_clips_without_clamping() {
        let bounds = GridBounds::new(10);
        let recs = rasterize_cube(
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(4.0, 4.0, 4.0),
            Sign::Positive,
            &bounds,
        );
        // Only the non-negative octant survives: 3 cells per axis.
        assert_eq!(recs.len(), 27);
        assert!(recs.iter().all(|r| bounds.contains(r.coord)));
    }

    #[test]
    fn test_cube_fully_outside_is_empty() {
        let recs = rasterize_cube(
            DVec3::new(500.0, 5.0, 5.0),
            DVec3::new(4.0, 4.0, 4.0),
            Sign::Positive,
            &GridBounds::new(300),
        );
        assert!(recs.is_empty());
    }

    #[test]
    fn test_huge_cube_is_clipped_to_grid() {
        let bounds = GridBounds::new(10);
        let recs = rasterize_cube(
            DVec3::splat(5.0),
            DVec3::splat(1e7),
            Sign::Positive,
            &bounds,
        );
        assert_eq!(recs.len(), 1000);

        let row = rasterize_cube(
            DVec3::splat(5.0),
            DVec3::new(1e300, 1.0, 1.0),
            Sign::Negative,
            &bounds,
        );
        assert_eq!(row.len(), 10);
        assert!(row.iter().all(|r| r.coord.y == 5 && r.coord.z == 5));
    }

    #[test]
    fn test_cylinder_distance_and_height() {
        let center = DVec3::new(50.0, 50.0, 20.0);
        let radius = 4.5;
        let height = 6.5;
        let recs = rasterize_cylinder(center, radius, height, Sign::Positive, &big());
        assert!(!recs.is_empty());
        for r in &recs {
            let dx = r.coord.x as f64 - center.x;
            let dy = r.coord.y as f64 - center.y;
            assert!((dx * dx + dy * dy).sqrt() <= radius);
            assert!(r.coord.z as f64 >= center.z);
            assert!(r.coord.z as f64 <= center.z + height);
        }
        // Height is not floored: z runs 20..=26.
        let max_z = recs.iter().map(|r| r.coord.z).max().unwrap();
        assert_eq!(max_z, 26);
    }

    fn disc(radius: f64) -> Vec<(i32, i32)> {
        let mut cells: Vec<(i32, i32)> = rasterize_cylinder(
            DVec3::new(50.0, 50.0, 0.0),
            radius,
            0.0,
            Sign::Positive,
            &big(),
        )
        .iter()
        .map(|r| (r.coord.x - 50, r.coord.y - 50))
        .collect();
        cells.sort();
        cells
    }

    #[test]
    fn test_cylinder_integer_radius_keeps_rim() {
        let cells = disc(2.0);
        // Distance exactly 2 is kept; (1, 2) at sqrt(5) is not.
        for rim in [(2, 0), (-2, 0), (0, 2), (0, -2)] {
            assert!(cells.contains(&rim), "{rim:?} missing");
        }
        assert!(!cells.contains(&(1, 2)));
        assert!(!cells.contains(&(2, 1)));
        assert!(!cells.contains(&(3, 0)));
        assert_eq!(cells.len(), 13);
    }

    #[test]
    fn test_cylinder_fractional_radius() {
        let cells = disc(2.5);
        // sqrt(5) < 2.5 < sqrt(8).
        assert!(cells.contains(&(1, 2)));
        assert!(cells.contains(&(-2, -1)));
        assert!(!cells.contains(&(2, 2)));
        assert!(!cells.contains(&(3, 0)));
        assert_eq!(cells.len(), 21);

        // Off-grid center: distance measured from the exact center.
        let recs = rasterize_cylinder(
            DVec3::new(10.5, 10.5, 3.0),
            1.0,
            1.5,
            Sign::Positive,
            &big(),
        );
        let mut xy: Vec<(i32, i32)> = recs.iter().map(|r| (r.coord.x, r.coord.y)).collect();
        xy.sort();
        xy.dedup();
        assert_eq!(xy, vec![(10, 10), (10, 11), (11, 10), (11, 11)]);
        let zs: Vec<i32> = recs.iter().map(|r| r.coord.z).collect();
        assert_eq!(zs.iter().min(), Some(&3));
        assert_eq!(zs.iter().max(), Some(&4));
    }

    #[test]
    fn test_cylinder_zero_radius_is_single_column() {
        let recs = rasterize_cylinder(
            DVec3::new(5.0, 5.0, 0.0),
            0.0,
            2.0,
            Sign::Positive,
            &big(),
        );
        assert_eq!(recs.len(), 3);
        assert!(recs.iter().all(|r| r.coord.x == 5 && r.coord.y == 5));
    }

    #[test]
    fn test_cylinder_negative_radius_is_empty() {
        let recs = rasterize_cylinder(
            DVec3::new(5.0, 5.0, 0.0),
            -1.0,
            2.0,
            Sign::Positive,
            &big(),
        );
        assert!(recs.is_empty());
    }
}
