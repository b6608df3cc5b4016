//! Outline figures drawn on the `z = 0` plane.
//!
//! The right-triangle figure is the one non-axis-aligned drawing: the square
//! on its hypotenuse is rotated by the hypotenuse angle. All figure voxels
//! are positive; overlaps resolve by draw order (legs first).

use glam::{DVec2, DVec3, IVec3};
use voxcsg_core::bounds::GridBounds;
use voxcsg_core::math::{floor_half, trunc_index};
use voxcsg_core::types::{Coord, Rgba, VoxelRecord};

/// Edge cells of the box `center ± floor(size / 2)`: every cell lying on at
/// least two of its boundary planes. For a box one cell thick this is the
/// outline of a rectangle.
pub fn cube_contour(center: DVec3, size: DVec3) -> Vec<IVec3> {
    let lo = |c: f64, e: f64| trunc_index(c - floor_half(e));
    let hi = |c: f64, e: f64| trunc_index(c + floor_half(e));
    let (x0, x1) = (lo(center.x, size.x), hi(center.x, size.x));
    let (y0, y1) = (lo(center.y, size.y), hi(center.y, size.y));
    let (z0, z1) = (lo(center.z, size.z), hi(center.z, size.z));

    let mut out = Vec::new();
    for x in x0..=x1 {
        let on_x = x == x0 || x == x1;
        for y in y0..=y1 {
            let on_y = y == y0 || y == y1;
            for z in z0..=z1 {
                let on_z = z == z0 || z == z1;
                if (on_x && on_y) || (on_x && on_z) || (on_y && on_z) {
                    out.push(IVec3::new(x as i32, y as i32, z as i32));
                }
            }
        }
    }
    out
}

/// Outline of a square of side `2 * (size / 2)` rotated by `angle` radians
/// around `center`, sampled at the integer lattice of the unrotated square.
pub fn rotated_square_contour(center: DVec2, size: i64, angle: f64) -> Vec<IVec3> {
    let half = size.div_euclid(2);
    let (sin, cos) = angle.sin_cos();
    let mut out = Vec::new();
    for x in -half..=half {
        for y in -half..=half {
            if x.abs() != half && y.abs() != half {
                continue;
            }
            let (fx, fy) = (x as f64, y as f64);
            let rx = fx * cos - fy * sin + center.x;
            let ry = fx * sin + fy * cos + center.y;
            out.push(IVec3::new(trunc_index(rx) as i32, trunc_index(ry) as i32, 0));
        }
    }
    out
}

/// Right triangle with legs `a` (along +X) and `b` (along +Y) from `origin`,
/// plus the outline square on each side. Only `origin.x` and `origin.y` are
/// used; the figure lies on `z = 0`. Cells outside `bounds` are dropped.
pub fn pythagorean_figure(origin: Coord, a: i32, b: i32, bounds: &GridBounds) -> Vec<VoxelRecord> {
    let (a, b) = (a as i64, b as i64);
    let cx = origin.x as i64;
    let cy = origin.y as i64;
    let side = ((a * a + b * b) as f64).sqrt().floor() as i64;

    let pa = (cx, cy);
    let pb = (cx + a, cy);
    let pc = (cx, cy + b);

    let mut green = Vec::new();
    for x in pa.0..=pb.0 {
        green.push(IVec3::new(x as i32, pa.1 as i32, 0));
    }
    for y in pa.1..=pc.1 {
        green.push(IVec3::new(pa.0 as i32, y as i32, 0));
    }
    let steps = a.max(b).max(1);
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let x = trunc_index(pb.0 as f64 - a as f64 * t);
        let y = trunc_index(pa.1 as f64 + b as f64 * t);
        green.push(IVec3::new(x as i32, y as i32, 0));
    }

    let (fx, fy) = (cx as f64, cy as f64);
    let (fa, fb) = (a as f64, b as f64);
    let red = cube_contour(
        DVec3::new(fx + fa / 2.0, fy - fa / 2.0, 0.0),
        DVec3::new(fa, fa, 1.0),
    );
    let blue = cube_contour(
        DVec3::new(fx - fb / 2.0, fy + fb / 2.0, 0.0),
        DVec3::new(fb, fb, 1.0),
    );

    let hyp = DVec2::new((pc.0 - pb.0) as f64, (pc.1 - pb.1) as f64);
    let outward = DVec2::new(hyp.y, -hyp.x).normalize_or_zero() * (side as f64 / 2.0);
    let midpoint = DVec2::new((pb.0 + pc.0) as f64, (pb.1 + pc.1) as f64) / 2.0;
    let yellow = rotated_square_contour(midpoint + outward, side, hyp.y.atan2(hyp.x));

    let layers = [
        (green, Rgba::GREEN),
        (red, Rgba::RED),
        (blue, Rgba::BLUE),
        (yellow, Rgba::YELLOW),
    ];
    let mut records = Vec::new();
    let mut dropped = 0usize;
    for (coords, color) in layers {
        for coord in coords {
            if bounds.contains(coord) {
                records.push(VoxelRecord::positive(coord).with_color(color));
            } else {
                dropped += 1;
            }
        }
    }
    if dropped > 0 {
        log::debug!("figure clipped to grid bounds: {} cells dropped", dropped);
    }
    records
}
