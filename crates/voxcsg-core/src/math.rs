//! Center/extent to index conversions used by the voxelizer.
//!
//! Integer conversion truncates toward zero and half-extents are floored,
//! so the realized extent of a primitive depends on the parity of its
//! dimensions. Stored geometry is replayed through these helpers, so their
//! rounding must stay exactly as is.

use std::ops::Range;

/// Truncate toward zero into an index. Saturates on overflow, NaN maps to 0.
pub fn trunc_index(value: f64) -> i64 {
    value.trunc() as i64
}

/// Floored half of an extent (`7.0 -> 3.0`, `103.2 -> 51.0`).
pub fn floor_half(extent: f64) -> f64 {
    (extent / 2.0).floor()
}

/// Half-open index range covered by a box axis of the given extent.
///
/// Covers `floor_half(extent) * 2 + 1` cells whenever both ends are
/// non-negative.
pub fn cube_axis(center: f64, extent: f64) -> Range<i64> {
    let half = floor_half(extent);
    trunc_index(center - half)..trunc_index(center + half + 1.0)
}

/// Integer search radius around a cylinder axis.
pub fn cylinder_reach(radius: f64) -> f64 {
    radius.trunc() + 1.0
}

/// Half-open index range scanned across a cylinder's cross-section axis.
pub fn cylinder_axis(center: f64, radius: f64) -> Range<i64> {
    let reach = cylinder_reach(radius);
    trunc_index(center - reach)..trunc_index(center + reach + 1.0)
}

/// Half-open index range of a cylinder's height axis, starting at its base.
pub fn cylinder_height_axis(base: f64, height: f64) -> Range<i64> {
    trunc_index(base)..trunc_index(base + height + 1.0)
}

/// Number of cells a box of the given extents covers before clipping.
/// Saturates at `u64::MAX`.
pub fn cube_cell_count(length: f64, width: f64, height: f64) -> u64 {
    let cells = |extent: f64| -> u64 {
        let half = floor_half(extent);
        if half < 0.0 {
            0
        } else {
            (half as u64).saturating_mul(2).saturating_add(1)
        }
    };
    cells(length)
        .saturating_mul(cells(width))
        .saturating_mul(cells(height))
}
