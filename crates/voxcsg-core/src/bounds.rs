use std::ops::Range;

use crate::constants::DEFAULT_GRID_SIZE;
use crate::types::Coord;

/// Fixed cubic index space `[0, size)` on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBounds {
    size: i32,
}

impl Default for GridBounds {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE)
    }
}

impl GridBounds {
    /// Non-positive sizes produce an empty grid.
    pub fn new(size: i32) -> Self {
        Self { size: size.max(0) }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    /// Whether every component of `coord` lies in `[0, size)`.
    pub fn contains(&self, coord: Coord) -> bool {
        self.axis_contains(coord.x as i64)
            && self.axis_contains(coord.y as i64)
            && self.axis_contains(coord.z as i64)
    }

    pub fn axis_contains(&self, value: i64) -> bool {
        value >= 0 && value < self.size as i64
    }

    /// Intersect a half-open axis range with `[0, size)`.
    pub fn clip_axis(&self, range: Range<i64>) -> Range<i32> {
        let start = range.start.clamp(0, self.size as i64);
        let end = range.end.clamp(0, self.size as i64);
        if start >= end {
            return 0..0;
        }
        start as i32..end as i32
    }
}
