use std::collections::HashMap;

use voxcsg_core::types::{Coord, Rgba, Sign, VoxelRecord};

/// CSG accumulator: an append-only history of signed records plus the
/// canonical state obtained by replaying it.
///
/// Invariant: after `recompute`, `canonical` equals the replay of `history`
/// under first-writer-wins. A positive record inserts its coordinate only
/// when absent; a negative record removes it (and its color) if present.
#[derive(Debug, Default, Clone)]
pub struct VoxelSet {
    history: Vec<VoxelRecord>,
    canonical: HashMap<Coord, Option<Rgba>>,
}

impl VoxelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append records to the history. Canonical state is stale until
    /// `recompute` runs.
    pub fn append(&mut self, records: impl IntoIterator<Item = VoxelRecord>) {
        self.history.extend(records);
    }

    /// Rebuild canonical state from the full history, in insertion order.
    pub fn recompute(&mut self) {
        let mut canonical: HashMap<Coord, Option<Rgba>> = HashMap::new();
        for record in &self.history {
            match record.sign {
                Sign::Positive => {
                    canonical.entry(record.coord).or_insert(record.color);
                }
                Sign::Negative => {
                    canonical.remove(&record.coord);
                }
            }
        }
        self.canonical = canonical;
        log::debug!(
            "{} voxels remain after merge ({} history records)",
            self.canonical.len(),
            self.history.len()
        );
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.canonical.clear();
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.canonical.contains_key(&coord)
    }

    /// Color fixed at first insertion. `None` if absent or uncolored.
    pub fn color(&self, coord: Coord) -> Option<Rgba> {
        self.canonical.get(&coord).copied().flatten()
    }

    /// Canonical coordinates sorted by (x, y, z).
    pub fn coords(&self) -> Vec<Coord> {
        let mut coords: Vec<Coord> = self.canonical.keys().copied().collect();
        coords.sort_unstable_by_key(|c| (c.x, c.y, c.z));
        coords
    }

    /// Canonical coordinates with their colors, sorted like `coords`.
    pub fn colored(&self, fallback: Rgba) -> Vec<(Coord, Rgba)> {
        self.coords()
            .into_iter()
            .map(|c| (c, self.color(c).unwrap_or(fallback)))
            .collect()
    }

    pub fn history(&self) -> &[VoxelRecord] {
        &self.history
    }
}
