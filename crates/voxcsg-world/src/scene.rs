use voxcsg_core::bounds::GridBounds;
use voxcsg_core::types::{Coord, Rgba, VoxelRecord};

use crate::voxel_set::VoxelSet;

/// Snapshot of the canonical state handed to the visualization hook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderFrame {
    pub coords: Vec<Coord>,
    /// One color per coordinate, white where none was tracked.
    pub colors: Vec<Rgba>,
}

impl RenderFrame {
    pub fn from_set(set: &VoxelSet) -> Self {
        let (coords, colors) = set.colored(Rgba::WHITE).into_iter().unzip();
        Self { coords, colors }
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

/// Visualization refresh hook. Called with the lock on the scene held, so
/// implementations must return quickly.
pub trait Renderer: Send {
    fn render(&self, frame: &RenderFrame);
}

/// Renderer that discards every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&self, _frame: &RenderFrame) {}
}

/// Owned voxel workspace: the voxel set, its grid bounds and the render hook.
pub struct Scene {
    voxels: VoxelSet,
    bounds: GridBounds,
    renderer: Box<dyn Renderer>,
    track_colors: bool,
}

impl Scene {
    pub fn new(bounds: GridBounds, renderer: Box<dyn Renderer>) -> Self {
        Self {
            voxels: VoxelSet::new(),
            bounds,
            renderer,
            track_colors: true,
        }
    }

    /// A scene with no render hook.
    pub fn headless(bounds: GridBounds) -> Self {
        Self::new(bounds, Box::new(NullRenderer))
    }

    pub fn with_color_tracking(mut self, track_colors: bool) -> Self {
        self.track_colors = track_colors;
        self
    }

    /// Append `records`, recompute canonical state and refresh the renderer.
    /// An empty batch leaves the scene untouched. Returns the canonical count.
    pub fn apply(&mut self, records: Vec<VoxelRecord>) -> usize {
        if records.is_empty() {
            return self.voxels.len();
        }
        let track = self.track_colors;
        self.voxels.append(records.into_iter().map(|mut r| {
            r.color = if track {
                Some(r.color.unwrap_or(Rgba::WHITE))
            } else {
                None
            };
            r
        }));
        self.voxels.recompute();
        self.refresh();
        self.voxels.len()
    }

    /// Rebuild canonical state from history and refresh the renderer.
    pub fn recompute(&mut self) {
        self.voxels.recompute();
        self.refresh();
    }

    pub fn clear(&mut self) {
        self.voxels.clear();
        self.refresh();
    }

    pub fn refresh(&self) {
        self.renderer.render(&RenderFrame::from_set(&self.voxels));
    }

    pub fn voxels(&self) -> &VoxelSet {
        &self.voxels
    }

    pub fn bounds(&self) -> &GridBounds {
        &self.bounds
    }
}
