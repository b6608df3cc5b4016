pub mod figure;
pub mod scene;
pub mod voxel_set;
pub mod voxelizer;

pub use scene::{NullRenderer, RenderFrame, Renderer, Scene};
pub use voxel_set::VoxelSet;
