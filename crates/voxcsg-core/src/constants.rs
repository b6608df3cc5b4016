//! Single source of truth for shared constants.

/// Default side length of the cubic voxel grid.
pub const DEFAULT_GRID_SIZE: i32 = 300;

/// Gap along +X between a box shell and its detachable lid.
pub const LID_GAP: f64 = 5.0;

/// Shape-definition kind understood by the interpreter.
pub const COMPOSITE_KIND: &str = "custom";

/// Object type under which the right-triangle figure is stored.
pub const FIGURE_OBJECT_TYPE: &str = "pythagorean_theorem";

/// Shape drawn by the `draw a box` command.
pub const BOX_SHAPE: &str = "box";

/// Legs of the right-triangle figure, in voxels.
pub const FIGURE_LEG_A: i32 = 40;
pub const FIGURE_LEG_B: i32 = 50;
