pub mod bounds;
pub mod constants;
pub mod math;
pub mod object;
pub mod shape;
pub mod types;

pub use bounds::GridBounds;
pub use object::{ObjectId, ObjectSpec, StoredObject};
pub use shape::{Operation, Parameters, Placement, PrimitiveKind, Role, ShapeDefinition};
pub use types::{Coord, Rgba, Sign, VoxelRecord};
