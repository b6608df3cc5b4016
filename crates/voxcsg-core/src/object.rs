use serde::{Deserialize, Serialize};

use crate::shape::Parameters;
use crate::types::Coord;

/// Identifier assigned by the object store.
pub type ObjectId = u64;

/// A drawn object as persisted: enough to replay it, never raw voxels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    /// Shape name, or the figure object type.
    pub shape: String,
    #[serde(default)]
    pub parameters: Parameters,
    /// Integer placement origin.
    pub position: [i32; 3],
    #[serde(default)]
    pub negative: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl ObjectSpec {
    pub fn origin(&self) -> Coord {
        Coord::from_array(self.position)
    }
}

/// A persisted object together with its store-assigned ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObject {
    pub id: ObjectId,
    #[serde(flatten)]
    pub spec: ObjectSpec,
}
