use glam::IVec3;
use serde::{Deserialize, Serialize};

/// Voxel-space grid coordinate. Unique key of a voxel cell.
pub type Coord = IVec3;

/// Whether a record adds or removes material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    pub fn from_negative(negative: bool) -> Self {
        if negative {
            Sign::Negative
        } else {
            Sign::Positive
        }
    }

    pub fn is_negative(self) -> bool {
        self == Sign::Negative
    }
}

/// RGBA display color, each channel in 0.0–1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba(pub [f32; 4]);

impl Rgba {
    pub const WHITE: Rgba = Rgba([1.0, 1.0, 1.0, 1.0]);
    pub const RED: Rgba = Rgba([1.0, 0.0, 0.0, 1.0]);
    pub const GREEN: Rgba = Rgba([0.0, 1.0, 0.0, 1.0]);
    pub const BLUE: Rgba = Rgba([0.0, 0.0, 1.0, 1.0]);
    pub const YELLOW: Rgba = Rgba([1.0, 1.0, 0.0, 1.0]);
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::WHITE
    }
}

/// One entry of the voxel history, in draw order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelRecord {
    pub coord: Coord,
    pub sign: Sign,
    /// Display color. Only meaningful for positive records.
    pub color: Option<Rgba>,
}

impl VoxelRecord {
    pub fn new(coord: Coord, sign: Sign) -> Self {
        Self {
            coord,
            sign,
            color: None,
        }
    }

    pub fn positive(coord: Coord) -> Self {
        Self::new(coord, Sign::Positive)
    }

    pub fn negative(coord: Coord) -> Self {
        Self::new(coord, Sign::Negative)
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }
}
