use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named numeric parameters of a shape (e.g. `inner_length`, `wall_thickness`).
pub type Parameters = BTreeMap<String, f64>;

/// Primitive family an operation rasterizes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Cube,
    Cylinder,
}

/// Placement role of an operation inside a box-like composite.
///
/// Centers are derived from the placement origin and the composite's outer
/// extents (`inner + 2 * wall` in X/Y, `inner + wall` in Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Outer shell, centered on the outer extents.
    Shell,
    /// Interior cavity, raised by half a wall thickness.
    Cavity,
    /// Slab removing the top wall layer.
    OpenTop,
    /// Detachable lid beside the shell along +X.
    Lid,
    /// Screw support post on the floor.
    ScrewBoss,
    /// Through-hole of the screw post.
    ScrewHole,
}

impl Role {
    /// Primitive family the role is defined for.
    pub fn primitive(self) -> PrimitiveKind {
        match self {
            Role::Shell | Role::Cavity | Role::OpenTop | Role::Lid => PrimitiveKind::Cube,
            Role::ScrewBoss | Role::ScrewHole => PrimitiveKind::Cylinder,
        }
    }

    /// Role implied by a list position in positional ("computed") definitions.
    pub fn from_position(index: usize, primitive: PrimitiveKind) -> Option<Role> {
        match (primitive, index) {
            (PrimitiveKind::Cube, 0) => Some(Role::Shell),
            (PrimitiveKind::Cube, 1) => Some(Role::Cavity),
            (PrimitiveKind::Cube, 2) => Some(Role::OpenTop),
            (PrimitiveKind::Cube, 3) => Some(Role::Lid),
            (PrimitiveKind::Cylinder, 4) => Some(Role::ScrewBoss),
            (PrimitiveKind::Cylinder, 5) => Some(Role::ScrewHole),
            _ => None,
        }
    }
}

/// Where an operation is centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Placement {
    /// The caller-supplied origin, unchanged.
    #[default]
    Explicit,
    /// A center derived from the composite frame.
    Computed(Role),
}

/// One step of a shape definition. Dimensions are arithmetic expressions
/// over the definition's parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    Cube {
        length: String,
        width: String,
        height: String,
        #[serde(default)]
        placement: Placement,
        #[serde(default)]
        negative: bool,
    },
    Cylinder {
        radius: String,
        height: String,
        #[serde(default)]
        placement: Placement,
        #[serde(default)]
        negative: bool,
    },
    /// An operation kind this engine cannot rasterize. Kept so that
    /// interpretation fails at the right step instead of at load time.
    Unsupported { kind: String },
}

impl Operation {
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        match self {
            Operation::Cube { .. } => Some(PrimitiveKind::Cube),
            Operation::Cylinder { .. } => Some(PrimitiveKind::Cylinder),
            Operation::Unsupported { .. } => None,
        }
    }

    pub fn placement(&self) -> Placement {
        match self {
            Operation::Cube { placement, .. } | Operation::Cylinder { placement, .. } => *placement,
            Operation::Unsupported { .. } => Placement::Explicit,
        }
    }

    /// Dimension expressions in declaration order.
    pub fn expressions(&self) -> Vec<&str> {
        match self {
            Operation::Cube {
                length,
                width,
                height,
                ..
            } => vec![length, width, height],
            Operation::Cylinder { radius, height, .. } => vec![radius, height],
            Operation::Unsupported { .. } => Vec::new(),
        }
    }
}

/// Externally stored template of a composite shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDefinition {
    pub name: String,
    /// Definition kind; only the composite kind is interpretable.
    pub kind: String,
    /// Default parameter values. Caller parameters override them.
    #[serde(default)]
    pub parameters: Parameters,
    pub operations: Vec<Operation>,
}
