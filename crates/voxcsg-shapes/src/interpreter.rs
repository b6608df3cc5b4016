//! Turns a shape definition into voxelizer calls applied to a scene.

use glam::DVec3;
use thiserror::Error;
use voxcsg_core::constants::{COMPOSITE_KIND, LID_GAP};
use voxcsg_core::shape::{Operation, Parameters, Placement, PrimitiveKind, Role, ShapeDefinition};
use voxcsg_core::types::{Coord, Sign};
use voxcsg_world::voxelizer::{rasterize_cube, rasterize_cylinder};
use voxcsg_world::Scene;

use crate::expr::{evaluate, ExprError};
use crate::library::{ShapeLibrary, ShapeSource};

#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("unknown shape '{0}'")]
    UnknownShape(String),
    #[error("unsupported shape kind '{0}'")]
    UnsupportedKind(String),
    #[error("expression evaluation failed: {0}")]
    Evaluation(#[from] ExprError),
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    #[error("missing parameter '{0}'")]
    MissingParameter(String),
}

/// One voxelizer call made while interpreting a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedOperation {
    pub index: usize,
    pub primitive: PrimitiveKind,
    pub role: Option<Role>,
    pub center: DVec3,
    pub negative: bool,
    /// Records produced after clipping.
    pub voxels: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawReport {
    pub shape: String,
    pub operations: Vec<AppliedOperation>,
    /// Canonical voxel count after the last operation.
    pub canonical: usize,
}

/// Outer extents of a box-like composite. The top is open, so the height
/// only adds one wall.
#[derive(Debug, Clone, Copy)]
struct BoxFrame {
    outer: DVec3,
    wall: f64,
}

impl BoxFrame {
    fn from_params(params: &Parameters) -> Result<Self, ShapeError> {
        let wall = require(params, "wall_thickness")?;
        Ok(Self {
            outer: DVec3::new(
                require(params, "inner_length")? + 2.0 * wall,
                require(params, "inner_width")? + 2.0 * wall,
                require(params, "inner_height")? + wall,
            ),
            wall,
        })
    }
}

fn require(params: &Parameters, name: &str) -> Result<f64, ShapeError> {
    params
        .get(name)
        .copied()
        .ok_or_else(|| ShapeError::MissingParameter(name.to_string()))
}

pub struct Interpreter<S = ShapeLibrary> {
    source: S,
}

impl<S: ShapeSource> Interpreter<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Draw `name` at `origin` into `scene`.
    ///
    /// `params` override the definition's defaults. `negative_override`
    /// replaces every operation's own sign when set. Each operation is
    /// appended and merged before the next runs; a failure stops the
    /// remaining operations and keeps what was already applied.
    pub fn interpret(
        &self,
        scene: &mut Scene,
        name: &str,
        origin: Coord,
        params: &Parameters,
        negative_override: Option<bool>,
    ) -> Result<DrawReport, ShapeError> {
        let shape = self
            .source
            .load_shape_definition(name)
            .ok_or_else(|| ShapeError::UnknownShape(name.to_string()))?;
        if shape.kind != COMPOSITE_KIND {
            return Err(ShapeError::UnsupportedKind(shape.kind));
        }

        let mut merged = shape.parameters.clone();
        merged.extend(params.iter().map(|(k, v)| (k.clone(), *v)));

        let mut run = Run {
            shape: &shape,
            params: &merged,
            origin: origin.as_dvec3(),
            frame: None,
        };
        let mut report = DrawReport {
            shape: shape.name.clone(),
            operations: Vec::with_capacity(shape.operations.len()),
            canonical: scene.voxels().len(),
        };

        for (index, op) in shape.operations.iter().enumerate() {
            match run.apply(scene, index, op, negative_override) {
                Ok(applied) => {
                    report.canonical = scene.voxels().len();
                    report.operations.push(applied);
                }
                Err(e) => {
                    log::warn!(
                        "Shape '{}' aborted at operation {} after {} applied: {}",
                        shape.name,
                        index,
                        report.operations.len(),
                        e
                    );
                    return Err(e);
                }
            }
        }

        log::debug!(
            "Shape '{}' drawn at {} with {} operations, {} voxels",
            shape.name,
            origin,
            report.operations.len(),
            report.canonical
        );
        Ok(report)
    }
}

/// State of one interpretation. The box frame is derived on first use, so
/// definitions with only explicit placements need no box parameters.
struct Run<'a> {
    shape: &'a ShapeDefinition,
    params: &'a Parameters,
    origin: DVec3,
    frame: Option<BoxFrame>,
}

impl Run<'_> {
    fn frame(&mut self) -> Result<BoxFrame, ShapeError> {
        if let Some(frame) = self.frame {
            return Ok(frame);
        }
        let frame = BoxFrame::from_params(self.params)?;
        self.frame = Some(frame);
        Ok(frame)
    }

    fn eval(&self, expr: &str) -> Result<f64, ShapeError> {
        Ok(evaluate(expr, self.params)?)
    }

    fn apply(
        &mut self,
        scene: &mut Scene,
        index: usize,
        op: &Operation,
        negative_override: Option<bool>,
    ) -> Result<AppliedOperation, ShapeError> {
        let bounds = *scene.bounds();
        let (primitive, role, negative, center, records) = match op {
            Operation::Cube {
                length,
                width,
                height,
                placement,
                negative,
            } => {
                let role = self.role_for(index, *placement, PrimitiveKind::Cube)?;
                let negative = negative_override.unwrap_or(*negative);
                let size = DVec3::new(self.eval(length)?, self.eval(width)?, self.eval(height)?);
                let center = self.cube_center(role, size)?;
                let records = rasterize_cube(center, size, Sign::from_negative(negative), &bounds);
                (PrimitiveKind::Cube, role, negative, center, records)
            }
            Operation::Cylinder {
                radius,
                height,
                placement,
                negative,
            } => {
                let role = self.role_for(index, *placement, PrimitiveKind::Cylinder)?;
                let negative = negative_override.unwrap_or(*negative);
                let radius = self.eval(radius)?;
                let height = self.eval(height)?;
                let center = self.cylinder_center(role)?;
                let records = rasterize_cylinder(
                    center,
                    radius,
                    height,
                    Sign::from_negative(negative),
                    &bounds,
                );
                (PrimitiveKind::Cylinder, role, negative, center, records)
            }
            Operation::Unsupported { kind } => {
                return Err(ShapeError::UnsupportedOperation(format!(
                    "operation {} of '{}' has kind '{}'",
                    index, self.shape.name, kind
                )))
            }
        };

        let voxels = records.len();
        scene.apply(records);
        Ok(AppliedOperation {
            index,
            primitive,
            role,
            center,
            negative,
            voxels,
        })
    }

    fn role_for(
        &self,
        index: usize,
        placement: Placement,
        primitive: PrimitiveKind,
    ) -> Result<Option<Role>, ShapeError> {
        match placement {
            Placement::Explicit => Ok(None),
            Placement::Computed(role) if role.primitive() == primitive => Ok(Some(role)),
            Placement::Computed(role) => Err(ShapeError::UnsupportedOperation(format!(
                "operation {} of '{}': role {:?} cannot place a {:?}",
                index, self.shape.name, role, primitive
            ))),
        }
    }

    fn cube_center(&mut self, role: Option<Role>, size: DVec3) -> Result<DVec3, ShapeError> {
        let Some(role) = role else {
            return Ok(self.origin);
        };
        let o = self.origin;
        let f = self.frame()?;
        let half = f.outer / 2.0;
        Ok(match role {
            Role::Shell => o + half,
            Role::Cavity => DVec3::new(o.x + half.x, o.y + half.y, o.z + half.z + f.wall / 2.0),
            Role::OpenTop => DVec3::new(o.x + half.x, o.y + half.y, o.z + f.outer.z - f.wall / 2.0),
            Role::Lid => DVec3::new(
                o.x + f.outer.x + LID_GAP + size.x / 2.0,
                o.y + half.y,
                o.z + size.z / 2.0,
            ),
            Role::ScrewBoss | Role::ScrewHole => o,
        })
    }

    fn cylinder_center(&mut self, role: Option<Role>) -> Result<DVec3, ShapeError> {
        if role.is_none() {
            return Ok(self.origin);
        }
        let o = self.origin;
        let f = self.frame()?;
        let edge = require(self.params, "screw_distance_from_edge")?;
        Ok(DVec3::new(o.x + edge + f.wall, o.y + f.outer.y / 2.0, o.z))
    }
}
