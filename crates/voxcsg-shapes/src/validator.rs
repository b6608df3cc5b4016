use std::collections::HashSet;

use thiserror::Error;
use voxcsg_core::shape::{Operation, Placement, PrimitiveKind, Role, ShapeDefinition};

use crate::expr::{Expr, ExprError};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Duplicate shape name '{0}'")]
    DuplicateName(String),
    #[error("Shape '{shape}' operation {index}: role {role:?} cannot place a {primitive:?}")]
    RoleKindMismatch {
        shape: String,
        index: usize,
        role: Role,
        primitive: PrimitiveKind,
    },
    #[error("Shape '{shape}' operation {index}: invalid expression '{expr}': {reason}")]
    BadExpression {
        shape: String,
        index: usize,
        expr: String,
        reason: ExprError,
    },
    #[error("Shape '{shape}' operation {index}: expression '{expr}' uses unknown parameter '{param}'")]
    UnknownParameter {
        shape: String,
        index: usize,
        expr: String,
        param: String,
    },
}

/// Check one definition: placement roles against operation kinds, and every
/// dimension expression against the declared parameters.
pub fn validate_shape(shape: &ShapeDefinition) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    check_shape(shape, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check a batch of definitions, including name uniqueness across the batch.
pub fn validate_library(shapes: &[ShapeDefinition]) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for shape in shapes {
        if !seen.insert(shape.name.as_str()) {
            errors.push(ValidationError::DuplicateName(shape.name.clone()));
        }
    }
    for shape in shapes {
        check_shape(shape, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_shape(shape: &ShapeDefinition, errors: &mut Vec<ValidationError>) {
    for (index, op) in shape.operations.iter().enumerate() {
        if let (Placement::Computed(role), Some(primitive)) = (op.placement(), op.primitive()) {
            if role.primitive() != primitive {
                errors.push(ValidationError::RoleKindMismatch {
                    shape: shape.name.clone(),
                    index,
                    role,
                    primitive,
                });
            }
        }

        if let Operation::Unsupported { .. } = op {
            continue;
        }
        for source in op.expressions() {
            match Expr::parse(source) {
                Ok(expr) => {
                    for param in expr.variables() {
                        if !shape.parameters.contains_key(param) {
                            errors.push(ValidationError::UnknownParameter {
                                shape: shape.name.clone(),
                                index,
                                expr: source.to_string(),
                                param: param.to_string(),
                            });
                        }
                    }
                }
                Err(reason) => errors.push(ValidationError::BadExpression {
                    shape: shape.name.clone(),
                    index,
                    expr: source.to_string(),
                    reason,
                }),
            }
        }
    }
}
