//! Conversion of legacy JSON shape documents into role-tagged definitions.
//!
//! Legacy documents mark placement with `"center": "computed"` and leave the
//! role implicit in the operation's list position. Migration makes the role
//! explicit so the interpreter never looks at positions.

use serde::Deserialize;
use serde_json::Value;
use voxcsg_core::shape::{Operation, Parameters, Placement, PrimitiveKind, Role, ShapeDefinition};

use crate::loader::LoadError;

const COMPUTED_CENTER: &str = "computed";

#[derive(Debug, Deserialize)]
struct LegacyDefinition {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    parameters: Parameters,
    #[serde(default)]
    operations: Vec<Value>,
}

/// Parse a legacy JSON document stored under `name`.
pub fn migrate_legacy_json(name: &str, json: &str) -> Result<ShapeDefinition, LoadError> {
    let legacy: LegacyDefinition =
        serde_json::from_str(json).map_err(|e| LoadError::LegacyParseError {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

    let mut operations = Vec::with_capacity(legacy.operations.len());
    for (index, op) in legacy.operations.iter().enumerate() {
        operations.push(migrate_operation(name, index, op)?);
    }

    Ok(ShapeDefinition {
        name: name.to_string(),
        kind: legacy.kind,
        parameters: legacy.parameters,
        operations,
    })
}

fn migrate_operation(name: &str, index: usize, op: &Value) -> Result<Operation, LoadError> {
    let kind = op.get("type").and_then(Value::as_str).unwrap_or_default();
    let primitive = match kind {
        "cube" => PrimitiveKind::Cube,
        "cylinder" => PrimitiveKind::Cylinder,
        other => {
            return Ok(Operation::Unsupported {
                kind: other.to_string(),
            })
        }
    };

    let computed = op.get("center").and_then(Value::as_str) == Some(COMPUTED_CENTER);
    let placement = if computed {
        Role::from_position(index, primitive)
            .map(Placement::Computed)
            .unwrap_or(Placement::Explicit)
    } else {
        Placement::Explicit
    };
    let negative = op.get("negative").and_then(Value::as_bool).unwrap_or(false);
    let field = |key: &str| expression_field(name, index, op, key);

    Ok(match primitive {
        PrimitiveKind::Cube => Operation::Cube {
            length: field("length")?,
            width: field("width")?,
            height: field("height")?,
            placement,
            negative,
        },
        PrimitiveKind::Cylinder => Operation::Cylinder {
            radius: field("radius")?,
            height: field("height")?,
            placement,
            negative,
        },
    })
}

/// Expressions are usually strings; bare numbers are accepted as literals.
fn expression_field(name: &str, index: usize, op: &Value, key: &str) -> Result<String, LoadError> {
    match op.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(LoadError::LegacyParseError {
            name: name.to_string(),
            reason: format!("operation {index} has no usable '{key}'"),
        }),
    }
}
