use std::path::Path;

use thiserror::Error;
use voxcsg_core::shape::ShapeDefinition;

use crate::migration::migrate_legacy_json;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to parse shape RON: {0}")]
    ShapeParseError(String),
    #[error("Failed to parse legacy shape '{name}': {reason}")]
    LegacyParseError { name: String, reason: String },
    #[error("Failed to read shape source {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Parse a single shape definition from a RON string.
pub fn load_shape_from_str(ron_str: &str) -> Result<ShapeDefinition, LoadError> {
    let options = ron::Options::default();
    options
        .from_str(ron_str)
        .map_err(|e| LoadError::ShapeParseError(e.to_string()))
}

/// Load every definition in `dir`: `*.ron` files in the native format and
/// `*.json` files in the legacy format (named after the file stem).
/// Files are read in name order so later files override earlier ones
/// deterministically.
pub fn load_shapes_from_dir(dir: &Path) -> Result<Vec<ShapeDefinition>, LoadError> {
    let io_err = |path: &Path, source| LoadError::Io {
        path: path.display().to_string(),
        source,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let path = entry.map_err(|e| io_err(dir, e))?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut shapes = Vec::new();
    for path in paths {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        if ext != "ron" && ext != "json" {
            continue;
        }
        let text = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        let shape = if ext == "ron" {
            load_shape_from_str(&text)?
        } else {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default();
            migrate_legacy_json(name, &text)?
        };
        log::debug!("Loaded shape '{}' from {}", shape.name, path.display());
        shapes.push(shape);
    }
    Ok(shapes)
}
