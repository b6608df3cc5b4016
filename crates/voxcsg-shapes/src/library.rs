use std::collections::BTreeMap;
use std::path::Path;

use voxcsg_core::shape::ShapeDefinition;

use crate::loader::{load_shape_from_str, load_shapes_from_dir, LoadError};
use crate::validator::validate_library;

const BUILTIN_BOX: &str = include_str!("../../../data/shapes/box.ron");

/// Read-only lookup of shape definitions by name.
pub trait ShapeSource {
    fn load_shape_definition(&self, name: &str) -> Option<ShapeDefinition>;
}

/// In-memory set of shape definitions keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ShapeLibrary {
    shapes: BTreeMap<String, ShapeDefinition>,
}

impl ShapeLibrary {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The definitions shipped with the crate.
    pub fn builtin() -> Result<Self, LoadError> {
        let mut library = Self::empty();
        library.insert(load_shape_from_str(BUILTIN_BOX)?);
        Ok(library)
    }

    /// Built-in definitions overlaid with everything in `dir`.
    pub fn with_dir(dir: &Path) -> Result<(Self, Vec<String>), LoadError> {
        let mut library = Self::builtin()?;
        let warnings = library.merge(load_shapes_from_dir(dir)?);
        Ok((library, warnings))
    }

    /// Insert a definition, returning the one it replaced.
    pub fn insert(&mut self, shape: ShapeDefinition) -> Option<ShapeDefinition> {
        self.shapes.insert(shape.name.clone(), shape)
    }

    /// Add a batch of definitions. Validation problems and overrides of
    /// existing names are reported as warnings; nothing is rejected.
    pub fn merge(&mut self, shapes: Vec<ShapeDefinition>) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Err(errors) = validate_library(&shapes) {
            warnings.extend(errors.iter().map(|e| e.to_string()));
        }
        for shape in shapes {
            let name = shape.name.clone();
            if self.insert(shape).is_some() {
                warnings.push(format!("Shape '{}' overrides an existing definition", name));
            }
        }
        for warning in &warnings {
            log::warn!("{}", warning);
        }
        warnings
    }

    pub fn get(&self, name: &str) -> Option<&ShapeDefinition> {
        self.shapes.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.shapes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl ShapeSource for ShapeLibrary {
    fn load_shape_definition(&self, name: &str) -> Option<ShapeDefinition> {
        self.get(name).cloned()
    }
}
