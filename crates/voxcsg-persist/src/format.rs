use serde::{Deserialize, Serialize};
use voxcsg_core::object::{ObjectId, StoredObject};

use crate::error::PersistError;

/// Current store document version.
pub const FORMAT_VERSION: u32 = 1;

/// First ID handed out by an empty store.
pub const FIRST_OBJECT_ID: ObjectId = 1;

/// On-disk layout of the JSON object store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    pub version: u32,
    /// Next ID to assign. Never reused, even if rows are removed by hand.
    pub next_id: ObjectId,
    pub objects: Vec<StoredObject>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            next_id: FIRST_OBJECT_ID,
            objects: Vec::new(),
        }
    }
}

impl StoreDocument {
    /// Reject documents written by an incompatible version, and repair a
    /// `next_id` that would collide with existing rows.
    pub fn validate(mut self) -> Result<Self, PersistError> {
        if self.version != FORMAT_VERSION {
            return Err(PersistError::UnsupportedVersion(self.version));
        }
        if let Some(max) = self.objects.iter().map(|o| o.id).max() {
            if self.next_id <= max {
                log::warn!(
                    "Store next_id {} collides with existing id {}, advancing",
                    self.next_id,
                    max
                );
                self.next_id = max.checked_add(1).ok_or(PersistError::IdsExhausted)?;
            }
        }
        Ok(self)
    }

    /// Rows matching `id`, or every row in insertion order.
    pub fn select(&self, id: Option<ObjectId>) -> Vec<StoredObject> {
        match id {
            Some(id) => self.objects.iter().filter(|o| o.id == id).cloned().collect(),
            None => self.objects.clone(),
        }
    }

    pub fn allocate_id(&mut self) -> Result<ObjectId, PersistError> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(PersistError::IdsExhausted)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxcsg_core::object::ObjectSpec;
    use voxcsg_core::shape::Parameters;

    fn row(id: ObjectId) -> StoredObject {
        StoredObject {
            id,
            spec: ObjectSpec {
                shape: "box".into(),
                parameters: Parameters::new(),
                position: [1, 2, 3],
                negative: false,
                description: None,
            },
        }
    }

    #[test]
    fn test_version_check() {
        let doc = StoreDocument {
            version: 7,
            ..StoreDocument::default()
        };
        assert!(matches!(
            doc.validate(),
            Err(PersistError::UnsupportedVersion(7))
        ));
    }

    #[test]
    fn test_next_id_repaired() {
        let doc = StoreDocument {
            version: FORMAT_VERSION,
            next_id: 2,
            objects: vec![row(1), row(5)],
        };
        assert_eq!(doc.validate().unwrap().next_id, 6);
    }

    #[test]
    fn test_flattened_row_layout() {
        let json = serde_json::to_value(row(3)).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["shape"], "box");
        assert_eq!(json["position"], serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn test_select() {
        let doc = StoreDocument {
            version: FORMAT_VERSION,
            next_id: 3,
            objects: vec![row(1), row(2)],
        };
        assert_eq!(doc.select(None).len(), 2);
        assert_eq!(doc.select(Some(2))[0].id, 2);
        assert!(doc.select(Some(9)).is_empty());
    }
}
