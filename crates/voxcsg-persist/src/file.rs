use std::path::{Path, PathBuf};

use voxcsg_core::object::{ObjectId, ObjectSpec, StoredObject};

use crate::error::PersistError;
use crate::format::StoreDocument;
use crate::store::ObjectStore;

/// Object store backed by one JSON document on disk.
///
/// Every call reads the document afresh; saves rewrite it through a
/// temporary file and a rename so a crash never leaves a torn file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> PersistError {
        PersistError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    /// Current document; a missing file reads as an empty store.
    fn read(&self) -> Result<StoreDocument, PersistError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoreDocument::default())
            }
            Err(e) => return Err(self.io_err(e)),
        };
        let doc: StoreDocument =
            serde_json::from_str(&text).map_err(|e| PersistError::Malformed {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;
        doc.validate()
    }

    fn write(&self, doc: &StoreDocument) -> Result<(), PersistError> {
        let text = serde_json::to_string_pretty(doc).map_err(|e| PersistError::Malformed {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, text).map_err(|e| self.io_err(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))
    }
}

impl ObjectStore for JsonFileStore {
    fn save_object(&mut self, spec: ObjectSpec) -> Result<ObjectId, PersistError> {
        let mut doc = self.read()?;
        let id = doc.allocate_id()?;
        doc.objects.push(StoredObject { id, spec });
        self.write(&doc)?;
        log::debug!("Saved object {} to {}", id, self.path.display());
        Ok(id)
    }

    fn load_objects(&self, id: Option<ObjectId>) -> Result<Vec<StoredObject>, PersistError> {
        Ok(self.read()?.select(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxcsg_core::shape::Parameters;

    fn spec(position: [i32; 3], description: Option<&str>) -> ObjectSpec {
        ObjectSpec {
            shape: "box".into(),
            parameters: Parameters::new(),
            position,
            negative: false,
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("objects.json"));
        assert!(store.load_objects(None).unwrap().is_empty());
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("objects.json");
        let mut store = JsonFileStore::new(&path);
        assert_eq!(store.save_object(spec([1, 2, 3], Some("first"))).unwrap(), 1);
        assert_eq!(store.save_object(spec([4, 5, 6], None)).unwrap(), 2);

        let reopened = JsonFileStore::new(&path);
        let rows = reopened.load_objects(None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].spec.description.as_deref(), Some("first"));
        assert_eq!(rows[1].spec.position, [4, 5, 6]);
        assert_eq!(reopened.load_objects(Some(2)).unwrap().len(), 1);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("objects.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.load_objects(None),
            Err(PersistError::Malformed { .. })
        ));
    }

    #[test]
    fn test_unwritable_location() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where a directory is expected.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let mut store = JsonFileStore::new(blocker.join("objects.json"));
        assert!(matches!(
            store.save_object(spec([0, 0, 0], None)),
            Err(PersistError::Io { .. })
        ));
    }
}
