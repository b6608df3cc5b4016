use voxcsg_core::object::{ObjectId, ObjectSpec, StoredObject};

use crate::error::PersistError;
use crate::format::StoreDocument;

/// Persistence of drawn objects. Calls are synchronous and never retried.
pub trait ObjectStore: Send {
    /// Persist `spec` and return its newly assigned ID.
    fn save_object(&mut self, spec: ObjectSpec) -> Result<ObjectId, PersistError>;

    /// Rows with the given ID, or every row in insertion order.
    fn load_objects(&self, id: Option<ObjectId>) -> Result<Vec<StoredObject>, PersistError>;
}

/// Store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: StoreDocument,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ObjectStore for MemoryStore {
    fn save_object(&mut self, spec: ObjectSpec) -> Result<ObjectId, PersistError> {
        let id = self.doc.allocate_id()?;
        self.doc.objects.push(StoredObject { id, spec });
        Ok(id)
    }

    fn load_objects(&self, id: Option<ObjectId>) -> Result<Vec<StoredObject>, PersistError> {
        Ok(self.doc.select(id))
    }
}
