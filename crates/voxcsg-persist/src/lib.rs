pub mod error;
pub mod file;
pub mod format;
pub mod store;

pub use error::PersistError;
pub use file::JsonFileStore;
pub use format::StoreDocument;
pub use store::{MemoryStore, ObjectStore};
