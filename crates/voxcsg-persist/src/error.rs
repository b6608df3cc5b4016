/// Errors raised by object stores.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed store file {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("unsupported store format version {0}")]
    UnsupportedVersion(u32),

    #[error("object id space exhausted")]
    IdsExhausted,
}
