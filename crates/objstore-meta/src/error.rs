//! Error types for objstore-meta

use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] objstore_fs::Error),

    #[error("Metadata record is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("No metadata record for {0}")]
    NotFound(Uuid),
}
