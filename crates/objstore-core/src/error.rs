//! Error types for objstore-core

use uuid::Uuid;

/// Result type for objstore-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in objstore-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed UUID string at an ingress point.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    /// No record for this UUID.
    #[error("no object found for {0}")]
    NotFound(Uuid),

    /// Record exists but its TTL has elapsed.
    #[error("object {0} has expired")]
    ObjectExpired(Uuid),

    /// Checksum mismatch or missing sibling file.
    #[error("integrity check failed for {uuid}: {reason}")]
    Integrity { uuid: Uuid, reason: String },

    /// Mutation attempted while safe mode is active.
    #[error("storage is in safe mode; mutating operations are rejected")]
    SafeMode,

    /// Lock contention exceeded the caller's timeout.
    #[error("timed out waiting for lock on {uuid} after {timeout_ms}ms")]
    LockTimeout { uuid: Uuid, timeout_ms: u64 },

    /// A shared lock was asked to upgrade to exclusive in place.
    #[error("cannot upgrade shared lock on {0} directly; release and reacquire")]
    LockUpgradeUnsupported(Uuid),

    /// The UUID generator exhausted its retry budget without a fresh id.
    #[error("UUID generation failed after {attempts} attempts")]
    GenerationFailure { attempts: u32 },

    /// The strategy could not encode or decode a record.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Underlying filesystem error.
    #[error(transparent)]
    Fs(#[from] objstore_fs::Error),

    /// Underlying metadata-layer error.
    #[error(transparent)]
    Meta(#[from] objstore_meta::Error),
}
