//! Atomic I/O: write-to-temp-then-rename, with retry against lock contention.

use crate::backend::IoBackend;
use crate::error::{Error, Result};
use backoff::ExponentialBackoff;
use std::path::Path;
use std::time::Duration;

/// Configuration for filesystem robustness/performance trade-offs.
#[derive(Debug, Clone, Copy)]
pub struct RobustnessConfig {
    /// Whether the backend should fsync before considering a write durable.
    ///
    /// The [`crate::backend::OsBackend`] always fsyncs in `write_new`;
    /// this flag is read by higher layers that decide whether to wait
    /// for that guarantee before releasing a lock.
    pub enable_fsync: bool,

    /// Maximum duration to wait for the coordination lock before failing.
    pub lock_timeout: Duration,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            enable_fsync: true,
            lock_timeout: Duration::from_secs(10),
        }
    }
}

/// Write `content` to `path` atomically.
///
/// Writes to a sibling temp file first, then renames over the target.
/// A short-lived coordination lock on `path` (via the backend's lock
/// handle) serializes concurrent writers to the same path; contention
/// is retried with exponential backoff up to `config.lock_timeout`.
pub fn write_atomic(
    backend: &dyn IoBackend,
    path: &Path,
    content: &[u8],
    config: RobustnessConfig,
) -> Result<()> {
    tracing::debug!(path = %path.display(), content_len = content.len(), "starting atomic write");

    if let Some(parent) = path.parent() {
        backend.create_dir_all(parent)?;
    }

    let lock_handle = backend.open_lock_handle(path)?;
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(temp_name);

    let op = || -> std::result::Result<(), backoff::Error<Error>> {
        let acquired = lock_handle
            .try_lock_exclusive()
            .map_err(backoff::Error::Permanent)?;
        if !acquired {
            return Err(backoff::Error::transient(Error::LockFailed {
                path: path.to_path_buf(),
            }));
        }

        let result = backend
            .write_new(&temp_path, content)
            .and_then(|_| backend.rename(&temp_path, path));

        if let Err(e) = lock_handle.unlock() {
            tracing::warn!(path = %path.display(), error = %e, "failed to release coordination lock");
        }

        result.map_err(backoff::Error::transient)
    };

    let backoff_policy = ExponentialBackoff {
        max_elapsed_time: Some(config.lock_timeout),
        ..ExponentialBackoff::default()
    };

    let result = backoff::retry(backoff_policy, op).map_err(|e| match e {
        backoff::Error::Permanent(err) | backoff::Error::Transient { err, .. } => err,
    });

    if result.is_err() {
        let _ = backend.remove_file(&temp_path);
    }

    result
}

/// Read the full contents of `path`.
pub fn read_all(backend: &dyn IoBackend, path: &Path) -> Result<Vec<u8>> {
    backend.read(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use std::path::PathBuf;

    #[test]
    fn write_atomic_leaves_no_temp_file_on_success() {
        let backend = MemoryBackend::new();
        let path = PathBuf::from("/root/a/object");
        write_atomic(&backend, &path, b"payload", RobustnessConfig::default()).unwrap();

        assert_eq!(read_all(&backend, &path).unwrap(), b"payload");
        assert!(!backend.is_file(&path.with_file_name(format!(".object.{}.tmp", std::process::id()))));
    }

    #[test]
    fn write_atomic_overwrites_existing_record() {
        let backend = MemoryBackend::new();
        let path = PathBuf::from("/root/a/object");
        write_atomic(&backend, &path, b"first", RobustnessConfig::default()).unwrap();
        write_atomic(&backend, &path, b"second", RobustnessConfig::default()).unwrap();
        assert_eq!(read_all(&backend, &path).unwrap(), b"second");
    }
}
