//! Process-global flags persisted on disk: the safe-mode toggle.

use crate::error::Result;
use objstore_fs::backend::IoBackend;
use objstore_fs::io::{self, RobustnessConfig};
use std::path::{Path, PathBuf};

/// Content is truthy iff non-empty and not equal to the literal byte `"0"`.
fn is_truthy(bytes: &[u8]) -> bool {
    !bytes.is_empty() && bytes != b"0"
}

/// Reads and writes the `safe_mode` flag file at the storage root.
///
/// Callers (the façade) are responsible for dispatching the
/// `SAFE_MODE_ENABLED` / `SAFE_MODE_DISABLED` events after a
/// successful call here; this type only owns the on-disk bit.
pub struct StateHandler {
    path: PathBuf,
}

impl StateHandler {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            path: root.as_ref().join("safe_mode"),
        }
    }

    /// Returns `true` if this call changed the state (was previously disabled).
    pub fn enable_safe_mode(&self, backend: &dyn IoBackend) -> Result<bool> {
        let was_enabled = self.safe_mode_enabled(backend)?;
        io::write_atomic(backend, &self.path, b"1", RobustnessConfig::default())?;
        tracing::info!(path = %self.path.display(), "safe mode enabled");
        Ok(!was_enabled)
    }

    /// Returns `true` if this call changed the state (was previously enabled).
    pub fn disable_safe_mode(&self, backend: &dyn IoBackend) -> Result<bool> {
        let was_enabled = self.safe_mode_enabled(backend)?;
        backend.remove_file(&self.path)?;
        tracing::info!(path = %self.path.display(), "safe mode disabled");
        Ok(was_enabled)
    }

    pub fn safe_mode_enabled(&self, backend: &dyn IoBackend) -> Result<bool> {
        if !backend.is_file(&self.path) {
            return Ok(false);
        }
        let bytes = backend.read(&self.path)?;
        Ok(is_truthy(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objstore_fs::backend::MemoryBackend;

    #[test]
    fn disabled_by_default() {
        let backend = MemoryBackend::new();
        let state = StateHandler::new("/root");
        assert!(!state.safe_mode_enabled(&backend).unwrap());
    }

    #[test]
    fn enable_then_disable_round_trips() {
        let backend = MemoryBackend::new();
        let state = StateHandler::new("/root");

        assert!(state.enable_safe_mode(&backend).unwrap());
        assert!(state.safe_mode_enabled(&backend).unwrap());

        assert!(state.disable_safe_mode(&backend).unwrap());
        assert!(!state.safe_mode_enabled(&backend).unwrap());
    }

    #[test]
    fn enabling_twice_is_idempotent_and_reports_no_change_the_second_time() {
        let backend = MemoryBackend::new();
        let state = StateHandler::new("/root");

        assert!(state.enable_safe_mode(&backend).unwrap());
        assert!(!state.enable_safe_mode(&backend).unwrap());
        assert!(state.safe_mode_enabled(&backend).unwrap());
    }

    #[test]
    fn truthy_check_rejects_literal_zero_byte() {
        let backend = MemoryBackend::new();
        let path = PathBuf::from("/root/safe_mode");
        backend.write_new(&path, b"0").unwrap();
        let state = StateHandler::new("/root");
        assert!(!state.safe_mode_enabled(&backend).unwrap());
    }

    #[test]
    fn missing_file_means_disabled() {
        let backend = MemoryBackend::new();
        let state = StateHandler::new("/root");
        assert!(state.disable_safe_mode(&backend).is_ok());
        assert!(!state.safe_mode_enabled(&backend).unwrap());
    }
}
