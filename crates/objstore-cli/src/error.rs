//! Error types for objstore-cli

use serde::Serialize;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from objstore-core
    #[error(transparent)]
    Core(#[from] objstore_core::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },

    /// Failure encoding CLI output as JSON.
    #[error("failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Process exit code: 1 for user/data errors, 2 for operational errors.
    pub fn exit_code(&self) -> i32 {
        use objstore_core::Error as Core;
        match self {
            CliError::User { .. } => 1,
            CliError::Core(Core::InvalidUuid(_))
            | CliError::Core(Core::NotFound(_))
            | CliError::Core(Core::ObjectExpired(_)) => 1,
            CliError::Core(Core::SafeMode)
            | CliError::Core(Core::LockTimeout { .. })
            | CliError::Core(Core::LockUpgradeUnsupported(_))
            | CliError::Core(Core::Integrity { .. })
            | CliError::Core(Core::GenerationFailure { .. })
            | CliError::Core(Core::Serialization(_))
            | CliError::Core(Core::Fs(_))
            | CliError::Core(Core::Meta(_)) => 2,
            CliError::Json(_) => 2,
        }
    }

    fn kind(&self) -> &'static str {
        use objstore_core::Error as Core;
        match self {
            CliError::User { .. } => "user_error",
            CliError::Core(Core::InvalidUuid(_)) => "invalid_uuid",
            CliError::Core(Core::NotFound(_)) => "not_found",
            CliError::Core(Core::ObjectExpired(_)) => "expired",
            CliError::Core(Core::SafeMode) => "safe_mode",
            CliError::Core(Core::LockTimeout { .. }) => "lock_timeout",
            CliError::Core(Core::LockUpgradeUnsupported(_)) => "lock_upgrade_unsupported",
            CliError::Core(Core::Integrity { .. }) => "integrity",
            CliError::Core(Core::GenerationFailure { .. }) => "generation_failure",
            CliError::Core(Core::Serialization(_)) => "serialization",
            CliError::Core(Core::Fs(_)) => "io",
            CliError::Core(Core::Meta(_)) => "meta",
            CliError::Json(_) => "json",
        }
    }

    fn uuid(&self) -> Option<String> {
        use objstore_core::Error as Core;
        match self {
            CliError::Core(Core::NotFound(uuid)) => Some(uuid.to_string()),
            CliError::Core(Core::ObjectExpired(uuid)) => Some(uuid.to_string()),
            CliError::Core(Core::LockUpgradeUnsupported(uuid)) => Some(uuid.to_string()),
            CliError::Core(Core::Integrity { uuid, .. }) => Some(uuid.to_string()),
            CliError::Core(Core::LockTimeout { uuid, .. }) => Some(uuid.to_string()),
            _ => None,
        }
    }

    /// `{ "error": "<kind>", "message": "...", "uuid": "..." }` for `--json` mode.
    pub fn to_json(&self) -> serde_json::Value {
        #[derive(Serialize)]
        struct ErrorBody {
            error: &'static str,
            message: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            uuid: Option<String>,
        }
        serde_json::to_value(ErrorBody {
            error: self.kind(),
            message: self.to_string(),
            uuid: self.uuid(),
        })
        .expect("error body is always representable as JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn not_found_maps_to_exit_code_one_and_carries_uuid() {
        let uuid = Uuid::new_v4();
        let err = CliError::Core(objstore_core::Error::NotFound(uuid));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_json()["uuid"], uuid.to_string());
        assert_eq!(err.to_json()["error"], "not_found");
    }

    #[test]
    fn safe_mode_maps_to_exit_code_two() {
        let err = CliError::Core(objstore_core::Error::SafeMode);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn user_error_has_no_uuid() {
        let err = CliError::user("bad field syntax");
        assert!(err.to_json().get("uuid").is_none());
    }
}
