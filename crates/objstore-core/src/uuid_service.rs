//! Generates and validates v4 UUIDs.

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::sync::Mutex;
use uuid::Uuid;

/// Bounded retry count before `generate` gives up on a fresh id.
///
/// A collision against a process-local set of previously generated
/// UUIDs is astronomically unlikely; this bound exists so a
/// misbehaving RNG fails loudly instead of looping forever.
const MAX_GENERATION_ATTEMPTS: u32 = 8;

/// Generates v4 UUIDs and tracks previously issued ones to guard
/// against the vanishingly unlikely collision.
#[derive(Debug, Default)]
pub struct UuidService {
    issued: Mutex<HashSet<Uuid>>,
}

impl UuidService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh v4 UUID, guaranteed distinct from every UUID
    /// this service has issued before.
    pub fn generate(&self) -> Result<Uuid> {
        let mut issued = self.issued.lock().unwrap();
        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let candidate = Uuid::new_v4();
            if issued.insert(candidate) {
                return Ok(candidate);
            }
        }
        Err(Error::GenerationFailure {
            attempts: MAX_GENERATION_ATTEMPTS,
        })
    }

    /// Returns true iff `s` is a canonical, case-insensitive v4 UUID.
    pub fn validate(s: &str) -> bool {
        match Uuid::parse_str(s) {
            Ok(uuid) => uuid.get_version_num() == 4,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_yields_distinct_uuids() {
        let service = UuidService::new();
        let a = service.generate().unwrap();
        let b = service.generate().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn validate_accepts_canonical_v4_case_insensitively() {
        let uuid = Uuid::new_v4().to_string();
        assert!(UuidService::validate(&uuid));
        assert!(UuidService::validate(&uuid.to_uppercase()));
    }

    #[test]
    fn validate_rejects_garbage() {
        assert!(!UuidService::validate("not-a-uuid"));
        assert!(!UuidService::validate(""));
    }

    #[test]
    fn validate_rejects_non_v4_uuid() {
        // A v1 (time-based) UUID: version nibble is 1, not 4.
        assert!(!UuidService::validate("a8098c1a-f86e-11da-bd1a-00112444be1e"));
    }
}
