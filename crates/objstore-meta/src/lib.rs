//! Metadata records, class rename map, and safe-mode state for the object store engine.
//!
//! This crate owns everything the engine persists *about* an object
//! rather than the object's own fields: the [`record::MetadataRecord`]
//! sidecar, the [`rename::ClassRenameMap`] consulted during
//! rehydration, and the [`state::StateHandler`] that gates mutating
//! operations behind safe mode.

pub mod error;
pub mod record;
pub mod rename;
pub mod state;

pub use error::{Error, Result};
pub use record::MetadataRecord;
pub use rename::{ClassRenameMap, ClassResolution};
pub use state::StateHandler;
