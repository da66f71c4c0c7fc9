//! Graph flattening, rehydration, locking, caching and the facade
//! that ties the object storage engine together.
//!
//! `objstore-core` sits above `objstore-fs` (raw filesystem access)
//! and `objstore-meta` (metadata records, class renames, safe-mode
//! state) and is consumed directly by `objstore-cli`:
//!
//! ```text
//!                    objstore-cli
//!                        |
//!                  objstore-core
//!                        |
//!              +---------+---------+
//!              |                   |
//!         objstore-fs        objstore-meta
//! ```
//!
//! The entry point is [`store::ObjectStorage`], constructed with an
//! [`objstore_fs::IoBackend`], a [`strategy::Strategy`], and an
//! [`events::EventSink`] — no process-global state.

pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod flatten;
pub mod graph;
pub mod lock;
pub mod rehydrate;
pub mod store;
pub mod strategy;
pub mod uuid_service;

pub use config::{ChildWritePolicyConfig, StoreConfig};
pub use error::{Error, Result};
pub use events::{CollectingSink, Event, EventSink, NoopSink};
pub use graph::{FieldValue, Node, NodeRef};
pub use store::{CheckIssue, ObjectStorage, StoreOptions, StorageStats};
pub use strategy::{ChildWritePolicy, ConfiguredJsonStrategy, JsonStrategy, NodeRecord, RecordValue, Strategy};
pub use uuid_service::UuidService;
