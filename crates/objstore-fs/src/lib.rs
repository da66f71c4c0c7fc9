//! Filesystem abstraction for the object store engine.
//!
//! Every higher component reaches the filesystem only through the
//! [`IoBackend`] capability trait, which is the single hook for
//! determinism in tests and for crash-injection.

pub mod backend;
pub mod checksum;
pub mod error;
pub mod io;
pub mod shard;

pub use backend::{IoBackend, LockHandle, LockMode, MemoryBackend, OsBackend};
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use shard::ShardLayout;
