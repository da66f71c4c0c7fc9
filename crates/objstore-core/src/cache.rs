//! Identity-map cache from uuid to a live, already-rehydrated node.

use crate::graph::NodeRef;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

struct CacheEntry {
    node: NodeRef,
    loaded_at: Instant,
    ttl: Option<Duration>,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        match self.ttl {
            None => false,
            Some(ttl) => self.loaded_at.elapsed() > ttl,
        }
    }
}

/// Per-process identity cache. Authoritative for object identity only
/// if callers don't mutate fields outside the engine.
#[derive(Default)]
pub struct Cache {
    entries: Mutex<HashMap<Uuid, CacheEntry>>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached node for `uuid` if present and not expired.
    /// An expired entry is evicted as a side effect of the lookup.
    pub fn get(&self, uuid: Uuid) -> Option<NodeRef> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(&uuid) {
            Some(entry) if entry.is_expired() => {
                entries.remove(&uuid);
                None
            }
            Some(entry) => Some(NodeRef::clone(&entry.node)),
            None => None,
        }
    }

    pub fn insert(&self, uuid: Uuid, node: NodeRef, ttl: Option<Duration>) {
        self.entries.lock().unwrap().insert(
            uuid,
            CacheEntry {
                node,
                loaded_at: Instant::now(),
                ttl,
            },
        );
    }

    pub fn invalidate(&self, uuid: Uuid) {
        self.entries.lock().unwrap().remove(&uuid);
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}
