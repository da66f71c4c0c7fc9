//! Per-UUID shared/exclusive locking, backed by advisory file locks.

use crate::error::{Error, Result};
use crate::events::{Event, EventSink};
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use objstore_fs::backend::{IoBackend, LockHandle, LockMode};
use objstore_fs::shard::ShardLayout;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

const INITIAL_BACKOFF: Duration = Duration::from_millis(10);
const MAX_BACKOFF: Duration = Duration::from_millis(200);

struct HeldLock {
    mode: LockMode,
    count: u32,
    handle: Box<dyn LockHandle>,
}

/// Tracks locks this process holds and mediates acquisition against
/// the filesystem's advisory locks.
///
/// Repeated exclusive (or shared) acquisitions by the same process
/// are re-entrant: the registry counts them and only talks to the OS
/// on the first acquire and the last release.
pub struct LockManager {
    backend: Arc<dyn IoBackend>,
    layout: ShardLayout,
    events: Arc<dyn EventSink>,
    held: Mutex<HashMap<Uuid, HeldLock>>,
}

impl LockManager {
    pub fn new(backend: Arc<dyn IoBackend>, layout: ShardLayout, events: Arc<dyn EventSink>) -> Self {
        Self {
            backend,
            layout,
            events,
            held: Mutex::new(HashMap::new()),
        }
    }

    pub fn acquire_shared(&self, uuid: Uuid, timeout: Duration) -> Result<()> {
        self.acquire(uuid, LockMode::Shared, timeout)
    }

    pub fn acquire_exclusive(&self, uuid: Uuid, timeout: Duration) -> Result<()> {
        self.acquire(uuid, LockMode::Exclusive, timeout)
    }

    fn acquire(&self, uuid: Uuid, mode: LockMode, timeout: Duration) -> Result<()> {
        {
            let mut held = self.held.lock().unwrap();
            if let Some(existing) = held.get_mut(&uuid) {
                return match (existing.mode, mode) {
                    (LockMode::Exclusive, _) | (LockMode::Shared, LockMode::Shared) => {
                        existing.count += 1;
                        Ok(())
                    }
                    (LockMode::Shared, LockMode::Exclusive) => {
                        Err(Error::LockUpgradeUnsupported(uuid))
                    }
                };
            }
        }

        let path = self.layout.lock_path(&uuid);
        let handle = self.backend.open_lock_handle(&path)?;

        let mut backoff = ExponentialBackoff {
            initial_interval: INITIAL_BACKOFF,
            max_interval: MAX_BACKOFF,
            max_elapsed_time: Some(timeout),
            ..ExponentialBackoff::default()
        };

        loop {
            let acquired = match mode {
                LockMode::Shared => handle.try_lock_shared()?,
                LockMode::Exclusive => handle.try_lock_exclusive()?,
            };
            if acquired {
                break;
            }
            match backoff.next_backoff() {
                Some(delay) => std::thread::sleep(delay),
                None => {
                    tracing::warn!(%uuid, timeout_ms = timeout.as_millis() as u64, "lock acquisition timed out");
                    self.events.handle(Event::LockTimeout(uuid));
                    return Err(Error::LockTimeout {
                        uuid,
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
            }
        }

        tracing::debug!(%uuid, ?mode, "lock acquired");
        self.held.lock().unwrap().insert(
            uuid,
            HeldLock {
                mode,
                count: 1,
                handle,
            },
        );
        Ok(())
    }

    /// Releases one acquisition of `uuid`'s lock. The underlying OS
    /// lock is only released once the re-entrant count reaches zero.
    pub fn release(&self, uuid: Uuid) -> Result<()> {
        let mut held = self.held.lock().unwrap();
        if let Some(entry) = held.get_mut(&uuid) {
            entry.count = entry.count.saturating_sub(1);
            if entry.count == 0 {
                let entry = held.remove(&uuid).unwrap();
                entry.handle.unlock()?;
                tracing::debug!(%uuid, "lock released");
            }
        }
        Ok(())
    }

    /// Releases every lock this process holds, regardless of
    /// re-entrant count. Called on façade shutdown.
    pub fn release_all_active(&self) -> Result<()> {
        let mut held = self.held.lock().unwrap();
        for (uuid, entry) in held.drain() {
            if let Err(e) = entry.handle.unlock() {
                tracing::warn!(%uuid, error = %e, "failed to release lock during shutdown");
            }
        }
        Ok(())
    }

    pub fn is_locked_by_this_process(&self, uuid: Uuid) -> bool {
        self.held.lock().unwrap().contains_key(&uuid)
    }

    /// Non-blocking probe: true if some other process (or this
    /// process via a lock not taken through this manager) currently
    /// holds an incompatible lock.
    pub fn is_locked_by_other(&self, uuid: Uuid) -> Result<bool> {
        if self.is_locked_by_this_process(uuid) {
            return Ok(false);
        }
        let path = self.layout.lock_path(&uuid);
        let handle = self.backend.open_lock_handle(&path)?;
        let acquired = handle.try_lock_exclusive()?;
        if acquired {
            handle.unlock()?;
        }
        Ok(!acquired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoopSink;
    use objstore_fs::backend::MemoryBackend;

    fn manager() -> LockManager {
        LockManager::new(
            Arc::new(MemoryBackend::new()),
            ShardLayout::new("/root", 2),
            Arc::new(NoopSink),
        )
    }

    #[test]
    fn reentrant_exclusive_acquire_does_not_deadlock() {
        let manager = manager();
        let uuid = Uuid::nil();
        manager.acquire_exclusive(uuid, Duration::from_millis(50)).unwrap();
        manager.acquire_exclusive(uuid, Duration::from_millis(50)).unwrap();
        manager.release(uuid).unwrap();
        assert!(manager.is_locked_by_this_process(uuid));
        manager.release(uuid).unwrap();
        assert!(!manager.is_locked_by_this_process(uuid));
    }

    #[test]
    fn shared_to_exclusive_upgrade_is_rejected() {
        let manager = manager();
        let uuid = Uuid::nil();
        manager.acquire_shared(uuid, Duration::from_millis(50)).unwrap();
        let result = manager.acquire_exclusive(uuid, Duration::from_millis(50));
        assert!(matches!(result, Err(Error::LockUpgradeUnsupported(_))));
    }

    #[test]
    fn is_locked_by_other_detects_cross_manager_contention() {
        let backend = Arc::new(MemoryBackend::new());
        let layout = ShardLayout::new("/root", 2);
        let a = LockManager::new(Arc::clone(&backend) as Arc<dyn IoBackend>, layout.clone(), Arc::new(NoopSink));
        let b = LockManager::new(backend as Arc<dyn IoBackend>, layout, Arc::new(NoopSink));
        let uuid = Uuid::nil();

        a.acquire_exclusive(uuid, Duration::from_millis(50)).unwrap();
        assert!(b.is_locked_by_other(uuid).unwrap());
        a.release(uuid).unwrap();
        assert!(!b.is_locked_by_other(uuid).unwrap());
    }

    #[test]
    fn acquire_times_out_when_held_elsewhere() {
        let backend = Arc::new(MemoryBackend::new());
        let layout = ShardLayout::new("/root", 2);
        let a = LockManager::new(Arc::clone(&backend) as Arc<dyn IoBackend>, layout.clone(), Arc::new(NoopSink));
        let b = LockManager::new(backend as Arc<dyn IoBackend>, layout, Arc::new(NoopSink));
        let uuid = Uuid::nil();

        a.acquire_exclusive(uuid, Duration::from_millis(50)).unwrap();
        let result = b.acquire_exclusive(uuid, Duration::from_millis(30));
        assert!(matches!(result, Err(Error::LockTimeout { .. })));
    }

    #[test]
    fn timeout_dispatches_lock_timeout_event() {
        use crate::events::CollectingSink;
        let backend = Arc::new(MemoryBackend::new());
        let layout = ShardLayout::new("/root", 2);
        let sink = Arc::new(CollectingSink::new());
        let a = LockManager::new(Arc::clone(&backend) as Arc<dyn IoBackend>, layout.clone(), Arc::new(NoopSink));
        let b = LockManager::new(backend as Arc<dyn IoBackend>, layout, sink.clone());
        let uuid = Uuid::nil();

        a.acquire_exclusive(uuid, Duration::from_millis(50)).unwrap();
        let _ = b.acquire_exclusive(uuid, Duration::from_millis(30));
        assert!(sink.events().iter().any(|e| matches!(e, Event::LockTimeout(u) if *u == uuid)));
    }
}
