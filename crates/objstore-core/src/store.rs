//! The `ObjectStorage` facade tying the engine's components together.

use crate::cache::Cache;
use crate::error::{Error, Result};
use crate::events::{Event, EventSink, NoopSink};
use crate::flatten::{self, FlattenedNode};
use crate::graph::NodeRef;
use crate::lock::LockManager;
use crate::rehydrate::{self, RecordSource};
use crate::strategy::{ChildWritePolicy, JsonStrategy, NodeRecord, RecordValue, Strategy};
use crate::uuid_service::UuidService;
use objstore_fs::backend::{IoBackend, OsBackend};
use objstore_fs::io::{self, RobustnessConfig};
use objstore_fs::shard::ShardLayout;
use objstore_meta::{ClassRenameMap, MetadataRecord, StateHandler};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

fn now_seconds() -> f64 {
    let now = chrono::Utc::now();
    now.timestamp() as f64 + now.timestamp_subsec_nanos() as f64 / 1_000_000_000.0
}

/// Per-call overrides for `store`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
    /// Time-to-live for the root (and, if `inherit_lifetime`, every
    /// written child), in seconds from the write.
    pub ttl: Option<u64>,
    /// Whether children written by this call inherit `ttl` too.
    /// Defaults to `false`; the strategy can also opt every store
    /// call into inheritance via `Strategy::inherit_lifetime`.
    pub inherit_lifetime: bool,
}

/// A problem found by `check()`. Reported, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckIssue {
    /// An `object` file with no sibling `meta`.
    OrphanObject(Uuid),
    /// A `meta` file with no sibling `object`.
    OrphanMeta(Uuid),
    /// `checksum(object)` does not match `meta.checksum`.
    ChecksumMismatch(Uuid),
    /// `meta.children` names a uuid with no record on disk.
    MissingChild { parent: Uuid, child: Uuid },
    /// The record's TTL has elapsed.
    Expired(Uuid),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StorageStats {
    pub object_count: usize,
    pub total_bytes: u64,
    pub expired_count: usize,
}

/// The storage engine: owns no process-global state, everything is an
/// explicit constructor-injected dependency.
pub struct ObjectStorage {
    backend: Arc<dyn IoBackend>,
    layout: ShardLayout,
    strategy: Arc<dyn Strategy>,
    locks: LockManager,
    state: StateHandler,
    cache: Cache,
    events: Arc<dyn EventSink>,
    uuids: UuidService,
    renames: ClassRenameMap,
    known_classes: HashSet<String>,
    allow_unknown_classes: bool,
    lock_timeout: Duration,
    robustness: RobustnessConfig,
}

impl ObjectStorage {
    /// An engine rooted at `root` on the real filesystem, using the
    /// default JSON strategy and a no-op event sink.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let strategy: Arc<dyn Strategy> = Arc::new(JsonStrategy);
        let shard_depth = strategy.shard_depth();
        Self::new(
            Arc::new(OsBackend),
            ShardLayout::new(root.into(), shard_depth),
            strategy,
            Arc::new(NoopSink),
        )
    }

    /// An engine rooted at `root`, with depth/shard/child-write/lock-timeout/
    /// fsync settings taken from `config` instead of the built-in defaults.
    pub fn open_with_config(root: impl Into<PathBuf>, config: &crate::config::StoreConfig) -> Self {
        let strategy: Arc<dyn Strategy> = Arc::new(crate::strategy::ConfiguredJsonStrategy::from(config));
        let shard_depth = strategy.shard_depth();
        let mut storage = Self::new(
            Arc::new(OsBackend),
            ShardLayout::new(root.into(), shard_depth),
            strategy,
            Arc::new(NoopSink),
        );
        storage.lock_timeout = config.lock_timeout();
        storage.robustness.enable_fsync = config.enable_fsync;
        storage
    }

    pub fn new(
        backend: Arc<dyn IoBackend>,
        layout: ShardLayout,
        strategy: Arc<dyn Strategy>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let state = StateHandler::new(layout.root());
        let locks = LockManager::new(Arc::clone(&backend), layout.clone(), Arc::clone(&events));
        Self {
            backend,
            layout,
            strategy,
            locks,
            state,
            cache: Cache::new(),
            events,
            uuids: UuidService::new(),
            renames: ClassRenameMap::new(),
            known_classes: HashSet::new(),
            allow_unknown_classes: false,
            lock_timeout: Duration::from_secs(10),
            robustness: RobustnessConfig::default(),
        }
    }

    pub fn register_class(&mut self, class: impl Into<String>) {
        self.known_classes.insert(class.into());
    }

    pub fn rename_class(&mut self, old: impl Into<String>, new: impl Into<String>) {
        self.renames.insert(old, new);
    }

    /// Skip the known-class allowlist entirely, resolving every stored
    /// class name as itself. Callers with no fixed schema (the CLI,
    /// generic inspection tools) have nothing useful to register.
    pub fn set_allow_unknown_classes(&mut self, allow: bool) {
        self.allow_unknown_classes = allow;
    }

    pub fn set_lock_timeout(&mut self, timeout: Duration) {
        self.lock_timeout = timeout;
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.state.safe_mode_enabled(self.backend.as_ref())? {
            return Err(Error::SafeMode);
        }
        Ok(())
    }

    fn read_meta(&self, uuid: Uuid) -> Result<Option<MetadataRecord>> {
        let path = self.layout.meta_path(&uuid);
        if !self.backend.is_file(&path) {
            return Ok(None);
        }
        let bytes = io::read_all(self.backend.as_ref(), &path)?;
        Ok(Some(MetadataRecord::from_bytes(&bytes).map_err(|e| {
            Error::Serialization(format!("malformed metadata for {uuid}: {e}"))
        })?))
    }

    fn write_node(&self, flattened: &FlattenedNode, ttl: Option<u64>, now: f64) -> Result<()> {
        let bytes = self.strategy.serialize(&flattened.record)?;
        let checksum = self.strategy.checksum(&bytes);

        let previous = self.read_meta(flattened.uuid)?;
        let mut children = BTreeSet::new();
        collect_refs(&flattened.record, &mut children);

        // A record's own `parents` set is populated by its referrers
        // via `record_parentage`, not by itself here.
        let created_at = previous.as_ref().map(|m| m.created_at).unwrap_or(now);
        let parents = previous.map(|m| m.parents).unwrap_or_default();
        let mut meta = MetadataRecord::new(flattened.uuid, flattened.record.class.clone(), checksum, now);
        meta.created_at = created_at;
        meta.ttl = ttl;
        meta.children = children;
        meta.parents = parents;

        let object_path = self.layout.object_path(&flattened.uuid);
        let meta_path = self.layout.meta_path(&flattened.uuid);
        io::write_atomic(self.backend.as_ref(), &object_path, &bytes, self.robustness)?;
        io::write_atomic(
            self.backend.as_ref(),
            &meta_path,
            &meta.to_bytes().map_err(|e| Error::Serialization(e.to_string()))?,
            self.robustness,
        )?;
        Ok(())
    }

    fn record_parentage(&self, parent: Uuid, children: &BTreeSet<Uuid>, now: f64) -> Result<()> {
        for child in children {
            if let Some(mut meta) = self.read_meta(*child)? {
                if meta.parents.insert(parent) {
                    meta.updated_at = meta.updated_at.max(now);
                    let meta_path = self.layout.meta_path(child);
                    io::write_atomic(
                        self.backend.as_ref(),
                        &meta_path,
                        &meta.to_bytes().map_err(|e| Error::Serialization(e.to_string()))?,
                        self.robustness,
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Flattens `root` and persists it (and, per the strategy's
    /// [`ChildWritePolicy`], its children) under fresh or reused
    /// UUIDs. Returns the root's UUID.
    pub fn store(&self, root: &NodeRef, options: StoreOptions) -> Result<Uuid> {
        self.ensure_writable()?;

        let flattened = flatten::flatten(root, self.strategy.as_ref(), &self.uuids)?;
        let policy = self.strategy.child_write_policy();
        let now = now_seconds();
        let inherit = options.inherit_lifetime || self.strategy.inherit_lifetime();

        for (index, node) in flattened.iter().enumerate() {
            let is_root = index == 0;
            let should_write = is_root
                || match policy {
                    ChildWritePolicy::Always => true,
                    ChildWritePolicy::Never => false,
                    ChildWritePolicy::IfNotExist => !self.backend.is_file(&self.layout.object_path(&node.uuid)),
                };
            if !should_write {
                continue;
            }

            self.locks.acquire_exclusive(node.uuid, self.lock_timeout)?;
            let ttl = if is_root {
                options.ttl
            } else if inherit {
                options.ttl
            } else {
                None
            };
            let write_result = self.write_node(node, ttl, now);
            self.locks.release(node.uuid)?;
            write_result?;
            self.cache.invalidate(node.uuid);
        }

        for node in &flattened {
            let mut children = BTreeSet::new();
            collect_refs(&node.record, &mut children);
            self.record_parentage(node.uuid, &children, now)?;
        }

        self.events.handle(Event::ObjectStored(flattened[0].uuid));
        Ok(flattened[0].uuid)
    }

    /// Loads the graph rooted at `uuid`, resolving child references
    /// and restoring identity.
    pub fn load(&self, uuid: Uuid) -> Result<NodeRef> {
        if let Some(cached) = self.cache.get(uuid) {
            return Ok(cached);
        }

        let source = FacadeRecordSource { storage: self };
        let known = &self.known_classes;
        let allow_unknown = self.allow_unknown_classes;
        let check_known = |c: &str| allow_unknown || known.contains(c);
        let root = rehydrate::rehydrate(uuid, &source, self.strategy.as_ref(), &self.renames, &check_known)?;

        let meta = self.read_meta(uuid)?;
        let ttl = meta.and_then(|m| m.ttl).map(Duration::from_secs);
        self.cache.insert(uuid, NodeRef::clone(&root), ttl);
        self.events.handle(Event::ObjectLoaded(uuid));
        Ok(root)
    }

    fn read_and_verify(&self, uuid: Uuid) -> Result<Vec<u8>> {
        self.locks.acquire_shared(uuid, self.lock_timeout)?;
        let result = (|| -> Result<Vec<u8>> {
            let meta = self.read_meta(uuid)?.ok_or(Error::NotFound(uuid))?;
            let now = now_seconds();
            if meta.is_expired_at(now) {
                self.events.handle(Event::ObjectExpired(uuid));
                return Err(Error::ObjectExpired(uuid));
            }
            let object_path = self.layout.object_path(&uuid);
            if !self.backend.is_file(&object_path) {
                return Err(Error::Integrity {
                    uuid,
                    reason: "missing object file".to_string(),
                });
            }
            let bytes = io::read_all(self.backend.as_ref(), &object_path)?;
            let checksum = self.strategy.checksum(&bytes);
            if checksum != meta.checksum {
                return Err(Error::Integrity {
                    uuid,
                    reason: "checksum mismatch".to_string(),
                });
            }
            Ok(bytes)
        })();
        self.locks.release(uuid)?;
        result
    }

    /// True iff both sibling files exist, regardless of TTL.
    pub fn exists(&self, uuid: Uuid) -> bool {
        self.backend.is_file(&self.layout.object_path(&uuid))
            && self.backend.is_file(&self.layout.meta_path(&uuid))
    }

    pub fn delete(&self, uuid: Uuid, force: bool) -> Result<bool> {
        self.ensure_writable()?;
        self.locks.acquire_exclusive(uuid, self.lock_timeout)?;
        let result = (|| -> Result<bool> {
            if !self.exists(uuid) {
                if force {
                    return Ok(false);
                }
                return Err(Error::NotFound(uuid));
            }
            self.backend.remove_file(&self.layout.object_path(&uuid))?;
            self.backend.remove_file(&self.layout.meta_path(&uuid))?;
            Ok(true)
        })();
        self.locks.release(uuid)?;
        let deleted = result?;
        if deleted {
            self.cache.invalidate(uuid);
            self.events.handle(Event::ObjectDeleted(uuid));
        }
        Ok(deleted)
    }

    pub fn get_lifetime(&self, uuid: Uuid) -> Result<Option<f64>> {
        let meta = self.read_meta(uuid)?.ok_or(Error::NotFound(uuid))?;
        Ok(meta.remaining_seconds(now_seconds()))
    }

    pub fn set_lifetime(&self, uuid: Uuid, ttl: Option<u64>) -> Result<bool> {
        self.ensure_writable()?;
        self.locks.acquire_exclusive(uuid, self.lock_timeout)?;
        let result = (|| -> Result<bool> {
            let mut meta = self.read_meta(uuid)?.ok_or(Error::NotFound(uuid))?;
            meta.ttl = ttl;
            let meta_path = self.layout.meta_path(&uuid);
            io::write_atomic(
                self.backend.as_ref(),
                &meta_path,
                &meta.to_bytes().map_err(|e| Error::Serialization(e.to_string()))?,
                self.robustness,
            )?;
            Ok(true)
        })();
        self.locks.release(uuid)?;
        let changed = result?;
        self.cache.invalidate(uuid);
        Ok(changed)
    }

    pub fn expired(&self, uuid: Uuid) -> Result<bool> {
        let meta = self.read_meta(uuid)?.ok_or(Error::NotFound(uuid))?;
        Ok(meta.is_expired_at(now_seconds()))
    }

    pub fn check(&self) -> Result<Vec<CheckIssue>> {
        let mut issues = Vec::new();
        let mut object_uuids = HashSet::new();
        let mut meta_uuids = HashSet::new();
        let mut metas = Vec::new();

        for (uuid, dir) in self.walk_object_dirs()? {
            // Hold the per-UUID shared lock across the object/meta pair
            // inspection so a concurrent store() can't be caught mid-write,
            // the same protection read_and_verify() gives a single load().
            self.locks.acquire_shared(uuid, self.lock_timeout)?;
            let result = (|| -> Result<()> {
                let has_object = self.backend.is_file(&dir.join(objstore_fs::shard::OBJECT_FILE));
                let has_meta = self.backend.is_file(&dir.join(objstore_fs::shard::META_FILE));
                if has_object {
                    object_uuids.insert(uuid);
                }
                if has_meta {
                    meta_uuids.insert(uuid);
                }
                match (has_object, has_meta) {
                    (true, false) => issues.push(CheckIssue::OrphanObject(uuid)),
                    (false, true) => issues.push(CheckIssue::OrphanMeta(uuid)),
                    (true, true) => {
                        if let Some(meta) = self.read_meta(uuid)? {
                            let bytes = io::read_all(self.backend.as_ref(), &self.layout.object_path(&uuid))?;
                            if self.strategy.checksum(&bytes) != meta.checksum {
                                issues.push(CheckIssue::ChecksumMismatch(uuid));
                            }
                            if meta.is_expired_at(now_seconds()) {
                                issues.push(CheckIssue::Expired(uuid));
                            }
                            metas.push((uuid, meta));
                        }
                    }
                    (false, false) => {}
                }
                Ok(())
            })();
            self.locks.release(uuid)?;
            result?;
        }

        for (uuid, meta) in metas {
            for child in &meta.children {
                if !object_uuids.contains(child) || !meta_uuids.contains(child) {
                    issues.push(CheckIssue::MissingChild {
                        parent: uuid,
                        child: *child,
                    });
                }
            }
        }

        Ok(issues)
    }

    pub fn stats(&self) -> Result<StorageStats> {
        let mut stats = StorageStats::default();
        for (uuid, dir) in self.walk_object_dirs()? {
            let object_path = dir.join(objstore_fs::shard::OBJECT_FILE);
            let meta_path = dir.join(objstore_fs::shard::META_FILE);
            if self.backend.is_file(&object_path) {
                stats.object_count += 1;
                stats.total_bytes += self.backend.size(&object_path)?;
            }
            if self.backend.is_file(&meta_path) {
                stats.total_bytes += self.backend.size(&meta_path)?;
                if let Some(meta) = self.read_meta(uuid)? {
                    if meta.is_expired_at(now_seconds()) {
                        stats.expired_count += 1;
                    }
                }
            }
        }
        Ok(stats)
    }

    pub fn list(&self, class: Option<&str>, limit: Option<usize>) -> Result<Vec<Uuid>> {
        let mut out = Vec::new();
        for (uuid, _dir) in self.walk_object_dirs()? {
            if let Some(limit) = limit {
                if out.len() >= limit {
                    break;
                }
            }
            if let Some(meta) = self.read_meta(uuid)? {
                if class.map(|c| c == meta.class).unwrap_or(true) {
                    out.push(uuid);
                }
            }
        }
        Ok(out)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Releases every lock this process holds. Call before the
    /// storage is dropped if clean shutdown matters.
    pub fn shutdown(&self) -> Result<()> {
        self.locks.release_all_active()
    }

    pub fn enable_safe_mode(&self) -> Result<bool> {
        let changed = self.state.enable_safe_mode(self.backend.as_ref())?;
        if changed {
            self.events.handle(Event::SafeModeEnabled);
        }
        Ok(changed)
    }

    pub fn disable_safe_mode(&self) -> Result<bool> {
        let changed = self.state.disable_safe_mode(self.backend.as_ref())?;
        if changed {
            self.events.handle(Event::SafeModeDisabled);
        }
        Ok(changed)
    }

    pub fn safe_mode_enabled(&self) -> Result<bool> {
        self.state.safe_mode_enabled(self.backend.as_ref())
    }

    fn walk_object_dirs(&self) -> Result<Vec<(Uuid, PathBuf)>> {
        let mut out = Vec::new();
        if self.backend.is_dir(self.layout.root()) {
            collect_uuid_dirs(self.backend.as_ref(), self.layout.root(), &mut out)?;
        }
        Ok(out)
    }
}

fn collect_uuid_dirs(backend: &dyn IoBackend, dir: &Path, out: &mut Vec<(Uuid, PathBuf)>) -> Result<()> {
    for child in backend.read_dir(dir)? {
        let name = match child.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };
        if let Ok(uuid) = Uuid::parse_str(name) {
            out.push((uuid, child));
            continue;
        }
        if backend.is_dir(&child) {
            collect_uuid_dirs(backend, &child, out)?;
        }
    }
    Ok(())
}

fn collect_refs(record: &NodeRecord, out: &mut BTreeSet<Uuid>) {
    for value in record.fields.values() {
        collect_refs_value(value, out);
    }
}

fn collect_refs_value(value: &RecordValue, out: &mut BTreeSet<Uuid>) {
    match value {
        RecordValue::Ref(uuid) => {
            out.insert(*uuid);
        }
        RecordValue::Array(items) => {
            for item in items {
                collect_refs_value(item, out);
            }
        }
        RecordValue::Map(fields) => {
            for v in fields.values() {
                collect_refs_value(v, out);
            }
        }
        _ => {}
    }
}

struct FacadeRecordSource<'a> {
    storage: &'a ObjectStorage,
}

impl RecordSource for FacadeRecordSource<'_> {
    fn read_record(&self, uuid: Uuid) -> Result<Vec<u8>> {
        self.storage.read_and_verify(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingSink;
    use crate::graph::{FieldValue, Node};
    use objstore_fs::backend::MemoryBackend;

    fn storage() -> (ObjectStorage, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::new());
        let backend: Arc<dyn IoBackend> = Arc::new(MemoryBackend::new());
        let strategy: Arc<dyn Strategy> = Arc::new(JsonStrategy);
        let layout = ShardLayout::new("/root", strategy.shard_depth());
        let mut storage = ObjectStorage::new(backend, layout, strategy, sink.clone() as Arc<dyn EventSink>);
        storage.register_class("User");
        storage.register_class("Address");
        (storage, sink)
    }

    #[test]
    fn simple_round_trip_preserves_fields() {
        let (storage, _sink) = storage();
        let mut node = Node::new("User");
        node.set("name", FieldValue::String("Ada".into()));
        let root = node.wrap();

        let uuid = storage.store(&root, StoreOptions::default()).unwrap();
        assert!(storage.exists(uuid));

        let loaded = storage.load(uuid).unwrap();
        let borrowed = loaded.borrow();
        assert_eq!(borrowed.class, "User");
        match borrowed.fields.get("name").unwrap() {
            FieldValue::String(s) => assert_eq!(s, "Ada"),
            other => panic!("unexpected field {other:?}"),
        }
    }

    #[test]
    fn self_cycle_round_trips_and_preserves_identity() {
        let (storage, _sink) = storage();
        let mut node = Node::new("User");
        let root = node.clone().wrap();
        node.set("self", FieldValue::Child(NodeRef::clone(&root)));
        *root.borrow_mut() = node;

        let uuid = storage.store(&root, StoreOptions::default()).unwrap();
        let loaded = storage.load(uuid).unwrap();
        let self_ref = {
            let borrowed = loaded.borrow();
            match borrowed.fields.get("self").unwrap() {
                FieldValue::Child(child) => NodeRef::clone(child),
                other => panic!("unexpected field {other:?}"),
            }
        };
        assert!(std::rc::Rc::ptr_eq(&loaded, &self_ref));
    }

    #[test]
    fn ttl_zero_is_immediately_expired() {
        let (storage, _sink) = storage();
        let root = Node::new("User").wrap();
        let uuid = storage
            .store(&root, StoreOptions { ttl: Some(0), inherit_lifetime: false })
            .unwrap();

        assert!(storage.expired(uuid).unwrap());
        let result = storage.load(uuid);
        assert!(matches!(result, Err(Error::ObjectExpired(_))));
    }

    #[test]
    fn safe_mode_blocks_store_and_delete() {
        let (storage, sink) = storage();
        storage.enable_safe_mode().unwrap();

        let root = Node::new("User").wrap();
        assert!(matches!(storage.store(&root, StoreOptions::default()), Err(Error::SafeMode)));

        storage.disable_safe_mode().unwrap();
        let uuid = storage.store(&root, StoreOptions::default()).unwrap();
        storage.enable_safe_mode().unwrap();
        assert!(matches!(storage.delete(uuid, false), Err(Error::SafeMode)));

        let events = sink.events();
        assert!(events.contains(&Event::SafeModeEnabled));
        assert!(events.contains(&Event::SafeModeDisabled));
    }

    #[test]
    fn checksum_corruption_is_detected_on_load_and_by_check() {
        let (storage, _sink) = storage();
        let root = Node::new("User").wrap();
        let uuid = storage.store(&root, StoreOptions::default()).unwrap();

        let object_path = storage.layout.object_path(&uuid);
        storage.backend.write_new(&object_path, b"corrupted").unwrap();

        assert!(matches!(storage.load(uuid), Err(Error::Integrity { .. })));
        let issues = storage.check().unwrap();
        assert!(issues.contains(&CheckIssue::ChecksumMismatch(uuid)));
    }

    #[test]
    fn delete_then_check_shows_no_orphans() {
        let (storage, _sink) = storage();
        let root = Node::new("User").wrap();
        let uuid = storage.store(&root, StoreOptions::default()).unwrap();
        assert!(storage.delete(uuid, false).unwrap());
        assert!(!storage.delete(uuid, true).unwrap());
        assert!(storage.check().unwrap().is_empty());
    }

    #[test]
    fn list_filters_by_class() {
        let (storage, _sink) = storage();
        storage.store(&Node::new("User").wrap(), StoreOptions::default()).unwrap();
        storage.store(&Node::new("Address").wrap(), StoreOptions::default()).unwrap();

        let users = storage.list(Some("User"), None).unwrap();
        assert_eq!(users.len(), 1);
        let all = storage.list(None, None).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn unregistered_class_resolves_to_placeholder_unless_unknown_allowed() {
        let sink = Arc::new(CollectingSink::new());
        let backend: Arc<dyn IoBackend> = Arc::new(MemoryBackend::new());
        let strategy: Arc<dyn Strategy> = Arc::new(JsonStrategy);
        let layout = ShardLayout::new("/root", strategy.shard_depth());
        let mut storage = ObjectStorage::new(backend, layout, strategy, sink as Arc<dyn EventSink>);

        let uuid = storage
            .store(&Node::new("Widget").wrap(), StoreOptions::default())
            .unwrap();

        let loaded = storage.load(uuid).unwrap();
        assert_eq!(loaded.borrow().class, "Placeholder");

        storage.clear_cache();
        storage.set_allow_unknown_classes(true);
        let loaded = storage.load(uuid).unwrap();
        assert_eq!(loaded.borrow().class, "Widget");
    }

    #[test]
    fn open_with_config_applies_shard_depth_and_lock_timeout() {
        let config = crate::config::StoreConfig {
            shard_depth: 3,
            lock_timeout_ms: 42,
            ..crate::config::StoreConfig::default()
        };
        let dir = std::env::temp_dir().join(format!("objstore-config-test-{}", Uuid::new_v4()));
        let storage = ObjectStorage::open_with_config(&dir, &config);
        assert_eq!(storage.layout.depth(), 3);
        assert_eq!(storage.lock_timeout, Duration::from_millis(42));
    }
}
