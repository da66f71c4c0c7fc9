//! [`TestStore`] builder for object-store test scenarios.

use objstore_core::{Node, NodeRef, ObjectStorage};
use std::path::Path;
use tempfile::TempDir;

/// A temporary storage root with a live [`ObjectStorage`] opened on it.
///
/// # Example
///
/// ```rust,no_run
/// use objstore_test_utils::store::TestStore;
///
/// let mut store = TestStore::new();
/// store.storage.register_class("User");
/// let uuid = store.put_leaf("User", "name", "Ada");
/// assert!(store.storage.exists(uuid));
/// ```
pub struct TestStore {
    temp_dir: TempDir,
    pub storage: ObjectStorage,
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TestStore {
    /// Opens an `ObjectStorage` rooted at a fresh temporary directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("TestStore::new: failed to create temp dir");
        let storage = ObjectStorage::open(temp_dir.path());
        Self { temp_dir, storage }
    }

    /// Return the storage root path.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Stores a single-field leaf node of `class` and returns its UUID.
    /// Registers `class` on the underlying storage if not already known.
    pub fn put_leaf(
        &mut self,
        class: &str,
        field: &str,
        value: impl Into<String>,
    ) -> uuid::Uuid {
        self.storage.register_class(class);
        let mut node = Node::new(class);
        node.set(field, objstore_core::FieldValue::String(value.into()));
        self.storage
            .store(&node.wrap(), objstore_core::StoreOptions::default())
            .expect("TestStore::put_leaf: store failed")
    }

    /// Stores an arbitrary pre-built graph and returns the root UUID.
    pub fn put(&mut self, root: &NodeRef) -> uuid::Uuid {
        self.storage
            .store(root, objstore_core::StoreOptions::default())
            .expect("TestStore::put: store failed")
    }
}
