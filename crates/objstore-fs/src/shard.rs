//! Maps a UUID to its sharded on-disk directory and file names.

use std::path::{Path, PathBuf};
use uuid::Uuid;

/// The three files that live under each UUID's directory.
pub const OBJECT_FILE: &str = "object";
pub const META_FILE: &str = "meta";
pub const LOCK_FILE: &str = "lock";

/// Resolves UUIDs to sharded storage paths.
///
/// Given shard depth `d`, the directory for UUID `u` is
/// `root/<u[0:2]>/<u[2:4]>/...(d segments)/<u>/`. Shard depth is a
/// property of the strategy and fixed for the lifetime of the store.
#[derive(Debug, Clone)]
pub struct ShardLayout {
    root: PathBuf,
    depth: usize,
}

impl ShardLayout {
    /// `depth` is clamped to `[0, 4]` per the storage contract.
    pub fn new(root: impl Into<PathBuf>, depth: usize) -> Self {
        Self {
            root: root.into(),
            depth: depth.min(4),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The per-UUID directory, e.g. `root/3f/a9/3fa9....` for depth 2.
    pub fn object_dir(&self, uuid: &Uuid) -> PathBuf {
        let hyphenated = uuid.as_hyphenated().to_string();
        let mut dir = self.root.clone();
        for i in 0..self.depth {
            let start = i * 2;
            dir.push(&hyphenated[start..start + 2]);
        }
        dir.push(&hyphenated);
        dir
    }

    pub fn object_path(&self, uuid: &Uuid) -> PathBuf {
        self.object_dir(uuid).join(OBJECT_FILE)
    }

    pub fn meta_path(&self, uuid: &Uuid) -> PathBuf {
        self.object_dir(uuid).join(META_FILE)
    }

    pub fn lock_path(&self, uuid: &Uuid) -> PathBuf {
        self.object_dir(uuid).join(LOCK_FILE)
    }

    pub fn safe_mode_path(&self) -> PathBuf {
        self.root.join("safe_mode")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_dir_nests_by_shard_depth() {
        let uuid = Uuid::parse_str("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
        let layout = ShardLayout::new("/root", 2);
        let dir = layout.object_dir(&uuid);
        assert_eq!(
            dir,
            PathBuf::from("/root/3f/a8/3fa85f64-5717-4562-b3fc-2c963f66afa6")
        );
    }

    #[test]
    fn zero_shard_depth_puts_directory_at_root() {
        let uuid = Uuid::parse_str("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
        let layout = ShardLayout::new("/root", 0);
        assert_eq!(
            layout.object_dir(&uuid),
            PathBuf::from("/root/3fa85f64-5717-4562-b3fc-2c963f66afa6")
        );
    }

    #[test]
    fn depth_is_clamped_to_four() {
        let layout = ShardLayout::new("/root", 99);
        assert_eq!(layout.depth(), 4);
    }

    #[test]
    fn file_paths_sit_under_the_object_dir() {
        let uuid = Uuid::parse_str("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
        let layout = ShardLayout::new("/root", 2);
        let dir = layout.object_dir(&uuid);
        assert_eq!(layout.object_path(&uuid), dir.join("object"));
        assert_eq!(layout.meta_path(&uuid), dir.join("meta"));
        assert_eq!(layout.lock_path(&uuid), dir.join("lock"));
    }
}
