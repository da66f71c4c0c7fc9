//! The I/O adapter: a capability interface over file primitives.
//!
//! Every higher component reaches the filesystem only through
//! [`IoBackend`]. The real backend ([`OsBackend`]) delegates to
//! `std::fs` and `fs2`; [`MemoryBackend`] keeps an in-memory tree so
//! tests (and crash-injection) never touch disk.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Advisory lock mode, mirrored from `flock(2)`'s `LOCK_SH` / `LOCK_EX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Shared,
    Exclusive,
}

/// A held or acquirable advisory lock on a single path.
///
/// Implementations must release the lock when dropped.
pub trait LockHandle: Send {
    fn lock_shared(&self) -> Result<()>;
    fn lock_exclusive(&self) -> Result<()>;
    /// Non-blocking attempt; `Ok(false)` means the lock is currently held elsewhere.
    fn try_lock_shared(&self) -> Result<bool>;
    fn try_lock_exclusive(&self) -> Result<bool>;
    fn unlock(&self) -> Result<()>;
}

/// Filesystem capability interface.
///
/// Paths are always absolute; the backend does not interpret them
/// beyond the operations listed here.
pub trait IoBackend: Send + Sync {
    fn read(&self, path: &Path) -> Result<Vec<u8>>;
    /// Create (or truncate) `path` and write `bytes`, flushing before return.
    fn write_new(&self, path: &Path, bytes: &[u8]) -> Result<()>;
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn size(&self, path: &Path) -> Result<u64>;
    /// Immediate children of a directory, as full paths.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
    /// Open (creating if absent) a lock handle for `path`.
    fn open_lock_handle(&self, path: &Path) -> Result<Box<dyn LockHandle>>;
}

/// Real filesystem backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsBackend;

impl IoBackend for OsBackend {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| Error::io(path, e))
    }

    fn write_new(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        use std::io::Write;
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| Error::io(path, e))?;
        file.write_all(bytes).map_err(|e| Error::io(path, e))?;
        file.sync_all().map_err(|e| Error::io(path, e))?;
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to).map_err(|e| Error::io(to, e))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| Error::io(path, e))
    }

    fn size(&self, path: &Path) -> Result<u64> {
        fs::metadata(path).map(|m| m.len()).map_err(|e| Error::io(path, e))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(path).map_err(|e| Error::io(path, e))?;
        let mut out = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(path, e))?;
            out.push(entry.path());
        }
        Ok(out)
    }

    fn open_lock_handle(&self, path: &Path) -> Result<Box<dyn LockHandle>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| Error::io(path, e))?;
        Ok(Box::new(OsLockHandle {
            file,
            path: path.to_path_buf(),
        }))
    }
}

struct OsLockHandle {
    file: File,
    path: PathBuf,
}

impl LockHandle for OsLockHandle {
    fn lock_shared(&self) -> Result<()> {
        fs2::FileExt::lock_shared(&self.file).map_err(|_| Error::LockFailed {
            path: self.path.clone(),
        })
    }

    fn lock_exclusive(&self) -> Result<()> {
        fs2::FileExt::lock_exclusive(&self.file).map_err(|_| Error::LockFailed {
            path: self.path.clone(),
        })
    }

    fn try_lock_shared(&self) -> Result<bool> {
        match fs2::FileExt::try_lock_shared(&self.file) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(false),
            Err(e) => Err(Error::io(&self.path, e)),
        }
    }

    fn try_lock_exclusive(&self) -> Result<bool> {
        match fs2::FileExt::try_lock_exclusive(&self.file) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(false),
            Err(e) => Err(Error::io(&self.path, e)),
        }
    }

    fn unlock(&self) -> Result<()> {
        fs2::FileExt::unlock(&self.file).map_err(|e| Error::io(&self.path, e))
    }
}

/// In-memory backend for deterministic tests and crash-injection.
///
/// Directories are implicit: any path with a stored descendant is
/// considered a directory. Locks are simulated with a per-path
/// shared/exclusive counter, which is enough to exercise the lock
/// manager's contention logic without touching the OS.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
    locks: Arc<Mutex<HashMap<PathBuf, MemLockState>>>,
}

#[derive(Debug, Default)]
struct MemLockState {
    shared_count: u32,
    exclusive: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IoBackend for MemoryBackend {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                path: path.to_path_buf(),
            })
    }

    fn write_new(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let mut files = self.files.lock().unwrap();
        let bytes = files.remove(from).ok_or_else(|| Error::NotFound {
            path: from.to_path_buf(),
        })?;
        files.insert(to.to_path_buf(), bytes);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.files.lock().unwrap().remove(path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        files.keys().any(|p| p != path && p.starts_with(path))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn create_dir_all(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn size(&self, path: &Path) -> Result<u64> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|b| b.len() as u64)
            .ok_or_else(|| Error::NotFound {
                path: path.to_path_buf(),
            })
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let files = self.files.lock().unwrap();
        let mut direct_children: Vec<PathBuf> = Vec::new();
        for p in files.keys() {
            if let Ok(rel) = p.strip_prefix(path) {
                if let Some(first) = rel.components().next() {
                    let child = path.join(first.as_os_str());
                    if !direct_children.contains(&child) {
                        direct_children.push(child);
                    }
                }
            }
        }
        Ok(direct_children)
    }

    fn open_lock_handle(&self, path: &Path) -> Result<Box<dyn LockHandle>> {
        Ok(Box::new(MemLockHandle {
            path: path.to_path_buf(),
            locks: Arc::clone(&self.locks),
            held: Mutex::new(None),
        }))
    }
}

struct MemLockHandle {
    path: PathBuf,
    locks: Arc<Mutex<HashMap<PathBuf, MemLockState>>>,
    held: Mutex<Option<LockMode>>,
}

impl MemLockHandle {
    fn try_acquire(&self, mode: LockMode) -> bool {
        let mut locks = self.locks.lock().unwrap();
        let entry = locks.entry(self.path.clone()).or_default();
        let ok = match mode {
            LockMode::Shared => !entry.exclusive,
            LockMode::Exclusive => !entry.exclusive && entry.shared_count == 0,
        };
        if ok {
            match mode {
                LockMode::Shared => entry.shared_count += 1,
                LockMode::Exclusive => entry.exclusive = true,
            }
            *self.held.lock().unwrap() = Some(mode);
        }
        ok
    }
}

impl LockHandle for MemLockHandle {
    fn lock_shared(&self) -> Result<()> {
        while !self.try_acquire(LockMode::Shared) {
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        Ok(())
    }

    fn lock_exclusive(&self) -> Result<()> {
        while !self.try_acquire(LockMode::Exclusive) {
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        Ok(())
    }

    fn try_lock_shared(&self) -> Result<bool> {
        Ok(self.try_acquire(LockMode::Shared))
    }

    fn try_lock_exclusive(&self) -> Result<bool> {
        Ok(self.try_acquire(LockMode::Exclusive))
    }

    fn unlock(&self) -> Result<()> {
        let mut held = self.held.lock().unwrap();
        if let Some(mode) = held.take() {
            let mut locks = self.locks.lock().unwrap();
            if let Some(entry) = locks.get_mut(&self.path) {
                match mode {
                    LockMode::Shared => entry.shared_count = entry.shared_count.saturating_sub(1),
                    LockMode::Exclusive => entry.exclusive = false,
                }
            }
        }
        Ok(())
    }
}

impl Drop for MemLockHandle {
    fn drop(&mut self) {
        let _ = self.unlock();
    }
}
