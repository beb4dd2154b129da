//! Filesystem abstraction for source reads and watch-file freshness checks.
//!
//! The compiler never touches `std::fs` directly; hosts inject an
//! implementation (a bundler's virtual filesystem, an in-memory fixture set
//! for tests). The default implementation memoizes reads until purged, since
//! the same template is commonly read several times within one build pass.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Modification time of `path`, or `None` when the file is missing or
    /// unreadable. Callers treat `None` as "infinitely old" — a vanished
    /// watch file never invalidates a cache entry on its own.
    fn mtime(&self, path: &Path) -> Option<SystemTime>;

    /// Drop any memoized state.
    fn purge(&self);
}

/// Real filesystem with a read-through memo table.
#[derive(Default)]
pub struct OsFileSystem {
    reads: Mutex<FxHashMap<PathBuf, String>>,
}

impl OsFileSystem {
    pub fn new() -> Self {
        OsFileSystem::default()
    }
}

impl FileSystem for OsFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        if let Some(contents) = self.reads.lock().get(path) {
            return Ok(contents.clone());
        }
        let contents = std::fs::read_to_string(path)?;
        self.reads
            .lock()
            .insert(path.to_path_buf(), contents.clone());
        Ok(contents)
    }

    fn mtime(&self, path: &Path) -> Option<SystemTime> {
        std::fs::metadata(path).and_then(|m| m.modified()).ok()
    }

    fn purge(&self) {
        self.reads.lock().clear();
    }
}

/// In-memory filesystem for tests, with explicit per-file mtimes.
#[derive(Default)]
pub struct MockFileSystem {
    files: Mutex<FxHashMap<PathBuf, MockFile>>,
}

struct MockFile {
    contents: String,
    mtime: SystemTime,
}

impl MockFileSystem {
    pub fn new() -> Self {
        MockFileSystem::default()
    }

    pub fn write(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.lock().insert(
            path.into(),
            MockFile {
                contents: contents.into(),
                mtime: SystemTime::now(),
            },
        );
    }

    /// Set a file's mtime without touching its contents, creating an empty
    /// file if absent. Lets tests bump a dependency's timestamp precisely.
    pub fn set_mtime(&self, path: impl Into<PathBuf>, mtime: SystemTime) {
        let mut files = self.files.lock();
        let entry = files.entry(path.into()).or_insert_with(|| MockFile {
            contents: String::new(),
            mtime,
        });
        entry.mtime = mtime;
    }

    pub fn remove(&self, path: &Path) {
        self.files.lock().remove(path);
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .lock()
            .get(path)
            .map(|f| f.contents.clone())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no such file: {}", path.display()),
                )
            })
    }

    fn mtime(&self, path: &Path) -> Option<SystemTime> {
        self.files.lock().get(path).map(|f| f.mtime)
    }

    fn purge(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn os_file_system_memoizes_reads_until_purged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.marko");
        std::fs::write(&path, "one").unwrap();

        let fs = OsFileSystem::new();
        assert_eq!(fs.read_to_string(&path).unwrap(), "one");

        std::fs::write(&path, "two").unwrap();
        assert_eq!(fs.read_to_string(&path).unwrap(), "one");

        fs.purge();
        assert_eq!(fs.read_to_string(&path).unwrap(), "two");
    }

    #[test]
    fn mock_round_trips_contents_and_mtime() {
        let fs = MockFileSystem::new();
        fs.write("/app/a.marko", "<div/>");

        assert_eq!(fs.read_to_string(Path::new("/app/a.marko")).unwrap(), "<div/>");
        assert!(fs.mtime(Path::new("/app/a.marko")).is_some());
        assert!(fs.mtime(Path::new("/app/missing.marko")).is_none());
    }

    #[test]
    fn mock_set_mtime_overrides() {
        let fs = MockFileSystem::new();
        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1000);
        fs.write("/dep.js", "module");
        fs.set_mtime("/dep.js", past);

        assert_eq!(fs.mtime(Path::new("/dep.js")), Some(past));
    }

    #[test]
    fn mock_read_of_missing_file_is_not_found() {
        let fs = MockFileSystem::new();
        let err = fs.read_to_string(Path::new("/nope")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
