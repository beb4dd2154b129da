//! Process-wide default collaborators and their deferred clearing.
//!
//! Compiles that use the default cache or filesystem schedule a coalesced
//! flush: however many templates a batch compiles, the defaults are cleared
//! once, when the host calls [`flush_scheduled_defaults`] between batches.
//! Compiles with injected collaborators never schedule anything.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::cache::{Cache, MemoryCache};
use crate::config::CompileConfig;
use crate::fs::{FileSystem, OsFileSystem};

static DEFAULT_CACHE: Lazy<Arc<dyn Cache>> = Lazy::new(|| Arc::new(MemoryCache::new()));
static DEFAULT_FILE_SYSTEM: Lazy<Arc<dyn FileSystem>> =
    Lazy::new(|| Arc::new(OsFileSystem::new()));

static CLEAR_SCHEDULED: AtomicBool = AtomicBool::new(false);
static CLEARING_CACHE: AtomicBool = AtomicBool::new(false);
static CLEARING_FS: AtomicBool = AtomicBool::new(false);

pub fn default_cache() -> Arc<dyn Cache> {
    DEFAULT_CACHE.clone()
}

pub fn default_file_system() -> Arc<dyn FileSystem> {
    DEFAULT_FILE_SYSTEM.clone()
}

pub(crate) fn is_default_cache(config: &CompileConfig) -> bool {
    Arc::ptr_eq(&config.cache, &DEFAULT_CACHE)
}

pub(crate) fn is_default_file_system(config: &CompileConfig) -> bool {
    Arc::ptr_eq(&config.file_system, &DEFAULT_FILE_SYSTEM)
}

/// Record that the current batch used default collaborators. Repeated calls
/// before a flush are coalesced into one pending clear.
pub(crate) fn schedule_default_clear(config: &CompileConfig) {
    if CLEAR_SCHEDULED.load(Ordering::Acquire) {
        return;
    }
    let cache = is_default_cache(config);
    let fs = is_default_file_system(config);
    if cache || fs {
        CLEARING_CACHE.store(cache, Ordering::Release);
        CLEARING_FS.store(fs, Ordering::Release);
        CLEAR_SCHEDULED.store(true, Ordering::Release);
    }
}

/// Perform any pending clear of the default cache and filesystem. Hosts call
/// this once per processing batch; a no-op when nothing was scheduled.
pub fn flush_scheduled_defaults() {
    if !CLEAR_SCHEDULED.swap(false, Ordering::AcqRel) {
        return;
    }
    if CLEARING_CACHE.swap(false, Ordering::AcqRel) {
        DEFAULT_CACHE.clear();
    }
    if CLEARING_FS.swap(false, Ordering::AcqRel) {
        DEFAULT_FILE_SYSTEM.purge();
    }
}
