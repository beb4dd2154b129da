use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::{Cache, CacheKey, CachedArtifact};

/// Default in-process cache. Entries are cloned in and out, so callers never
/// share mutable structure with the store.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<FxHashMap<CacheKey, CachedArtifact>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        MemoryCache::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<CachedArtifact> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: CacheKey, artifact: CachedArtifact) {
        self.entries.lock().insert(key, artifact);
    }

    fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// No-op store used when caching is bypassed (parse-only and migrate-only
/// modes produce intermediate states that are not meaningful artifacts).
pub struct NullCache;

impl Cache for NullCache {
    fn get(&self, _key: &CacheKey) -> Option<CachedArtifact> {
        None
    }

    fn set(&self, _key: CacheKey, _artifact: CachedArtifact) {}

    fn clear(&self) {}
}
