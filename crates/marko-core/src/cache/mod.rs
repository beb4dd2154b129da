//! Content-addressed cache for intermediate compilation artifacts.
//!
//! The pipeline stores the post-transform, pre-translate AST plus its
//! metadata under a key derived from the component id and the translator's
//! identity. The store itself is an injected collaborator with get/set/clear
//! semantics; the invalidation *decision* (content hash, watch-file
//! freshness) lives in the pipeline, not here.

mod artifact;
mod key;
mod memory;

pub use artifact::CachedArtifact;
pub use key::{cache_key, content_hash, optimized_id, CacheKey};
pub use memory::{MemoryCache, NullCache};

/// Store for cached compilation artifacts, shared across concurrent compile
/// calls. Implementations must make get/set/clear atomic per key; eviction
/// policy is the implementation's business.
pub trait Cache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<CachedArtifact>;
    fn set(&self, key: CacheKey, artifact: CachedArtifact);
    fn clear(&self);
}
