use std::time::SystemTime;

use crate::ast::Program;
use crate::meta::Metadata;

/// Snapshot stored per cache key: the post-transform AST and metadata taken
/// *before* the translator runs, so the entry stays translator-independent.
/// Write-once per key generation; a content or dependency change simply
/// overwrites the slot with a fresh artifact.
#[derive(Debug, Clone)]
pub struct CachedArtifact {
    pub ast: Program,
    pub meta: Metadata,
    pub content_hash: String,
    pub stored_at: SystemTime,
}

impl CachedArtifact {
    pub fn new(ast: Program, meta: Metadata, content_hash: String) -> Self {
        CachedArtifact {
            ast,
            meta,
            content_hash,
            stored_at: SystemTime::now(),
        }
    }
}
