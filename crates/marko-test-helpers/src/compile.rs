//! Compilation helpers for tests.
//!
//! Every helper builds a self-contained configuration — fresh in-memory
//! cache, mock filesystem, the built-in HTML translator — so tests never
//! share state through the process-wide defaults.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use marko_core::cache::MemoryCache;
use marko_core::config::CompileConfig;
use marko_core::fs::MockFileSystem;
use marko_core::pipeline::PipelineObserver;
use marko_core::{CompileResult, Translator};

/// Self-contained configuration rooted at `/app`, with its own cache and
/// mock filesystem.
pub fn test_config() -> CompileConfig {
    CompileConfig {
        cache: Arc::new(MemoryCache::new()),
        file_system: Arc::new(MockFileSystem::new()),
        translator: Some(Translator::html()),
        root: Some("/app".into()),
        optimize: Some(false),
        ..CompileConfig::default()
    }
}

/// Compile template source under the default test filename.
pub fn compile(source: &str) -> Result<CompileResult, String> {
    compile_at(source, "/app/a.marko")
}

/// Compile template source under an explicit filename.
pub fn compile_at(source: &str, filename: &str) -> Result<CompileResult, String> {
    let config = test_config();
    marko_core::compile(source, filename, &config).map_err(|e| e.to_string())
}

/// Observer counting pipeline stage invocations, for cache-behavior
/// assertions (a cache hit must never re-run the parser).
#[derive(Default)]
pub struct CountingObserver {
    parses: AtomicUsize,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl CountingObserver {
    pub fn new() -> Self {
        CountingObserver::default()
    }

    pub fn parses(&self) -> usize {
        self.parses.load(Ordering::SeqCst)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::SeqCst)
    }
}

impl PipelineObserver for CountingObserver {
    fn on_parse(&self, _filename: &Path) {
        self.parses.fetch_add(1, Ordering::SeqCst);
    }

    fn on_cache_hit(&self, _filename: &Path) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }

    fn on_cache_miss(&self, _filename: &Path) {
        self.misses.fetch_add(1, Ordering::SeqCst);
    }
}
