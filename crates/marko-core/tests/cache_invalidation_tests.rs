//! Cache correctness: idempotent recompiles, content-hash and watch-file
//! invalidation, per-translator isolation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use indexmap::IndexMap;
use marko_core::ast::visit::Visitor;
use marko_core::cache::MemoryCache;
use marko_core::compile;
use marko_core::config::CompileConfig;
use marko_core::fs::MockFileSystem;
use marko_core::taglib::{StaticResolver, Taglib, TaglibLookup};
use marko_core::Translator;
use marko_test_helpers::{test_config, CountingObserver};

struct NoopMigrator;

impl Visitor for NoopMigrator {}

/// Config whose taglib declares one migrator plugin, so compiles record a
/// watch file.
fn config_with_migrator(fs: Arc<MockFileSystem>) -> (CompileConfig, PathBuf) {
    let migrator_path = PathBuf::from("/plugins/app-migrator.js");
    let taglib = Taglib {
        id: "app".to_string(),
        file_path: PathBuf::from("/taglibs/app.json"),
        tags: IndexMap::new(),
        migrator: Some(migrator_path.clone()),
        transformers: Vec::new(),
    };
    let mut lookup = TaglibLookup::empty();
    lookup.taglibs_by_id.insert(taglib.id.clone(), taglib);

    let mut config = test_config();
    config.file_system = fs;
    config.resolver = Arc::new(StaticResolver::new(lookup));
    config
        .plugins
        .register(migrator_path.clone(), |_| Ok(Box::new(NoopMigrator)));
    (config, migrator_path)
}

#[test]
fn recompiling_unchanged_source_is_a_cache_hit() {
    let observer = Arc::new(CountingObserver::new());
    let mut config = test_config();
    config.observer = Some(observer.clone());

    let first = compile("<div>${input.x}</div>", "/app/a.marko", &config).unwrap();
    let second = compile("<div>${input.x}</div>", "/app/a.marko", &config).unwrap();

    assert_eq!(observer.parses(), 1, "cache hit must not re-parse");
    assert_eq!(observer.misses(), 1);
    assert_eq!(observer.hits(), 1);

    assert_eq!(first.code, second.code);
    assert_eq!(first.meta.id, second.meta.id);
    assert_eq!(first.meta.tags, second.meta.tags);
    assert_eq!(first.meta.deps, second.meta.deps);
}

#[test]
fn content_change_invalidates_the_entry() {
    let observer = Arc::new(CountingObserver::new());
    let mut config = test_config();
    config.observer = Some(observer.clone());

    compile("<div/>", "/app/a.marko", &config).unwrap();
    let changed = compile("<span/>", "/app/a.marko", &config).unwrap();

    assert_eq!(observer.misses(), 2, "changed content must miss");
    assert_eq!(observer.hits(), 0);
    assert!(changed.code.contains("<span>"));
}

#[test]
fn newer_watch_file_invalidates_the_entry() {
    let fs = Arc::new(MockFileSystem::new());
    let (mut config, migrator_path) = config_with_migrator(fs.clone());
    let observer = Arc::new(CountingObserver::new());
    config.observer = Some(observer.clone());

    let first = compile("<div/>", "/app/a.marko", &config).unwrap();
    assert!(first.meta.watch_files.contains(&migrator_path));

    // Bump the migrator module's mtime past the stored snapshot.
    fs.set_mtime(&migrator_path, SystemTime::now() + Duration::from_secs(60));

    compile("<div/>", "/app/a.marko", &config).unwrap();
    assert_eq!(observer.misses(), 2);
    assert_eq!(observer.hits(), 0);
}

#[test]
fn unchanged_watch_file_keeps_the_entry() {
    let fs = Arc::new(MockFileSystem::new());
    let (mut config, migrator_path) = config_with_migrator(fs.clone());
    let observer = Arc::new(CountingObserver::new());
    config.observer = Some(observer.clone());

    fs.set_mtime(&migrator_path, SystemTime::UNIX_EPOCH + Duration::from_secs(1000));
    compile("<div/>", "/app/a.marko", &config).unwrap();
    compile("<div/>", "/app/a.marko", &config).unwrap();

    assert_eq!(observer.hits(), 1);
}

#[test]
fn missing_watch_file_counts_as_infinitely_old() {
    // The migrator path is never written to the mock filesystem, so its
    // mtime is unreadable; that must not invalidate the entry.
    let fs = Arc::new(MockFileSystem::new());
    let (mut config, _migrator_path) = config_with_migrator(fs);
    let observer = Arc::new(CountingObserver::new());
    config.observer = Some(observer.clone());

    compile("<div/>", "/app/a.marko", &config).unwrap();
    compile("<div/>", "/app/a.marko", &config).unwrap();

    assert_eq!(observer.hits(), 1);
    assert_eq!(observer.misses(), 1);
}

#[test]
fn translators_get_isolated_cache_slots() {
    let cache = Arc::new(MemoryCache::new());
    let observer = Arc::new(CountingObserver::new());
    let mut config = test_config();
    config.cache = cache.clone();
    config.observer = Some(observer.clone());

    let translator_a = Translator::html();
    let translator_b = Translator::html();

    config.translator = Some(translator_a.clone());
    compile("<div/>", "/app/a.marko", &config).unwrap();

    config.translator = Some(translator_b);
    compile("<div/>", "/app/a.marko", &config).unwrap();
    assert_eq!(observer.misses(), 2, "each translator fills its own slot");
    assert_eq!(cache.len(), 2);

    // Back to translator A: its slot is still valid.
    config.translator = Some(translator_a);
    compile("<div/>", "/app/a.marko", &config).unwrap();
    assert_eq!(observer.hits(), 1);
}

#[test]
fn cached_metadata_is_not_aliased_by_later_compiles() {
    let mut config = test_config();
    let observer = Arc::new(CountingObserver::new());
    config.observer = Some(observer.clone());

    let first = compile("<div/>", "/app/a.marko", &config).unwrap();
    let mut mutated = first.meta.clone();
    mutated.add_tag("injected");

    let second = compile("<div/>", "/app/a.marko", &config).unwrap();
    assert_eq!(observer.hits(), 1);
    assert!(second.meta.tags.is_empty(), "stored snapshot stayed clean");
}
