//! Pipeline orchestrator: parse → migrate → transform → translate.
//!
//! One synchronous state machine per template. The post-transform tree and
//! its metadata are cached per `(component id, translator identity)`; cache
//! hits adopt both verbatim and skip parse/migrate/transform entirely. The
//! translator stage always runs fresh — translators are configuration, not
//! cacheable state. Plugin visitors merge with the built-in passes as an
//! ordered slice with the built-in appended last, so every handler runs per
//! node and the built-in has the final word.

mod migrate;
mod observer;
mod transform;

pub use migrate::MigrateVisitor;
pub use observer::PipelineObserver;
pub use transform::TransformVisitor;

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::ast::visit::{traverse, Visitor};
use crate::ast::Ast;
use crate::cache::{cache_key, content_hash, optimized_id, CachedArtifact};
use crate::config::{CompileConfig, ModuleFormat};
use crate::error::{CompileError, Result};
use crate::meta::Metadata;
use crate::parse::parse;
use crate::scope;
use crate::translate::CjsInteropVisitor;

/// Compile one unit down to its final program tree, with the metadata
/// attached out-of-band so it survives the surrounding host pipeline.
pub(crate) fn run(source: &str, filename: &Path, config: &CompileConfig) -> Result<Ast> {
    let translator = config
        .translator
        .as_ref()
        .ok_or(CompileError::MissingTranslator)?;
    let can_cache = config.can_cache();
    let component_id = component_id(filename, config);

    let hash = can_cache.then(|| content_hash(source));
    let key = can_cache.then(|| cache_key(&component_id, translator.id()));

    let mut cached = None;
    if let (Some(hash), Some(key)) = (&hash, &key) {
        cached = config
            .cache
            .get(key)
            .filter(|artifact| artifact_is_fresh(artifact, hash, config));
    }

    let is_new = cached.is_none();
    let (mut ast, mut meta) = match cached {
        Some(artifact) => {
            debug!(file = %filename.display(), "cache hit, adopting post-transform tree");
            if let Some(obs) = &config.observer {
                obs.on_cache_hit(filename);
            }
            (Ast::from_program(artifact.ast), artifact.meta)
        }
        None => {
            if can_cache {
                debug!(file = %filename.display(), "cache miss");
                if let Some(obs) = &config.observer {
                    obs.on_cache_miss(filename);
                }
            }
            let mut ast = Ast::shell(source.len());
            let id = if config.resolved_optimize() {
                optimized_id(&component_id)
            } else {
                component_id.clone()
            };
            let meta = Metadata::new(id);
            if let Some(obs) = &config.observer {
                obs.on_parse(filename);
            }
            parse(source, &mut ast.program)?;
            (ast, meta)
        }
    };

    let dir = filename.parent().unwrap_or_else(|| Path::new("."));
    let lookup = config.resolver.build_lookup(dir, translator);

    if !config.parse_only {
        // Passes reason about identifier references, so bindings are
        // crawled before any of them run.
        let scope = scope::crawl(&ast.program);

        if is_new {
            let mut migrators = load_plugins(
                lookup.taglibs_by_id.values().filter_map(|t| t.migrator.as_ref()),
                &mut meta,
                config,
            )?;
            let mut builtin_migrate = MigrateVisitor;
            let mut pass = visitor_refs(&mut migrators);
            pass.push(&mut builtin_migrate);
            traverse(&mut ast.program, &mut pass, &mut meta, &scope, &lookup);

            if !config.migrate_only {
                let mut transformers =
                    load_plugins(lookup.transformers(), &mut meta, config)?;
                let mut builtin_transform = TransformVisitor;
                let mut pass = visitor_refs(&mut transformers);
                pass.push(&mut builtin_transform);
                traverse(&mut ast.program, &mut pass, &mut meta, &scope, &lookup);
            }

            // Snapshot before the translator runs: the cache holds
            // translator-independent state, and a different translator for
            // the same component lands on its own key anyway.
            if let (Some(hash), Some(key)) = (hash, key) {
                config.cache.set(
                    key,
                    CachedArtifact::new(ast.program.clone(), meta.clone(), hash),
                );
            }
        }

        if !config.migrate_only {
            let mut translator_visitor = translator.visitor(config);
            traverse(
                &mut ast.program,
                &mut [translator_visitor.as_mut()],
                &mut meta,
                &scope,
                &lookup,
            );

            if config.modules == ModuleFormat::Cjs {
                let mut interop = CjsInteropVisitor;
                traverse(&mut ast.program, &mut [&mut interop], &mut meta, &scope, &lookup);
            }
        }
    }

    // Taglib definition files are always watched, touched or not.
    for taglib in lookup.taglibs_by_id.values() {
        if is_taglib_definition_file(&taglib.file_path) {
            meta.add_watch_file(taglib.file_path.clone());
        }
    }

    ast.attach_meta(meta);
    Ok(ast)
}

fn load_plugins<'a>(
    paths: impl Iterator<Item = &'a PathBuf>,
    meta: &mut Metadata,
    config: &CompileConfig,
) -> Result<Vec<Box<dyn Visitor>>> {
    let mut visitors = Vec::new();
    for path in paths {
        let visitor = config.plugins.load(path, config)?;
        meta.add_watch_file(path.clone());
        visitors.push(visitor);
    }
    Ok(visitors)
}

fn visitor_refs(boxed: &mut [Box<dyn Visitor>]) -> Vec<&mut (dyn Visitor + 'static)> {
    boxed.iter_mut().map(|b| b.as_mut()).collect()
}

/// A cached artifact is reusable only while the source digest matches and no
/// watch file is newer than the snapshot. A missing or unreadable watch file
/// counts as infinitely old: it never invalidates on its own.
fn artifact_is_fresh(
    artifact: &CachedArtifact,
    current_hash: &str,
    config: &CompileConfig,
) -> bool {
    if artifact.content_hash != current_hash {
        return false;
    }
    for path in &artifact.meta.watch_files {
        if let Some(mtime) = config.file_system.mtime(path) {
            if mtime > artifact.stored_at {
                debug!(watch_file = %path.display(), "dependency changed, discarding cache entry");
                return false;
            }
        }
    }
    true
}

fn is_taglib_definition_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with("marko.json"))
}

static PROJECT_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let found = cwd
        .ancestors()
        .find(|dir| dir.join("package.json").exists())
        .map(Path::to_path_buf);
    found.unwrap_or(cwd)
});

/// Component identity: the template path relative to the project root. A
/// file outside the root keeps its full path.
fn component_id(filename: &Path, config: &CompileConfig) -> String {
    let root = config.root.as_deref().unwrap_or_else(|| PROJECT_ROOT.as_path());
    filename
        .strip_prefix(root)
        .unwrap_or(filename)
        .to_string_lossy()
        .into_owned()
}
