//! Taglib lookup model and the plugin registry.
//!
//! Taglib *discovery* (scanning directories, merging inherited definitions)
//! is an external collaborator hidden behind [`TaglibResolver`]; this module
//! only defines the lookup structure the pipeline consumes. Plugin modules
//! declared by taglibs are resolved through an explicit [`PluginRegistry`]
//! the host populates before compiling — the pipeline never loads code
//! dynamically.

mod plugins;

pub use plugins::{PluginFactory, PluginRegistry};

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::translate::Translator;

/// Everything known about custom tags for one directory + translator pair.
#[derive(Debug, Clone, Default)]
pub struct TaglibLookup {
    /// Taglibs by id, in resolution order. Order matters: it fixes the
    /// sequence migrator and transformer passes run in, which must be
    /// deterministic for cache-safe output.
    pub taglibs_by_id: IndexMap<String, Taglib>,
}

impl TaglibLookup {
    pub fn empty() -> Self {
        TaglibLookup::default()
    }

    /// Find a custom tag definition across all taglibs.
    pub fn tag_def(&self, name: &str) -> Option<&TagDef> {
        self.taglibs_by_id
            .values()
            .find_map(|taglib| taglib.tags.get(name))
    }

    /// All transformer module paths, in taglib resolution order.
    pub fn transformers(&self) -> impl Iterator<Item = &PathBuf> {
        self.taglibs_by_id
            .values()
            .flat_map(|taglib| taglib.transformers.iter())
    }
}

/// One declared bundle of custom tags plus optional plugin module paths.
#[derive(Debug, Clone)]
pub struct Taglib {
    pub id: String,
    /// The taglib's definition file on disk.
    pub file_path: PathBuf,
    pub tags: IndexMap<String, TagDef>,
    pub migrator: Option<PathBuf>,
    pub transformers: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct TagDef {
    pub name: String,
    /// Template implementing the tag, recorded as a dependency of any
    /// template that references it.
    pub template: Option<PathBuf>,
}

/// Black-box taglib discovery: given a template's directory and the active
/// translator, produce the lookup of known tags and plugins.
pub trait TaglibResolver: Send + Sync {
    fn build_lookup(&self, dir: &Path, translator: &Translator) -> TaglibLookup;
}

/// Default resolver: no taglibs.
pub struct EmptyResolver;

impl TaglibResolver for EmptyResolver {
    fn build_lookup(&self, _dir: &Path, _translator: &Translator) -> TaglibLookup {
        TaglibLookup::empty()
    }
}

/// Resolver returning one fixed lookup regardless of directory; used by
/// hosts with a precomputed tag universe and by tests.
pub struct StaticResolver {
    lookup: TaglibLookup,
}

impl StaticResolver {
    pub fn new(lookup: TaglibLookup) -> Self {
        StaticResolver { lookup }
    }
}

impl TaglibResolver for StaticResolver {
    fn build_lookup(&self, _dir: &Path, _translator: &Translator) -> TaglibLookup {
        self.lookup.clone()
    }
}
