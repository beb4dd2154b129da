//! Per-template compilation metadata.
//!
//! One `Metadata` record rides alongside the AST through the pipeline and is
//! returned to the caller with the generated code. The watch-file set is
//! accumulated incrementally while passes run (plugin module paths, taglib
//! definition files) and only frozen into its final ordered form at the end
//! of compilation.

use std::path::PathBuf;

use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Compiled-output descriptor for one template.
///
/// `Clone` is the aliasing boundary at the cache write: the stored snapshot
/// owns fresh collections, so later in-place mutation of the live metadata
/// by downstream passes cannot corrupt the cached copy.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Metadata {
    /// Component identity: the project-relative template path, or a short
    /// stable hash of it when compiling with `optimize`.
    pub id: String,

    /// Macro definitions hoisted out of the template, by macro name.
    pub macros: FxHashMap<String, MacroDef>,

    /// Dependencies recorded for the bundler, in discovery order.
    pub deps: Vec<Dep>,

    /// Custom tags referenced by the template, in discovery order.
    pub tags: Vec<String>,

    /// Files whose modification invalidates this template's cache entry.
    /// Insertion-ordered; frozen once compilation finishes.
    pub watch_files: IndexSet<PathBuf>,
}

impl Metadata {
    pub fn new(id: impl Into<String>) -> Self {
        Metadata {
            id: id.into(),
            ..Metadata::default()
        }
    }

    pub fn add_watch_file(&mut self, path: impl Into<PathBuf>) {
        self.watch_files.insert(path.into());
    }

    pub fn add_tag(&mut self, name: &str) {
        if !self.tags.iter().any(|t| t == name) {
            self.tags.push(name.to_string());
        }
    }

    pub fn add_dep(&mut self, dep: Dep) {
        if !self.deps.contains(&dep) {
            self.deps.push(dep);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroDef {
    pub name: String,
    pub params: Vec<String>,
}

/// A build dependency of a compiled template: either a file on disk or an
/// inline block (e.g. a style section) exposed under a virtual path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dep {
    Path(PathBuf),
    Inline { virtual_path: String, code: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn clone_snapshot_does_not_alias_live_metadata() {
        let mut live = Metadata::new("widgets/button.marko");
        live.add_tag("app-button");
        live.add_watch_file("/taglibs/app.marko.json");

        let snapshot = live.clone();

        live.add_tag("app-icon");
        live.add_dep(Dep::Path(PathBuf::from("/components/icon.marko")));
        live.add_watch_file("/plugins/transform.js");
        live.macros.insert(
            "greeting".to_string(),
            MacroDef {
                name: "greeting".to_string(),
                params: vec!["name".to_string()],
            },
        );

        assert_eq!(snapshot.tags, ["app-button"]);
        assert!(snapshot.deps.is_empty());
        assert!(snapshot.macros.is_empty());
        assert_eq!(snapshot.watch_files.len(), 1);
    }

    #[test]
    fn watch_files_preserve_insertion_order_and_dedupe() {
        let mut meta = Metadata::new("a.marko");
        meta.add_watch_file("/b/migrate.js");
        meta.add_watch_file("/a/transform.js");
        meta.add_watch_file("/b/migrate.js");

        let files: Vec<_> = meta.watch_files.iter().collect();
        assert_eq!(
            files,
            [Path::new("/b/migrate.js"), Path::new("/a/transform.js")]
        );
    }

    #[test]
    fn tags_and_deps_ignore_duplicates() {
        let mut meta = Metadata::new("a.marko");
        meta.add_tag("app-button");
        meta.add_tag("app-button");
        meta.add_dep(Dep::Path(PathBuf::from("/x.marko")));
        meta.add_dep(Dep::Path(PathBuf::from("/x.marko")));

        assert_eq!(meta.tags.len(), 1);
        assert_eq!(meta.deps.len(), 1);
    }
}
