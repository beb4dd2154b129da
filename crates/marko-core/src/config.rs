//! Compiler options.

use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::Cache;
use crate::defaults;
use crate::fs::FileSystem;
use crate::pipeline::PipelineObserver;
use crate::taglib::{EmptyResolver, PluginRegistry, TaglibResolver};
use crate::translate::Translator;

/// Module format of the emitted program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleFormat {
    #[default]
    Esm,
    /// Adds the CommonJS interop pass after translation.
    Cjs,
}

#[derive(Clone)]
pub struct CompileConfig {
    /// Artifact store. Defaults to the process-wide shared cache.
    pub cache: Arc<dyn Cache>,

    /// Source reads and watch-file stats go through this abstraction.
    pub file_system: Arc<dyn FileSystem>,

    /// Required: compilation fails before touching any file without one.
    pub translator: Option<Translator>,

    /// Taglib discovery collaborator.
    pub resolver: Arc<dyn TaglibResolver>,

    /// Migrator/transformer modules, pre-loaded by the host.
    pub plugins: PluginRegistry,

    /// `None` defers to the environment: optimized ids are on only when
    /// `MARKO_ENV=production`.
    pub optimize: Option<bool>,

    /// Output format name handed to translators and plugins.
    pub output: String,

    pub modules: ModuleFormat,

    pub source_maps: bool,

    /// Project root for component ids. Defaults to the nearest ancestor of
    /// the working directory containing a `package.json`.
    pub root: Option<PathBuf>,

    /// Test/diagnostic hook observing pipeline stage execution.
    pub observer: Option<Arc<dyn PipelineObserver>>,

    /// Stop after parsing. Caching is bypassed.
    pub parse_only: bool,

    /// Stop after migration. Caching is bypassed.
    pub migrate_only: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        CompileConfig {
            cache: defaults::default_cache(),
            file_system: defaults::default_file_system(),
            translator: None,
            resolver: Arc::new(EmptyResolver),
            plugins: PluginRegistry::new(),
            optimize: None,
            output: "html".to_string(),
            modules: ModuleFormat::default(),
            source_maps: false,
            root: None,
            observer: None,
            parse_only: false,
            migrate_only: false,
        }
    }
}

impl CompileConfig {
    /// Default configuration with the built-in HTML translator installed.
    pub fn html() -> Self {
        CompileConfig {
            translator: Some(Translator::html()),
            ..CompileConfig::default()
        }
    }

    pub(crate) fn resolved_optimize(&self) -> bool {
        self.optimize.unwrap_or_else(|| {
            std::env::var("MARKO_ENV").map(|v| v == "production").unwrap_or(false)
        })
    }

    /// Caching is meaningless for intermediate-only modes.
    pub(crate) fn can_cache(&self) -> bool {
        !(self.parse_only || self.migrate_only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_optimize_wins_over_environment() {
        let mut config = CompileConfig::html();
        config.optimize = Some(true);
        assert!(config.resolved_optimize());
        config.optimize = Some(false);
        assert!(!config.resolved_optimize());
    }

    #[test]
    fn intermediate_modes_disable_caching() {
        let mut config = CompileConfig::html();
        assert!(config.can_cache());
        config.parse_only = true;
        assert!(!config.can_cache());
        config.parse_only = false;
        config.migrate_only = true;
        assert!(!config.can_cache());
    }
}
