use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::ast::visit::Visitor;
use crate::config::CompileConfig;
use crate::error::{CompileError, Result};

/// Builds a fresh visitor instance for one plugin module. Invoked once per
/// compilation that loads the plugin; a failure aborts the whole unit, the
/// same as any other pass failure.
pub type PluginFactory =
    dyn Fn(&CompileConfig) -> std::result::Result<Box<dyn Visitor>, String> + Send + Sync;

/// Registry mapping plugin module paths (as declared by taglibs) to loaded
/// factories. The host registers every migrator/transformer module it knows
/// about up front; a taglib declaring an unregistered path is a hard error
/// at compile time.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    inner: Arc<RwLock<FxHashMap<PathBuf, Arc<PluginFactory>>>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        PluginRegistry::default()
    }

    pub fn register<F>(&self, path: impl Into<PathBuf>, factory: F)
    where
        F: Fn(&CompileConfig) -> std::result::Result<Box<dyn Visitor>, String>
            + Send
            + Sync
            + 'static,
    {
        self.inner.write().insert(path.into(), Arc::new(factory));
    }

    pub fn load(&self, path: &Path, config: &CompileConfig) -> Result<Box<dyn Visitor>> {
        let factory = self
            .inner
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| CompileError::PluginNotRegistered {
                path: path.to_path_buf(),
            })?;
        factory(config).map_err(|message| CompileError::Plugin {
            path: path.to_path_buf(),
            message,
        })
    }
}
