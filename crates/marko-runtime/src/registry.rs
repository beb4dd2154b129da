//! The component registry proper.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::component::{define_component, ComponentClass, ComponentDef, ComponentInstance};
use crate::error::RegistryError;
use crate::naming;

/// Produces a component definition on first resolution.
pub type ComponentFactory = Arc<dyn Fn() -> ComponentDef + Send + Sync>;

/// Deferred mount action returned by a successful hydration attempt.
pub type Mount = Box<dyn FnOnce() + Send>;

/// A server-rendered component awaiting its definition.
#[derive(Debug, Clone)]
pub struct PendingDef {
    pub instance_id: String,
}

impl PendingDef {
    pub fn new(instance_id: impl Into<String>) -> Self {
        PendingDef {
            instance_id: instance_id.into(),
        }
    }
}

/// Attempts to hydrate a pending definition once its component type has
/// been registered. Returning `None` means nothing to do; that is not an
/// error.
pub trait Hydrator: Send + Sync {
    fn try_hydrate(&self, def: &PendingDef, type_name: &str) -> Option<Mount>;
}

/// Fallback resolution for pre-registry-era component definitions.
pub trait LegacyLoader: Send + Sync {
    fn load(&self, type_name: &str) -> Option<ComponentDef>;
}

/// Last-resort resolution by component path.
pub trait PathLoader: Send + Sync {
    fn load(&self, type_name: &str) -> Option<ComponentDef>;
}

/// Process-wide table of component definitions, keyed by type name.
///
/// Entries move through three states: *registered* (factory known),
/// *loaded* (factory invoked, raw definition cached), and *classified*
/// (definition normalized into a class, memoized). Re-registering a type
/// demotes it back to registered, forcing re-derivation on next resolve.
#[derive(Default)]
pub struct Registry {
    state: Mutex<State>,
    hydrator: Option<Arc<dyn Hydrator>>,
    legacy_loader: Option<Arc<dyn LegacyLoader>>,
    path_loader: Option<Arc<dyn PathLoader>>,
}

#[derive(Default)]
struct State {
    registered: FxHashMap<String, ComponentFactory>,
    loaded: FxHashMap<String, ComponentDef>,
    component_types: FxHashMap<String, ComponentClass>,
    pending_defs: Vec<(PendingDef, String)>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    pub fn with_hydrator(mut self, hydrator: Arc<dyn Hydrator>) -> Self {
        self.hydrator = Some(hydrator);
        self
    }

    pub fn with_legacy_loader(mut self, loader: Arc<dyn LegacyLoader>) -> Self {
        self.legacy_loader = Some(loader);
        self
    }

    pub fn with_path_loader(mut self, loader: Arc<dyn PathLoader>) -> Self {
        self.path_loader = Some(loader);
        self
    }

    /// Store a factory for `type_name`, invalidating any loaded/classified
    /// state for it, then drain the pending-hydration queue: every queued
    /// entry gets exactly one hydration attempt, and attempts that yield no
    /// mount are silently skipped.
    pub fn register<F>(&self, type_name: impl Into<String>, factory: F) -> String
    where
        F: Fn() -> ComponentDef + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        let pending = {
            let mut state = self.state.lock();
            state
                .registered
                .insert(type_name.clone(), Arc::new(factory));
            state.loaded.remove(&type_name);
            state.component_types.remove(&type_name);
            std::mem::take(&mut state.pending_defs)
        };

        if !pending.is_empty() {
            debug!(type_name = %type_name, count = pending.len(), "flushing pending hydrations");
            if let Some(hydrator) = &self.hydrator {
                for (def, pending_type) in pending {
                    if let Some(mount) = hydrator.try_hydrate(&def, &pending_type) {
                        mount();
                    }
                }
            }
        }

        type_name
    }

    /// Queue a definition awaiting a future `register` call for `type_name`.
    pub fn add_pending_def(&self, def: PendingDef, type_name: impl Into<String>) {
        self.state.lock().pending_defs.push((def, type_name.into()));
    }

    /// Whether a definition factory has been registered for `type_name`.
    /// Note the name: this does not inspect the pending-hydration queue.
    pub fn has_pending_def(&self, type_name: &str) -> bool {
        self.state.lock().registered.contains_key(type_name)
    }

    /// Memoized class for `type_name`, loading and normalizing on first use.
    pub fn resolve(
        &self,
        type_name: &str,
        legacy: bool,
    ) -> Result<ComponentClass, RegistryError> {
        if let Some(class) = self.state.lock().component_types.get(type_name) {
            return Ok(class.clone());
        }

        let def = self.load(type_name, legacy)?;
        let mut class = match def.class {
            Some(class) => class,
            None => define_component(def.renderer),
        };
        class.set_type_name(type_name);

        if cfg!(debug_assertions) {
            // Naming is diagnostics only; a failed derivation never blocks
            // returning a usable class.
            if let Some(display_name) = naming::display_name_for(type_name) {
                class.set_display_name(display_name);
            }
        }

        self.state
            .lock()
            .component_types
            .insert(type_name.to_string(), class.clone());
        Ok(class)
    }

    /// Resolve the class for `type_name` and instantiate it.
    pub fn create(
        &self,
        type_name: &str,
        instance_id: impl Into<String>,
        legacy: bool,
    ) -> Result<ComponentInstance, RegistryError> {
        Ok(self.resolve(type_name, legacy)?.instantiate(instance_id))
    }

    fn load(&self, type_name: &str, legacy: bool) -> Result<ComponentDef, RegistryError> {
        let factory = {
            let state = self.state.lock();
            if let Some(def) = state.loaded.get(type_name) {
                return Ok(def.clone());
            }
            state.registered.get(type_name).cloned()
        };

        let def = if let Some(factory) = factory {
            factory()
        } else if legacy {
            self.legacy_loader
                .as_ref()
                .and_then(|loader| loader.load(type_name))
                .ok_or_else(|| RegistryError::ComponentNotFound(type_name.to_string()))?
        } else {
            self.path_loader
                .as_ref()
                .and_then(|loader| loader.load(type_name))
                .ok_or_else(|| RegistryError::ComponentNotFound(type_name.to_string()))?
        };

        self.state
            .lock()
            .loaded
            .insert(type_name.to_string(), def.clone());
        Ok(def)
    }
}
