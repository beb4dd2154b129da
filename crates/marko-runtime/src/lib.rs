//! Runtime component registry.
//!
//! Compiled templates call [`Registry::register`] with their component type
//! name; the loader/hydration layer resolves classes back out by that same
//! name, lazily invoking factories and queuing hydration requests that
//! arrive before their definition. The registry is an explicit object —
//! empty at startup, alive for the process — so hosts and tests construct
//! their own instances instead of sharing hidden module state.

mod component;
mod error;
mod naming;
mod registry;

pub use component::{
    define_component, ComponentClass, ComponentDef, ComponentInstance, RendererFn,
};
pub use error::RegistryError;
pub use registry::{
    ComponentFactory, Hydrator, LegacyLoader, Mount, PathLoader, PendingDef, Registry,
};
