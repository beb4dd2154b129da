//! Component definitions, classes, and instances.

use std::fmt;
use std::sync::Arc;

/// Renders a component's output into a buffer.
pub type RendererFn = Arc<dyn Fn(&mut String) + Send + Sync>;

/// Raw definition produced by a component factory: either an explicit class
/// or a bare renderer that still needs normalizing into one.
#[derive(Clone, Default)]
pub struct ComponentDef {
    pub class: Option<ComponentClass>,
    pub renderer: Option<RendererFn>,
}

impl ComponentDef {
    pub fn from_class(class: ComponentClass) -> Self {
        ComponentDef {
            class: Some(class),
            renderer: None,
        }
    }

    pub fn from_renderer(renderer: RendererFn) -> Self {
        ComponentDef {
            class: None,
            renderer: Some(renderer),
        }
    }
}

/// Normalized component class. The registry tags each class with its type
/// name when it is first resolved, and — in debug builds — a synthesized
/// display name for diagnostics.
#[derive(Clone)]
pub struct ComponentClass {
    renderer: Option<RendererFn>,
    type_name: Option<String>,
    display_name: Option<String>,
}

impl ComponentClass {
    pub fn new(renderer: Option<RendererFn>) -> Self {
        ComponentClass {
            renderer,
            type_name: None,
            display_name: None,
        }
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub(crate) fn set_type_name(&mut self, type_name: &str) {
        self.type_name = Some(type_name.to_string());
    }

    pub(crate) fn set_display_name(&mut self, display_name: String) {
        self.display_name = Some(display_name);
    }

    pub fn instantiate(&self, id: impl Into<String>) -> ComponentInstance {
        ComponentInstance {
            id: id.into(),
            class: self.clone(),
        }
    }
}

impl fmt::Debug for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentClass")
            .field("type_name", &self.type_name)
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Normalize a bare renderer into a component class.
pub fn define_component(renderer: Option<RendererFn>) -> ComponentClass {
    ComponentClass::new(renderer)
}

pub struct ComponentInstance {
    pub id: String,
    class: ComponentClass,
}

impl fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("id", &self.id)
            .field("class", &self.class)
            .finish()
    }
}

impl ComponentInstance {
    pub fn type_name(&self) -> Option<&str> {
        self.class.type_name()
    }

    pub fn class(&self) -> &ComponentClass {
        &self.class
    }

    pub fn render(&self, out: &mut String) {
        if let Some(renderer) = &self.class.renderer {
            renderer(out);
        }
    }
}
