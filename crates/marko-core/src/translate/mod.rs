//! Translators: the final, output-format-specific lowering pass.
//!
//! A translator is configuration, not code identity — so each one is issued
//! an explicit process-lifetime token at construction, and that token is
//! what the cache key incorporates. Cloning a `Translator` preserves its
//! token (clones are the same translator); constructing a new one never
//! reuses a token.

mod cjs;
mod html;

pub use cjs::CjsInteropVisitor;
pub use html::HtmlVisitor;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::ast::visit::Visitor;
use crate::config::CompileConfig;

static NEXT_TRANSLATOR_ID: AtomicU64 = AtomicU64::new(1);

fn issue_translator_id() -> String {
    NEXT_TRANSLATOR_ID.fetch_add(1, Ordering::Relaxed).to_string()
}

type VisitorFactory = dyn Fn(&CompileConfig) -> Box<dyn Visitor> + Send + Sync;

#[derive(Clone)]
pub struct Translator {
    name: String,
    id: String,
    factory: Arc<VisitorFactory>,
}

impl Translator {
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&CompileConfig) -> Box<dyn Visitor> + Send + Sync + 'static,
    {
        Translator {
            name: name.into(),
            id: issue_translator_id(),
            factory: Arc::new(factory),
        }
    }

    /// Built-in HTML translator: lowers template nodes to `out.write` calls
    /// and wraps the program into a render function plus component
    /// registration epilogue.
    pub fn html() -> Self {
        Translator::new("html", |config| Box::new(HtmlVisitor::new(config)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Process-lifetime-stable identity token.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fresh visitor for one compilation. Translators are never cached, so
    /// this runs for cache hits and misses alike.
    pub fn visitor(&self, config: &CompileConfig) -> Box<dyn Visitor> {
        (self.factory)(config)
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("name", &self.name)
            .field("id", &self.id)
            .finish()
    }
}
