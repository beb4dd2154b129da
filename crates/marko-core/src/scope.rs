//! Variable-binding scope crawl.
//!
//! Runs once per freshly parsed template, before any pass, so migrators and
//! transformers can reason about identifier references. Collects the
//! template's implicit bindings (`input`, `out`) plus macro names and macro
//! parameters.

use rustc_hash::FxHashMap;

use crate::ast::{AttrValue, Node, Program};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Implicit,
    Macro,
    MacroParam,
}

#[derive(Debug, Default)]
pub struct ScopeInfo {
    bindings: FxHashMap<String, BindingKind>,
}

impl ScopeInfo {
    pub fn has_binding(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn binding(&self, name: &str) -> Option<BindingKind> {
        self.bindings.get(name).copied()
    }

    fn bind(&mut self, name: impl Into<String>, kind: BindingKind) {
        self.bindings.insert(name.into(), kind);
    }
}

pub fn crawl(program: &Program) -> ScopeInfo {
    let mut scope = ScopeInfo::default();
    scope.bind("input", BindingKind::Implicit);
    scope.bind("out", BindingKind::Implicit);
    crawl_nodes(&program.body, &mut scope);
    scope
}

fn crawl_nodes(nodes: &[Node], scope: &mut ScopeInfo) {
    for node in nodes {
        if let Node::Tag(tag) = node {
            if tag.name == "macro" {
                if let Some(attr) = tag.attr("name") {
                    if let AttrValue::Literal(name) = &attr.value {
                        scope.bind(name.clone(), BindingKind::Macro);
                    }
                }
                if let Some(attr) = tag.attr("params") {
                    if let AttrValue::Literal(params) = &attr.value {
                        for param in params.split(',') {
                            let param = param.trim();
                            if !param.is_empty() {
                                scope.bind(param, BindingKind::MacroParam);
                            }
                        }
                    }
                }
            }
            crawl_nodes(&tag.body, scope);
        }
    }
}
