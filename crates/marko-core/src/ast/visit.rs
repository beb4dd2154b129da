//! Visitor infrastructure for pipeline passes.
//!
//! Merged pass semantics are modeled as an explicit ordered slice of visitor
//! instances: traversal dispatches every node to every visitor's handler for
//! that node kind, in slice order. The pipeline appends built-in visitors
//! last by construction, so "all handlers run, built-in last" falls out of
//! ordering rather than any key-merge behavior.

use crate::ast::{Node, Placeholder, Program, Stmt, Tag, Text};
use crate::meta::Metadata;
use crate::scope::ScopeInfo;
use crate::taglib::TaglibLookup;

/// Per-node context handed to visitor handlers.
///
/// Handlers may queue a replacement for the current node; it is applied
/// after every visitor has seen the node, and replacement nodes are not
/// re-visited by the current traversal. When several visitors queue a
/// replacement for the same node, the last one wins.
pub struct VisitCtx<'a> {
    pub meta: &'a mut Metadata,
    pub scope: &'a ScopeInfo,
    pub lookup: &'a TaglibLookup,
    replacement: Option<Vec<Node>>,
}

impl<'a> VisitCtx<'a> {
    pub fn replace(&mut self, nodes: Vec<Node>) {
        self.replacement = Some(nodes);
    }

    /// Remove the current node from the tree.
    pub fn remove(&mut self) {
        self.replacement = Some(Vec::new());
    }
}

/// One pass over the tree. Handlers default to no-ops so passes implement
/// only the node kinds they care about.
pub trait Visitor {
    fn visit_tag(&mut self, _tag: &mut Tag, _ctx: &mut VisitCtx<'_>) {}

    /// Called after a tag's body has been traversed. Translators lower here
    /// so child nodes have already been rewritten.
    fn visit_tag_exit(&mut self, _tag: &mut Tag, _ctx: &mut VisitCtx<'_>) {}

    fn visit_text(&mut self, _text: &mut Text, _ctx: &mut VisitCtx<'_>) {}

    fn visit_placeholder(&mut self, _ph: &mut Placeholder, _ctx: &mut VisitCtx<'_>) {}

    fn visit_stmt(&mut self, _stmt: &mut Stmt, _ctx: &mut VisitCtx<'_>) {}

    /// Called once after the whole body has been traversed. Translators use
    /// this to wrap the lowered body into the final program shape.
    fn visit_program_exit(&mut self, _program: &mut Program, _ctx: &mut VisitCtx<'_>) {}
}

/// Traverse the program, dispatching each node to every visitor in order.
pub fn traverse(
    program: &mut Program,
    visitors: &mut [&mut (dyn Visitor + 'static)],
    meta: &mut Metadata,
    scope: &ScopeInfo,
    lookup: &TaglibLookup,
) {
    let mut ctx = VisitCtx {
        meta,
        scope,
        lookup,
        replacement: None,
    };
    walk_nodes(&mut program.body, visitors, &mut ctx);
    for visitor in visitors.iter_mut() {
        visitor.visit_program_exit(program, &mut ctx);
    }
}

fn walk_nodes(
    nodes: &mut Vec<Node>,
    visitors: &mut [&mut (dyn Visitor + 'static)],
    ctx: &mut VisitCtx<'_>,
) {
    let mut i = 0;
    while i < nodes.len() {
        dispatch_enter(&mut nodes[i], visitors, ctx);
        if apply_replacement(nodes, &mut i, ctx) {
            continue;
        }

        if let Node::Tag(tag) = &mut nodes[i] {
            walk_nodes(&mut tag.body, visitors, ctx);
            for visitor in visitors.iter_mut() {
                visitor.visit_tag_exit(tag, ctx);
            }
            if apply_replacement(nodes, &mut i, ctx) {
                continue;
            }
        }

        i += 1;
    }
}

fn dispatch_enter(node: &mut Node, visitors: &mut [&mut (dyn Visitor + 'static)], ctx: &mut VisitCtx<'_>) {
    match node {
        Node::Tag(tag) => {
            for visitor in visitors.iter_mut() {
                visitor.visit_tag(tag, ctx);
            }
        }
        Node::Text(text) => {
            for visitor in visitors.iter_mut() {
                visitor.visit_text(text, ctx);
            }
        }
        Node::Placeholder(ph) => {
            for visitor in visitors.iter_mut() {
                visitor.visit_placeholder(ph, ctx);
            }
        }
        Node::Stmt(stmt) => {
            for visitor in visitors.iter_mut() {
                visitor.visit_stmt(stmt, ctx);
            }
        }
    }
}

/// Splice a queued replacement over the node at `*i`. Returns true when a
/// replacement was applied; `*i` then points past the inserted nodes.
fn apply_replacement(nodes: &mut Vec<Node>, i: &mut usize, ctx: &mut VisitCtx<'_>) -> bool {
    if let Some(replacement) = ctx.replacement.take() {
        let inserted = replacement.len();
        nodes.splice(*i..=*i, replacement);
        *i += inserted;
        true
    } else {
        false
    }
}
