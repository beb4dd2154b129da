//! Built-in transform pass.
//!
//! Semantic lowering after migration: hoists `<macro>` definitions into the
//! metadata macro table, lifts `<style>` blocks out of the render tree as
//! inline dependencies, and records every referenced custom tag (plus its
//! implementing template) for the bundler. Runs after any taglib-contributed
//! transformers.

use crate::ast::visit::{VisitCtx, Visitor};
use crate::ast::{AttrValue, Node, Tag};
use crate::meta::{Dep, MacroDef};

pub struct TransformVisitor;

impl Visitor for TransformVisitor {
    fn visit_tag(&mut self, tag: &mut Tag, ctx: &mut VisitCtx<'_>) {
        match tag.name.as_str() {
            "macro" => {
                if let Some(name) = literal_attr(tag, "name") {
                    let params = literal_attr(tag, "params")
                        .map(|p| {
                            p.split(',')
                                .map(str::trim)
                                .filter(|s| !s.is_empty())
                                .map(str::to_string)
                                .collect()
                        })
                        .unwrap_or_default();
                    ctx.meta.macros.insert(
                        name.clone(),
                        MacroDef {
                            name,
                            params,
                        },
                    );
                }
                ctx.remove();
            }
            "style" => {
                let code = tag
                    .body
                    .iter()
                    .filter_map(|node| match node {
                        Node::Text(text) => Some(text.value.as_str()),
                        _ => None,
                    })
                    .collect::<String>();
                let virtual_path = format!("{}.css", ctx.meta.id);
                ctx.meta.add_dep(Dep::Inline { virtual_path, code });
                ctx.remove();
            }
            _ => {
                if let Some(def) = ctx.lookup.tag_def(&tag.name) {
                    let template = def.template.clone();
                    ctx.meta.add_tag(&tag.name);
                    if let Some(template) = template {
                        ctx.meta.add_dep(Dep::Path(template));
                    }
                }
            }
        }
    }
}

fn literal_attr(tag: &Tag, name: &str) -> Option<String> {
    match &tag.attr(name)?.value {
        AttrValue::Literal(value) => Some(value.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::visit::traverse;
    use crate::ast::Ast;
    use crate::meta::Metadata;
    use crate::parse::parse;
    use crate::scope::ScopeInfo;
    use crate::taglib::TaglibLookup;

    fn run(source: &str, lookup: &TaglibLookup) -> (Ast, Metadata) {
        let mut ast = Ast::shell(source.len());
        parse(source, &mut ast.program).unwrap();
        let mut meta = Metadata::new("a.marko");
        let mut transform = TransformVisitor;
        traverse(
            &mut ast.program,
            &mut [&mut transform],
            &mut meta,
            &ScopeInfo::default(),
            lookup,
        );
        (ast, meta)
    }

    #[test]
    fn macros_are_hoisted_out_of_the_tree() {
        let (ast, meta) = run(
            r#"<macro name="greeting" params="name">hi ${name}</macro><div/>"#,
            &TaglibLookup::empty(),
        );
        assert_eq!(ast.program.body.len(), 1);
        let def = &meta.macros["greeting"];
        assert_eq!(def.params, ["name"]);
    }

    #[test]
    fn style_blocks_become_inline_deps() {
        let (ast, meta) = run("<style>.a { color: red }</style><div/>", &TaglibLookup::empty());
        assert_eq!(ast.program.body.len(), 1);
        assert_eq!(
            meta.deps,
            [Dep::Inline {
                virtual_path: "a.marko.css".to_string(),
                code: ".a { color: red }".to_string(),
            }]
        );
    }
}
