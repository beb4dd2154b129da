//! Built-in migration pass.
//!
//! Rewrites deprecated syntax into canonical form before transformation.
//! Currently: legacy `w-`-prefixed event attributes (`w-onClick`) become
//! their modern `on…` names. Runs after any taglib-contributed migrators,
//! so plugins see the legacy spelling and this pass has the final word.

use crate::ast::visit::{VisitCtx, Visitor};
use crate::ast::Tag;

pub struct MigrateVisitor;

impl Visitor for MigrateVisitor {
    fn visit_tag(&mut self, tag: &mut Tag, _ctx: &mut VisitCtx<'_>) {
        for attr in &mut tag.attrs {
            if let Some(event) = attr.name.strip_prefix("w-on") {
                attr.name = format!("on{}", event);
            }
        }
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

    #[test]
    fn legacy_event_attributes_are_renamed() {
        let source = r#"<button w-onClick="handleClick"/>"#;
        let mut ast = Ast::shell(source.len());
        parse(source, &mut ast.program).unwrap();

        let mut meta = Metadata::new("a.marko");
        let mut migrate = MigrateVisitor;
        traverse(
            &mut ast.program,
            &mut [&mut migrate],
            &mut meta,
            &ScopeInfo::default(),
            &TaglibLookup::empty(),
        );

        let crate::ast::Node::Tag(tag) = &ast.program.body[0] else {
            panic!("expected tag");
        };
        assert_eq!(tag.attrs[0].name, "onClick");
    }
}
