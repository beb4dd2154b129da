//! CommonJS interop pass.
//!
//! Runs after translation when `modules = "cjs"`: rewrites module-form
//! imports into `require` calls and exported declarations into `exports`
//! assignments, leaving the rest of the program untouched.

use crate::ast::visit::{VisitCtx, Visitor};
use crate::ast::{Expr, Node, Stmt};

pub struct CjsInteropVisitor;

impl Visitor for CjsInteropVisitor {
    fn visit_stmt(&mut self, stmt: &mut Stmt, ctx: &mut VisitCtx<'_>) {
        match stmt {
            Stmt::Import { names, from } => {
                ctx.replace(vec![Node::Stmt(Stmt::Const {
                    name: format!("{{ {} }}", names.join(", ")),
                    value: Expr::Call {
                        callee: "require".to_string(),
                        args: vec![Expr::Str(from.clone())],
                    },
                    exported: false,
                })]);
            }
            Stmt::FnDecl { name, exported, .. } if *exported => {
                *exported = false;
                let export = Stmt::Assign {
                    target: format!("exports.{}", name),
                    value: Expr::Raw(name.clone()),
                };
                ctx.replace(vec![Node::Stmt(stmt.clone()), Node::Stmt(export)]);
            }
            Stmt::Const { name, exported, .. } if *exported => {
                *exported = false;
                let export = Stmt::Assign {
                    target: format!("exports.{}", name),
                    value: Expr::Raw(name.clone()),
                };
                ctx.replace(vec![Node::Stmt(stmt.clone()), Node::Stmt(export)]);
            }
            _ => {}
        }
    }
}
