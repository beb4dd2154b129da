//! HTML translator: lowers template nodes into `out.write` statements and
//! wraps the result into the final program shape.

use crate::ast::visit::{VisitCtx, Visitor};
use crate::ast::{AttrValue, Expr, Node, Placeholder, Program, Stmt, Tag, Text};
use crate::config::CompileConfig;

pub struct HtmlVisitor {
    used_escape: bool,
    used_attr: bool,
    used_render_tag: bool,
}

impl HtmlVisitor {
    pub fn new(_config: &CompileConfig) -> Self {
        HtmlVisitor {
            used_escape: false,
            used_attr: false,
            used_render_tag: false,
        }
    }

    fn lower_html_tag(&mut self, tag: &mut Tag) -> Vec<Node> {
        let mut stmts = Vec::new();
        let all_static = tag
            .attrs
            .iter()
            .all(|a| !matches!(a.value, AttrValue::Expr(_)));

        if all_static {
            let mut open = format!("<{}", tag.name);
            for attr in &tag.attrs {
                match &attr.value {
                    AttrValue::Empty => {
                        open.push(' ');
                        open.push_str(&attr.name);
                    }
                    AttrValue::Literal(value) => {
                        open.push_str(&format!(" {}=\"{}\"", attr.name, value));
                    }
                    AttrValue::Expr(_) => unreachable!(),
                }
            }
            open.push('>');
            stmts.push(Stmt::Write(Expr::Str(open)));
        } else {
            stmts.push(Stmt::Write(Expr::Str(format!("<{}", tag.name))));
            for attr in &tag.attrs {
                match &attr.value {
                    AttrValue::Empty => {
                        stmts.push(Stmt::Write(Expr::Str(format!(" {}", attr.name))));
                    }
                    AttrValue::Literal(value) => {
                        stmts.push(Stmt::Write(Expr::Str(format!(
                            " {}=\"{}\"",
                            attr.name, value
                        ))));
                    }
                    AttrValue::Expr(expr) => {
                        self.used_attr = true;
                        stmts.push(Stmt::Write(Expr::Call {
                            callee: "attr".to_string(),
                            args: vec![Expr::Str(attr.name.clone()), Expr::Raw(expr.clone())],
                        }));
                    }
                }
            }
            stmts.push(Stmt::Write(Expr::Str(">".to_string())));
        }

        stmts.extend(take_stmts(&mut tag.body));
        stmts.push(Stmt::Write(Expr::Str(format!("</{}>", tag.name))));
        stmts.into_iter().map(Node::Stmt).collect()
    }

    fn lower_custom_tag(&mut self, tag: &mut Tag) -> Vec<Node> {
        self.used_render_tag = true;
        let mut args = vec![
            Expr::Str(tag.name.clone()),
            Expr::Raw("out".to_string()),
            Expr::Raw(input_object(tag)),
        ];
        let body = merge_adjacent_writes(take_stmts(&mut tag.body));
        if !body.is_empty() {
            args.push(Expr::ArrowFn {
                params: vec!["out".to_string()],
                body,
            });
        }
        vec![Node::Stmt(Stmt::Expr(Expr::Call {
            callee: "renderTag".to_string(),
            args,
        }))]
    }
}

impl Visitor for HtmlVisitor {
    fn visit_text(&mut self, text: &mut Text, ctx: &mut VisitCtx<'_>) {
        ctx.replace(vec![Node::Stmt(Stmt::Write(Expr::Str(text.value.clone())))]);
    }

    fn visit_placeholder(&mut self, ph: &mut Placeholder, ctx: &mut VisitCtx<'_>) {
        let expr = if ph.escape {
            self.used_escape = true;
            Expr::Call {
                callee: "escapeXml".to_string(),
                args: vec![Expr::Raw(ph.expr.clone())],
            }
        } else {
            Expr::Raw(ph.expr.clone())
        };
        ctx.replace(vec![Node::Stmt(Stmt::Write(expr))]);
    }

    fn visit_tag_exit(&mut self, tag: &mut Tag, ctx: &mut VisitCtx<'_>) {
        let replacement = if ctx.lookup.tag_def(&tag.name).is_some() {
            self.lower_custom_tag(tag)
        } else {
            self.lower_html_tag(tag)
        };
        ctx.replace(replacement);
    }

    fn visit_program_exit(&mut self, program: &mut Program, ctx: &mut VisitCtx<'_>) {
        let render_body = merge_adjacent_writes(take_stmts(&mut program.body));

        let mut body = Vec::new();
        let mut html_helpers = Vec::new();
        if self.used_escape {
            html_helpers.push("escapeXml".to_string());
        }
        if self.used_attr {
            html_helpers.push("attr".to_string());
        }
        if !html_helpers.is_empty() {
            body.push(Stmt::Import {
                names: html_helpers,
                from: "marko/runtime/html".to_string(),
            });
        }
        let mut component_helpers = vec!["register".to_string()];
        if self.used_render_tag {
            component_helpers.push("renderTag".to_string());
        }
        body.push(Stmt::Import {
            names: component_helpers,
            from: "marko/runtime/components".to_string(),
        });

        body.push(Stmt::FnDecl {
            name: "render".to_string(),
            params: vec!["out".to_string(), "input".to_string()],
            body: render_body,
            exported: true,
        });
        body.push(Stmt::Const {
            name: "componentType".to_string(),
            value: Expr::Str(ctx.meta.id.clone()),
            exported: true,
        });
        body.push(Stmt::Expr(Expr::Call {
            callee: "register".to_string(),
            args: vec![
                Expr::Raw("componentType".to_string()),
                Expr::Raw("render".to_string()),
            ],
        }));

        program.body = body.into_iter().map(Node::Stmt).collect();
    }
}

/// Drain lowered statements from a node list, dropping anything a pass
/// already removed from the output (non-statement leftovers do not survive
/// translation).
fn take_stmts(nodes: &mut Vec<Node>) -> Vec<Stmt> {
    std::mem::take(nodes)
        .into_iter()
        .filter_map(|node| match node {
            Node::Stmt(stmt) => Some(stmt),
            _ => None,
        })
        .collect()
}

/// Peephole: collapse runs of static writes into one, so fully static
/// markup costs a single `out.write` call.
fn merge_adjacent_writes(stmts: Vec<Stmt>) -> Vec<Stmt> {
    let mut out: Vec<Stmt> = Vec::with_capacity(stmts.len());
    for stmt in stmts {
        if let Stmt::Write(Expr::Str(next)) = &stmt {
            if let Some(Stmt::Write(Expr::Str(prev))) = out.last_mut() {
                prev.push_str(next);
                continue;
            }
        }
        out.push(stmt);
    }
    out
}

/// Build the input object literal for a custom tag from its attributes.
fn input_object(tag: &Tag) -> String {
    let mut fields = Vec::new();
    for attr in &tag.attrs {
        let value = match &attr.value {
            AttrValue::Empty => "true".to_string(),
            AttrValue::Literal(v) => format!("{:?}", v),
            AttrValue::Expr(e) => e.clone(),
        };
        fields.push(format!("{:?}: {}", attr.name, value));
    }
    format!("{{ {} }}", fields.join(", "))
}
