//! Emitter: prints a translated program as source text.
//!
//! Only `Stmt` nodes are emittable; template nodes must have been lowered by
//! a translator before emission. Output concerns (indentation, string
//! escaping, source-map accounting) live here, separate from translation
//! state.

use crate::ast::{Expr, Node, Program, Stmt};
use crate::codegen::sourcemap::{SourceMap, SourceMapBuilder};

pub struct Emitter {
    output: String,
    indent_level: usize,
    source_map: Option<SourceMapBuilder>,
}

impl Emitter {
    pub fn new() -> Self {
        Emitter {
            output: String::new(),
            indent_level: 0,
            source_map: None,
        }
    }

    pub fn with_source_map(mut self, source_file: String, source_content: String) -> Self {
        self.source_map = Some(SourceMapBuilder::new(source_file, source_content));
        self
    }

    fn writeln(&mut self, line: &str) {
        for _ in 0..self.indent_level {
            self.output.push_str("  ");
        }
        self.output.push_str(line);
        self.output.push('\n');
        if let Some(map) = &mut self.source_map {
            map.advance(line);
            map.advance("\n");
        }
    }

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Import { names, from } => {
                self.writeln(&format!(
                    "import {{ {} }} from {};",
                    names.join(", "),
                    js_string(from)
                ));
            }
            Stmt::FnDecl {
                name,
                params,
                body,
                exported,
            } => {
                let prefix = if *exported { "export " } else { "" };
                self.writeln(&format!(
                    "{}function {}({}) {{",
                    prefix,
                    name,
                    params.join(", ")
                ));
                self.indent_level += 1;
                for stmt in body {
                    self.emit_stmt(stmt);
                }
                self.indent_level -= 1;
                self.writeln("}");
            }
            Stmt::Const {
                name,
                value,
                exported,
            } => {
                let prefix = if *exported { "export " } else { "" };
                self.writeln(&format!("{}const {} = {};", prefix, name, emit_expr(value)));
            }
            Stmt::Write(expr) => {
                self.writeln(&format!("out.write({});", emit_expr(expr)));
            }
            Stmt::Expr(expr) => {
                self.writeln(&format!("{};", emit_expr(expr)));
            }
            Stmt::Assign { target, value } => {
                self.writeln(&format!("{} = {};", target, emit_expr(value)));
            }
        }
    }

    pub fn finish(self, generated_file: &str) -> (String, Option<SourceMap>) {
        let map = self.source_map.map(|m| m.finish(generated_file));
        (self.output, map)
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Emitter::new()
    }
}

pub fn emit_program(program: &Program, mut emitter: Emitter, generated_file: &str) -> (String, Option<SourceMap>) {
    for node in &program.body {
        if let Node::Stmt(stmt) = node {
            emitter.emit_stmt(stmt);
        }
    }
    emitter.finish(generated_file)
}

fn emit_expr(expr: &Expr) -> String {
    match expr {
        Expr::Str(s) => js_string(s),
        Expr::Raw(raw) => raw.clone(),
        Expr::Call { callee, args } => {
            let args: Vec<String> = args.iter().map(emit_expr).collect();
            format!("{}({})", callee, args.join(", "))
        }
        Expr::ArrowFn { params, body } => {
            let mut inner = Emitter::new();
            inner.indent_level = 1;
            for stmt in body {
                inner.emit_stmt(stmt);
            }
            format!("({}) => {{\n{}}}", params.join(", "), inner.output)
        }
    }
}

fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
