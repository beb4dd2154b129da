//! Parser adapter: populates a pre-built empty program shell from template
//! source text.
//!
//! The grammar covered here is the subset the pipeline needs to be real:
//! elements with attributes (quoted, bare, or `${expr}` values), text runs,
//! escaped `${expr}` / raw `$!{expr}` placeholders, and HTML comments.
//! Malformed input produces a `CompileError::Syntax` carrying the source
//! position; the whole unit's compilation aborts with no cache write.

use crate::ast::{Attr, AttrValue, Node, Placeholder, Pos, Program, Span, Tag, Text};
use crate::error::{CompileError, Result};

pub fn parse(source: &str, program: &mut Program) -> Result<()> {
    let mut parser = Parser::new(source);
    program.body = parser.parse_nodes(None)?;
    Ok(())
}

struct Parser<'a> {
    bytes: &'a [u8],
    src: &'a str,
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Parser {
            bytes: src.as_bytes(),
            src,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn here(&self) -> Pos {
        Pos {
            offset: self.pos,
            line: self.line,
            column: self.col,
        }
    }

    fn err(&self, message: impl Into<String>) -> CompileError {
        CompileError::syntax(message, self.here())
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(byte)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.bytes[self.pos..].starts_with(s.as_bytes())
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            for _ in 0..s.len() {
                self.bump();
            }
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.bump();
        }
    }

    fn parse_nodes(&mut self, open_tag: Option<&str>) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();
        loop {
            if self.at_end() {
                return match open_tag {
                    Some(name) => Err(self.err(format!("unexpected end of input, unclosed <{name}>"))),
                    None => Ok(nodes),
                };
            }

            if self.starts_with("</") {
                let name = open_tag
                    .ok_or_else(|| self.err("unexpected closing tag"))?;
                self.eat("</");
                let closing = self.ident()?;
                self.skip_ws();
                if !self.eat(">") {
                    return Err(self.err(format!("expected '>' to end </{closing}>")));
                }
                if closing != name {
                    return Err(self.err(format!(
                        "mismatched closing tag </{closing}>, expected </{name}>"
                    )));
                }
                return Ok(nodes);
            }

            if self.starts_with("<!--") {
                self.skip_comment()?;
            } else if self.starts_with("<") {
                nodes.push(Node::Tag(self.parse_tag()?));
            } else if self.starts_with("$!{") || self.starts_with("${") {
                nodes.push(Node::Placeholder(self.parse_placeholder()?));
            } else {
                if let Some(text) = self.parse_text() {
                    nodes.push(Node::Text(text));
                }
            }
        }
    }

    fn skip_comment(&mut self) -> Result<()> {
        self.eat("<!--");
        while !self.at_end() {
            if self.eat("-->") {
                return Ok(());
            }
            self.bump();
        }
        Err(self.err("unterminated comment"))
    }

    fn parse_tag(&mut self) -> Result<Tag> {
        let start = self.pos;
        self.eat("<");
        let name = self.ident()?;
        let attrs = self.parse_attrs()?;

        if self.eat("/>") {
            return Ok(Tag {
                name,
                attrs,
                body: Vec::new(),
                span: Span::new(start, self.pos.saturating_sub(1)),
            });
        }
        if !self.eat(">") {
            return Err(self.err(format!("expected '>' or '/>' in <{name}>")));
        }

        let body = self.parse_nodes(Some(&name))?;
        Ok(Tag {
            name,
            attrs,
            body,
            span: Span::new(start, self.pos.saturating_sub(1)),
        })
    }

    fn parse_attrs(&mut self) -> Result<Vec<Attr>> {
        let mut attrs = Vec::new();
        loop {
            // Whitespace or commas separate attributes.
            loop {
                self.skip_ws();
                if !self.eat(",") {
                    break;
                }
            }
            if self.at_end() {
                return Err(self.err("unexpected end of input inside tag"));
            }
            if self.peek() == Some(b'>') || self.starts_with("/>") {
                return Ok(attrs);
            }

            let start = self.pos;
            let name = self.ident()?;
            self.skip_ws();
            let value = if self.eat("=") {
                self.skip_ws();
                self.parse_attr_value()?
            } else {
                AttrValue::Empty
            };
            attrs.push(Attr {
                name,
                value,
                span: Span::new(start, self.pos.saturating_sub(1)),
            });
        }
    }

    fn parse_attr_value(&mut self) -> Result<AttrValue> {
        match self.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                self.bump();
                let start = self.pos;
                while self.peek() != Some(quote) {
                    if self.bump().is_none() {
                        return Err(self.err("unterminated attribute value"));
                    }
                }
                let value = self.src[start..self.pos].to_string();
                self.bump();
                Ok(AttrValue::Literal(value))
            }
            Some(b'$') if self.starts_with("${") => {
                self.eat("$");
                Ok(AttrValue::Expr(self.braced_expr()?))
            }
            Some(_) => {
                let start = self.pos;
                while let Some(b) = self.peek() {
                    if b.is_ascii_whitespace() || b == b',' || b == b'>' || self.starts_with("/>") {
                        break;
                    }
                    self.bump();
                }
                if self.pos == start {
                    return Err(self.err("expected attribute value"));
                }
                Ok(AttrValue::Literal(self.src[start..self.pos].to_string()))
            }
            None => Err(self.err("unexpected end of input inside tag")),
        }
    }

    fn parse_placeholder(&mut self) -> Result<Placeholder> {
        let start = self.pos;
        self.eat("$");
        let escape = !self.eat("!");
        let expr = self.braced_expr()?;
        Ok(Placeholder {
            expr,
            escape,
            span: Span::new(start, self.pos.saturating_sub(1)),
        })
    }

    /// Consume `{ … }` with balanced inner braces, returning the trimmed
    /// interior text.
    fn braced_expr(&mut self) -> Result<String> {
        if !self.eat("{") {
            return Err(self.err("expected '{'"));
        }
        let start = self.pos;
        let mut depth = 1usize;
        while let Some(b) = self.peek() {
            match b {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        let expr = self.src[start..self.pos].trim().to_string();
                        self.bump();
                        if expr.is_empty() {
                            return Err(self.err("empty placeholder expression"));
                        }
                        return Ok(expr);
                    }
                }
                _ => {}
            }
            self.bump();
        }
        Err(self.err("unterminated placeholder expression"))
    }

    fn parse_text(&mut self) -> Option<Text> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            // A lone '$' with no following brace stays part of the text run.
            if b == b'<' || (b == b'$' && (self.starts_with("${") || self.starts_with("$!{"))) {
                break;
            }
            self.bump();
        }
        if self.pos == start {
            return None;
        }
        Some(Text {
            value: self.src[start..self.pos].to_string(),
            span: Span::new(start, self.pos.saturating_sub(1)),
        })
    }

    fn ident(&mut self) -> Result<String> {
        let start = self.pos;
        match self.peek() {
            Some(b) if b.is_ascii_alphabetic() => {
                self.bump();
            }
            _ => return Err(self.err("expected tag name")),
        }
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.') {
                self.bump();
            } else {
                break;
            }
        }
        Ok(self.src[start..self.pos].to_string())
    }
}
