//! Line-granularity source maps.
//!
//! The emitter writes one statement per line, so a line-to-line mapping is
//! enough for build tooling to point diagnostics back at the template. The
//! mappings string encodes, per generated line, one segment at column 0
//! referencing source 0 at the same line index ("AAAA" for the first line,
//! ";AACA" for each following line — VLQ for column 0, source 0, +1 line,
//! column 0).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u32,
    pub file: String,
    pub sources: Vec<String>,
    pub sources_content: Vec<String>,
    pub names: Vec<String>,
    pub mappings: String,
}

pub struct SourceMapBuilder {
    source_file: String,
    source_content: String,
    generated_lines: usize,
}

impl SourceMapBuilder {
    pub fn new(source_file: impl Into<String>, source_content: impl Into<String>) -> Self {
        SourceMapBuilder {
            source_file: source_file.into(),
            source_content: source_content.into(),
            generated_lines: 0,
        }
    }

    /// Account for emitted text; only line counts matter.
    pub fn advance(&mut self, text: &str) {
        self.generated_lines += text.bytes().filter(|b| *b == b'\n').count();
    }

    pub fn finish(self, generated_file: impl Into<String>) -> SourceMap {
        let lines = self.generated_lines.max(1);
        let mut mappings = String::from("AAAA");
        for _ in 1..lines {
            mappings.push_str(";AACA");
        }
        SourceMap {
            version: 3,
            file: generated_file.into(),
            sources: vec![self.source_file],
            sources_content: vec![self.source_content],
            names: Vec::new(),
            mappings,
        }
    }
}
