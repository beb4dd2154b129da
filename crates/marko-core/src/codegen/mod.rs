//! Code emission for translated programs.

mod emitter;
mod sourcemap;

pub use emitter::{emit_program, Emitter};
pub use sourcemap::{SourceMap, SourceMapBuilder};
