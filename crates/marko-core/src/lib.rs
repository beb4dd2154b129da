//! Template-to-program compiler for `.marko` templates.
//!
//! The compiler parses markup into an AST, runs a pipeline of migration and
//! transformation passes contributed by taglibs, translates the tree into an
//! emittable program with an output-format-specific translator, and returns
//! generated code plus per-template metadata (component id, macros,
//! dependencies, referenced tags, watch files). Intermediate post-transform
//! trees are cached per `(component id, translator)` so unchanged templates
//! skip parse/migrate/transform entirely on rebuilds.

pub mod ast;
pub mod cache;
pub mod codegen;
pub mod compile;
pub mod config;
pub mod defaults;
pub mod error;
pub mod fs;
pub mod meta;
pub mod parse;
pub mod pipeline;
pub mod scope;
pub mod taglib;
pub mod translate;

pub use compile::{
    compile, compile_async, compile_file, compile_file_async, CompileResult,
};
pub use config::{CompileConfig, ModuleFormat};
pub use error::{CompileError, Result};
pub use meta::{Dep, MacroDef, Metadata};
pub use translate::Translator;
