//! Public compile entry points.
//!
//! The pipeline itself is synchronous per unit; the async entry points are
//! thin wrappers that perform the file read off the current task before
//! delegating. Hosts may issue independent compile calls concurrently — the
//! cache store and translator identity table are shared, nothing else is.

use std::io;
use std::path::Path;

use crate::ast::Ast;
use crate::codegen::{emit_program, Emitter, SourceMap};
use crate::config::CompileConfig;
use crate::defaults;
use crate::error::{CompileError, Result};
use crate::meta::Metadata;
use crate::pipeline;

#[derive(Debug, Clone)]
pub struct CompileResult {
    pub code: String,
    pub map: Option<SourceMap>,
    pub meta: Metadata,
}

/// Compile template source text.
pub fn compile(source: &str, filename: impl AsRef<Path>, config: &CompileConfig) -> Result<CompileResult> {
    let filename = filename.as_ref();
    let mut ast = pipeline::run(source, filename, config)?;
    defaults::schedule_default_clear(config);
    Ok(build_result(&mut ast, source, filename, config))
}

/// Async counterpart of [`compile`].
pub async fn compile_async(
    source: &str,
    filename: impl AsRef<Path>,
    config: &CompileConfig,
) -> Result<CompileResult> {
    compile(source, filename, config)
}

/// Compile a template read through the configured filesystem abstraction.
pub fn compile_file(filename: impl AsRef<Path>, config: &CompileConfig) -> Result<CompileResult> {
    let filename = filename.as_ref();
    ensure_translator(config)?;
    let source = config.file_system.read_to_string(filename)?;
    compile(&source, filename, config)
}

/// Async counterpart of [`compile_file`]. The read happens on a blocking
/// task; read failures propagate to the caller.
pub async fn compile_file_async(
    filename: impl AsRef<Path>,
    config: &CompileConfig,
) -> Result<CompileResult> {
    let filename = filename.as_ref();
    ensure_translator(config)?;
    let fs = config.file_system.clone();
    let path = filename.to_path_buf();
    let source = tokio::task::spawn_blocking(move || fs.read_to_string(&path))
        .await
        .map_err(|e| CompileError::Io(io::Error::other(e)))??;
    compile(&source, filename, config)
}

/// The translator is validated before any file is touched.
fn ensure_translator(config: &CompileConfig) -> Result<()> {
    if config.translator.is_none() {
        return Err(CompileError::MissingTranslator);
    }
    Ok(())
}

fn build_result(
    ast: &mut Ast,
    source: &str,
    filename: &Path,
    config: &CompileConfig,
) -> CompileResult {
    // Unpack the side-channel metadata into its standard location, the way
    // the host pipeline's pre-stage would.
    let meta = ast.take_attached_meta().unwrap_or_default();

    if config.parse_only || config.migrate_only {
        return CompileResult {
            code: String::new(),
            map: None,
            meta,
        };
    }

    let generated_file = generated_filename(filename);
    let emitter = if config.source_maps {
        Emitter::new().with_source_map(
            filename.to_string_lossy().into_owned(),
            source.to_string(),
        )
    } else {
        Emitter::new()
    };
    let (code, map) = emit_program(&ast.program, emitter, &generated_file);
    CompileResult { code, map, meta }
}

fn generated_filename(filename: &Path) -> String {
    let mut name = filename.to_path_buf();
    name.set_extension("js");
    name.to_string_lossy().into_owned()
}
