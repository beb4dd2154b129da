use std::path::PathBuf;

use thiserror::Error;

use crate::ast::Pos;

pub type Result<T> = std::result::Result<T, CompileError>;

/// Errors produced while compiling a single template.
///
/// `MissingTranslator` is a configuration error and is raised before any
/// file is touched. A `Syntax` error aborts the current unit with no cache
/// write. Plugin failures propagate uncaught — the pipeline performs no
/// isolation between passes, so the caller must discard the unit's AST.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("translator must provide a visitor")]
    MissingTranslator,

    #[error("syntax error at {pos}: {message}")]
    Syntax { message: String, pos: Pos },

    #[error("plugin module not registered: {}", path.display())]
    PluginNotRegistered { path: PathBuf },

    #[error("plugin {} failed: {message}", path.display())]
    Plugin { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub(crate) fn syntax(message: impl Into<String>, pos: Pos) -> Self {
        CompileError::Syntax {
            message: message.into(),
            pos,
        }
    }
}
