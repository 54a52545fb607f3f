use std::path::PathBuf;

use miette::Diagnostic;
use reforge_rewrite::{ConfigError, RewriteError};
use thiserror::Error;

/// CLI-specific error type that provides rich diagnostics
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("I/O error while {operation} for path '{path}'")]
    #[diagnostic(code(reforge::cli::io_error))]
    IoError {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not pick a network class in {path}: {reason}")]
    #[diagnostic(
        code(reforge::cli::class_selection),
        help("pass the class to rewrite with --class")
    )]
    ClassSelection { path: PathBuf, reason: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Rewrite(#[from] RewriteError),
}
