use std::path::{Path, PathBuf};

use reforge_syntax::{PythonParser, SyntaxNode};

use crate::error::{Result, RewriteError};

/// A live network whose class definition can be rewritten.
///
/// The rewriter never owns a network. It only asks for the class name and
/// the file the class was defined in, and keeps a borrowed reference on the
/// symbol tree built from it.
pub trait Network {
    /// Name of the network's class.
    fn class_name(&self) -> &str;

    /// File defining the network's class, if known.
    fn source_file(&self) -> Option<&Path>;
}

/// A network described only by its class name and defining file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkDef {
    class_name: String,
    source_file: Option<PathBuf>,
}

impl NetworkDef {
    pub fn new(class_name: impl Into<String>, source_file: impl Into<PathBuf>) -> Self {
        Self {
            class_name: class_name.into(),
            source_file: Some(source_file.into()),
        }
    }

    /// A network whose defining file cannot be located, e.g. one defined
    /// interactively.
    pub fn without_source(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            source_file: None,
        }
    }
}

impl Network for NetworkDef {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn source_file(&self) -> Option<&Path> {
        self.source_file.as_deref()
    }
}

/// Display form of a network's source path for error messages.
pub(crate) fn display_source(network: &dyn Network) -> String {
    network
        .source_file()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<unknown>".to_string())
}

/// Reads and parses the file defining `network`'s class.
pub(crate) fn load_source_module(network: &dyn Network, max_depth: usize) -> Result<SyntaxNode> {
    let not_found = || RewriteError::SourceFileNotFound {
        network: network.class_name().to_string(),
        path: display_source(network),
    };
    let path = network.source_file().ok_or_else(not_found)?;
    if !path.is_file() {
        return Err(not_found());
    }
    let source = std::fs::read_to_string(path).map_err(|source| RewriteError::SourceRead {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Read {} bytes from {}", source.len(), path.display());
    PythonParser::new()
        .and_then(|parser| parser.with_max_depth(max_depth).parse_module(&source))
        .map_err(|e| RewriteError::syntax(path.display().to_string(), e))
}
