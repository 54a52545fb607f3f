use std::path::PathBuf;

use miette::{Diagnostic, SourceSpan};
use reforge_syntax::{NodeKind, Position, SyntaxError};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while turning a network definition into a symbol tree or
/// while editing one.
///
/// Any error from [`crate::Rewriter::parse_network`] means the network cannot
/// be rewritten; callers fall back to using it unmodified.
#[derive(Debug, Error, Diagnostic)]
pub enum RewriteError {
    #[error("Source file of network `{network}` not found: {path}")]
    #[diagnostic(
        code("REWRITE-001"),
        help("the network's class must be defined in a readable source file")
    )]
    SourceFileNotFound { network: String, path: String },

    #[error("Failed to read {}", path.display())]
    #[diagnostic(code("REWRITE-002"))]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}")]
    #[diagnostic(code("REWRITE-003"))]
    Syntax {
        path: String,
        #[source]
        #[diagnostic_source]
        source: SyntaxError,
    },

    #[error("No class in module of network `{network}`")]
    #[diagnostic(code("REWRITE-004"))]
    NoClassFound { network: String },

    #[error("Multi-class in module is not supported: found {}", classes.join(", "))]
    #[diagnostic(
        code("REWRITE-005"),
        help("a rewritten module must define exactly one network class")
    )]
    MultiClassUnsupported { classes: Vec<String> },

    #[error("Class `{class}` not found in {path}")]
    #[diagnostic(code("REWRITE-006"))]
    ClassNotFound { class: String, path: String },

    #[error("No parser registered for {kind} nodes{}", position.map(|p| format!(" (at {})", p)).unwrap_or_default())]
    #[diagnostic(
        code("REWRITE-007"),
        help("register a parser for this node kind or rewrite the statement")
    )]
    UnregisteredKind {
        kind: NodeKind,
        position: Option<Position>,
        #[label("unsupported construct")]
        span: Option<SourceSpan>,
    },

    #[error("{parser} parser cannot process {found} nodes")]
    #[diagnostic(code("REWRITE-008"), help("the parser is registered under the wrong node kind"))]
    UnexpectedNode { parser: NodeKind, found: NodeKind },

    #[error("Traversal depth exceeded the limit of {limit}")]
    #[diagnostic(code("REWRITE-009"))]
    TraversalDepthExceeded { limit: usize },

    #[error("Node `{0}` not found in symbol tree")]
    #[diagnostic(code("REWRITE-010"))]
    NodeNotFound(String),

    #[error("Node `{node}` is still used by `{user}`")]
    #[diagnostic(
        code("REWRITE-011"),
        help("erase or rewire the users before erasing the node")
    )]
    NodeInUse { node: String, user: String },

    #[error("Cyclic dependency between nodes: {}", nodes.join(", "))]
    #[diagnostic(code("REWRITE-012"))]
    CyclicDependency { nodes: Vec<String> },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

impl RewriteError {
    pub(crate) fn unexpected(parser: NodeKind, node: &reforge_syntax::SyntaxNode) -> Self {
        RewriteError::UnexpectedNode { parser, found: node.node_kind() }
    }

    pub(crate) fn syntax(path: impl Into<String>, source: SyntaxError) -> Self {
        RewriteError::Syntax { path: path.into(), source }
    }
}

pub type Result<T, E = RewriteError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_and_dispatch_codes_are_sequential() {
        let errors = [
            RewriteError::UnexpectedNode { parser: NodeKind::Call, found: NodeKind::Name },
            RewriteError::TraversalDepthExceeded { limit: 1 },
            RewriteError::NodeNotFound("x".to_string()),
            RewriteError::NodeInUse { node: "x".to_string(), user: "y".to_string() },
            RewriteError::CyclicDependency { nodes: Vec::new() },
        ];
        let codes: Vec<String> = errors
            .iter()
            .map(|err| err.code().map(|code| code.to_string()).unwrap_or_default())
            .collect();
        assert_eq!(codes, ["REWRITE-008", "REWRITE-009", "REWRITE-010", "REWRITE-011", "REWRITE-012"]);
    }
}
