use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("Parser initialization error: {0}")]
    #[diagnostic(code(reforge_syntax::parser_init))]
    ParserInitError(String),

    #[error("Parse error: {message}")]
    #[diagnostic(code(reforge_syntax::parse_error))]
    ParseError {
        message: String,
        #[label("error occurred here")]
        span: Option<SourceSpan>,
    },

    #[error("Node error in {node_type}: {message}")]
    #[diagnostic(code(reforge_syntax::node_error))]
    NodeError {
        message: String,
        #[label("in this node")]
        span: Option<SourceSpan>,
        node_type: String,
    },

    #[error("Syntax error: {message}")]
    #[diagnostic(code(reforge_syntax::syntax_error))]
    SyntaxError {
        message: String,
        #[label("error occurred here")]
        span: Option<SourceSpan>,
        #[help]
        expected: Option<String>,
        found: Option<String>,
    },

    #[error("Nesting deeper than {limit} levels")]
    #[diagnostic(
        code(reforge_syntax::nesting_too_deep),
        help("split the deeply nested expression into intermediate assignments")
    )]
    NestingTooDeep {
        limit: usize,
        #[label("nesting limit exceeded here")]
        span: Option<SourceSpan>,
    },
}
