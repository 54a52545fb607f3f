//! Lowering of the tree-sitter concrete syntax tree into [`SyntaxNode`]s.
//!
//! Statement lowering lives in [`stmt`], expression lowering in [`expr`].
//! Constructs without a dedicated [`SyntaxKind`] are kept verbatim as
//! [`SyntaxKind::Other`], so no source is lost on the way through.

pub mod common;
mod expr;
mod stmt;

use tree_sitter::{Node, Parser, Tree};

use crate::ast::{SyntaxKind, SyntaxNode};
use crate::error::SyntaxError;
use common::{create_span, named_children, node_text};

/// Result type for parser operations
pub type ParseResult<T> = Result<T, SyntaxError>;

/// Default bound on syntax nesting accepted by the lowering pass.
pub const DEFAULT_MAX_DEPTH: usize = 200;

/// Python parser producing owned syntax trees
pub struct PythonParser {
    parser: Parser,
    max_depth: usize,
}

impl PythonParser {
    /// Create a new Python parser
    pub fn new() -> Result<Self, SyntaxError> {
        let mut parser = Parser::new();
        let language = tree_sitter_python::LANGUAGE;
        parser
            .set_language(&language.into())
            .map_err(|e| SyntaxError::ParserInitError(e.to_string()))?;
        Ok(Self { parser, max_depth: DEFAULT_MAX_DEPTH })
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse Python source code and return the concrete syntax tree
    pub fn parse(&mut self, source: &str) -> Result<Tree, SyntaxError> {
        self.parser.parse(source, None).ok_or_else(|| SyntaxError::ParseError {
            message: "Failed to parse source code".to_string(),
            span: None,
        })
    }

    /// Parse source into a `Module` node, collecting every error encountered.
    ///
    /// Statements that fail to lower are left out of the module; the returned
    /// errors describe them.
    pub fn parse_ast(&mut self, source: &str) -> (SyntaxNode, Vec<SyntaxError>) {
        match self.parse(source) {
            Ok(tree) => {
                let root = tree.root_node();
                let mut errors = Vec::new();
                common::collect_ts_errors(&root, source, &mut errors);

                let mut lowerer = Lowerer::new(source, self.max_depth);
                let (module, mut lower_errors) = lowerer.lower_module(&root);
                errors.append(&mut lower_errors);
                if !errors.is_empty() {
                    log::debug!("Parsed {} bytes with {} syntax errors", source.len(), errors.len());
                }
                (module, errors)
            }
            Err(e) => (
                SyntaxNode::synthesized(SyntaxKind::Module { body: Vec::new() }),
                vec![e],
            ),
        }
    }

    /// Parse source into a `Module` node, failing on the first error.
    pub fn parse_module(&mut self, source: &str) -> Result<SyntaxNode, SyntaxError> {
        let (module, errors) = self.parse_ast(source);
        match errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(module),
        }
    }
}

/// Parse a complete module with a fresh parser.
pub fn parse_module(source: &str) -> Result<SyntaxNode, SyntaxError> {
    PythonParser::new()?.parse_module(source)
}

pub(crate) struct Lowerer<'s> {
    source: &'s str,
    depth: usize,
    max_depth: usize,
}

impl<'s> Lowerer<'s> {
    pub(crate) fn new(source: &'s str, max_depth: usize) -> Self {
        Self { source, depth: 0, max_depth }
    }

    fn lower_module(&mut self, root: &Node) -> (SyntaxNode, Vec<SyntaxError>) {
        let mut body = Vec::new();
        let mut errors = Vec::new();
        for child in named_children(root) {
            if child.is_error() {
                continue;
            }
            match self.lower_statement(&child) {
                Ok(stmt) => body.push(stmt),
                Err(e) => errors.push(e),
            }
        }
        (self.make(SyntaxKind::Module { body }, root), errors)
    }

    /// Lowers the statements of a `block` node.
    fn lower_block(&mut self, block: &Node) -> ParseResult<Vec<SyntaxNode>> {
        named_children(block)
            .iter()
            .map(|stmt| self.lower_statement(stmt))
            .collect()
    }

    /// Runs `f` one nesting level deeper, failing once the limit is reached.
    fn nested<T>(&mut self, node: &Node, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= self.max_depth {
            return Err(SyntaxError::NestingTooDeep {
                limit: self.max_depth,
                span: Some(create_span(node)),
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn make(&self, kind: SyntaxKind, node: &Node) -> SyntaxNode {
        SyntaxNode::new(kind, create_span(node), node.start_position().into())
    }

    fn text(&self, node: &Node) -> ParseResult<String> {
        node_text(node, self.source)
    }

    /// Keeps a construct as its source text.
    fn verbatim(&self, node: &Node) -> ParseResult<SyntaxNode> {
        let kind = SyntaxKind::Other {
            kind: node.kind().to_string(),
            text: self.text(node)?,
        };
        Ok(self.make(kind, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nesting_limit_is_reported() {
        let mut parser = PythonParser::new().unwrap().with_max_depth(8);
        let source = format!("x = {}1{}\n", "(".repeat(20), ")".repeat(20));
        let (_, errors) = parser.parse_ast(&source);
        assert!(matches!(errors.as_slice(), [SyntaxError::NestingTooDeep { limit: 8, .. }]));
    }

    #[test]
    fn tree_sitter_errors_are_collected() {
        let mut parser = PythonParser::new().unwrap();
        let (_, errors) = parser.parse_ast("def broken(:\n    pass\n");
        assert!(!errors.is_empty());
        assert!(parser.parse_module("class Ok:\n    pass\n").is_ok());
    }
}
