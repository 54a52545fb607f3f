//! Python syntax frontend for the reforge network rewriter.
//!
//! Source text is parsed with tree-sitter and lowered into an owned
//! [`SyntaxNode`] tree: a reduced Python AST covering the constructs a
//! network definition is made of (classes, methods, assignments, calls,
//! control flow, imports). Anything else is preserved verbatim so that
//! [`unparse`] can always print the tree back out.

pub mod ast;
pub mod error;
pub mod location;
pub mod parser;
pub mod unparse;
pub mod visitor;

pub use ast::{Alias, Keyword, NodeKind, Param, ParamKind, SyntaxKind, SyntaxNode};
pub use error::SyntaxError;
pub use location::Position;
pub use parser::{parse_module, PythonParser};
pub use unparse::{unparse, unparse_block, unparse_expr};
pub use visitor::{walk_node, Visitor};
