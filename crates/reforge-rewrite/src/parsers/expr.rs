use reforge_syntax::{NodeKind, SyntaxKind, SyntaxNode};

use crate::context::{ParseContext, PendingStatement};
use crate::error::{Result, RewriteError};
use crate::registry::Parser;
use crate::symbol_tree::{Node, SymbolTree};

/// Parses expression statements. A bare call is dispatched like the value
/// of an assignment without targets; anything else is kept as Python.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExprStatementParser;

impl Parser for ExprStatementParser {
    fn target(&self) -> NodeKind {
        NodeKind::Expr
    }

    fn process(&self, cx: &mut ParseContext<'_>, tree: &mut SymbolTree<'_>, node: &SyntaxNode) -> Result<()> {
        let SyntaxKind::Expr { value } = &node.kind else {
            return Err(RewriteError::unexpected(self.target(), node));
        };
        if value.node_kind() == NodeKind::Call {
            let pending = PendingStatement { targets: Vec::new(), statement: node.clone() };
            return cx.dispatch_value(tree, value, pending);
        }
        cx.emit(tree, Node::python(node.clone()));
        Ok(())
    }
}

/// Parses plain values (names, constants, arithmetic, tuples, verbatim
/// expressions) into a Python node for the statement they belong to.
///
/// Verbatim statements such as loops share the `Other` kind and are taken
/// as they are.
#[derive(Debug, Clone, Copy)]
pub struct ValueParser {
    kind: NodeKind,
}

impl ValueParser {
    pub fn new(kind: NodeKind) -> Self {
        Self { kind }
    }
}

impl Parser for ValueParser {
    fn target(&self) -> NodeKind {
        self.kind
    }

    fn process(&self, cx: &mut ParseContext<'_>, tree: &mut SymbolTree<'_>, node: &SyntaxNode) -> Result<()> {
        if node.node_kind() != self.kind {
            return Err(RewriteError::unexpected(self.kind, node));
        }
        let statement = match cx.take_pending() {
            Some(pending) => pending.statement,
            None if self.kind == NodeKind::Other => node.clone(),
            None => SyntaxNode::new(
                SyntaxKind::Expr { value: Box::new(node.clone()) },
                node.span,
                node.position,
            ),
        };
        cx.emit(tree, Node::python(statement));
        Ok(())
    }
}

/// Keeps statements such as `x += y`, `pass` and local imports as Python
/// nodes that regenerate unchanged.
#[derive(Debug, Clone, Copy)]
pub struct VerbatimParser {
    kind: NodeKind,
}

impl VerbatimParser {
    pub fn new(kind: NodeKind) -> Self {
        Self { kind }
    }
}

impl Parser for VerbatimParser {
    fn target(&self) -> NodeKind {
        self.kind
    }

    fn process(&self, cx: &mut ParseContext<'_>, tree: &mut SymbolTree<'_>, node: &SyntaxNode) -> Result<()> {
        if node.node_kind() != self.kind {
            return Err(RewriteError::unexpected(self.kind, node));
        }
        cx.emit(tree, Node::python(node.clone()));
        Ok(())
    }
}
