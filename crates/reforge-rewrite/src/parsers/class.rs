use reforge_syntax::{unparse_expr, NodeKind, SyntaxKind, SyntaxNode};

use crate::context::ParseContext;
use crate::error::{Result, RewriteError};
use crate::registry::Parser;
use crate::symbol_tree::{ClassItem, Node, SymbolTree};

/// Parses the network class: methods go through the registry, anything else
/// in the class body is kept as it is.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClassParser;

impl Parser for ClassParser {
    fn target(&self) -> NodeKind {
        NodeKind::ClassDef
    }

    fn process(&self, cx: &mut ParseContext<'_>, tree: &mut SymbolTree<'_>, node: &SyntaxNode) -> Result<()> {
        let SyntaxKind::ClassDef { name, bases, body, .. } = &node.kind else {
            return Err(RewriteError::unexpected(self.target(), node));
        };
        if cx.in_forward() {
            // A class defined inside the forward method is an ordinary statement.
            cx.emit(tree, Node::python(node.clone()));
            return Ok(());
        }

        let bases: Vec<String> = bases.iter().map(unparse_expr).collect();
        log::debug!("Parsing class {}({})", name, bases.join(", "));
        for stmt in body {
            if stmt.node_kind() == NodeKind::FunctionDef {
                cx.dispatch(tree, stmt)?;
            } else {
                tree.push_class_item(ClassItem::Verbatim(stmt.clone()));
            }
        }
        Ok(())
    }
}
