use reforge_syntax::{NodeKind, SyntaxKind, SyntaxNode};

use crate::context::ParseContext;
use crate::error::{Result, RewriteError};
use crate::registry::Parser;
use crate::symbol_tree::{Node, SymbolTree};

/// Parses calls. `self.<attr>(...)` calls a sub-network and becomes a
/// CallCell node; any other call becomes a CallFunction node.
#[derive(Debug, Default, Clone, Copy)]
pub struct CallParser;

impl Parser for CallParser {
    fn target(&self) -> NodeKind {
        NodeKind::Call
    }

    fn process(&self, cx: &mut ParseContext<'_>, tree: &mut SymbolTree<'_>, node: &SyntaxNode) -> Result<()> {
        let SyntaxKind::Call { func, .. } = &node.kind else {
            return Err(RewriteError::unexpected(self.target(), node));
        };
        let statement = match cx.take_pending() {
            Some(pending) => {
                log::trace!("Call bound to {} target(s)", pending.targets.len());
                pending.statement
            }
            None => SyntaxNode::new(
                SyntaxKind::Expr { value: Box::new(node.clone()) },
                node.span,
                node.position,
            ),
        };
        cx.emit(tree, Node::call(statement, func));
        Ok(())
    }
}
