use reforge_syntax::{NodeKind, SyntaxKind, SyntaxNode};

use crate::context::{ParseContext, PendingStatement};
use crate::error::{Result, RewriteError};
use crate::registry::Parser;
use crate::symbol_tree::SymbolTree;

/// Parses `targets = value` by dispatching the value with the assignment
/// pending on the context. The value's parser builds the node.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssignParser;

impl Parser for AssignParser {
    fn target(&self) -> NodeKind {
        NodeKind::Assign
    }

    fn process(&self, cx: &mut ParseContext<'_>, tree: &mut SymbolTree<'_>, node: &SyntaxNode) -> Result<()> {
        let SyntaxKind::Assign { targets, value } = &node.kind else {
            return Err(RewriteError::unexpected(self.target(), node));
        };
        let pending = PendingStatement {
            targets: targets.clone(),
            statement: node.clone(),
        };
        cx.dispatch_value(tree, value, pending)
    }
}
