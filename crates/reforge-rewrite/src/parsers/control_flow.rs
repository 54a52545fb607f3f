use reforge_syntax::{NodeKind, SyntaxKind, SyntaxNode};

use crate::context::ParseContext;
use crate::error::{Result, RewriteError};
use crate::registry::Parser;
use crate::symbol_tree::{Branches, Node, SymbolTree};

/// Parses `if` statements into a ControlFlow node owning the nodes of both
/// branches. `elif` arrives as an `if` nested in `orelse`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ControlFlowParser;

impl Parser for ControlFlowParser {
    fn target(&self) -> NodeKind {
        NodeKind::If
    }

    fn process(&self, cx: &mut ParseContext<'_>, tree: &mut SymbolTree<'_>, node: &SyntaxNode) -> Result<()> {
        let SyntaxKind::If { body, orelse, .. } = &node.kind else {
            return Err(RewriteError::unexpected(self.target(), node));
        };
        let branches = Branches {
            body: cx.collect_branch(tree, body)?,
            orelse: cx.collect_branch(tree, orelse)?,
        };
        cx.emit(tree, Node::control_flow(node.clone(), branches));
        Ok(())
    }
}
