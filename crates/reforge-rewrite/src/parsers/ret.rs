use reforge_syntax::{NodeKind, SyntaxKind, SyntaxNode};

use crate::context::{ParseContext, PendingStatement};
use crate::error::{Result, RewriteError};
use crate::registry::Parser;
use crate::symbol_tree::{Node, SymbolTree};

/// Parses `return`. A returned call is split in two: the call, bound to a
/// fresh variable, and the Output node returning that variable.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReturnParser;

impl Parser for ReturnParser {
    fn target(&self) -> NodeKind {
        NodeKind::Return
    }

    fn process(&self, cx: &mut ParseContext<'_>, tree: &mut SymbolTree<'_>, node: &SyntaxNode) -> Result<()> {
        let SyntaxKind::Return { value } = &node.kind else {
            return Err(RewriteError::unexpected(self.target(), node));
        };
        let Some(call) = value.as_deref().filter(|v| v.node_kind() == NodeKind::Call) else {
            cx.emit(tree, Node::output(node.clone()));
            return Ok(());
        };

        let base = match &call.kind {
            SyntaxKind::Call { func, .. } => func
                .dotted_path()
                .and_then(|path| path.rsplit('.').next().map(|last| format!("{}_out", last)))
                .unwrap_or_else(|| "out".to_string()),
            _ => "out".to_string(),
        };
        let var = tree.fresh_variable(&base);
        let target = SyntaxNode::name(&var);
        let assign = SyntaxNode::new(
            SyntaxKind::Assign {
                targets: vec![target.clone()],
                value: Box::new(call.clone()),
            },
            node.span,
            node.position,
        );
        cx.dispatch_value(tree, call, PendingStatement { targets: vec![target.clone()], statement: assign })?;

        let output = SyntaxNode::new(
            SyntaxKind::Return { value: Some(Box::new(target)) },
            node.span,
            node.position,
        );
        cx.emit(tree, Node::output(output));
        Ok(())
    }
}
