use reforge_syntax::{NodeKind, ParamKind, SyntaxKind, SyntaxNode};

use crate::context::ParseContext;
use crate::error::{Result, RewriteError};
use crate::registry::Parser;
use crate::symbol_tree::{ClassItem, ForwardDef, Node, SymbolTree};

/// Parses methods. The forward method is broken up into IR nodes: one Input
/// node per parameter after the receiver, then one dispatch per statement.
/// Every other method is kept verbatim.
#[derive(Debug, Default, Clone, Copy)]
pub struct FunctionParser;

impl Parser for FunctionParser {
    fn target(&self) -> NodeKind {
        NodeKind::FunctionDef
    }

    fn process(&self, cx: &mut ParseContext<'_>, tree: &mut SymbolTree<'_>, node: &SyntaxNode) -> Result<()> {
        let SyntaxKind::FunctionDef { name, params, returns, decorators, body } = &node.kind else {
            return Err(RewriteError::unexpected(self.target(), node));
        };
        if cx.in_forward() {
            cx.emit(tree, Node::python(node.clone()));
            return Ok(());
        }
        if *name != cx.config().forward_method {
            tree.push_class_item(ClassItem::Verbatim(node.clone()));
            return Ok(());
        }
        if tree.forward().is_some() {
            log::warn!("Forward method {} is defined twice; keeping the redefinition verbatim", name);
            tree.push_class_item(ClassItem::Verbatim(node.clone()));
            return Ok(());
        }

        let (receiver, params) = match params.split_first() {
            Some((first, rest)) if first.kind == ParamKind::Normal => (Some(first.clone()), rest),
            _ => (None, params.as_slice()),
        };
        tree.set_forward(ForwardDef {
            name: name.clone(),
            receiver,
            returns: returns.as_deref().cloned(),
            decorators: decorators.clone(),
        });
        tree.push_class_item(ClassItem::Forward);

        for param in params {
            cx.emit(tree, Node::input(param.clone()));
        }
        let outer = cx.set_in_forward(true);
        let result = body.iter().try_for_each(|stmt| cx.dispatch(tree, stmt));
        cx.set_in_forward(outer);
        result
    }
}
