use reforge_syntax::{unparse, SyntaxKind, SyntaxNode};

use super::{ClassItem, NodeType, SymbolTree};
use crate::error::{Result, RewriteError};

impl SymbolTree<'_> {
    /// Builds a fresh module from the tree: the imports, then the class with
    /// its items in declaration order. The forward method is re-assembled
    /// from the Input nodes (its parameters) and the remaining body nodes
    /// (its statements).
    pub fn regenerate_module(&self) -> Result<SyntaxNode> {
        let class = self.class_ast.as_ref().ok_or_else(|| RewriteError::NoClassFound {
            network: self.origin.class_name().to_string(),
        })?;
        let SyntaxKind::ClassDef { name, bases, keywords, decorators, .. } = &class.kind else {
            return Err(RewriteError::NoClassFound {
                network: self.origin.class_name().to_string(),
            });
        };

        let mut items = Vec::with_capacity(self.class_items.len());
        for item in &self.class_items {
            match item {
                ClassItem::Verbatim(stmt) => items.push(stmt.clone()),
                ClassItem::Forward => items.extend(self.regenerate_forward()),
            }
        }

        let class = SyntaxNode::new(
            SyntaxKind::ClassDef {
                name: name.clone(),
                bases: bases.clone(),
                keywords: keywords.clone(),
                decorators: decorators.clone(),
                body: items,
            },
            class.span,
            class.position,
        );
        let mut body = self.imports.clone();
        body.push(class);
        Ok(SyntaxNode::synthesized(SyntaxKind::Module { body }))
    }

    fn regenerate_forward(&self) -> Option<SyntaxNode> {
        let forward = self.forward.as_ref()?;
        let mut params: Vec<_> = forward.receiver.iter().cloned().collect();
        let mut body = Vec::new();
        for node in self.nodes() {
            match (node.node_type(), node.param()) {
                (NodeType::Input, Some(param)) => params.push(param.clone()),
                _ => body.extend(node.to_statements()),
            }
        }
        Some(SyntaxNode::synthesized(SyntaxKind::FunctionDef {
            name: forward.name.clone(),
            params,
            returns: forward.returns.clone().map(Box::new),
            decorators: forward.decorators.clone(),
            body,
        }))
    }

    /// Source text of [`regenerate_module`](Self::regenerate_module).
    pub fn regenerate(&self) -> Result<String> {
        self.regenerate_module().map(|module| unparse(&module))
    }
}
