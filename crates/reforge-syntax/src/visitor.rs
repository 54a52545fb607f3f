use crate::ast::{SyntaxKind, SyntaxNode};

/// Trait for implementing the visitor pattern over the syntax tree.
///
/// Every hook defaults to walking the node's children, so an implementation
/// only overrides the node kinds it cares about.
pub trait Visitor: Sized {
    type Error;

    fn visit_node(&mut self, node: &SyntaxNode) -> Result<(), Self::Error> {
        match &node.kind {
            SyntaxKind::ClassDef { .. } => self.visit_class_def(node),
            SyntaxKind::FunctionDef { .. } => self.visit_function_def(node),
            SyntaxKind::Import { .. } | SyntaxKind::ImportFrom { .. } => self.visit_import(node),
            SyntaxKind::Name { id } => self.visit_name(node, id),
            SyntaxKind::Lambda { .. } => self.visit_lambda(node),
            SyntaxKind::Other { kind, text } => self.visit_other(node, kind, text),
            _ => walk_node(self, node),
        }
    }

    fn visit_class_def(&mut self, node: &SyntaxNode) -> Result<(), Self::Error> {
        walk_node(self, node)
    }

    fn visit_function_def(&mut self, node: &SyntaxNode) -> Result<(), Self::Error> {
        walk_node(self, node)
    }

    fn visit_import(&mut self, _node: &SyntaxNode) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_name(&mut self, _node: &SyntaxNode, _id: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_lambda(&mut self, node: &SyntaxNode) -> Result<(), Self::Error> {
        walk_node(self, node)
    }

    /// Verbatim constructs have no children; `text` is their source.
    fn visit_other(&mut self, _node: &SyntaxNode, _kind: &str, _text: &str) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Visits every child of `node` in source order.
pub fn walk_node<V: Visitor>(visitor: &mut V, node: &SyntaxNode) -> Result<(), V::Error> {
    for child in node.children() {
        visitor.visit_node(child)?;
    }
    Ok(())
}
