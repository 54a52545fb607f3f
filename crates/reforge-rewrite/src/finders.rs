//! Stateless searches over a syntax tree.
//!
//! Both finders walk the tree with an explicit stack, so arbitrarily deep
//! input cannot overflow the call stack.

use reforge_syntax::SyntaxNode;

/// Finds class definitions.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClassFinder;

impl ClassFinder {
    /// All class definitions under `root` in pre-order. A class that has been
    /// found is not searched further, so classes nested in a class body are
    /// not reported. Classes nested in functions or `if` blocks are.
    pub fn find_all<'a>(&self, root: &'a SyntaxNode) -> Vec<&'a SyntaxNode> {
        let mut found = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.is_class_def() {
                found.push(node);
                continue;
            }
            stack.extend(node.children().into_iter().rev());
        }
        found
    }
}

/// Collects import statements.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImportCollector;

impl ImportCollector {
    /// Deep copies of every `import` and `from ... import` statement under
    /// `root`, in traversal order.
    pub fn collect(&self, root: &SyntaxNode) -> Vec<SyntaxNode> {
        let mut imports = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.is_import() {
                imports.push(node.clone());
                continue;
            }
            stack.extend(node.children().into_iter().rev());
        }
        imports
    }
}
