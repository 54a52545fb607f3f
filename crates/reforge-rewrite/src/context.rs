use reforge_syntax::SyntaxNode;

use crate::config::RewriteConfig;
use crate::error::{Result, RewriteError};
use crate::registry::ParserRegistry;
use crate::symbol_tree::{Node, SymbolTree};

/// The statement a value is being parsed for.
///
/// Set by statement parsers (assignments, expression statements) before they
/// dispatch the value, and consumed by the value's parser to build the node.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingStatement {
    /// Assignment targets; empty for an expression statement
    pub targets: Vec<SyntaxNode>,
    pub statement: SyntaxNode,
}

/// State threaded through one parse: the registry, the configuration, the
/// dispatch depth and the node sinks of open control-flow branches.
pub struct ParseContext<'r> {
    registry: &'r ParserRegistry,
    config: &'r RewriteConfig,
    depth: usize,
    pending: Option<PendingStatement>,
    branches: Vec<Vec<Node>>,
    in_forward: bool,
}

impl<'r> ParseContext<'r> {
    pub fn new(registry: &'r ParserRegistry, config: &'r RewriteConfig) -> Self {
        Self {
            registry,
            config,
            depth: 0,
            pending: None,
            branches: Vec::new(),
            in_forward: false,
        }
    }

    pub fn config(&self) -> &'r RewriteConfig {
        self.config
    }

    pub fn registry(&self) -> &'r ParserRegistry {
        self.registry
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether the statements being parsed belong to the forward method.
    pub fn in_forward(&self) -> bool {
        self.in_forward
    }

    /// Sets the forward-method flag, returning its previous value.
    pub fn set_in_forward(&mut self, in_forward: bool) -> bool {
        std::mem::replace(&mut self.in_forward, in_forward)
    }

    /// Hands `node` to the parser registered for its kind.
    pub fn dispatch(&mut self, tree: &mut SymbolTree<'_>, node: &SyntaxNode) -> Result<()> {
        let limit = self.config.max_depth;
        if self.depth >= limit {
            return Err(RewriteError::TraversalDepthExceeded { limit });
        }
        let kind = node.node_kind();
        let registry = self.registry;
        let parser = registry.get_parser(kind).map_err(|_| RewriteError::UnregisteredKind {
            kind,
            position: (!node.position.is_synthesized()).then_some(node.position),
            span: (!node.position.is_synthesized()).then_some(node.span),
        })?;

        log::trace!("Dispatching {} at depth {}", kind, self.depth);
        self.depth += 1;
        let result = parser.process(self, tree, node);
        self.depth -= 1;
        result
    }

    /// Dispatches `value` with `pending` as the statement it belongs to.
    pub fn dispatch_value(
        &mut self,
        tree: &mut SymbolTree<'_>,
        value: &SyntaxNode,
        pending: PendingStatement,
    ) -> Result<()> {
        let previous = self.pending.replace(pending);
        let result = self.dispatch(tree, value);
        self.pending = previous;
        result
    }

    /// Takes the statement set by the enclosing statement parser, if any.
    pub fn take_pending(&mut self) -> Option<PendingStatement> {
        self.pending.take()
    }

    /// Places a finished node: into the innermost open branch, or at the end
    /// of the tree's body.
    pub fn emit(&mut self, tree: &mut SymbolTree<'_>, mut node: Node) {
        match self.branches.last_mut() {
            Some(branch) => {
                tree.adopt(&mut node);
                log::debug!("Parsed branch node {}", node.name());
                branch.push(node);
            }
            None => {
                let id = tree.append_node(node);
                log::debug!("Parsed node {}", id);
            }
        }
    }

    /// Dispatches `stmts` and returns the nodes they produced instead of
    /// adding them to the tree's body.
    pub fn collect_branch(&mut self, tree: &mut SymbolTree<'_>, stmts: &[SyntaxNode]) -> Result<Vec<Node>> {
        self.branches.push(Vec::new());
        let mut result = Ok(());
        for stmt in stmts {
            result = self.dispatch(tree, stmt);
            if result.is_err() {
                break;
            }
        }
        let nodes = self.branches.pop().unwrap_or_default();
        result.map(|()| nodes)
    }
}
