use reforge_syntax::{NodeKind, SyntaxNode};
use rustc_hash::FxHashMap;

use crate::context::ParseContext;
use crate::error::{Result, RewriteError};
use crate::parsers;
use crate::symbol_tree::SymbolTree;

/// Turns one kind of syntax node into symbol-tree state.
pub trait Parser {
    /// The node kind this parser handles.
    fn target(&self) -> NodeKind;

    /// Processes `node`, which has kind [`target`](Parser::target). Nested
    /// nodes are handed back to the registry through
    /// [`ParseContext::dispatch`].
    fn process(
        &self,
        cx: &mut ParseContext<'_>,
        tree: &mut SymbolTree<'_>,
        node: &SyntaxNode,
    ) -> Result<()>;
}

/// Parsers keyed by the node kind they handle, at most one per kind.
#[derive(Default)]
pub struct ParserRegistry {
    parsers: FxHashMap<NodeKind, Box<dyn Parser>>,
}

impl ParserRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in parser.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        parsers::register_defaults(&mut registry);
        registry
    }

    /// Registers `parser` for the kind it declares, replacing any parser
    /// registered for that kind before.
    pub fn register(&mut self, parser: impl Parser + 'static) {
        let kind = parser.target();
        if self.parsers.insert(kind, Box::new(parser)).is_some() {
            log::debug!("Replaced parser for {} nodes", kind);
        }
    }

    pub fn get_parser(&self, kind: NodeKind) -> Result<&dyn Parser> {
        self.parsers
            .get(&kind)
            .map(|parser| parser.as_ref())
            .ok_or(RewriteError::UnregisteredKind {
                kind,
                position: None,
                span: None,
            })
    }

    pub fn contains(&self, kind: NodeKind) -> bool {
        self.parsers.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.parsers.keys().collect();
        kinds.sort();
        f.debug_struct("ParserRegistry").field("kinds", &kinds).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::config::RewriteConfig;
    use crate::network::NetworkDef;

    struct Marker {
        kind: NodeKind,
        hits: Rc<Cell<usize>>,
    }

    impl Parser for Marker {
        fn target(&self) -> NodeKind {
            self.kind
        }

        fn process(&self, _: &mut ParseContext<'_>, _: &mut SymbolTree<'_>, _: &SyntaxNode) -> Result<()> {
            self.hits.set(self.hits.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn empty_registry_reports_unregistered_kinds() {
        let registry = ParserRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.get_parser(NodeKind::ClassDef),
            Err(RewriteError::UnregisteredKind { kind: NodeKind::ClassDef, .. })
        ));
    }

    #[test]
    fn defaults_cover_the_forward_method_constructs() {
        let registry = ParserRegistry::with_defaults();
        for kind in [
            NodeKind::Module,
            NodeKind::ClassDef,
            NodeKind::FunctionDef,
            NodeKind::Assign,
            NodeKind::Call,
            NodeKind::Return,
            NodeKind::If,
            NodeKind::Expr,
            NodeKind::Other,
        ] {
            assert!(registry.contains(kind), "missing parser for {}", kind);
        }
        assert!(!registry.contains(NodeKind::Lambda));
    }

    #[test]
    fn last_registration_wins() {
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        let mut registry = ParserRegistry::new();
        registry.register(Marker { kind: NodeKind::Pass, hits: first.clone() });
        registry.register(Marker { kind: NodeKind::Pass, hits: second.clone() });
        assert_eq!(registry.len(), 1);

        let net = NetworkDef::without_source("Net");
        let mut tree = SymbolTree::new(&net);
        let config = RewriteConfig::default();
        let mut cx = ParseContext::new(&registry, &config);
        let pass = SyntaxNode::synthesized(reforge_syntax::SyntaxKind::Pass);
        cx.dispatch(&mut tree, &pass).unwrap();
        assert_eq!((first.get(), second.get()), (0, 1));
    }
}
