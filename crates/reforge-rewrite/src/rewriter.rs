use reforge_syntax::{SyntaxKind, SyntaxNode};

use crate::config::RewriteConfig;
use crate::context::ParseContext;
use crate::error::{Result, RewriteError};
use crate::finders::ClassFinder;
use crate::network::{display_source, load_source_module, Network};
use crate::registry::ParserRegistry;
use crate::symbol_tree::SymbolTree;

/// Builds symbol trees from networks.
///
/// Custom parsers are registered through [`registry_mut`](Self::registry_mut)
/// before the first parse.
#[derive(Debug)]
pub struct Rewriter {
    registry: ParserRegistry,
    config: RewriteConfig,
}

impl Default for Rewriter {
    fn default() -> Self {
        Self::new(RewriteConfig::default())
    }
}

impl Rewriter {
    /// A rewriter with every built-in parser.
    pub fn new(config: RewriteConfig) -> Self {
        Self::with_registry(ParserRegistry::with_defaults(), config)
    }

    pub fn with_registry(registry: ParserRegistry, config: RewriteConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &RewriteConfig {
        &self.config
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ParserRegistry {
        &mut self.registry
    }

    /// Parses the class of `network` into a symbol tree.
    ///
    /// The class is taken out of its source file into a module of its own,
    /// which is then processed by the registry's module parser.
    pub fn parse_network<'net>(&self, network: &'net dyn Network) -> Result<SymbolTree<'net>> {
        let class_name = network.class_name();
        let source = load_source_module(network, self.config.max_depth)?;
        let class = ClassFinder
            .find_all(&source)
            .into_iter()
            .find(|class| class.def_name() == Some(class_name))
            .ok_or_else(|| RewriteError::ClassNotFound {
                class: class_name.to_string(),
                path: display_source(network),
            })?;

        let module = SyntaxNode::synthesized(SyntaxKind::Module { body: vec![class.clone()] });
        let mut tree = SymbolTree::new(network);
        self.parse_module(&mut tree, &module)?;
        log::info!("Parsed network {} into {} nodes", class_name, tree.len());
        Ok(tree)
    }

    /// Dispatches `module` into `tree` through the registry.
    pub fn parse_module(&self, tree: &mut SymbolTree<'_>, module: &SyntaxNode) -> Result<()> {
        let mut cx = ParseContext::new(&self.registry, &self.config);
        cx.dispatch(tree, module)
    }
}
