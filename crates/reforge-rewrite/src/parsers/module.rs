use reforge_syntax::{unparse, NodeKind, SyntaxNode};

use crate::context::ParseContext;
use crate::error::{Result, RewriteError};
use crate::finders::{ClassFinder, ImportCollector};
use crate::network::{load_source_module, Network};
use crate::registry::Parser;
use crate::symbol_tree::SymbolTree;

/// Entry point of a parse: turns a module holding one network class into a
/// populated symbol tree.
///
/// The module is augmented with the canonical framework imports and every
/// import of the origin network's source file, then its single class is
/// dispatched. Other top-level statements are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModuleParser;

impl ModuleParser {
    /// Prepends the canonical imports and the imports recovered from the
    /// origin file to `module`. Returns the inserted statements.
    fn inject_imports(
        &self,
        cx: &ParseContext<'_>,
        module: &mut SyntaxNode,
        network: &dyn Network,
    ) -> Result<Vec<SyntaxNode>> {
        let origin = load_source_module(network, cx.config().max_depth)?;

        let mut imports = Vec::from(cx.config().canonical_imports());
        imports.extend(ImportCollector.collect(&origin));
        if let Some(body) = module.body_mut() {
            body.splice(0..0, imports.iter().cloned());
        }
        Ok(imports)
    }
}

impl Parser for ModuleParser {
    fn target(&self) -> NodeKind {
        NodeKind::Module
    }

    fn process(&self, cx: &mut ParseContext<'_>, tree: &mut SymbolTree<'_>, node: &SyntaxNode) -> Result<()> {
        if node.node_kind() != NodeKind::Module {
            return Err(RewriteError::unexpected(self.target(), node));
        }
        let network = tree.origin_network();
        let mut module = node.clone();
        let imports = self.inject_imports(cx, &mut module, network)?;
        log::debug!("Prepended {} imports to module of {}", imports.len(), network.class_name());
        tree.set_imports(imports);
        tree.set_module_ast(module.clone());

        let classes = ClassFinder.find_all(&module);
        match classes.as_slice() {
            [] => {
                return Err(RewriteError::NoClassFound {
                    network: network.class_name().to_string(),
                })
            }
            [class] => tree.set_class_ast((*class).clone()),
            many => {
                return Err(RewriteError::MultiClassUnsupported {
                    classes: many.iter().filter_map(|c| c.def_name()).map(str::to_string).collect(),
                })
            }
        }

        for stmt in module.body().unwrap_or_default() {
            if stmt.is_class_def() {
                cx.dispatch(tree, stmt)?;
            } else {
                log::info!(
                    "Ignoring unsupported node ({}) in module: {}",
                    stmt.node_kind(),
                    unparse(stmt).trim_end()
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use reforge_syntax::parse_module;

    use super::*;
    use crate::config::RewriteConfig;
    use crate::network::NetworkDef;
    use crate::registry::ParserRegistry;

    fn origin_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".py").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn imports_are_injected_before_the_class() {
        let file = origin_file("import numpy as np\nfrom mindspore import ops\n\nclass Net(nn.Cell):\n    pass\n");
        let net = NetworkDef::new("Net", file.path());
        let module = parse_module("class Net(nn.Cell):\n    pass\n").unwrap();

        let registry = ParserRegistry::with_defaults();
        let config = RewriteConfig::default();
        let mut cx = ParseContext::new(&registry, &config);
        let mut tree = SymbolTree::new(&net);
        ModuleParser.process(&mut cx, &mut tree, &module).unwrap();

        let body = tree.module_ast().and_then(SyntaxNode::body).unwrap();
        let heads: Vec<String> = body.iter().map(|s| unparse(s).lines().next().unwrap_or("").to_string()).collect();
        assert_eq!(
            heads,
            [
                "import mindspore",
                "from mindspore import nn",
                "from mindspore.nn import Cell",
                "import numpy as np",
                "from mindspore import ops",
                "class Net(nn.Cell):",
            ]
        );
        assert_eq!(tree.imports().len(), 5);
        // The caller's module is left untouched.
        assert_eq!(module.body().map(<[SyntaxNode]>::len), Some(1));
    }

    #[test]
    fn missing_source_path_fails_before_dispatch() {
        let net = NetworkDef::without_source("Net");
        let module = parse_module("class Net:\n    pass\n").unwrap();
        let registry = ParserRegistry::with_defaults();
        let config = RewriteConfig::default();
        let mut cx = ParseContext::new(&registry, &config);
        let mut tree = SymbolTree::new(&net);
        let err = ModuleParser.process(&mut cx, &mut tree, &module).unwrap_err();
        assert!(matches!(err, RewriteError::SourceFileNotFound { .. }));
        assert!(tree.class_ast().is_none());
    }
}
