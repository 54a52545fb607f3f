use std::fmt::Write;
use std::path::Path;

use reforge_rewrite::{Node, SymbolTree};
use reforge_syntax::unparse;

use super::with_symbol_tree;
use crate::error::CliError;

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShowFormat {
    /// Display the IR nodes of the forward method
    Nodes,
    /// Display the imports of the rewritten module
    Imports,
    /// Display the module with the injected imports
    Module,
}

pub fn handle_show(
    file: &Path,
    class: Option<String>,
    config: Option<&Path>,
    format: ShowFormat,
) -> Result<(), CliError> {
    with_symbol_tree(file, class, config, |tree| {
        print!("{}", render(tree, format));
        Ok(())
    })
}

pub fn render(tree: &SymbolTree<'_>, format: ShowFormat) -> String {
    match format {
        ShowFormat::Nodes => {
            let mut out = String::new();
            for node in tree.nodes() {
                render_node(&mut out, node, 0);
            }
            out
        }
        ShowFormat::Imports => tree.imports().iter().map(unparse).collect(),
        ShowFormat::Module => tree.module_ast().map(unparse).unwrap_or_default(),
    }
}

fn render_node(out: &mut String, node: &Node, depth: usize) {
    let _ = writeln!(
        out,
        "{:indent$}{:<16} {:<13} [{}] <- [{}]",
        "",
        node.name(),
        format!("{:?}", node.node_type()),
        node.targets().join(", "),
        node.inputs().join(", "),
        indent = depth * 2
    );
    if let Some(branches) = node.branches() {
        for (label, arm) in [("body", &branches.body), ("orelse", &branches.orelse)] {
            if arm.is_empty() {
                continue;
            }
            let _ = writeln!(out, "{:indent$}{}:", "", label, indent = depth * 2 + 2);
            for nested in arm {
                render_node(out, nested, depth + 2);
            }
        }
    }
}
