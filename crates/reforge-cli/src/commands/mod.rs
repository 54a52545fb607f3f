pub mod regen;
pub mod show;

use std::path::Path;

use reforge_rewrite::{NetworkDef, Rewriter, SymbolTree};

use crate::error::CliError;
use crate::utils::{load_config, select_class};

/// Parses the network class of `file` into a symbol tree and hands it to `f`.
pub(crate) fn with_symbol_tree<T>(
    file: &Path,
    class: Option<String>,
    config: Option<&Path>,
    f: impl FnOnce(&SymbolTree<'_>) -> Result<T, CliError>,
) -> Result<T, CliError> {
    let config = load_config(config, file)?;
    let class = select_class(file, class)?;
    let network = NetworkDef::new(class, file);
    let rewriter = Rewriter::new(config);
    let tree = rewriter.parse_network(&network)?;
    f(&tree)
}
