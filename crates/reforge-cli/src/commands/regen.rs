use std::path::{Path, PathBuf};

use super::with_symbol_tree;
use crate::error::CliError;

/// Regenerates the network class of `file`, to stdout or to `output`.
pub fn handle_regen(
    file: &Path,
    class: Option<String>,
    config: Option<&Path>,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let source = with_symbol_tree(file, class, config, |tree| Ok(tree.regenerate()?))?;
    match output {
        Some(path) => {
            std::fs::write(&path, source).map_err(|e| CliError::IoError {
                path: path.clone(),
                operation: "writing regenerated source".to_string(),
                source: e,
            })?;
            log::info!("Wrote {}", path.display());
        }
        None => print!("{}", source),
    }
    Ok(())
}
