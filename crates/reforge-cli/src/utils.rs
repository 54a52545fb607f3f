use std::path::{Path, PathBuf};

use reforge_rewrite::{ClassFinder, RewriteConfig};
use reforge_syntax::parse_module;

use crate::error::CliError;

pub const CONFIG_FILE: &str = "reforge.toml";

/// Searches upwards from `start_path` for `reforge.toml`.
pub fn find_config(start_path: &Path) -> Option<PathBuf> {
    let mut current = if start_path.is_dir() {
        start_path.to_path_buf()
    } else {
        start_path.parent().map_or_else(|| start_path.to_path_buf(), Path::to_path_buf)
    };
    loop {
        let candidate = current.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Loads the explicit configuration file, else the nearest `reforge.toml`
/// above `file`, else the defaults.
pub fn load_config(explicit: Option<&Path>, file: &Path) -> Result<RewriteConfig, CliError> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config(file),
    };
    match path {
        Some(path) => {
            log::debug!("Using configuration {}", path.display());
            Ok(RewriteConfig::from_file(&path)?)
        }
        None => Ok(RewriteConfig::default()),
    }
}

/// The class to rewrite: the requested one, or the only class in `file`.
pub fn select_class(file: &Path, requested: Option<String>) -> Result<String, CliError> {
    if let Some(class) = requested {
        return Ok(class);
    }
    let source = std::fs::read_to_string(file).map_err(|e| CliError::IoError {
        path: file.to_path_buf(),
        operation: "reading source".to_string(),
        source: e,
    })?;
    let module = parse_module(&source).map_err(|e| CliError::ClassSelection {
        path: file.to_path_buf(),
        reason: e.to_string(),
    })?;
    let classes: Vec<&str> = ClassFinder
        .find_all(&module)
        .into_iter()
        .filter_map(|class| class.def_name())
        .collect();
    match classes.as_slice() {
        [class] => Ok(class.to_string()),
        [] => Err(CliError::ClassSelection {
            path: file.to_path_buf(),
            reason: "the file defines no class".to_string(),
        }),
        many => Err(CliError::ClassSelection {
            path: file.to_path_buf(),
            reason: format!("the file defines {} classes ({})", many.len(), many.join(", ")),
        }),
    }
}
