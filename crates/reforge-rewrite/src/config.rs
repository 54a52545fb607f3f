use std::path::Path;

use miette::Diagnostic;
use reforge_syntax::{Alias, SyntaxNode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings of the rewriter, read from the `[rewrite]` table of `reforge.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Root package of the framework, imported first (`import mindspore`)
    pub framework_root: String,

    /// Namespace holding the network building blocks (`from mindspore import nn`)
    pub namespace: String,

    /// Base class every network derives from (`from mindspore.nn import Cell`)
    pub base_class: String,

    /// Method whose body becomes the symbol tree's node sequence
    pub forward_method: String,

    /// Bound on syntax nesting and parser dispatch depth
    pub max_depth: usize,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            framework_root: "mindspore".to_string(),
            namespace: "nn".to_string(),
            base_class: "Cell".to_string(),
            forward_method: "construct".to_string(),
            max_depth: 200,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    rewrite: RewriteConfig,
}

impl RewriteConfig {
    /// Loads the configuration from a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(contents)?;
        Ok(file.rewrite)
    }

    /// The imports injected at the head of every rewritten module, in order:
    /// framework root, namespace, base class.
    pub fn canonical_imports(&self) -> [SyntaxNode; 3] {
        [
            SyntaxNode::import(&self.framework_root),
            SyntaxNode::import_from(&self.framework_root, vec![Alias::new(&self.namespace)]),
            SyntaxNode::import_from(
                format!("{}.{}", self.framework_root, self.namespace),
                vec![Alias::new(&self.base_class)],
            ),
        ]
    }
}

/// Errors that can occur when loading the rewriter configuration
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Error reading configuration: {0}")]
    #[diagnostic(
        code("CONFIG-001"),
        help("Check file permissions and ensure the file exists")
    )]
    ReadError(String),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code("CONFIG-002"),
        help("Check your reforge.toml syntax; settings live in the [rewrite] table")
    )]
    ParseError(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
