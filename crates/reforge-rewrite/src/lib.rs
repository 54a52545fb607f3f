//! Rewriting of network class definitions.
//!
//! A network's class is parsed out of its source file into a [`SymbolTree`]:
//! the module is augmented with the framework's canonical imports and the
//! imports of the origin file, and the statements of the class's forward
//! method become IR nodes. The tree can be edited and regenerated to source.
//!
//! ```no_run
//! use reforge_rewrite::{NetworkDef, Rewriter};
//!
//! # fn main() -> reforge_rewrite::Result<()> {
//! let network = NetworkDef::new("LeNet", "models/lenet.py");
//! let tree = Rewriter::default().parse_network(&network)?;
//! println!("{}", tree.regenerate()?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod finders;
pub mod network;
pub mod parsers;
pub mod registry;
pub mod rewriter;
pub mod symbol_tree;

pub use config::{ConfigError, RewriteConfig};
pub use context::{ParseContext, PendingStatement};
pub use error::{Result, RewriteError};
pub use finders::{ClassFinder, ImportCollector};
pub use network::{Network, NetworkDef};
pub use registry::{Parser, ParserRegistry};
pub use rewriter::Rewriter;
pub use symbol_tree::{Branches, ClassItem, ForwardDef, Node, NodeId, NodeType, SymbolTree};
