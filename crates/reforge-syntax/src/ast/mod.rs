pub mod common;
pub mod node;

pub use common::{Alias, Keyword, Param, ParamKind};
pub use node::{NodeKind, SyntaxKind, SyntaxNode};
