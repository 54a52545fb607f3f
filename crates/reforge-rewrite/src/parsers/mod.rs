//! Built-in parsers, one per syntax node kind.

mod assign;
mod call;
mod class;
mod control_flow;
mod expr;
mod function;
mod module;
mod ret;

pub use assign::AssignParser;
pub use call::CallParser;
pub use class::ClassParser;
pub use control_flow::ControlFlowParser;
pub use expr::{ExprStatementParser, ValueParser, VerbatimParser};
pub use function::FunctionParser;
pub use module::ModuleParser;
pub use ret::ReturnParser;

use reforge_syntax::NodeKind;

use crate::registry::ParserRegistry;

/// Value kinds assignments may bind without further analysis.
pub const VALUE_KINDS: [NodeKind; 7] = [
    NodeKind::Name,
    NodeKind::Attribute,
    NodeKind::Constant,
    NodeKind::BinOp,
    NodeKind::UnaryOp,
    NodeKind::Tuple,
    NodeKind::Other,
];

/// Statement kinds carried into the forward method unchanged.
pub const VERBATIM_KINDS: [NodeKind; 4] =
    [NodeKind::AugAssign, NodeKind::Pass, NodeKind::Import, NodeKind::ImportFrom];

pub(crate) fn register_defaults(registry: &mut ParserRegistry) {
    registry.register(ModuleParser);
    registry.register(ClassParser);
    registry.register(FunctionParser);
    registry.register(AssignParser);
    registry.register(CallParser);
    registry.register(ReturnParser);
    registry.register(ControlFlowParser);
    registry.register(ExprStatementParser);
    for kind in VALUE_KINDS {
        registry.register(ValueParser::new(kind));
    }
    for kind in VERBATIM_KINDS {
        registry.register(VerbatimParser::new(kind));
    }
}
