use std::fmt;

use miette::SourceSpan;

use super::common::{Alias, Keyword, Param};
use crate::location::Position;

/// A node of the owned syntax tree.
///
/// Nodes own their children, so `clone()` is a deep copy: a cloned subtree
/// shares nothing with the tree it was taken from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub span: SourceSpan,
    pub position: Position,
}

/// The kind of a syntax node together with its kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Module {
        body: Vec<SyntaxNode>,
    },
    ClassDef {
        name: String,
        bases: Vec<SyntaxNode>,
        keywords: Vec<Keyword>,
        decorators: Vec<SyntaxNode>,
        body: Vec<SyntaxNode>,
    },
    FunctionDef {
        name: String,
        params: Vec<Param>,
        returns: Option<Box<SyntaxNode>>,
        decorators: Vec<SyntaxNode>,
        body: Vec<SyntaxNode>,
    },
    Return {
        value: Option<Box<SyntaxNode>>,
    },
    Assign {
        targets: Vec<SyntaxNode>,
        value: Box<SyntaxNode>,
    },
    AugAssign {
        target: Box<SyntaxNode>,
        op: String,
        value: Box<SyntaxNode>,
    },
    If {
        test: Box<SyntaxNode>,
        body: Vec<SyntaxNode>,
        orelse: Vec<SyntaxNode>,
    },
    /// An expression used as a statement
    Expr {
        value: Box<SyntaxNode>,
    },
    Pass,
    Import {
        names: Vec<Alias>,
    },
    ImportFrom {
        module: Option<String>,
        names: Vec<Alias>,
        level: usize,
    },
    Call {
        func: Box<SyntaxNode>,
        args: Vec<SyntaxNode>,
        keywords: Vec<Keyword>,
    },
    Name {
        id: String,
    },
    Attribute {
        value: Box<SyntaxNode>,
        attr: String,
    },
    /// A literal, kept as its source text
    Constant {
        value: String,
    },
    BinOp {
        left: Box<SyntaxNode>,
        op: String,
        right: Box<SyntaxNode>,
    },
    UnaryOp {
        op: String,
        operand: Box<SyntaxNode>,
    },
    Lambda {
        params: Vec<Param>,
        body: Box<SyntaxNode>,
    },
    Tuple {
        elts: Vec<SyntaxNode>,
    },
    /// Any construct the frontend does not model, kept verbatim.
    /// `kind` is the tree-sitter node kind.
    Other {
        kind: String,
        text: String,
    },
}

/// Fieldless tag of a [`SyntaxKind`], used to key parser dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Module,
    ClassDef,
    FunctionDef,
    Return,
    Assign,
    AugAssign,
    If,
    Expr,
    Pass,
    Import,
    ImportFrom,
    Call,
    Name,
    Attribute,
    Constant,
    BinOp,
    UnaryOp,
    Lambda,
    Tuple,
    Other,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Module => "Module",
            NodeKind::ClassDef => "ClassDef",
            NodeKind::FunctionDef => "FunctionDef",
            NodeKind::Return => "Return",
            NodeKind::Assign => "Assign",
            NodeKind::AugAssign => "AugAssign",
            NodeKind::If => "If",
            NodeKind::Expr => "Expr",
            NodeKind::Pass => "Pass",
            NodeKind::Import => "Import",
            NodeKind::ImportFrom => "ImportFrom",
            NodeKind::Call => "Call",
            NodeKind::Name => "Name",
            NodeKind::Attribute => "Attribute",
            NodeKind::Constant => "Constant",
            NodeKind::BinOp => "BinOp",
            NodeKind::UnaryOp => "UnaryOp",
            NodeKind::Lambda => "Lambda",
            NodeKind::Tuple => "Tuple",
            NodeKind::Other => "Other",
        }
    }

    /// Whether nodes of this kind appear in statement position.
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::Module
                | NodeKind::ClassDef
                | NodeKind::FunctionDef
                | NodeKind::Return
                | NodeKind::Assign
                | NodeKind::AugAssign
                | NodeKind::If
                | NodeKind::Expr
                | NodeKind::Pass
                | NodeKind::Import
                | NodeKind::ImportFrom
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SyntaxNode {
    pub fn new(kind: SyntaxKind, span: SourceSpan, position: Position) -> Self {
        Self { kind, span, position }
    }

    /// A node with no source location, for code built programmatically.
    pub fn synthesized(kind: SyntaxKind) -> Self {
        Self {
            kind,
            span: SourceSpan::new(0.into(), 0),
            position: Position::default(),
        }
    }

    pub fn name(id: impl Into<String>) -> Self {
        Self::synthesized(SyntaxKind::Name { id: id.into() })
    }

    /// Builds `a.b.c` from a dotted path.
    pub fn dotted(path: &str) -> Self {
        let mut segments = path.split('.');
        let first = segments.next().unwrap_or_default();
        segments.fold(Self::name(first), |value, attr| {
            Self::synthesized(SyntaxKind::Attribute {
                value: Box::new(value),
                attr: attr.to_string(),
            })
        })
    }

    pub fn call(func: SyntaxNode, args: Vec<SyntaxNode>, keywords: Vec<Keyword>) -> Self {
        Self::synthesized(SyntaxKind::Call {
            func: Box::new(func),
            args,
            keywords,
        })
    }

    pub fn assign(targets: Vec<SyntaxNode>, value: SyntaxNode) -> Self {
        Self::synthesized(SyntaxKind::Assign {
            targets,
            value: Box::new(value),
        })
    }

    pub fn ret(value: Option<SyntaxNode>) -> Self {
        Self::synthesized(SyntaxKind::Return { value: value.map(Box::new) })
    }

    pub fn import(name: impl Into<String>) -> Self {
        Self::synthesized(SyntaxKind::Import { names: vec![Alias::new(name)] })
    }

    pub fn import_from(module: impl Into<String>, names: Vec<Alias>) -> Self {
        Self::synthesized(SyntaxKind::ImportFrom {
            module: Some(module.into()),
            names,
            level: 0,
        })
    }

    pub fn node_kind(&self) -> NodeKind {
        match &self.kind {
            SyntaxKind::Module { .. } => NodeKind::Module,
            SyntaxKind::ClassDef { .. } => NodeKind::ClassDef,
            SyntaxKind::FunctionDef { .. } => NodeKind::FunctionDef,
            SyntaxKind::Return { .. } => NodeKind::Return,
            SyntaxKind::Assign { .. } => NodeKind::Assign,
            SyntaxKind::AugAssign { .. } => NodeKind::AugAssign,
            SyntaxKind::If { .. } => NodeKind::If,
            SyntaxKind::Expr { .. } => NodeKind::Expr,
            SyntaxKind::Pass => NodeKind::Pass,
            SyntaxKind::Import { .. } => NodeKind::Import,
            SyntaxKind::ImportFrom { .. } => NodeKind::ImportFrom,
            SyntaxKind::Call { .. } => NodeKind::Call,
            SyntaxKind::Name { .. } => NodeKind::Name,
            SyntaxKind::Attribute { .. } => NodeKind::Attribute,
            SyntaxKind::Constant { .. } => NodeKind::Constant,
            SyntaxKind::BinOp { .. } => NodeKind::BinOp,
            SyntaxKind::UnaryOp { .. } => NodeKind::UnaryOp,
            SyntaxKind::Lambda { .. } => NodeKind::Lambda,
            SyntaxKind::Tuple { .. } => NodeKind::Tuple,
            SyntaxKind::Other { .. } => NodeKind::Other,
        }
    }

    pub fn is_class_def(&self) -> bool {
        matches!(self.kind, SyntaxKind::ClassDef { .. })
    }

    pub fn is_import(&self) -> bool {
        matches!(self.kind, SyntaxKind::Import { .. } | SyntaxKind::ImportFrom { .. })
    }

    /// Name of a class or function definition.
    pub fn def_name(&self) -> Option<&str> {
        match &self.kind {
            SyntaxKind::ClassDef { name, .. } | SyntaxKind::FunctionDef { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Statement body of a module, class or function.
    pub fn body(&self) -> Option<&[SyntaxNode]> {
        match &self.kind {
            SyntaxKind::Module { body }
            | SyntaxKind::ClassDef { body, .. }
            | SyntaxKind::FunctionDef { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn body_mut(&mut self) -> Option<&mut Vec<SyntaxNode>> {
        match &mut self.kind {
            SyntaxKind::Module { body }
            | SyntaxKind::ClassDef { body, .. }
            | SyntaxKind::FunctionDef { body, .. } => Some(body),
            _ => None,
        }
    }

    /// `self.attr` -> `Some("attr")`
    pub fn self_attribute(&self) -> Option<&str> {
        match &self.kind {
            SyntaxKind::Attribute { value, attr } => match &value.kind {
                SyntaxKind::Name { id } if id == "self" => Some(attr),
                _ => None,
            },
            _ => None,
        }
    }

    /// Dotted path of a `Name`/`Attribute` chain, `None` for anything else.
    pub fn dotted_path(&self) -> Option<String> {
        match &self.kind {
            SyntaxKind::Name { id } => Some(id.clone()),
            SyntaxKind::Attribute { value, attr } => {
                value.dotted_path().map(|base| format!("{}.{}", base, attr))
            }
            _ => None,
        }
    }

    /// Child nodes in source order. Nodes held inside parameters and keywords
    /// (annotations, defaults, keyword values) are included.
    pub fn children(&self) -> Vec<&SyntaxNode> {
        let mut out = Vec::new();
        match &self.kind {
            SyntaxKind::Module { body } => out.extend(body),
            SyntaxKind::ClassDef { bases, keywords, decorators, body, .. } => {
                out.extend(decorators);
                out.extend(bases);
                out.extend(keywords.iter().map(|k| &k.value));
                out.extend(body);
            }
            SyntaxKind::FunctionDef { params, returns, decorators, body, .. } => {
                out.extend(decorators);
                push_params(&mut out, params);
                out.extend(returns.as_deref());
                out.extend(body);
            }
            SyntaxKind::Return { value } => out.extend(value.as_deref()),
            SyntaxKind::Assign { targets, value } => {
                out.extend(targets);
                out.push(value);
            }
            SyntaxKind::AugAssign { target, value, .. } => {
                out.push(target);
                out.push(value);
            }
            SyntaxKind::If { test, body, orelse } => {
                out.push(test);
                out.extend(body);
                out.extend(orelse);
            }
            SyntaxKind::Expr { value } => out.push(value),
            SyntaxKind::Call { func, args, keywords } => {
                out.push(func);
                out.extend(args);
                out.extend(keywords.iter().map(|k| &k.value));
            }
            SyntaxKind::Attribute { value, .. } => out.push(value),
            SyntaxKind::BinOp { left, right, .. } => {
                out.push(left);
                out.push(right);
            }
            SyntaxKind::UnaryOp { operand, .. } => out.push(operand),
            SyntaxKind::Lambda { params, body } => {
                push_params(&mut out, params);
                out.push(body);
            }
            SyntaxKind::Tuple { elts } => out.extend(elts),
            SyntaxKind::Pass
            | SyntaxKind::Import { .. }
            | SyntaxKind::ImportFrom { .. }
            | SyntaxKind::Name { .. }
            | SyntaxKind::Constant { .. }
            | SyntaxKind::Other { .. } => {}
        }
        out
    }
}

fn push_params<'a>(out: &mut Vec<&'a SyntaxNode>, params: &'a [Param]) {
    for param in params {
        out.extend(param.annotation.as_ref());
        out.extend(param.default.as_ref());
    }
}
