use super::node::SyntaxNode;

/// One name bound by an import statement, e.g. `numpy as np`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Alias {
    /// Dotted name being imported (`*` for a wildcard import)
    pub name: String,
    pub asname: Option<String>,
}

impl Alias {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), asname: None }
    }

    pub fn with_asname(name: impl Into<String>, asname: impl Into<String>) -> Self {
        Self { name: name.into(), asname: Some(asname.into()) }
    }

    /// The name this alias binds in the importing scope.
    pub fn bound_name(&self) -> &str {
        match &self.asname {
            Some(asname) => asname,
            None => self.name.split('.').next().unwrap_or(&self.name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// A regular positional-or-keyword parameter
    Normal,
    /// `*args`
    VarArgs,
    /// `**kwargs`
    KwArgs,
    /// A bare `*`
    KeywordSeparator,
    /// A bare `/`
    PositionalSeparator,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
    pub annotation: Option<SyntaxNode>,
    pub default: Option<SyntaxNode>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Normal,
            annotation: None,
            default: None,
        }
    }

    pub fn is_separator(&self) -> bool {
        matches!(self.kind, ParamKind::KeywordSeparator | ParamKind::PositionalSeparator)
    }
}

/// A keyword argument of a call or class header. `arg` is `None` for `**mapping`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Keyword {
    pub arg: Option<String>,
    pub value: SyntaxNode,
}
