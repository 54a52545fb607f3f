use std::fmt;

/// One-based line and column of a node's first character.
///
/// Synthesized nodes carry the default position `0:0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub fn is_synthesized(&self) -> bool {
        self.line == 0
    }

    /// Zero-based indentation column, as needed to re-indent verbatim text.
    pub fn indent(&self) -> usize {
        self.column.saturating_sub(1)
    }
}

impl From<tree_sitter::Point> for Position {
    fn from(point: tree_sitter::Point) -> Self {
        Self::new(point.row + 1, point.column + 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
