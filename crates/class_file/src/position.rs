use std::fmt;

/// The reduced source location of one method: the smallest line number in
/// its `LineNumberTable` and its 0-based position in the method table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourcePosition {
    pub min_line: i32,
    pub order: i32,
    pub has_position: bool,
}

/// Position of a method without a `Code` attribute.
pub const NO_POSITION: SourcePosition = SourcePosition {
    min_line: -1,
    order: -1,
    has_position: false,
};

impl SourcePosition {
    pub fn new(min_line: i32, order: i32) -> Self {
        Self {
            min_line,
            order,
            has_position: true,
        }
    }

    /// Position of a method that has code but no line numbers.
    pub fn unpositioned(order: i32) -> Self {
        Self {
            min_line: -1,
            order,
            has_position: false,
        }
    }
}

impl Default for SourcePosition {
    fn default() -> Self {
        NO_POSITION
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SourcePosition{{min_line={}, order={}, has_position={}}}",
            self.min_line, self.order, self.has_position
        )
    }
}
