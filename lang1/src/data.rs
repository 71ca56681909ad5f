use std::fmt::{Debug, Display, Formatter};

/// A source position, defined by its zero-based row and zero-based column.
///
/// Consuming a newline moves to column zero of the next row; every other
/// character advances the column by one.
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Position {
    row: u32,
    col: u32,
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}

impl Debug for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

impl Position {
    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn col(&self) -> u32 {
        self.col
    }

    pub fn zero() -> Position {
        Position::new(0, 0)
    }

    pub fn new(row: u32, col: u32) -> Position {
        Position { row, col }
    }

    /// The position after consuming `ch` at this position.
    pub fn advance(&self, ch: u8) -> Position {
        match ch {
            b'\n' => Position::new(self.row.saturating_add(1), 0),
            _ => Position::new(self.row, self.col.saturating_add(1)),
        }
    }

    pub fn to<'doc>(&self, document: &'doc str, other: Position) -> Span<'doc> {
        debug_assert!(other >= *self, "Position {other} is before position {self}");
        Span::new(document, *self, other)
    }
}

/// A region of a named document. The start is inclusive, the end is not.
///
/// The document name is borrowed from whoever supplied the input.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Span<'doc> {
    document: &'doc str,
    start: Position,
    end: Position,
}

impl<'doc> Span<'doc> {
    pub fn new(document: &'doc str, start: Position, end: Position) -> Span<'doc> {
        Span {
            document,
            start,
            end,
        }
    }

    /// A zero-length span at the start of `document`.
    pub fn empty(document: &'doc str) -> Span<'doc> {
        Span::new(document, Position::zero(), Position::zero())
    }

    pub fn document(&self) -> &'doc str {
        self.document
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, position: &Position) -> bool {
        self.start <= *position && self.end > *position
    }
}

/// Renders as `document:row:col` with one-based row and column.
impl Display for Span<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.document,
            self.start.row + 1,
            self.start.col + 1
        )
    }
}

pub trait HasSpan<'doc> {
    fn span(&self) -> Span<'doc>;

    fn start(&self) -> Position {
        self.span().start()
    }

    fn end(&self) -> Position {
        self.span().end()
    }
}

impl<'doc> HasSpan<'doc> for Span<'doc> {
    fn span(&self) -> Span<'doc> {
        *self
    }
}
