//! Types for representing positions within source code.

use std::{fmt, ops::Deref, rc::Rc};

/// A single point in a source file.
///
/// `line` is zero-based; `column` is one-based, which matches how editors
/// usually count columns. The printer renders both one-based.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    /// Absolute byte offset from the start of the file.
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

impl Point {
    pub const START: Self = Self {
        offset: 0,
        line: 0,
        column: 1,
    };

    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@{}", self.line + 1, self.column, self.offset)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A range of characters within a single source file.
///
/// The `Unknown` variant is used for things that have no meaningful place in
/// the source, such as fabricated tokens whose origin has been lost. It
/// compares equal only to itself and acts as the identity element of
/// [`Position::union`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Unknown,
    Spanning { start: Point, end: Point },
}

impl Position {
    pub fn new(start: Point, end: Point) -> Self {
        debug_assert!(start.offset <= end.offset, "position must not be inverted");
        Self::Spanning { start, end }
    }

    /// A zero-width position at the given point.
    pub fn at(point: Point) -> Self {
        Self::Spanning {
            start: point,
            end: point,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Spanning { .. })
    }

    pub fn start(&self) -> Option<Point> {
        match self {
            Self::Unknown => None,
            Self::Spanning { start, .. } => Some(*start),
        }
    }

    pub fn end(&self) -> Option<Point> {
        match self {
            Self::Unknown => None,
            Self::Spanning { end, .. } => Some(*end),
        }
    }

    /// Collapses the position to a zero-width one at its start.
    pub fn before(&self) -> Position {
        match self {
            Self::Unknown => Self::Unknown,
            Self::Spanning { start, .. } => Self::at(*start),
        }
    }

    /// Collapses the position to a zero-width one at its end.
    pub fn after(&self) -> Position {
        match self {
            Self::Unknown => Self::Unknown,
            Self::Spanning { end, .. } => Self::at(*end),
        }
    }

    /// Joins two positions together, forming the smallest position that
    /// includes both `self` and `other`.
    pub fn union(&self, other: &Position) -> Position {
        match (*self, *other) {
            (Self::Unknown, Self::Unknown) => Self::Unknown,
            (Self::Unknown, known) | (known, Self::Unknown) => known,
            (
                Self::Spanning {
                    start: a_start,
                    end: a_end,
                },
                Self::Spanning {
                    start: b_start,
                    end: b_end,
                },
            ) => Self::Spanning {
                start: a_start.min(b_start),
                end: a_end.max(b_end),
            },
        }
    }

    /// Whether `other` lies entirely within `self`. Unknown positions contain
    /// nothing and are contained by everything, so that recovery nodes do not
    /// trip nesting checks.
    pub fn contains(&self, other: &Position) -> bool {
        match (self, other) {
            (_, Self::Unknown) => true,
            (Self::Unknown, _) => false,
            (
                Self::Spanning { start, end },
                Self::Spanning {
                    start: other_start,
                    end: other_end,
                },
            ) => start.offset <= other_start.offset && other_end.offset <= end.offset,
        }
    }

    pub fn byte_len(&self) -> usize {
        match self {
            Self::Unknown => 0,
            Self::Spanning { start, end } => end.offset - start.offset,
        }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "(unknown)"),
            Self::Spanning { start, end } => write!(f, "{start:?}..{end:?}"),
        }
    }
}

/// Implemented by everything that has a source position attached.
pub trait Positioned {
    fn position(&self) -> Position;
}

impl Positioned for Position {
    fn position(&self) -> Position {
        *self
    }
}

impl<T> Positioned for Option<T>
where
    T: Positioned,
{
    fn position(&self) -> Position {
        self.as_ref()
            .map(|x| x.position())
            .unwrap_or(Position::Unknown)
    }
}

impl<T> Positioned for Box<T>
where
    T: Positioned,
{
    fn position(&self) -> Position {
        self.deref().position()
    }
}

impl<T> Positioned for Vec<T>
where
    T: Positioned,
{
    fn position(&self) -> Position {
        self.first()
            .zip(self.last())
            .map(|(first, last)| first.position().union(&last.position()))
            .unwrap_or(Position::Unknown)
    }
}

/// Identifies a source file across the pipeline.
///
/// This is a cheap-to-clone interned string; the whole front-end is
/// single-threaded, so reference counting is uncontended.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceUri(Rc<str>);

impl SourceUri {
    pub fn new(uri: impl Into<Rc<str>>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SourceUri {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}

impl From<String> for SourceUri {
    fn from(uri: String) -> Self {
        Self::new(uri)
    }
}

impl fmt::Debug for SourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for SourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A position qualified with the file it comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub position: Position,
    pub file: Option<SourceUri>,
}

impl Location {
    pub const UNKNOWN: Self = Self {
        position: Position::Unknown,
        file: None,
    };

    pub fn new(position: Position, file: SourceUri) -> Self {
        Self {
            position,
            file: Some(file),
        }
    }

    pub fn union(&self, other: &Location) -> Location {
        Location {
            position: self.position.union(&other.position),
            file: self.file.clone().or_else(|| other.file.clone()),
        }
    }
}

impl Positioned for Location {
    fn position(&self) -> Position {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(offset: usize) -> Point {
        Point::new(offset, 0, offset as u32 + 1)
    }

    fn spanning(start: usize, end: usize) -> Position {
        Position::new(point(start), point(end))
    }

    #[test]
    fn union_is_a_bounding_box() {
        let a = spanning(0, 4);
        let b = spanning(10, 12);
        assert_eq!(a.union(&b), spanning(0, 12));
        assert_eq!(b.union(&a), spanning(0, 12));
    }

    #[test]
    fn unknown_is_union_identity() {
        let a = spanning(3, 7);
        assert_eq!(a.union(&Position::Unknown), a);
        assert_eq!(Position::Unknown.union(&a), a);
        assert_eq!(
            Position::Unknown.union(&Position::Unknown),
            Position::Unknown
        );
    }

    #[test]
    fn unknown_compares_equal_only_to_itself() {
        assert_eq!(Position::Unknown, Position::Unknown);
        assert_ne!(Position::Unknown, spanning(0, 0));
    }

    #[test]
    fn before_and_after_collapse_to_endpoints() {
        let a = spanning(2, 9);
        assert_eq!(a.before(), spanning(2, 2));
        assert_eq!(a.after(), spanning(9, 9));
        assert_eq!(Position::Unknown.before(), Position::Unknown);
    }

    #[test]
    fn containment() {
        assert!(spanning(0, 10).contains(&spanning(2, 5)));
        assert!(spanning(0, 10).contains(&spanning(0, 10)));
        assert!(!spanning(2, 5).contains(&spanning(0, 10)));
        assert!(spanning(2, 5).contains(&Position::Unknown));
        assert!(!Position::Unknown.contains(&spanning(0, 0)));
    }
}
