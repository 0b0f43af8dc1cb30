//! Source location tracking.
//!
//! A [`Span`] is a byte-offset range into a source buffer, plus the
//! line/column pair a human would use to find it. Spans are copied freely
//! (they are `Copy`) and are attached to every node the lexer, parser and
//! resolver produce so that diagnostics stay locatable once the source
//! buffer itself is gone.

/// Identifies which source buffer a [`Span`] belongs to.
///
/// The core engine parses one document per call, but `FileId` keeps the
/// door open for diagnostics that need to point at more than one buffer
/// (for example a resolver error that cites both a reference's span and
/// the span of the alias it failed to find, when those come from an
/// import in a future extension).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl FileId {
    pub const DUMMY: FileId = FileId(0);
}

/// A byte-offset range into a source buffer, with line/column for display.
///
/// `start` and `end` are UTF-8 byte offsets (not char or grapheme counts),
/// satisfying `start <= end`. `line` and `column` describe `start` and are
/// both 1-based.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: u32,
    pub end: u32,
    pub line: u32,
    pub column: u32,
    pub file: FileId,
}

impl Span {
    /// A span with no meaningful location, used for synthesized nodes
    /// (e.g. a defaulted field value that never appeared in source).
    pub const DUMMY: Span = Span {
        start: 0,
        end: 0,
        line: 0,
        column: 0,
        file: FileId::DUMMY,
    };

    #[inline]
    pub fn new(start: u32, end: u32, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
            file: FileId::DUMMY,
        }
    }

    #[inline]
    pub fn with_file(start: u32, end: u32, line: u32, column: u32, file: FileId) -> Self {
        Self {
            start,
            end,
            line,
            column,
            file,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }

    /// The smallest span covering both `self` and `other`.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        let (start, line, column) = if self.start <= other.start {
            (self.start, self.line, self.column)
        } else {
            (other.start, other.line, other.column)
        };
        Span {
            start,
            end: self.end.max(other.end),
            line,
            column,
            file: self.file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_takes_earliest_start_and_latest_end() {
        let a = Span::new(10, 20, 2, 1);
        let b = Span::new(5, 15, 1, 3);
        let merged = a.merge(b);
        assert_eq!(merged.start, 5);
        assert_eq!(merged.end, 20);
        assert_eq!(merged.line, 1);
        assert_eq!(merged.column, 3);
    }

    #[test]
    fn contains_is_half_open() {
        let s = Span::new(10, 20, 1, 1);
        assert!(s.contains(10));
        assert!(s.contains(19));
        assert!(!s.contains(20));
    }

    #[test]
    fn dummy_is_empty() {
        assert!(Span::DUMMY.is_empty());
    }
}
