//! UTF-8 source ingestion and byte-offset to line/column conversion.
//!
//! This is component 4.1 of the engine: the only place that looks at raw
//! bytes. Everything downstream (lexer, parser, resolver) works in terms of
//! `&str` and [`Span`](crate::span::Span)s anchored to the buffer a `Source`
//! owns.

use crate::error::SourceError;
use crate::span::{FileId, Span};

/// A validated UTF-8 source buffer with a precomputed line-start index.
///
/// Byte offsets into `text()` are converted to `(line, column)` in
/// `O(log lines)` via binary search over `line_starts`, rather than
/// rescanning the buffer on every diagnostic.
pub struct Source {
    file: FileId,
    text: String,
    line_starts: Vec<u32>,
}

impl Source {
    /// Validate `bytes` as UTF-8 and index its line starts.
    ///
    /// Fails with [`SourceError::InvalidUtf8`] naming the offset of the
    /// first ill-formed byte.
    pub fn new(file: FileId, bytes: &[u8]) -> Result<Self, SourceError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| SourceError::InvalidUtf8 { offset: e.valid_up_to() })?
            .to_owned();
        Ok(Self::from_validated(file, text))
    }

    /// Build a `Source` from text that is already known to be valid UTF-8
    /// (e.g. produced by the canonicalizer, or an already-owned `String`).
    pub fn from_validated(file: FileId, text: String) -> Self {
        let line_starts = compute_line_starts(&text);
        Self { file, text, line_starts }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Convert a byte offset into a 1-based `(line, column)` pair.
    ///
    /// `column` counts UTF-8 bytes since the start of the line, which is
    /// sufficient for ASCII-dominant HEDL source and keeps this function
    /// O(log lines) instead of re-walking chars from the line start.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let line_start = self.line_starts[line_idx];
        (line_idx as u32 + 1, offset - line_start + 1)
    }

    /// Build a span from a byte-offset range, filling in line/column from
    /// the start offset.
    pub fn span(&self, start: u32, end: u32) -> Span {
        let (line, column) = self.line_col(start);
        Span::with_file(start, end, line, column, self.file)
    }
}

fn compute_line_starts(text: &str) -> Vec<u32> {
    let mut starts = vec![0u32];
    starts.extend(
        text.bytes()
            .enumerate()
            .filter(|&(_, b)| b == b'\n')
            .map(|(i, _)| i as u32 + 1),
    );
    starts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_utf8_at_first_bad_byte() {
        let bytes = b"name: \xFF\xFElate";
        let err = Source::new(FileId::DUMMY, bytes).unwrap_err();
        match err {
            SourceError::InvalidUtf8 { offset } => assert_eq!(offset, 6),
        }
    }

    #[test]
    fn line_col_tracks_newlines() {
        let src = Source::from_validated(FileId::DUMMY, "abc\ndef\nghi".to_string());
        assert_eq!(src.line_col(0), (1, 1));
        assert_eq!(src.line_col(3), (1, 4));
        assert_eq!(src.line_col(4), (2, 1));
        assert_eq!(src.line_col(8), (3, 1));
    }

    #[test]
    fn empty_source_has_single_line() {
        let src = Source::from_validated(FileId::DUMMY, String::new());
        assert_eq!(src.line_col(0), (1, 1));
    }
}
