//! The diagnostic engine: span-anchored errors and warnings with severity.
//!
//! A [`Diagnostic`] is `(severity, code, message, primary_span,
//! related_spans)`. Every component that can fail softly -- the lexer and
//! parser in lenient mode, the resolver's reference pass, the linter --
//! reports into a [`DiagnosticBag`], which deduplicates identical
//! `(code, primary_span)` pairs and orders its contents by primary-span
//! start offset once collection finishes.

use crate::span::Span;
use std::fmt;

/// Diagnostic severity, in increasing order of urgency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Hint = 0,
    Warning = 1,
    Error = 2,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Hint => "hint",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// A stable short identifier for a diagnostic message.
///
/// Errors fall in `E0001`-`E0099`, warnings in `W0100`-`W0199`, hints in
/// `H0200` and up. The constructors enforce the numbering by
/// construction so a code and its severity can never drift apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiagnosticCode {
    prefix: &'static str,
    number: u32,
}

impl DiagnosticCode {
    pub const fn error(number: u32) -> Self {
        assert!(number >= 1 && number <= 99);
        Self { prefix: "E", number }
    }

    pub const fn warning(number: u32) -> Self {
        assert!(number >= 100 && number <= 199);
        Self { prefix: "W", number }
    }

    pub const fn hint(number: u32) -> Self {
        assert!(number >= 200);
        Self { prefix: "H", number }
    }

    pub fn severity(&self) -> Severity {
        match self.prefix {
            "E" => Severity::Error,
            "W" => Severity::Warning,
            _ => Severity::Hint,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:04}", self.prefix, self.number)
    }
}

/// Stable diagnostic codes used across the engine.
///
/// Each component that raises diagnostics owns a slice of the numbering so
/// that adding a check in one component never collides with another's
/// codes.
pub mod codes {
    use super::DiagnosticCode;

    // --- hard errors (E0001-E0099) -----------------------------------
    pub const E_INVALID_UTF8: DiagnosticCode = DiagnosticCode::error(1);
    pub const E_LEX_UNTERMINATED_STRING: DiagnosticCode = DiagnosticCode::error(2);
    pub const E_LEX_INVALID_ESCAPE: DiagnosticCode = DiagnosticCode::error(3);
    pub const E_LEX_UNTERMINATED_REFERENCE: DiagnosticCode = DiagnosticCode::error(4);
    pub const E_LEX_NUMERIC_OUT_OF_RANGE: DiagnosticCode = DiagnosticCode::error(5);
    pub const E_LEX_MALFORMED_UNICODE_ESCAPE: DiagnosticCode = DiagnosticCode::error(6);
    pub const E_LEX_MIXED_INDENT: DiagnosticCode = DiagnosticCode::error(7);
    pub const E_LEX_UNKNOWN_DIRECTIVE: DiagnosticCode = DiagnosticCode::error(8);
    pub const E_PARSE_UNEXPECTED_TOKEN: DiagnosticCode = DiagnosticCode::error(10);
    pub const E_PARSE_UNEXPECTED_EOF: DiagnosticCode = DiagnosticCode::error(11);
    pub const E_PARSE_INVALID_VERSION: DiagnosticCode = DiagnosticCode::error(12);
    pub const E_PARSE_MULTIPLE_VERSIONS: DiagnosticCode = DiagnosticCode::error(13);
    pub const E_PARSE_MISSING_SEPARATOR: DiagnosticCode = DiagnosticCode::error(14);
    pub const E_RESOLVE_DUPLICATE_NAME: DiagnosticCode = DiagnosticCode::error(20);
    pub const E_RESOLVE_DUPLICATE_FIELD: DiagnosticCode = DiagnosticCode::error(21);
    pub const E_RESOLVE_ALIAS_CYCLE: DiagnosticCode = DiagnosticCode::error(22);
    pub const E_RESOLVE_UNRESOLVED_REFERENCE: DiagnosticCode = DiagnosticCode::error(23);
    pub const E_RESOLVE_UNKNOWN_MAJOR_VERSION: DiagnosticCode = DiagnosticCode::error(24);
    pub const E_RESOLVE_MISSING_FIELD: DiagnosticCode = DiagnosticCode::error(25);
    pub const E_RESOLVE_EXTRA_FIELD: DiagnosticCode = DiagnosticCode::error(26);
    pub const E_RESOLVE_TYPE_MISMATCH: DiagnosticCode = DiagnosticCode::error(27);
    pub const E_RESOLVE_RAGGED_MATRIX: DiagnosticCode = DiagnosticCode::error(28);
    pub const E_RESOLVE_REFERENCE_STRING_FORBIDDEN: DiagnosticCode = DiagnosticCode::error(29);
    pub const E_RESOLVE_NON_FINITE_FLOAT: DiagnosticCode = DiagnosticCode::error(30);

    // --- soft warnings (W0100-W0199) ----------------------------------
    pub const W_UNKNOWN_MINOR_VERSION: DiagnosticCode = DiagnosticCode::warning(100);
    pub const W_UNUSED_ALIAS: DiagnosticCode = DiagnosticCode::warning(101);
    pub const W_ALL_OPTIONAL_ABSENT: DiagnosticCode = DiagnosticCode::warning(102);
    pub const W_DEEP_NESTING: DiagnosticCode = DiagnosticCode::warning(103);
    pub const W_UNRESOLVED_REFERENCE_LENIENT: DiagnosticCode = DiagnosticCode::warning(104);

    // --- hints (H0200+) -------------------------------------------------
    pub const H_UNUSED_SCHEMA: DiagnosticCode = DiagnosticCode::hint(200);
    pub const H_DUPLICATE_ALIAS_VALUE: DiagnosticCode = DiagnosticCode::hint(201);
    pub const H_FLAT_LIST_IS_MATRIX: DiagnosticCode = DiagnosticCode::hint(202);
    pub const H_NON_ASCII_IDENTIFIER: DiagnosticCode = DiagnosticCode::hint(203);
}

/// A related span attached to a diagnostic (e.g. "first defined here").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedSpan {
    pub span: Span,
    pub message: String,
}

/// A single span-anchored diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    pub primary_span: Span,
    pub related: Vec<RelatedSpan>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>, primary_span: Span) -> Self {
        Self {
            severity: code.severity(),
            code,
            message: message.into(),
            primary_span,
            related: Vec::new(),
        }
    }

    pub fn with_related(mut self, span: Span, message: impl Into<String>) -> Self {
        self.related.push(RelatedSpan { span, message: message.into() });
        self
    }
}

/// Collects diagnostics for one operation, deduplicating and ordering them.
///
/// Deduplication keys on `(code, primary_span)`: the same check firing
/// twice at the same location (e.g. a reference pass revisiting a node
/// after a partial resolution retry) should not produce two identical
/// reports.
#[derive(Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
    seen: crate::FxHashSet<(DiagnosticCode, u32, u32)>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        let key = (diagnostic.code, diagnostic.primary_span.start, diagnostic.primary_span.end);
        if self.seen.insert(key) {
            self.diagnostics.push(diagnostic);
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Consume the bag, returning its diagnostics ordered by primary-span
    /// start offset.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.diagnostics.sort_by_key(|d| d.primary_span.start);
        self.diagnostics
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::FileId;

    fn span(start: u32, end: u32) -> Span {
        Span::with_file(start, end, 1, start + 1, FileId::DUMMY)
    }

    #[test]
    fn duplicate_code_and_span_is_deduplicated() {
        let mut bag = DiagnosticBag::new();
        bag.push(Diagnostic::new(codes::E_RESOLVE_ALIAS_CYCLE, "cycle", span(5, 6)));
        bag.push(Diagnostic::new(codes::E_RESOLVE_ALIAS_CYCLE, "cycle", span(5, 6)));
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn distinct_spans_are_kept() {
        let mut bag = DiagnosticBag::new();
        bag.push(Diagnostic::new(codes::W_UNUSED_ALIAS, "unused", span(5, 6)));
        bag.push(Diagnostic::new(codes::W_UNUSED_ALIAS, "unused", span(7, 8)));
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn finish_orders_by_primary_span_start() {
        let mut bag = DiagnosticBag::new();
        bag.push(Diagnostic::new(codes::W_UNUSED_ALIAS, "b", span(20, 21)));
        bag.push(Diagnostic::new(codes::W_UNUSED_ALIAS, "a", span(5, 6)));
        let out = bag.finish();
        assert_eq!(out[0].message, "a");
        assert_eq!(out[1].message, "b");
    }

    #[test]
    fn code_severity_matches_numbering_range() {
        assert_eq!(codes::E_RESOLVE_ALIAS_CYCLE.severity(), Severity::Error);
        assert_eq!(codes::W_UNUSED_ALIAS.severity(), Severity::Warning);
        assert_eq!(codes::H_UNUSED_SCHEMA.severity(), Severity::Hint);
    }
}
