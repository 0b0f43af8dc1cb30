//! Token kinds produced by the lexer.

use hedl_util::{Span, Symbol};

/// A directive keyword recognized in the prologue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directive {
    Version,
    Alias,
    Schema,
    Import,
}

/// The lexical category of a token, independent of its span.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// `%VERSION`, `%ALIAS`, `%SCHEMA`, `%IMPORT`.
    Directive(Directive),

    /// `---` on its own line, separating prologue from body.
    Separator,

    /// An unquoted bareword matching `[A-Za-z_][A-Za-z0-9_-]*`.
    ///
    /// Covers identifiers, schema/field/alias names, and the keywords
    /// `true`/`false`/`null`, which the parser distinguishes by text.
    Bareword(Symbol),

    /// A double-quoted string literal, with escapes already resolved.
    String(Symbol),

    /// A decimal integer literal that fits in `i64`.
    Integer(i64),

    /// A decimal float literal (always has a `.` or exponent in source).
    Float(f64),

    /// `@name` or `@schema.field` -- stored as the dotted path text.
    Reference(Symbol),

    Colon,
    Comma,
    Equals,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Dot,
    Question,

    /// A significant newline (statement terminator in block context).
    Newline,

    /// Increase in block indentation.
    Indent,

    /// Decrease in block indentation. Carries the number of levels closed.
    Dedent(u32),

    Eof,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}
