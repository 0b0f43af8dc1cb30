use hedl_util::diagnostic::{codes, Diagnostic};
use hedl_util::Span;
use thiserror::Error;

/// A hard lexical failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("unterminated string literal")]
    UnterminatedString { span: Span },

    #[error("invalid escape sequence '\\{found}'")]
    InvalidEscape { found: char, span: Span },

    #[error("unterminated reference")]
    UnterminatedReference { span: Span },

    #[error("numeric literal out of range")]
    NumericOutOfRange { span: Span },

    #[error("malformed \\u escape")]
    MalformedUnicodeEscape { span: Span },

    #[error("indentation mixes tabs and spaces")]
    MixedIndent { span: Span },

    #[error("unknown directive '%{found}'")]
    UnknownDirective { found: String, span: Span },

    #[error("unexpected character '{found}'")]
    UnexpectedCharacter { found: char, span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnterminatedString { span }
            | LexError::InvalidEscape { span, .. }
            | LexError::UnterminatedReference { span }
            | LexError::NumericOutOfRange { span }
            | LexError::MalformedUnicodeEscape { span }
            | LexError::MixedIndent { span }
            | LexError::UnknownDirective { span, .. }
            | LexError::UnexpectedCharacter { span, .. } => *span,
        }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        let span = self.span();
        let code = match &self {
            LexError::UnterminatedString { .. } => codes::E_LEX_UNTERMINATED_STRING,
            LexError::InvalidEscape { .. } => codes::E_LEX_INVALID_ESCAPE,
            LexError::UnterminatedReference { .. } => codes::E_LEX_UNTERMINATED_REFERENCE,
            LexError::NumericOutOfRange { .. } => codes::E_LEX_NUMERIC_OUT_OF_RANGE,
            LexError::MalformedUnicodeEscape { .. } => codes::E_LEX_MALFORMED_UNICODE_ESCAPE,
            LexError::MixedIndent { .. } => codes::E_LEX_MIXED_INDENT,
            LexError::UnknownDirective { .. } => codes::E_LEX_UNKNOWN_DIRECTIVE,
            LexError::UnexpectedCharacter { .. } => codes::E_PARSE_UNEXPECTED_TOKEN,
        };
        Diagnostic::new(code, self.to_string(), span)
    }
}

pub type LexResult<T> = Result<T, LexError>;
