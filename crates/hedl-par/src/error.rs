use hedl_util::diagnostic::{codes, Diagnostic};
use hedl_util::Span;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unexpected token: expected {expected}")]
    UnexpectedToken { expected: String, span: Span },

    #[error("unexpected end of input")]
    UnexpectedEof { span: Span },

    #[error("invalid version literal")]
    InvalidVersion { span: Span },

    #[error("multiple %VERSION directives are not permitted")]
    MultipleVersions { span: Span },

    #[error("expected '---' separator after the prologue")]
    MissingSeparator { span: Span },

    #[error(transparent)]
    Lex(#[from] hedl_lex::LexError),
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. } => *span,
            ParseError::UnexpectedEof { span } => *span,
            ParseError::InvalidVersion { span } => *span,
            ParseError::MultipleVersions { span } => *span,
            ParseError::MissingSeparator { span } => *span,
            ParseError::Lex(e) => e.span(),
        }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        if let ParseError::Lex(e) = self {
            return e.into_diagnostic();
        }
        let span = self.span();
        let code = match &self {
            ParseError::UnexpectedToken { .. } => codes::E_PARSE_UNEXPECTED_TOKEN,
            ParseError::UnexpectedEof { .. } => codes::E_PARSE_UNEXPECTED_EOF,
            ParseError::InvalidVersion { .. } => codes::E_PARSE_INVALID_VERSION,
            ParseError::MultipleVersions { .. } => codes::E_PARSE_MULTIPLE_VERSIONS,
            ParseError::MissingSeparator { .. } => codes::E_PARSE_MISSING_SEPARATOR,
            ParseError::Lex(_) => unreachable!(),
        };
        Diagnostic::new(code, self.to_string(), span)
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
