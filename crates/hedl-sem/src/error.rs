//! Errors raised by the resolver's three passes.
//!
//! Every variant already carries resolved name text rather than a bare
//! [`hedl_util::Symbol`], matching the convention `hedl_par::error::ParseError`
//! uses: by the time an error is worth showing to a caller, the interner
//! that could resolve a symbol may already be several frames away.

use hedl_util::diagnostic::{codes, Diagnostic};
use hedl_util::Span;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("the name '{name}' is already defined")]
    DuplicateName { name: String, span: Span, first: Span },

    #[error("duplicate field '{field}' in schema '{schema}'")]
    DuplicateField { schema: String, field: String, span: Span, first: Span },

    #[error("alias cycle: {}", .path.join(" -> "))]
    AliasCycle { path: Vec<String>, span: Span },

    #[error("unresolved reference '@{path}'")]
    UnresolvedReference { path: String, span: Span },

    #[error("unknown major version {major}")]
    UnknownMajorVersion { major: u32, span: Span },

    #[error("missing required field '{field}' of schema '{schema}'")]
    MissingField { schema: String, field: String, span: Span },

    #[error("unexpected field '{field}', not declared in schema '{schema}'")]
    ExtraField { schema: String, field: String, span: Span },

    #[error("value for field '{field}' does not match its declared type")]
    TypeMismatch { field: String, span: Span },

    #[error("matrix list rows do not share an identical field set")]
    RaggedMatrix { span: Span },

    #[error("field '{field}' is reference-typed; a string literal cannot fill it, use '@name'")]
    ReferenceStringForbidden { field: String, span: Span },

    #[error("an alias value must be a scalar or a reference")]
    AliasValueNotScalar { span: Span },

    #[error("float literal is not finite; NaN and infinite values are forbidden")]
    NonFiniteFloat { span: Span },
}

impl ResolveError {
    pub fn span(&self) -> Span {
        match self {
            ResolveError::DuplicateName { span, .. } => *span,
            ResolveError::DuplicateField { span, .. } => *span,
            ResolveError::AliasCycle { span, .. } => *span,
            ResolveError::UnresolvedReference { span, .. } => *span,
            ResolveError::UnknownMajorVersion { span, .. } => *span,
            ResolveError::MissingField { span, .. } => *span,
            ResolveError::ExtraField { span, .. } => *span,
            ResolveError::TypeMismatch { span, .. } => *span,
            ResolveError::RaggedMatrix { span } => *span,
            ResolveError::ReferenceStringForbidden { span, .. } => *span,
            ResolveError::AliasValueNotScalar { span } => *span,
            ResolveError::NonFiniteFloat { span } => *span,
        }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        let span = self.span();
        let code = match &self {
            ResolveError::DuplicateName { .. } => codes::E_RESOLVE_DUPLICATE_NAME,
            ResolveError::DuplicateField { .. } => codes::E_RESOLVE_DUPLICATE_FIELD,
            ResolveError::AliasCycle { .. } => codes::E_RESOLVE_ALIAS_CYCLE,
            ResolveError::UnresolvedReference { .. } => codes::E_RESOLVE_UNRESOLVED_REFERENCE,
            ResolveError::UnknownMajorVersion { .. } => codes::E_RESOLVE_UNKNOWN_MAJOR_VERSION,
            ResolveError::MissingField { .. } => codes::E_RESOLVE_MISSING_FIELD,
            ResolveError::ExtraField { .. } => codes::E_RESOLVE_EXTRA_FIELD,
            ResolveError::TypeMismatch { .. } => codes::E_RESOLVE_TYPE_MISMATCH,
            ResolveError::RaggedMatrix { .. } => codes::E_RESOLVE_RAGGED_MATRIX,
            ResolveError::ReferenceStringForbidden { .. } => codes::E_RESOLVE_REFERENCE_STRING_FORBIDDEN,
            ResolveError::AliasValueNotScalar { .. } => codes::E_RESOLVE_TYPE_MISMATCH,
            ResolveError::NonFiniteFloat { .. } => codes::E_RESOLVE_NON_FINITE_FLOAT,
        };
        let mut diag = Diagnostic::new(code, self.to_string(), span);
        if let ResolveError::DuplicateName { first, .. } | ResolveError::DuplicateField { first, .. } = &self {
            diag = diag.with_related(*first, "first defined here");
        }
        diag
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;
