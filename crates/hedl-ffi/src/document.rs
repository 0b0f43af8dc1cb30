//! The opaque `HedlDocument` handle and the parse/validate entry points
//! that produce it, wiring the source reader, lexer, parser and resolver
//! together behind one entry point.

use hedl_lex::Lexer;
use hedl_model::Document;
use hedl_par::Parser;
use hedl_sem::resolve;
use hedl_util::diagnostic::Diagnostic;
use hedl_util::symbol::Interner;
use hedl_util::{FileId, Source};

use crate::error::HedlStatus;
use crate::last_error;

/// Opaque across the FFI boundary; callers only ever hold a pointer to
/// one of these, obtained from [`crate::hedl_parse`] and released through
/// [`crate::hedl_free_document`].
pub struct HedlDocument {
    pub(crate) doc: Document,
}

/// Distinct from null so a double-release is detectable rather than
/// dereferencing freed memory.
pub(crate) const POISON: usize = usize::MAX;

pub(crate) fn poison() -> *mut HedlDocument {
    POISON as *mut HedlDocument
}

pub(crate) fn is_live(ptr: *const HedlDocument) -> bool {
    !ptr.is_null() && ptr as usize != POISON
}

pub(crate) unsafe fn borrow<'a>(ptr: *const HedlDocument) -> Option<&'a Document> {
    if is_live(ptr) {
        Some(&(*ptr).doc)
    } else {
        None
    }
}

fn diagnostic_message(diag: Diagnostic) -> String {
    format!("{} {}: {} (bytes {}..{})", diag.severity, diag.code, diag.message, diag.primary_span.start, diag.primary_span.end)
}

/// Parses and resolves `text`, producing a finalized [`Document`] or the
/// first hard failure; no multi-error collection in hard mode.
pub(crate) fn parse_document(text: &str, strict: bool) -> Result<Document, HedlStatus> {
    let mut interner = Interner::new();
    let tokens = Lexer::new(text, FileId::DUMMY, &mut interner).tokenize().map_err(|e| {
        last_error::set(diagnostic_message(e.into_diagnostic()));
        HedlStatus::Parse
    })?;
    let ast = Parser::new(tokens, text, &interner).parse().map_err(|e| {
        last_error::set(diagnostic_message(e.into_diagnostic()));
        HedlStatus::Parse
    })?;
    resolve(ast, interner, strict).map_err(|e| {
        last_error::set(diagnostic_message(e.into_diagnostic()));
        HedlStatus::Parse
    })
}

/// Validates `bytes` as UTF-8 before lexing rather than relying on the
/// lexer to reject invalid bytes incidentally.
pub(crate) fn decode_input(bytes: &[u8]) -> Result<String, HedlStatus> {
    let source = Source::new(FileId::DUMMY, bytes).map_err(|e| {
        last_error::set(e.to_string());
        HedlStatus::InvalidUtf8
    })?;
    Ok(source.text().to_owned())
}
