//! Shared helpers for turning a file on disk into a resolved
//! [`hedl_model::Document`], used by every command that needs one.

use std::path::Path;

use hedl_lex::Lexer;
use hedl_model::Document;
use hedl_par::Parser;
use hedl_sem::resolve;
use hedl_util::symbol::Interner;
use hedl_util::FileId;

use crate::commands::common::format_diagnostic;
use crate::error::{HedlCliError, Result};

/// Read, lex, parse, and resolve `path` into a finalized [`Document`].
///
/// The first hard failure from any phase is reported as a
/// [`HedlCliError::Document`] carrying one rendered diagnostic line,
/// the parser and resolver each propagate only the first hard failure
/// they hit, so there is exactly one to report.
pub fn load_document(path: &Path, strict: bool) -> Result<Document> {
    let bytes = std::fs::read(path)
        .map_err(|e| HedlCliError::FileOperation(format!("{}: {}", path.display(), e)))?;
    let text = String::from_utf8(bytes).map_err(|e| {
        HedlCliError::Document(format!("E0001 error: invalid UTF-8 at byte {}", e.utf8_error().valid_up_to()))
    })?;

    let mut interner = Interner::new();
    let tokens = Lexer::new(&text, FileId::DUMMY, &mut interner)
        .tokenize()
        .map_err(|e| HedlCliError::Document(format_diagnostic(&e.into_diagnostic())))?;
    let ast = Parser::new(tokens, &text, &interner)
        .parse()
        .map_err(|e| HedlCliError::Document(format_diagnostic(&e.into_diagnostic())))?;
    resolve(ast, interner, strict).map_err(|e| HedlCliError::Document(format_diagnostic(&e.into_diagnostic())))
}
