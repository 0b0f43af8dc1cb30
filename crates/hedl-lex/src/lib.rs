//! hedl-lex - Lexical analysis for HEDL source.
//!
//! Turns a validated [`hedl_util::Source`] into a flat token stream:
//! directives, the `---` separator, punctuation, scalars, `@`-references
//! and `#`-comments, with `INDENT`/`DEDENT` tokens synthesized from leading
//! whitespace at bracket depth zero.

pub mod cursor;
pub mod error;
pub mod lexer;
pub mod token;

pub use error::{LexError, LexResult};
pub use lexer::Lexer;
pub use token::{Directive, Token, TokenKind};
