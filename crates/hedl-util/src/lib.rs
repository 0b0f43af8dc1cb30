//! hedl-util - Foundation types shared across the HEDL engine.
//!
//! Every other crate in the workspace depends on this one. It carries the
//! pieces that have no opinion about HEDL grammar or semantics: source
//! location tracking ([`span`]), UTF-8 source ingestion ([`source`]),
//! string interning ([`symbol`]), typed dense-index storage ([`index`]) and
//! the diagnostic engine ([`diagnostic`]).

pub mod diagnostic;
pub mod error;
pub mod index;
pub mod source;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, DiagnosticBag, DiagnosticCode, Severity};
pub use index::{Idx, IndexVec};
pub use source::Source;
pub use span::{FileId, Span};
pub use symbol::Symbol;

pub use rustc_hash::{FxHashMap, FxHashSet};
