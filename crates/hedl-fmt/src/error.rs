//! Failures the canonicalizer can raise.
//!
//! A resolved [`hedl_model::Document`] is, by construction, always
//! representable in canonical form -- the resolver already rejected `NaN`,
//! `±∞` and out-of-range integers before a `Document` could exist. This
//! type exists so a `Canonicalize` error code is available to report
//! through, for a host that feeds the canonicalizer a document built by
//! hand rather than through `hedl-sem`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("float value is not finite and cannot be canonicalized")]
    NonFiniteFloat,
}

pub type FormatResult<T> = Result<T, FormatError>;
