//! Shared error types for crates that have no diagnostic context of their
//! own to report into (see [`crate::diagnostic`] for the span-anchored
//! engine used once a [`crate::source::Source`] exists).

use thiserror::Error;

/// Failures raised while turning raw bytes into a [`crate::source::Source`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("input is not valid UTF-8 (first invalid byte at offset {offset})")]
    InvalidUtf8 { offset: usize },
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Failures raised while resolving an `Idx` against an `IndexVec` built
/// from untrusted input (e.g. an FFI caller passing a stale ordinal).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("index {index} out of bounds (len {len})")]
    OutOfBounds { index: usize, len: usize },
}

pub type IndexResult<T> = Result<T, IndexError>;
