//! hedl-render -- emit-only adapters from a resolved document to foreign
//! formats. Every renderer here reaches the document
//! exclusively through [`hedl_traverse`]'s read-only Traversal API; none of
//! them touch `hedl-model`'s storage directly.

pub mod cypher;
pub mod error;
pub mod json;
pub mod parquet;
pub mod tabular;
pub mod xml;
pub mod yaml;

pub use error::{RenderError, RenderResult};
