//! Command modules for the hedl CLI.
//!
//! This module contains implementations for all available subcommands.
//! Each subcommand is implemented in its own file following a standardized pattern.

pub mod common;
pub mod traits;

pub mod check;
pub mod convert;
pub mod document;
pub mod fmt;
pub mod init;
pub mod lint;

// Re-export command types and functions (used by main.rs)
#[allow(unused_imports)]
pub use check::{run_check, CheckArgs};
#[allow(unused_imports)]
pub use convert::{run_convert, ConvertArgs};
#[allow(unused_imports)]
pub use fmt::{run_fmt, FmtArgs};
#[allow(unused_imports)]
pub use init::{run_init, InitArgs};
#[allow(unused_imports)]
pub use lint::{run_lint, LintArgs};
