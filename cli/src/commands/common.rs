//! Common types and utilities for hedl commands.
//!
//! This module provides shared types, constants, and utility functions
//! used across all command implementations to ensure consistency.

use hedl_util::diagnostic::Diagnostic;

// ============================================================================
// Render Format
// ============================================================================

/// Foreign formats a resolved document can be emitted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFormat {
    Json,
    Yaml,
    Xml,
    Csv,
    Cypher,
    Parquet,
}

impl RenderFormat {
    /// Parse a string into a RenderFormat.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "xml" => Some(Self::Xml),
            "csv" => Some(Self::Csv),
            "cypher" | "graph" => Some(Self::Cypher),
            "parquet" => Some(Self::Parquet),
            _ => None,
        }
    }

    /// Get the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Xml => "xml",
            Self::Csv => "csv",
            Self::Cypher => "cypher",
            Self::Parquet => "parquet",
        }
    }
}

// ============================================================================
// Diagnostic Formatting
// ============================================================================

/// Render a single diagnostic the way a terminal-facing tool does: severity,
/// numeric code, message, and the byte range it anchors to.
pub fn format_diagnostic(diag: &Diagnostic) -> String {
    format!(
        "{} {}: {} (bytes {}..{})",
        diag.severity, diag.code, diag.message, diag.primary_span.start, diag.primary_span.end
    )
}

// ============================================================================
// Error Messages
// ============================================================================

/// Standard error message templates.
pub mod error_messages {
    pub const NO_INPUT_FILES: &str = "No input files specified";
    pub const INPUT_PATH_NOT_EXIST: &str = "Input path does not exist: {}";
    pub const INPUT_PATH_NOT_FILE: &str = "Input path is not a file: {}";
    pub const TARGET_NOT_DIR: &str = "Target path is not a directory: {}";
    pub const DIR_NOT_EMPTY: &str = "Directory is not empty: {}";
    pub const OUTPUT_FILE_EXISTS: &str = "Output file already exists: {}";
    pub const UNKNOWN_FORMAT: &str = "Unknown format: {}";
    pub const INVALID_CONFIG_FORMAT: &str = "Invalid format in configuration: {}";
    pub const FILES_FAILED: &str = "{} file(s) failed to process";
    pub const NO_ROOT_ITEM: &str = "document has no root item named: {}";
}

// ============================================================================
// Output Messages
// ============================================================================

/// Standard output message templates.
pub mod output_messages {
    pub const INFO: &str = "ℹ️ {}";
    pub const WARNING: &str = "⚠️ {}";
    pub const ERROR: &str = "❌ {}";
    pub const CREATED_FILE: &str = "✅ Created file: {}";
    pub const PROCESSING_FILE: &str = "🔄 Processing: {} → {}";
    pub const CONVERTED_FILE: &str = "✅ Converted: {} → {}";
    pub const CONVERSION_COMPLETED: &str = "✅ Conversion completed in {:.2}s";
    pub const FILES_CONVERTED: &str = "📊 Files: {} converted, {} failed";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_format_parses_aliases() {
        assert_eq!(RenderFormat::from_str("YAML"), Some(RenderFormat::Yaml));
        assert_eq!(RenderFormat::from_str("yml"), Some(RenderFormat::Yaml));
        assert_eq!(RenderFormat::from_str("graph"), Some(RenderFormat::Cypher));
        assert_eq!(RenderFormat::from_str("nonsense"), None);
    }

    #[test]
    fn render_format_extension_round_trips() {
        assert_eq!(RenderFormat::from_str("json").unwrap().extension(), "json");
        assert_eq!(RenderFormat::from_str("csv").unwrap().extension(), "csv");
    }
}
