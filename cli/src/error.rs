//! Error handling module for the hedl CLI.
//!
//! This module provides custom error types using `thiserror` for structured
//! error handling throughout the application.

use thiserror::Error;

/// Main error type for the hedl CLI application.
///
/// This enum represents all possible errors that can occur
/// during the execution of hedl commands.
#[derive(Error, Debug)]
pub enum HedlCliError {
    /// Error when a required configuration is missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error when file operations fail.
    #[error("File operation failed: {0}")]
    FileOperation(String),

    /// Error when input validation fails.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error when a command execution fails.
    #[error("Command execution failed: {0}")]
    CommandExecution(String),

    /// A lexical, syntactic, or semantic failure while processing a
    /// document, already rendered to a single diagnostic line.
    #[error("{0}")]
    Document(String),

    /// Error raised by a foreign-format renderer.
    #[error("render error: {0}")]
    Render(#[from] hedl_render::RenderError),

    /// Error when IO operations fail.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error when JSON serialization/deserialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error when the config file is not valid TOML.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias using HedlCliError.
pub type Result<T> = std::result::Result<T, HedlCliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = HedlCliError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_file_operation_error_display() {
        let err = HedlCliError::FileOperation("permission denied".to_string());
        assert_eq!(err.to_string(), "File operation failed: permission denied");
    }

    #[test]
    fn test_validation_error_display() {
        let err = HedlCliError::Validation("invalid format".to_string());
        assert_eq!(err.to_string(), "Validation error: invalid format");
    }

    #[test]
    fn test_command_execution_error_display() {
        let err = HedlCliError::CommandExecution("exit code 1".to_string());
        assert_eq!(err.to_string(), "Command execution failed: exit code 1");
    }

    #[test]
    fn test_document_error_display() {
        let err = HedlCliError::Document("E0001: invalid utf-8".to_string());
        assert_eq!(err.to_string(), "E0001: invalid utf-8");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: HedlCliError = io_err.into();
        assert!(matches!(cli_err, HedlCliError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let cli_err: HedlCliError = json_err.into();
        assert!(matches!(cli_err, HedlCliError::Json(_)));
    }
}
