//! Error types for the theme module
//!
//! This module defines custom error types using thiserror for better error handling
//! throughout the theme generation pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for theme generation
#[derive(Error, Debug)]
pub enum ThemeError {
    /// IO errors (file reads, output writes, directory access)
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// The external LESS compiler rejected the input or could not be run
    #[error("LESS compilation failed: {message}")]
    Compile { message: String },

    /// Flattening the variable file and its imports failed
    #[error("Failed to bundle {file:?}: {message}")]
    Bundle { file: PathBuf, message: String },

    /// A variable alias chain loops back on itself
    #[error("Cyclic variable alias: {}", .chain.join(" -> "))]
    CyclicAlias { chain: Vec<String> },

    /// A variable alias points at a name that was never declared
    #[error("Variable '{name}' is not declared")]
    UnresolvedAlias { name: String },

    /// Configuration is missing or inconsistent
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// A caller supplied color pattern is not a valid regular expression
    #[error("Invalid color pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Tree-sitter language setup errors
    #[error("Failed to set up CSS parser: {message}")]
    Parser { message: String },
}

/// Result type alias for theme operations
pub type ThemeResult<T> = Result<T, ThemeError>;

impl From<std::io::Error> for ThemeError {
    fn from(err: std::io::Error) -> Self {
        ThemeError::Io {
            source: err,
            message: "IO operation failed".to_string(),
        }
    }
}

/// Helper trait for converting IO errors with context
pub trait IoContext<T> {
    fn with_io_context(self, message: &str) -> ThemeResult<T>;
}

impl<T> IoContext<T> for Result<T, std::io::Error> {
    fn with_io_context(self, message: &str) -> ThemeResult<T> {
        self.map_err(|e| ThemeError::Io {
            message: message.to_string(),
            source: e,
        })
    }
}
