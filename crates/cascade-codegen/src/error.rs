//! Error types for code generation.

use thiserror::Error;

/// Result type alias for codegen operations.
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors that can occur during code generation.
///
/// Classification and synthesis never fail; these cover reading the
/// declaration feed and writing or formatting the output.
#[derive(Error, Debug)]
pub enum CodegenError {
    /// Malformed type reference in the declaration feed.
    #[error("Invalid type reference '{input}': {message}")]
    InvalidTypeRef {
        input: String,
        message: String,
    },

    /// Declaration feed rejected before classification.
    #[error("Invalid declaration: {0}")]
    InvalidDeclaration(String),

    /// Generated code did not parse back as Rust.
    #[error("Code formatting error: {0}")]
    FormattingError(String),

    /// Build script environment is incomplete.
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
