//! Error types for configuration parsing and pattern compilation.

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while reading the flattened scan configuration.
pub enum ConfigError {
    #[error("configuration JSON error: {0}")]
    /// The configuration document is not valid JSON or has the wrong shape.
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
/// Errors produced while compiling tag/comment matchers.
pub enum PatternError {
    #[error("regex compile error for pattern '{pattern}': {message}")]
    /// A generated regex pattern failed to compile.
    RegexCompile {
        /// The regex pattern string.
        pattern: String,
        /// The compiler error message.
        message: String,
    },
}

impl PatternError {
    pub(crate) fn compile(pattern: &str, err: regex::Error) -> Self {
        Self::RegexCompile {
            pattern: pattern.to_string(),
            message: err.to_string(),
        }
    }
}
