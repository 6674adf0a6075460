use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while loading a language-configuration file.
///
/// These never escape [`LanguageRegistry`](crate::LanguageRegistry): a failing file is
/// logged and treated as absent.
pub enum LanguageError {
    #[error("I/O error: {0}")]
    /// Reading the configuration file failed.
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    /// The configuration file is not valid JSON.
    Json(#[from] serde_json::Error),

    #[error("invalid blockComment for '{0}': expected a [start, end] pair")]
    /// `blockComment` was present but not a two-element string array.
    InvalidBlockComment(String),
}
