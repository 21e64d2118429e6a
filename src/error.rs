use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the analysis entry points.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// The input was not a text string. This is the only error callers of the
    /// engine have to handle.
    #[error("input must be a text string, got {found}")]
    InvalidInputType { found: &'static str },
    #[error("internal analysis failure: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum TokenizeError {
    #[error("tokenizer unavailable: {0}")]
    Unavailable(String),
    #[error("tokenization failed: {0}")]
    Failed(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown category `{0}` (expected SENSE, THINK, ACT or RELATE)")]
pub struct ParseCategoryError(pub String);
