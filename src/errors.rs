//! Error types for storepulse

use thiserror::Error;

use crate::scenario::context::ContextField;

/// Main error type for storepulse
#[derive(Error, Debug)]
pub enum StorepulseError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid argument: {0}")]
    Argument(String),

    /// The response body could not be queried with the given selector.
    /// Non-fatal to the run; the target context field stays empty.
    #[error("Extraction failed for `{selector}` (body starts: {excerpt:?})")]
    Extraction { selector: String, excerpt: String },

    /// A step declared a context field that no earlier step produced.
    /// The one error class that terminates the current iteration.
    #[error("Step `{step}` requires `{field}` but no earlier step produced it")]
    StepPrecondition { step: String, field: ContextField },
}

pub type Result<T> = std::result::Result<T, StorepulseError>;
