//! # Error Types
//!
//! Editing operations are total and never fail; these errors cover the
//! operational edges of the crate (catalog files, rasterization, I/O, the
//! HTTP server).

use thiserror::Error;

/// Main error type for tripcard operations
#[derive(Debug, Error)]
pub enum TripcardError {
    /// Unknown template or malformed catalog entry
    #[error("Template error: {0}")]
    Template(String),

    /// Rendering or rasterization failure
    #[error("Render error: {0}")]
    Render(String),

    /// Image decoding, fetching or encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// Server-level errors (bind, serve)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Subscriber installation failure
    #[error("Logging error: {0}")]
    Logging(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
