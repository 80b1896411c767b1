//! Structured error types for the Platen invoice engine.
//!
//! Input coercion never fails (malformed numerics become zero at the serde
//! boundary), so the variants here cover the remaining sources: document
//! parsing, font/image loading, rasterization, PDF assembly, and the export
//! precondition gates.

use thiserror::Error;

/// The unified error type returned by all public Platen API functions.
#[derive(Debug, Error)]
pub enum PlatenError {
    /// JSON input failed to parse as an invoice document.
    #[error("failed to parse invoice document: {source}\n  hint: {hint}")]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// A font could not be parsed or is missing required tables.
    #[error("font error: {0}")]
    Font(String),

    /// The signature image could not be decoded.
    #[error("image error: {0}")]
    Image(String),

    /// The export rasterizer failed (allocation, path building).
    #[error("rasterization failed: {0}")]
    Raster(String),

    /// PDF assembly failed (raster encoding, stream writing).
    #[error("PDF assembly failed: {0}")]
    Pdf(String),

    /// Export was requested with zero line items.
    #[error("export requires at least one line item")]
    NoLineItems,

    /// Export was requested without a signature and without the explicit
    /// caller override.
    #[error("export requires a signature; set allow_missing_signature to proceed without one")]
    MissingSignature,

    /// A second export was requested while one is already running.
    #[error("an export is already in flight")]
    ExportInFlight,
}

impl From<serde_json::Error> for PlatenError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the invoice document schema. Check field names and types."
                    .to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input — is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => "The input could not be read.".to_string(),
        };
        PlatenError::Parse { source: e, hint }
    }
}
