use thiserror::Error;

use crate::parser::Dialect;

/// Why a single input dialect produced no markers.
///
/// These never escape `parse_genetic_data`; they drive the fallback from one
/// dialect to the next and are logged at debug level.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FormatError {
    #[error("Invalid JSON format")]
    InvalidJson,

    #[error("Unsupported JSON shape: expected an array or an object keyed by rsid")]
    UnsupportedShape,

    #[error("No valid genetic markers found in {dialect}")]
    NoMarkers { dialect: Dialect },

    #[error("VCF header found but no variant data parsed")]
    VcfHeaderWithoutData,
}

/// Failure of one call to the text-generation collaborator.
#[derive(Debug, Clone, Error)]
pub enum EnrichmentError {
    #[error("Text generation request timed out after {0}s")]
    Timeout(u64),

    #[error("Text generation request failed: {0}")]
    Http(String),

    #[error("Text generation API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode text generation response: {0}")]
    Decode(String),

    #[error("Text generation response contained no text")]
    EmptyResponse,
}

#[derive(Debug, Error)]
pub enum SeraError {
    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),
}

impl From<rusqlite::Error> for SeraError {
    fn from(err: rusqlite::Error) -> Self {
        SeraError::Store(err.to_string())
    }
}

impl From<keyring::Error> for SeraError {
    fn from(err: keyring::Error) -> Self {
        SeraError::Credential(err.to_string())
    }
}
