//! Error taxonomy shared by the scraping and manifest halves of the crate.

use thiserror::Error;

use crate::contract::FetchError;

/// Failures while resolving or listing a Drive resource.
#[derive(Debug, Error)]
pub enum DriveError {
    /// No supported Drive link shape matched the input.
    #[error("invalid Google Drive URL: {0}")]
    InvalidUrl(String),

    /// The page could not be fetched (timeout, transport error, non-2xx status).
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Failures while building, parsing or merging manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("no manifests to combine")]
    EmptyInput,

    #[error("invalid directive '{directive}': {reason}")]
    InvalidDirective { directive: String, reason: String },

    #[error("bracket {bracket} is smaller than the card count {cards}")]
    BracketTooSmall { bracket: u32, cards: usize },

    #[error("manifest XML error: {0}")]
    Xml(String),
}
