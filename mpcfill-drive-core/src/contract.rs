//! # contract: the page-fetching seam
//!
//! This module defines the single trait ([`PageFetcher`]) through which the listing
//! and traversal code reaches the network, plus its error type.
//!
//! ## Interface & Extensibility
//! - Implement [`PageFetcher`] to plug in a different transport (the default is
//!   [`crate::fetch::HttpFetcher`]).
//! - The method is async and returns the page body as text, or a [`FetchError`].
//! - A non-2xx response is an error; an empty or odd body is not.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall` so tests can serve canned HTML per URL
//!   without touching the network. The mock is exported behind the
//!   `test-export-mocks` feature for use by the CLI crate's tests.

use async_trait::async_trait;
use thiserror::Error;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Network-level failure for one page request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("could not build HTTP client: {0}")]
    Client(String),
}

/// Fetches a public page and returns its body.
///
/// Implementations must not retry; callers decide what a failure means
/// (fatal for the traversal root, logged and skipped for subfolders).
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}
