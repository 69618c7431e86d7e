//! Client for the catalog service's REST/JSON interface.
//!
//! This module defines the [`PaperApi`] trait that UI components depend on,
//! the HTTP implementation [`ApiClient`], and a scriptable [`MockPaperApi`]
//! for tests.
//!
//! # Routes
//!
//! | Operation | Method | Path |
//! |---|---|---|
//! | [`PaperApi::list_papers`] | GET | `/papers/` |
//! | [`PaperApi::get_paper`] | GET | `/papers/{id}` |
//! | [`PaperApi::create_paper`] | POST | `/papers/` |
//! | [`PaperApi::update_paper`] | PUT | `/papers/{id}` |
//! | [`PaperApi::delete_paper`] | DELETE | `/papers/{id}` |
//! | [`PaperApi::search_external_index`] | POST | `/search` |
//! | [`PaperApi::import_from_external_index`] | POST | `/papers/from-openalex` |
//!
//! Every call is a single attempt: no retries, no cancellation, and no timeout
//! unless one is configured.

mod client;
pub mod mock;

pub use client::ApiClient;
pub use mock::MockPaperApi;

use async_trait::async_trait;

use crate::models::{ExternalCandidate, Paper, PaperDraft, PaperUpdate};

/// Message used when a failed response carries no usable `detail`
pub const FALLBACK_ERROR_MESSAGE: &str = "An error occurred";

pub(crate) const PAPERS_PATH: &str = "/papers/";
pub(crate) const SEARCH_PATH: &str = "/search";
pub(crate) const IMPORT_PATH: &str = "/papers/from-openalex";

pub(crate) fn paper_path(id: i64) -> String {
    format!("/papers/{}", id)
}

/// Operations offered by the catalog service.
#[async_trait]
pub trait PaperApi: Send + Sync + std::fmt::Debug {
    /// List every stored paper, in server order
    async fn list_papers(&self) -> Result<Vec<Paper>, ApiError>;

    /// Fetch one paper
    async fn get_paper(&self, id: i64) -> Result<Paper, ApiError>;

    /// Create a paper; the server assigns its identifier
    async fn create_paper(&self, draft: &PaperDraft) -> Result<Paper, ApiError>;

    /// Update a stored paper
    async fn update_paper(&self, id: i64, update: &PaperUpdate) -> Result<Paper, ApiError>;

    /// Delete a stored paper
    async fn delete_paper(&self, id: i64) -> Result<(), ApiError>;

    /// Search the external index. At most `limit` candidates are returned.
    async fn search_external_index(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ExternalCandidate>, ApiError>;

    /// Have the server fetch an external record and store it as a paper
    async fn import_from_external_index(
        &self,
        external_id: &str,
        notes: &str,
    ) -> Result<Paper, ApiError>;
}

/// Errors returned by the catalog client
///
/// `Status` and `NotFound` display exactly the server's `detail` text (or
/// [`FALLBACK_ERROR_MESSAGE`]), so the message can be shown to users as is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Transport failure: unreachable host, connection reset, timeout
    #[error("{0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The server answered 404
    #[error("{0}")]
    NotFound(String),

    /// A success response whose body does not match the expected schema
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The request could not be built (bad base URL, bad header)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Human-readable message, as shown by the list view
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}
