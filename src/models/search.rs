//! External index search and import models.

use serde::{Deserialize, Serialize};

/// Default number of candidates requested from the external index
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Prefix the external index uses for canonical work identifiers
pub const OPENALEX_ID_PREFIX: &str = "https://openalex.org/";

/// Body of a `POST /search` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalSearchRequest {
    /// Search term matched against title, abstract and fulltext
    pub query: String,

    /// Maximum number of candidates to return
    pub limit: usize,
}

impl ExternalSearchRequest {
    /// Create a new search request with the default limit
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Set the result limit
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// A paper found in the external index that has not been imported yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalCandidate {
    /// External index identifier (full URL form)
    pub openalex_id: String,

    #[serde(default)]
    pub title: Option<String>,

    /// Authors, comma-separated (the server keeps the first five)
    #[serde(default)]
    pub authors: Option<String>,

    #[serde(default)]
    pub year: Option<i32>,

    #[serde(default)]
    pub r#abstract: Option<String>,

    /// DOI link when known, else the index page
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub cited_by_count: u64,
}

impl ExternalCandidate {
    /// Short work identifier (`W123...`) without the index URL prefix
    pub fn work_id(&self) -> &str {
        self.openalex_id
            .strip_prefix(OPENALEX_ID_PREFIX)
            .unwrap_or(&self.openalex_id)
    }
}

/// Search results as returned by the service.
///
/// The service answers with a `{results, count}` envelope; a bare array is
/// accepted as well.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SearchResults {
    List(Vec<ExternalCandidate>),
    Envelope {
        results: Vec<ExternalCandidate>,
        #[serde(default)]
        count: Option<usize>,
    },
}

impl SearchResults {
    /// Flatten into the candidate list, keeping server order
    pub fn into_candidates(self) -> Vec<ExternalCandidate> {
        match self {
            SearchResults::List(results) => results,
            SearchResults::Envelope { results, .. } => results,
        }
    }
}

/// Body of a `POST /papers/from-openalex` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRequest {
    pub openalex_id: String,
    #[serde(default)]
    pub notes: String,
}

impl ImportRequest {
    pub fn new(openalex_id: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            openalex_id: openalex_id.into(),
            notes: notes.into(),
        }
    }
}
