//! Core data models for catalog papers and external index records.

mod paper;
mod search;

pub use paper::{Paper, PaperDraft, PaperDraftBuilder, PaperUpdate};
pub use search::{
    ExternalCandidate, ExternalSearchRequest, ImportRequest, SearchResults, DEFAULT_SEARCH_LIMIT,
    OPENALEX_ID_PREFIX,
};
