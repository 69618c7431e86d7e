//! # Paper Catalog
//!
//! Client for a personal research-paper catalog service: list, create, update
//! and delete stored papers, search the OpenAlex index and import from it.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Paper, drafts, external candidates)
//! - [`api`]: The [`PaperApi`] trait, its HTTP client and a scriptable mock
//! - [`ui`]: Paper card, paper list state machine and the app shell
//! - [`config`]: Configuration management

pub mod api;
pub mod config;
pub mod models;
pub mod ui;

// Re-export commonly used types
pub use api::{ApiClient, ApiError, PaperApi};
pub use models::Paper;
pub use ui::{App, LoadState, PaperList};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
