//! Paper model as stored by the catalog service.

use serde::{Deserialize, Serialize};

/// A research paper stored in the catalog
///
/// The client treats a `Paper` as an immutable snapshot of server state: it is
/// never edited in place, only replaced wholesale by the next load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    /// Server-assigned identifier
    pub id: i64,

    /// Paper title
    pub title: String,

    /// Authors (comma-separated, as entered or imported)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,

    /// Publication year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// Abstract text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#abstract: Option<String>,

    /// Personal notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Link to the paper page (DOI or index URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Paper {
    /// Create a paper with only the required fields
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            authors: None,
            year: None,
            r#abstract: None,
            notes: None,
            url: None,
        }
    }

    /// Check the invariants the server guarantees for a stored paper.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err(format!("paper {} has an empty title", self.id));
        }
        Ok(())
    }

    /// Returns the author names as a vector
    pub fn author_list(&self) -> Vec<&str> {
        self.authors
            .as_deref()
            .map(|a| a.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }
}

/// Payload for creating a paper. The server assigns the identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#abstract: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl PaperDraft {
    /// Start a draft builder with the required title
    pub fn builder(title: impl Into<String>) -> PaperDraftBuilder {
        PaperDraftBuilder::new(title)
    }
}

/// Partial update payload. Fields left as `None` are not sent and keep their
/// stored value on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#abstract: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl PaperUpdate {
    /// True when no field would be sent
    pub fn is_empty(&self) -> bool {
        self == &PaperUpdate::default()
    }
}

impl From<PaperDraft> for PaperUpdate {
    fn from(draft: PaperDraft) -> Self {
        Self {
            title: Some(draft.title),
            authors: draft.authors,
            year: draft.year,
            r#abstract: draft.r#abstract,
            notes: draft.notes,
            url: draft.url,
        }
    }
}

/// Builder for constructing [`PaperDraft`] values
#[derive(Debug, Clone)]
pub struct PaperDraftBuilder {
    draft: PaperDraft,
}

impl PaperDraftBuilder {
    /// Create a new builder with the required title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            draft: PaperDraft {
                title: title.into(),
                ..Default::default()
            },
        }
    }

    /// Set authors
    pub fn authors(mut self, authors: impl Into<String>) -> Self {
        self.draft.authors = Some(authors.into());
        self
    }

    /// Set publication year
    pub fn year(mut self, year: i32) -> Self {
        self.draft.year = Some(year);
        self
    }

    /// Set abstract
    pub fn abstract_text(mut self, abstract_text: impl Into<String>) -> Self {
        self.draft.r#abstract = Some(abstract_text.into());
        self
    }

    /// Set notes
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.draft.notes = Some(notes.into());
        self
    }

    /// Set URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.draft.url = Some(url.into());
        self
    }

    /// Build the draft
    pub fn build(self) -> PaperDraft {
        self.draft
    }
}
