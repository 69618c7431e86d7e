//! In-memory [`PaperApi`] for tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use super::{ApiError, PaperApi};
use crate::models::{ExternalCandidate, Paper, PaperDraft, PaperUpdate};

/// A mock catalog that keeps papers in memory.
///
/// `list_papers` answers from a queue of scripted responses first and falls
/// back to the stored papers once the queue is empty. Lists can be held at a
/// gate to simulate slow responses.
#[derive(Debug, Default)]
pub struct MockPaperApi {
    papers: Mutex<Vec<Paper>>,
    candidates: Mutex<Vec<ExternalCandidate>>,
    list_responses: Mutex<VecDeque<Result<Vec<Paper>, ApiError>>>,
    list_gate: Mutex<Option<Arc<Semaphore>>>,
    list_calls: AtomicUsize,
}

impl MockPaperApi {
    /// Create an empty mock catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock catalog holding the given papers.
    pub fn with_papers(papers: Vec<Paper>) -> Self {
        let mock = Self::new();
        *mock.papers.lock().unwrap() = papers;
        mock
    }

    /// Queue the response for the next `list_papers` call.
    pub fn push_list_response(&self, response: Result<Vec<Paper>, ApiError>) {
        self.list_responses.lock().unwrap().push_back(response);
    }

    /// Set the candidates returned by external searches.
    pub fn set_candidates(&self, candidates: Vec<ExternalCandidate>) {
        *self.candidates.lock().unwrap() = candidates;
    }

    /// Hold every subsequent `list_papers` call until a permit is added to
    /// the returned semaphore.
    pub fn hold_lists(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.list_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Number of `list_papers` calls issued so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Snapshot of the stored papers.
    pub fn papers(&self) -> Vec<Paper> {
        self.papers.lock().unwrap().clone()
    }

    fn next_id(papers: &[Paper]) -> i64 {
        papers.iter().map(|p| p.id).max().unwrap_or(0) + 1
    }

    fn not_found() -> ApiError {
        ApiError::NotFound("Paper not found".to_string())
    }
}

#[async_trait]
impl PaperApi for MockPaperApi {
    async fn list_papers(&self) -> Result<Vec<Paper>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.list_responses.lock().unwrap().pop_front();

        let gate = self.list_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        match scripted {
            Some(response) => response,
            None => Ok(self.papers()),
        }
    }

    async fn get_paper(&self, id: i64) -> Result<Paper, ApiError> {
        self.papers
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(Self::not_found)
    }

    async fn create_paper(&self, draft: &PaperDraft) -> Result<Paper, ApiError> {
        let mut papers = self.papers.lock().unwrap();
        let paper = Paper {
            id: Self::next_id(&papers),
            title: draft.title.clone(),
            authors: draft.authors.clone(),
            year: draft.year,
            r#abstract: draft.r#abstract.clone(),
            notes: draft.notes.clone(),
            url: draft.url.clone(),
        };
        papers.push(paper.clone());
        Ok(paper)
    }

    async fn update_paper(&self, id: i64, update: &PaperUpdate) -> Result<Paper, ApiError> {
        let mut papers = self.papers.lock().unwrap();
        let paper = papers
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(Self::not_found)?;

        if let Some(title) = &update.title {
            paper.title = title.clone();
        }
        if update.authors.is_some() {
            paper.authors = update.authors.clone();
        }
        if update.year.is_some() {
            paper.year = update.year;
        }
        if update.r#abstract.is_some() {
            paper.r#abstract = update.r#abstract.clone();
        }
        if update.notes.is_some() {
            paper.notes = update.notes.clone();
        }
        if update.url.is_some() {
            paper.url = update.url.clone();
        }
        Ok(paper.clone())
    }

    async fn delete_paper(&self, id: i64) -> Result<(), ApiError> {
        let mut papers = self.papers.lock().unwrap();
        let before = papers.len();
        papers.retain(|p| p.id != id);
        if papers.len() == before {
            return Err(Self::not_found());
        }
        Ok(())
    }

    async fn search_external_index(
        &self,
        _query: &str,
        limit: usize,
    ) -> Result<Vec<ExternalCandidate>, ApiError> {
        Ok(self
            .candidates
            .lock()
            .unwrap()
            .iter()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn import_from_external_index(
        &self,
        external_id: &str,
        notes: &str,
    ) -> Result<Paper, ApiError> {
        let candidate = self
            .candidates
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.openalex_id == external_id || c.work_id() == external_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound("Paper not found in OpenAlex".to_string()))?;

        let draft = PaperDraft {
            title: candidate.title.unwrap_or_default(),
            authors: candidate.authors,
            year: candidate.year,
            r#abstract: candidate.r#abstract,
            notes: Some(notes.to_string()),
            url: candidate.url,
        };
        self.create_paper(&draft).await
    }
}

/// Helper function to create a paper for testing.
pub fn make_paper(id: i64, title: &str) -> Paper {
    Paper::new(id, title)
}
