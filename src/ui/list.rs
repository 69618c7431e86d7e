//! Paper list: owns the load lifecycle and renders a grid of cards.
//!
//! ```text
//!            mount / reload
//!                 │
//!                 ▼
//!   retry ──▶  Loading ──ok──▶ Ready(papers)
//!     ▲           │
//!     └── Error ◀─┘ err
//! ```
//!
//! Each load is tagged with a generation number. Only the result of the most
//! recent load is applied; results from superseded loads, or loads that finish
//! after the list was dropped, are discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::card::{render_card, CardView};
use crate::api::PaperApi;
use crate::models::Paper;

/// Shown while a load is in flight
pub const LOADING_MESSAGE: &str = "Loading papers...";

/// Shown when the catalog holds no papers
pub const EMPTY_MESSAGE: &str = "No papers found. Add some papers to get started!";

/// Label of the retry control
pub const RETRY_LABEL: &str = "Retry";

/// Client-side state of the paper fetch
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Error(String),
    Ready(Vec<Paper>),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LoadState::Error(_))
    }
}

/// What the list shows for a given state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    Loading { message: &'static str },
    Error { message: String, retry_label: &'static str },
    Empty { message: &'static str },
    Grid { heading: String, cards: Vec<CardView> },
}

impl ListView {
    /// Map a load state to its view
    pub fn from_state(state: &LoadState) -> Self {
        match state {
            LoadState::Loading => ListView::Loading {
                message: LOADING_MESSAGE,
            },
            LoadState::Error(message) => ListView::Error {
                message: message.clone(),
                retry_label: RETRY_LABEL,
            },
            LoadState::Ready(papers) if papers.is_empty() => ListView::Empty {
                message: EMPTY_MESSAGE,
            },
            LoadState::Ready(papers) => ListView::Grid {
                heading: format!("Your Papers ({})", papers.len()),
                cards: papers.iter().map(render_card).collect(),
            },
        }
    }
}

/// The mounted paper list.
///
/// Dropping the list unmounts it: any in-flight load is cancelled and its
/// result never reaches the state.
#[derive(Debug)]
pub struct PaperList {
    api: Arc<dyn PaperApi>,
    state: Arc<watch::Sender<LoadState>>,
    generation: Arc<AtomicU64>,
    lifetime: CancellationToken,
}

impl PaperList {
    /// Mount the list and start the initial load.
    ///
    /// Must be called from within a tokio runtime. The returned handle
    /// completes when the initial load has settled.
    pub fn mount(api: Arc<dyn PaperApi>) -> (Self, JoinHandle<()>) {
        let (state, _) = watch::channel(LoadState::Loading);
        let list = Self {
            api,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            lifetime: CancellationToken::new(),
        };
        let initial = list.spawn_load();
        (list, initial)
    }

    /// Re-enter `Loading` and fetch again, superseding any load in flight.
    pub fn reload(&self) -> JoinHandle<()> {
        self.spawn_load()
    }

    /// Retry after a failed load.
    ///
    /// Only valid from the error state; returns `None` otherwise.
    pub fn retry(&self) -> Option<JoinHandle<()>> {
        if !self.state.borrow().is_error() {
            tracing::debug!("retry ignored; list is not in the error state");
            return None;
        }
        Some(self.spawn_load())
    }

    /// Snapshot of the current state
    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    /// Watch state transitions
    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state.subscribe()
    }

    /// Current view
    pub fn view(&self) -> ListView {
        ListView::from_state(&self.state.borrow())
    }

    /// Unmount the list, discarding any load still in flight
    pub fn unmount(self) {}

    fn spawn_load(&self) -> JoinHandle<()> {
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = LoadState::Loading;
        });

        let api = self.api.clone();
        let state = self.state.clone();
        let current = self.generation.clone();
        let lifetime = self.lifetime.clone();

        tokio::spawn(async move {
            tracing::debug!(generation, "loading papers");

            let outcome = tokio::select! {
                biased;
                _ = lifetime.cancelled() => {
                    tracing::debug!(generation, "list unmounted; abandoning load");
                    return;
                }
                outcome = api.list_papers() => outcome,
            };

            let next = match outcome {
                Ok(papers) => {
                    tracing::debug!(generation, count = papers.len(), "papers loaded");
                    LoadState::Ready(papers)
                }
                Err(err) => LoadState::Error(err.to_string()),
            };

            let applied = state.send_if_modified(|slot| {
                if lifetime.is_cancelled() || current.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *slot = next;
                true
            });

            if !applied {
                tracing::trace!(generation, "discarding result of superseded load");
            }
        })
    }
}

impl Drop for PaperList {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::make_paper;
    use crate::api::{ApiError, MockPaperApi};

    fn mock() -> Arc<MockPaperApi> {
        Arc::new(MockPaperApi::new())
    }

    #[tokio::test]
    async fn test_initial_state_is_loading() {
        let api = mock();
        let gate = api.hold_lists();
        let (list, handle) = PaperList::mount(api.clone());

        assert_eq!(list.state(), LoadState::Loading);
        assert_eq!(
            list.view(),
            ListView::Loading {
                message: LOADING_MESSAGE
            }
        );

        gate.add_permits(1);
        handle.await.unwrap();
        assert_eq!(api.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_load_shows_message_not_grid() {
        let api = mock();
        api.push_list_response(Ok(Vec::new()));

        let (list, handle) = PaperList::mount(api.clone());
        handle.await.unwrap();

        assert_eq!(list.state(), LoadState::Ready(Vec::new()));
        assert_eq!(
            list.view(),
            ListView::Empty {
                message: EMPTY_MESSAGE
            }
        );
    }

    #[tokio::test]
    async fn test_loaded_papers_render_in_order() {
        let papers = vec![make_paper(3, "Third"), make_paper(1, "First"), make_paper(2, "Second")];
        let api = mock();
        api.push_list_response(Ok(papers.clone()));

        let (list, handle) = PaperList::mount(api.clone());
        handle.await.unwrap();

        match list.view() {
            ListView::Grid { heading, cards } => {
                assert_eq!(heading, "Your Papers (3)");
                assert_eq!(cards.len(), papers.len());
                let titles: Vec<_> = cards.iter().map(|c| c.title.as_str()).collect();
                assert_eq!(titles, vec!["Third", "First", "Second"]);
                let ids: Vec<_> = cards.iter().map(|c| c.id).collect();
                assert_eq!(ids, vec![3, 1, 2]);
            }
            other => panic!("expected grid, got {:?}", other),
        }
        assert_eq!(api.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_shows_error_and_retry_issues_one_call() {
        let api = mock();
        api.push_list_response(Err(ApiError::Status {
            status: 500,
            message: "database unavailable".to_string(),
        }));
        api.push_list_response(Ok(vec![make_paper(1, "Recovered")]));

        let (list, handle) = PaperList::mount(api.clone());
        handle.await.unwrap();

        assert_eq!(
            list.view(),
            ListView::Error {
                message: "database unavailable".to_string(),
                retry_label: RETRY_LABEL
            }
        );
        assert_eq!(api.list_calls(), 1);

        let retry = list.retry().expect("retry is offered from the error state");
        retry.await.unwrap();

        assert_eq!(api.list_calls(), 2);
        assert_eq!(list.state(), LoadState::Ready(vec![make_paper(1, "Recovered")]));
    }

    #[tokio::test]
    async fn test_retry_reenters_loading() {
        let api = mock();
        api.push_list_response(Err(ApiError::Network("connection refused".to_string())));

        let (list, handle) = PaperList::mount(api.clone());
        handle.await.unwrap();
        assert!(list.state().is_error());

        let gate = api.hold_lists();
        let retry = list.retry().unwrap();
        assert_eq!(list.state(), LoadState::Loading);

        gate.add_permits(1);
        retry.await.unwrap();
        assert_eq!(list.state(), LoadState::Ready(Vec::new()));
    }

    #[tokio::test]
    async fn test_retry_outside_error_state_is_ignored() {
        let api = mock();
        let (list, handle) = PaperList::mount(api.clone());
        handle.await.unwrap();

        assert!(list.retry().is_none());
        assert_eq!(api.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_superseded_load_is_discarded() {
        let api = mock();
        api.push_list_response(Ok(vec![make_paper(1, "Stale")]));
        api.push_list_response(Ok(vec![make_paper(2, "Fresh")]));
        let gate = api.hold_lists();

        let (list, first) = PaperList::mount(api.clone());
        while api.list_calls() < 1 {
            tokio::task::yield_now().await;
        }
        let second = list.reload();
        while api.list_calls() < 2 {
            tokio::task::yield_now().await;
        }

        gate.add_permits(2);
        first.await.unwrap();
        second.await.unwrap();

        assert_eq!(api.list_calls(), 2);
        assert_eq!(list.state(), LoadState::Ready(vec![make_paper(2, "Fresh")]));
    }

    #[tokio::test]
    async fn test_result_after_unmount_is_discarded() {
        let api = mock();
        api.push_list_response(Ok(vec![make_paper(1, "Late")]));
        let gate = api.hold_lists();

        let (list, handle) = PaperList::mount(api.clone());
        let mut updates = list.subscribe();
        list.unmount();

        gate.add_permits(1);
        handle.await.unwrap();

        assert_eq!(*updates.borrow_and_update(), LoadState::Loading);
        assert!(updates.changed().await.is_err());
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let api = mock();
        api.push_list_response(Ok(vec![make_paper(5, "Watched")]));
        let gate = api.hold_lists();

        let (list, handle) = PaperList::mount(api.clone());
        let mut updates = list.subscribe();

        gate.add_permits(1);
        updates.changed().await.unwrap();
        assert_eq!(*updates.borrow(), LoadState::Ready(vec![make_paper(5, "Watched")]));

        handle.await.unwrap();
    }
}
