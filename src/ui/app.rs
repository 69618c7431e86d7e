//! App shell: a fixed header with the paper list mounted below it.

use std::sync::Arc;
use tokio::task::JoinHandle;

use super::list::{ListView, PaperList};
use crate::api::PaperApi;

/// Header text of the application
pub const APP_TITLE: &str = "Research Paper Manager";

/// Composition root
#[derive(Debug)]
pub struct App {
    list: PaperList,
}

/// Everything the shell shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppView {
    pub header: &'static str,
    pub main: ListView,
}

impl App {
    /// Mount the shell, which mounts the list and starts its first load
    pub fn mount(api: Arc<dyn PaperApi>) -> (Self, JoinHandle<()>) {
        let (list, initial) = PaperList::mount(api);
        (Self { list }, initial)
    }

    /// The mounted list
    pub fn list(&self) -> &PaperList {
        &self.list
    }

    pub fn view(&self) -> AppView {
        AppView {
            header: APP_TITLE,
            main: self.list.view(),
        }
    }
}
