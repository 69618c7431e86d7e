//! Presentation layer.
//!
//! Components produce renderer-independent views ([`AppView`], [`ListView`],
//! [`CardView`]); [`terminal`] and [`html`] turn those views into output.

pub mod app;
pub mod card;
pub mod html;
pub mod list;
pub mod terminal;

pub use app::{App, AppView, APP_TITLE};
pub use card::{render_card, CardLink, CardView};
pub use list::{ListView, LoadState, PaperList};
