//! Static HTML rendering of the app shell.
//!
//! The markup mirrors the browser client's class names so existing
//! stylesheets keep working. Templates live in `templates/`; text is escaped
//! by askama.

use askama::Template;

use super::app::AppView;
use super::card::CardView;
use super::list::ListView;

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate<'a> {
    header: &'a str,
    main: &'a ListView,
}

#[derive(Template)]
#[template(path = "card.html")]
struct CardTemplate<'a> {
    card: &'a CardView,
}

/// Render a complete HTML document for the shell
pub fn render_page(view: &AppView) -> askama::Result<String> {
    PageTemplate {
        header: view.header,
        main: &view.main,
    }
    .render()
}

/// Render a single card as an HTML fragment
pub fn render_card(card: &CardView) -> askama::Result<String> {
    CardTemplate { card }.render()
}
