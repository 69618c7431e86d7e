//! Styled terminal output for the app shell, cards and search results.

use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;
use std::fmt::Display;
use std::io::IsTerminal;
use std::time::Duration;

use super::app::AppView;
use super::card::CardView;
use super::list::ListView;
use crate::models::ExternalCandidate;

/// Width used when the terminal size cannot be determined.
pub const DEFAULT_WIDTH: usize = 100;

/// Get the current terminal width.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Info,
    Loading,
    Search,
}

/// Status icons for different operations.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Info => "ℹ",
        Status::Loading => "◐",
        Status::Search => "🔍",
    }
}

/// Print a styled status message.
pub fn print_status(status: Status, msg: impl Display) {
    let icon = status_icon(status);
    match status {
        Status::Success => println!("{} {}", icon.green().bold(), msg),
        Status::Error => eprintln!("{} {}", icon.red().bold(), msg),
        Status::Info => println!("{} {}", icon.cyan().bold(), msg),
        Status::Loading => println!("{} {}", icon.cyan(), msg),
        Status::Search => println!("{} {}", icon.yellow(), msg),
    }
}

/// Print the application header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", title.bold().cyan());
    print_divider();
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", format!("━━━ {} ━━━", title).bold().cyan());
}

/// Print a divider line sized to the terminal.
pub fn print_divider() {
    println!("{}", "─".repeat(terminal_width().min(DEFAULT_WIDTH)).dimmed());
}

/// Print the whole shell: header, then the list.
pub fn print_app(view: &AppView) {
    print_header(view.header);
    print_list(&view.main);
}

/// Print the list in whatever state it is in.
pub fn print_list(view: &ListView) {
    match view {
        ListView::Loading { message } => print_status(Status::Loading, message),
        ListView::Error {
            message,
            retry_label,
        } => {
            print_status(Status::Error, format!("Error: {}", message));
            println!("  {}", format!("[{}]", retry_label).yellow());
        }
        ListView::Empty { message } => print_status(Status::Info, message),
        ListView::Grid { heading, cards } => {
            print_section(heading);
            for card in cards {
                print_card(card);
            }
        }
    }
}

/// Print one paper card.
pub fn print_card(card: &CardView) {
    println!();
    println!("{} {}", format!("#{}", card.id).dimmed(), card.title.blue().bold());
    if let Some(authors) = &card.authors {
        println!("  {} {}", "Authors:".bold(), authors);
    }
    if let Some(year) = card.year {
        println!("  {} {}", "Year:".bold(), year.yellow());
    }
    if let Some(preview) = &card.abstract_preview {
        println!("  {}", preview.dimmed());
    }
    if let Some(notes) = &card.notes {
        println!("  {} {}", "Notes:".bold(), notes.italic());
    }
    if let Some(link) = &card.link {
        println!("  {} {}", link.label.cyan(), link.href.underline());
    }
}

/// Build the table of external search candidates.
pub fn candidates_table(candidates: &[ExternalCandidate]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(table_width(terminal_width()))
        .set_header(vec!["ID", "Title", "Authors", "Year", "Cited by"]);

    for candidate in candidates {
        table.add_row(vec![
            Cell::new(candidate.work_id()),
            Cell::new(candidate.title.as_deref().unwrap_or("(untitled)"))
                .add_attribute(Attribute::Bold),
            Cell::new(candidate.authors.as_deref().unwrap_or_default()),
            Cell::new(candidate.year.map(|y| y.to_string()).unwrap_or_default()),
            Cell::new(candidate.cited_by_count),
        ]);
    }
    table
}

/// Clamp a terminal width to what comfy-table accepts.
fn table_width(width: usize) -> u16 {
    u16::try_from(width).unwrap_or(u16::MAX)
}

/// Loading spinner shown while a request is in flight.
pub struct Spinner {
    pb: indicatif::ProgressBar,
}

impl Spinner {
    /// Create a new spinner with the given message.
    pub fn new(msg: &str) -> Self {
        let pb = indicatif::ProgressBar::new_spinner();
        let style = indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ");
        pb.set_style(style);
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// Stop and erase the spinner.
    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}
