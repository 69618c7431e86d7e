//! Paper card: a pure view of one paper.

use std::borrow::Cow;
use std::fmt;

use crate::models::Paper;

/// Abstracts longer than this many characters are cut in the card preview
pub const ABSTRACT_PREVIEW_CHARS: usize = 300;

/// Marker appended to a truncated abstract
pub const ELLIPSIS: &str = "...";

/// Label of the external link
pub const LINK_LABEL: &str = "View Paper →";

/// Link relationship that keeps the opened page from reaching back to us
pub const LINK_REL: &str = "noopener noreferrer";

/// Links open in a fresh browsing context
pub const LINK_TARGET: &str = "_blank";

/// Renderable content of one paper card.
///
/// Optional sections are `None` when the paper has no value for them (an
/// empty string, or a year of 0, counts as no value); there is no placeholder
/// text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub id: i64,
    pub title: String,
    pub authors: Option<String>,
    pub year: Option<i32>,
    pub abstract_preview: Option<String>,
    pub notes: Option<String>,
    pub link: Option<CardLink>,
}

/// The card's external link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLink {
    pub href: String,
    pub label: &'static str,
}

impl CardLink {
    /// `rel` attribute for HTML anchors
    pub fn rel(&self) -> &'static str {
        LINK_REL
    }

    /// `target` attribute for HTML anchors
    pub fn target(&self) -> &'static str {
        LINK_TARGET
    }

    /// Open the link with the system handler.
    ///
    /// The browser runs as a separate process, so the opened page has no
    /// handle back to this client.
    pub fn open(&self) -> std::io::Result<()> {
        tracing::debug!(href = %self.href, "opening paper link");
        open::that_detached(&self.href)
    }
}

/// Build the card for a paper. The paper itself is left untouched.
pub fn render_card(paper: &Paper) -> CardView {
    CardView {
        id: paper.id,
        title: paper.title.clone(),
        authors: non_empty(&paper.authors),
        year: paper.year.filter(|year| *year != 0),
        abstract_preview: paper
            .r#abstract
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(|text| abstract_preview(text).into_owned()),
        notes: non_empty(&paper.notes),
        link: non_empty(&paper.url).map(|href| CardLink {
            href,
            label: LINK_LABEL,
        }),
    }
}

/// Cut an abstract to [`ABSTRACT_PREVIEW_CHARS`] characters plus an ellipsis.
///
/// Text at or under the limit is returned unchanged.
///
/// # Examples
///
/// ```
/// use paper_catalog::ui::card::abstract_preview;
///
/// assert_eq!(abstract_preview("short"), "short");
/// let long = "a".repeat(301);
/// assert_eq!(abstract_preview(&long), format!("{}...", "a".repeat(300)));
/// ```
pub fn abstract_preview(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(ABSTRACT_PREVIEW_CHARS) {
        Some((cut, _)) => Cow::Owned(format!("{}{}", &text[..cut], ELLIPSIS)),
        None => Cow::Borrowed(text),
    }
}

fn non_empty(field: &Option<String>) -> Option<String> {
    field.as_deref().filter(|s| !s.is_empty()).map(str::to_string)
}

impl fmt::Display for CardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        if let Some(authors) = &self.authors {
            writeln!(f, "Authors: {}", authors)?;
        }
        if let Some(year) = self.year {
            writeln!(f, "Year: {}", year)?;
        }
        if let Some(preview) = &self.abstract_preview {
            writeln!(f, "{}", preview)?;
        }
        if let Some(notes) = &self.notes {
            writeln!(f, "Notes: {}", notes)?;
        }
        if let Some(link) = &self.link {
            writeln!(f, "{} {}", link.label, link.href)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_paper() -> Paper {
        Paper {
            id: 9,
            title: "Deep Residual Learning".to_string(),
            authors: Some("He, Zhang, Ren, Sun".to_string()),
            year: Some(2016),
            r#abstract: Some("Deeper networks are harder to train.".to_string()),
            notes: Some("classic".to_string()),
            url: Some("https://doi.org/10.1109/CVPR.2016.90".to_string()),
        }
    }

    #[test]
    fn test_minimal_card_from_list_payload() {
        let paper: Paper =
            serde_json::from_str(r#"{"id":1,"title":"A","authors":"X","year":2020}"#).unwrap();
        let card = render_card(&paper);

        assert_eq!(card.title, "A");
        assert_eq!(card.authors.as_deref(), Some("X"));
        assert_eq!(card.year, Some(2020));
        assert!(card.abstract_preview.is_none());
        assert!(card.notes.is_none());
        assert!(card.link.is_none());
        assert_eq!(card.to_string(), "A\nAuthors: X\nYear: 2020\n");
    }

    #[test]
    fn test_abstract_boundary() {
        let exact = "x".repeat(300);
        assert_eq!(abstract_preview(&exact), exact.as_str());

        let over = format!("{}y", "x".repeat(300));
        let preview = abstract_preview(&over);
        assert_eq!(preview, format!("{}...", "x".repeat(300)));
        assert_eq!(preview.chars().count(), 303);
    }

    #[test]
    fn test_abstract_counts_characters_not_bytes() {
        let text = "é".repeat(301);
        let preview = abstract_preview(&text);
        assert_eq!(preview, format!("{}...", "é".repeat(300)));

        let text = "é".repeat(300);
        assert_eq!(abstract_preview(&text), text.as_str());
    }

    #[test]
    fn test_render_does_not_mutate_paper() {
        let mut paper = full_paper();
        paper.r#abstract = Some("z".repeat(500));
        let before = paper.clone();

        let card = render_card(&paper);
        assert_eq!(paper, before);
        assert_eq!(card.abstract_preview.unwrap().chars().count(), 303);
    }

    #[test]
    fn test_each_optional_field_suppresses_only_itself() {
        let full = render_card(&full_paper());

        let mut paper = full_paper();
        paper.authors = None;
        assert_eq!(render_card(&paper), CardView { authors: None, ..full.clone() });

        let mut paper = full_paper();
        paper.year = None;
        assert_eq!(render_card(&paper), CardView { year: None, ..full.clone() });

        let mut paper = full_paper();
        paper.r#abstract = None;
        assert_eq!(
            render_card(&paper),
            CardView { abstract_preview: None, ..full.clone() }
        );

        let mut paper = full_paper();
        paper.notes = None;
        assert_eq!(render_card(&paper), CardView { notes: None, ..full.clone() });

        let mut paper = full_paper();
        paper.url = None;
        assert_eq!(render_card(&paper), CardView { link: None, ..full });
    }

    #[test]
    fn test_empty_strings_are_suppressed() {
        let mut paper = full_paper();
        paper.authors = Some(String::new());
        paper.r#abstract = Some(String::new());
        paper.notes = Some(String::new());
        paper.url = Some(String::new());

        let card = render_card(&paper);
        assert!(card.authors.is_none());
        assert!(card.abstract_preview.is_none());
        assert!(card.notes.is_none());
        assert!(card.link.is_none());
        assert_eq!(card.year, Some(2016));
    }

    #[test]
    fn test_zero_year_is_suppressed() {
        let mut paper = full_paper();
        paper.year = Some(0);

        let card = render_card(&paper);
        assert_eq!(card.year, None);
        assert!(!card.to_string().contains("Year:"));
        assert_eq!(paper.year, Some(0));
    }

    #[test]
    fn test_link_is_isolated() {
        let card = render_card(&full_paper());
        let link = card.link.unwrap();
        assert_eq!(link.href, "https://doi.org/10.1109/CVPR.2016.90");
        assert_eq!(link.label, LINK_LABEL);
        assert_eq!(link.rel(), "noopener noreferrer");
        assert_eq!(link.target(), "_blank");
    }
}
