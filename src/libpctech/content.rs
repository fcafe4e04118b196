use log::{debug, warn};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

const DEFAULT_LIBRARY: &str = include_str!("../../data/library.json");

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("cannot read library file")]
    Read(#[from] std::io::Error),
    #[error("malformed library: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Debug)]
struct LibraryJson {
    cards: Vec<CardJson>,
}
#[derive(Serialize, Deserialize, Debug)]
struct CardJson {
    section: String,
    title: String,
    items: Vec<ItemJson>,
}
#[derive(Serialize, Deserialize, Debug)]
struct ItemJson {
    summary: String,
    paragraphs: Vec<String>,
}

/// A run of text inside a fragment, either plain or wrapped in a highlight marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Mark(String),
}

/// One text node of the page: a summary line or a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    runs: Vec<Inline>,
}

impl Fragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            runs: vec![Inline::Text(text.into())],
        }
    }

    pub fn runs(&self) -> &[Inline] {
        &self.runs
    }

    pub fn text(&self) -> String {
        self.runs
            .iter()
            .map(|run| match run {
                Inline::Text(s) | Inline::Mark(s) => s.as_str(),
            })
            .collect()
    }

    pub fn marks(&self) -> impl Iterator<Item = &str> {
        self.runs.iter().filter_map(|run| match run {
            Inline::Mark(s) => Some(s.as_str()),
            Inline::Text(_) => None,
        })
    }

    fn highlight(&mut self, matcher: &Matcher) {
        self.clear_highlight();
        let text = self.text();
        if !matcher.is_match(&text) {
            return;
        }

        let mut runs = Vec::new();
        let mut last = 0;
        for found in matcher.regex.find_iter(&text) {
            if found.start() > last {
                runs.push(Inline::Text(text[last..found.start()].to_string()));
            }
            runs.push(Inline::Mark(found.as_str().to_string()));
            last = found.end();
        }
        if last < text.len() {
            runs.push(Inline::Text(text[last..].to_string()));
        }
        self.runs = runs;
    }

    /// Unwraps every marker and merges the pieces back into a single run.
    fn clear_highlight(&mut self) {
        if self.runs.len() == 1 && matches!(self.runs[0], Inline::Text(_)) {
            return;
        }
        self.runs = vec![Inline::Text(self.text())];
    }
}

/// Case-insensitive literal substring matcher; the term never acts as a pattern.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
}

impl Matcher {
    /// `None` for an empty term.
    pub fn new(term: &str) -> Option<Matcher> {
        if term.is_empty() {
            return None;
        }
        match RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()
        {
            Ok(regex) => Some(Matcher { regex }),
            Err(err) => {
                warn!("[Search] Cannot build matcher for {:?}: {}", term, err);
                None
            }
        }
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

/// An expandable sub-section of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub summary: Fragment,
    pub paragraphs: Vec<Fragment>,
    pub visible: bool,
    pub open: bool,
}

impl Section {
    pub fn new(summary: &str, paragraphs: &[&str]) -> Self {
        Self {
            summary: Fragment::new(summary),
            paragraphs: paragraphs.iter().map(|p| Fragment::new(*p)).collect(),
            visible: true,
            open: false,
        }
    }

    fn fragments_mut(&mut self) -> impl Iterator<Item = &mut Fragment> {
        std::iter::once(&mut self.summary).chain(self.paragraphs.iter_mut())
    }

    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        std::iter::once(&self.summary).chain(self.paragraphs.iter())
    }

    /// Everything a reader sees when the section is expanded.
    pub fn text(&self) -> String {
        self.fragments()
            .map(Fragment::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Clears previous markers, then marks every occurrence of the term.
    pub fn highlight(&mut self, matcher: &Matcher) {
        self.fragments_mut().for_each(|f| f.highlight(matcher));
    }

    pub fn clear_highlight(&mut self) {
        self.fragments_mut().for_each(Fragment::clear_highlight);
    }

    pub fn is_highlighted(&self) -> bool {
        self.fragments().any(|f| f.marks().next().is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentCard {
    pub category: String,
    pub title: String,
    pub sections: Vec<Section>,
    pub visible: bool,
}

impl ContentCard {
    pub fn new(category: &str, title: &str, sections: Vec<Section>) -> Self {
        Self {
            category: category.to_string(),
            title: title.to_string(),
            sections,
            visible: true,
        }
    }
}

impl From<CardJson> for ContentCard {
    fn from(card: CardJson) -> Self {
        let sections = card
            .items
            .into_iter()
            .map(|item| Section {
                summary: Fragment::new(item.summary),
                paragraphs: item.paragraphs.into_iter().map(Fragment::new).collect(),
                visible: true,
                open: false,
            })
            .collect();
        Self {
            category: card.section,
            title: card.title,
            sections,
            visible: true,
        }
    }
}

pub fn parse_library(json: &str) -> Result<Vec<ContentCard>, LibraryError> {
    let library: LibraryJson = serde_json::from_str(json)?;
    debug!("[Setup] Library holds {} cards.", library.cards.len());
    Ok(library.cards.into_iter().map(ContentCard::from).collect())
}

pub fn default_library() -> Result<Vec<ContentCard>, LibraryError> {
    parse_library(DEFAULT_LIBRARY)
}

pub fn load_library(path: &Path) -> Result<Vec<ContentCard>, LibraryError> {
    let json = std::fs::read_to_string(path)?;
    parse_library(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section() -> Section {
        Section::new(
            "NVMe vs SATA",
            &["A SATA SSD tops out near 550 MB/s.", "An ssd beats any HDD."],
        )
    }

    #[test]
    fn highlight_marks_every_case_insensitive_occurrence() {
        let mut s = section();
        s.highlight(&Matcher::new("ssd").unwrap());

        let marks: Vec<&str> = s.fragments().flat_map(Fragment::marks).collect();
        assert_eq!(marks, vec!["SSD", "ssd"]);
        assert_eq!(
            s.paragraphs[0].runs(),
            &[
                Inline::Text("A SATA ".to_string()),
                Inline::Mark("SSD".to_string()),
                Inline::Text(" tops out near 550 MB/s.".to_string()),
            ]
        );
    }

    #[test]
    fn clearing_restores_original_text() {
        let original = section();
        let mut s = original.clone();
        s.highlight(&Matcher::new("s").unwrap());
        assert!(s.is_highlighted());

        s.clear_highlight();
        assert_eq!(s, original);
    }

    #[test]
    fn highlight_is_idempotent() {
        let matcher = Matcher::new("sata").unwrap();
        let mut once = section();
        once.highlight(&matcher);
        let mut twice = once.clone();
        twice.highlight(&matcher);
        assert_eq!(once, twice);
    }

    #[test]
    fn rehighlighting_replaces_previous_marks() {
        let mut s = section();
        s.highlight(&Matcher::new("sata").unwrap());
        s.highlight(&Matcher::new("hdd").unwrap());
        let marks: Vec<&str> = s.fragments().flat_map(Fragment::marks).collect();
        assert_eq!(marks, vec!["HDD"]);
    }

    #[test]
    fn regex_metacharacters_match_literally() {
        let mut s = Section::new("Ratings", &["80+ Gold (87-92%) vs 80 Bronze"]);
        let matcher = Matcher::new("80+").unwrap();
        assert!(matcher.is_match(&s.text()));
        s.highlight(&matcher);
        let marks: Vec<&str> = s.fragments().flat_map(Fragment::marks).collect();
        assert_eq!(marks, vec!["80+"]);

        assert!(Matcher::new("(87-92%)").unwrap().is_match(&s.text()));
        assert!(!Matcher::new("8.").unwrap().is_match(&s.text()));
    }

    #[test]
    fn empty_term_has_no_matcher() {
        assert!(Matcher::new("").is_none());
    }

    #[test]
    fn default_library_parses() {
        let cards = default_library().unwrap();
        assert!(!cards.is_empty());
        assert!(cards.iter().all(|c| c.visible && !c.sections.is_empty()));
    }

    #[test]
    fn load_library_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        std::fs::write(
            &path,
            r#"{"cards": [{"section": "os", "title": "Linux", "items": [{"summary": "GRUB", "paragraphs": ["Bootloader"]}]}]}"#,
        )
        .unwrap();
        let cards = load_library(&path).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].category, "os");
        assert_eq!(cards[0].sections[0].text(), "GRUB\nBootloader");
    }
}
