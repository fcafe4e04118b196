use crate::libpctech::content::{ContentCard, Matcher};
use log::{debug, warn};
use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub debounce: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(80),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    All,
    Tag(String),
}

impl Category {
    pub fn parse(tag: &str) -> Category {
        if tag.eq_ignore_ascii_case("all") {
            Category::All
        } else {
            Category::Tag(tag.to_string())
        }
    }

    fn admits(&self, card: &ContentCard) -> bool {
        match self {
            Category::All => true,
            Category::Tag(tag) => card.category == *tag,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::All => write!(f, "all"),
            Category::Tag(tag) => write!(f, "{}", tag),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub category: Category,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub any_visible: bool,
    /// Set when a non-empty query hid every card.
    pub no_results: Option<String>,
}

pub struct SearchEngine {
    cards: Vec<ContentCard>,
    tabs: Vec<Tab>,
    active_category: Category,
    query: String,
    has_value: bool,
    pending: Option<Instant>,
    config: SearchConfig,
}

impl SearchEngine {
    pub fn new(cards: Vec<ContentCard>, config: SearchConfig) -> Self {
        let mut tabs = vec![Tab {
            category: Category::All,
            active: true,
        }];
        for card in &cards {
            let category = Category::Tag(card.category.clone());
            if !tabs.iter().any(|t| t.category == category) {
                tabs.push(Tab {
                    category,
                    active: false,
                });
            }
        }
        Self {
            cards,
            tabs,
            active_category: Category::All,
            query: String::new(),
            has_value: false,
            pending: None,
            config,
        }
    }

    pub fn cards(&self) -> &[ContentCard] {
        &self.cards
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active_category(&self) -> &Category {
        &self.active_category
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether the search bar shows its "has value" ring.
    pub fn has_value(&self) -> bool {
        self.has_value
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Records a keystroke. The filter pass is deferred until `poll` is called
    /// at least one debounce interval after the last keystroke.
    pub fn set_query(&mut self, raw: &str, now: Instant) {
        self.query = raw.trim().to_string();
        self.has_value = !self.query.is_empty();
        self.pending = Some(now + self.config.debounce);
    }

    pub fn poll(&mut self, now: Instant) -> Option<SearchOutcome> {
        match self.pending {
            Some(due) if now >= due => {
                self.pending = None;
                let query = self.query.clone();
                Some(self.apply_filter(&query))
            }
            _ => None,
        }
    }

    /// Switches tabs and filters right away with the current query, dropping
    /// any pending debounced pass. Unknown categories are ignored.
    pub fn set_category(&mut self, category: Category) -> Option<SearchOutcome> {
        if !self.tabs.iter().any(|t| t.category == category) {
            warn!("[Search] Unknown category {}", category);
            return None;
        }
        for tab in self.tabs.iter_mut() {
            tab.active = tab.category == category;
        }
        self.active_category = category;
        self.pending = None;
        let query = self.query.clone();
        Some(self.apply_filter(&query))
    }

    pub fn apply_filter(&mut self, query: &str) -> SearchOutcome {
        let matcher = Matcher::new(query);
        let mut any_visible = false;

        for card in self.cards.iter_mut() {
            if !self.active_category.admits(card) {
                card.visible = false;
                continue;
            }

            let matcher = match &matcher {
                None => {
                    card.visible = true;
                    for section in card.sections.iter_mut() {
                        section.visible = true;
                        section.open = false;
                        section.clear_highlight();
                    }
                    any_visible = true;
                    continue;
                }
                Some(m) => m,
            };

            let mut card_match = false;
            for section in card.sections.iter_mut() {
                if matcher.is_match(&section.text()) {
                    section.visible = true;
                    section.open = true;
                    section.highlight(matcher);
                    card_match = true;
                } else {
                    section.visible = false;
                    section.open = false;
                    section.clear_highlight();
                }
            }

            if !card_match && matcher.is_match(&card.title) {
                card_match = true;
                for section in card.sections.iter_mut() {
                    section.visible = true;
                    section.clear_highlight();
                }
            }

            card.visible = card_match;
            any_visible |= card_match;
        }

        let no_results = if !any_visible && !query.is_empty() {
            Some(format!("No results for \"{}\"", query))
        } else {
            None
        };
        debug!(
            "[Search] {:?} in {}: {} card(s) visible.",
            query,
            self.active_category,
            self.cards.iter().filter(|c| c.visible).count()
        );
        SearchOutcome {
            any_visible,
            no_results,
        }
    }
}
