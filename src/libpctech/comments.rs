pub use crate::libpctech::db::StoreError;
use chrono::{DateTime, Local, Utc};
use log::{debug, error, info};
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};
use thiserror::Error;

pub const ANONYMOUS: &str = "Anonymous";
pub const MAX_RATING: u8 = 5;
pub const TOPICS: [&str; 5] = ["General", "Hardware", "Software", "Troubleshooting", "Suggestion"];

pub const SUBMIT_ALERT: &str =
    "Could not post your comment. Check your internet connection and try again.";
pub const DELETE_ALERT: &str = "Could not delete the comment.";
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this comment?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub name: String,
    pub topic: String,
    pub text: String,
    pub rating: u8,
    pub created_at: DateTime<Utc>,
    pub display_time: String,
}

/// A comment as submitted; the store assigns the id and creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub name: String,
    pub topic: String,
    pub text: String,
    pub rating: u8,
    pub display_time: String,
}

/// A live, ordered view of the remote collection. Each message is a full snapshot.
pub struct Feed {
    receiver: Receiver<Vec<Comment>>,
}

impl Feed {
    pub fn new(receiver: Receiver<Vec<Comment>>) -> Self {
        Self { receiver }
    }

    /// Drains everything queued and keeps only the newest snapshot.
    pub fn latest(&self) -> Option<Vec<Comment>> {
        self.receiver.try_iter().last()
    }
}

pub trait CommentStore {
    /// Subscribes to the newest `limit` comments, newest first.
    fn subscribe(&mut self, limit: usize) -> Result<Feed, StoreError>;
    fn add(&mut self, comment: NewComment) -> Result<String, StoreError>;
    fn delete(&mut self, id: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardConfig {
    pub feed_limit: usize,
    pub inline_error_ttl: Duration,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            feed_limit: 50,
            inline_error_ttl: Duration::from_millis(1800),
        }
    }
}

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("comment text is empty")]
    EmptyBody,
    #[error("{}", SUBMIT_ALERT)]
    Transport(#[source] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentForm {
    pub name: String,
    pub topic: String,
    pub text: String,
    pub rating: Option<u8>,
}

impl Default for CommentForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            topic: TOPICS[0].to_string(),
            text: String::new(),
            rating: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardView {
    Form,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled,
    Requested,
    Failed(String),
}

pub struct CommentBoard<S: CommentStore> {
    store: S,
    feed: Feed,
    comments: Vec<Comment>,
    rendered: String,
    pub form: CommentForm,
    view: BoardView,
    inline_error_until: Option<Instant>,
    config: BoardConfig,
}

impl<S: CommentStore> CommentBoard<S> {
    pub fn new(mut store: S, config: BoardConfig) -> Result<Self, StoreError> {
        let feed = store.subscribe(config.feed_limit)?;
        let mut board = Self {
            store,
            feed,
            comments: Vec::new(),
            rendered: render_comments(&[]),
            form: CommentForm::default(),
            view: BoardView::Form,
            inline_error_until: None,
            config,
        };
        board.pump();
        Ok(board)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// The list as HTML, always derived from the latest snapshot.
    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    pub fn view(&self) -> BoardView {
        self.view
    }

    /// Applies the newest queued snapshot, if any. Returns whether the list changed.
    pub fn pump(&mut self) -> bool {
        match self.feed.latest() {
            Some(snapshot) => {
                debug!("[Comments] Rendering {} comment(s).", snapshot.len());
                self.rendered = render_comments(&snapshot);
                self.comments = snapshot;
                true
            }
            None => false,
        }
    }

    pub fn inline_error_visible(&self, now: Instant) -> bool {
        self.inline_error_until.is_some_and(|until| now < until)
    }

    pub fn submit(&mut self, now: Instant) -> Result<String, BoardError> {
        let text = self.form.text.trim();
        if text.is_empty() {
            self.inline_error_until = Some(now + self.config.inline_error_ttl);
            return Err(BoardError::EmptyBody);
        }
        let name = match self.form.name.trim() {
            "" => ANONYMOUS,
            name => name,
        };
        let comment = NewComment {
            name: name.to_string(),
            topic: self.form.topic.clone(),
            text: text.to_string(),
            rating: self.form.rating.unwrap_or(0).min(MAX_RATING),
            display_time: display_time(Local::now()),
        };

        match self.store.add(comment) {
            Ok(id) => {
                info!("[Comments] Posted comment {}", id);
                self.form = CommentForm::default();
                self.view = BoardView::Success;
                self.inline_error_until = None;
                self.pump();
                Ok(id)
            }
            Err(err) => {
                error!("[Comments] Submit error: {}", err);
                Err(BoardError::Transport(err))
            }
        }
    }

    /// Brings the form back after a successful post.
    pub fn show_form(&mut self) {
        self.view = BoardView::Form;
    }

    /// Asks `confirm` first; the list itself only changes through the feed.
    pub fn delete(&mut self, id: &str, confirm: impl FnOnce(&str) -> bool) -> DeleteOutcome {
        if !confirm(DELETE_PROMPT) {
            return DeleteOutcome::Cancelled;
        }
        match self.store.delete(id) {
            Ok(()) => {
                info!("[Comments] Deleted comment {}", id);
                DeleteOutcome::Requested
            }
            Err(err) => {
                error!("[Comments] Delete error: {}", err);
                DeleteOutcome::Failed(DELETE_ALERT.to_string())
            }
        }
    }
}

pub fn display_time(at: DateTime<Local>) -> String {
    at.format("%-d %b, %H:%M").to_string()
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn stars(rating: u8) -> String {
    let filled = rating.min(MAX_RATING) as usize;
    format!(
        "{}{}",
        "★".repeat(filled),
        "☆".repeat(MAX_RATING as usize - filled)
    )
}

pub fn render_comments(comments: &[Comment]) -> String {
    if comments.is_empty() {
        return r#"<div class="comments-empty">No comments yet. Be the first!</div>"#.to_string();
    }
    comments.iter().map(render_comment).collect()
}

fn render_comment(c: &Comment) -> String {
    let name = if c.name.is_empty() { ANONYMOUS } else { c.name.as_str() };
    let rating = if c.rating > 0 {
        format!(r#"<span class="comment-rating">{}</span>"#, stars(c.rating))
    } else {
        String::new()
    };
    format!(
        concat!(
            r#"<div class="comment-item">"#,
            r#"<div class="comment-header">"#,
            r#"<span class="comment-name">👤 {name}</span>"#,
            r#"<div class="comment-meta">{rating}<span class="comment-topic">{topic}</span>"#,
            r#"<button class="comment-delete" data-id="{id}" title="Delete">✕</button></div>"#,
            r#"</div>"#,
            r#"<div class="comment-text">{text}</div>"#,
            r#"<div class="comment-time">🕐 {time}</div>"#,
            r#"</div>"#
        ),
        name = escape_html(name),
        rating = rating,
        topic = escape_html(&c.topic),
        id = escape_html(&c.id),
        text = escape_html(&c.text),
        time = escape_html(&c.display_time),
    )
}
