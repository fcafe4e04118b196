use crate::libpctech::clipboard::Clipboard;
use chrono::NaiveDate;
use log::{debug, warn};
use std::time::{Duration, Instant};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ThemeToggle {
    light: bool,
}

/// The brief overlay flashed while the theme changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ripple {
    pub color: &'static str,
}

impl ThemeToggle {
    pub fn is_light(&self) -> bool {
        self.light
    }

    pub fn label(&self) -> &'static str {
        if self.light {
            "Light Mode"
        } else {
            "Dark Mode"
        }
    }

    /// Flips the theme. The ripple is tinted by the mode being left.
    pub fn toggle(&mut self) -> Ripple {
        let color = if self.light {
            "rgba(10,15,30,0.18)"
        } else {
            "rgba(255,255,255,0.18)"
        };
        self.light = !self.light;
        debug!("[Setup] Theme is now {}", self.label());
        Ripple { color }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FontToggle {
    zawgyi: bool,
}

impl FontToggle {
    pub fn is_zawgyi(&self) -> bool {
        self.zawgyi
    }

    pub fn label(&self) -> &'static str {
        if self.zawgyi {
            "🌐 Zawgyi"
        } else {
            "🌐 Unicode"
        }
    }

    pub fn toggle(&mut self) {
        self.zawgyi = !self.zawgyi;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    y: f64,
    threshold: f64,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new(300.0)
    }
}

impl ScrollState {
    pub fn new(threshold: f64) -> Self {
        Self { y: 0.0, threshold }
    }

    pub fn on_scroll(&mut self, y: f64) -> bool {
        self.y = y;
        self.back_to_top_visible()
    }

    pub fn back_to_top_visible(&self) -> bool {
        self.y > self.threshold
    }

    pub fn scroll_to_top(&mut self) {
        self.y = 0.0;
    }

    pub fn position(&self) -> f64 {
        self.y
    }
}

pub fn footer_updated(date: NaiveDate) -> String {
    format!("Last updated: {}", date.format("%-d %B %Y"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMethod {
    Clipboard,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyButton {
    copied_until: Option<Instant>,
    feedback_ttl: Duration,
}

impl Default for CopyButton {
    fn default() -> Self {
        Self {
            copied_until: None,
            feedback_ttl: Duration::from_secs(2),
        }
    }
}

impl CopyButton {
    pub fn is_copied(&self, now: Instant) -> bool {
        self.copied_until.is_some_and(|until| now < until)
    }

    pub fn label(&self, now: Instant) -> &'static str {
        if self.is_copied(now) {
            "✓ Copied!"
        } else {
            "⧉ Copy"
        }
    }

    /// Tries `primary`, then `fallback`. Either way the button shows its
    /// copied state, as the manual fallback cannot report failure reliably.
    pub fn copy_text(
        &mut self,
        text: &str,
        primary: &mut dyn Clipboard,
        fallback: &mut dyn Clipboard,
        now: Instant,
    ) -> CopyMethod {
        let method = match primary.write_text(text) {
            Ok(()) => CopyMethod::Clipboard,
            Err(err) => {
                debug!("[Copy] Clipboard failed ({}), using fallback.", err);
                if let Err(err) = fallback.write_text(text) {
                    warn!("[Copy] Fallback copy failed: {}", err);
                }
                CopyMethod::Fallback
            }
        };
        self.copied_until = Some(now + self.feedback_ttl);
        method
    }
}
