//! Rendered-screen model and the predicates that classify it.
//!
//! Everything here is pure: a [`Frame`] goes in, facts about it come out.
//! The driver decides what to do with those facts.

mod activity;
mod classify;
mod echo;
mod prompt_box;

use std::time::Instant;

pub use activity::is_activity_row;
pub use classify::{classify, Classification, Classifier, FrameState};
pub use echo::{squash, EchoMatcher, EchoSpan};
pub use prompt_box::{find_prompt_boxes, BorderStyle, PromptBox};

/// One captured screen, immutable once taken.
#[derive(Debug, Clone)]
pub struct Frame {
    text: String,
    captured_at: Instant,
}

impl Frame {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            captured_at: Instant::now(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn rows(&self) -> Vec<&str> {
        self.text.lines().collect()
    }

    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }
}
