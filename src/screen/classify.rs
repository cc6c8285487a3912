//! Frame classification.
//!
//! Combines the box, echo, and activity predicates into one verdict per
//! frame. The rules, in order:
//!
//! 1. no prompt box: `Unrecognized`
//! 2. echo inside the box: `Typed`
//! 3. no echo above the box, or the box holds other input: `Unrecognized`
//! 4. activity between echo and box: `Processing`, else `Submitted`

use std::fmt;

use serde::Serialize;

use crate::config::ScreenConfig;
use crate::error::AmbiguousRender;

use super::activity::is_activity_row;
use super::echo::EchoMatcher;
use super::prompt_box::find_prompt_boxes;
use super::Frame;

/// What a single frame says about the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameState {
    Unrecognized,
    Typed,
    Submitted,
    Processing,
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unrecognized => "unrecognized",
            Self::Typed => "typed",
            Self::Submitted => "submitted",
            Self::Processing => "processing",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub state: FrameState,
    /// Rows between the echo and the prompt box, minus activity rows.
    /// Present for `Submitted` and `Processing`.
    pub region: Option<String>,
    pub activity: bool,
    pub prompt_boxes: usize,
    pub ambiguity: Option<AmbiguousRender>,
    /// Text inside the authoritative prompt box, if there is one.
    pub box_content: Option<String>,
}

impl Classification {
    fn unrecognized(prompt_boxes: usize, ambiguity: Option<AmbiguousRender>) -> Self {
        Self {
            state: FrameState::Unrecognized,
            region: None,
            activity: false,
            prompt_boxes,
            ambiguity,
            box_content: None,
        }
    }
}

/// Classifier bound to one query's echo.
#[derive(Debug, Clone)]
pub struct Classifier {
    echo: EchoMatcher,
    screen: ScreenConfig,
}

impl Classifier {
    pub fn new(echo: &str, screen: &ScreenConfig) -> Self {
        Self {
            echo: EchoMatcher::new(echo, screen.echo_prefix_chars, &screen.echo_markers),
            screen: screen.clone(),
        }
    }

    pub fn echo(&self) -> &EchoMatcher {
        &self.echo
    }

    pub fn classify(&self, frame: &Frame) -> Classification {
        let rows = frame.rows();
        let boxes = find_prompt_boxes(&rows, &self.screen);
        let Some(prompt) = boxes.last() else {
            return Classification::unrecognized(0, None);
        };
        let ambiguity = (boxes.len() > 1).then_some(AmbiguousRender {
            prompt_boxes: boxes.len(),
            chosen_top_row: prompt.top,
        });

        let content: Vec<&str> = prompt.content_rows().iter().map(String::as_str).collect();
        let box_content = Some(prompt.content_text());
        // A placeholder may quote the query; it still means an empty box.
        let vacant = prompt.is_vacant(&self.screen.placeholders);
        if !vacant && self.echo.find_in(&content).is_some() {
            return Classification {
                state: FrameState::Typed,
                region: None,
                activity: false,
                prompt_boxes: boxes.len(),
                ambiguity,
                box_content,
            };
        }

        let above = &rows[..prompt.top];
        let Some(span) = self.echo.find_in(above) else {
            return Classification {
                box_content,
                ..Classification::unrecognized(boxes.len(), ambiguity)
            };
        };
        if !vacant {
            return Classification {
                box_content,
                ..Classification::unrecognized(boxes.len(), ambiguity)
            };
        }

        let between = &above[span.last + 1..];
        let activity = between.iter().any(|row| is_activity_row(row, &self.screen));
        let region = response_region(between, &self.screen);
        Classification {
            state: if activity {
                FrameState::Processing
            } else {
                FrameState::Submitted
            },
            region: Some(region),
            activity,
            prompt_boxes: boxes.len(),
            ambiguity,
            box_content,
        }
    }
}

/// One-shot classification without building a reusable [`Classifier`].
pub fn classify(frame: &Frame, echo: &str, screen: &ScreenConfig) -> Classification {
    Classifier::new(echo, screen).classify(frame)
}

fn response_region(rows: &[&str], screen: &ScreenConfig) -> String {
    let kept: Vec<&str> = rows
        .iter()
        .filter(|row| !is_activity_row(row, screen))
        .map(|row| row.trim_end())
        .collect();
    let Some(start) = kept.iter().position(|row| !row.is_empty()) else {
        return String::new();
    };
    let end = kept
        .iter()
        .rposition(|row| !row.is_empty())
        .unwrap_or(start);
    kept[start..=end].join("\n")
}
