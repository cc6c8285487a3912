//! Prompt-box detection.
//!
//! Two border conventions are recognized:
//!
//! ```text
//! ╭──────────────────╮     ────────────────────
//! │ > query text     │     > query text
//! ╰──────────────────╯     ────────────────────
//!       Framed                     Ruled
//! ```

use crate::config::ScreenConfig;

const FRAMED_TOP_LEFT: [char; 2] = ['╭', '┌'];
const FRAMED_TOP_RIGHT: [char; 2] = ['╮', '┐'];
const FRAMED_BOTTOM_LEFT: [char; 2] = ['╰', '└'];
const FRAMED_BOTTOM_RIGHT: [char; 2] = ['╯', '┘'];
const RULE_GLYPHS: [char; 3] = ['─', '━', '═'];
const SIDE_BORDERS: [char; 4] = ['│', '┃', '║', '|'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    Framed,
    Ruled,
}

/// A bordered input region. Row indices are zero-based frame rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBox {
    pub top: usize,
    pub bottom: usize,
    pub style: BorderStyle,
    /// Content rows with side borders and the prompt marker removed.
    content: Vec<String>,
}

impl PromptBox {
    pub fn content_rows(&self) -> &[String] {
        &self.content
    }

    /// Non-blank content rows joined with newlines.
    pub fn content_text(&self) -> String {
        self.content
            .iter()
            .map(|row| row.as_str())
            .filter(|row| !row.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Empty, or showing one of the placeholder hints.
    pub fn is_vacant(&self, placeholders: &[String]) -> bool {
        let text = self.content_text();
        let text = text.trim();
        text.is_empty()
            || placeholders
                .iter()
                .any(|p| !p.is_empty() && text.starts_with(p.as_str()))
    }
}

/// Every prompt box in `rows`, ordered top to bottom.
pub fn find_prompt_boxes(rows: &[&str], screen: &ScreenConfig) -> Vec<PromptBox> {
    let mut boxes = framed_boxes(rows, screen);
    boxes.extend(ruled_boxes(rows, screen));
    boxes.sort_by_key(|b| b.top);
    boxes
}

fn framed_boxes(rows: &[&str], screen: &ScreenConfig) -> Vec<PromptBox> {
    let mut boxes = Vec::new();
    let mut open: Option<usize> = None;
    for (idx, row) in rows.iter().enumerate() {
        let trimmed = row.trim();
        if is_bordered(trimmed, &FRAMED_TOP_LEFT, &FRAMED_TOP_RIGHT) {
            open = Some(idx);
        } else if is_bordered(trimmed, &FRAMED_BOTTOM_LEFT, &FRAMED_BOTTOM_RIGHT) {
            if let Some(top) = open.take() {
                boxes.push(build(rows, top, idx, BorderStyle::Framed, screen));
            }
        }
    }
    boxes
}

/// Pairs rule rows from the bottom up, so the last two rules always form the
/// active input box even when the response above contains rules of its own.
fn ruled_boxes(rows: &[&str], screen: &ScreenConfig) -> Vec<PromptBox> {
    let rules: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| is_rule(row, screen.min_rule_width))
        .map(|(idx, _)| idx)
        .collect();

    let mut boxes = Vec::new();
    let mut remaining = rules.as_slice();
    while let [rest @ .., top, bottom] = remaining {
        if bottom - top >= 2 {
            boxes.push(build(rows, *top, *bottom, BorderStyle::Ruled, screen));
            remaining = rest;
        } else {
            // Adjacent rules hold no content; slide up by one.
            remaining = &remaining[..remaining.len() - 1];
        }
    }
    boxes
}

fn is_bordered(trimmed: &str, left: &[char], right: &[char]) -> bool {
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) => left.contains(&first) && right.contains(&last),
        _ => false,
    }
}

fn is_rule(row: &str, min_width: usize) -> bool {
    let trimmed = row.trim();
    let mut width = 0;
    for c in trimmed.chars() {
        if !RULE_GLYPHS.contains(&c) {
            return false;
        }
        width += 1;
    }
    width >= min_width
}

fn build(
    rows: &[&str],
    top: usize,
    bottom: usize,
    style: BorderStyle,
    screen: &ScreenConfig,
) -> PromptBox {
    let content = rows[top + 1..bottom]
        .iter()
        .map(|row| clean_content_row(row, &screen.echo_markers))
        .collect();
    PromptBox {
        top,
        bottom,
        style,
        content,
    }
}

/// Strip side borders and a leading prompt marker from one content row.
pub(super) fn clean_content_row(row: &str, markers: &[String]) -> String {
    let mut text = row.trim();
    if let Some(rest) = text.strip_prefix(SIDE_BORDERS) {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix(SIDE_BORDERS) {
        text = rest;
    }
    text = text.trim();
    if let Some(rest) = strip_marker(text, markers) {
        text = rest.trim();
    }
    text.to_string()
}

/// `text` without its leading prompt marker, if it has one.
pub(super) fn strip_marker<'a>(text: &'a str, markers: &[String]) -> Option<&'a str> {
    markers
        .iter()
        .filter(|m| !m.is_empty())
        .find_map(|m| text.strip_prefix(m.as_str()))
}
