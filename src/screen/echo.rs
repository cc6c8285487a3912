//! Wrap-insensitive echo matching.
//!
//! Terminals and TUIs re-wrap long input at arbitrary columns, so both the
//! needle and the screen rows are compared with all whitespace removed.

use super::prompt_box::strip_marker;

/// `text` with every whitespace character removed.
pub fn squash(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Inclusive row range holding one echo occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoSpan {
    pub first: usize,
    pub last: usize,
}

/// Finds a query's echo in a list of rows.
#[derive(Debug, Clone)]
pub struct EchoMatcher {
    needle: String,
    markers: Vec<String>,
}

impl EchoMatcher {
    /// `prefix_chars` keeps only that many leading non-whitespace characters
    /// of the echo, for programs that truncate long echoes.
    pub fn new(echo: &str, prefix_chars: Option<usize>, markers: &[String]) -> Self {
        let squashed = squash(echo);
        let needle = match prefix_chars {
            Some(limit) => squashed.chars().take(limit).collect(),
            None => squashed,
        };
        Self {
            needle,
            markers: markers.to_vec(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// Every minimal span whose first row holds the start of a match, top to
    /// bottom. At most one span starts on any row.
    pub fn find_all(&self, rows: &[&str]) -> Vec<EchoSpan> {
        if self.needle.is_empty() {
            return Vec::new();
        }
        let squashed: Vec<String> = rows.iter().map(|row| squash(row)).collect();
        (0..rows.len())
            .filter_map(|first| self.match_starting_at(&squashed, first))
            .collect()
    }

    /// The authoritative echo: the bottom-most match that starts on a marker
    /// row, else the bottom-most match.
    pub fn find_in(&self, rows: &[&str]) -> Option<EchoSpan> {
        let spans = self.find_all(rows);
        spans
            .iter()
            .rev()
            .find(|span| strip_marker(rows[span.first].trim_start(), &self.markers).is_some())
            .or_else(|| spans.last())
            .copied()
    }

    fn match_starting_at(&self, squashed: &[String], first: usize) -> Option<EchoSpan> {
        let head = &squashed[first];
        if head.is_empty() {
            return None;
        }
        // Enough following text to hold a match starting anywhere in `head`.
        let wanted = head.len() + self.needle.len();
        let mut joined = String::with_capacity(wanted);
        let mut ends = Vec::new();
        for row in &squashed[first..] {
            joined.push_str(row);
            ends.push(joined.len());
            if joined.len() >= wanted {
                break;
            }
        }

        let start = head
            .char_indices()
            .map(|(offset, _)| offset)
            .find(|offset| joined[*offset..].starts_with(&self.needle))?;
        let end = start + self.needle.len();
        let rows_used = ends.iter().position(|row_end| *row_end >= end)?;
        Some(EchoSpan {
            first,
            last: first + rows_used,
        })
    }
}
