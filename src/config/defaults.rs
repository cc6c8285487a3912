//! Default configuration constants.
//!
//! Every default that changes observable driver behavior lives here so the
//! documented table and the code cannot drift apart.

/// Fixed delay between two frame captures.
pub(super) const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
/// Overall deadline for one query delivery.
pub(super) const DEFAULT_TIMEOUT_SECS: u64 = 300;
/// Extra submits allowed when the query stays in the input box.
pub(super) const DEFAULT_SUBMIT_RETRIES: u32 = 1;
/// Consecutive `Typed` polls after a submit before it counts as stuck.
pub(super) const DEFAULT_STUCK_TYPED_POLLS: u32 = 6;
/// Attempts to clear leftover input before typing a new query.
pub(super) const DEFAULT_CLEAR_ATTEMPTS: u32 = 2;

pub(super) const DEFAULT_TMUX_PROGRAM: &str = "tmux";
pub(super) const DEFAULT_SESSION_WIDTH: u16 = 200;
pub(super) const DEFAULT_SESSION_HEIGHT: u16 = 50;
/// Scrollback lines captured above the visible screen.
pub(super) const DEFAULT_HISTORY_LINES: u32 = 2000;
pub(super) const DEFAULT_SUBMIT_KEY: &str = "Enter";

pub(super) fn default_clear_keys() -> Vec<String> {
    vec!["C-u".to_string()]
}

/// Placeholder prefixes shown inside an empty prompt box.
pub(super) fn default_placeholders() -> Vec<String> {
    vec!["Try \"".to_string()]
}

/// Spinner glyphs besides the Braille block, which always counts.
pub(super) const DEFAULT_ACTIVITY_GLYPHS: &str = "·✢✳✶✻✽";

pub(super) fn default_activity_hints() -> Vec<String> {
    vec!["esc to interrupt".to_string(), "(processing)".to_string()]
}

/// Prompt markers that precede input inside the box and its echo above it.
pub(super) fn default_echo_markers() -> Vec<String> {
    vec![">".to_string(), "❯".to_string()]
}

/// Narrowest horizontal rule accepted as a prompt-box border.
pub(super) const DEFAULT_MIN_RULE_WIDTH: usize = 20;
