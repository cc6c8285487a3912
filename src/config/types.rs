//! Configuration data model.
//!
//! Struct/enum definitions plus their defaults. Source discovery, env
//! overrides, and validation live in sibling modules.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::defaults::{
    default_activity_hints, default_clear_keys, default_echo_markers, default_placeholders,
    DEFAULT_ACTIVITY_GLYPHS, DEFAULT_CLEAR_ATTEMPTS, DEFAULT_HISTORY_LINES,
    DEFAULT_MIN_RULE_WIDTH, DEFAULT_POLL_INTERVAL_MS, DEFAULT_SESSION_HEIGHT,
    DEFAULT_SESSION_WIDTH, DEFAULT_STUCK_TYPED_POLLS, DEFAULT_SUBMIT_KEY,
    DEFAULT_SUBMIT_RETRIES, DEFAULT_TIMEOUT_SECS, DEFAULT_TMUX_PROGRAM,
};

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub driver: DriverConfig,
    pub session: SessionConfig,
    pub screen: ScreenConfig,
}

/// Polling loop timing and retry budget.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    pub poll_interval_ms: u64,
    pub timeout_secs: u64,
    /// Extra submits allowed when a submitted query stays in the input box.
    pub submit_retries: u32,
    /// Consecutive `Typed` polls after a submit before one retry is spent.
    pub stuck_typed_polls: u32,
    /// Clear-key rounds attempted on leftover input before giving up.
    pub clear_attempts: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            submit_retries: DEFAULT_SUBMIT_RETRIES,
            stuck_typed_polls: DEFAULT_STUCK_TYPED_POLLS,
            clear_attempts: DEFAULT_CLEAR_ATTEMPTS,
        }
    }
}

impl DriverConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// How sessions are created, written to, and captured.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// tmux executable name or path.
    pub tmux: String,
    /// Program launched in newly created sessions. `None` keeps tmux's
    /// default shell.
    pub command: Option<String>,
    pub width: u16,
    pub height: u16,
    /// Scrollback lines included above the visible screen in each frame.
    pub history_lines: u32,
    pub submit_key: String,
    /// Keys that wipe leftover input from the prompt box.
    pub clear_keys: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tmux: DEFAULT_TMUX_PROGRAM.to_string(),
            command: None,
            width: DEFAULT_SESSION_WIDTH,
            height: DEFAULT_SESSION_HEIGHT,
            history_lines: DEFAULT_HISTORY_LINES,
            submit_key: DEFAULT_SUBMIT_KEY.to_string(),
            clear_keys: default_clear_keys(),
        }
    }
}

/// Rendering conventions of the managed program.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScreenConfig {
    /// Prefixes that mark an empty prompt box (`Try "..."` hints).
    pub placeholders: Vec<String>,
    /// Leading glyphs of a spinner row, in addition to Braille patterns.
    pub activity_glyphs: String,
    /// Substrings that mark a row as an activity indicator.
    pub activity_hints: Vec<String>,
    /// Prompt markers shown before input and before the echoed query.
    pub echo_markers: Vec<String>,
    /// Match only this many leading non-whitespace echo characters.
    pub echo_prefix_chars: Option<usize>,
    /// Narrowest `─` rule accepted as a prompt-box border.
    pub min_rule_width: usize,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            placeholders: default_placeholders(),
            activity_glyphs: DEFAULT_ACTIVITY_GLYPHS.to_string(),
            activity_hints: default_activity_hints(),
            echo_markers: default_echo_markers(),
            echo_prefix_chars: None,
            min_rule_width: DEFAULT_MIN_RULE_WIDTH,
        }
    }
}

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicit `--config` path.
    Explicit(PathBuf),
    /// `./nudge.toml` in the working directory.
    Local,
    /// `<config root>/nudge/nudge.toml`.
    Global(PathBuf),
    /// No file found; built-in defaults.
    BuiltInDefaults,
}

/// Configuration plus the source it was read from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
}
