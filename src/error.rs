//! Error types for the session channel, the driver, and config loading.

use std::fmt;
use std::time::Duration;

use crate::driver::InteractionState;

// ---------------------------------------------------------------------------
// SessionUnavailable
// ---------------------------------------------------------------------------

/// The terminal session could not be created or reached, or it vanished
/// between calls.
///
/// Every session-channel failure surfaces as this one error. Callers decide
/// whether to recreate the session; nothing retries it internally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUnavailable {
    /// Session identifier the failing call targeted.
    pub session: String,
    /// Underlying reason (tmux stderr, spawn failure, validation message).
    pub reason: String,
}

impl SessionUnavailable {
    pub fn new(session: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SessionUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session `{}` unavailable: {}", self.session, self.reason)
    }
}

impl std::error::Error for SessionUnavailable {}

// ---------------------------------------------------------------------------
// AmbiguousRender
// ---------------------------------------------------------------------------

/// Non-fatal report: a frame held more than one prompt box.
///
/// The bottom-most box is used for classification; this value only travels
/// alongside the result for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct AmbiguousRender {
    /// Number of prompt boxes found in the frame.
    pub prompt_boxes: usize,
    /// Zero-based row of the top border of the box that was chosen.
    pub chosen_top_row: usize,
}

impl fmt::Display for AmbiguousRender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ambiguous render: {} prompt boxes, using the one at row {}",
            self.prompt_boxes, self.chosen_top_row
        )
    }
}

// ---------------------------------------------------------------------------
// DriverError
// ---------------------------------------------------------------------------

/// Terminal failure of one query delivery.
#[derive(Debug)]
pub enum DriverError {
    /// Propagated unchanged from the session channel.
    SessionUnavailable(SessionUnavailable),
    /// The overall deadline elapsed before the response settled.
    ResponseTimeout {
        /// Configured deadline that was exceeded.
        limit: Duration,
        /// Furthest state reached before the deadline.
        last_state: InteractionState,
        /// Last region seen between the echo and the prompt box, or the last
        /// raw frame when no region was identified.
        partial: String,
    },
    /// The prompt box still held leftover input after clearing attempts.
    InputOccupied { content: String },
    /// The query has no visible characters, so its echo can never be found.
    EmptyQuery,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionUnavailable(e) => write!(f, "{e}"),
            Self::ResponseTimeout {
                limit, last_state, ..
            } => write!(
                f,
                "timed out after {} waiting for response (last state: {last_state})",
                format_duration(*limit)
            ),
            Self::InputOccupied { content } => {
                write!(f, "prompt box still holds unsent input: {content:?}")
            }
            Self::EmptyQuery => write!(f, "query is empty"),
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SessionUnavailable(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SessionUnavailable> for DriverError {
    fn from(e: SessionUnavailable) -> Self {
        Self::SessionUnavailable(e)
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

/// Human-oriented duration formatting used in error messages.
pub(crate) fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();
    if secs == 0 {
        return format!("{millis}ms");
    }
    if millis == 0 {
        if secs % 3600 == 0 {
            return format!("{}h", secs / 3600);
        }
        if secs % 60 == 0 {
            return format!("{}m", secs / 60);
        }
        return format!("{secs}s");
    }
    format!("{secs}.{millis:03}s")
}
