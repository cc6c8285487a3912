//! Session channel abstraction.
//!
//! The driver talks to a persistent terminal session only through
//! [`SessionChannel`]. Production code uses [`crate::tmux::TmuxChannel`];
//! tests replay scripted frames through a fake.

use std::fmt;

use async_trait::async_trait;

use crate::error::SessionUnavailable;
use crate::screen::Frame;

/// Caller-chosen name of a persistent session.
///
/// Must be unique per concurrently running query. tmux reserves `:` and `.`
/// in target syntax, so those are rejected up front.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(name: impl Into<String>) -> Result<Self, SessionUnavailable> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(SessionUnavailable::new(name, "session name must not be empty"));
        }
        if let Some(bad) = trimmed
            .chars()
            .find(|c| *c == ':' || *c == '.' || c.is_control())
        {
            return Err(SessionUnavailable::new(
                trimmed,
                format!("session name must not contain {bad:?}"),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = SessionUnavailable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Operations the driver needs from a terminal session.
///
/// Every failure is reported as [`SessionUnavailable`]; implementations never
/// retry on their own.
#[async_trait]
pub trait SessionChannel: Send + Sync {
    /// Create the session if it does not exist yet. Idempotent.
    async fn ensure(&self, session: &SessionId) -> Result<(), SessionUnavailable>;

    /// Write literal text into the session's input without submitting it.
    async fn type_text(&self, session: &SessionId, text: &str) -> Result<(), SessionUnavailable>;

    /// Send one submission key. Not idempotent.
    async fn submit(&self, session: &SessionId) -> Result<(), SessionUnavailable>;

    /// Send named keys such as `C-u` or `Escape`.
    async fn send_keys(&self, session: &SessionId, keys: &[String])
        -> Result<(), SessionUnavailable>;

    /// Capture the currently rendered screen. No side effects.
    async fn capture_frame(&self, session: &SessionId) -> Result<Frame, SessionUnavailable>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_trims_and_keeps_name() {
        let id = SessionId::new("  work-1 ").unwrap();
        assert_eq!(id.as_str(), "work-1");
        assert_eq!(id.to_string(), "work-1");
    }

    #[test]
    fn session_id_rejects_tmux_target_syntax() {
        for bad in ["", "   ", "a:b", "a.b", "tab\there"] {
            let err = SessionId::new(bad).unwrap_err();
            assert!(err.reason.contains("session name"), "{bad:?}: {err}");
        }
    }

    #[test]
    fn session_id_parses_from_str() {
        let id: SessionId = "scratch".parse().unwrap();
        assert_eq!(id.as_str(), "scratch");
    }
}
