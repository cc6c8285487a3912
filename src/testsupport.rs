//! Shared test fixtures: a scripted session channel and frame builders.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::channel::{SessionChannel, SessionId};
use crate::error::SessionUnavailable;
use crate::screen::Frame;

const BOX_WIDTH: usize = 40;

/// Frame with `history` rows above a `╭…╮` box holding `input`.
pub fn framed_frame(history: &[&str], input: &str) -> Frame {
    let mut rows: Vec<String> = history.iter().map(|r| r.to_string()).collect();
    let rule = "─".repeat(BOX_WIDTH - 2);
    rows.push(format!("╭{rule}╮"));
    rows.push(format!("│ > {input:<width$}│", width = BOX_WIDTH - 5));
    rows.push(format!("╰{rule}╯"));
    rows.push("  ? for shortcuts".to_string());
    Frame::new(rows.join("\n"))
}

/// Frame with `history` rows above a ruled input area holding `input`.
pub fn ruled_frame(history: &[&str], input: &str) -> Frame {
    let mut rows: Vec<String> = history.iter().map(|r| r.to_string()).collect();
    let rule = "─".repeat(BOX_WIDTH);
    rows.push(rule.clone());
    rows.push(format!("❯ {input}"));
    rows.push(rule);
    rows.push("  ⏵⏵ accept edits on".to_string());
    Frame::new(rows.join("\n"))
}

#[derive(Debug, Default)]
struct FakeState {
    frames: VecDeque<Frame>,
    last: Option<Frame>,
    failure: Option<SessionUnavailable>,
    ensures: u32,
    captures: u32,
    submits: u32,
    typed: Vec<String>,
    keys: Vec<Vec<String>>,
}

/// Session channel that replays scripted frames and records every write.
///
/// Frames are returned in order; the final frame repeats forever.
#[derive(Debug, Default)]
pub struct FakeChannel {
    state: Mutex<FakeState>,
}

impl FakeChannel {
    pub fn new(frames: impl IntoIterator<Item = Frame>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState {
                frames: frames.into_iter().collect(),
                ..FakeState::default()
            }),
        })
    }

    /// Channel whose every call fails with `error`.
    pub fn failing(error: SessionUnavailable) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState {
                failure: Some(error),
                ..FakeState::default()
            }),
        })
    }

    pub fn typed(&self) -> Vec<String> {
        self.lock().typed.clone()
    }

    pub fn submits(&self) -> u32 {
        self.lock().submits
    }

    pub fn keys(&self) -> Vec<Vec<String>> {
        self.lock().keys.clone()
    }

    pub fn captures(&self) -> u32 {
        self.lock().captures
    }

    pub fn ensures(&self) -> u32 {
        self.lock().ensures
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake channel lock poisoned")
    }

    fn check(&self) -> Result<std::sync::MutexGuard<'_, FakeState>, SessionUnavailable> {
        let state = self.lock();
        match &state.failure {
            Some(err) => Err(err.clone()),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl SessionChannel for FakeChannel {
    async fn ensure(&self, _session: &SessionId) -> Result<(), SessionUnavailable> {
        self.check()?.ensures += 1;
        Ok(())
    }

    async fn type_text(&self, _session: &SessionId, text: &str) -> Result<(), SessionUnavailable> {
        self.check()?.typed.push(text.to_string());
        Ok(())
    }

    async fn submit(&self, _session: &SessionId) -> Result<(), SessionUnavailable> {
        self.check()?.submits += 1;
        Ok(())
    }

    async fn send_keys(
        &self,
        _session: &SessionId,
        keys: &[String],
    ) -> Result<(), SessionUnavailable> {
        self.check()?.keys.push(keys.to_vec());
        Ok(())
    }

    async fn capture_frame(&self, session: &SessionId) -> Result<Frame, SessionUnavailable> {
        let mut state = self.check()?;
        state.captures += 1;
        if let Some(next) = state.frames.pop_front() {
            state.last = Some(next);
        }
        state
            .last
            .clone()
            .ok_or_else(|| SessionUnavailable::new(session.as_str(), "no scripted frames"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_channel_repeats_last_frame() {
        let channel = FakeChannel::new([Frame::new("a"), Frame::new("b")]);
        let id = SessionId::new("s").unwrap();
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(channel.capture_frame(&id).await.unwrap().text().to_string());
        }
        assert_eq!(seen, vec!["a", "b", "b"]);
        assert_eq!(channel.captures(), 3);
    }

    #[tokio::test]
    async fn fake_channel_records_writes() {
        let channel = FakeChannel::new(Vec::new());
        let id = SessionId::new("s").unwrap();
        channel.ensure(&id).await.unwrap();
        channel.type_text(&id, "hi").await.unwrap();
        channel.submit(&id).await.unwrap();
        channel.send_keys(&id, &["C-u".to_string()]).await.unwrap();
        assert_eq!(channel.ensures(), 1);
        assert_eq!(channel.typed(), vec!["hi"]);
        assert_eq!(channel.submits(), 1);
        assert_eq!(channel.keys(), vec![vec!["C-u".to_string()]]);
        assert!(channel.capture_frame(&id).await.is_err());
    }

    #[test]
    fn framed_fixture_has_closed_box() {
        let frame = framed_frame(&["hello"], "typed");
        let rows = frame.rows();
        assert_eq!(rows.len(), 5);
        assert!(rows[1].starts_with('╭') && rows[1].ends_with('╮'));
        assert!(rows[2].contains("> typed"));
        assert!(rows[2].ends_with('│'));
    }
}
