//! Submission-state driver.
//!
//! Delivers one query to a session and polls rendered frames until the
//! response settles, the deadline passes, or the session fails.

mod stability;
mod state;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{sleep, timeout_at, Instant};

use crate::channel::{SessionChannel, SessionId};
use crate::config::{Config, ScreenConfig};
use crate::error::{AmbiguousRender, DriverError};
use crate::screen::{find_prompt_boxes, Classification, Classifier, Frame, FrameState};

use stability::SettleTracker;
use state::StateTracker;
pub use state::InteractionState;

/// Text to deliver plus the form it is expected to echo as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    echo: String,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            echo: text.clone(),
            text,
        }
    }

    /// Override the echo form, for programs that re-render input differently.
    pub fn with_echo(mut self, echo: impl Into<String>) -> Self {
        self.echo = echo.into();
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn echo(&self) -> &str {
        &self.echo
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOptions {
    pub poll_interval: Duration,
    pub timeout: Duration,
    /// Extra submits allowed when the query stays in the input box.
    pub submit_retries: u32,
    /// Consecutive `Typed` polls after a submit before one retry is spent.
    pub stuck_typed_polls: u32,
    pub clear_attempts: u32,
    pub clear_keys: Vec<String>,
}

impl DriverOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: config.driver.poll_interval(),
            timeout: config.driver.timeout(),
            submit_retries: config.driver.submit_retries,
            stuck_typed_polls: config.driver.stuck_typed_polls.max(1),
            clear_attempts: config.driver.clear_attempts,
            clear_keys: config.session.clear_keys.clone(),
        }
    }
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// A completed delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub response: String,
    pub submits: u32,
    pub polls: u32,
    pub elapsed_ms: u64,
    pub ambiguous_renders: Vec<AmbiguousRender>,
}

/// Drives queries through a [`SessionChannel`].
///
/// Shareable across tasks as long as each concurrent query targets its own
/// session.
pub struct Driver {
    channel: Arc<dyn SessionChannel>,
    options: DriverOptions,
    screen: ScreenConfig,
    observer: Option<watch::Sender<InteractionState>>,
}

/// Bookkeeping for one delivery.
struct Run {
    started: Instant,
    deadline: Instant,
    polls: u32,
    submits: u32,
    ambiguous_renders: Vec<AmbiguousRender>,
    last_region: Option<String>,
    last_frame: String,
    previous_ambiguity: Option<AmbiguousRender>,
}

impl Run {
    fn new(timeout: Duration) -> Self {
        let started = Instant::now();
        Self {
            started,
            deadline: started + timeout,
            polls: 0,
            submits: 0,
            ambiguous_renders: Vec::new(),
            last_region: None,
            last_frame: String::new(),
            previous_ambiguity: None,
        }
    }

    fn record(&mut self, frame: &Frame, classification: &Classification) {
        self.last_frame = frame.text().to_string();
        if let Some(region) = &classification.region {
            self.last_region = Some(region.clone());
        }
        self.note_ambiguity(classification.ambiguity);
    }

    /// Keep one report per run of consecutive frames with the same layout.
    fn note_ambiguity(&mut self, ambiguity: Option<AmbiguousRender>) {
        if let Some(report) = ambiguity {
            if self.previous_ambiguity != Some(report) {
                tracing::warn!(%report, "multiple prompt boxes in frame");
                self.ambiguous_renders.push(report);
            }
        }
        self.previous_ambiguity = ambiguity;
    }

    fn partial(&self) -> String {
        self.last_region
            .clone()
            .unwrap_or_else(|| self.last_frame.clone())
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

impl Driver {
    pub fn new(
        channel: Arc<dyn SessionChannel>,
        options: DriverOptions,
        screen: ScreenConfig,
    ) -> Self {
        Self {
            channel,
            options,
            screen,
            observer: None,
        }
    }

    /// Publish every state change of later deliveries on `sender`.
    pub fn with_state_observer(mut self, sender: watch::Sender<InteractionState>) -> Self {
        self.observer = Some(sender);
        self
    }

    pub fn options(&self) -> &DriverOptions {
        &self.options
    }

    /// Type `query` into `session`, submit it, and wait for the response.
    ///
    /// Dropping the returned future abandons the query; whatever was already
    /// typed or submitted stays in the session.
    pub async fn deliver(
        &self,
        session: &SessionId,
        query: &Query,
    ) -> Result<Delivery, DriverError> {
        let classifier = Classifier::new(query.echo(), &self.screen);
        if classifier.echo().is_empty() || query.text().trim().is_empty() {
            return Err(DriverError::EmptyQuery);
        }

        let mut run = Run::new(self.options.timeout);
        self.channel.ensure(session).await?;
        let baseline = self.prepare(session, &classifier, &mut run).await?;
        self.channel.type_text(session, query.text()).await?;

        let mut tracker = StateTracker::new();
        self.publish(tracker.state());
        let mut settle = SettleTracker::default();
        let mut typed_streak: u32 = 0;
        let mut retries_used: u32 = 0;

        loop {
            let Some(frame) = self.capture(session, &run).await? else {
                return Err(self.timed_out(&mut tracker, &run));
            };
            run.polls += 1;
            let classification = classifier.classify(&frame);
            run.record(&frame, &classification);
            tracing::debug!(
                session = %session,
                poll = run.polls,
                observed = %classification.state,
                state = %tracker.state(),
                "poll"
            );

            if run.submits == 0 {
                // The first frame only confirms the text landed; the state
                // machine starts after the one initial submit.
                self.channel.submit(session).await?;
                run.submits = 1;
            } else {
                if let Some(next) = tracker.observe(classification.state) {
                    tracing::info!(session = %session, state = %next, "state changed");
                    self.publish(next);
                }
                match classification.state {
                    FrameState::Typed if tracker.state() != InteractionState::Typed => {
                        // Past Typed the driver only watches; a stray echo is no reason to write.
                        typed_streak = 0;
                        settle.reset();
                    }
                    FrameState::Typed => {
                        settle.reset();
                        typed_streak += 1;
                        if typed_streak >= self.options.stuck_typed_polls
                            && retries_used < self.options.submit_retries
                        {
                            tracing::warn!(
                                session = %session,
                                polls = typed_streak,
                                "query still in input box; submitting again"
                            );
                            self.channel.submit(session).await?;
                            retries_used += 1;
                            run.submits += 1;
                            typed_streak = 0;
                        }
                    }
                    FrameState::Submitted => {
                        typed_streak = 0;
                        let region = classification.region.as_deref().unwrap_or_default();
                        if let Some(settled) = settle.quiet(region) {
                            let fresh = !settled.trim().is_empty()
                                && baseline.as_deref() != Some(settled.as_str());
                            if tracker.saw_processing() || fresh {
                                if let Some(done) = tracker.finish(InteractionState::Complete) {
                                    self.publish(done);
                                }
                                tracing::info!(
                                    session = %session,
                                    polls = run.polls,
                                    submits = run.submits,
                                    "response complete"
                                );
                                return Ok(Delivery {
                                    response: settled,
                                    submits: run.submits,
                                    polls: run.polls,
                                    elapsed_ms: run.elapsed_ms(),
                                    ambiguous_renders: run.ambiguous_renders,
                                });
                            }
                        }
                    }
                    FrameState::Processing | FrameState::Unrecognized => {
                        typed_streak = 0;
                        settle.reset();
                    }
                }
            }

            self.pause(&run)
                .await
                .ok_or_else(|| self.timed_out(&mut tracker, &run))?;
        }
    }

    /// Wait for a prompt box and make sure it is empty before typing.
    ///
    /// Returns the region an earlier query with the same echo left above the
    /// box, so a stale answer is not mistaken for the new one.
    async fn prepare(
        &self,
        session: &SessionId,
        classifier: &Classifier,
        run: &mut Run,
    ) -> Result<Option<String>, DriverError> {
        let mut clears: u32 = 0;
        loop {
            let Some(frame) = self.capture(session, run).await? else {
                return Err(self.prepare_timed_out(run));
            };
            run.last_frame = frame.text().to_string();
            let c = classifier.classify(&frame);
            run.note_ambiguity(c.ambiguity);
            let rows = frame.rows();
            let boxes = find_prompt_boxes(&rows, &self.screen);
            match boxes.last() {
                None => tracing::debug!(session = %session, "waiting for prompt box"),
                Some(prompt) if prompt.is_vacant(&self.screen.placeholders) => {
                    let baseline = match c.state {
                        FrameState::Submitted => c.region,
                        _ => None,
                    };
                    return Ok(baseline);
                }
                Some(prompt) => {
                    let content = prompt.content_text();
                    if clears >= self.options.clear_attempts {
                        return Err(DriverError::InputOccupied { content });
                    }
                    clears += 1;
                    tracing::warn!(
                        session = %session,
                        attempt = clears,
                        leftover = %content,
                        "clearing leftover input"
                    );
                    self.channel
                        .send_keys(session, &self.options.clear_keys)
                        .await?;
                }
            }
            if self.pause(run).await.is_none() {
                return Err(self.prepare_timed_out(run));
            }
        }
    }

    /// Capture one frame, bounded by the delivery deadline. `None` when the
    /// deadline expired first.
    async fn capture(&self, session: &SessionId, run: &Run) -> Result<Option<Frame>, DriverError> {
        match timeout_at(run.deadline, self.channel.capture_frame(session)).await {
            Ok(frame) => Ok(Some(frame?)),
            Err(_) => Ok(None),
        }
    }

    /// Sleep one poll interval, clipped to the deadline. `None` once the
    /// deadline has passed.
    async fn pause(&self, run: &Run) -> Option<()> {
        let now = Instant::now();
        if now >= run.deadline {
            return None;
        }
        sleep(self.options.poll_interval.min(run.deadline - now)).await;
        Some(())
    }

    fn timed_out(&self, tracker: &mut StateTracker, run: &Run) -> DriverError {
        let last_state = tracker.state();
        if let Some(state) = tracker.finish(InteractionState::TimedOut) {
            self.publish(state);
        }
        tracing::warn!(last_state = %last_state, polls = run.polls, "response timed out");
        DriverError::ResponseTimeout {
            limit: self.options.timeout,
            last_state,
            partial: run.partial(),
        }
    }

    fn prepare_timed_out(&self, run: &Run) -> DriverError {
        tracing::warn!("no usable prompt box before the deadline");
        DriverError::ResponseTimeout {
            limit: self.options.timeout,
            last_state: InteractionState::Typed,
            partial: run.last_frame.clone(),
        }
    }

    fn publish(&self, state: InteractionState) {
        if let Some(sender) = &self.observer {
            sender.send_replace(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionUnavailable;
    use crate::testsupport::{framed_frame, FakeChannel};

    const QUERY: &str = "what is rust";

    fn options(timeout_ms: u64) -> DriverOptions {
        DriverOptions {
            poll_interval: Duration::from_millis(1),
            timeout: Duration::from_millis(timeout_ms),
            ..DriverOptions::default()
        }
    }

    fn driver(channel: &Arc<FakeChannel>, options: DriverOptions) -> Driver {
        Driver::new(channel.clone(), options, ScreenConfig::default())
    }

    fn session() -> SessionId {
        SessionId::new("test").unwrap()
    }

    fn empty() -> Frame {
        framed_frame(&["Welcome"], "")
    }

    fn typed() -> Frame {
        framed_frame(&["Welcome"], QUERY)
    }

    fn submitted(lines: &[&str]) -> Frame {
        let mut rows = vec!["Welcome", "> what is rust"];
        rows.extend_from_slice(lines);
        framed_frame(&rows, "")
    }

    #[tokio::test]
    async fn delivers_after_processing_and_settling() {
        let channel = FakeChannel::new([
            empty(),
            typed(),
            submitted(&[]),
            submitted(&["⠋ Thinking… (esc to interrupt)"]),
            submitted(&["Rust is", "⠙ Thinking… (esc to interrupt)"]),
            submitted(&["Rust is a systems language."]),
            submitted(&["Rust is a systems language."]),
        ]);
        let result = driver(&channel, options(5_000))
            .deliver(&session(), &Query::new(QUERY))
            .await
            .unwrap();
        assert_eq!(result.response, "Rust is a systems language.");
        assert_eq!(result.submits, 1);
        assert_eq!(channel.typed(), vec![QUERY.to_string()]);
        assert_eq!(channel.submits(), 1);
        assert!(result.ambiguous_renders.is_empty());
    }

    #[tokio::test]
    async fn typed_frames_get_exactly_one_submit_without_retry_budget() {
        let channel = FakeChannel::new([empty(), typed()]);
        let opts = DriverOptions {
            submit_retries: 0,
            ..options(100)
        };
        let err = driver(&channel, opts)
            .deliver(&session(), &Query::new(QUERY))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DriverError::ResponseTimeout {
                last_state: InteractionState::Typed,
                ..
            }
        ));
        assert_eq!(channel.submits(), 1);
    }

    #[tokio::test]
    async fn stuck_typed_spends_retry_budget_once() {
        let channel = FakeChannel::new([empty(), typed()]);
        let opts = DriverOptions {
            submit_retries: 1,
            stuck_typed_polls: 2,
            ..options(100)
        };
        let err = driver(&channel, opts)
            .deliver(&session(), &Query::new(QUERY))
            .await
            .unwrap_err();
        assert!(matches!(err, DriverError::ResponseTimeout { .. }));
        assert_eq!(channel.submits(), 2);
    }

    #[tokio::test]
    async fn stuck_retry_then_success() {
        let channel = FakeChannel::new([
            empty(),
            typed(),
            typed(),
            typed(),
            submitted(&["⠋ working"]),
            submitted(&["done"]),
            submitted(&["done"]),
        ]);
        let opts = DriverOptions {
            submit_retries: 1,
            stuck_typed_polls: 2,
            ..options(5_000)
        };
        let result = driver(&channel, opts)
            .deliver(&session(), &Query::new(QUERY))
            .await
            .unwrap();
        assert_eq!(result.response, "done");
        assert_eq!(result.submits, 2);
    }

    #[tokio::test]
    async fn empty_region_right_after_submit_is_not_an_answer() {
        let channel = FakeChannel::new([empty(), typed(), submitted(&[])]);
        let err = driver(&channel, options(100))
            .deliver(&session(), &Query::new(QUERY))
            .await
            .unwrap_err();
        match err {
            DriverError::ResponseTimeout {
                last_state, partial, ..
            } => {
                assert_eq!(last_state, InteractionState::Submitted);
                assert_eq!(partial, "");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn timeout_carries_partial_region() {
        let channel = FakeChannel::new([
            empty(),
            typed(),
            submitted(&["Half an answer", "⠹ Working"]),
        ]);
        let err = driver(&channel, options(100))
            .deliver(&session(), &Query::new(QUERY))
            .await
            .unwrap_err();
        match err {
            DriverError::ResponseTimeout {
                last_state, partial, ..
            } => {
                assert_eq!(last_state, InteractionState::Processing);
                assert_eq!(partial, "Half an answer");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn ambiguous_render_is_reported_without_failing() {
        let two_boxes = |answer: &str| {
            Frame::new(format!(
                "╭──────────╮\n│ > old    │\n╰──────────╯\n> {QUERY}\n{answer}\n╭──────────╮\n│ >        │\n╰──────────╯"
            ))
        };
        let channel = FakeChannel::new([
            empty(),
            typed(),
            two_boxes("It is a language."),
            two_boxes("It is a language."),
        ]);
        let result = driver(&channel, options(5_000))
            .deliver(&session(), &Query::new(QUERY))
            .await
            .unwrap();
        assert_eq!(result.response, "It is a language.");
        assert_eq!(
            result.ambiguous_renders,
            vec![AmbiguousRender {
                prompt_boxes: 2,
                chosen_top_row: 5
            }]
        );
    }

    #[tokio::test]
    async fn ambiguity_is_reported_again_after_a_clean_frame() {
        let two_boxes = |answer: &str| {
            Frame::new(format!(
                "╭──────────╮\n│ > old    │\n╰──────────╯\n> {QUERY}\n{answer}\n╭──────────╮\n│ >        │\n╰──────────╯"
            ))
        };
        let report = AmbiguousRender {
            prompt_boxes: 2,
            chosen_top_row: 5,
        };
        let channel = FakeChannel::new([
            empty(),
            typed(),
            two_boxes("⠋ working"),
            two_boxes("⠙ working"),
            submitted(&["⠹ working"]),
            two_boxes("It is a language."),
            two_boxes("It is a language."),
        ]);
        let result = driver(&channel, options(5_000))
            .deliver(&session(), &Query::new(QUERY))
            .await
            .unwrap();
        assert_eq!(result.response, "It is a language.");
        assert_eq!(result.ambiguous_renders, vec![report, report]);
    }

    #[tokio::test]
    async fn ambiguity_before_typing_is_reported() {
        let two_empty = Frame::new(
            "╭──────────╮\n│ > old    │\n╰──────────╯\nWelcome\n╭──────────╮\n│ >        │\n╰──────────╯",
        );
        let channel = FakeChannel::new([
            two_empty,
            typed(),
            submitted(&["fine"]),
            submitted(&["fine"]),
        ]);
        let result = driver(&channel, options(5_000))
            .deliver(&session(), &Query::new(QUERY))
            .await
            .unwrap();
        assert_eq!(result.response, "fine");
        assert_eq!(
            result.ambiguous_renders,
            vec![AmbiguousRender {
                prompt_boxes: 2,
                chosen_top_row: 4
            }]
        );
    }

    #[tokio::test]
    async fn no_retry_submit_once_processing_was_seen() {
        let channel = FakeChannel::new([
            empty(),
            typed(),
            submitted(&["⠋ working"]),
            typed(),
            typed(),
            typed(),
        ]);
        let opts = DriverOptions {
            submit_retries: 1,
            stuck_typed_polls: 2,
            ..options(100)
        };
        let err = driver(&channel, opts)
            .deliver(&session(), &Query::new(QUERY))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DriverError::ResponseTimeout {
                last_state: InteractionState::Processing,
                ..
            }
        ));
        assert_eq!(channel.submits(), 1);
    }

    #[tokio::test]
    async fn session_failure_propagates_before_any_write() {
        let channel = FakeChannel::failing(SessionUnavailable::new("test", "no server running"));
        let err = driver(&channel, options(1_000))
            .deliver(&session(), &Query::new(QUERY))
            .await
            .unwrap_err();
        match err {
            DriverError::SessionUnavailable(e) => assert_eq!(e.reason, "no server running"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(channel.typed().is_empty());
        assert_eq!(channel.submits(), 0);
    }

    #[tokio::test]
    async fn prepare_waits_for_prompt_box() {
        let channel = FakeChannel::new([
            Frame::new("starting..."),
            Frame::new("starting...\nloading"),
            empty(),
            typed(),
            submitted(&["42"]),
            submitted(&["42"]),
        ]);
        let result = driver(&channel, options(5_000))
            .deliver(&session(), &Query::new(QUERY))
            .await
            .unwrap();
        assert_eq!(result.response, "42");
    }

    #[tokio::test]
    async fn prepare_clears_leftover_input() {
        let channel = FakeChannel::new([
            framed_frame(&["Welcome"], "half typed"),
            empty(),
            typed(),
            submitted(&["ok"]),
            submitted(&["ok"]),
        ]);
        let result = driver(&channel, options(5_000))
            .deliver(&session(), &Query::new(QUERY))
            .await
            .unwrap();
        assert_eq!(result.response, "ok");
        assert_eq!(channel.keys(), vec![vec!["C-u".to_string()]]);
    }

    #[tokio::test]
    async fn occupied_box_fails_without_typing() {
        let channel = FakeChannel::new([framed_frame(&["Welcome"], "half typed")]);
        let err = driver(&channel, options(5_000))
            .deliver(&session(), &Query::new(QUERY))
            .await
            .unwrap_err();
        match err {
            DriverError::InputOccupied { content } => assert_eq!(content, "half typed"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(channel.keys().len(), 2);
        assert!(channel.typed().is_empty());
    }

    #[tokio::test]
    async fn stale_answer_to_same_query_is_not_reused() {
        let stale = submitted(&["old answer"]);
        let channel = FakeChannel::new([stale.clone(), typed(), stale]);
        let err = driver(&channel, options(100))
            .deliver(&session(), &Query::new(QUERY))
            .await
            .unwrap_err();
        assert!(matches!(err, DriverError::ResponseTimeout { .. }));
    }

    #[tokio::test]
    async fn repeated_query_completes_with_new_answer() {
        let second = |answer: &str| {
            framed_frame(
                &["> what is rust", "old answer", "> what is rust", answer],
                "",
            )
        };
        let channel = FakeChannel::new([
            submitted(&["old answer"]),
            typed(),
            second("new answer"),
            second("new answer"),
        ]);
        let result = driver(&channel, options(5_000))
            .deliver(&session(), &Query::new(QUERY))
            .await
            .unwrap();
        assert_eq!(result.response, "new answer");
    }

    #[tokio::test]
    async fn blank_query_is_rejected() {
        let channel = FakeChannel::new([empty()]);
        let err = driver(&channel, options(1_000))
            .deliver(&session(), &Query::new("  \n "))
            .await
            .unwrap_err();
        assert!(matches!(err, DriverError::EmptyQuery));
        assert_eq!(channel.captures(), 0);
    }

    #[tokio::test]
    async fn regressions_do_not_move_state_backwards() {
        let (tx, rx) = watch::channel(InteractionState::Typed);
        let channel = FakeChannel::new([
            empty(),
            typed(),
            submitted(&["⠋ working"]),
            typed(),
            submitted(&["answer"]),
            submitted(&["answer"]),
        ]);
        let result = driver(&channel, options(5_000))
            .with_state_observer(tx)
            .deliver(&session(), &Query::new(QUERY))
            .await
            .unwrap();
        assert_eq!(result.response, "answer");
        assert_eq!(*rx.borrow(), InteractionState::Complete);
    }

    #[tokio::test]
    async fn custom_echo_form_is_matched() {
        let channel = FakeChannel::new([
            empty(),
            framed_frame(&["Welcome"], "[pasted 3 lines]"),
            framed_frame(&["Welcome", "> [pasted 3 lines]", "fine"], ""),
            framed_frame(&["Welcome", "> [pasted 3 lines]", "fine"], ""),
        ]);
        let query = Query::new("line one\nline two\nline three").with_echo("[pasted 3 lines]");
        let result = driver(&channel, options(5_000))
            .deliver(&session(), &query)
            .await
            .unwrap();
        assert_eq!(result.response, "fine");
        assert_eq!(channel.typed(), vec!["line one\nline two\nline three".to_string()]);
    }
}
