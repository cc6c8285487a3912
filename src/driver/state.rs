//! Per-query interaction state.

use std::fmt;

use serde::Serialize;

use crate::screen::FrameState;

/// Lifecycle of one in-flight query. Ordered; the driver only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionState {
    Typed,
    Submitted,
    Processing,
    Complete,
    TimedOut,
}

impl InteractionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::TimedOut)
    }
}

impl fmt::Display for InteractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Typed => "typed",
            Self::Submitted => "submitted",
            Self::Processing => "processing",
            Self::Complete => "complete",
            Self::TimedOut => "timed out",
        };
        f.write_str(name)
    }
}

/// Forward-only tracker fed with per-frame observations.
#[derive(Debug, Clone)]
pub(super) struct StateTracker {
    state: InteractionState,
    saw_processing: bool,
}

impl StateTracker {
    pub fn new() -> Self {
        Self {
            state: InteractionState::Typed,
            saw_processing: false,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Whether any frame of this query showed an activity indicator.
    pub fn saw_processing(&self) -> bool {
        self.saw_processing
    }

    /// Apply one frame's verdict. Returns the new state when it changed.
    ///
    /// `Unrecognized` frames and regressions leave the state alone.
    pub fn observe(&mut self, observed: FrameState) -> Option<InteractionState> {
        if self.state.is_terminal() {
            return None;
        }
        let candidate = match observed {
            FrameState::Unrecognized => return None,
            FrameState::Typed => InteractionState::Typed,
            FrameState::Submitted => InteractionState::Submitted,
            FrameState::Processing => {
                self.saw_processing = true;
                InteractionState::Processing
            }
        };
        if candidate < self.state {
            tracing::debug!(current = %self.state, observed = %candidate, "ignoring state regression");
            return None;
        }
        self.advance(candidate)
    }

    /// Move to a terminal state.
    pub fn finish(&mut self, terminal: InteractionState) -> Option<InteractionState> {
        debug_assert!(terminal.is_terminal());
        if self.state.is_terminal() {
            return None;
        }
        self.advance(terminal)
    }

    fn advance(&mut self, next: InteractionState) -> Option<InteractionState> {
        if next == self.state {
            return None;
        }
        self.state = next;
        Some(next)
    }
}
