//! tmux-backed session channel.

mod commands;
mod process;

use async_trait::async_trait;

use crate::channel::{SessionChannel, SessionId};
use crate::config::SessionConfig;
use crate::error::SessionUnavailable;
use crate::screen::Frame;

use commands::{
    capture_pane_args, has_session_args, is_duplicate_session_error, load_buffer_args,
    new_session_args, paste_buffer_args, paste_buffer_name, send_keys_args, send_literal_args,
    CaptureOptions,
};
use process::{ensure_success, run_process, ExecOutput};

/// [`SessionChannel`] that shells out to the `tmux` binary for every call.
///
/// Holds no per-session state; one instance can serve many sessions.
#[derive(Debug, Clone)]
pub struct TmuxChannel {
    program: String,
    command: Option<String>,
    width: u16,
    height: u16,
    submit_key: String,
    capture: CaptureOptions,
}

impl TmuxChannel {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            program: config.tmux.clone(),
            command: config.command.clone(),
            width: config.width,
            height: config.height,
            submit_key: config.submit_key.clone(),
            capture: CaptureOptions {
                history_lines: config.history_lines,
                ..CaptureOptions::default()
            },
        }
    }

    async fn exec(
        &self,
        session: &SessionId,
        args: &[String],
        stdin: Option<&[u8]>,
    ) -> Result<ExecOutput, SessionUnavailable> {
        tracing::trace!(session = %session, ?args, "tmux");
        run_process(&self.program, args, stdin)
            .await
            .map_err(|reason| SessionUnavailable::new(session.as_str(), reason))
    }

    async fn exec_checked(
        &self,
        session: &SessionId,
        args: &[String],
        stdin: Option<&[u8]>,
        context: &str,
    ) -> Result<ExecOutput, SessionUnavailable> {
        let output = self.exec(session, args, stdin).await?;
        ensure_success(output, context)
            .map_err(|reason| SessionUnavailable::new(session.as_str(), reason))
    }

    async fn has_session(&self, session: &SessionId) -> Result<bool, SessionUnavailable> {
        let output = self
            .exec(session, &has_session_args(session.as_str()), None)
            .await?;
        Ok(output.exit_code == 0)
    }

    async fn paste_text(&self, session: &SessionId, text: &str) -> Result<(), SessionUnavailable> {
        let buffer = paste_buffer_name(session.as_str());
        self.exec_checked(
            session,
            &load_buffer_args(&buffer),
            Some(text.as_bytes()),
            "failed to load tmux paste buffer",
        )
        .await?;
        self.exec_checked(
            session,
            &paste_buffer_args(session.as_str(), &buffer),
            None,
            "failed to paste into tmux pane",
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SessionChannel for TmuxChannel {
    async fn ensure(&self, session: &SessionId) -> Result<(), SessionUnavailable> {
        if self.has_session(session).await? {
            return Ok(());
        }

        let args = new_session_args(
            session.as_str(),
            self.width,
            self.height,
            self.command.as_deref(),
        );
        let output = self.exec(session, &args, None).await?;
        if output.exit_code == 0 {
            tracing::info!(session = %session, "created tmux session");
            return Ok(());
        }

        let details = output.details();
        if is_duplicate_session_error(&details) && self.has_session(session).await? {
            tracing::debug!(session = %session, "session created concurrently");
            return Ok(());
        }
        Err(SessionUnavailable::new(
            session.as_str(),
            format!("failed to create tmux session: {details}"),
        ))
    }

    async fn type_text(&self, session: &SessionId, text: &str) -> Result<(), SessionUnavailable> {
        if text.is_empty() {
            return Ok(());
        }
        if needs_paste(text) {
            return self.paste_text(session, text).await;
        }
        self.exec_checked(
            session,
            &send_literal_args(session.as_str(), text),
            None,
            "failed to send literal keys to tmux pane",
        )
        .await?;
        Ok(())
    }

    async fn submit(&self, session: &SessionId) -> Result<(), SessionUnavailable> {
        let keys = [self.submit_key.clone()];
        self.exec_checked(
            session,
            &send_keys_args(session.as_str(), &keys),
            None,
            "failed to send submit key to tmux pane",
        )
        .await?;
        Ok(())
    }

    async fn send_keys(
        &self,
        session: &SessionId,
        keys: &[String],
    ) -> Result<(), SessionUnavailable> {
        if keys.is_empty() {
            return Ok(());
        }
        self.exec_checked(
            session,
            &send_keys_args(session.as_str(), keys),
            None,
            "failed to send key sequence to tmux pane",
        )
        .await?;
        Ok(())
    }

    async fn capture_frame(&self, session: &SessionId) -> Result<Frame, SessionUnavailable> {
        let output = self
            .exec_checked(
                session,
                &capture_pane_args(session.as_str(), &self.capture),
                None,
                "failed to capture tmux pane",
            )
            .await?;
        Ok(Frame::new(output.stdout))
    }
}

/// Line breaks typed as literal keys would act as Enter inside the pane.
fn needs_paste(text: &str) -> bool {
    text.contains(['\n', '\r'])
}
