//! Argument builders for the tmux subcommands the channel issues.
//!
//! tmux is spawned directly (no shell), so arguments are passed verbatim and
//! need no quoting. Targets use the `=` prefix for exact session matching;
//! without it `-t work` would also hit a session named `work-2`.

/// Exact-match target for session-level commands (`has-session`).
pub(super) fn session_target(session: &str) -> String {
    format!("={session}")
}

/// Exact-match target for the active pane of a session.
pub(super) fn pane_target(session: &str) -> String {
    format!("={session}:")
}

pub(super) fn has_session_args(session: &str) -> Vec<String> {
    vec![
        "has-session".to_string(),
        "-t".to_string(),
        session_target(session),
    ]
}

pub(super) fn new_session_args(
    session: &str,
    width: u16,
    height: u16,
    command: Option<&str>,
) -> Vec<String> {
    let mut args = vec![
        "new-session".to_string(),
        "-d".to_string(),
        "-s".to_string(),
        session.to_string(),
        "-x".to_string(),
        width.to_string(),
        "-y".to_string(),
        height.to_string(),
    ];
    if let Some(command) = command.map(str::trim).filter(|c| !c.is_empty()) {
        args.push(command.to_string());
    }
    args
}

/// Literal text. `--` keeps text such as `-h` from being read as a flag.
pub(super) fn send_literal_args(session: &str, text: &str) -> Vec<String> {
    vec![
        "send-keys".to_string(),
        "-l".to_string(),
        "-t".to_string(),
        pane_target(session),
        "--".to_string(),
        text.to_string(),
    ]
}

/// Named keys (`Enter`, `C-u`, ...), looked up by tmux's key table.
pub(super) fn send_keys_args(session: &str, keys: &[String]) -> Vec<String> {
    let mut args = vec![
        "send-keys".to_string(),
        "-t".to_string(),
        pane_target(session),
    ];
    args.extend(keys.iter().cloned());
    args
}

/// Per-session buffer name so concurrent sessions never share a buffer.
pub(super) fn paste_buffer_name(session: &str) -> String {
    format!("nudge-{session}")
}

/// Load stdin into the named buffer.
pub(super) fn load_buffer_args(buffer: &str) -> Vec<String> {
    vec![
        "load-buffer".to_string(),
        "-b".to_string(),
        buffer.to_string(),
        "-".to_string(),
    ]
}

/// Paste and delete the named buffer, using bracketed paste when the
/// application asked for it so embedded newlines are not submissions.
pub(super) fn paste_buffer_args(session: &str, buffer: &str) -> Vec<String> {
    vec![
        "paste-buffer".to_string(),
        "-p".to_string(),
        "-d".to_string(),
        "-b".to_string(),
        buffer.to_string(),
        "-t".to_string(),
        pane_target(session),
    ]
}

/// Capture flags for one frame.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct CaptureOptions {
    /// Scrollback lines above the visible screen; 0 captures only the screen.
    pub history_lines: u32,
    /// Join soft-wrapped lines back into one row.
    pub join_wrapped_lines: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            history_lines: 0,
            join_wrapped_lines: true,
        }
    }
}

pub(super) fn capture_pane_args(session: &str, options: &CaptureOptions) -> Vec<String> {
    let mut args = vec!["capture-pane".to_string(), "-p".to_string()];
    if options.join_wrapped_lines {
        args.push("-J".to_string());
    }
    if options.history_lines > 0 {
        args.push("-S".to_string());
        args.push(format!("-{}", options.history_lines));
    }
    args.push("-t".to_string());
    args.push(pane_target(session));
    args
}

/// Whether a failed `new-session` lost a creation race to another caller.
pub(super) fn is_duplicate_session_error(details: &str) -> bool {
    details.contains("duplicate session")
}
