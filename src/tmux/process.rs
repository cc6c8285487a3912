//! Child-process helpers for invoking the tmux binary.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Captured result of one finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    /// Stderr when present, else stdout, else the exit status.
    pub fn details(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        format!("command exited with {}", self.exit_code)
    }
}

/// Spawn and wait for a process, optionally piping stdin.
///
/// Errors are spawn or pipe failures rendered as text; a non-zero exit is
/// returned as a normal [`ExecOutput`].
pub(super) async fn run_process(
    program: &str,
    args: &[String],
    stdin: Option<&[u8]>,
) -> Result<ExecOutput, String> {
    let mut cmd = Command::new(program);
    // Dropping the driver's future must not leave a stray tmux client behind.
    cmd.kill_on_drop(true);
    cmd.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());
    cmd.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });

    let mut child = cmd.spawn().map_err(|e| format!("{program}: {e}"))?;

    if let Some(input) = stdin {
        if let Some(mut child_stdin) = child.stdin.take() {
            child_stdin
                .write_all(input)
                .await
                .map_err(|e| format!("{program}: {e}"))?;
            // Close the pipe so `load-buffer -` sees EOF.
            drop(child_stdin);
        }
    }

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| format!("{program}: {e}"))?;

    Ok(ExecOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// Convert a non-zero exit status into a contextual message.
pub(super) fn ensure_success(output: ExecOutput, context: &str) -> Result<ExecOutput, String> {
    if output.exit_code == 0 {
        return Ok(output);
    }
    Err(format!("{context}: {}", output.details()))
}
