//! Shell execution via `tokio::process`

use crate::report::Outcome;
use aitests_core::RunnerConfig;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

/// Exit code reported when a run exceeds its timeout
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Stdout marker for dry runs
pub const DRY_RUN_MARKER: &str = "[dry-run]";

/// Bytes captured per output stream
pub const MAX_CAPTURE_BYTES: usize = 10 * 1024 * 1024;

struct Captured {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

/// Read `reader` to the end, keeping at most `max_bytes`
///
/// Input past the cap is drained so the child never blocks on a full pipe.
pub(crate) async fn read_bounded<R: AsyncRead + Unpin>(
    mut reader: R,
    max_bytes: usize,
) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(8192);
    let mut chunk = [0u8; 8192];
    let mut truncated = false;

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        let remaining = max_bytes.saturating_sub(buf.len());
        if n > remaining {
            truncated = true;
        }
        buf.extend_from_slice(&chunk[..n.min(remaining)]);
    }

    if truncated {
        tracing::warn!(max_bytes, "test command output truncated");
    }
    Ok(buf)
}

async fn capture(mut child: Child) -> std::io::Result<Captured> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let stdout = async move {
        match stdout {
            Some(pipe) => read_bounded(pipe, MAX_CAPTURE_BYTES).await,
            None => Ok(Vec::new()),
        }
    };
    let stderr = async move {
        match stderr {
            Some(pipe) => read_bounded(pipe, MAX_CAPTURE_BYTES).await,
            None => Ok(Vec::new()),
        }
    };

    let (stdout, stderr, status) = tokio::join!(stdout, stderr, child.wait());
    Ok(Captured {
        status: status?,
        stdout: stdout?,
        stderr: stderr?,
    })
}

#[cfg(not(windows))]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command_line);
    cmd
}

#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command_line);
    cmd
}

pub(crate) async fn execute(
    command_line: &str,
    runner: &RunnerConfig,
    timeout: Option<Duration>,
) -> Outcome {
    let mut cmd = shell_command(command_line);
    if let Some(cwd) = &runner.cwd {
        cmd.current_dir(cwd);
    }
    if let Some(env) = &runner.env {
        cmd.envs(env);
    }
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!(command = command_line, error = %e, "failed to spawn test command");
            return Outcome::failed(1, "", format!("failed to spawn '{command_line}': {e}"));
        }
    };

    let waited = capture(child);
    let output = match timeout {
        Some(limit) => match tokio::time::timeout(limit, waited).await {
            Ok(output) => output,
            Err(_) => {
                tracing::warn!(
                    command = command_line,
                    timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    "test command timed out"
                );
                return Outcome::failed(
                    TIMEOUT_EXIT_CODE,
                    "",
                    format!("command timed out after {}s", limit.as_secs_f64()),
                );
            }
        },
        None => waited.await,
    };

    match output {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            if output.status.success() {
                Outcome::success(stdout, stderr)
            } else {
                let code = output.status.code().unwrap_or(1);
                let stderr = if stderr.is_empty() {
                    format!("command exited with status {code}")
                } else {
                    stderr
                };
                Outcome::failed(code, stdout, stderr)
            }
        }
        Err(e) => Outcome::failed(1, "", format!("failed to wait for '{command_line}': {e}")),
    }
}
