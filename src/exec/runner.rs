//! Command runner - one subprocess per call, merged output, timing.

use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Local;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use super::{Command, ExecutionResult};
use crate::config::DEFAULT_SHELL;

/// Runs a single command to completion.
///
/// Implementations never touch shared state; everything they learn goes
/// into the returned [`ExecutionResult`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &Command) -> ExecutionResult;
}

/// Runs invocations through `<shell> -c`
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
}

impl ShellRunner {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL)
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &Command) -> ExecutionResult {
        let started_at = Local::now();
        let clock = Instant::now();
        debug!(shell = %self.shell, cmd = %command.invocation, "spawning");

        let spawned = tokio::process::Command::new(&self.shell)
            .arg("-c")
            .arg(&command.invocation)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                debug!("launch failed: {}", e);
                return ExecutionResult::launch_failure(command.clone(), e.to_string(), started_at, clock);
            }
        };

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, tx.clone()));
        }
        drop(tx);

        let mut output = String::new();
        while let Some(line) = rx.recv().await {
            output.push_str(&line);
            output.push('\n');
        }

        match child.wait().await {
            Ok(status) => {
                debug!(code = ?status.code(), "command exited");
                ExecutionResult::from_exit(command.clone(), output, status.code(), started_at, clock)
            }
            Err(e) => ExecutionResult::launch_failure(command.clone(), e.to_string(), started_at, clock),
        }
    }
}

/// Pump one pipe line by line; non-UTF-8 bytes are replaced
async fn forward_lines<R>(stream: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf)
                    .trim_end_matches(['\n', '\r'])
                    .to_string();
                if tx.send(line).is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{ErrorKind, LAUNCH_FAILURE};

    #[tokio::test]
    async fn test_echo_captures_stdout() {
        let runner = ShellRunner::default();
        let result = runner.run(&Command::new("echo hello", "greet")).await;
        assert!(result.is_success());
        assert_eq!(result.output.trim(), "hello");
        assert!(result.finished_at >= result.started_at);
    }

    #[tokio::test]
    async fn test_stderr_is_merged() {
        let runner = ShellRunner::default();
        let result = runner
            .run(&Command::new("echo out; echo err 1>&2", "both"))
            .await;
        assert!(result.output.contains("out"));
        assert!(result.output.contains("err"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_code() {
        let runner = ShellRunner::default();
        let result = runner.run(&Command::new("exit 7", "fail")).await;
        assert_eq!(result.exit_code, 7);
        assert_eq!(result.error.map(|e| e.kind), Some(ErrorKind::Exit));
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_launch_failure() {
        let runner = ShellRunner::new("/nonexistent/hostpilot-shell");
        let result = runner.run(&Command::new("true", "noop")).await;
        assert!(result.is_launch_failure());
        assert_eq!(result.exit_code, LAUNCH_FAILURE);
    }
}
