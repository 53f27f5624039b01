//! Command execution engine
//!
//! ```text
//!   ExecutionQueue ──next()──► Bridge::dispatch ──tokio::spawn──► CommandRunner::run
//!        ▲                                                              │
//!        │ advance(result)                                              ▼
//!   controller step ◄────────── mpsc (Completion message) ◄──── ExecutionResult
//! ```
//!
//! Only the receiving side of the channel mutates a queue. Workers get an
//! owned [`Command`] and a label, and report exactly one [`Completion`].

mod batch;
mod bridge;
mod queue;
mod runner;

pub use batch::{run_batch, spawn_batch, BatchReport};
pub use bridge::{Bridge, Completion};
pub use queue::{failure_line, success_line, Advance, ExecutionQueue};
pub use runner::{CommandRunner, ShellRunner};

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

/// Exit code reported when the interpreter could not be started at all
pub const LAUNCH_FAILURE: i32 = -1;

/// A single shell invocation with its operator-facing description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub invocation: String,
    pub description: String,
}

impl Command {
    pub fn new(invocation: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            invocation: invocation.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "{}", self.invocation)
        } else {
            write!(f, "{}", self.description)
        }
    }
}

/// Why a command did not succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Process ran and exited non-zero
    Exit,
    /// Process was terminated by a signal
    Signal,
    /// Interpreter could not be spawned (not found, permissions)
    Launch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of one command run. `exit_code == 0` iff `error.is_none()`.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub command: Command,
    /// stdout and stderr merged in arrival order
    pub output: String,
    pub error: Option<ErrorInfo>,
    pub exit_code: i32,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub duration: Duration,
}

impl ExecutionResult {
    /// Build a result from a process exit code (`None` = killed by signal)
    pub fn from_exit(
        command: Command,
        output: String,
        code: Option<i32>,
        started_at: DateTime<Local>,
        clock: Instant,
    ) -> Self {
        let (exit_code, error) = match code {
            Some(0) => (0, None),
            Some(code) => (
                code,
                Some(ErrorInfo::new(
                    ErrorKind::Exit,
                    format!("exited with status {}", code),
                )),
            ),
            None => (
                LAUNCH_FAILURE,
                Some(ErrorInfo::new(ErrorKind::Signal, "terminated by signal")),
            ),
        };

        Self {
            command,
            output,
            error,
            exit_code,
            started_at,
            finished_at: Local::now(),
            duration: clock.elapsed(),
        }
    }

    /// The interpreter never started
    pub fn launch_failure(
        command: Command,
        message: impl Into<String>,
        started_at: DateTime<Local>,
        clock: Instant,
    ) -> Self {
        let message = message.into();
        Self {
            command,
            output: String::new(),
            error: Some(ErrorInfo::new(
                ErrorKind::Launch,
                format!("failed to launch: {}", message),
            )),
            exit_code: LAUNCH_FAILURE,
            started_at,
            finished_at: Local::now(),
            duration: clock.elapsed(),
        }
    }

    /// Instant successful result (scripted runners, empty batches)
    pub fn succeeded(command: Command, output: impl Into<String>) -> Self {
        let now = Local::now();
        Self {
            command,
            output: output.into(),
            error: None,
            exit_code: 0,
            started_at: now,
            finished_at: now,
            duration: Duration::ZERO,
        }
    }

    /// Instant failed result with the given exit code
    pub fn failed(command: Command, output: impl Into<String>, exit_code: i32) -> Self {
        let now = Local::now();
        let code = if exit_code == 0 { 1 } else { exit_code };
        Self {
            command,
            output: output.into(),
            error: Some(ErrorInfo::new(
                ErrorKind::Exit,
                format!("exited with status {}", code),
            )),
            exit_code: code,
            started_at: now,
            finished_at: now,
            duration: Duration::ZERO,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_launch_failure(&self) -> bool {
        matches!(
            self.error,
            Some(ErrorInfo {
                kind: ErrorKind::Launch,
                ..
            })
        )
    }
}

/// Human-friendly duration: `850ms`, `3.2s`, `2m05s`
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m{:02}s", secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_zero_has_no_error() {
        let result = ExecutionResult::from_exit(
            Command::new("true", "noop"),
            String::new(),
            Some(0),
            Local::now(),
            Instant::now(),
        );
        assert!(result.is_success());
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn test_nonzero_exit_carries_error() {
        let result = ExecutionResult::from_exit(
            Command::new("false", "fail"),
            String::new(),
            Some(3),
            Local::now(),
            Instant::now(),
        );
        assert_eq!(result.exit_code, 3);
        assert_eq!(result.error.as_ref().map(|e| e.kind), Some(ErrorKind::Exit));
    }

    #[test]
    fn test_signal_maps_to_minus_one() {
        let result = ExecutionResult::from_exit(
            Command::new("sleep 100", ""),
            String::new(),
            None,
            Local::now(),
            Instant::now(),
        );
        assert_eq!(result.exit_code, LAUNCH_FAILURE);
        assert!(!result.is_launch_failure());
    }

    #[test]
    fn test_launch_failure() {
        let result = ExecutionResult::launch_failure(
            Command::new("x", ""),
            "No such file or directory",
            Local::now(),
            Instant::now(),
        );
        assert!(result.is_launch_failure());
        assert_eq!(result.exit_code, LAUNCH_FAILURE);
    }

    #[test]
    fn test_failed_never_reports_zero() {
        let result = ExecutionResult::failed(Command::new("x", ""), "", 0);
        assert_eq!(result.exit_code, 1);
        assert!(!result.is_success());
    }

    #[test]
    fn test_command_display_prefers_description() {
        assert_eq!(Command::new("apt-get update", "Refresh index").to_string(), "Refresh index");
        assert_eq!(Command::new("apt-get update", "").to_string(), "apt-get update");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(850)), "850ms");
        assert_eq!(format_duration(Duration::from_millis(3200)), "3.2s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m05s");
    }
}
