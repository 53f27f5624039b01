//! Command log persistence
//!
//! One entry per completed command (or per batch): a timestamped header line
//! followed by the command output, indented.
//!
//! ```text
//! [2026-10-18 14:02:11] ✓ exit 0 (0.4s) Install nginx
//!     $ apt-get install -y nginx
//!     Reading package lists...
//! ```

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::catalog::redact;
use crate::error::{HostpilotError, Result};
use crate::exec::{format_duration, ExecutionResult};

/// Append-only command history
pub trait LogStore: Send + Sync {
    fn log_command(&self, result: &ExecutionResult) -> Result<()>;
    fn read_lines(&self) -> Result<Vec<String>>;
}

/// Copy of `result` with secret values masked in the invocation and output
pub fn redact_result(result: &ExecutionResult, secrets: &[String]) -> ExecutionResult {
    let mut redacted = result.clone();
    redacted.command.invocation = redact(&result.command.invocation, secrets);
    redacted.command.description = redact(&result.command.description, secrets);
    redacted.output = redact(&result.output, secrets);
    redacted
}

/// Render one entry
pub fn format_entry(result: &ExecutionResult) -> Vec<String> {
    let mark = if result.is_success() { "✓" } else { "✗" };
    let mut lines = vec![format!(
        "[{}] {} exit {} ({}) {}",
        result.finished_at.format("%Y-%m-%d %H:%M:%S"),
        mark,
        result.exit_code,
        format_duration(result.duration),
        result.command
    )];

    for invocation in result.command.invocation.lines() {
        lines.push(format!("    $ {}", invocation));
    }
    for line in result.output.lines() {
        lines.push(format!("    {}", line));
    }
    if let Some(err) = &result.error {
        lines.push(format!("    ! {}", err));
    }

    lines
}

/// Log file on disk
#[derive(Debug, Clone)]
pub struct FileLogStore {
    path: PathBuf,
}

impl FileLogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogStore for FileLogStore {
    fn log_command(&self, result: &ExecutionResult) -> Result<()> {
        let write_err = |e: std::io::Error| HostpilotError::LogWrite {
            reason: format!("{}: {}", self.path.display(), e),
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;

        for line in format_entry(result) {
            writeln!(file, "{}", line).map_err(write_err)?;
        }
        Ok(())
    }

    fn read_lines(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| HostpilotError::LogRead {
            reason: format!("{}: {}", self.path.display(), e),
        })?;
        Ok(content.lines().map(str::to_string).collect())
    }
}

/// In-memory log, used by tests and `--no-log`
#[derive(Debug, Clone, Default)]
pub struct MemoryLogStore {
    lines: Arc<RwLock<Vec<String>>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored lines
    pub fn len(&self) -> usize {
        self.lines.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.read().is_empty()
    }
}

impl LogStore for MemoryLogStore {
    fn log_command(&self, result: &ExecutionResult) -> Result<()> {
        self.lines.write().extend(format_entry(result));
        Ok(())
    }

    fn read_lines(&self) -> Result<Vec<String>> {
        Ok(self.lines.read().clone())
    }
}
