//! Execution queue: ordered commands, a cursor and a running results log.
//!
//! Invariants: `0 <= cursor <= commands.len()`, `has_next() <=> cursor < len`.
//! Not synchronized: only the controller step touches it.

use super::{format_duration, Command, ExecutionResult};

/// What to do after a command completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Dispatch this command next
    Dispatch(Command),
    /// Every command succeeded; queue is now inactive
    Finished,
    /// The command failed; pending commands were discarded
    Halted,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionQueue {
    commands: Vec<Command>,
    cursor: usize,
    results: Vec<String>,
    label: String,
    active: bool,
}

impl ExecutionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn add_command(&mut self, invocation: impl Into<String>, description: impl Into<String>) {
        self.commands.push(Command::new(invocation, description));
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn extend(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.commands.extend(commands);
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.commands.len()
    }

    /// Take the next command and advance the cursor.
    ///
    /// Returns `None` (and leaves the queue untouched) when exhausted.
    pub fn next(&mut self) -> Option<Command> {
        let command = self.commands.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(command)
    }

    pub fn add_result(&mut self, line: impl Into<String>) {
        self.results.push(line.into());
    }

    /// Clear everything, label and active flag included
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Discard pending commands after a failure, keeping the label and the
    /// results log so partial progress stays visible.
    pub fn halt(&mut self) {
        self.commands.clear();
        self.cursor = 0;
        self.active = false;
    }

    /// Mark active and hand out the first command.
    ///
    /// An empty queue is marked inactive and yields nothing.
    pub fn start(&mut self) -> Option<Command> {
        let first = self.next();
        self.active = first.is_some();
        first
    }

    /// Record a completed command and decide the next step
    pub fn advance(&mut self, result: &ExecutionResult) -> Advance {
        if result.error.is_some() {
            self.halt();
            self.add_result(failure_line(result));
            return Advance::Halted;
        }

        self.add_result(success_line(result));
        match self.next() {
            Some(command) => Advance::Dispatch(command),
            None => {
                self.active = false;
                Advance::Finished
            }
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn results(&self) -> &[String] {
        &self.results
    }

    /// The command most recently handed out by `next()`
    pub fn current(&self) -> Option<&Command> {
        self.cursor
            .checked_sub(1)
            .and_then(|idx| self.commands.get(idx))
    }
}

pub fn success_line(result: &ExecutionResult) -> String {
    format!(
        "✓ {} ({})",
        result.command,
        format_duration(result.duration)
    )
}

pub fn failure_line(result: &ExecutionResult) -> String {
    let reason = result
        .error
        .as_ref()
        .map(|e| e.message.as_str())
        .unwrap_or("failed");
    format!(
        "✗ {} failed [exit {}]: {}",
        result.command, result.exit_code, reason
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue_of(n: usize) -> ExecutionQueue {
        let mut queue = ExecutionQueue::with_label("test");
        for i in 0..n {
            queue.add_command(format!("echo {}", i), format!("step {}", i));
        }
        queue
    }

    #[test]
    fn test_next_walks_in_order() {
        let mut queue = queue_of(2);
        assert!(queue.has_next());
        assert_eq!(queue.next().unwrap().invocation, "echo 0");
        assert_eq!(queue.current().unwrap().invocation, "echo 0");
        assert_eq!(queue.next().unwrap().invocation, "echo 1");
        assert!(!queue.has_next());
        assert_eq!(queue.cursor(), 2);
    }

    #[test]
    fn test_next_on_exhausted_queue_is_rejected() {
        let mut queue = queue_of(1);
        queue.next();
        assert_eq!(queue.next(), None);
        assert_eq!(queue.cursor(), 1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut queue = queue_of(3);
        queue.start();
        queue.add_result("line");
        queue.reset();
        assert_eq!(queue, ExecutionQueue::default());
        assert_eq!(queue.label(), "");
        assert!(!queue.is_active());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut once = queue_of(3);
        once.start();
        once.reset();
        let mut twice = once.clone();
        twice.reset();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_start_on_empty_queue_stays_inactive() {
        let mut queue = ExecutionQueue::with_label("empty");
        assert!(!queue.has_next());
        assert_eq!(queue.start(), None);
        assert!(!queue.is_active());
    }

    #[test]
    fn test_advance_success_then_finish() {
        let mut queue = queue_of(2);
        let first = queue.start().unwrap();
        assert!(queue.is_active());

        let second = match queue.advance(&ExecutionResult::succeeded(first, "")) {
            Advance::Dispatch(cmd) => cmd,
            other => panic!("expected dispatch, got {:?}", other),
        };
        assert_eq!(
            queue.advance(&ExecutionResult::succeeded(second, "")),
            Advance::Finished
        );
        assert!(!queue.is_active());
        assert_eq!(queue.results().len(), 2);
    }

    #[test]
    fn test_advance_failure_halts_and_keeps_log() {
        let mut queue = queue_of(3);
        let first = queue.start().unwrap();
        queue.advance(&ExecutionResult::succeeded(first, ""));
        let second = queue.current().cloned().unwrap();

        let advance = queue.advance(&ExecutionResult::failed(second, "boom", 2));
        assert_eq!(advance, Advance::Halted);
        assert!(!queue.has_next());
        assert!(queue.commands().is_empty());
        assert!(!queue.is_active());
        assert_eq!(queue.label(), "test");
        assert_eq!(queue.results().len(), 2);
        assert!(queue.results()[1].contains("exit 2"));
    }
}
