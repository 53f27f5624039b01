//! # Execution Engine Tests
//!
//! Drives the controller the way the console loop does: keys and background
//! messages go through `App::update`, completions come back over the mailbox.
//!
//! ## Test Categories
//!
//! 1. Stepped queue - success, halt on failure, empty list
//! 2. Batch mode - aggregated report, stop at first failure
//! 3. Stale completions and collaborator failures
//! 4. Real shell - `true` / `false`

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;

use common::{harness, plan, ScriptedRunner};
use hostpilot::catalog::{ExecutionMode, InstallMark};
use hostpilot::error::Result;
use hostpilot::exec::{
    run_batch, Command, CommandRunner, Completion, ExecutionQueue, ExecutionResult, ShellRunner,
};
use hostpilot::logstore::LogStore;
use hostpilot::tui::{Message, NavigationState};

// ============================================================================
// STEPPED QUEUE
// ============================================================================

#[tokio::test]
async fn test_all_success_runs_every_command_once() {
    for len in 1..=5 {
        let runner = Arc::new(ScriptedRunner::new());
        let mut h = harness(runner.clone());

        let commands: Vec<String> = (0..len).map(|i| format!("step {}", i)).collect();
        let pairs: Vec<(&str, &str)> = commands.iter().map(|c| (c.as_str(), "")).collect();
        h.run(plan("svc/ok", ExecutionMode::Stepped, &pairs));
        h.drain().await;

        assert_eq!(runner.seen(), commands);
        let queue = &h.app.context().queue;
        assert!(!queue.has_next());
        assert!(!queue.is_active());
        assert_eq!(queue.results().len(), len);
        assert!(queue.results().iter().all(|line| line.starts_with('✓')));
    }
}

#[tokio::test]
async fn test_failure_at_k_halts_the_queue() {
    let len = 5;
    for k in 1..len {
        let failing = format!("step {}", k);
        let runner = Arc::new(ScriptedRunner::failing(&[failing.as_str()]));
        let mut h = harness(runner.clone());

        let commands: Vec<String> = (1..=len).map(|i| format!("step {}", i)).collect();
        let pairs: Vec<(&str, &str)> = commands.iter().map(|c| (c.as_str(), "")).collect();
        h.run(plan("svc/fail", ExecutionMode::Stepped, &pairs));
        h.drain().await;

        assert_eq!(runner.seen(), commands[..k].to_vec(), "failing at {}", k);
        let ctx = h.app.context();
        assert!(!ctx.queue.has_next());
        assert!(ctx.queue.commands().is_empty());
        assert!(!ctx.queue.is_active());
        assert_eq!(ctx.queue.results().len(), k);
        let last = ctx.queue.results().last().unwrap();
        assert!(last.starts_with('✗'), "last line: {}", last);
        assert!(last.contains(&failing));
        assert_eq!(
            ctx.last_failure.as_ref().map(|r| r.command.invocation.clone()),
            Some(failing)
        );
    }
}

#[tokio::test]
async fn test_failure_shows_processing_with_partial_results() {
    let runner = Arc::new(ScriptedRunner::failing(&["false"]));
    let mut h = harness(runner);

    h.run(plan(
        "svc/mixed",
        ExecutionMode::Stepped,
        &[("true", "ok"), ("false", "fail")],
    ));
    h.drain().await;

    assert_eq!(h.app.navigator().current(), NavigationState::Processing);
    let ctx = h.app.context();
    assert!(ctx.processing_message.starts_with("Failed at step 2 of 2"));
    assert_eq!(ctx.queue.results().len(), 2);
    assert!(ctx.queue.results()[0].starts_with("✓ ok"));
    assert!(ctx.queue.results()[1].starts_with("✗ fail"));
}

#[tokio::test]
async fn test_empty_plan_never_dispatches() {
    let runner = Arc::new(ScriptedRunner::new());
    let mut h = harness(runner.clone());

    h.run(plan("svc/empty", ExecutionMode::Stepped, &[]));

    let ctx = h.app.context();
    assert!(!ctx.queue.has_next());
    assert!(!ctx.queue.is_active());
    assert_eq!(ctx.processing_message, "Nothing to run");
    assert_eq!(h.app.navigator().current(), NavigationState::Processing);
    assert!(h.rx.try_recv().is_err());
    assert!(runner.seen().is_empty());
}

#[tokio::test]
async fn test_empty_batch_plan_never_dispatches() {
    let runner = Arc::new(ScriptedRunner::new());
    let mut h = harness(runner.clone());

    let mut empty = plan("db/restart", ExecutionMode::Batch, &[]);
    empty.installs = Some(InstallMark {
        service: "db".to_string(),
        installed: true,
    });
    h.run(empty);
    tokio::task::yield_now().await;

    let ctx = h.app.context();
    assert!(!ctx.queue.is_active());
    assert_eq!(ctx.processing_message, "Nothing to run");
    assert_eq!(h.app.navigator().current(), NavigationState::Processing);
    assert!(h.rx.try_recv().is_err(), "no batch task was spawned");
    assert_ne!(ctx.is_installed("db"), Some(true));
    assert!(runner.seen().is_empty());
}

#[test]
fn test_reset_is_idempotent() {
    let mut queue = ExecutionQueue::with_label("x");
    queue.add_command("a", "A");
    queue.add_command("b", "B");
    queue.start();
    queue.add_result("line");

    queue.reset();
    let once = queue.clone();
    queue.reset();
    assert_eq!(queue, once);
    assert_eq!(queue, ExecutionQueue::new());
}

#[tokio::test]
async fn test_processing_returns_home_only_when_idle() {
    let runner = Arc::new(ScriptedRunner::new());
    let mut h = harness(runner);

    h.run(plan("svc/ok", ExecutionMode::Stepped, &[("a", ""), ("b", "")]));
    h.press(crossterm::event::KeyCode::Enter);
    assert_eq!(h.app.navigator().current(), NavigationState::Processing);

    h.drain().await;
    h.press(crossterm::event::KeyCode::Enter);
    assert_eq!(h.app.navigator().current(), NavigationState::Menu);
    assert_eq!(h.app.navigator().depth(), 0);
}

#[tokio::test]
async fn test_successful_install_marks_service() {
    let runner = Arc::new(ScriptedRunner::new());
    let mut h = harness(runner);

    let plan = {
        use hostpilot::catalog::{ActionProvider, FieldValues};
        h.app
            .context()
            .catalog
            .plan("web", "install", &FieldValues::new())
            .unwrap()
    };
    h.run(plan);
    h.drain().await;

    assert_eq!(h.app.context().is_installed("web"), Some(true));
}

// ============================================================================
// BATCH MODE
// ============================================================================

#[tokio::test]
async fn test_batch_stops_at_first_failure() {
    let runner: Arc<dyn CommandRunner> = Arc::new(ShellRunner::default());
    let commands = vec![
        Command::new("echo a", ""),
        Command::new("exit 1", ""),
        Command::new("echo b", ""),
    ];

    let report = run_batch(runner, "tidy/clean", commands).await;

    assert!(!report.is_success());
    assert!(report.result.error.is_some());
    assert_eq!(report.steps.len(), 2);
    assert!(report.result.output.contains("a\n"));
    assert!(!report.result.output.contains("b\n"));
    assert_eq!(report.results_log.len(), 2);
    assert!(report.results_log[1].starts_with('✗'));
}

#[tokio::test]
async fn test_batch_plan_goes_through_the_mailbox() {
    let runner = Arc::new(ScriptedRunner::failing(&["exit 1"]));
    let mut h = harness(runner.clone());

    h.run(plan(
        "tidy/clean",
        ExecutionMode::Batch,
        &[("echo a", ""), ("exit 1", ""), ("echo b", "")],
    ));
    assert!(h.app.context().queue.is_active());
    h.drain().await;

    assert_eq!(runner.seen(), vec!["echo a", "exit 1"]);
    let ctx = h.app.context();
    assert_eq!(ctx.queue.results().len(), 2);
    assert!(ctx.last_failure.is_some());

    let lines = h.log.read_lines().unwrap();
    assert!(lines[0].contains("✗ exit 1"), "header: {}", lines[0]);
    assert!(lines.iter().any(|l| l.contains("$ exit 1")));
    assert!(!lines.iter().any(|l| l.contains("ran echo b")));
}

// ============================================================================
// STALE COMPLETIONS AND COLLABORATOR FAILURES
// ============================================================================

#[tokio::test]
async fn test_stale_completion_is_ignored() {
    let runner = Arc::new(ScriptedRunner::new());
    let mut h = harness(runner);

    h.app.update(Message::CommandCompleted(Completion {
        label: "old/queue".to_string(),
        result: ExecutionResult::succeeded(Command::new("late", ""), ""),
    }));

    let ctx = h.app.context();
    assert!(ctx.queue.results().is_empty());
    assert!(!ctx.queue.is_active());
    assert!(h.log.is_empty());
}

struct BrokenLog;

impl LogStore for BrokenLog {
    fn log_command(&self, _result: &ExecutionResult) -> Result<()> {
        Err(hostpilot::HostpilotError::LogWrite {
            reason: "disk full".to_string(),
        })
    }

    fn read_lines(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_log_failure_is_reported_and_queue_continues() {
    let runner = Arc::new(ScriptedRunner::new());
    let mut h = harness(runner.clone());
    h.app.context_mut().log = Arc::new(BrokenLog);

    h.run(plan("svc/ok", ExecutionMode::Stepped, &[("a", ""), ("b", "")]));
    h.drain().await;

    assert_eq!(runner.seen(), vec!["a", "b"]);
    let results = h.app.context().queue.results();
    assert_eq!(results.iter().filter(|l| l.starts_with('⚠')).count(), 2);
    assert_eq!(results.iter().filter(|l| l.starts_with('✓')).count(), 2);
}

// ============================================================================
// REAL SHELL
// ============================================================================

#[tokio::test]
async fn test_true_then_false_with_real_shell() {
    let mut h = harness(Arc::new(ShellRunner::default()));

    h.run(plan(
        "svc/real",
        ExecutionMode::Stepped,
        &[("true", "ok"), ("false", "fail")],
    ));
    h.drain().await;

    let ctx = h.app.context();
    assert_eq!(ctx.queue.results().len(), 2);
    assert!(ctx.queue.results()[0].starts_with('✓'));
    assert!(ctx.queue.results()[1].starts_with('✗'));
    assert!(ctx.queue.commands().is_empty());
    assert_eq!(ctx.last_failure.as_ref().map(|r| r.exit_code), Some(1));
    assert_eq!(h.app.navigator().current(), NavigationState::Processing);
}

#[tokio::test]
async fn test_missing_shell_is_a_launch_failure() {
    let mut h = harness(Arc::new(ShellRunner::new("/nonexistent/shell")));

    h.run(plan("svc/nope", ExecutionMode::Stepped, &[("true", "")]));
    h.drain().await;

    let failure = h.app.context().last_failure.clone().unwrap();
    assert!(failure.is_launch_failure());
    assert_eq!(failure.exit_code, -1);
}
