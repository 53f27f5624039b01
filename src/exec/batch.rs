//! Batch mode - a whole command list on one background task.
//!
//! Not a second execution path: the batch drives a private
//! [`ExecutionQueue`] through the same [`Bridge`] and [`ExecutionQueue::advance`]
//! step the console uses, it just consumes its own completions instead of
//! yielding them to the UI loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use super::{Advance, Bridge, Command, CommandRunner, Completion, ExecutionQueue, ExecutionResult};

/// Aggregated outcome of a batch
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub label: String,
    /// Concatenated output, first error, summed duration
    pub result: ExecutionResult,
    /// Per-step results, in execution order
    pub steps: Vec<ExecutionResult>,
    /// Success/failure lines, same format as the stepped queue
    pub results_log: Vec<String>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }
}

/// Run `commands` in order, stopping at the first failure
pub async fn run_batch(
    runner: Arc<dyn CommandRunner>,
    label: &str,
    commands: Vec<Command>,
) -> BatchReport {
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
    let bridge = Bridge::new(runner, tx);

    let mut queue = ExecutionQueue::with_label(label);
    queue.extend(commands.iter().cloned());

    let mut steps = Vec::new();
    if let Some(first) = queue.start() {
        info!(label, total = queue.len(), "batch started");
        bridge.dispatch(first, label);

        while let Some(completion) = rx.recv().await {
            let advance = queue.advance(&completion.result);
            steps.push(completion.result);
            match advance {
                Advance::Dispatch(next) => {
                    bridge.dispatch(next, label);
                }
                Advance::Finished | Advance::Halted => break,
            }
        }
    }

    info!(label, steps = steps.len(), "batch finished");

    BatchReport {
        label: label.to_string(),
        result: aggregate(label, &commands, &steps),
        steps,
        results_log: queue.results().to_vec(),
    }
}

/// Run a batch on one background task and post the report as `M`
pub fn spawn_batch<M>(
    runner: Arc<dyn CommandRunner>,
    label: impl Into<String>,
    commands: Vec<Command>,
    tx: mpsc::UnboundedSender<M>,
) -> JoinHandle<()>
where
    M: From<BatchReport> + Send + 'static,
{
    let label = label.into();
    tokio::spawn(async move {
        let report = run_batch(runner, &label, commands).await;
        let _ = tx.send(M::from(report));
    })
}

fn aggregate(label: &str, commands: &[Command], steps: &[ExecutionResult]) -> ExecutionResult {
    let invocation = commands
        .iter()
        .map(|c| c.invocation.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let command = Command::new(invocation, label);

    let mut output = String::new();
    for step in steps {
        output.push_str(&format!("$ {}\n", step.command.invocation));
        output.push_str(&step.output);
        if !step.output.is_empty() && !step.output.ends_with('\n') {
            output.push('\n');
        }
    }

    let first_failure = steps.iter().find(|s| s.error.is_some());
    let now = Local::now();

    ExecutionResult {
        command,
        output,
        error: first_failure.and_then(|s| s.error.clone()),
        exit_code: first_failure.map(|s| s.exit_code).unwrap_or(0),
        started_at: steps.first().map(|s| s.started_at).unwrap_or(now),
        finished_at: steps.last().map(|s| s.finished_at).unwrap_or(now),
        duration: steps.iter().map(|s| s.duration).sum::<Duration>(),
    }
}
