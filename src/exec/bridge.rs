//! Completion bridge - background work re-enters the loop as a message.
//!
//! A worker never calls back into the controller. It owns a clone of the
//! mailbox sender and posts exactly one message when it is done.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{Command, CommandRunner, ExecutionResult};

/// A finished command, tagged with the queue it belongs to
#[derive(Debug, Clone)]
pub struct Completion {
    pub label: String,
    pub result: ExecutionResult,
}

pub struct Bridge<M> {
    runner: Arc<dyn CommandRunner>,
    tx: mpsc::UnboundedSender<M>,
}

impl<M> Clone for Bridge<M> {
    fn clone(&self) -> Self {
        Self {
            runner: Arc::clone(&self.runner),
            tx: self.tx.clone(),
        }
    }
}

impl<M> Bridge<M>
where
    M: From<Completion> + Send + 'static,
{
    pub fn new(runner: Arc<dyn CommandRunner>, tx: mpsc::UnboundedSender<M>) -> Self {
        Self { runner, tx }
    }

    pub fn runner(&self) -> Arc<dyn CommandRunner> {
        Arc::clone(&self.runner)
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<M> {
        self.tx.clone()
    }

    /// Run one command on a background task; its completion arrives as `M`
    pub fn dispatch(&self, command: Command, label: impl Into<String>) -> JoinHandle<()> {
        let runner = Arc::clone(&self.runner);
        let label = label.into();
        debug!(label = %label, cmd = %command.invocation, "dispatch");
        self.post(async move {
            let result = runner.run(&command).await;
            M::from(Completion { label, result })
        })
    }

    /// Run any future on a background task and post its output
    pub fn post<F>(&self, work: F) -> JoinHandle<()>
    where
        F: Future<Output = M> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let message = work.await;
            if tx.send(message).is_err() {
                debug!("mailbox closed, dropping background result");
            }
        })
    }
}
