//! Test fixtures and helpers
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use hostpilot::catalog::{Catalog, ExecutionMode, Plan};
use hostpilot::exec::{Command, CommandRunner, ExecutionResult};
use hostpilot::logstore::MemoryLogStore;
use hostpilot::monitor::{MetricsSource, MonitorSnapshot, SyntheticMetricsSource};
use hostpilot::tui::views::Payload;
use hostpilot::tui::{App, Message, NavigationState, SharedContext};
use hostpilot::AppConfig;

pub const CATALOG: &str = r#"
schema: hostpilot/catalog@1
services:
  - id: web
    name: Web
    category: webserver
    detect: "true"
    actions:
      - id: install
        name: Install
        marks_installed: true
        fields:
          - name: port
            label: Port
            required: true
            default: "80"
            pattern: "^[0-9]+$"
          - name: token
            secret: true
        steps:
          - run: echo listen {{port}}
            description: Configure
          - run: echo token {{token}}
          - run: "true"
            description: Reload
  - id: db
    name: Database
    category: database
    detect: "false"
    actions:
      - id: restart
        name: Restart
        steps:
          - run: "true"
  - id: tidy
    name: Tidy
    category: maintenance
    actions:
      - id: clean
        name: Clean
        mode: batch
        steps:
          - run: echo a
          - run: exit 1
          - run: echo b
"#;

/// Runner that never spawns a process; commands listed in `failing` exit 1
pub struct ScriptedRunner {
    failing: HashSet<String>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::failing(&[])
    }

    pub fn failing(invocations: &[&str]) -> Self {
        Self {
            failing: invocations.iter().map(|s| s.to_string()).collect(),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Invocations run so far, in order
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &Command) -> ExecutionResult {
        self.seen.lock().push(command.invocation.clone());
        if self.failing.contains(&command.invocation) {
            ExecutionResult::failed(command.clone(), format!("{} broke", command.invocation), 1)
        } else {
            ExecutionResult::succeeded(command.clone(), format!("ran {}", command.invocation))
        }
    }
}

/// Metrics source that always answers with synthetic data
pub struct OfflineMetrics;

#[async_trait]
impl MetricsSource for OfflineMetrics {
    async fn fetch(&self) -> hostpilot::Result<MonitorSnapshot> {
        Ok(SyntheticMetricsSource.generate("offline"))
    }
}

pub fn catalog() -> Catalog {
    Catalog::from_yaml(CATALOG).unwrap()
}

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

pub fn context() -> (SharedContext, Arc<MemoryLogStore>) {
    let log = Arc::new(MemoryLogStore::new());
    let dir = std::env::temp_dir().join(format!(
        "hostpilot-it-{}-{}",
        std::process::id(),
        NEXT_DIR.fetch_add(1, Ordering::Relaxed)
    ));
    let ctx = SharedContext::new(Arc::new(catalog()), AppConfig::default(), log.clone())
        .with_config_path(dir.join("config.toml"));
    (ctx, log)
}

pub struct Harness {
    pub app: App,
    pub rx: mpsc::UnboundedReceiver<Message>,
    pub log: Arc<MemoryLogStore>,
}

pub fn harness(runner: Arc<dyn CommandRunner>) -> Harness {
    let (tx, rx) = mpsc::unbounded_channel();
    let (ctx, log) = context();
    let mut app = App::new(ctx, runner, Arc::new(OfflineMetrics), tx);
    app.start();
    Harness { app, rx, log }
}

impl Harness {
    /// Feed background messages back into the controller until the queue is idle
    pub async fn drain(&mut self) {
        while self.app.context().queue.is_active() {
            let msg = tokio::time::timeout(Duration::from_secs(10), self.rx.recv())
                .await
                .expect("timed out waiting for a completion")
                .expect("mailbox closed");
            self.app.update(msg);
        }
    }

    pub fn press(&mut self, code: KeyCode) {
        self.app.update(Message::Key(KeyEvent::from(code)));
    }

    /// Review `plan` on the confirm screen and accept it
    pub fn run(&mut self, plan: Plan) {
        self.app
            .update(Message::Navigate(NavigationState::Confirm, Payload::Plan(plan)));
        self.press(KeyCode::Enter);
    }

    /// Wait for one message and apply it
    pub async fn step(&mut self) {
        let msg = tokio::time::timeout(Duration::from_secs(10), self.rx.recv())
            .await
            .expect("timed out waiting for a message")
            .expect("mailbox closed");
        self.app.update(msg);
    }
}

pub fn plan(label: &str, mode: ExecutionMode, commands: &[(&str, &str)]) -> Plan {
    Plan {
        label: label.to_string(),
        title: label.to_string(),
        commands: commands
            .iter()
            .map(|(inv, desc)| Command::new(*inv, *desc))
            .collect(),
        mode,
        installs: None,
        secrets: Vec::new(),
    }
}
