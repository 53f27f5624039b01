//! Root controller
//!
//! Owns the navigator, the view registry and the shared context, and is the
//! only place where any of them is mutated. Every input, timer tick and
//! background result goes through [`App::update`], one message at a time:
//!
//! 1. Ctrl+C quits, nothing else runs
//! 2. navigation messages go to the navigator
//! 3. command/batch completions go to the completion handlers
//! 4. everything else updates the context or goes to a view
//!
//! The controller never awaits background work. It dispatches through the
//! [`Bridge`] and picks the result up later as a message.

use std::sync::Arc;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::context::SharedContext;
use super::message::Message;
use super::navigator::{NavigationState, Navigator};
use super::theme::Theme;
use super::views::{Payload, View, ViewAction, ViewRegistry};
use super::widgets::utils::truncate;
use crate::catalog::{ExecutionMode, Plan};
use crate::config::AppConfig;
use crate::exec::{
    spawn_batch, Advance, BatchReport, Bridge, CommandRunner, Completion, ExecutionResult,
    ShellRunner,
};
use crate::logstore::{redact_result, FileLogStore};
use crate::monitor::{FallbackMetricsSource, MetricsSource};
use crate::probe;

pub struct App {
    navigator: Navigator,
    views: ViewRegistry,
    ctx: SharedContext,
    bridge: Bridge<Message>,
    metrics: Arc<dyn MetricsSource>,
    theme: Theme,
    should_quit: bool,
}

impl App {
    pub fn new(
        ctx: SharedContext,
        runner: Arc<dyn CommandRunner>,
        metrics: Arc<dyn MetricsSource>,
        tx: mpsc::UnboundedSender<Message>,
    ) -> Self {
        Self {
            navigator: Navigator::new(),
            views: ViewRegistry::standard(),
            ctx,
            bridge: Bridge::new(runner, tx),
            metrics,
            theme: Theme::default(),
            should_quit: false,
        }
    }

    /// Replace the view set (tests register probes here)
    pub fn with_views(mut self, views: ViewRegistry) -> Self {
        self.views = views;
        self
    }

    /// Activate the initial screen
    pub fn start(&mut self) {
        info!("console started");
        self.activate(self.navigator.current());
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn context(&self) -> &SharedContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut SharedContext {
        &mut self.ctx
    }

    pub fn view(&self, state: NavigationState) -> Option<&dyn View> {
        self.views.get(state)
    }

    pub fn current_view(&self) -> Option<&dyn View> {
        self.views.get(self.navigator.current())
    }

    // ═══════════════════════════════════════════
    // UPDATE
    // ═══════════════════════════════════════════

    pub fn update(&mut self, msg: Message) {
        if msg.is_interrupt() {
            info!("interrupt, quitting");
            self.should_quit = true;
            return;
        }

        match msg {
            Message::Quit => self.should_quit = true,
            Message::Navigate(state, payload) => self.navigate_to(state, payload),
            Message::Back => self.navigate_back(),
            Message::Home => self.navigate_home(),
            Message::CommandCompleted(completion) => self.on_command_completed(completion),
            Message::BatchCompleted(report) => self.on_batch_completed(report),
            Message::Resize(width, height) => {
                self.ctx.width = width;
                self.ctx.height = height;
                self.ctx.clear_requested = true;
            }
            Message::Tick => self.ctx.frame = self.ctx.frame.wrapping_add(1),
            Message::ServicesProbed(report) => {
                debug!(services = report.installed.len(), "probe finished");
                self.ctx.probing = false;
                self.ctx.installed.extend(report.installed);
            }
            msg @ Message::MonitoringLoaded(_) => self.route(NavigationState::Monitoring, &msg),
            msg => self.route(self.navigator.current(), &msg),
        }
    }

    /// Deliver a message to one view and apply what it asks for
    fn route(&mut self, state: NavigationState, msg: &Message) {
        let action = match self.views.get_mut(state) {
            Some(view) => view.update(msg, &mut self.ctx),
            None => {
                error!(?state, "no view registered");
                return;
            }
        };
        self.apply(action);
    }

    fn apply(&mut self, action: ViewAction) {
        match action {
            ViewAction::None => {}
            ViewAction::Quit => self.update(Message::Quit),
            ViewAction::Navigate(state, payload) => self.update(Message::Navigate(state, payload)),
            ViewAction::Back => self.update(Message::Back),
            ViewAction::Home => self.update(Message::Home),
            ViewAction::Run(plan) => self.run_plan(plan),
            ViewAction::FetchMonitoring => self.fetch_monitoring(),
            ViewAction::Probe => self.probe(),
            ViewAction::ConfigChanged(config) => self.reconfigure(config),
        }
    }

    // ═══════════════════════════════════════════
    // NAVIGATION
    // ═══════════════════════════════════════════

    fn navigate_to(&mut self, state: NavigationState, payload: Payload) {
        debug!(from = ?self.navigator.current(), to = ?state, "navigate");
        self.navigator.push(state);
        let action = match self.views.get_mut(state) {
            Some(view) => {
                view.initialize(payload, &self.ctx);
                self.ctx.clear_requested = true;
                view.init(&mut self.ctx)
            }
            None => {
                error!(?state, "no view registered");
                ViewAction::None
            }
        };
        self.apply(action);
    }

    fn navigate_back(&mut self) {
        if let Some(state) = self.navigator.back() {
            debug!(to = ?state, "back");
            self.activate(state);
        }
    }

    fn navigate_home(&mut self) {
        self.navigator.home();
        self.activate(NavigationState::Menu);
    }

    /// Re-run `init` without a payload
    fn activate(&mut self, state: NavigationState) {
        self.ctx.clear_requested = true;
        let action = match self.views.get_mut(state) {
            Some(view) => view.init(&mut self.ctx),
            None => {
                error!(?state, "no view registered");
                ViewAction::None
            }
        };
        self.apply(action);
    }

    fn show_processing(&mut self) {
        if self.navigator.current() == NavigationState::Processing {
            self.activate(NavigationState::Processing);
        } else {
            self.navigate_to(NavigationState::Processing, Payload::None);
        }
    }

    // ═══════════════════════════════════════════
    // EXECUTION
    // ═══════════════════════════════════════════

    /// Start a plan; an unfinished queue is discarded
    fn run_plan(&mut self, plan: Plan) {
        if self.ctx.queue.is_active() {
            warn!(label = self.ctx.queue.label(), "discarding unfinished queue");
        }
        info!(label = %plan.label, steps = plan.commands.len(), mode = ?plan.mode, "queue started");

        self.ctx.queue.reset();
        self.ctx.queue.set_label(plan.label.clone());
        self.ctx.last_failure = None;
        self.ctx.pending_install = plan.installs.clone();
        self.ctx.secrets = plan.secrets.clone();
        self.ctx.processing_message = plan.title.clone();

        if plan.commands.is_empty() {
            info!(label = %plan.label, "nothing to run");
            self.ctx.processing_message = "Nothing to run".to_string();
            self.ctx.pending_install = None;
            self.navigate_to(NavigationState::Processing, Payload::None);
            return;
        }

        match plan.mode {
            ExecutionMode::Stepped => {
                self.ctx.queue.extend(plan.commands);
                if let Some(first) = self.ctx.queue.start() {
                    self.ctx.processing_message = first.to_string();
                    self.bridge.dispatch(first, plan.label);
                }
            }
            ExecutionMode::Batch => {
                self.ctx.queue.set_active(true);
                spawn_batch(
                    self.bridge.runner(),
                    plan.label,
                    plan.commands,
                    self.bridge.sender(),
                );
            }
        }

        self.navigate_to(NavigationState::Processing, Payload::None);
    }

    /// Completion belongs to the running queue
    fn accepts(&self, label: &str) -> bool {
        self.ctx.queue.is_active() && self.ctx.queue.label() == label
    }

    fn on_command_completed(&mut self, completion: Completion) {
        let Completion { label, result } = completion;
        if !self.accepts(&label) {
            warn!(label = %label, "stale completion ignored");
            return;
        }

        self.record(&result);
        let step = self.ctx.queue.cursor();
        let total = self.ctx.queue.len();

        match self.ctx.queue.advance(&result) {
            Advance::Dispatch(next) => {
                self.ctx.processing_message = next.to_string();
                self.bridge.dispatch(next, label);
            }
            Advance::Finished => {
                info!(label = %label, steps = total, "queue finished");
                self.apply_install_mark();
                self.ctx.processing_message = format!("Completed {} step(s)", total);
                self.show_processing();
            }
            Advance::Halted => {
                warn!(label = %label, step, exit_code = result.exit_code, "queue halted");
                self.ctx.pending_install = None;
                self.ctx.processing_message = format!(
                    "Failed at step {} of {}: {}",
                    step,
                    total,
                    self.ctx.redact(&result.command.to_string())
                );
                self.ctx.last_failure = Some(result);
                self.show_processing();
            }
        }
    }

    fn on_batch_completed(&mut self, report: BatchReport) {
        if !self.accepts(&report.label) {
            warn!(label = %report.label, "stale batch report ignored");
            return;
        }

        self.record(&report.result);
        for line in &report.results_log {
            self.ctx.queue.add_result(line.clone());
        }
        self.ctx.queue.set_active(false);

        let total = report.steps.len();
        if report.is_success() {
            self.apply_install_mark();
            self.ctx.processing_message = format!("Batch completed, {} step(s)", total);
        } else {
            self.ctx.pending_install = None;
            self.ctx.processing_message = format!("Batch failed at step {}", total);
            self.ctx.last_failure = report.steps.last().cloned();
        }
        self.show_processing();
    }

    /// Persist a result; a log failure becomes a report line
    fn record(&mut self, result: &ExecutionResult) {
        let entry = redact_result(result, &self.ctx.secrets);
        if let Err(e) = self.ctx.log.log_command(&entry) {
            warn!(code = e.code(), "command log write failed: {}", e);
            self.ctx.queue.add_result(format!("⚠ {}", e));
        }
    }

    fn apply_install_mark(&mut self) {
        if let Some(mark) = self.ctx.pending_install.take() {
            info!(service = %mark.service, installed = mark.installed, "installed flag updated");
            self.ctx.installed.insert(mark.service, mark.installed);
        }
    }

    // ═══════════════════════════════════════════
    // OTHER BACKGROUND WORK
    // ═══════════════════════════════════════════

    /// Detect installed services in the background
    pub fn probe(&mut self) {
        if self.ctx.probing {
            return;
        }
        let targets = probe::targets(&self.ctx.catalog);
        if targets.is_empty() {
            return;
        }
        self.ctx.probing = true;
        let runner = self.bridge.runner();
        self.bridge.post(async move {
            Message::ServicesProbed(probe::probe(runner, targets).await)
        });
    }

    fn fetch_monitoring(&mut self) {
        let source = Arc::clone(&self.metrics);
        self.bridge.post(async move {
            Message::MonitoringLoaded(source.fetch().await.map_err(|e| e.to_string()))
        });
    }

    fn reconfigure(&mut self, config: AppConfig) {
        let old = &self.ctx.config;
        if config.shell != old.shell {
            info!(shell = %config.shell, "shell changed");
            self.bridge = Bridge::new(
                Arc::new(ShellRunner::new(config.shell.clone())),
                self.bridge.sender(),
            );
        }
        if config.monitoring != old.monitoring {
            self.metrics = Arc::new(FallbackMetricsSource::from_url(
                &config.monitoring.url,
                config.monitoring.timeout(),
            ));
        }
        if config.log_file != old.log_file {
            self.ctx.log = Arc::new(FileLogStore::new(config.log_file.clone()));
        }
        self.ctx.config = config;
    }

    // ═══════════════════════════════════════════
    // RENDER
    // ═══════════════════════════════════════════

    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(frame.area());

        render_header(frame, chunks[0], &self.navigator, &self.theme);

        let Some(view) = self.current_view() else {
            return;
        };
        view.render(frame, chunks[1], &self.ctx, &self.theme);

        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" {}", view.status_line(&self.ctx)),
                self.theme.muted_style(),
            )),
            chunks[2],
        );
    }
}

fn render_header(frame: &mut Frame, area: Rect, navigator: &Navigator, theme: &Theme) {
    let line = Line::from(vec![
        Span::styled(
            " HOSTPILOT ",
            theme
                .selected_style()
                .add_modifier(ratatui::style::Modifier::BOLD),
        ),
        Span::styled(
            format!(
                " {}",
                truncate(&navigator.breadcrumb(), (area.width as usize).saturating_sub(12))
            ),
            theme.secondary_style(),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
