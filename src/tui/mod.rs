//! Interactive console
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  terminal events ─┐                                              │
//! │  tick interval  ──┼──► Message ──► App::update ──► views/context │
//! │  mailbox (mpsc) ──┘                     │                        │
//! │        ▲                                ▼                        │
//! │        └──── Bridge: runner / batch / probe / monitoring tasks   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One task owns the [`App`]; background tasks only ever send messages.

mod app;
mod context;
mod message;
mod navigator;
mod terminal;
mod theme;

pub mod views;
pub mod widgets;

#[cfg(test)]
pub(crate) mod test_support;

pub use app::App;
pub use context::SharedContext;
pub use message::Message;
pub use navigator::{NavigationState, Navigator};
pub use theme::Theme;

use std::sync::Arc;

use crossterm::event::EventStream;
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::info;

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::error::{HostpilotError, Result};
use crate::exec::ShellRunner;
use crate::logstore::LogStore;
use crate::monitor::FallbackMetricsSource;

/// Run the console until the operator quits
pub async fn run(config: AppConfig, log: Arc<dyn LogStore>) -> Result<()> {
    let catalog = Catalog::load_or_builtin(config.catalog.as_deref())?;
    info!(services = catalog.services().len(), shell = %config.shell, "starting console");

    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let runner = Arc::new(ShellRunner::new(config.shell.clone()));
    let metrics = Arc::new(FallbackMetricsSource::from_url(
        &config.monitoring.url,
        config.monitoring.timeout(),
    ));
    let tick_rate = config.ui.tick_rate();

    let ctx = SharedContext::new(Arc::new(catalog), config, log);
    let mut app = App::new(ctx, runner, metrics, tx);

    let mut terminal = terminal::Tui::enter()?;
    let (width, height) = terminal.size()?;
    app.update(Message::Resize(width, height));
    app.start();
    app.probe();

    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(tick_rate);

    loop {
        if app.context_mut().take_clear_request() {
            terminal.clear()?;
        }
        terminal.draw(|frame| app.render(frame))?;

        let msg = tokio::select! {
            event = events.next() => match event {
                Some(Ok(event)) => Message::from_event(event),
                Some(Err(e)) => {
                    return Err(HostpilotError::TuiError {
                        reason: format!("Failed to read event: {}", e),
                    })
                }
                None => break,
            },
            Some(msg) = rx.recv() => Some(msg),
            _ = ticker.tick() => Some(Message::Tick),
        };

        if let Some(msg) = msg {
            app.update(msg);
        }
        if app.should_quit() {
            break;
        }
    }

    terminal.restore()?;
    info!("console closed");
    Ok(())
}
