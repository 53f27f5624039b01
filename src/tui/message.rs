//! Messages consumed by the controller's update step
//!
//! Terminal input, timer ticks and every background result arrive here.
//! Workers only ever produce a [`Message`]; they never touch views or the
//! shared context.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::navigator::NavigationState;
use super::views::Payload;
use crate::exec::{BatchReport, Completion};
use crate::monitor::MonitorSnapshot;
use crate::probe::ProbeReport;

#[derive(Debug, Clone)]
pub enum Message {
    Key(KeyEvent),
    Paste(String),
    Resize(u16, u16),
    Tick,

    // ═══════════════════════════════════════════
    // NAVIGATION
    // ═══════════════════════════════════════════
    Navigate(NavigationState, Payload),
    Back,
    /// Back to the menu, history cleared
    Home,
    Quit,

    // ═══════════════════════════════════════════
    // BACKGROUND RESULTS
    // ═══════════════════════════════════════════
    CommandCompleted(Completion),
    BatchCompleted(BatchReport),
    /// Error text when even the fallback source failed
    MonitoringLoaded(Result<MonitorSnapshot, String>),
    ServicesProbed(ProbeReport),
}

impl Message {
    /// Translate a terminal event; key releases and focus changes are dropped
    pub fn from_event(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(Message::Key(key)),
            Event::Paste(text) => Some(Message::Paste(text)),
            Event::Resize(w, h) => Some(Message::Resize(w, h)),
            _ => None,
        }
    }

    /// Ctrl+C, handled before anything else
    pub fn is_interrupt(&self) -> bool {
        matches!(
            self,
            Message::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers,
                ..
            }) if modifiers.contains(KeyModifiers::CONTROL)
        )
    }
}

impl From<Completion> for Message {
    fn from(completion: Completion) -> Self {
        Message::CommandCompleted(completion)
    }
}

impl From<BatchReport> for Message {
    fn from(report: BatchReport) -> Self {
        Message::BatchCompleted(report)
    }
}
