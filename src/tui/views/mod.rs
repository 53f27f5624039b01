//! Console screens
//!
//! Every screen is created once at startup and lives in the
//! [`ViewRegistry`], so cursor positions and cached data survive navigation.
//!
//! ```text
//!   Menu ──► ActionForm ──► Confirm ──► Processing ──[Enter]──► Menu (history cleared)
//!    │  (no fields) ─────────▲
//!    ├──► ServiceList
//!    ├──► LogViewer
//!    ├──► Monitoring
//!    └──► Settings
//! ```

mod confirm;
mod form;
mod log_viewer;
mod menu;
mod monitoring;
mod processing;
mod service_list;
mod settings;

pub use confirm::ConfirmView;
pub use form::FormView;
pub use log_viewer::LogViewerView;
pub use menu::MenuView;
pub use monitoring::MonitoringView;
pub use processing::ProcessingView;
pub use service_list::ServiceListView;
pub use settings::SettingsView;

use std::collections::HashMap;

use ratatui::{layout::Rect, Frame};

use super::context::SharedContext;
use super::message::Message;
use super::navigator::NavigationState;
use super::theme::Theme;
use crate::catalog::Plan;
use crate::config::AppConfig;

/// Data handed to a screen when it is navigated to
#[derive(Debug, Clone, Default)]
pub enum Payload {
    #[default]
    None,
    /// An action to configure
    Action { service: String, action: String },
    /// A plan to review
    Plan(Plan),
}

/// Effect requested by a view; applied by the controller
#[derive(Debug, Clone)]
pub enum ViewAction {
    None,
    Quit,
    Navigate(NavigationState, Payload),
    Back,
    Home,
    /// Queue and start a plan
    Run(Plan),
    FetchMonitoring,
    Probe,
    /// Settings were saved
    ConfigChanged(AppConfig),
}

pub trait View {
    /// Called on every activation, including back-navigation
    fn init(&mut self, _ctx: &mut SharedContext) -> ViewAction {
        ViewAction::None
    }

    /// Called before `init` on forward navigation only
    fn initialize(&mut self, _payload: Payload, _ctx: &SharedContext) {}

    /// Handle input or a message routed to this view
    fn update(&mut self, msg: &Message, ctx: &mut SharedContext) -> ViewAction;

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &SharedContext, theme: &Theme);

    /// Get the view's status line text (for footer)
    fn status_line(&self, ctx: &SharedContext) -> String;
}

/// One view instance per navigation state
#[derive(Default)]
pub struct ViewRegistry {
    views: HashMap<NavigationState, Box<dyn View>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full console
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(NavigationState::Menu, MenuView::default());
        registry.register(NavigationState::ActionForm, FormView::default());
        registry.register(NavigationState::Confirm, ConfirmView::default());
        registry.register(NavigationState::Processing, ProcessingView::default());
        registry.register(NavigationState::ServiceList, ServiceListView::default());
        registry.register(NavigationState::LogViewer, LogViewerView::default());
        registry.register(NavigationState::Monitoring, MonitoringView::default());
        registry.register(NavigationState::Settings, SettingsView::default());
        registry
    }

    pub fn register(&mut self, state: NavigationState, view: impl View + 'static) {
        self.views.insert(state, Box::new(view));
    }

    pub fn get(&self, state: NavigationState) -> Option<&dyn View> {
        self.views.get(&state).map(|v| v.as_ref())
    }

    pub fn get_mut(&mut self, state: NavigationState) -> Option<&mut (dyn View + 'static)> {
        self.views.get_mut(&state).map(|v| v.as_mut())
    }

    pub fn contains(&self, state: NavigationState) -> bool {
        self.views.contains_key(&state)
    }
}

/// Plain key press helpers shared by the views
pub(crate) mod keys {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use crate::tui::message::Message;

    pub fn key(msg: &Message) -> Option<&KeyEvent> {
        match msg {
            Message::Key(key) => Some(key),
            _ => None,
        }
    }

    /// A typed character without Ctrl/Alt
    pub fn typed(key: &KeyEvent) -> Option<char> {
        match key.code {
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                Some(c)
            }
            _ => None,
        }
    }

    pub fn is_ctrl(key: &KeyEvent, c: char) -> bool {
        key.code == KeyCode::Char(c) && key.modifiers.contains(KeyModifiers::CONTROL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_covers_every_state() {
        let registry = ViewRegistry::standard();
        for state in NavigationState::all() {
            assert!(registry.contains(*state), "missing view for {:?}", state);
        }
    }
}
