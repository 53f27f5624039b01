//! Top-level navigation history
//!
//! ```text
//!   NavigateTo(S):  stack.push(current); current = S
//!   Back:           current = stack.pop()      (no-op when empty)
//!   Home:           stack.clear(); current = Menu
//! ```
//!
//! Views with their own nested levels (the menu) keep a separate stack;
//! this one only knows about whole screens.

/// Every screen of the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NavigationState {
    #[default]
    Menu,
    ActionForm,
    Confirm,
    Processing,
    ServiceList,
    LogViewer,
    Monitoring,
    Settings,
}

impl NavigationState {
    pub fn all() -> &'static [NavigationState] {
        &[
            NavigationState::Menu,
            NavigationState::ActionForm,
            NavigationState::Confirm,
            NavigationState::Processing,
            NavigationState::ServiceList,
            NavigationState::LogViewer,
            NavigationState::Monitoring,
            NavigationState::Settings,
        ]
    }

    /// Header title
    pub fn title(&self) -> &'static str {
        match self {
            NavigationState::Menu => "Menu",
            NavigationState::ActionForm => "Configure",
            NavigationState::Confirm => "Confirm",
            NavigationState::Processing => "Processing",
            NavigationState::ServiceList => "Installed services",
            NavigationState::LogViewer => "Command log",
            NavigationState::Monitoring => "Monitoring",
            NavigationState::Settings => "Settings",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigator {
    stack: Vec<NavigationState>,
    current: NavigationState,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> NavigationState {
        self.current
    }

    /// Push the current screen and switch to `state`
    pub fn push(&mut self, state: NavigationState) {
        self.stack.push(self.current);
        self.current = state;
    }

    /// Return to the previous screen; `None` at the root
    pub fn back(&mut self) -> Option<NavigationState> {
        let previous = self.stack.pop()?;
        self.current = previous;
        Some(previous)
    }

    /// Drop all history and return to the menu
    pub fn home(&mut self) {
        self.stack.clear();
        self.current = NavigationState::Menu;
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn history(&self) -> &[NavigationState] {
        &self.stack
    }

    /// `Menu › Configure › Confirm`
    pub fn breadcrumb(&self) -> String {
        self.stack
            .iter()
            .chain(std::iter::once(&self.current))
            .map(|s| s.title())
            .collect::<Vec<_>>()
            .join(" › ")
    }
}
