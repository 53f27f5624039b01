//! Main menu: categories → services → actions
//!
//! The nested levels live on a stack local to this view. Esc pops a level
//! here; it never touches the top-level navigator.

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::keys::{key, typed};
use super::{Payload, View, ViewAction};
use crate::catalog::{ActionProvider, Category, FieldValues};
use crate::tui::context::SharedContext;
use crate::tui::message::Message;
use crate::tui::navigator::NavigationState;
use crate::tui::theme::Theme;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Level {
    Category(Category),
    Service(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Category(Category),
    Service(String),
    Action { service: String, action: String },
    Screen(NavigationState),
    Quit,
}

struct Row {
    entry: Entry,
    label: String,
    detail: String,
    installed: Option<bool>,
}

#[derive(Debug, Default)]
pub struct MenuView {
    /// Nested levels below the root
    levels: Vec<Level>,
    /// Selection to restore when a level is popped
    parents: Vec<usize>,
    selected: usize,
    error: Option<String>,
}

impl MenuView {
    /// Depth of the menu-local stack
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    fn rows(&self, ctx: &SharedContext) -> Vec<Row> {
        let catalog = &ctx.catalog;
        match self.levels.last() {
            None => {
                let mut rows: Vec<Row> = catalog
                    .categories()
                    .into_iter()
                    .map(|c| Row {
                        entry: Entry::Category(c),
                        label: c.title().to_string(),
                        detail: format!("{} services", catalog.services_in(c).count()),
                        installed: None,
                    })
                    .collect();
                for (state, detail) in [
                    (NavigationState::ServiceList, "What is installed on this host"),
                    (NavigationState::LogViewer, "Every command run so far"),
                    (NavigationState::Monitoring, "Host metrics, events and entities"),
                    (NavigationState::Settings, "Shell, monitoring API, log file"),
                ] {
                    rows.push(Row {
                        entry: Entry::Screen(state),
                        label: state.title().to_string(),
                        detail: detail.to_string(),
                        installed: None,
                    });
                }
                rows.push(Row {
                    entry: Entry::Quit,
                    label: "Quit".to_string(),
                    detail: String::new(),
                    installed: None,
                });
                rows
            }
            Some(Level::Category(category)) => catalog
                .services_in(*category)
                .map(|s| Row {
                    entry: Entry::Service(s.id.clone()),
                    label: s.name.clone(),
                    detail: s.description.clone(),
                    installed: ctx.is_installed(&s.id),
                })
                .collect(),
            Some(Level::Service(id)) => catalog
                .service(id)
                .map(|s| {
                    s.actions
                        .iter()
                        .map(|a| Row {
                            entry: Entry::Action {
                                service: s.id.clone(),
                                action: a.id.clone(),
                            },
                            label: a.name.clone(),
                            detail: a.description.clone(),
                            installed: None,
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    fn title(&self, ctx: &SharedContext) -> String {
        let mut parts = vec!["Hostpilot".to_string()];
        for level in &self.levels {
            parts.push(match level {
                Level::Category(c) => c.title().to_string(),
                Level::Service(id) => ctx
                    .catalog
                    .service(id)
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| id.clone()),
            });
        }
        format!(" {} ", parts.join(" › "))
    }

    fn push(&mut self, level: Level) {
        self.levels.push(level);
        self.parents.push(self.selected);
        self.selected = 0;
    }

    fn pop(&mut self) {
        if self.levels.pop().is_some() {
            self.selected = self.parents.pop().unwrap_or(0);
        }
    }

    fn activate(&mut self, entry: Entry, ctx: &SharedContext) -> ViewAction {
        match entry {
            Entry::Category(c) => {
                self.push(Level::Category(c));
                ViewAction::None
            }
            Entry::Service(id) => {
                self.push(Level::Service(id));
                ViewAction::None
            }
            Entry::Action { service, action } => {
                let has_fields = ctx
                    .catalog
                    .service(&service)
                    .and_then(|s| s.action(&action))
                    .map(|a| !a.fields.is_empty())
                    .unwrap_or(false);
                if has_fields {
                    return ViewAction::Navigate(
                        NavigationState::ActionForm,
                        Payload::Action { service, action },
                    );
                }
                match ctx.catalog.plan(&service, &action, &FieldValues::new()) {
                    Ok(plan) => ViewAction::Navigate(NavigationState::Confirm, Payload::Plan(plan)),
                    Err(e) => {
                        self.error = Some(e.to_string());
                        ViewAction::None
                    }
                }
            }
            Entry::Screen(state) => ViewAction::Navigate(state, Payload::None),
            Entry::Quit => ViewAction::Quit,
        }
    }
}

impl View for MenuView {
    fn init(&mut self, ctx: &mut SharedContext) -> ViewAction {
        let len = self.rows(ctx).len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
        ViewAction::None
    }

    fn update(&mut self, msg: &Message, ctx: &mut SharedContext) -> ViewAction {
        let Some(key) = key(msg) else {
            return ViewAction::None;
        };
        self.error = None;
        let len = self.rows(ctx).len();

        match (key.code, typed(key)) {
            (KeyCode::Up, _) | (_, Some('k')) => {
                self.selected = self.selected.checked_sub(1).unwrap_or(len.saturating_sub(1));
            }
            (KeyCode::Down, _) | (_, Some('j')) => {
                self.selected = if self.selected + 1 >= len { 0 } else { self.selected + 1 };
            }
            (KeyCode::Enter, _) | (KeyCode::Right, _) | (_, Some('l')) => {
                if let Some(row) = self.rows(ctx).into_iter().nth(self.selected) {
                    return self.activate(row.entry, ctx);
                }
            }
            (KeyCode::Esc, _) | (KeyCode::Left, _) | (KeyCode::Backspace, _) | (_, Some('h')) => {
                self.pop();
            }
            (_, Some('q')) if self.levels.is_empty() => return ViewAction::Quit,
            _ => {}
        }
        ViewAction::None
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &SharedContext, theme: &Theme) {
        let rows = self.rows(ctx);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(4)])
            .split(area);

        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| {
                let mut spans = Vec::new();
                if matches!(row.entry, Entry::Service(_)) {
                    let (mark, style) = match row.installed {
                        Some(true) => ("● ", theme.installed_style(Some(true))),
                        Some(false) => ("○ ", theme.installed_style(Some(false))),
                        None => ("· ", theme.installed_style(None)),
                    };
                    spans.push(Span::styled(mark, style));
                }
                spans.push(Span::styled(row.label.clone(), theme.text_style()));
                if matches!(row.entry, Entry::Category(_) | Entry::Service(_)) {
                    spans.push(Span::styled(" ›", theme.muted_style()));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let mut state = ListState::default().with_selected(Some(self.selected));
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.border_style(true))
                    .title(self.title(ctx)),
            )
            .highlight_style(theme.selected_style())
            .highlight_symbol("▸ ");
        frame.render_stateful_widget(list, chunks[0], &mut state);

        let detail = match &self.error {
            Some(err) => Line::from(Span::styled(err.clone(), theme.failure_style())),
            None => Line::from(Span::styled(
                rows.get(self.selected)
                    .map(|r| r.detail.clone())
                    .unwrap_or_default(),
                theme.secondary_style(),
            )),
        };
        frame.render_widget(
            Paragraph::new(detail)
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(theme.border_style(false)),
                ),
            chunks[1],
        );
    }

    fn status_line(&self, _ctx: &SharedContext) -> String {
        if self.levels.is_empty() {
            "[↑↓] Move  [Enter] Open  [q] Quit".to_string()
        } else {
            "[↑↓] Move  [Enter] Open  [Esc] Up one level".to_string()
        }
    }
}
