//! Catalog services with their installed flags

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use super::keys::{key, typed};
use super::{View, ViewAction};
use crate::tui::context::SharedContext;
use crate::tui::message::Message;
use crate::tui::theme::Theme;

#[derive(Debug, Default)]
pub struct ServiceListView {
    selected: usize,
}

impl View for ServiceListView {
    fn init(&mut self, ctx: &mut SharedContext) -> ViewAction {
        // first visit: nothing probed yet
        if ctx.installed.is_empty() && !ctx.probing {
            return ViewAction::Probe;
        }
        ViewAction::None
    }

    fn update(&mut self, msg: &Message, ctx: &mut SharedContext) -> ViewAction {
        let Some(key) = key(msg) else {
            return ViewAction::None;
        };
        let len = ctx.catalog.services().len();
        match (key.code, typed(key)) {
            (KeyCode::Esc, _) | (_, Some('q')) => return ViewAction::Back,
            (_, Some('r')) if !ctx.probing => return ViewAction::Probe,
            (KeyCode::Up, _) | (_, Some('k')) => self.selected = self.selected.saturating_sub(1),
            (KeyCode::Down, _) | (_, Some('j')) if self.selected + 1 < len => self.selected += 1,
            _ => {}
        }
        ViewAction::None
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &SharedContext, theme: &Theme) {
        let rows: Vec<Row> = ctx
            .catalog
            .services()
            .iter()
            .map(|service| {
                let installed = ctx.is_installed(&service.id);
                let status = match (installed, service.detect.is_some()) {
                    (Some(true), _) => "installed",
                    (Some(false), _) => "not installed",
                    (None, false) => "n/a",
                    (None, true) => "unknown",
                };
                Row::new(vec![
                    Cell::from(Span::styled(service.name.clone(), theme.text_style())),
                    Cell::from(Span::styled(service.category.title(), theme.secondary_style())),
                    Cell::from(Span::styled(status, theme.installed_style(installed))),
                ])
            })
            .collect();

        let title = if ctx.probing {
            " Installed services (probing…) ".to_string()
        } else {
            " Installed services ".to_string()
        };

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(40),
                Constraint::Percentage(35),
                Constraint::Percentage(25),
            ],
        )
        .header(Row::new(vec!["Service", "Category", "Status"]).style(theme.muted_style()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style(true))
                .title(title),
        )
        .row_highlight_style(theme.selected_style());

        let mut state = TableState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn status_line(&self, _ctx: &SharedContext) -> String {
        "[r] Re-probe  [↑↓] Move  [Esc] Back".to_string()
    }
}
