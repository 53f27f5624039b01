//! Scrollable view of the persistent command log

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::warn;

use super::keys::{key, typed};
use super::{View, ViewAction};
use crate::tui::context::SharedContext;
use crate::tui::message::Message;
use crate::tui::theme::Theme;

const PAGE: usize = 10;

#[derive(Debug, Default)]
pub struct LogViewerView {
    lines: Vec<String>,
    /// First visible line
    offset: usize,
    error: Option<String>,
}

impl LogViewerView {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    fn reload(&mut self, ctx: &SharedContext) {
        match ctx.log.read_lines() {
            Ok(lines) => {
                self.lines = lines;
                self.error = None;
            }
            Err(e) => {
                warn!("cannot read command log: {}", e);
                self.lines.clear();
                self.error = Some(e.to_string());
            }
        }
        self.offset = self.max_offset();
    }

    fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(PAGE)
    }
}

impl View for LogViewerView {
    fn init(&mut self, ctx: &mut SharedContext) -> ViewAction {
        self.reload(ctx);
        ViewAction::None
    }

    fn update(&mut self, msg: &Message, ctx: &mut SharedContext) -> ViewAction {
        let Some(key) = key(msg) else {
            return ViewAction::None;
        };
        let max = self.max_offset();
        match (key.code, typed(key)) {
            (KeyCode::Esc, _) | (_, Some('q')) => return ViewAction::Back,
            (_, Some('r')) => self.reload(ctx),
            (KeyCode::Up, _) | (_, Some('k')) => self.offset = self.offset.saturating_sub(1),
            (KeyCode::Down, _) | (_, Some('j')) => self.offset = (self.offset + 1).min(max),
            (KeyCode::PageUp, _) => self.offset = self.offset.saturating_sub(PAGE),
            (KeyCode::PageDown, _) => self.offset = (self.offset + PAGE).min(max),
            (KeyCode::Home, _) | (_, Some('g')) => self.offset = 0,
            (KeyCode::End, _) | (_, Some('G')) => self.offset = max,
            _ => {}
        }
        ViewAction::None
    }

    fn render(&self, frame: &mut Frame, area: Rect, _ctx: &SharedContext, theme: &Theme) {
        let lines: Vec<Line> = match &self.error {
            Some(err) => vec![Line::from(Span::styled(err.clone(), theme.failure_style()))],
            None if self.lines.is_empty() => vec![Line::from(Span::styled(
                "No commands logged yet",
                theme.muted_style(),
            ))],
            None => self
                .lines
                .iter()
                .skip(self.offset)
                .map(|l| {
                    let style = if l.starts_with('[') {
                        if l.contains("] ✗") {
                            theme.failure_style()
                        } else {
                            theme.text_style()
                        }
                    } else {
                        theme.secondary_style()
                    };
                    Line::from(Span::styled(l.clone(), style))
                })
                .collect(),
        };

        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.border_style(true))
                    .title(format!(" Command log ({} lines) ", self.lines.len())),
            ),
            area,
        );
    }

    fn status_line(&self, _ctx: &SharedContext) -> String {
        "[↑↓/PgUp/PgDn] Scroll  [g/G] Top/Bottom  [r] Reload  [Esc] Back".to_string()
    }
}
