//! Live progress and final report of the current queue

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::keys::{key, typed};
use super::{View, ViewAction};
use crate::exec::format_duration;
use crate::tui::context::SharedContext;
use crate::tui::message::Message;
use crate::tui::theme::Theme;
use crate::tui::widgets::Spinner;

/// Output lines shown for a failed command
const FAILURE_TAIL: usize = 200;

#[derive(Debug, Default)]
pub struct ProcessingView {
    output_scroll: u16,
}

impl View for ProcessingView {
    fn init(&mut self, _ctx: &mut SharedContext) -> ViewAction {
        self.output_scroll = 0;
        ViewAction::None
    }

    fn update(&mut self, msg: &Message, ctx: &mut SharedContext) -> ViewAction {
        let Some(key) = key(msg) else {
            return ViewAction::None;
        };
        match (key.code, typed(key)) {
            (KeyCode::Enter, _) | (KeyCode::Esc, _) if !ctx.queue.is_active() => ViewAction::Home,
            (KeyCode::Up, _) | (_, Some('k')) => {
                self.output_scroll = self.output_scroll.saturating_sub(1);
                ViewAction::None
            }
            (KeyCode::Down, _) | (_, Some('j')) => {
                self.output_scroll = self.output_scroll.saturating_add(1);
                ViewAction::None
            }
            _ => ViewAction::None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &SharedContext, theme: &Theme) {
        let queue = &ctx.queue;
        let has_failure = ctx.last_failure.is_some() && !queue.is_active();

        let constraints = if has_failure {
            vec![Constraint::Length(3), Constraint::Min(3), Constraint::Percentage(45)]
        } else {
            vec![Constraint::Length(3), Constraint::Min(3)]
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        // headline
        let header_block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(queue.is_active()))
            .title(format!(" {} ", queue.label()));
        let inner = header_block.inner(chunks[0]);
        frame.render_widget(header_block, chunks[0]);

        let (status, style) = if queue.is_active() {
            let progress = if queue.is_empty() {
                String::new()
            } else {
                format!(" [{}/{}]", queue.cursor(), queue.len())
            };
            (format!("  {}{}", ctx.processing_message, progress), theme.running_style())
        } else if has_failure {
            (format!("  {}", ctx.processing_message), theme.failure_style())
        } else {
            (format!("  {}", ctx.processing_message), theme.success_style())
        };
        frame.render_widget(Paragraph::new(Span::styled(status, style)), inner);
        if queue.is_active() {
            frame.render_widget(
                Spinner::new(ctx.frame).color(theme.status_running),
                Rect::new(inner.x, inner.y, inner.width.min(1), inner.height.min(1)),
            );
        }

        // results log
        let items: Vec<ListItem> = queue
            .results()
            .iter()
            .map(|line| {
                ListItem::new(Line::from(Span::styled(
                    ctx.redact(line),
                    theme.result_line_style(line),
                )))
            })
            .collect();
        let visible = chunks[1].height.saturating_sub(2) as usize;
        let skip = items.len().saturating_sub(visible);
        frame.render_widget(
            List::new(items.into_iter().skip(skip).collect::<Vec<_>>()).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.border_style(false))
                    .title(" Results "),
            ),
            chunks[1],
        );

        // failure output
        if let (true, Some(failure)) = (has_failure, &ctx.last_failure) {
            let mut lines: Vec<Line> = failure
                .output
                .lines()
                .rev()
                .take(FAILURE_TAIL)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .map(|l| Line::from(Span::styled(ctx.redact(l), theme.text_style())))
                .collect();
            if let Some(err) = &failure.error {
                lines.push(Line::from(Span::styled(
                    format!("! {} after {}", err, format_duration(failure.duration)),
                    theme.failure_style(),
                )));
            }
            frame.render_widget(
                Paragraph::new(lines)
                    .wrap(Wrap { trim: false })
                    .scroll((self.output_scroll, 0))
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_style(Style::default().fg(theme.status_failed))
                            .title(format!(" Output: {} ", ctx.redact(&failure.command.to_string()))),
                    ),
                chunks[2],
            );
        }
    }

    fn status_line(&self, ctx: &SharedContext) -> String {
        if ctx.queue.is_active() {
            "Running… [Ctrl+C] Quit".to_string()
        } else {
            "[Enter/Esc] Back to menu  [↑↓] Scroll output".to_string()
        }
    }
}
