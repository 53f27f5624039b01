//! Review a plan before it runs

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::keys::{key, typed};
use super::{Payload, View, ViewAction};
use crate::catalog::{ExecutionMode, Plan};
use crate::tui::context::SharedContext;
use crate::tui::message::Message;
use crate::tui::theme::Theme;

#[derive(Debug, Default)]
pub struct ConfirmView {
    plan: Option<Plan>,
    scroll: u16,
}

impl ConfirmView {
    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }
}

impl View for ConfirmView {
    fn initialize(&mut self, payload: Payload, _ctx: &SharedContext) {
        if let Payload::Plan(plan) = payload {
            self.plan = Some(plan);
            self.scroll = 0;
        }
    }

    fn update(&mut self, msg: &Message, _ctx: &mut SharedContext) -> ViewAction {
        let Some(key) = key(msg) else {
            return ViewAction::None;
        };
        match (key.code, typed(key)) {
            (KeyCode::Enter, _) | (_, Some('y')) => match &self.plan {
                Some(plan) => ViewAction::Run(plan.clone()),
                None => ViewAction::Back,
            },
            (KeyCode::Esc, _) | (_, Some('n')) => ViewAction::Back,
            (KeyCode::Up, _) | (_, Some('k')) => {
                self.scroll = self.scroll.saturating_sub(1);
                ViewAction::None
            }
            (KeyCode::Down, _) | (_, Some('j')) => {
                self.scroll = self.scroll.saturating_add(1);
                ViewAction::None
            }
            _ => ViewAction::None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, _ctx: &SharedContext, theme: &Theme) {
        let Some(plan) = &self.plan else {
            frame.render_widget(
                Paragraph::new("Nothing to confirm").block(Block::default().borders(Borders::ALL)),
                area,
            );
            return;
        };

        let mode = match plan.mode {
            ExecutionMode::Stepped => "step by step",
            ExecutionMode::Batch => "as one batch",
        };
        let mut lines = vec![
            Line::from(Span::styled(
                format!("{} command(s) will run {}:", plan.commands.len(), mode),
                theme.secondary_style(),
            )),
            Line::from(""),
        ];
        for (i, command) in plan.commands.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!("{:>2}. ", i + 1), theme.muted_style()),
                Span::styled(plan.redacted(&command.description), theme.text_style()),
            ]));
            for part in command.invocation.lines() {
                lines.push(Line::from(Span::styled(
                    format!("    $ {}", plan.redacted(part)),
                    theme.muted_style(),
                )));
            }
        }
        if let Some(mark) = &plan.installs {
            lines.push(Line::from(""));
            let note = if mark.installed {
                format!("{} will be marked installed on success", mark.service)
            } else {
                format!("{} will be marked not installed on success", mark.service)
            };
            lines.push(Line::from(Span::styled(note, theme.secondary_style())));
        }

        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .scroll((self.scroll, 0))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(theme.border_style(true))
                        .title(format!(" {} ", plan.title)),
                ),
            area,
        );
    }

    fn status_line(&self, _ctx: &SharedContext) -> String {
        "[Enter/y] Run  [Esc/n] Back  [↑↓] Scroll".to_string()
    }
}
