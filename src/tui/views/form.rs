//! Action form: one text field per declared action field
//!
//! Values are validated inline. Nothing reaches the queue until every field
//! passes and the catalog has produced a plan.

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::keys::{key, typed};
use super::{Payload, View, ViewAction};
use crate::catalog::{ActionProvider, FieldSpec, FieldValues};
use crate::tui::context::SharedContext;
use crate::tui::message::Message;
use crate::tui::navigator::NavigationState;
use crate::tui::theme::Theme;
use crate::tui::widgets::TextInput;

#[derive(Debug, Default)]
pub struct FormView {
    service: String,
    action: String,
    title: String,
    description: String,
    fields: Vec<FieldSpec>,
    inputs: Vec<TextInput>,
    errors: Vec<Option<String>>,
    focus: usize,
    /// Provider-level failure
    error: Option<String>,
}

impl FormView {
    pub fn values(&self) -> FieldValues {
        self.fields
            .iter()
            .zip(&self.inputs)
            .map(|(f, i)| (f.name.clone(), i.value().to_string()))
            .collect()
    }

    pub fn field_error(&self, index: usize) -> Option<&str> {
        self.errors.get(index).and_then(|e| e.as_deref())
    }

    fn focused(&mut self) -> Option<&mut TextInput> {
        self.inputs.get_mut(self.focus)
    }

    fn validate(&mut self) -> bool {
        self.errors = self
            .fields
            .iter()
            .zip(&self.inputs)
            .map(|(field, input)| {
                let value = match input.value().trim() {
                    "" => field.default.clone().unwrap_or_default(),
                    v => v.to_string(),
                };
                field.validate(&value).err().map(|e| e.to_string())
            })
            .collect();

        if let Some(first) = self.errors.iter().position(Option::is_some) {
            self.focus = first;
            return false;
        }
        true
    }

    fn submit(&mut self, ctx: &SharedContext) -> ViewAction {
        self.error = None;
        if !self.validate() {
            return ViewAction::None;
        }
        match ctx.catalog.plan(&self.service, &self.action, &self.values()) {
            Ok(plan) => ViewAction::Navigate(NavigationState::Confirm, Payload::Plan(plan)),
            Err(e) => {
                self.error = Some(e.to_string());
                ViewAction::None
            }
        }
    }
}

impl View for FormView {
    fn initialize(&mut self, payload: Payload, ctx: &SharedContext) {
        let Payload::Action { service, action } = payload else {
            return;
        };
        *self = FormView::default();

        let Some(svc) = ctx.catalog.service(&service) else {
            self.error = Some(format!("unknown service '{}'", service));
            return;
        };
        let Some(act) = svc.action(&action) else {
            self.error = Some(format!("'{}' has no action '{}'", service, action));
            return;
        };

        self.title = format!("{} · {}", svc.name, act.name);
        self.description = act.description.clone();
        self.fields = act.fields.clone();
        self.inputs = act
            .fields
            .iter()
            .map(|f| TextInput::new(f.default.clone().unwrap_or_default()).masked(f.secret))
            .collect();
        self.errors = vec![None; self.fields.len()];
        self.service = service;
        self.action = action;
    }

    fn update(&mut self, msg: &Message, ctx: &mut SharedContext) -> ViewAction {
        if let Message::Paste(text) = msg {
            if let Some(input) = self.focused() {
                input.insert_str(text);
            }
            return ViewAction::None;
        }
        let Some(key) = key(msg) else {
            return ViewAction::None;
        };
        let count = self.inputs.len();

        match key.code {
            KeyCode::Esc => return ViewAction::Back,
            KeyCode::Enter => return self.submit(ctx),
            KeyCode::Tab | KeyCode::Down if count > 0 => self.focus = (self.focus + 1) % count,
            KeyCode::BackTab | KeyCode::Up if count > 0 => {
                self.focus = (self.focus + count - 1) % count
            }
            KeyCode::Backspace => {
                if let Some(input) = self.focused() {
                    input.backspace();
                }
            }
            KeyCode::Delete => {
                if let Some(input) = self.focused() {
                    input.delete();
                }
            }
            KeyCode::Left => {
                if let Some(input) = self.focused() {
                    input.cursor_left();
                }
            }
            KeyCode::Right => {
                if let Some(input) = self.focused() {
                    input.cursor_right();
                }
            }
            KeyCode::Home => {
                if let Some(input) = self.focused() {
                    input.cursor_home();
                }
            }
            KeyCode::End => {
                if let Some(input) = self.focused() {
                    input.cursor_end();
                }
            }
            _ => {
                if let Some(c) = typed(key) {
                    if let Some(input) = self.focused() {
                        input.insert_char(c);
                    }
                    if let Some(slot) = self.errors.get_mut(self.focus) {
                        *slot = None;
                    }
                }
            }
        }
        ViewAction::None
    }

    fn render(&self, frame: &mut Frame, area: Rect, _ctx: &SharedContext, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(area);

        frame.render_widget(
            Paragraph::new(Span::styled(self.description.clone(), theme.secondary_style()))
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(theme.border_style(false))
                        .title(format!(" {} ", self.title)),
                ),
            chunks[0],
        );

        let mut lines = Vec::new();
        for (i, (field, input)) in self.fields.iter().zip(&self.inputs).enumerate() {
            let focused = i == self.focus;
            let marker = if field.required { "*" } else { " " };
            let prefix = if focused { "► " } else { "  " };
            let label_style = if focused {
                theme.text_style().add_modifier(ratatui::style::Modifier::BOLD)
            } else {
                theme.secondary_style()
            };
            let value = if focused {
                input.display_with_cursor()
            } else {
                input.display()
            };
            lines.push(Line::from(vec![
                Span::styled(prefix, label_style),
                Span::styled(format!("{:<22}", format!("{}{}", field.label(), marker)), label_style),
                Span::styled(value, theme.text_style()),
            ]));
            if let Some(err) = self.field_error(i) {
                lines.push(Line::from(Span::styled(
                    format!("    {}", err),
                    theme.failure_style(),
                )));
            }
        }
        if let Some(err) = &self.error {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(err.clone(), theme.failure_style())));
        }

        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.border_style(true)),
            ),
            chunks[1],
        );
    }

    fn status_line(&self, _ctx: &SharedContext) -> String {
        "[Tab] Next field  [Enter] Review  [Esc] Back".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::test_support::context;
    use crossterm::event::KeyEvent;

    fn form(ctx: &SharedContext) -> FormView {
        let mut view = FormView::default();
        view.initialize(
            Payload::Action {
                service: "web".to_string(),
                action: "install".to_string(),
            },
            ctx,
        );
        view
    }

    fn press(view: &mut FormView, ctx: &mut SharedContext, code: KeyCode) -> ViewAction {
        view.update(&Message::Key(KeyEvent::from(code)), ctx)
    }

    #[test]
    fn test_defaults_prefill_inputs() {
        let ctx = context();
        let view = form(&ctx);
        assert_eq!(view.values().get("port").map(String::as_str), Some("80"));
    }

    #[test]
    fn test_invalid_value_stays_inline() {
        let mut ctx = context();
        let mut view = form(&ctx);
        press(&mut view, &mut ctx, KeyCode::Backspace);
        press(&mut view, &mut ctx, KeyCode::Backspace);
        view.update(&Message::Paste("abc".to_string()), &mut ctx);

        let action = press(&mut view, &mut ctx, KeyCode::Enter);
        assert!(matches!(action, ViewAction::None));
        assert!(view.field_error(0).is_some());
        assert!(ctx.queue.is_empty());
    }

    #[test]
    fn test_valid_submit_navigates_to_confirm() {
        let mut ctx = context();
        let mut view = form(&ctx);
        match press(&mut view, &mut ctx, KeyCode::Enter) {
            ViewAction::Navigate(NavigationState::Confirm, Payload::Plan(plan)) => {
                assert_eq!(plan.label, "web/install");
                assert_eq!(plan.commands[0].invocation, "echo listen 80");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_initialize_resets_previous_input() {
        let mut ctx = context();
        let mut view = form(&ctx);
        view.update(&Message::Paste("0".to_string()), &mut ctx);
        assert_eq!(view.values()["port"], "800");
        view.initialize(
            Payload::Action {
                service: "web".to_string(),
                action: "install".to_string(),
            },
            &ctx,
        );
        assert_eq!(view.values()["port"], "80");
    }
}
