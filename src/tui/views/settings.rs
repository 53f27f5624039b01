//! Settings: shell, monitoring URL and log file
//!
//! Edits a draft of the configuration. Saving writes it to the config file
//! and hands it to the controller, which rebuilds the runner, the metrics
//! source and the log store.

use std::path::PathBuf;

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::keys::{is_ctrl, key, typed};
use super::{View, ViewAction};
use crate::config::AppConfig;
use crate::error::{HostpilotError, Result};
use crate::monitor::parse_base;
use crate::tui::context::SharedContext;
use crate::tui::message::Message;
use crate::tui::theme::Theme;
use crate::tui::widgets::TextInput;

/// Settings field focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsField {
    #[default]
    Shell,
    MonitoringUrl,
    LogFile,
}

impl SettingsField {
    pub fn all() -> &'static [SettingsField] {
        &[
            SettingsField::Shell,
            SettingsField::MonitoringUrl,
            SettingsField::LogFile,
        ]
    }

    /// Get next field (wrapping)
    pub fn next(&self) -> SettingsField {
        match self {
            SettingsField::Shell => SettingsField::MonitoringUrl,
            SettingsField::MonitoringUrl => SettingsField::LogFile,
            SettingsField::LogFile => SettingsField::Shell,
        }
    }

    /// Get previous field (wrapping)
    pub fn prev(&self) -> SettingsField {
        match self {
            SettingsField::Shell => SettingsField::LogFile,
            SettingsField::MonitoringUrl => SettingsField::Shell,
            SettingsField::LogFile => SettingsField::MonitoringUrl,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SettingsField::Shell => "Shell",
            SettingsField::MonitoringUrl => "Monitoring URL",
            SettingsField::LogFile => "Log file",
        }
    }

    fn read(&self, config: &AppConfig) -> String {
        match self {
            SettingsField::Shell => config.shell.clone(),
            SettingsField::MonitoringUrl => config.monitoring.url.clone(),
            SettingsField::LogFile => config.log_file.display().to_string(),
        }
    }

    fn write(&self, config: &mut AppConfig, value: &str) -> Result<()> {
        let value = value.trim();
        match self {
            SettingsField::Shell => {
                if value.is_empty() {
                    return Err(HostpilotError::InvalidValue {
                        value: value.to_string(),
                        reason: "shell cannot be empty".to_string(),
                    });
                }
                config.shell = value.to_string();
            }
            SettingsField::MonitoringUrl => {
                parse_base(value)?;
                config.monitoring.url = value.to_string();
            }
            SettingsField::LogFile => {
                if value.is_empty() {
                    return Err(HostpilotError::InvalidValue {
                        value: value.to_string(),
                        reason: "log file path cannot be empty".to_string(),
                    });
                }
                config.log_file = PathBuf::from(value);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct SettingsView {
    focus: SettingsField,
    /// Edit mode active (typing in field)
    editing: bool,
    input: TextInput,
    /// Draft; `None` until first shown
    config: Option<AppConfig>,
    dirty: bool,
    status_message: Option<String>,
}

impl SettingsView {
    pub fn draft(&self) -> Option<&AppConfig> {
        self.config.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    fn start_edit(&mut self) {
        if let Some(config) = &self.config {
            self.input = TextInput::new(self.focus.read(config));
            self.editing = true;
        }
    }

    fn cancel_edit(&mut self) {
        self.editing = false;
        self.input.clear();
    }

    fn confirm_edit(&mut self) {
        let Some(config) = self.config.as_mut() else {
            return;
        };
        match self.focus.write(config, self.input.value()) {
            Ok(()) => {
                self.dirty = true;
                self.editing = false;
                self.status_message = None;
                self.input.clear();
            }
            Err(e) => self.status_message = Some(format!("✗ {}", e)),
        }
    }

    fn save(&mut self, ctx: &SharedContext) -> ViewAction {
        let Some(config) = &self.config else {
            return ViewAction::None;
        };
        match config.save_to(&ctx.config_path) {
            Ok(()) => {
                self.dirty = false;
                self.status_message = Some("✓ Settings saved".to_string());
                ViewAction::ConfigChanged(config.clone())
            }
            Err(e) => {
                self.status_message = Some(format!("✗ {}", e));
                ViewAction::None
            }
        }
    }

    fn handle_edit_key(&mut self, code: KeyCode, c: Option<char>) {
        match code {
            KeyCode::Enter => self.confirm_edit(),
            KeyCode::Esc => self.cancel_edit(),
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete(),
            KeyCode::Left => self.input.cursor_left(),
            KeyCode::Right => self.input.cursor_right(),
            KeyCode::Home => self.input.cursor_home(),
            KeyCode::End => self.input.cursor_end(),
            _ => {
                if let Some(c) = c {
                    self.input.insert_char(c);
                }
            }
        }
    }
}

impl View for SettingsView {
    fn init(&mut self, ctx: &mut SharedContext) -> ViewAction {
        if !self.dirty {
            self.config = Some(ctx.config.clone());
        }
        ViewAction::None
    }

    fn update(&mut self, msg: &Message, ctx: &mut SharedContext) -> ViewAction {
        if let Message::Paste(text) = msg {
            if self.editing {
                self.input.insert_str(text);
            }
            return ViewAction::None;
        }
        let Some(key) = key(msg) else {
            return ViewAction::None;
        };

        if self.editing {
            self.handle_edit_key(key.code, typed(key));
            return ViewAction::None;
        }
        if is_ctrl(key, 's') {
            return self.save(ctx);
        }

        match (key.code, typed(key)) {
            (KeyCode::Esc, _) | (_, Some('q')) => return ViewAction::Back,
            (KeyCode::Down, _) | (KeyCode::Tab, _) | (_, Some('j')) => {
                self.focus = self.focus.next()
            }
            (KeyCode::Up, _) | (KeyCode::BackTab, _) | (_, Some('k')) => {
                self.focus = self.focus.prev()
            }
            (KeyCode::Enter, _) | (_, Some('e')) => self.start_edit(),
            (_, Some('s')) => return self.save(ctx),
            _ => {}
        }
        ViewAction::None
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &SharedContext, theme: &Theme) {
        let mut lines: Vec<Line> = vec![Line::from("")];

        for field in SettingsField::all() {
            let is_focused = self.focus == *field;
            let is_editing = self.editing && is_focused;

            let value = if is_editing {
                self.input.display_with_cursor()
            } else {
                self.config
                    .as_ref()
                    .map(|c| field.read(c))
                    .unwrap_or_default()
            };

            let prefix = if is_focused { "► " } else { "  " };
            let label_style = if is_focused {
                theme.text_style().add_modifier(Modifier::BOLD)
            } else {
                theme.secondary_style()
            };
            let value_style = if is_editing {
                theme.success_style()
            } else if is_focused {
                theme.text_style()
            } else {
                theme.muted_style()
            };

            lines.push(Line::from(vec![
                Span::styled(prefix, label_style),
                Span::styled(format!("{:<18}", field.label()), label_style),
                Span::styled(value, value_style),
            ]));
        }

        lines.push(Line::from(""));
        if let Some(msg) = &self.status_message {
            let style = if msg.starts_with('✓') {
                theme.success_style()
            } else {
                theme.failure_style()
            };
            lines.push(Line::from(Span::styled(format!("  {}", msg), style)));
        } else if self.dirty {
            lines.push(Line::from(Span::styled(
                "  • Unsaved changes (Ctrl+S to save)",
                theme.running_style(),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                format!("  Config: {}", ctx.config_path.display()),
                theme.muted_style(),
            )));
        }

        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.border_style(true))
                    .title(" Settings "),
            ),
            area,
        );
    }

    fn status_line(&self, _ctx: &SharedContext) -> String {
        if self.editing {
            "[Enter] Confirm  [Esc] Cancel  [←→] Move cursor".to_string()
        } else {
            "[↑↓] Navigate  [Enter/e] Edit  [Ctrl+S] Save  [Esc] Back".to_string()
        }
    }
}
