//! Console color theme

use ratatui::style::{Color, Modifier, Style};

use crate::monitor::Severity;

#[derive(Debug, Clone)]
pub struct Theme {
    // ═══════════════════════════════════════════
    // STATUS
    // ═══════════════════════════════════════════
    pub status_running: Color,
    pub status_success: Color,
    pub status_failed: Color,
    pub status_unknown: Color,
    pub status_warning: Color,

    // ═══════════════════════════════════════════
    // UI ELEMENTS
    // ═══════════════════════════════════════════
    pub border_normal: Color,
    pub border_focused: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub highlight: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            status_running: Color::Rgb(245, 158, 11),  // #F59E0B amber
            status_success: Color::Rgb(34, 197, 94),   // #22C55E green
            status_failed: Color::Rgb(239, 68, 68),    // #EF4444 red
            status_unknown: Color::Rgb(107, 114, 128), // #6B7280 gray
            status_warning: Color::Rgb(234, 179, 8),   // #EAB308 yellow

            border_normal: Color::Rgb(75, 85, 99),      // #4B5563 gray-600
            border_focused: Color::Rgb(99, 102, 241),   // #6366F1 indigo
            text_primary: Color::Rgb(243, 244, 246),    // #F3F4F6 gray-100
            text_secondary: Color::Rgb(156, 163, 175),  // #9CA3AF gray-400
            text_muted: Color::Rgb(107, 114, 128),      // #6B7280 gray-500
            highlight: Color::Rgb(99, 102, 241),        // #6366F1 indigo
        }
    }
}

impl Theme {
    /// Get style for panel border (focused or not)
    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default()
                .fg(self.border_focused)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.border_normal)
        }
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text_primary)
    }

    pub fn secondary_style(&self) -> Style {
        Style::default().fg(self.text_secondary)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.text_muted)
    }

    /// Selected list row
    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(self.text_primary)
            .bg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.status_success)
    }

    pub fn failure_style(&self) -> Style {
        Style::default().fg(self.status_failed)
    }

    pub fn running_style(&self) -> Style {
        Style::default().fg(self.status_running)
    }

    /// Installed flag: `Some(true)`, `Some(false)` or not yet known
    pub fn installed_style(&self, installed: Option<bool>) -> Style {
        let color = match installed {
            Some(true) => self.status_success,
            Some(false) => self.status_unknown,
            None => self.text_muted,
        };
        Style::default().fg(color)
    }

    pub fn severity_style(&self, severity: Severity) -> Style {
        let color = match severity {
            Severity::Info => self.text_secondary,
            Severity::Warning => self.status_warning,
            Severity::Critical => self.status_failed,
        };
        Style::default().fg(color)
    }

    /// Results-log line, colored by its leading mark
    pub fn result_line_style(&self, line: &str) -> Style {
        if line.starts_with('✓') {
            self.success_style()
        } else if line.starts_with('✗') {
            self.failure_style()
        } else if line.starts_with('⚠') {
            Style::default().fg(self.status_warning)
        } else {
            self.text_style()
        }
    }
}
