//! Spinner Widget
//!
//! Animated spinner shown while a queue is running.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Spinner animation frames
pub const BRAILLE_SPINNER: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub struct Spinner {
    /// Tick counter; wraps
    frame: u8,
    color: Color,
}

impl Spinner {
    pub fn new(frame: u8) -> Self {
        Self {
            frame,
            color: Color::Cyan,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// One glyph per tick
    pub fn current_char(&self) -> char {
        BRAILLE_SPINNER[self.frame as usize % BRAILLE_SPINNER.len()]
    }
}

impl Widget for Spinner {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let ch = self.current_char();
        buf.set_string(
            area.x,
            area.y,
            ch.to_string(),
            Style::default().fg(self.color),
        );
    }
}
