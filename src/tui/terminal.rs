//! Raw-mode terminal handle
//!
//! Entering switches to the alternate screen with bracketed paste; dropping
//! the handle restores the terminal even on an early error return.

use std::io::{self, Stdout};

use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};

use crate::error::{HostpilotError, Result};

pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    restored: bool,
}

fn tui_err(what: &str, e: io::Error) -> HostpilotError {
    HostpilotError::TuiError {
        reason: format!("{}: {}", what, e),
    }
}

impl Tui {
    /// Initialize terminal for TUI rendering
    pub fn enter() -> Result<Self> {
        enable_raw_mode().map_err(|e| tui_err("Failed to enable raw mode", e))?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
            .map_err(|e| tui_err("Failed to enter alternate screen", e))?;

        let backend = CrosstermBackend::new(stdout);
        let terminal =
            Terminal::new(backend).map_err(|e| tui_err("Failed to create terminal", e))?;

        Ok(Self {
            terminal,
            restored: false,
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        let size = self
            .terminal
            .size()
            .map_err(|e| tui_err("Failed to read terminal size", e))?;
        Ok((size.width, size.height))
    }

    pub fn clear(&mut self) -> Result<()> {
        self.terminal
            .clear()
            .map_err(|e| tui_err("Failed to clear screen", e))
    }

    pub fn draw<F>(&mut self, render: F) -> Result<()>
    where
        F: FnOnce(&mut Frame),
    {
        self.terminal
            .draw(render)
            .map_err(|e| tui_err("Failed to draw frame", e))?;
        Ok(())
    }

    /// Cleanup terminal state
    pub fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        disable_raw_mode().map_err(|e| tui_err("Failed to disable raw mode", e))?;
        execute!(
            self.terminal.backend_mut(),
            DisableBracketedPaste,
            LeaveAlternateScreen
        )
        .map_err(|e| tui_err("Failed to leave alternate screen", e))?;
        self.terminal
            .show_cursor()
            .map_err(|e| tui_err("Failed to show cursor", e))
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        // Best effort cleanup
        if !self.restored {
            let _ = disable_raw_mode();
            let _ = execute!(
                self.terminal.backend_mut(),
                DisableBracketedPaste,
                LeaveAlternateScreen
            );
            let _ = self.terminal.show_cursor();
        }
    }
}
