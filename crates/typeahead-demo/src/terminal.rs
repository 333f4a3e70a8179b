#![forbid(unsafe_code)]

//! Raw-mode terminal session with guaranteed cleanup.
//!
//! The session restores the terminal on drop and from a panic hook, so a
//! crash never leaves the shell in raw mode.

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use crossterm::{cursor, event, execute, terminal};
use typeahead::Event;

/// An active raw-mode session.
#[derive(Debug)]
pub struct Session {
    mouse_enabled: bool,
}

impl Session {
    /// Enter raw mode and the alternate screen, with optional mouse capture.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be configured.
    pub fn new(mouse: bool) -> io::Result<Self> {
        install_panic_hook();

        terminal::enable_raw_mode()?;
        tracing::info!("terminal raw mode enabled");
        let mut session = Self {
            mouse_enabled: false,
        };

        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            event::EnableBracketedPaste
        )?;
        if mouse {
            execute!(stdout, event::EnableMouseCapture)?;
            session.mouse_enabled = true;
            tracing::info!("mouse capture enabled");
        }
        Ok(session)
    }

    /// Wait up to `timeout` for the next event.
    ///
    /// Returns `Ok(None)` on timeout or for events with no canonical mapping.
    pub fn next_event(&self, timeout: Duration) -> io::Result<Option<Event>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        Ok(Event::from_crossterm(event::read()?))
    }

    fn cleanup(&mut self) {
        let mut stdout = io::stdout();
        if self.mouse_enabled {
            let _ = execute!(stdout, event::DisableMouseCapture);
            self.mouse_enabled = false;
        }
        let _ = execute!(
            stdout,
            event::DisableBracketedPaste,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
        let _ = stdout.flush();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, event::DisableMouseCapture);
    let _ = execute!(stdout, event::DisableBracketedPaste);
    let _ = execute!(stdout, cursor::Show);
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = stdout.flush();
}
