//! Overwrite confirmation asked before `pack` replaces an existing archive.

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, Write};
use std::path::Path;

pub trait OverwritePrompt {
    /// `Ok(true)` lets the caller delete `path` and write a new archive.
    fn confirm_overwrite(&mut self, path: &Path) -> io::Result<bool>;
}

impl<F> OverwritePrompt for F
where
    F: FnMut(&Path) -> io::Result<bool>,
{
    fn confirm_overwrite(&mut self, path: &Path) -> io::Result<bool> {
        self(path)
    }
}

/// Always overwrite.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl OverwritePrompt for AssumeYes {
    fn confirm_overwrite(&mut self, _path: &Path) -> io::Result<bool> {
        Ok(true)
    }
}

/// Never overwrite.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeNo;

impl OverwritePrompt for AssumeNo {
    fn confirm_overwrite(&mut self, _path: &Path) -> io::Result<bool> {
        Ok(false)
    }
}

/// Asks on stderr and waits for a single `Y` or `n` keystroke.
///
/// Esc and Ctrl-C count as `n`, since raw mode swallows the interrupt.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl OverwritePrompt for TerminalPrompt {
    fn confirm_overwrite(&mut self, path: &Path) -> io::Result<bool> {
        let mut err = io::stderr().lock();
        writeln!(err, "[warning] {} already exists.", path.display())?;
        write!(err, "          Overwrite it? Press 'Y' or 'n': ")?;
        err.flush()?;

        let answer = read_yes_no()?;
        writeln!(err, "{}", if answer { "Y" } else { "n" })?;
        Ok(answer)
    }
}

fn read_yes_no() -> io::Result<bool> {
    let _raw = RawModeGuard::enter()?;
    loop {
        let Event::Key(key) = event::read()? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('Y') => return Ok(true),
            KeyCode::Char('n') | KeyCode::Esc => return Ok(false),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(false),
            _ => {}
        }
    }
}

/// Raw terminal input for as long as the guard lives.
struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            log::warn!("failed to restore terminal mode: {e}");
        }
    }
}
