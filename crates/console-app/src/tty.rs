//! Terminal driver over the process's stdin.

use std::io::{self, IsTerminal, Read};

use console_terminal::Tty;
use console_types::error::Result;
use console_types::keys::ENTER;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

/// Reads stdin one byte at a time, toggling raw mode with crossterm.
///
/// When stdin is not a terminal (piped input), raw mode is skipped and
/// newlines are read as Enter.
pub struct CrosstermTty {
    interactive: bool,
    raw: bool,
}

impl CrosstermTty {
    pub fn new() -> Self {
        Self {
            interactive: io::stdin().is_terminal(),
            raw: false,
        }
    }
}

impl Default for CrosstermTty {
    fn default() -> Self {
        Self::new()
    }
}

impl Tty for CrosstermTty {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match io::stdin().lock().read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
                Err(e) => return Err(e.into()),
            }
        }
        if !self.interactive && byte[0] == b'\n' {
            return Ok(Some(ENTER));
        }
        Ok(Some(byte[0]))
    }

    fn enter_raw(&mut self) -> Result<()> {
        if self.interactive && !self.raw {
            enable_raw_mode()?;
            self.raw = true;
        }
        Ok(())
    }

    fn leave_raw(&mut self) -> Result<()> {
        if self.raw {
            disable_raw_mode()?;
            self.raw = false;
        }
        Ok(())
    }
}

impl Drop for CrosstermTty {
    fn drop(&mut self) {
        if self.raw {
            let _ = disable_raw_mode();
        }
    }
}
