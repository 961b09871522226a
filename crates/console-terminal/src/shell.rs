//! The interactive main loop.

use console_types::config::ConsoleConfig;
use console_types::error::Result;
use console_types::keys::{ENTER, Key};

use crate::complete::complete;
use crate::context::Context;
use crate::dispatch::{dispatch, tokenize};
use crate::line::LineBuffer;

/// Byte-level terminal driver.
pub trait Tty {
    /// Read one byte. `None` at end of input.
    fn read_byte(&mut self) -> Result<Option<u8>>;

    /// Deliver bytes as typed, without line buffering or echo.
    fn enter_raw(&mut self) -> Result<()>;

    /// Restore the terminal's normal mode.
    fn leave_raw(&mut self) -> Result<()>;
}

/// Single-threaded console driver: edits a line, completes on tab, runs the
/// line on enter.
pub struct Shell<T: Tty> {
    tty: T,
    line: LineBuffer,
    config: ConsoleConfig,
    ctx: Context,
}

impl<T: Tty> Shell<T> {
    /// Build a shell. The context's working directory and async marker are
    /// taken from `config`.
    pub fn new(config: ConsoleConfig, tty: T, mut ctx: Context) -> Self {
        ctx.cwd.clone_from(&config.initial_cwd);
        ctx.async_marker.clone_from(&config.async_marker);
        Self {
            tty,
            line: LineBuffer::new(config.line_capacity),
            config,
            ctx,
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    /// The prompt for the current working directory.
    pub fn prompt(&self) -> String {
        self.config.prompt_for(&self.ctx.cwd)
    }

    fn render(&self, newline: bool) -> Result<()> {
        self.ctx
            .out
            .write_str(&self.line.render(&self.prompt(), newline))?;
        self.ctx.out.flush()
    }

    /// Read one line in raw mode. `None` when input ends first.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        self.line.reset();
        self.tty.enter_raw()?;
        let result = self.edit();
        let restored = self.tty.leave_raw();
        let line = result?;
        restored?;
        Ok(line)
    }

    fn edit(&mut self) -> Result<Option<String>> {
        self.render(false)?;
        loop {
            let Some(byte) = self.tty.read_byte()? else {
                return Ok(None);
            };
            let key = Key::from_byte(byte);
            if self.line.is_full() && !key.allowed_when_full() {
                self.ctx.out.beep()?;
                self.ctx.out.flush()?;
                continue;
            }
            match key {
                Key::Erase => {
                    if self.line.backspace() {
                        self.ctx.out.write_str("\x08 ")?;
                    } else {
                        self.ctx.out.beep()?;
                    }
                },
                Key::Complete => complete(&mut self.line, &self.ctx)?,
                Key::Submit => {
                    self.line.insert(ENTER);
                    self.render(true)?;
                    return Ok(Some(self.line.text()));
                },
                Key::Literal(b) => {
                    self.line.insert(b);
                },
            }
            self.render(false)?;
        }
    }

    /// Run one command line and return its result code. A command error is
    /// printed as `<name>: <error>` and reported as 1.
    pub fn execute(&mut self, line: &str) -> Result<i32> {
        self.execute_tokens(tokenize(line))
    }

    /// Run an already tokenized command line.
    pub fn execute_tokens(&mut self, tokens: Vec<String>) -> Result<i32> {
        let name = tokens.first().cloned().unwrap_or_default();
        match dispatch(tokens, &mut self.ctx) {
            Ok(status) => Ok(status.code()),
            Err(e) => {
                self.ctx.out.println(&format!("{name}: {e}"))?;
                Ok(1)
            },
        }
    }

    /// Evaluate the configured startup lines in order.
    pub fn run_startup(&mut self) -> Result<()> {
        let lines = self.config.startup.clone();
        for line in &lines {
            log::debug!("startup: {line}");
            self.execute(line)?;
        }
        Ok(())
    }

    /// Read and run lines until input ends.
    pub fn run(&mut self) -> Result<()> {
        while let Some(line) = self.read_line()? {
            self.execute(&line)?;
            self.ctx.out.flush()?;
        }
        log::info!("End of input");
        Ok(())
    }
}
