//! Tokenizing finished lines and dispatching them to commands.

use std::sync::Arc;
use std::thread;

use console_types::error::Result;

use crate::context::Context;

/// Outcome of dispatching one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Empty line, nothing ran.
    Idle,
    /// The command ran to completion with this result.
    Exited(i32),
    /// The command was started in the background.
    Spawned,
    /// No command with that name is registered.
    NoSuchCommand,
}

impl Status {
    /// Numeric result, negative when the command was not found.
    pub fn code(self) -> i32 {
        match self {
            Self::Idle | Self::Spawned => 0,
            Self::Exited(code) => code,
            Self::NoSuchCommand => -1,
        }
    }
}

/// Split a line into tokens: trailing spaces are dropped, then the line is
/// split on every single space. An empty line has no tokens.
pub fn tokenize(line: &str) -> Vec<String> {
    let trimmed = line.trim_end_matches(' ');
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split(' ').map(String::from).collect()
}

/// Run a tokenized command line.
///
/// A trailing token equal to the context's async marker is removed and the
/// command is started on a detached thread with a clone of `ctx`. Errors from
/// a background command are only logged.
pub fn dispatch(mut tokens: Vec<String>, ctx: &mut Context) -> Result<Status> {
    let background = tokens.last().is_some_and(|t| *t == ctx.async_marker);
    if background {
        tokens.pop();
    }
    let Some(name) = tokens.first().cloned() else {
        return Ok(Status::Idle);
    };
    if name.is_empty() {
        return Ok(Status::Idle);
    }

    let registry = Arc::clone(&ctx.registry);
    let Some(command) = registry.get(&name) else {
        ctx.out.println(&format!("No such command: '{name}'"))?;
        return Ok(Status::NoSuchCommand);
    };

    if !background {
        log::debug!("Dispatching {name} with {} args", tokens.len() - 1);
        return command.invoke(&tokens, ctx).map(Status::Exited);
    }

    log::debug!("Spawning {name} in the background");
    let mut task_ctx = ctx.clone();
    thread::Builder::new()
        .name(format!("{name}&"))
        .spawn(move || {
            let registry = Arc::clone(&task_ctx.registry);
            let Some(command) = registry.get(&name) else {
                return;
            };
            match command.invoke(&tokens, &mut task_ctx) {
                Ok(code) => log::debug!("Background {name} exited with {code}"),
                Err(e) => log::warn!("Background {name} failed: {e}"),
            }
        })?;
    Ok(Status::Spawned)
}

/// Tokenize and dispatch `line`. Safe to call from inside a command.
pub fn eval(line: &str, ctx: &mut Context) -> Result<Status> {
    dispatch(tokenize(line), ctx)
}
