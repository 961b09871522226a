//! Command trait and the ordered command registry.

use std::collections::HashMap;

use console_types::error::Result;

use crate::context::{Context, Output};
use crate::line::LineBuffer;

/// Separator between listed completion candidates when a command does not
/// choose its own.
pub const DEFAULT_TAB_DELIM: &str = "\t";

/// A single executable command.
///
/// Only `invoke` is required. Every other capability has a default that
/// behaves as if the command did not offer it.
pub trait Command: Send + Sync {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// One-line description for `help`.
    fn description(&self) -> &str;

    /// Usage string (e.g. "ls \[-l\] \[path\]").
    fn usage(&self) -> &str;

    /// Run the command. `args[0]` is the command name.
    fn invoke(&self, args: &[String], ctx: &mut Context) -> Result<i32>;

    /// Completion candidates for the word being typed, which is always the
    /// last element of `args` (empty right after a space). `None` means the
    /// command does not complete its arguments.
    fn tab(&self, _args: &[String], _ctx: &Context) -> Option<Vec<String>> {
        None
    }

    /// How a candidate is displayed when several match.
    fn tab_pretty(&self, candidate: &str) -> String {
        candidate.to_string()
    }

    /// Separator between displayed candidates.
    fn tab_delim(&self) -> Option<&str> {
        None
    }

    /// Called after every completion attempt on this command's arguments.
    fn tab_final(&self, _completed: bool, _line: &mut LineBuffer, _ctx: &Context) {}

    /// Print usage information.
    fn help(&self, out: &Output) -> Result<()> {
        out.println(&format!("usage: {}", self.usage()))
    }

    /// One-time setup, run before the first prompt.
    fn init(&self) -> Result<()> {
        Ok(())
    }
}

struct Entry {
    command: Box<dyn Command>,
    delim: String,
}

/// Registered commands in registration order.
#[derive(Default)]
pub struct Registry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command under its name. A later registration with the same
    /// name replaces the earlier one but keeps its position.
    pub fn register(&mut self, command: Box<dyn Command>) {
        let name = command.name().to_string();
        let delim = command
            .tab_delim()
            .unwrap_or(DEFAULT_TAB_DELIM)
            .to_string();
        let entry = Entry { command, delim };
        match self.index.get(&name) {
            Some(&i) => {
                log::debug!("Replacing command {name}");
                self.entries[i] = entry;
            },
            None => {
                self.index.insert(name, self.entries.len());
                self.entries.push(entry);
            },
        }
    }

    /// Look up a command by name.
    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.index
            .get(name)
            .map(|&i| self.entries[i].command.as_ref())
    }

    /// Delimiter chosen by the command when it was registered.
    pub fn delim(&self, name: &str) -> &str {
        self.index
            .get(name)
            .map_or(DEFAULT_TAB_DELIM, |&i| self.entries[i].delim.as_str())
    }

    /// Whether a command with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Command names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.command.name().to_string())
            .collect()
    }

    /// Registered commands in registration order.
    pub fn commands(&self) -> impl Iterator<Item = &dyn Command> {
        self.entries.iter().map(|e| e.command.as_ref())
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no command is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every command's `init`, in registration order.
    pub fn init_all(&self) -> Result<()> {
        for entry in &self.entries {
            entry.command.init()?;
        }
        log::info!("Initialized {} commands", self.entries.len());
        Ok(())
    }
}
