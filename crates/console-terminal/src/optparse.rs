//! Schema-driven parser for flag-style command arguments.
//!
//! Each command declares an ordered list of [`OptionSpec`]s. Parsing looks
//! for every declared flag anywhere in the token list; tokens that match no
//! flag are left for the command to interpret.

use std::collections::HashMap;

use console_types::error::Result;

use crate::context::Output;

/// Whether a flag stands alone or takes the following token as its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptKind {
    Bool,
    Store,
}

/// One declared flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    /// Exact token text, e.g. `-net` or `netmask`.
    pub opt: &'static str,
    pub kind: OptKind,
    /// Display name of the value in usage output.
    pub name: Option<&'static str>,
    pub help: &'static str,
}

impl OptionSpec {
    /// A presence flag.
    pub const fn flag(opt: &'static str, help: &'static str) -> Self {
        Self {
            opt,
            kind: OptKind::Bool,
            name: None,
            help,
        }
    }

    /// A flag that takes the following token as its value.
    pub const fn store(opt: &'static str, name: Option<&'static str>, help: &'static str) -> Self {
        Self {
            opt,
            kind: OptKind::Store,
            name,
            help,
        }
    }

    /// Key under which the parsed value is recorded: the flag without its
    /// leading dashes.
    pub fn key(&self) -> &'static str {
        self.opt.trim_start_matches('-')
    }

    fn usage_text(&self) -> String {
        match self.kind {
            OptKind::Bool => self.opt.to_string(),
            OptKind::Store => format!("{} <{}>", self.opt, self.name.unwrap_or("value")),
        }
    }
}

/// A recorded option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptValue {
    Flag(bool),
    Value(String),
}

/// Result of [`parse`].
///
/// A `store` flag that was not given reads back as `Flag(false)`, exactly
/// like an absent `bool` flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOptions {
    values: HashMap<String, OptValue>,
    /// Set when a `store` flag is missing its value. Parsing stops there.
    pub err: Option<String>,
}

impl ParsedOptions {
    /// Raw recorded value for a stripped flag name.
    pub fn get(&self, key: &str) -> Option<&OptValue> {
        self.values.get(key)
    }

    /// True only for a `bool` flag that was present.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(OptValue::Flag(true)))
    }

    /// The value of a `store` flag that was present.
    pub fn value(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(OptValue::Value(v)) => Some(v),
            _ => None,
        }
    }
}

/// Parse `tokens` against `specs`.
pub fn parse(specs: &[OptionSpec], tokens: &[String]) -> ParsedOptions {
    let mut parsed = ParsedOptions::default();
    for spec in specs {
        let key = spec.key().to_string();
        let Some(pos) = tokens.iter().position(|t| t == spec.opt) else {
            parsed.values.insert(key, OptValue::Flag(false));
            continue;
        };
        match spec.kind {
            OptKind::Bool => {
                parsed.values.insert(key, OptValue::Flag(true));
            },
            OptKind::Store => {
                let value = tokens
                    .get(pos + 1)
                    .filter(|next| !specs.iter().any(|s| s.opt == next.as_str()));
                match value {
                    Some(v) => {
                        parsed.values.insert(key, OptValue::Value(v.clone()));
                    },
                    None => {
                        parsed.err = Some(format!("option '{}' requires a value", spec.opt));
                        break;
                    },
                }
            },
        }
    }
    parsed
}

/// Tokens that are neither declared flags nor the values of `store` flags.
pub fn positionals(specs: &[OptionSpec], tokens: &[String]) -> Vec<String> {
    let mut rest = Vec::new();
    let mut iter = tokens.iter();
    while let Some(tok) = iter.next() {
        match specs.iter().find(|s| s.opt == tok.as_str()) {
            Some(spec) if spec.kind == OptKind::Store => {
                iter.next();
            },
            Some(_) => {},
            None => rest.push(tok.clone()),
        }
    }
    rest
}

/// One aligned line per flag.
pub fn usage_lines(specs: &[OptionSpec]) -> Vec<String> {
    let texts: Vec<String> = specs.iter().map(OptionSpec::usage_text).collect();
    let width = texts.iter().map(String::len).max().unwrap_or(0);
    texts
        .iter()
        .zip(specs)
        .map(|(text, spec)| format!("  {text:<width$}  {}", spec.help))
        .collect()
}

/// Print one aligned usage line per option.
pub fn print_usage(specs: &[OptionSpec], out: &Output) -> Result<()> {
    for line in usage_lines(specs) {
        out.println(&line)?;
    }
    Ok(())
}
