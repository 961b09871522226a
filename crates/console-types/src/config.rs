//! Console configuration loaded from TOML.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ConsoleError, Result};

/// Placeholder substituted with the working directory in `prompt`.
pub const CWD_PLACEHOLDER: &str = "{cwd}";

/// Runtime configuration for the console.
///
/// Every field has a default, so an empty file (or no file at all) yields the
/// stock console: an 80-column line, the `[cwd]$ ` prompt, and `&` as the
/// background marker.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Prompt template. `{cwd}` is replaced by the working directory.
    pub prompt: String,
    /// Capacity of the line buffer, in bytes.
    pub line_capacity: usize,
    /// Emit BEL (0x07) for rejected keystrokes.
    pub bell: bool,
    /// Trailing token that requests background execution.
    pub async_marker: String,
    /// Working directory at startup.
    pub initial_cwd: String,
    /// Host directory exposed as the console filesystem root.
    /// `None` uses the in-memory demo filesystem.
    pub fs_root: Option<PathBuf>,
    /// Lines evaluated once, after every command's `init`, before the first prompt.
    pub startup: Vec<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: "[{cwd}]$ ".to_string(),
            line_capacity: 80,
            bell: true,
            async_marker: "&".to_string(),
            initial_cwd: "/".to_string(),
            fs_root: None,
            startup: Vec::new(),
        }
    }
}

impl ConsoleConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        log::debug!("Loaded config from {}", path.display());
        Self::from_toml(&text)
    }

    /// Render the prompt for the given working directory.
    pub fn prompt_for(&self, cwd: &str) -> String {
        self.prompt.replace(CWD_PLACEHOLDER, cwd)
    }

    fn validate(&self) -> Result<()> {
        if self.line_capacity == 0 {
            return Err(ConsoleError::Config(
                "line_capacity must be positive".to_string(),
            ));
        }
        if self.async_marker.is_empty() || self.async_marker.contains(' ') {
            return Err(ConsoleError::Config(format!(
                "async_marker must be a single token: {:?}",
                self.async_marker
            )));
        }
        if !self.initial_cwd.starts_with('/') {
            return Err(ConsoleError::Config(format!(
                "initial_cwd must be absolute: {}",
                self.initial_cwd
            )));
        }
        Ok(())
    }
}
