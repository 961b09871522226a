//! Error types for the console.

use std::io;

/// Errors produced by the console and its commands.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("command error: {0}")]
    Command(String),

    #[error("usage: {0}")]
    Usage(String),

    #[error("VFS error: {0}")]
    Vfs(String),

    #[error("platform error: {0}")]
    Platform(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("terminal error: {0}")]
    Terminal(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_error_display() {
        let e = ConsoleError::Command("bad state".into());
        assert_eq!(format!("{e}"), "command error: bad state");
    }

    #[test]
    fn usage_error_display() {
        let e = ConsoleError::Usage("cat <file>".into());
        assert_eq!(format!("{e}"), "usage: cat <file>");
    }

    #[test]
    fn vfs_error_display() {
        let e = ConsoleError::Vfs("no such file: /x".into());
        assert_eq!(format!("{e}"), "VFS error: no such file: /x");
    }

    #[test]
    fn platform_error_display() {
        let e = ConsoleError::Platform("no such interface".into());
        assert_eq!(format!("{e}"), "platform error: no such interface");
    }

    #[test]
    fn config_error_display() {
        let e = ConsoleError::Config("capacity must be positive".into());
        assert_eq!(format!("{e}"), "config error: capacity must be positive");
    }

    #[test]
    fn terminal_error_display() {
        let e = ConsoleError::Terminal("raw mode unavailable".into());
        assert_eq!(format!("{e}"), "terminal error: raw mode unavailable");
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "closed");
        let e: ConsoleError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("closed"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let toml_err = toml::from_str::<toml::Value>("this is [[[not valid toml").unwrap_err();
        let e: ConsoleError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn result_alias_err() {
        let r: Result<i32> = Err(ConsoleError::Vfs("oops".into()));
        assert!(r.is_err());
    }
}
