//! Desktop entry point for the interactive console.
//!
//! `console [--config <path>] [command args...]`
//!
//! With command arguments, runs that one command and exits with its result.
//! Otherwise runs the startup lines from the config and reads commands from
//! the terminal until end of input.

mod demo;
mod tty;

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Result, bail};

use console_platform::{Md5Hasher, Sha256Hasher};
use console_terminal::{Context, Output, Registry, Shell, register_builtins};
use console_types::config::ConsoleConfig;
use console_vfs::{HostVfs, Vfs};
use tty::CrosstermTty;

/// Environment variable naming the config file when `--config` is absent.
const CONFIG_ENV: &str = "CONSOLE_CONFIG";

/// Pull `--config <path>` out of the argument list.
fn split_config_arg(args: Vec<String>) -> Result<(Option<PathBuf>, Vec<String>)> {
    let mut config = None;
    let mut rest = Vec::new();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" && config.is_none() {
            let Some(path) = iter.next() else {
                bail!("--config requires a path");
            };
            config = Some(PathBuf::from(path));
        } else {
            rest.push(arg);
        }
    }
    Ok((config, rest))
}

fn load_config(path: Option<PathBuf>) -> Result<ConsoleConfig> {
    let path = path.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
    match path {
        Some(path) => {
            log::info!("Using config {}", path.display());
            Ok(ConsoleConfig::load(&path)?)
        },
        None => Ok(ConsoleConfig::default()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (config_path, command) = split_config_arg(std::env::args().skip(1).collect())?;
    let config = load_config(config_path)?;

    let vfs: Arc<dyn Vfs> = match &config.fs_root {
        Some(root) => Arc::new(HostVfs::new(root.clone())?),
        None => Arc::new(demo::demo_vfs()?),
    };

    let platform = Arc::new(demo::demo_platform());
    {
        // Keep the demo scheduler counters moving for `perf stat`.
        let platform = Arc::clone(&platform);
        thread::Builder::new()
            .name("tracepoint-ticker".to_string())
            .spawn(move || {
                let mut tick = 0u64;
                loop {
                    tick += 1;
                    let _ = platform.fire("sched_switch", 3 + tick % 5);
                    if tick % 3 == 0 {
                        let _ = platform.fire("mutex_lock", 1);
                    }
                    thread::sleep(Duration::from_millis(100));
                }
            })?;
    }

    let mut registry = Registry::new();
    register_builtins(&mut registry);
    registry.init_all()?;

    let out = Output::new(std::io::stdout()).with_bell(config.bell);
    let ctx = Context::new(Arc::new(registry), vfs, out)
        .with_network(Arc::clone(&platform) as _)
        .with_process(Arc::clone(&platform) as _)
        .with_trace(Arc::clone(&platform) as _)
        .with_tests(platform)
        .with_hash(Arc::new(Md5Hasher))
        .with_hash(Arc::new(Sha256Hasher));

    let mut shell = Shell::new(config, CrosstermTty::new(), ctx);

    if !command.is_empty() {
        let code = shell.execute_tokens(command)?;
        shell.context().out.flush()?;
        std::process::exit(code);
    }

    log::info!("Console ready (prompt {:?})", shell.prompt());
    shell.run_startup()?;
    shell.run()?;
    shell.context().out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn config_arg_removed() {
        let (path, rest) = split_config_arg(args(&["--config", "c.toml", "ls", "/"])).unwrap();
        assert_eq!(path, Some(PathBuf::from("c.toml")));
        assert_eq!(rest, vec!["ls", "/"]);
    }

    #[test]
    fn no_config_arg() {
        let (path, rest) = split_config_arg(args(&["route", "add", "gw", "10.0.0.1"])).unwrap();
        assert!(path.is_none());
        assert_eq!(rest.len(), 4);
    }

    #[test]
    fn config_arg_without_path() {
        assert!(split_config_arg(args(&["--config"])).is_err());
    }

    #[test]
    fn load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.toml");
        std::fs::write(&path, "line_capacity = 40\nprompt = \"> \"\n").unwrap();
        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.line_capacity, 40);
        assert_eq!(config.prompt, "> ");
    }
}
