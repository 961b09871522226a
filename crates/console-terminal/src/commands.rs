//! Built-in console commands.

use console_types::error::{ConsoleError, Result};

use crate::context::Context;
use crate::registry::{Command, Registry};

/// Register all built-in commands into a registry.
pub fn register_builtins(reg: &mut Registry) {
    reg.register(Box::new(HelpCmd));
    crate::file_commands::register_file_commands(reg);
    crate::network_commands::register_network_commands(reg);
    crate::system_commands::register_system_commands(reg);
}

/// Error for a command that needs a platform service the context lacks.
pub(crate) fn missing_service(what: &str) -> ConsoleError {
    ConsoleError::Command(format!("{what} service not available"))
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

struct HelpCmd;
impl Command for HelpCmd {
    fn name(&self) -> &str {
        "help"
    }
    fn description(&self) -> &str {
        "List commands or show usage for one"
    }
    fn usage(&self) -> &str {
        "help [command]"
    }
    fn invoke(&self, args: &[String], ctx: &mut Context) -> Result<i32> {
        let registry = &ctx.registry;
        if let Some(name) = args.get(1) {
            let Some(cmd) = registry.get(name) else {
                ctx.out.println(&format!("No such command: '{name}'"))?;
                return Ok(1);
            };
            ctx.out.println(&format!("{name} - {}", cmd.description()))?;
            cmd.help(&ctx.out)?;
            return Ok(0);
        }
        let width = registry.commands().map(|c| c.name().len()).max().unwrap_or(0);
        ctx.out.println("Available commands:")?;
        for cmd in registry.commands() {
            ctx.out
                .println(&format!("  {:<width$}  {}", cmd.name(), cmd.description()))?;
        }
        Ok(0)
    }
    fn tab(&self, args: &[String], ctx: &Context) -> Option<Vec<String>> {
        match args.len() {
            2 => Some(ctx.registry.names()),
            _ => Some(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::eval;
    use crate::testutil::context;

    fn setup() -> (Context, crate::context::Captured) {
        let mut reg = Registry::new();
        register_builtins(&mut reg);
        context(reg)
    }

    #[test]
    fn builtins_registered_once() {
        let mut reg = Registry::new();
        register_builtins(&mut reg);
        let count = reg.len();
        register_builtins(&mut reg);
        assert_eq!(reg.len(), count);
        reg.init_all().unwrap();
        let names = reg.names();
        assert_eq!(names[0], "help");
        assert_eq!(names.iter().filter(|n| *n == "ls").count(), 1);
        for name in [
            "cd", "pwd", "ls", "cat", "ifconfig", "arp", "route", "dhclient", "run",
            "md5sum", "sha256sum", "perf", "test",
        ] {
            assert!(reg.contains(name), "missing {name}");
        }
    }

    #[test]
    fn help_lists_commands_in_order() {
        let (mut ctx, captured) = setup();
        assert_eq!(eval("help", &mut ctx).unwrap().code(), 0);
        let text = captured.contents();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Available commands:"));
        assert!(lines.next().unwrap().trim_start().starts_with("help"));
        let ls = text.find("  ls ").unwrap();
        let cat = text.find("  cat ").unwrap();
        assert!(ls < cat);
    }

    #[test]
    fn help_for_one_command() {
        let (mut ctx, captured) = setup();
        eval("help cd", &mut ctx).unwrap();
        let text = captured.contents();
        assert!(text.starts_with("cd - "));
        assert!(text.contains("usage: cd [path]"));
    }

    #[test]
    fn help_for_unknown_command() {
        let (mut ctx, captured) = setup();
        assert_eq!(eval("help frobnicate", &mut ctx).unwrap().code(), 1);
        assert_eq!(captured.contents(), "No such command: 'frobnicate'\n");
    }

    #[test]
    fn help_completes_command_names() {
        let (ctx, _captured) = setup();
        let cmd = ctx.registry.get("help").unwrap();
        let args = vec!["help".to_string(), String::new()];
        let names = cmd.tab(&args, &ctx).unwrap();
        assert!(names.contains(&"route".to_string()));
    }
}
