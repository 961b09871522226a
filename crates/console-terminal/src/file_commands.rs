//! Filesystem browsing commands: cd, pwd, ls, cat.

use console_types::error::{ConsoleError, Result};
use console_vfs::{EntryKind, resolve_path, split_partial};

use crate::context::Context;
use crate::line::LineBuffer;
use crate::optparse::{self, OptionSpec};
use crate::registry::{Command, Registry};

pub fn register_file_commands(reg: &mut Registry) {
    reg.register(Box::new(CdCmd));
    reg.register(Box::new(PwdCmd));
    reg.register(Box::new(LsCmd));
    reg.register(Box::new(CatCmd));
}

/// Paths completing `partial`, spelled the way the user started typing them.
pub(crate) fn path_candidates(ctx: &Context, partial: &str, dirs_only: bool) -> Vec<String> {
    let (dir_part, _) = split_partial(partial);
    let dir = resolve_path(&ctx.cwd, if dir_part.is_empty() { "." } else { dir_part });
    let Ok(entries) = ctx.vfs.readdir(&dir) else {
        return Vec::new();
    };
    entries
        .into_iter()
        .filter(|e| !dirs_only || e.kind == EntryKind::Directory)
        .map(|e| format!("{dir_part}{}", e.name))
        .collect()
}

/// Final component of a path candidate, for listing.
pub(crate) fn path_tail(candidate: &str) -> String {
    split_partial(candidate).1.to_string()
}

// ---------------------------------------------------------------------------
// cd
// ---------------------------------------------------------------------------

struct CdCmd;
impl Command for CdCmd {
    fn name(&self) -> &str {
        "cd"
    }
    fn description(&self) -> &str {
        "Change working directory"
    }
    fn usage(&self) -> &str {
        "cd [path]"
    }
    fn invoke(&self, args: &[String], ctx: &mut Context) -> Result<i32> {
        let target = match args.get(1) {
            Some(path) => ctx.vfs.canonicalize(&ctx.cwd, path)?,
            None => "/".to_string(),
        };
        let meta = ctx.vfs.stat(&target)?;
        if meta.kind != EntryKind::Directory {
            return Err(ConsoleError::Command(format!("not a directory: {target}")));
        }
        ctx.cwd = target;
        Ok(0)
    }
    fn tab(&self, args: &[String], ctx: &Context) -> Option<Vec<String>> {
        match args {
            [_, partial] => Some(path_candidates(ctx, partial, true)),
            _ => Some(Vec::new()),
        }
    }
    fn tab_pretty(&self, candidate: &str) -> String {
        path_tail(candidate)
    }
    fn tab_final(&self, completed: bool, line: &mut LineBuffer, ctx: &Context) {
        if !completed {
            return;
        }
        let word = line.last_word();
        if ctx.vfs.is_dir(&resolve_path(&ctx.cwd, &word)) && line.backspace() {
            line.insert(b'/');
        }
    }
}

// ---------------------------------------------------------------------------
// pwd
// ---------------------------------------------------------------------------

struct PwdCmd;
impl Command for PwdCmd {
    fn name(&self) -> &str {
        "pwd"
    }
    fn description(&self) -> &str {
        "Print working directory"
    }
    fn usage(&self) -> &str {
        "pwd"
    }
    fn invoke(&self, _args: &[String], ctx: &mut Context) -> Result<i32> {
        ctx.out.println(&ctx.cwd)?;
        Ok(0)
    }
}

// ---------------------------------------------------------------------------
// ls
// ---------------------------------------------------------------------------

const LS_OPTS: &[OptionSpec] = &[OptionSpec::flag("-l", "long listing with sizes")];

struct LsCmd;
impl Command for LsCmd {
    fn name(&self) -> &str {
        "ls"
    }
    fn description(&self) -> &str {
        "List directory contents"
    }
    fn usage(&self) -> &str {
        "ls [-l] [path]"
    }
    fn invoke(&self, args: &[String], ctx: &mut Context) -> Result<i32> {
        let rest = &args[1..];
        let opts = optparse::parse(LS_OPTS, rest);
        let long = opts.flag("l");
        let path = match optparse::positionals(LS_OPTS, rest).first() {
            Some(p) => resolve_path(&ctx.cwd, p),
            None => ctx.cwd.clone(),
        };

        let meta = ctx.vfs.stat(&path)?;
        let entries = if meta.kind == EntryKind::Directory {
            ctx.vfs.readdir(&path)?
        } else {
            vec![console_vfs::VfsEntry {
                name: path_tail(&path),
                kind: meta.kind,
                size: meta.size,
            }]
        };

        for e in &entries {
            let line = match (long, e.kind) {
                (true, EntryKind::Directory) => format!("d {:>8} {}/", e.size, e.name),
                (true, EntryKind::File) => format!("- {:>8} {}", e.size, e.name),
                (false, EntryKind::Directory) => format!("{}/", e.name),
                (false, EntryKind::File) => e.name.clone(),
            };
            ctx.out.println(&line)?;
        }
        Ok(0)
    }
    fn tab(&self, args: &[String], ctx: &Context) -> Option<Vec<String>> {
        let partial = args.last().map_or("", String::as_str);
        if partial.starts_with('-') {
            return Some(LS_OPTS.iter().map(|o| o.opt.to_string()).collect());
        }
        Some(path_candidates(ctx, partial, false))
    }
    fn tab_pretty(&self, candidate: &str) -> String {
        path_tail(candidate)
    }
    fn help(&self, out: &crate::context::Output) -> Result<()> {
        out.println(&format!("usage: {}", self.usage()))?;
        optparse::print_usage(LS_OPTS, out)
    }
}

// ---------------------------------------------------------------------------
// cat
// ---------------------------------------------------------------------------

struct CatCmd;
impl Command for CatCmd {
    fn name(&self) -> &str {
        "cat"
    }
    fn description(&self) -> &str {
        "Print file contents"
    }
    fn usage(&self) -> &str {
        "cat <file>..."
    }
    fn invoke(&self, args: &[String], ctx: &mut Context) -> Result<i32> {
        if args.len() < 2 {
            return Err(ConsoleError::Usage(self.usage().to_string()));
        }
        for file in &args[1..] {
            let data = ctx.vfs.read(&resolve_path(&ctx.cwd, file))?;
            ctx.out.write_str(&String::from_utf8_lossy(&data))?;
        }
        Ok(0)
    }
    fn tab(&self, args: &[String], ctx: &Context) -> Option<Vec<String>> {
        let partial = args.last().map_or("", String::as_str);
        Some(path_candidates(ctx, partial, false))
    }
    fn tab_pretty(&self, candidate: &str) -> String {
        path_tail(candidate)
    }
}
