//! System commands: run, md5sum, sha256sum, perf, test.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use console_platform::{TestOutcome, TraceService};
use console_types::error::{ConsoleError, Result};
use console_vfs::resolve_path;

use crate::commands::missing_service;
use crate::context::{Context, Output};
use crate::file_commands::{path_candidates, path_tail};
use crate::optparse::{self, OptionSpec};
use crate::registry::{Command, Registry};

pub fn register_system_commands(reg: &mut Registry) {
    reg.register(Box::new(RunCmd));
    reg.register(Box::new(MD5SUM));
    reg.register(Box::new(SHA256SUM));
    reg.register(Box::new(PerfCmd::new(Duration::from_secs(1))));
    reg.register(Box::new(TestCmd));
}

fn path_tab(args: &[String], ctx: &Context) -> Option<Vec<String>> {
    let partial = args.last().map_or("", String::as_str);
    Some(path_candidates(ctx, partial, false))
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

struct RunCmd;
impl Command for RunCmd {
    fn name(&self) -> &str {
        "run"
    }
    fn description(&self) -> &str {
        "Run a program image and wait for it"
    }
    fn usage(&self) -> &str {
        "run <path> [args...]"
    }
    fn invoke(&self, args: &[String], ctx: &mut Context) -> Result<i32> {
        let Some(path) = args.get(1) else {
            return Err(ConsoleError::Usage(self.usage().to_string()));
        };
        let process = ctx
            .process
            .as_ref()
            .ok_or_else(|| missing_service("process"))?;
        let path = resolve_path(&ctx.cwd, path);
        let mut argv = vec![path_tail(&path)];
        argv.extend_from_slice(&args[2..]);
        let code = process.execute(&path, &argv)?;
        log::debug!("{path} exited with {code}");
        Ok(code)
    }
    fn tab(&self, args: &[String], ctx: &Context) -> Option<Vec<String>> {
        match args.len() {
            2 => path_tab(args, ctx),
            _ => Some(Vec::new()),
        }
    }
    fn tab_pretty(&self, candidate: &str) -> String {
        path_tail(candidate)
    }
}

// ---------------------------------------------------------------------------
// md5sum, sha256sum
// ---------------------------------------------------------------------------

/// `<algorithm>sum`: print one digest line per file.
struct DigestCmd {
    name: &'static str,
    algorithm: &'static str,
    usage: &'static str,
}

const MD5SUM: DigestCmd = DigestCmd {
    name: "md5sum",
    algorithm: "md5",
    usage: "md5sum <file>...",
};

const SHA256SUM: DigestCmd = DigestCmd {
    name: "sha256sum",
    algorithm: "sha256",
    usage: "sha256sum <file>...",
};

impl Command for DigestCmd {
    fn name(&self) -> &str {
        self.name
    }
    fn description(&self) -> &str {
        "Print file digests"
    }
    fn usage(&self) -> &str {
        self.usage
    }
    fn invoke(&self, args: &[String], ctx: &mut Context) -> Result<i32> {
        if args.len() < 2 {
            return Err(ConsoleError::Usage(self.usage.to_string()));
        }
        let hash = ctx
            .hasher(self.algorithm)
            .ok_or_else(|| missing_service(self.algorithm))?;
        let mut status = 0;
        for file in &args[1..] {
            match ctx.vfs.read(&resolve_path(&ctx.cwd, file)) {
                Ok(data) => ctx
                    .out
                    .println(&format!("{}  {file}", hash.digest(&data)))?,
                Err(e) => {
                    ctx.out.println(&format!("{}: {file}: {e}", self.name))?;
                    status = 1;
                },
            }
        }
        Ok(status)
    }
    fn tab(&self, args: &[String], ctx: &Context) -> Option<Vec<String>> {
        path_tab(args, ctx)
    }
    fn tab_pretty(&self, candidate: &str) -> String {
        path_tail(candidate)
    }
}

// ---------------------------------------------------------------------------
// perf
// ---------------------------------------------------------------------------

const PERF_SUBCOMMANDS: &[(&str, &str)] = &[
    ("list", "list"),
    ("stat", "stat [-n <count>] [[tag=]tracepoint]..."),
    ("callstack", "callstack <tracepoint>"),
];

const STAT_OPTS: &[OptionSpec] = &[OptionSpec::store(
    "-n",
    Some("count"),
    "stop after this many samples",
)];

/// Rows printed between repeated column titles.
const TITLE_EVERY: u64 = 25;

struct StatColumn {
    tag: String,
    tracepoint: String,
    width: usize,
    last: u64,
}

/// Tracepoint inspection. `stat` samples every `interval`.
pub(crate) struct PerfCmd {
    interval: Duration,
}

impl PerfCmd {
    pub(crate) fn new(interval: Duration) -> Self {
        Self { interval }
    }

    fn list(&self, trace: &dyn TraceService, out: &Output) -> Result<i32> {
        out.println("available tracepoints:\n")?;
        for tp in trace.tracepoints()? {
            out.println(&format!("    {tp}"))?;
        }
        Ok(0)
    }

    fn stat(&self, trace: &dyn TraceService, args: &[String], out: &Output) -> Result<i32> {
        let opts = optparse::parse(STAT_OPTS, args);
        if let Some(err) = &opts.err {
            out.println(&format!("perf stat: {err}"))?;
            return Ok(1);
        }
        let samples = opts
            .value("n")
            .map(|n| {
                n.parse::<u64>()
                    .ok()
                    .filter(|&n| n > 0)
                    .ok_or_else(|| ConsoleError::Command(format!("bad count: {n}")))
            })
            .transpose()?;

        let mut columns = Vec::new();
        for spec in optparse::positionals(STAT_OPTS, args) {
            let (tag, tracepoint) = spec
                .split_once('=')
                .unwrap_or((spec.as_str(), spec.as_str()));
            if trace.read_counter(tracepoint).is_err() {
                out.println(&format!("bad tracepoint \"{tracepoint}\""))?;
                return Ok(1);
            }
            columns.push(StatColumn {
                tag: tag.to_string(),
                tracepoint: tracepoint.to_string(),
                width: (tag.len() + 2).max(8),
                last: 0,
            });
        }
        if columns.is_empty() {
            out.println(&format!("usage: perf {}", PERF_SUBCOMMANDS[1].1))?;
            return Ok(1);
        }

        let mut row = 0u64;
        loop {
            if row % TITLE_EVERY == 0 {
                let titles: String = columns
                    .iter()
                    .map(|c| format!("{:>w$}", c.tag, w = c.width))
                    .collect();
                out.println(&titles)?;
            }
            let mut line = String::new();
            for c in &mut columns {
                let now = trace.read_counter(&c.tracepoint)?;
                let delta = now.wrapping_sub(c.last);
                c.last = now;
                line.push_str(&format!("{delta:>w$}", w = c.width));
            }
            out.println(&line)?;
            out.flush()?;
            row += 1;
            if samples.is_some_and(|n| row >= n) {
                return Ok(0);
            }
            thread::sleep(self.interval);
        }
    }

    fn callstack(&self, trace: &dyn TraceService, tracepoint: &str, out: &Output) -> Result<i32> {
        let Ok(traces) = trace.callstacks(tracepoint, 10, 20) else {
            out.println(&format!("bad tracepoint \"{tracepoint}\""))?;
            return Ok(1);
        };
        out.println(&format!("{:>10}  {}", "freq", "callstack"))?;
        for t in traces {
            let mut line = format!("{:>10} ", t.hits);
            for pc in &t.program_counters {
                line.push_str(&format!(" 0x{pc:x}"));
            }
            out.println(&line)?;
        }
        Ok(0)
    }
}

impl Command for PerfCmd {
    fn name(&self) -> &str {
        "perf"
    }
    fn description(&self) -> &str {
        "Inspect tracepoints and their counters"
    }
    fn usage(&self) -> &str {
        "perf list|stat|callstack ..."
    }
    fn invoke(&self, args: &[String], ctx: &mut Context) -> Result<i32> {
        let trace: Arc<dyn TraceService> = ctx
            .trace
            .as_ref()
            .map(Arc::clone)
            .ok_or_else(|| missing_service("trace"))?;
        match args.get(1).map(String::as_str) {
            Some("list") => self.list(trace.as_ref(), &ctx.out),
            Some("stat") => self.stat(trace.as_ref(), &args[2..], &ctx.out),
            Some("callstack") => match args.get(2) {
                Some(tp) => self.callstack(trace.as_ref(), tp, &ctx.out),
                None => {
                    ctx.out.println(&format!("usage: perf {}", PERF_SUBCOMMANDS[2].1))?;
                    Ok(1)
                },
            },
            _ => {
                self.help(&ctx.out)?;
                Ok(1)
            },
        }
    }
    fn tab(&self, args: &[String], ctx: &Context) -> Option<Vec<String>> {
        if args.len() == 2 {
            return Some(PERF_SUBCOMMANDS.iter().map(|(n, _)| n.to_string()).collect());
        }
        let tracepoints = || {
            ctx.trace
                .as_ref()
                .and_then(|t| t.tracepoints().ok())
                .unwrap_or_default()
        };
        match args[1].as_str() {
            "stat" => Some(tracepoints()),
            "callstack" if args.len() == 3 => Some(tracepoints()),
            _ => Some(Vec::new()),
        }
    }
    fn help(&self, out: &Output) -> Result<()> {
        out.println("usage:\n")?;
        for (_, usage) in PERF_SUBCOMMANDS {
            out.println(&format!("  perf {usage}"))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// test
// ---------------------------------------------------------------------------

struct TestCmd;
impl Command for TestCmd {
    fn name(&self) -> &str {
        "test"
    }
    fn description(&self) -> &str {
        "List or run named tests"
    }
    fn usage(&self) -> &str {
        "test list|<name>..."
    }
    fn invoke(&self, args: &[String], ctx: &mut Context) -> Result<i32> {
        let tests = ctx.tests.as_ref().ok_or_else(|| missing_service("test"))?;
        match args.get(1).map(String::as_str) {
            None => Err(ConsoleError::Usage(self.usage().to_string())),
            Some("list") => {
                for name in tests.test_names()? {
                    ctx.out.println(&name)?;
                }
                Ok(0)
            },
            Some(_) => {
                let mut failed = 0;
                for name in &args[1..] {
                    match tests.run_test(name)? {
                        TestOutcome::Passed => ctx.out.println(&format!("{name}: PASS"))?,
                        TestOutcome::Failed(reason) => {
                            failed += 1;
                            ctx.out.println(&format!("{name}: FAIL ({reason})"))?;
                        },
                    }
                }
                Ok(failed)
            },
        }
    }
    fn tab(&self, args: &[String], ctx: &Context) -> Option<Vec<String>> {
        let mut names = ctx
            .tests
            .as_ref()
            .and_then(|t| t.test_names().ok())
            .unwrap_or_default();
        if args.len() == 2 {
            names.insert(0, "list".to_string());
        }
        Some(names)
    }
}
