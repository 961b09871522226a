//! Prefix completion for the line being edited.

use console_types::error::Result;

use crate::context::Context;
use crate::dispatch::tokenize;
use crate::line::LineBuffer;
use crate::registry::{Command, DEFAULT_TAB_DELIM};

/// Apply the candidates matching `partial` to the line.
///
/// A single match replaces the word under the cursor and reports `true`.
/// Several matches are listed on their own line, joined by the command's
/// delimiter, and leave the buffer alone. No match rings the bell. The
/// command (if any) is told the outcome through `tab_final`.
pub fn suggest(
    candidates: &[String],
    partial: &str,
    command: Option<(&dyn Command, &str)>,
    line: &mut LineBuffer,
    ctx: &Context,
) -> Result<bool> {
    let matches: Vec<&String> = candidates
        .iter()
        .filter(|c| c.starts_with(partial))
        .collect();

    let completed = match matches.as_slice() {
        [] => {
            ctx.out.beep()?;
            false
        },
        [only] => {
            if line.replace_last_word(only) {
                true
            } else {
                ctx.out.beep()?;
                false
            }
        },
        many => {
            let delim = command.map_or(DEFAULT_TAB_DELIM, |(_, d)| d);
            let shown: Vec<String> = many
                .iter()
                .map(|c| match command {
                    Some((cmd, _)) => cmd.tab_pretty(c),
                    None => (*c).clone(),
                })
                .collect();
            ctx.out.write_str(&format!("\r\n{}\r\n", shown.join(delim)))?;
            false
        },
    };

    if let Some((cmd, _)) = command {
        cmd.tab_final(completed, line, ctx);
    }
    Ok(completed)
}

/// Complete the word under the cursor.
///
/// The first word completes against command names. Later words are offered
/// to the named command's `tab`; a command without one gets the bell.
pub fn complete(line: &mut LineBuffer, ctx: &Context) -> Result<()> {
    let mut tokens = tokenize(&line.text());
    let boundary = line.completed_word_boundary();
    let registry = &ctx.registry;

    match tokens.as_slice() {
        [] => {
            suggest(&registry.names(), "", None, line, ctx)?;
            return Ok(());
        },
        [first] if !boundary => {
            let first = first.clone();
            suggest(&registry.names(), &first, None, line, ctx)?;
            return Ok(());
        },
        _ => {},
    }

    let name = tokens[0].clone();
    let Some(command) = registry.get(&name) else {
        return ctx.out.beep();
    };
    if boundary {
        tokens.push(String::new());
    }
    let Some(candidates) = command.tab(&tokens, ctx) else {
        return ctx.out.beep();
    };
    let partial = tokens.last().map_or("", String::as_str);
    suggest(
        &candidates,
        partial,
        Some((command, registry.delim(&name))),
        line,
        ctx,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::registry::Registry;
    use crate::testutil::context;

    struct Plain(&'static str);
    impl Command for Plain {
        fn name(&self) -> &str {
            self.0
        }
        fn description(&self) -> &str {
            ""
        }
        fn usage(&self) -> &str {
            self.0
        }
        fn invoke(&self, _args: &[String], _ctx: &mut Context) -> Result<i32> {
            Ok(0)
        }
    }

    /// Completes subcommands with its own display form and delimiter.
    struct Sub {
        finals: Arc<Mutex<Vec<bool>>>,
    }
    impl Command for Sub {
        fn name(&self) -> &str {
            "perf"
        }
        fn description(&self) -> &str {
            ""
        }
        fn usage(&self) -> &str {
            "perf"
        }
        fn invoke(&self, _args: &[String], _ctx: &mut Context) -> Result<i32> {
            Ok(0)
        }
        fn tab(&self, args: &[String], _ctx: &Context) -> Option<Vec<String>> {
            match args.len() {
                2 => Some(vec!["list".into(), "stat".into(), "start".into()]),
                _ => Some(Vec::new()),
            }
        }
        fn tab_pretty(&self, candidate: &str) -> String {
            format!("<{candidate}>")
        }
        fn tab_delim(&self) -> Option<&str> {
            Some(", ")
        }
        fn tab_final(&self, completed: bool, _line: &mut LineBuffer, _ctx: &Context) {
            self.finals.lock().unwrap().push(completed);
        }
    }

    fn setup_with_finals() -> (Context, crate::context::Captured, Arc<Mutex<Vec<bool>>>) {
        let finals = Arc::new(Mutex::new(Vec::new()));
        let mut reg = Registry::new();
        reg.register(Box::new(Plain("ls")));
        reg.register(Box::new(Plain("cat")));
        reg.register(Box::new(Plain("cd")));
        reg.register(Box::new(Sub {
            finals: Arc::clone(&finals),
        }));
        let (ctx, captured) = context(reg);
        (ctx, captured, finals)
    }

    fn setup() -> (Context, crate::context::Captured) {
        let (ctx, captured, _) = setup_with_finals();
        (ctx, captured)
    }

    fn typed(text: &str) -> LineBuffer {
        let mut line = LineBuffer::new(80);
        for b in text.bytes() {
            line.insert(b);
        }
        line
    }

    #[test]
    fn unique_command_completion_appends_space() {
        let (ctx, captured) = setup();
        let mut line = typed("l");
        complete(&mut line, &ctx).unwrap();
        assert_eq!(line.text(), "ls ");
        assert_eq!(captured.contents(), "");
    }

    #[test]
    fn multiple_commands_listed_in_registration_order() {
        let (ctx, captured) = setup();
        let mut line = typed("c");
        complete(&mut line, &ctx).unwrap();
        assert_eq!(line.text(), "c");
        assert_eq!(captured.contents(), "\r\ncat\tcd\r\n");
    }

    #[test]
    fn empty_line_lists_every_command() {
        let (ctx, captured) = setup();
        let mut line = LineBuffer::new(80);
        complete(&mut line, &ctx).unwrap();
        assert_eq!(captured.contents(), "\r\nls\tcat\tcd\tperf\r\n");
        assert_eq!(line.cursor(), 0);
    }

    #[test]
    fn no_match_beeps() {
        let (ctx, captured) = setup();
        let mut line = typed("zz");
        complete(&mut line, &ctx).unwrap();
        assert_eq!(line.text(), "zz");
        assert_eq!(captured.contents(), "\x07");
    }

    #[test]
    fn command_without_tab_beeps() {
        let (ctx, captured) = setup();
        let mut line = typed("cat ");
        complete(&mut line, &ctx).unwrap();
        assert_eq!(captured.contents(), "\x07");
        assert_eq!(line.text(), "cat ");
    }

    #[test]
    fn unknown_command_arguments_beep() {
        let (ctx, captured) = setup();
        let mut line = typed("frob x");
        complete(&mut line, &ctx).unwrap();
        assert_eq!(captured.contents(), "\x07");
    }

    #[test]
    fn argument_completion_after_boundary_lists_pretty_with_delim() {
        let (ctx, captured) = setup();
        let mut line = typed("perf ");
        complete(&mut line, &ctx).unwrap();
        assert_eq!(line.text(), "perf ");
        assert_eq!(captured.contents(), "\r\n<list>, <stat>, <start>\r\n");
    }

    #[test]
    fn argument_completion_unique() {
        let (ctx, _captured) = setup();
        let mut line = typed("perf l");
        complete(&mut line, &ctx).unwrap();
        assert_eq!(line.text(), "perf list ");
    }

    #[test]
    fn argument_completion_partial_prefix() {
        let (ctx, captured) = setup();
        let mut line = typed("perf st");
        complete(&mut line, &ctx).unwrap();
        assert_eq!(line.text(), "perf st");
        assert_eq!(captured.contents(), "\r\n<stat>, <start>\r\n");
    }

    #[test]
    fn tab_final_reports_outcome() {
        let (ctx, _captured, finals) = setup_with_finals();
        complete(&mut typed("perf l"), &ctx).unwrap();
        complete(&mut typed("perf x"), &ctx).unwrap();
        complete(&mut typed("perf st"), &ctx).unwrap();
        // Top-level completion never reaches the command.
        complete(&mut typed("pe"), &ctx).unwrap();
        assert_eq!(*finals.lock().unwrap(), vec![true, false, false]);
    }

    #[test]
    fn suggest_without_command() {
        let (ctx, captured) = setup();
        let mut line = typed("x");
        let cands = vec!["xa".to_string(), "xb".to_string(), "y".to_string()];
        assert!(!suggest(&cands, "x", None, &mut line, &ctx).unwrap());
        assert_eq!(captured.contents(), "\r\nxa\txb\r\n");
        assert!(suggest(&cands, "y", None, &mut typed("y"), &ctx).unwrap());
    }

    #[test]
    fn unique_match_that_does_not_fit_beeps() {
        let (ctx, captured) = setup();
        let mut line = LineBuffer::new(3);
        line.insert(b'l');
        let cands = vec!["long".to_string()];
        assert!(!suggest(&cands, "l", None, &mut line, &ctx).unwrap());
        assert_eq!(line.text(), "l");
        assert_eq!(captured.contents(), "\x07");
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn unique_completion_appends_exactly_one_space(word in "[a-z]{1,10}", cut in 0usize..10) {
                let (ctx, _captured) = setup();
                let cut = cut.min(word.len());
                let mut line = typed(&format!("x {}", &word[..cut]));
                let cands = vec![word.clone()];
                prop_assert!(suggest(&cands, &word[..cut], None, &mut line, &ctx).unwrap());
                prop_assert_eq!(line.text(), format!("x {word} "));
            }

            #[test]
            fn multiple_matches_leave_buffer_unchanged(
                words in proptest::collection::btree_set("a[a-z]{0,6}", 2..6),
            ) {
                let (ctx, captured) = setup();
                let cands: Vec<String> = words.into_iter().collect();
                let mut line = typed("x a");
                let before = line.clone();
                prop_assert!(!suggest(&cands, "a", None, &mut line, &ctx).unwrap());
                prop_assert_eq!(line, before);
                prop_assert_eq!(captured.contents(), format!("\r\n{}\r\n", cands.join("\t")));
            }
        }
    }
}
