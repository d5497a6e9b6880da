// Ls command

use std::fs;
use crate::shell::commands::Command;
use crate::shell::context::ShellContext;
use anyhow::{Result, Context};
use crate::shell::commands::builtins::common::expand_paths;

pub struct LsCommand;
impl Command for LsCommand {
    fn name(&self) -> &str {
        "ls"
    }

    fn help(&self) -> &str {
        "List directory contents"
    }

    fn execute(&self, args: &[String], ctx: &mut ShellContext<'_>) -> Result<()> {
        let dot = ".".to_string();
        let operands: Vec<&String> = if args.is_empty() { vec![&dot] } else { args.iter().collect() };
        let targets = expand_paths(ctx, &operands);
        let show_headers = targets.len() > 1;

        for (i, (label, path)) in targets.iter().enumerate() {
            if !path.is_dir() {
                if !path.exists() {
                    anyhow::bail!("cannot access '{}': No such file or directory", label);
                }
                writeln!(ctx.out, "{}", label)?;
                continue;
            }

            let mut names = Vec::new();
            for entry in fs::read_dir(path).with_context(|| format!("Failed to read directory: {}", label))? {
                let entry = entry?;
                let mut name = entry.file_name().to_string_lossy().into_owned();
                if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                    name.push('/');
                }
                names.push(name);
            }
            // Sort for consistent output
            names.sort();

            if show_headers {
                if i > 0 {
                    writeln!(ctx.out)?;
                }
                writeln!(ctx.out, "{}:", label)?;
            }
            for name in names {
                writeln!(ctx.out, "{}", name)?;
            }
        }

        Ok(())
    }
}
