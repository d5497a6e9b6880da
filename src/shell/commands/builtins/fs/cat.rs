// Cat command

use crate::shell::commands::Command;
use crate::shell::context::ShellContext;
use anyhow::{Result, Context, bail};
use std::fs::File;
use std::io::{self, BufReader};
use crate::shell::commands::builtins::common::expand_paths;

pub struct CatCommand;
impl Command for CatCommand {
    fn name(&self) -> &str {
        "cat"
    }

    fn help(&self) -> &str {
        "Print file contents"
    }

    fn execute(&self, args: &[String], ctx: &mut ShellContext<'_>) -> Result<()> {
        if args.is_empty() {
            bail!("Usage: cat <file1> <file2> ...");
        }

        let operands: Vec<&String> = args.iter().collect();
        for (label, path) in expand_paths(ctx, &operands) {
            let file = File::open(&path).with_context(|| format!("Failed to open file: {}", label))?;
            let mut reader = BufReader::new(file);
            io::copy(&mut reader, &mut *ctx.out).with_context(|| format!("Failed to read file: {}", label))?;
        }
        ctx.out.flush()?;

        Ok(())
    }
}
