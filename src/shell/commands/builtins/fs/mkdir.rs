// Mkdir command

use crate::shell::commands::Command;
use crate::shell::context::ShellContext;
use anyhow::{Result, Context, bail};
use std::fs;
use crate::shell::commands::builtins::common::split_flags;

pub struct MkdirCommand;
impl Command for MkdirCommand {
    fn name(&self) -> &str {
        "mkdir"
    }

    fn help(&self) -> &str {
        "Create directories (-p for parents)"
    }

    fn execute(&self, args: &[String], ctx: &mut ShellContext<'_>) -> Result<()> {
        let (flags, paths) = split_flags(args);
        // Other flags are ignored
        let parents = flags.iter().any(|f| f.as_str() == "-p");

        if paths.is_empty() {
            bail!("Usage: mkdir [-p] <dir>...");
        }

        for path_str in paths {
            let p = ctx.resolve_path(path_str);
            if parents {
                fs::create_dir_all(&p).with_context(|| format!("Failed to create directory (with parents): {}", path_str))?;
            } else {
                fs::create_dir(&p).with_context(|| format!("Failed to create directory: {}", path_str))?;
            }
        }
        Ok(())
    }
}
