// Rm command

use crate::shell::commands::Command;
use crate::shell::context::ShellContext;
use anyhow::{Result, Context, bail};
use std::fs;
use crate::shell::commands::builtins::common::{expand_paths, split_flags};

pub struct RmCommand;
impl Command for RmCommand {
    fn name(&self) -> &str {
        "rm"
    }

    fn help(&self) -> &str {
        "Remove files (-r for directories, -f to ignore missing)"
    }

    fn execute(&self, args: &[String], ctx: &mut ShellContext<'_>) -> Result<()> {
        let (flags, operands) = split_flags(args);
        let recursive = flags.iter().any(|f| f.contains('r') || f.contains('R'));
        let force = flags.iter().any(|f| f.contains('f'));

        if operands.is_empty() {
            bail!("Usage: rm [-r] [-f] <path>...");
        }

        for (label, p) in expand_paths(ctx, &operands) {
            if !p.exists() {
                if !force {
                    bail!("File not found: {}", label);
                }
                continue;
            }

            if p.is_dir() {
                if recursive {
                    fs::remove_dir_all(&p).with_context(|| format!("Failed to remove directory: {}", label))?;
                } else {
                    bail!("Cannot remove directory '{}' without -r", label);
                }
            } else {
                fs::remove_file(&p).with_context(|| format!("Failed to remove file: {}", label))?;
            }
        }
        Ok(())
    }
}
