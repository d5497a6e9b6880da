// Mv command

use crate::shell::commands::Command;
use crate::shell::context::ShellContext;
use anyhow::{Result, Context, anyhow, bail};
use std::fs;

pub struct MvCommand;
impl Command for MvCommand {
    fn name(&self) -> &str {
        "mv"
    }

    fn help(&self) -> &str {
        "Move or rename files"
    }

    fn execute(&self, args: &[String], ctx: &mut ShellContext<'_>) -> Result<()> {
        let Some((dest, sources)) = args.split_last() else {
            bail!("Usage: mv <source1> <source2> ... <destination>");
        };
        if sources.is_empty() {
            bail!("Usage: mv <source1> <source2> ... <destination>");
        }

        let dest_path = ctx.resolve_path(dest);
        let dest_is_dir = dest_path.is_dir();

        if sources.len() > 1 && !dest_is_dir {
            bail!("Target '{}' is not a directory", dest);
        }

        for src in sources {
            let src_path = ctx.resolve_path(src);
            if !src_path.exists() {
                bail!("Source not found: {}", src);
            }

            let target = if dest_is_dir {
                dest_path.join(src_path.file_name().ok_or_else(|| anyhow!("Invalid source filename"))?)
            } else {
                dest_path.clone()
            };

            fs::rename(&src_path, &target).with_context(|| format!("Failed to move {} to {}", src, target.display()))?;
        }

        Ok(())
    }
}
