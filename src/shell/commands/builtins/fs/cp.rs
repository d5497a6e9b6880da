// Cp command

use crate::shell::commands::Command;
use crate::shell::context::ShellContext;
use anyhow::{Result, Context, anyhow, bail};
use std::fs;
use crate::shell::commands::builtins::common::{copy_dir_recursive, split_flags};

pub struct CpCommand;
impl Command for CpCommand {
    fn name(&self) -> &str {
        "cp"
    }

    fn help(&self) -> &str {
        "Copy files (-r for directories)"
    }

    fn execute(&self, args: &[String], ctx: &mut ShellContext<'_>) -> Result<()> {
        let (flags, mut paths) = split_flags(args);
        let recursive = flags
            .iter()
            .any(|f| matches!(f.as_str(), "-r" | "-R" | "--recursive"));

        if paths.len() < 2 {
            bail!("cp requires at least source and destination");
        }

        let dest_str = paths.pop().ok_or_else(|| anyhow!("Missing destination"))?;
        let sources = paths;

        let dest_path = ctx.resolve_path(dest_str);
        let dest_is_dir = dest_path.is_dir();

        if sources.len() > 1 && !dest_is_dir {
            bail!("Target '{}' is not a directory", dest_str);
        }

        for src_str in sources {
            let src_path = ctx.resolve_path(src_str);
            if !src_path.exists() {
                bail!("Source not found: {}", src_str);
            }

            let target = if dest_is_dir {
                dest_path.join(src_path.file_name().ok_or_else(|| anyhow!("Invalid source filename"))?)
            } else {
                dest_path.clone()
            };

            if src_path.is_dir() {
                if recursive {
                    copy_dir_recursive(&src_path, &target)?;
                } else {
                    bail!("Omitting directory '{}' (use -r to copy)", src_str);
                }
            } else {
                fs::copy(&src_path, &target).with_context(|| format!("Failed to copy {} to {}", src_str, target.display()))?;
            }
        }

        Ok(())
    }
}
