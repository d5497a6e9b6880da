// Cd command

use crate::shell::commands::Command;
use crate::shell::context::ShellContext;
use anyhow::{Result, bail};

pub struct CdCommand;
impl Command for CdCommand {
    fn name(&self) -> &str {
        "cd"
    }

    fn help(&self) -> &str {
        "Change the working directory"
    }

    fn execute(&self, args: &[String], ctx: &mut ShellContext<'_>) -> Result<()> {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/".to_string());
        let path_str = args.first().map(String::as_str).unwrap_or(&home);

        let new_path = ctx.resolve_path(path_str);
        if !new_path.is_dir() {
            bail!("no such file or directory: {}", path_str);
        }

        // Canonicalize to remove .. and .
        ctx.session.cwd = new_path.canonicalize().unwrap_or(new_path);
        Ok(())
    }
}
