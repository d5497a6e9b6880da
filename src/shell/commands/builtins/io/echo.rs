// Echo command

use crate::shell::commands::Command;
use crate::shell::context::ShellContext;
use anyhow::Result;

pub struct EchoCommand;

impl Command for EchoCommand {
    fn name(&self) -> &str {
        "echo"
    }

    fn help(&self) -> &str {
        "Print arguments"
    }

    fn execute(&self, args: &[String], ctx: &mut ShellContext<'_>) -> Result<()> {
        writeln!(ctx.out, "{}", args.join(" "))?;
        Ok(())
    }
}
