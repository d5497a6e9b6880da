use crate::shell::commands::Command;
use crate::shell::context::ShellContext;
use anyhow::Result;

pub struct ClearCommand;

impl Command for ClearCommand {
    fn name(&self) -> &str {
        "clear"
    }

    fn help(&self) -> &str {
        "Clear the screen"
    }

    fn execute(&self, _args: &[String], ctx: &mut ShellContext<'_>) -> Result<()> {
        write!(ctx.out, "\x1b[2J\x1b[H")?;
        ctx.out.flush()?;
        Ok(())
    }
}
