// Exit command

use crate::shell::commands::Command;
use crate::shell::context::ShellContext;
use anyhow::Result;

/// Ends the session cooperatively; the loop exits after the current line.
pub struct ExitCommand;
impl Command for ExitCommand {
    fn name(&self) -> &str {
        "exit"
    }

    fn help(&self) -> &str {
        "Leave the shell"
    }

    fn execute(&self, _args: &[String], ctx: &mut ShellContext<'_>) -> Result<()> {
        writeln!(ctx.out, "Exiting {}...", ctx.session.name)?;
        ctx.stop();
        Ok(())
    }
}
