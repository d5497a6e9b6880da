use crate::shell::commands::Command;
use crate::shell::context::ShellContext;
use anyhow::Result;

pub struct PwdCommand;
impl Command for PwdCommand {
    fn name(&self) -> &str {
        "pwd"
    }

    fn help(&self) -> &str {
        "Print the working directory"
    }

    fn execute(&self, _args: &[String], ctx: &mut ShellContext<'_>) -> Result<()> {
        writeln!(ctx.out, "{}", ctx.session.cwd.display())?;
        Ok(())
    }
}
