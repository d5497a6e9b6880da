use crate::shell::commands::Command;
use crate::shell::context::ShellContext;
use anyhow::Result;

pub struct HistoryCommand;

impl Command for HistoryCommand {
    fn name(&self) -> &str {
        "history"
    }

    fn help(&self) -> &str {
        "Show previously entered lines"
    }

    fn execute(&self, _args: &[String], ctx: &mut ShellContext<'_>) -> Result<()> {
        if ctx.session.history.is_empty() {
            writeln!(ctx.out, "No history yet.")?;
            return Ok(());
        }
        let width = ctx.session.history.len().to_string().len();
        for (i, line) in ctx.session.history.iter().enumerate() {
            writeln!(ctx.out, "{:>width$}  {}", i + 1, line, width = width)?;
        }
        Ok(())
    }
}
