use crate::shell::commands::Command;
use crate::shell::context::ShellContext;
use anyhow::Result;
use colored::*;

pub struct HelpCommand;

impl Command for HelpCommand {
    fn name(&self) -> &str {
        "help"
    }

    fn help(&self) -> &str {
        "List available commands"
    }

    fn execute(&self, _args: &[String], ctx: &mut ShellContext<'_>) -> Result<()> {
        let names = ctx.registry.command_list();
        let max_len = names.iter().map(String::len).max().unwrap_or(0);

        writeln!(ctx.out, "{}", "Available commands:".bold().underline())?;
        for name in names {
            let description = ctx.registry.get(&name).map(|c| c.help()).unwrap_or_default();
            let padding = " ".repeat(max_len - name.len() + 2);
            writeln!(ctx.out, "  {}{}{}", name.cyan(), padding, description.italic())?;
        }
        Ok(())
    }
}
