use crate::shell::commands::Command;
use crate::shell::context::ShellContext;
use anyhow::Result;

/// Prints the alias table. Aliases come from the configuration file.
pub struct AliasCommand;

impl Command for AliasCommand {
    fn name(&self) -> &str {
        "alias"
    }

    fn help(&self) -> &str {
        "Show configured aliases"
    }

    fn execute(&self, _args: &[String], ctx: &mut ShellContext<'_>) -> Result<()> {
        let mut aliases: Vec<(&String, &String)> = ctx.session.aliases.iter().collect();
        if aliases.is_empty() {
            writeln!(ctx.out, "No aliases defined.")?;
            return Ok(());
        }

        aliases.sort();
        for (name, replacement) in aliases {
            writeln!(ctx.out, "{} = {}", name, replacement)?;
        }
        Ok(())
    }
}
