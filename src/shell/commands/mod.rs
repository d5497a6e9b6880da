pub mod builtins;

use crate::shell::context::ShellContext;
use anyhow::Result;

/// A named command the shell can dispatch to.
///
/// `args` never include the command name itself.
pub trait Command: Send + Sync {
    fn name(&self) -> &str;

    /// One-line description shown by `help`.
    fn help(&self) -> &str {
        "(no help)"
    }

    fn execute(&self, args: &[String], ctx: &mut ShellContext<'_>) -> Result<()>;
}
