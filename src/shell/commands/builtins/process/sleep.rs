use crate::shell::cancel::CancelToken;
use crate::shell::commands::Command;
use crate::shell::context::ShellContext;
use anyhow::{Result, Context, bail};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use super::POLL_INTERVAL;

/// Blocks for a number of seconds; a signal cancels it early.
pub struct SleepCommand;

impl Command for SleepCommand {
    fn name(&self) -> &str {
        "sleep"
    }

    fn help(&self) -> &str {
        "Wait for the given number of seconds"
    }

    fn execute(&self, args: &[String], ctx: &mut ShellContext<'_>) -> Result<()> {
        let Some(arg) = args.first() else {
            bail!("Usage: sleep <seconds>");
        };
        let secs: f64 = arg.parse().with_context(|| format!("invalid duration: {}", arg))?;
        let duration = Duration::try_from_secs_f64(secs).with_context(|| format!("invalid duration: {}", arg))?;

        let token = CancelToken::new();
        let _active = ctx.session.cancel.activate(Arc::new(token.clone()));
        let deadline = Instant::now()
            .checked_add(duration)
            .with_context(|| format!("duration too long: {}", arg))?;

        loop {
            if token.is_cancelled() {
                bail!("interrupted");
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }
}
