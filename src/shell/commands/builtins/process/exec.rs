// Exec command
use crate::shell::cancel::CancelToken;
use crate::shell::commands::Command;
use crate::shell::context::ShellContext;
use anyhow::{Result, Context, bail};
use log::{debug, warn};
use std::process::{Command as Process, Stdio};
use std::sync::Arc;
use wait_timeout::ChildExt;
use super::POLL_INTERVAL;

/// Runs an external program in the session working directory.
///
/// The child inherits the terminal. While it runs, the shell's cancellation
/// slot holds a token; cancelling it kills the child.
pub struct ExecCommand;

impl Command for ExecCommand {
    fn name(&self) -> &str {
        "exec"
    }

    fn help(&self) -> &str {
        "Run an external program"
    }

    fn execute(&self, args: &[String], ctx: &mut ShellContext<'_>) -> Result<()> {
        let Some((program, program_args)) = args.split_first() else {
            bail!("Usage: exec <program> [args...]");
        };

        let path = which::which_in(program, std::env::var_os("PATH"), &ctx.session.cwd)
            .with_context(|| format!("{}: command not found", program))?;
        debug!("exec: {} {:?}", path.display(), program_args);

        ctx.out.flush()?;
        let mut child = Process::new(&path)
            .args(program_args)
            .current_dir(&ctx.session.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("Failed to execute command: {}", program))?;

        let token = CancelToken::new();
        let _active = ctx.session.cancel.activate(Arc::new(token.clone()));

        let status = loop {
            if token.is_cancelled() {
                if let Err(e) = child.kill() {
                    warn!("Failed to kill '{}': {}", program, e);
                }
                child.wait()?;
                bail!("{} interrupted", program);
            }
            if let Some(status) = child.wait_timeout(POLL_INTERVAL)? {
                break status;
            }
        };

        if !status.success() {
            bail!("{} exited with {}", program, status);
        }
        Ok(())
    }
}
