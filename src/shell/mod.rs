pub mod cancel;
pub mod commands;
pub mod context;
pub mod editor;
pub mod history;
pub mod parser;
pub mod registry;
pub mod terminal;

use std::io::{BufRead, BufReader, ErrorKind, Read, Write};
use std::panic::{self, AssertUnwindSafe};
use anyhow::{Context, Result};
use colored::*;
use log::{debug, info, warn};
use cancel::{CancelSlot, StopHandle};
use commands::builtins::env::exit::ExitCommand;
use context::{Session, ShellContext};
use editor::{EditSession, LineEditor, ReadOutcome};
use parser::{apply_aliases, split_commands, tokenize};
use registry::CommandRegistry;
use terminal::{CookedScope, Terminal};

#[cfg(test)]
mod tests;

/// Default prompt template; `{name}` and `{cwd}` are substituted on every cycle.
pub const DEFAULT_PROMPT: &str = "{name} | {cwd}> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    Initializing,
    Running,
    Stopped,
}

/// The read-edit-dispatch loop and everything it owns.
pub struct Shell<T: Terminal, R: Read, W: Write> {
    registry: CommandRegistry,
    session: Session,
    terminal: T,
    input: R,
    out: W,
    editor: LineEditor,
    prompt: String,
    started: bool,
}

impl<T: Terminal, R: Read, W: Write> Shell<T, R, W> {
    pub fn new(registry: CommandRegistry, session: Session, terminal: T, input: R, out: W) -> Self {
        Self {
            registry,
            session,
            terminal,
            input,
            out,
            editor: LineEditor::new(),
            prompt: DEFAULT_PROMPT.to_string(),
            started: false,
        }
    }

    pub fn with_prompt(mut self, template: &str) -> Self {
        self.prompt = template.to_string();
        self
    }

    pub fn state(&self) -> ShellState {
        if self.session.stop.is_stopped() {
            ShellState::Stopped
        } else if self.started {
            ShellState::Running
        } else {
            ShellState::Initializing
        }
    }

    /// Cooperative stop. Takes effect at the next check of the loop; an
    /// in-progress command is not interrupted.
    pub fn stop(&self) {
        self.session.stop.stop();
    }

    /// Handle for stopping the shell from another context (signal handler).
    pub fn stop_handle(&self) -> StopHandle {
        self.session.stop.clone()
    }

    /// Slot through which the signal path cancels the active command.
    pub fn cancel_slot(&self) -> CancelSlot {
        self.session.cancel.clone()
    }

    #[cfg(test)]
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn render_prompt(&self) -> String {
        let cwd = self.session.cwd.display().to_string();
        self.prompt
            .replace("{name}", &self.session.name)
            .replace("{cwd}", &cwd)
            .green()
            .bold()
            .to_string()
    }

    fn start(&mut self) {
        if !self.registry.contains("exit") {
            self.registry.register_command(Box::new(ExitCommand));
        }
        self.started = true;
        debug!("shell state: {:?}", self.state());
        info!("{} started with {} commands", self.session.name, self.registry.len());
    }

    /// Interactive session: raw mode on, loop until stopped, raw mode off.
    pub fn run(&mut self) -> Result<()> {
        self.start();
        self.terminal.enable_raw_mode().context("Failed to enter raw mode")?;

        let result = self.main_loop();
        let restored = self.terminal.disable_raw_mode();
        self.stop();
        debug!("shell state: {:?}", self.state());
        result?;
        restored?;
        info!("{} stopped", self.session.name);
        Ok(())
    }

    fn main_loop(&mut self) -> Result<()> {
        while !self.session.stop.is_stopped() {
            let prompt = self.render_prompt();
            let candidates = self.registry.command_list();
            let mut edit = EditSession {
                prompt: &prompt,
                history: &mut self.session.history,
                candidates: &candidates,
                stop: &self.session.stop,
            };

            let line = match self.editor.read_line(&mut self.input, &mut self.out, &mut edit)? {
                ReadOutcome::Line(line) => line,
                ReadOutcome::Stopped => break,
            };

            self.execute_line(&line)?;
            self.session.history.push(&line);
        }
        Ok(())
    }

    /// Non-interactive session: one line per newline from `input`, cooked throughout.
    pub fn run_script(&mut self) -> Result<()> {
        self.start();
        let mut reader = BufReader::new(&mut self.input);
        let mut line = String::new();

        while !self.session.stop.is_stopped() {
            // A timed-out read keeps what it got so far in `line`.
            let read = match reader.read_line(&mut line) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::WouldBlock => continue,
                Err(e) => return Err(e).context("Failed to read input"),
            };
            if read == 0 && line.is_empty() {
                break;
            }
            let submitted = line.trim_end_matches(['\r', '\n']);
            dispatch(
                &self.registry,
                &mut self.session,
                &mut self.terminal,
                &mut self.out,
                submitted,
            )?;
            self.session.history.push(submitted);
            line.clear();
        }
        self.stop();
        info!("{} finished input", self.session.name);
        Ok(())
    }

    /// Alias expansion, `;` split and dispatch of one submitted line.
    ///
    /// Unknown commands and command failures are reported to the output and
    /// never returned; only a terminal-mode failure is an error here.
    pub fn execute_line(&mut self, line: &str) -> Result<()> {
        dispatch(
            &self.registry,
            &mut self.session,
            &mut self.terminal,
            &mut self.out,
            line,
        )
    }
}

fn dispatch(
    registry: &CommandRegistry,
    session: &mut Session,
    terminal: &mut dyn Terminal,
    out: &mut dyn Write,
    line: &str,
) -> Result<()> {
    let expanded = apply_aliases(line, &session.aliases);

    for segment in split_commands(&expanded) {
        if session.stop.is_stopped() {
            debug!("stop requested, skipping remaining sub-commands");
            break;
        }

        let tokens = tokenize(segment);
        let Some((name, args)) = tokens.split_first() else {
            continue;
        };

        let Some(command) = registry.get(name) else {
            report(out, &format!("unknown command: {}", name));
            continue;
        };

        debug!("dispatch: {} {:?}", name, args);
        let scope = CookedScope::enter(terminal)
            .with_context(|| format!("Failed to leave raw mode for '{}'", name))?;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut ctx = ShellContext {
                registry,
                session: &mut *session,
                out: &mut *out,
            };
            command.execute(args, &mut ctx)
        }));

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!("command '{}' failed: {:#}", name, e);
                report(out, &format!("{}: {:#}", name, e));
            }
            Err(_) => {
                warn!("command '{}' panicked", name);
                report(out, &format!("{}: command panicked", name));
            }
        }
        scope.finish().context("Failed to restore raw mode")?;
    }

    if let Err(e) = out.flush() {
        warn!("Failed to flush output: {}", e);
    }
    Ok(())
}

fn report(out: &mut dyn Write, message: &str) {
    if let Err(e) = writeln!(out, "{}", message.red()) {
        warn!("Failed to write to output: {}", e);
    }
}
