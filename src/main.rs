mod cli;
mod config;
mod logger;
mod shell;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use config::{ShellConfig, load_config};
use log::info;
use shell::Shell;
use shell::cancel::{CancelSlot, StopHandle};
use shell::commands::builtins::register_all_builtins;
use shell::context::Session;
use shell::registry::CommandRegistry;
use shell::terminal::Detached;
use std::env;
use std::io::{self, Read};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    let cwd = env::current_dir()?;
    let config = load_config(cli.config.as_deref(), &cwd)?;
    if cli.no_color || !config.shell.color {
        colored::control::set_override(false);
    }

    let mut registry = CommandRegistry::new();
    register_all_builtins(&mut registry);
    let session = Session::new(&config.shell.name, config.shell.history_size)
        .with_aliases(config.aliases.clone());

    if let Some(line) = cli.command {
        let mut shell = Shell::new(registry, session, Detached::default(), io::empty(), io::stdout());
        return shell.execute_line(&line);
    }

    run_session(registry, session, &config)
}

#[cfg(unix)]
fn run_session(registry: CommandRegistry, session: Session, config: &ShellConfig) -> Result<()> {
    use shell::terminal::{PolledInput, RawTerminal, Terminal};

    let mut terminal = RawTerminal::stdin();
    // Raw mode stays on when the probe succeeds; Shell::run's own enable is then a no-op.
    let interactive = terminal.is_tty()
        && match terminal.enable_raw_mode() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("{:#}; falling back to line input", e);
                false
            }
        };

    if interactive {
        // Reads time out periodically so a signal-driven stop is seen at an idle prompt.
        let mut shell = Shell::new(registry, session, terminal, PolledInput::stdin(), io::stdout())
            .with_prompt(&config.shell.prompt);
        install_signal_handler(shell.stop_handle(), shell.cancel_slot())?;
        shell.run()
    } else {
        run_script(registry, session, PolledInput::stdin())
    }
}

#[cfg(not(unix))]
fn run_session(registry: CommandRegistry, session: Session, _config: &ShellConfig) -> Result<()> {
    run_script(registry, session, io::stdin())
}

fn run_script<R: Read>(registry: CommandRegistry, session: Session, input: R) -> Result<()> {
    info!("stdin is not an interactive terminal, reading lines");
    let mut shell = Shell::new(registry, session, Detached::default(), input, io::stdout());
    install_signal_handler(shell.stop_handle(), shell.cancel_slot())?;
    shell.run_script()
}

/// SIGINT/SIGTERM: request a stop and cancel whatever command is blocking.
fn install_signal_handler(stop: StopHandle, cancel: CancelSlot) -> Result<()> {
    ctrlc::set_handler(move || {
        stop.stop();
        cancel.cancel_active();
    })
    .context("Failed to install signal handler")
}
