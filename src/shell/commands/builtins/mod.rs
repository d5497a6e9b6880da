pub mod common; // Private helpers
pub mod env;
pub mod fs;
pub mod io;
pub mod process;
pub mod session;


use crate::shell::registry::CommandRegistry;

/// Helper to register all built-in commands at once
pub fn register_all_builtins(registry: &mut CommandRegistry) {
    // Session
    registry.register_command(Box::new(env::exit::ExitCommand));
    registry.register_command(Box::new(session::help::HelpCommand));
    registry.register_command(Box::new(session::history::HistoryCommand));
    registry.register_command(Box::new(session::alias::AliasCommand));

    // Env/Navigation
    registry.register_command(Box::new(env::cd::CdCommand));
    registry.register_command(Box::new(env::pwd::PwdCommand));

    // FS commands
    registry.register_command(Box::new(fs::ls::LsCommand));
    registry.register_command(Box::new(fs::cat::CatCommand));
    registry.register_command(Box::new(fs::mkdir::MkdirCommand));
    registry.register_command(Box::new(fs::rm::RmCommand));
    registry.register_command(Box::new(fs::cp::CpCommand));
    registry.register_command(Box::new(fs::mv::MvCommand));

    // IO
    registry.register_command(Box::new(io::echo::EchoCommand));
    registry.register_command(Box::new(io::clear::ClearCommand));

    // Processes
    registry.register_command(Box::new(process::sleep::SleepCommand));
    registry.register_command(Box::new(process::exec::ExecCommand));
}
