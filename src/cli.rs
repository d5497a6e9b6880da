use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rtsh", version, about = "rtsh: an interactive command shell")]
pub struct Cli {
    /// Path to a TOML config file (default: ./rtsh.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Run a single line and exit
    #[arg(short = 'c', long = "command")]
    pub command: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug logging for the shell
    #[arg(short, long)]
    pub verbose: bool,
}
