use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use crate::shell::cancel::{CancelSlot, StopHandle};
use crate::shell::history::{History, DEFAULT_HISTORY_SIZE};
use crate::shell::registry::CommandRegistry;

/// State that lives for the whole interactive session.
pub struct Session {
    pub name: String,
    pub cwd: PathBuf,
    pub aliases: HashMap<String, String>,
    pub history: History,
    pub stop: StopHandle,
    pub cancel: CancelSlot,
}

impl Default for Session {
    fn default() -> Self {
        Self::new("rtsh", DEFAULT_HISTORY_SIZE)
    }
}

impl Session {
    pub fn new(name: &str, history_size: usize) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            name: name.to_string(),
            cwd,
            aliases: HashMap::new(),
            history: History::with_capacity(history_size),
            stop: StopHandle::new(),
            cancel: CancelSlot::new(),
        }
    }

    pub fn with_aliases(mut self, aliases: HashMap<String, String>) -> Self {
        self.aliases = aliases;
        self
    }
}

/// What a command sees while it runs: the registry (read-only), the session
/// and the shell's output stream.
pub struct ShellContext<'a> {
    pub registry: &'a CommandRegistry,
    pub session: &'a mut Session,
    pub out: &'a mut dyn Write,
}

impl ShellContext<'_> {
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.session.cwd.join(p)
        }
    }

    /// Requests a cooperative stop of the shell loop.
    pub fn stop(&self) {
        self.session.stop.stop();
    }
}
