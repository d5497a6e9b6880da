use std::collections::HashMap;
use log::debug;
use crate::shell::commands::Command;

/// Owns every registered command, keyed by name.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `command` under `name`, replacing any previous owner of that name.
    pub fn register(&mut self, name: &str, command: Box<dyn Command>) {
        if self.commands.insert(name.to_string(), command).is_some() {
            debug!("command '{}' re-registered, previous handler replaced", name);
        } else {
            debug!("registered command '{}'", name);
        }
    }

    /// Registers `command` under its own [`Command::name`].
    pub fn register_command(&mut self, command: Box<dyn Command>) {
        let name = command.name().to_string();
        self.register(&name, command);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(|c| &**c)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Registered names in ascending order, computed at call time.
    pub fn command_list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }
}
