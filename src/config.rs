use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use crate::shell::history::DEFAULT_HISTORY_SIZE;
use crate::shell::DEFAULT_PROMPT;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "rtsh.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShellConfig {
    #[serde(default)]
    pub shell: ShellSection,
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ShellSection {
    pub name: String,
    pub prompt: String,
    pub history_size: usize,
    pub color: bool,
}

impl Default for ShellSection {
    fn default() -> Self {
        Self {
            name: "rtsh".to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            history_size: DEFAULT_HISTORY_SIZE,
            color: true,
        }
    }
}

/// Loads the configuration.
///
/// An explicit path must exist. Otherwise `rtsh.toml` in `dir` is used when
/// present, and the built-in defaults when it is not.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<ShellConfig> {
    let config_path = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            path.to_path_buf()
        }
        None => {
            let candidate = dir.join(DEFAULT_CONFIG_FILE);
            if !candidate.exists() {
                log::debug!("no {} in {}, using defaults", DEFAULT_CONFIG_FILE, dir.display());
                return Ok(ShellConfig::default());
            }
            candidate
        }
    };

    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;
    let config = parse_config(&content)
        .with_context(|| format!("Failed to parse {}", config_path.display()))?;
    log::info!("loaded config from {}", config_path.display());
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<ShellConfig> {
    let config: ShellConfig = toml::from_str(content)?;

    // Validation: an alias replaces exactly one token
    for (name, replacement) in &config.aliases {
        if name.split_whitespace().count() != 1 || replacement.split_whitespace().count() != 1 {
            bail!("Alias '{}' = '{}' must map a single word to a single word", name, replacement);
        }
    }

    Ok(config)
}
