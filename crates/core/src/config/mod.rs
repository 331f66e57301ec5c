//! Configuration persistence
//!
//! Two file formats live here:
//! - the cvar archive: a console script of `set <name> "<value>"` lines,
//!   written on shutdown and replayed through the console at startup
//! - the framework config: a small TOML file for settings that must exist
//!   before the cvar system is up (logging, paths)
//!
//! IO failures are logged and the operation is skipped; nothing here is
//! fatal.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::console::Console;
use crate::cvars::CvarStore;

/// Configuration system errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write a config file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML content
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config to TOML
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Header written at the top of the cvar archive.
const ARCHIVE_HEADER: &str = "// generated by q2rust, do not modify";

/// Write the archived cvars to `path` as a replayable console script.
pub fn write_archived_config(store: &CvarStore, path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(path)?;
    writeln!(file, "{}", ARCHIVE_HEADER)?;
    store.write_archived(&mut file)?;
    file.flush()?;

    tracing::debug!("Wrote cvar archive to {:?}", path);
    Ok(())
}

/// Execute every line of a config file through the console.
///
/// Returns the number of lines executed. A missing file is an error the
/// caller decides how loudly to report.
pub fn exec_config_file(
    console: &mut Console,
    store: &mut CvarStore,
    path: &Path,
) -> ConfigResult<usize> {
    let content = std::fs::read_to_string(path)?;
    let mut count = 0;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        console.execute(store, line);
        count += 1;
    }

    tracing::debug!("Executed {} lines from {:?}", count, path);
    Ok(count)
}

/// Framework-level configuration, loaded before the cvar system is up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Config version for future migration support
    pub version: u32,

    /// Enable debug logging
    pub debug: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            version: 1,
            debug: false,
        }
    }
}

impl CoreConfig {
    /// Load from file, creating a default config if the file is missing.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::debug!("Loaded core config from {:?}", path);
            Ok(config)
        } else {
            let default = Self::default();
            default.save(path)?;
            tracing::info!("Created default core config at {:?}", path);
            Ok(default)
        }
    }

    /// Save to file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!("Saved core config to {:?}", path);
        Ok(())
    }

    /// Reload from file, replacing self.
    pub fn reload(&mut self, path: &Path) -> ConfigResult<()> {
        let content = std::fs::read_to_string(path)?;
        *self = toml::from_str(&content)?;
        tracing::debug!("Reloaded core config from {:?}", path);
        Ok(())
    }
}
