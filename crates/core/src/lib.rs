//! q2rust - Core Runtime
//!
//! This crate contains the dynamic variable registry ("cvar" system) and
//! the console command plumbing shared by the client and any future
//! dedicated-server build.
//!
//! # Modules
//!
//! - [`cvars`] - named, string-valued runtime settings with policy flags
//! - [`console`] - command registry, tokenizer and buffered command queue
//! - [`config`] - cvar archive persistence and the framework TOML config

pub mod config;
pub mod console;
pub mod cvars;

// Re-export commonly used items
pub use console::{CommandArgs, CommandKey, Console};
pub use cvars::{Cvar, CvarFlags, CvarStore};

pub use config::{ConfigError, ConfigResult, CoreConfig};
