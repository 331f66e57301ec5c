//! Command registry - registration and dispatch

use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};

use super::args::CommandArgs;
use crate::cvars::CvarStore;

new_key_type! {
    /// Handle for a registered command
    pub struct CommandKey;
}

/// Type alias for command callback functions
pub type CommandCallback = Box<dyn FnMut(&mut CvarStore, &CommandArgs) + Send>;

/// Registered command information
struct CommandEntry {
    /// Command name as registered
    name: String,
    /// Help text
    description: String,
    /// Callback function
    callback: CommandCallback,
}

/// Named command table.
pub struct CommandRegistry {
    /// Commands indexed by key
    commands: SlotMap<CommandKey, CommandEntry>,

    /// Lookup by name (case-insensitive, lowercase)
    by_name: HashMap<String, CommandKey>,
}

impl CommandRegistry {
    pub(crate) fn new() -> Self {
        Self {
            commands: SlotMap::with_key(),
            by_name: HashMap::new(),
        }
    }

    /// Register a command.
    pub(crate) fn register(
        &mut self,
        name: &str,
        description: &str,
        callback: CommandCallback,
    ) -> Option<CommandKey> {
        let name_lower = name.to_lowercase();

        if self.by_name.contains_key(&name_lower) {
            tracing::warn!("Command '{}' already registered", name);
            return None;
        }

        let entry = CommandEntry {
            name: name.to_string(),
            description: description.to_string(),
            callback,
        };

        let key = self.commands.insert(entry);
        self.by_name.insert(name_lower, key);

        tracing::debug!("Registered command: {}", name);
        Some(key)
    }

    /// Unregister a command by key.
    pub(crate) fn unregister(&mut self, key: CommandKey) -> bool {
        if let Some(entry) = self.commands.remove(key) {
            self.by_name.remove(&entry.name.to_lowercase());
            tracing::debug!("Unregistered command: {}", entry.name);
            true
        } else {
            false
        }
    }

    /// Find a command by name.
    pub fn find(&self, name: &str) -> Option<CommandKey> {
        self.by_name.get(&name.to_lowercase()).copied()
    }

    /// Execute a command by key. Returns false if the key is stale.
    pub(crate) fn execute(
        &mut self,
        key: CommandKey,
        store: &mut CvarStore,
        args: &CommandArgs,
    ) -> bool {
        if let Some(entry) = self.commands.get_mut(key) {
            (entry.callback)(store, args);
            true
        } else {
            false
        }
    }

    /// Get a command's description.
    pub fn description(&self, key: CommandKey) -> Option<&str> {
        self.commands.get(key).map(|e| e.description.as_str())
    }

    /// Iterate over all registered commands as (name, description).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.commands
            .values()
            .map(|e| (e.name.as_str(), e.description.as_str()))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_find() {
        let mut registry = CommandRegistry::new();
        let key = registry
            .register("userinfo", "Show userinfo", Box::new(|_, _| {}))
            .unwrap();

        assert!(registry.find("userinfo").is_some());
        assert!(registry.find("USERINFO").is_some()); // case insensitive
        assert_eq!(registry.description(key), Some("Show userinfo"));
    }

    #[test]
    fn test_duplicate_registration_refused() {
        let mut registry = CommandRegistry::new();
        let first = registry.register("pause", "First", Box::new(|_, _| {}));
        let second = registry.register("pause", "Second", Box::new(|_, _| {}));
        assert!(first.is_some());
        assert!(second.is_none());
    }

    #[test]
    fn test_unregister() {
        let mut registry = CommandRegistry::new();
        let key = registry
            .register("quit", "Quit", Box::new(|_, _| {}))
            .unwrap();
        assert!(registry.unregister(key));
        assert!(registry.find("quit").is_none());
        assert!(!registry.unregister(key));
    }

    #[test]
    fn test_execute_runs_callback() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();

        let mut registry = CommandRegistry::new();
        let key = registry
            .register(
                "mark",
                "Set a flag",
                Box::new(move |_, _| flag.store(true, Ordering::SeqCst)),
            )
            .unwrap();

        let mut store = CvarStore::new();
        let args = CommandArgs::tokenize("mark");
        assert!(registry.execute(key, &mut store, &args));
        assert!(ran.load(Ordering::SeqCst));
    }
}
