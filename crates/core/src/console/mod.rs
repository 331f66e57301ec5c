//! Console command execution
//!
//! The console owns the named command registry and a bounded text queue.
//! Any thread may queue command text; the driving thread drains the queue
//! once per cadence-qualified frame via [`Console::execute_buffered`].
//!
//! Dispatch order for a line: registered command, then cvar fallback
//! (a bare cvar name prints its value, a name plus argument sets it),
//! then an unknown-command message.
//!
//! # Example
//!
//! ```
//! use q2rust_core::{Console, CvarStore};
//!
//! let mut console = Console::new();
//! let mut store = CvarStore::new();
//!
//! console.execute(&mut store, "set rate 8000");
//! assert_eq!(store.value("rate"), 8000.0);
//! ```

mod args;
mod manager;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::cvars::{rename, CvarFlags, CvarStore};

pub use args::CommandArgs;
pub use manager::{CommandCallback, CommandKey, CommandRegistry};

/// Commands buffered per frame before the queue refuses more.
const QUEUE_CAPACITY: usize = 1024;

/// Clonable handle for queueing command text from any thread.
#[derive(Clone)]
pub struct CommandSender {
    tx: Sender<String>,
}

impl CommandSender {
    /// Queue a command line for execution on the driving thread.
    ///
    /// Returns false if the queue is full (the line is dropped).
    pub fn queue(&self, line: &str) -> bool {
        match self.tx.try_send(line.to_string()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Command queue full, dropping: {}", line);
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::error!("Command queue disconnected");
                false
            }
        }
    }
}

/// The console: command registry plus buffered command queue.
pub struct Console {
    registry: CommandRegistry,
    tx: Sender<String>,
    rx: Receiver<String>,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Create a console with the built-in cvar commands registered.
    pub fn new() -> Self {
        let (tx, rx) = bounded(QUEUE_CAPACITY);
        let mut console = Self {
            registry: CommandRegistry::new(),
            tx,
            rx,
        };
        console.register_builtins();
        console
    }

    fn register_builtins(&mut self) {
        self.register_command(
            "set",
            "Define or update a cvar, optionally re-typing it",
            Box::new(set_cmd),
        );
        self.register_command(
            "seta",
            "Define or update a cvar and mark it archived",
            Box::new(seta_cmd),
        );
        self.register_command("cvarlist", "List all cvars", Box::new(cvarlist_cmd));
    }

    /// Register a named command. Refuses duplicates.
    pub fn register_command(
        &mut self,
        name: &str,
        description: &str,
        callback: CommandCallback,
    ) -> Option<CommandKey> {
        self.registry.register(name, description, callback)
    }

    /// Unregister a command.
    pub fn unregister_command(&mut self, key: CommandKey) -> bool {
        self.registry.unregister(key)
    }

    /// A clonable queue handle for other threads.
    pub fn sender(&self) -> CommandSender {
        CommandSender {
            tx: self.tx.clone(),
        }
    }

    /// Queue a command line for the next [`Console::execute_buffered`].
    pub fn queue(&self, line: &str) -> bool {
        self.sender().queue(line)
    }

    /// Drain and execute queued command lines. Called once per
    /// cadence-qualified frame on the driving thread. Returns the number
    /// of lines executed.
    pub fn execute_buffered(&mut self, store: &mut CvarStore) -> usize {
        let mut count = 0;
        while let Ok(line) = self.rx.try_recv() {
            self.execute(store, &line);
            count += 1;
            if count >= QUEUE_CAPACITY {
                break;
            }
        }
        count
    }

    /// Execute one command line immediately.
    pub fn execute(&mut self, store: &mut CvarStore, line: &str) {
        let args = CommandArgs::tokenize(line);
        if args.is_empty() {
            return;
        }

        if let Some(key) = self.registry.find(args.name()) {
            self.registry.execute(key, store, &args);
            return;
        }

        // cvar fallback: print or set by bare name
        if store.find(args.name()).is_some() {
            if args.argc() == 1 {
                tracing::info!("\"{}\" is \"{}\"", args.name(), store.string(args.name()));
            } else {
                store.set(args.name(), args.argv(1));
            }
            return;
        }

        tracing::info!("Unknown command \"{}\"", args.name());
    }

    /// The command registry, for listing and inspection.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }
}

/// `set <name> <value> [u|s]`
fn set_cmd(store: &mut CvarStore, args: &CommandArgs) {
    let argc = args.argc();
    if argc != 3 && argc != 4 {
        tracing::info!("usage: set <variable> <value> [u / s]");
        return;
    }

    let name = rename::resolve_quiet(args.argv(1));

    if argc == 4 {
        let flags = match args.argv(3) {
            "u" => CvarFlags::USERINFO,
            "s" => CvarFlags::SERVERINFO,
            _ => {
                tracing::info!("flags can only be 'u' or 's'");
                return;
            }
        };
        store.full_set(name, args.argv(2), flags);
    } else {
        store.set(name, args.argv(2));
    }
}

/// `seta <name> <value>` - set and mark archived
fn seta_cmd(store: &mut CvarStore, args: &CommandArgs) {
    if args.argc() != 3 {
        tracing::info!("usage: seta <variable> <value>");
        return;
    }

    let name = rename::resolve_quiet(args.argv(1));
    store.full_set(name, args.argv(2), CvarFlags::ARCHIVE);
}

/// `cvarlist` - dump all cvars with flag-indicator columns
fn cvarlist_cmd(store: &mut CvarStore, args: &CommandArgs) {
    let _ = args;
    let mut count = 0;

    for var in store.iter() {
        let flags = var.flags();
        let archive = if flags.contains(CvarFlags::ARCHIVE) { '*' } else { ' ' };
        let user = if flags.contains(CvarFlags::USERINFO) { 'U' } else { ' ' };
        let server = if flags.contains(CvarFlags::SERVERINFO) { 'S' } else { ' ' };
        let policy = if flags.contains(CvarFlags::NOSET) {
            '-'
        } else if flags.contains(CvarFlags::LATCH) {
            'L'
        } else {
            ' '
        };

        tracing::info!("{}{}{}{} {} \"{}\"", archive, user, server, policy, var.name(), var.string());
        count += 1;
    }

    tracing::info!("{} cvars", count);
}
