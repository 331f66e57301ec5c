//! Client lifecycle
//!
//! [`Client`] owns everything that persists across sessions: the console,
//! frame timing, cheat enforcement and the demo recorder. Per-session
//! state lives in [`ClientState`] and is wiped on disconnect; the cvar
//! store is owned by the embedder and threaded through every call.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use q2rust_core::config::{self, CoreConfig};
use q2rust_core::cvars::CvarFlags;
use q2rust_core::{Console, CvarStore};

use crate::demo::DemoRecorder;
use crate::frame::{CheatGuard, FrameTiming};
use crate::session::{ClientState, ConnState};
use crate::subsystems::{Audio, ConsoleHistory, Renderer};

/// Initialize the tracing subscriber from the framework config.
///
/// Safe to call more than once; later calls are no-ops. `RUST_LOG`
/// overrides the config.
pub fn init_logging(config: &CoreConfig) {
    let default = if config.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// The game client.
pub struct Client {
    /// Per-session state
    pub cl: ClientState,
    pub(crate) console: Console,
    pub(crate) timing: FrameTiming,
    pub(crate) cheats: CheatGuard,
    /// Shared with the `stop` console command
    demo: Arc<Mutex<DemoRecorder>>,
    pub(crate) rendering_paused: bool,
    pub(crate) force_packet: bool,
    initialized: bool,
    shut_down: bool,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    pub fn new() -> Self {
        Self {
            cl: ClientState::new(),
            console: Console::new(),
            timing: FrameTiming::new(),
            cheats: CheatGuard::new(),
            demo: Arc::new(Mutex::new(DemoRecorder::new())),
            rendering_paused: false,
            force_packet: false,
            initialized: false,
            shut_down: false,
        }
    }

    /// Bring the client up: register its cvars and commands, load console
    /// history, and drain any commands queued during early startup.
    pub fn init(&mut self, store: &mut CvarStore, history: &mut dyn ConsoleHistory) {
        self.register_cvars(store);
        self.register_commands();
        history.read_history();
        self.console.execute_buffered(store);
        self.initialized = true;
        tracing::info!("Client initialized");
    }

    /// Register every client cvar with its default and flags.
    pub fn register_cvars(&mut self, store: &mut CvarStore) {
        let a = CvarFlags::ARCHIVE;
        let u = CvarFlags::USERINFO;

        store.get("dedicated", "0", CvarFlags::NOSET);
        store.get("timedemo", "0", CvarFlags::empty());
        store.get("log_stats", "0", CvarFlags::empty());
        store.get("paused", "0", CvarFlags::empty());
        store.get("cl_timeout", "120", CvarFlags::empty());
        store.get("cl_predict", "1", CvarFlags::empty());
        store.get("cl_showfps", "0", a);
        store.get("maxclients", "1", CvarFlags::SERVERINFO | CvarFlags::LATCH);
        store.get("game", "", CvarFlags::SERVERINFO | CvarFlags::LATCH);

        // userinfo
        store.get("name", "unnamed", u | a);
        store.get("skin", "male/grunt", u | a);
        store.get("rate", "8000", u | a);
        store.get("msg", "1", u | a);
        store.get("hand", "0", u | a);
        store.get("fov", "90", u | a);
        store.get("gender", "male", u | a);
        store.get("gender_auto", "1", a);
        store.get("password", "", u);
        store.get("spectator", "0", u);
        store.get("windowed_mouse", "1", u | a);

        // gender starts unmodified so skin-derived updates apply until
        // the user picks one explicitly
        store.clear_modified("gender");
    }

    fn register_commands(&mut self) {
        self.console.register_command(
            "userinfo",
            "Print the current userinfo string",
            Box::new(|store, _args| {
                tracing::info!("User info settings:");
                q2rust_core::cvars::info::print(&store.userinfo());
            }),
        );

        self.console.register_command(
            "pause",
            "Toggle the pause state",
            Box::new(|store, _args| {
                // only a local single-player session may pause
                if store.value("maxclients") > 1.0 || !store.session_active() {
                    store.set_value("paused", 0.0);
                    return;
                }
                let paused = store.value("paused") != 0.0;
                store.set_value("paused", if paused { 0.0 } else { 1.0 });
            }),
        );

        let demo = self.demo.clone();
        self.console.register_command(
            "stop",
            "Stop recording a demo",
            Box::new(move |_store, _args| match demo.lock().stop() {
                Ok(true) => tracing::info!("Stopped demo."),
                Ok(false) => tracing::info!("Not recording a demo."),
                Err(err) => tracing::warn!("Failed to finish demo: {}", err),
            }),
        );
    }

    /// Shut down: finish any demo, persist settings and history, stop
    /// audio. Safe against re-entry from a fatal-error path.
    pub fn shutdown(
        &mut self,
        store: &CvarStore,
        config_path: &Path,
        audio: &mut dyn Audio,
        history: &mut dyn ConsoleHistory,
    ) {
        if self.shut_down {
            tracing::warn!("recursive shutdown");
            return;
        }
        self.shut_down = true;

        if let Err(err) = self.demo.lock().stop() {
            tracing::warn!("Failed to finish demo: {}", err);
        }

        // a failure before init has nothing worth saving
        if self.initialized {
            if let Err(err) = config::write_archived_config(store, config_path) {
                tracing::warn!("Failed to write {:?}: {}", config_path, err);
            }
            history.write_history();
        }

        audio.shutdown();
    }

    /// Enter a session: pending latched values commit, further latched
    /// writes defer until [`Client::end_session`].
    pub fn begin_session(&mut self, store: &mut CvarStore) {
        store.commit_latched();
        store.set_session_active(true);
    }

    /// Leave the current session, wiping per-session state.
    pub fn end_session(&mut self, store: &mut CvarStore) {
        store.set_session_active(false);
        self.cl.clear();
    }

    /// Stop presenting frames, e.g. while the window is minimized or the
    /// application is backgrounded. Simulation and networking continue.
    pub fn pause_rendering(&mut self, renderer: &mut dyn Renderer) {
        if self.rendering_paused {
            return;
        }
        renderer.flush();
        self.rendering_paused = true;
        tracing::debug!("rendering paused");
    }

    pub fn resume_rendering(&mut self) {
        self.rendering_paused = false;
    }

    pub fn rendering_paused(&self) -> bool {
        self.rendering_paused
    }

    /// Transmit on the next frame even if it is not a packet tick.
    pub fn request_packet(&mut self) {
        self.force_packet = true;
    }

    /// Begin recording a demo of the current session to `sink`.
    ///
    /// Returns false (with a log line) when already recording or not in a
    /// level.
    pub fn start_recording(&mut self, state: ConnState, sink: Box<dyn Write + Send>) -> bool {
        let mut demo = self.demo.lock();
        if demo.is_recording() {
            tracing::info!("Already recording.");
            return false;
        }
        if state != ConnState::Active {
            tracing::info!("You must be in a level to record.");
            return false;
        }
        match demo.start(sink, &self.cl) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("Failed to start demo: {}", err);
                false
            }
        }
    }

    /// Finish the current recording. Returns false if none was running.
    pub fn stop_recording(&mut self) -> bool {
        match self.demo.lock().stop() {
            Ok(stopped) => stopped,
            Err(err) => {
                tracing::warn!("Failed to finish demo: {}", err);
                false
            }
        }
    }

    /// The demo recorder, shared with the network receive path so
    /// incoming server messages can be captured.
    pub fn demo(&self) -> Arc<Mutex<DemoRecorder>> {
        self.demo.clone()
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    pub fn timing(&self) -> &FrameTiming {
        &self.timing
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("initialized", &self.initialized)
            .field("rendering_paused", &self.rendering_paused)
            .field("frame_count", &self.timing.frame_count)
            .finish()
    }
}
