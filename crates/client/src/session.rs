//! Connection and session state

/// Connection state machine.
///
/// Owned by the [`Network`](crate::subsystems::Network) collaborator; the
/// frame driver only reads it to decide per-frame behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ConnState {
    /// Client subsystems not yet brought up
    Uninitialized,
    /// Fully initialized, not talking to a server
    #[default]
    Disconnected,
    /// Sending connection request packets
    Connecting,
    /// Handshake accepted, waiting for the first server frame
    Connected,
    /// In a level, receiving server frames
    Active,
}

impl ConnState {
    /// True once the handshake has completed.
    pub fn past_connecting(self) -> bool {
        self > ConnState::Connecting
    }
}

/// Where keyboard focus currently goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyDest {
    #[default]
    Game,
    Console,
    Menu,
}

/// Spatial audio listener, updated from the current view.
#[derive(Debug, Clone, Copy, Default)]
pub struct Listener {
    pub origin: [f32; 3],
    pub forward: [f32; 3],
    pub right: [f32; 3],
    pub up: [f32; 3],
}

/// One entity's spawn baseline, snapshotted into demo recordings.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityBaseline {
    pub number: u16,
    pub model_index: u8,
    pub frame: u8,
    pub origin: [f32; 3],
    pub angles: [f32; 3],
}

impl EntityBaseline {
    /// Baselines without a model are never written out.
    pub fn is_empty(&self) -> bool {
        self.model_index == 0
    }
}

/// Per-session client state, wiped on disconnect.
#[derive(Debug, Default)]
pub struct ClientState {
    /// Simulated clock in milliseconds
    pub time: u64,
    /// Set once refresh preparation (level asset prefetch) has run
    pub refresh_prepped: bool,
    /// Client count of the current session; 0 when unknown, 1 in
    /// single-player
    pub max_clients: u32,
    /// Loading plaque up, screen updates disabled
    pub screen_disabled: bool,
    /// Current keyboard focus
    pub key_dest: KeyDest,
    /// Audio listener, fed from the view setup
    pub listener: Listener,
    /// Server spawn count, echoed into demo headers
    pub server_count: i32,
    /// Our player slot
    pub player_num: i16,
    /// Content set directory reported by the server
    pub game_dir: String,
    /// Display name of the current level
    pub level_name: String,
    /// Server-provided configuration strings
    pub configstrings: Vec<String>,
    /// Entity spawn baselines
    pub baselines: Vec<EntityBaseline>,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wipe per-session state. Called when leaving a server.
    pub fn clear(&mut self) {
        *self = Self {
            key_dest: self.key_dest,
            ..Self::default()
        };
    }
}
