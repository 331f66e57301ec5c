//! Cheat cvar enforcement
//!
//! In a multi-client session a fixed allowlist of variables is pinned to
//! canonical defaults every tick. Single-player sessions are exempt and
//! may vary these freely.

use q2rust_core::cvars::{CvarFlags, CvarStore};

/// Variables that must hold their defaults in multiplayer.
static CHEAT_VARS: &[(&str, &str)] = &[
    ("timescale", "1"),
    ("timedemo", "0"),
    ("r_drawworld", "1"),
    ("cl_testlights", "0"),
    ("r_fullbright", "0"),
    ("gl_drawflat", "0"),
    ("paused", "0"),
    ("fixedtime", "0"),
    ("sw_draworder", "0"),
    ("gl_lightmap", "0"),
    ("gl_saturatelighting", "0"),
];

/// Per-client enforcement state. Store entries are registered lazily on
/// the first multiplayer tick.
#[derive(Debug, Default)]
pub struct CheatGuard {
    resolved: bool,
}

impl CheatGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset every differing allowlisted cvar to its default.
    ///
    /// `max_clients` of 0 (unknown) or 1 (single player) disables
    /// enforcement entirely.
    pub fn enforce(&mut self, store: &mut CvarStore, max_clients: u32) {
        if max_clients <= 1 {
            return;
        }

        if !self.resolved {
            for &(name, default) in CHEAT_VARS {
                store.get(name, default, CvarFlags::empty());
            }
            self.resolved = true;
        }

        for &(name, default) in CHEAT_VARS {
            if store.string(name) != default {
                tracing::debug!("cheat cvar {} reset to {}", name, default);
                store.set(name, default);
            }
        }
    }
}
