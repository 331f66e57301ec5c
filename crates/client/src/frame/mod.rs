//! The frame driver
//!
//! One [`Client::frame`] call advances simulation clocks, drives packet
//! I/O, input sampling, console command draining and movement sampling,
//! and conditionally presents, given caller-supplied time deltas and
//! cadence flags. The caller owns the pacing policy (fixed tick, vsync,
//! busy loop); this module owns what happens on a qualified tick.

mod cheats;
mod timing;

pub use cheats::CheatGuard;
pub use timing::{FrameTiming, MAX_FRAME_TIME_SECS, STALL_THRESHOLD_US};

use q2rust_core::CvarStore;

use crate::client::Client;
use crate::session::{ConnState, KeyDest};
use crate::subsystems::{CommandPacket, Subsystems};

/// Handshake packets are never spaced further apart than this.
const HANDSHAKE_MAX_SPACING_US: i64 = 100_000;

/// Idle slice while rendering is paused, roughly one 60 Hz frame.
const PAUSED_IDLE: std::time::Duration = std::time::Duration::from_millis(16);

/// Caller-supplied deltas and cadence flags for one frame invocation.
#[derive(Debug, Clone, Copy)]
pub struct FrameTick {
    /// Microseconds since the last packet tick
    pub packet_delta_us: i64,
    /// Microseconds since the last render tick
    pub render_delta_us: i64,
    /// Microseconds of wall time since the last invocation
    pub time_delta_us: i64,
    /// Perform network transmission work this frame
    pub packet_frame: bool,
    /// Perform presentation work this frame
    pub render_frame: bool,
    /// Current wall time in milliseconds
    pub now_ms: u64,
}

impl Client {
    /// Run one client frame.
    pub fn frame(&mut self, store: &mut CvarStore, sys: &mut Subsystems<'_>, tick: FrameTick) {
        // A headless build owns no rendering or local simulation.
        if store.value("dedicated") != 0.0 {
            return;
        }

        let mut packet_frame = tick.packet_frame;
        let render_frame = tick.render_frame;

        // Calculate simulation time.
        self.timing.net_frame_time = FrameTiming::clamp_delta(tick.packet_delta_us);
        self.timing.render_frame_time = FrameTiming::clamp_delta(tick.render_delta_us);
        self.timing.realtime_ms = tick.now_ms;
        self.cl.time += (tick.time_delta_us / 1000).max(0) as u64;

        // If we sat in the debugger, don't let the connection time out.
        if tick.time_delta_us > STALL_THRESHOLD_US {
            sys.net.reset_timeout(tick.now_ms);
        }

        self.timing.impact_sound_count = 0;

        if store.value("timedemo") == 0.0 {
            // Don't throttle the handshake on a slow packet cadence.
            if sys.net.state() == ConnState::Connected
                && tick.packet_delta_us > HANDSHAKE_MAX_SPACING_US
            {
                packet_frame = true;
            }
        }

        if packet_frame || render_frame {
            sys.net.poll();
            self.update_windowed_mouse(store, sys.net.state());
            sys.input.update();
            self.console.execute_buffered(store);
            self.cheats.enforce(store, self.cl.max_clients);

            if sys.net.state().past_connecting() {
                sys.input.sample_for_transmit(self.timing.net_frame_time);
            } else {
                sys.input.sample_for_prediction(self.timing.net_frame_time);
            }
        }

        if self.force_packet || store.userinfo_modified() {
            packet_frame = true;
            self.force_packet = false;
        }

        if packet_frame {
            let userinfo = if store.take_userinfo_modified() {
                Some(store.userinfo())
            } else {
                None
            };
            sys.net.transmit(&CommandPacket {
                sim_time_ms: self.cl.time,
                userinfo,
            });
            sys.net.check_for_resend();
        }

        if render_frame {
            sys.renderer.check_changes();
            sys.input.predict_movement();

            if !self.cl.refresh_prepped && sys.net.state() == ConnState::Active {
                sys.renderer.prepare_refresh();
                self.cl.refresh_prepped = true;
            }

            if self.rendering_paused {
                // Stay off the GPU, but don't peg a core either.
                std::thread::sleep(PAUSED_IDLE);
            } else {
                sys.renderer.update_screen();
            }

            sys.audio.update(&self.cl.listener);

            // advance local effects for next frame
            sys.renderer.advance_effects();

            self.timing.frame_count += 1;

            if store.value("log_stats") != 0.0 && sys.net.state() == ConnState::Active {
                self.timing.log_frame_delta(tick.now_ms);
            }
        }
    }

    /// Reconcile pointer capture with current UI focus: release the mouse
    /// for menu/console (or while the world isn't drawable), capture it
    /// in-game.
    fn update_windowed_mouse(&self, store: &mut CvarStore, state: ConnState) {
        if self.cl.screen_disabled {
            return;
        }

        let release = match self.cl.key_dest {
            KeyDest::Menu | KeyDest::Console => true,
            KeyDest::Game => state != ConnState::Active || !self.cl.refresh_prepped,
        };

        if release {
            if store.value("windowed_mouse") != 0.0 {
                store.set_value("windowed_mouse", 0.0);
            }
        } else if store.value("windowed_mouse") == 0.0 {
            store.set_value("windowed_mouse", 1.0);
        }
    }
}
