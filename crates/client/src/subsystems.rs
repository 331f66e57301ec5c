//! Collaborator seams
//!
//! The frame driver orchestrates external subsystems (network transport,
//! input backend, renderer, audio mixer) through these narrow traits. All
//! calls must be non-blocking poll-and-return; presentation and audio are
//! expected to return within one frame budget. Failures are the
//! collaborator's to log; nothing here returns rich errors across the
//! seam.

use crate::session::{ConnState, Listener};

/// The movement/command payload handed to the transport each packet tick.
#[derive(Debug, Clone, Default)]
pub struct CommandPacket {
    /// Simulated client time in milliseconds
    pub sim_time_ms: u64,
    /// Refreshed userinfo string, present only when it changed since the
    /// last transmission
    pub userinfo: Option<String>,
}

/// Network transport. Owns the connection state machine.
pub trait Network {
    /// Current connection state.
    fn state(&self) -> ConnState;

    /// Drain pending incoming datagrams without blocking. Returns how
    /// many were processed.
    fn poll(&mut self) -> usize;

    /// Transmit the accumulated movement command.
    fn transmit(&mut self, cmd: &CommandPacket);

    /// Connection-retry and resend bookkeeping.
    fn check_for_resend(&mut self);

    /// Move the last-received marker to `now_ms` so a long local stall is
    /// not mistaken for a network timeout.
    fn reset_timeout(&mut self, now_ms: u64);
}

/// Input backend.
pub trait InputSystem {
    /// Pump the raw input/message loop.
    fn update(&mut self);

    /// Sample movement input into the outgoing command.
    fn sample_for_transmit(&mut self, frame_time: f32);

    /// Sample movement input for local prediction only (not yet talking
    /// to a server).
    fn sample_for_prediction(&mut self, frame_time: f32);

    /// Run local movement prediction for the render frame.
    fn predict_movement(&mut self);
}

/// Presentation backend.
pub trait Renderer {
    /// Pick up display/video configuration changes.
    fn check_changes(&mut self);

    /// Prefetch level assets; called once when entering the active state.
    fn prepare_refresh(&mut self);

    /// Draw the frame.
    fn update_screen(&mut self);

    /// Advance local-only cosmetic effects (dynamic lights, light
    /// styles, cinematic/console scroll) for the next frame.
    fn advance_effects(&mut self);

    /// Flush in-flight commands. Called before rendering is paused.
    fn flush(&mut self);
}

/// Audio backend.
pub trait Audio {
    /// Update spatialization from the current view.
    fn update(&mut self, listener: &Listener);

    /// Stop all output and release the device.
    fn shutdown(&mut self);
}

/// Persistent console history.
pub trait ConsoleHistory {
    /// Load stored history. Returns false on failure (logged, ignored).
    fn read_history(&mut self) -> bool;

    /// Persist history. Returns false on failure (logged, ignored).
    fn write_history(&mut self) -> bool;
}

/// All collaborator references threaded through one frame invocation.
pub struct Subsystems<'a> {
    pub net: &'a mut dyn Network,
    pub input: &'a mut dyn InputSystem,
    pub renderer: &'a mut dyn Renderer,
    pub audio: &'a mut dyn Audio,
}
