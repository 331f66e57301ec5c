//! Frame timing state
//!
//! All pacing state lives on this struct instead of function-local
//! statics so tests can drive the frame loop with synthetic time
//! sequences.

/// Simulated frame deltas are clamped to this many seconds so a debugger
/// stall or suspension does not extrapolate the world half a minute
/// ahead.
pub const MAX_FRAME_TIME_SECS: f32 = 0.5;

/// A wall-time gap this large is treated as a debugging pause rather
/// than a network stall.
pub const STALL_THRESHOLD_US: i64 = 5_000_000;

/// Frame pacing and statistics state.
#[derive(Debug, Default)]
pub struct FrameTiming {
    /// Packet-simulation delta in seconds, clamped
    pub net_frame_time: f32,
    /// Render-simulation delta in seconds, clamped
    pub render_frame_time: f32,
    /// Wall time of the current frame, milliseconds
    pub realtime_ms: u64,
    /// Completed render frames
    pub frame_count: u64,
    /// Per-frame limiter for a repeated impact sound effect; reset every
    /// frame, bumped by the effect spawn path
    pub impact_sound_count: u32,
    /// Inter-frame deltas collected while performance logging is on
    stats_log: Vec<u64>,
    last_stats_ms: Option<u64>,
}

impl FrameTiming {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a microsecond delta to clamped simulation seconds.
    pub fn clamp_delta(delta_us: i64) -> f32 {
        let secs = delta_us as f32 / 1_000_000.0;
        secs.min(MAX_FRAME_TIME_SECS)
    }

    /// Record one performance-log sample. The first call after enabling
    /// logging records a zero marker, matching the log format readers
    /// expect.
    pub fn log_frame_delta(&mut self, now_ms: u64) {
        match self.last_stats_ms.replace(now_ms) {
            None => self.stats_log.push(0),
            Some(prev) => self.stats_log.push(now_ms.saturating_sub(prev)),
        }
    }

    /// Collected inter-frame deltas, milliseconds.
    pub fn stats_log(&self) -> &[u64] {
        &self.stats_log
    }
}
