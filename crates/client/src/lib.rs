//! Game client runtime
//!
//! Owns the per-frame driver and everything a client carries between
//! sessions. The embedder provides the platform pieces (network
//! transport, input, renderer, audio) behind the traits in
//! [`subsystems`], decides the frame cadence, and calls
//! [`Client::frame`] with the elapsed time deltas.

pub mod client;
pub mod demo;
pub mod frame;
pub mod session;
pub mod subsystems;

pub use client::{init_logging, Client};
pub use demo::DemoRecorder;
pub use frame::{CheatGuard, FrameTick, FrameTiming};
pub use session::{ClientState, ConnState, EntityBaseline, KeyDest, Listener};
pub use subsystems::{Audio, CommandPacket, ConsoleHistory, InputSystem, Network, Renderer, Subsystems};
