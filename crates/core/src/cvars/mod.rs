//! Dynamic variable registry
//!
//! Cvars are named, string-valued runtime settings with policy flags
//! controlling persistence ([`CvarFlags::ARCHIVE`]), network exposure
//! ([`CvarFlags::USERINFO`]/[`CvarFlags::SERVERINFO`]), write protection
//! ([`CvarFlags::NOSET`]) and deferred commit ([`CvarFlags::LATCH`]).
//!
//! # Example
//!
//! ```
//! use q2rust_core::cvars::{CvarFlags, CvarStore};
//!
//! let mut store = CvarStore::new();
//! store.get("rate", "8000", CvarFlags::USERINFO | CvarFlags::ARCHIVE);
//!
//! store.set("rate", "25000");
//! assert_eq!(store.value("rate"), 25000.0);
//! assert!(store.userinfo_modified());
//! ```

mod cvar;
pub mod info;
pub mod rename;
mod store;

pub use cvar::{Cvar, CvarFlags};
pub use store::{ContentHook, CvarStore, BASE_CONTENT, CONTENT_VAR};
