//! soundboard-lib — Soundboard skill and the host seams it plugs into.
//!
//! The skill itself lives in [`skill`]. Everything else is either a host
//! contract ([`host`]) or a reference adapter that satisfies one: rodio
//! playback, tokio timers, dialog speech, intent routing, and an HTTP API.
//! Depends on soundboard-core for pure types and grammar.

pub mod config;
pub mod error;
pub mod host;
pub mod intents;
pub mod library;
pub mod playback;
pub mod scheduler;
pub mod server;
pub mod skill;
pub mod speech;

// Re-export soundboard-core for convenience
pub use soundboard_core;
