//! soundboard-core — Pure types, host-config rules, intent grammar and dialog templates.
//!
//! No async runtime, no I/O, no platform dependencies.

pub mod config;
pub mod dialog;
pub mod intent;
pub mod types;
