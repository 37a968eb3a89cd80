//! Audio subsystem: a `PlaybackEngine` backed by `rodio`.
//!
//! Decoding and output happen on a dedicated thread. The engine handle sends
//! it commands, reads a shared status snapshot, and drains lifecycle events.

mod player;
mod probe;
mod sink;
mod thread;
mod types;

pub use player::RodioEngine;
