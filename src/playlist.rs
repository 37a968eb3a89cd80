//! Playlist module: the immutable, ordered list of tracks the player cycles through.
//!
//! The playlist is fixed at construction and never empty. It comes either from
//! the `[[playlist]]` entries of the config file or from the compiled-in default.

mod builtin;
mod display;
mod model;

pub use display::display_from_fields;
pub use model::*;
