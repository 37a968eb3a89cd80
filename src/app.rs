//! Application module: exposes the front-end model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds cursor and popup state.
//! Playback state itself belongs to the `PlaybackController`.

mod model;

pub use model::*;
