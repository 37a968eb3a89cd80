/// User intents exposed to the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    PlayPause,
    Next,
    Previous,
    /// Absolute position in seconds.
    Seek(f64),
    SetVolume(f32),
    /// Relative move in seconds, positive or negative.
    Skip(f64),
    SelectTrack(usize),
    ToggleRepeat,
}
