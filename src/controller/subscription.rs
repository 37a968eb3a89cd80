use crate::engine::{EngineEvent, LoadCycle};

/// Interest in the events of exactly one load cycle.
///
/// Replacing the controller's subscription detaches the previous cycle: its
/// events no longer match and are dropped. `CanPlayThrough` is armed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Subscription {
    cycle: LoadCycle,
    can_play_through_armed: bool,
}

impl Subscription {
    pub(super) fn attach(cycle: LoadCycle) -> Self {
        Self {
            cycle,
            can_play_through_armed: true,
        }
    }

    pub(super) fn cycle(&self) -> LoadCycle {
        self.cycle
    }

    pub(super) fn owns(&self, event: &EngineEvent) -> bool {
        event.cycle == self.cycle
    }

    /// Returns `true` the first time only.
    pub(super) fn take_can_play_through(&mut self) -> bool {
        std::mem::replace(&mut self.can_play_through_armed, false)
    }
}
