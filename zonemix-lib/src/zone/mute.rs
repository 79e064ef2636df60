//! Mute zones: areas that pause the music while the listener is inside.

use serde::{Deserialize, Serialize};

use super::debounce::{ExitAction, StayDebounce};
use crate::constants::DEFAULT_MUTE_STAY_DELAY;

/// Handle of a mute zone registered with a [`crate::system::MusicSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MuteZoneId(usize);

impl MuteZoneId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// How a mute zone behaves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MuteSettings {
    /// Seconds the listener must stay inside before the music pauses, and
    /// the delay before it resumes after leaving.
    pub stay_delay: f32,
    /// Cut the music instead of following the current zone's switch-out.
    pub hard_pause: bool,
}

impl Default for MuteSettings {
    fn default() -> Self {
        Self {
            stay_delay: DEFAULT_MUTE_STAY_DELAY,
            hard_pause: false,
        }
    }
}

/// A registered mute zone and its listener state.
#[derive(Debug, Clone)]
pub struct MuteZone {
    id: MuteZoneId,
    name: String,
    settings: MuteSettings,
    engaged: bool,
    debounce: StayDebounce,
}

impl MuteZone {
    pub fn new(id: MuteZoneId, name: impl Into<String>, settings: MuteSettings) -> Self {
        Self {
            id,
            name: name.into(),
            settings,
            engaged: false,
            debounce: StayDebounce::new(settings.stay_delay),
        }
    }

    pub fn id(&self) -> MuteZoneId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> MuteSettings {
        self.settings
    }

    /// Return true while this zone holds the music paused.
    pub fn engaged(&self) -> bool {
        self.engaged
    }

    /// Returns true when the music should pause right away.
    pub(crate) fn enter(&mut self, now: f32) -> bool {
        self.debounce.enter(now) && !self.engaged
    }

    /// Returns true once the stay delay has been reached.
    pub(crate) fn stay(&mut self, dt: f32) -> bool {
        self.debounce.stay(dt, self.engaged)
    }

    /// Returns true when the music should resume right away.
    pub(crate) fn exit(&mut self, now: f32) -> bool {
        match self.debounce.exit(now, self.engaged) {
            ExitAction::Immediate => {
                self.engaged = false;
                true
            }
            ExitAction::Deferred | ExitAction::Ignore => false,
        }
    }

    /// Returns true when the delayed resume fires. A listener that came back
    /// within the delay keeps the zone engaged.
    pub(crate) fn fire(&mut self, now: f32) -> bool {
        if self.engaged && self.debounce.fire(now) {
            self.engaged = false;
            return true;
        }
        false
    }

    pub(crate) fn set_engaged(&mut self, engaged: bool) {
        self.engaged = engaged;
    }
}
