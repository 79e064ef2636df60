//! Shared constants for scheduling and playback defaults.

/// Extra lead time (seconds) added to a zone's transition duration when
/// deciding how far before a track's end the scheduler must act.
pub const END_THRESHOLD_PADDING: f32 = 0.1;

/// Number of addressable playback slots owned by the mixer.
pub const SLOT_COUNT: usize = 2;

/// Default zone volume.
pub const DEFAULT_VOLUME: f32 = 1.0;

/// Default static pause between tracks (seconds).
pub const DEFAULT_STATIC_PAUSE: f32 = 5.0;

/// Default upper bound for randomized pauses (seconds).
pub const DEFAULT_RANDOM_PAUSE_MAX: f32 = 30.0;

/// Default long break duration (seconds).
pub const DEFAULT_LONG_BREAK: f32 = 120.0;

/// Default time a listener must stay inside a local zone (seconds).
pub const DEFAULT_STAY_DELAY: f32 = 5.0;

/// Default time a listener must stay inside a mute zone (seconds).
pub const DEFAULT_MUTE_STAY_DELAY: f32 = 1.0;
