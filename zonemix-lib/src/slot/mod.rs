//! Playback slots.
//!
//! A slot is one physical output channel the mixer can assign a clip to. The
//! mixer never talks to an audio backend directly; everything it needs goes
//! through [`AudioSlot`].

use crate::clip::Clip;

mod virtual_slot;
#[cfg(feature = "output")]
mod sink;

pub use virtual_slot::VirtualSlot;
#[cfg(feature = "output")]
pub use sink::{open_output_stream_with_retry, probe_length, SinkSlot};

/// Backend seam for a single playback channel.
///
/// Semantics follow a typical game-engine audio source:
/// - assigning a clip stops the slot and rewinds it to 0,
/// - `play` starts from the current time (rewinding if the clip already
///   reached its end),
/// - `pause` keeps the time, `stop` rewinds to 0,
/// - a clip that plays to its end stops by itself and rewinds to 0.
pub trait AudioSlot {
    /// Currently assigned clip.
    fn clip(&self) -> Option<&Clip>;

    /// Assign (or clear) the clip.
    fn set_clip(&mut self, clip: Option<Clip>);

    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);

    /// Return true while audio is being produced.
    fn is_playing(&self) -> bool;

    /// Playback position in seconds.
    fn time(&self) -> f32;

    /// Seek to `time` seconds. Works on stopped and paused slots as well.
    fn set_time(&mut self, time: f32);

    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);

    /// Advance backend-side state by one frame.
    ///
    /// Real backends run on their own clock and can ignore this; simulated
    /// slots use it to move time forward.
    fn update(&mut self, _dt: f32) {}

    /// Seconds left in the assigned clip, or 0 without a clip.
    fn remaining(&self) -> f32 {
        self.clip()
            .map(|clip| clip.remaining(self.time()))
            .unwrap_or(0.0)
    }
}
