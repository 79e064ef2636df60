//! Dual-slot mixer engine.
//!
//! The mixer owns both playback slots and the zone stack. It knows how to
//! start, fade, cross-fade, and seek tracks, but never decides *which* track
//! plays or when; zones make those decisions through [`MixerControl`].
//!
//! Slot roles are tracked as two indices: `active` is the incoming (new)
//! track and `secondary` the outgoing one. Every transition swaps the
//! indices rather than copying slot contents.

mod fade;
mod stack;
mod types;

use log::{debug, error, info};

use crate::clip::Clip;
use crate::constants::SLOT_COUNT;
use crate::curve::FadeCurve;
use crate::diagnostics::{Timeline, Transition};
use crate::slot::AudioSlot;

pub use fade::{FadeStep, FadeTimer};
pub use stack::ZoneStack;
pub use types::{PlaybackState, SwitchType, ZoneId, ZoneSwitchType};

/// Engine operations available to zones.
///
/// Zones never touch slots directly. Every call either completes
/// synchronously or leaves continuation state for a later tick.
pub trait MixerControl {
    /// Start `clip` at `volume`, seeking to `resume_at` one tick later when
    /// it is positive.
    fn switch_track(&mut self, clip: &Clip, volume: f32, resume_at: f32) -> bool;

    /// Assign `clip` for a fade-in over `duration` seconds up to `volume`.
    fn fade_track(&mut self, clip: &Clip, duration: f32, volume: f32, resume_at: f32) -> bool;

    /// Assign `clip` for a cross-fade against the currently playing track.
    fn cross_fade_track(
        &mut self,
        clip: &Clip,
        duration: f32,
        curve: &FadeCurve,
        volume: f32,
    ) -> bool;

    /// Fade the playing track out over `duration` seconds.
    fn fade_out(&mut self, duration: f32, volume: f32);

    /// Pause every playing slot on behalf of `sender`.
    fn pause_sources(&mut self, sender: ZoneId) -> bool;

    /// Write the playback state on behalf of `sender`.
    fn set_state(&mut self, sender: ZoneId, state: PlaybackState) -> bool;

    fn set_switching(&mut self, value: bool);
    fn is_switching(&self) -> bool;

    /// Externally requested pause (mute zones, menus), as opposed to the
    /// `Paused` state used for gaps between tracks.
    fn is_paused(&self) -> bool;

    /// Position of the playing track in seconds, 0 when nothing plays.
    fn playback_time(&self) -> f32;

    /// Return true while any slot is playing.
    fn is_audible(&self) -> bool;
}

/// Seek staged for the tick after a slot started.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingResume {
    slot: usize,
    time: f32,
    volume: Option<f32>,
}

/// The mixer engine.
pub struct Mixer<S: AudioSlot> {
    slots: [S; SLOT_COUNT],
    active: Option<usize>,
    secondary: Option<usize>,
    state: PlaybackState,
    target_volume: f32,
    fade: FadeTimer,
    cross_fade: FadeTimer,
    cross_fade_curve: FadeCurve,
    pending_resume: Option<PendingResume>,
    switching: bool,
    paused: bool,
    stack: ZoneStack,
    clock: f32,
    timeline: Timeline,
}

impl<S: AudioSlot> Mixer<S> {
    /// Create an idle mixer around two slots.
    pub fn new(slots: [S; SLOT_COUNT]) -> Self {
        Self {
            slots,
            active: None,
            secondary: None,
            state: PlaybackState::Idle,
            target_volume: 1.0,
            fade: FadeTimer::default(),
            cross_fade: FadeTimer::default(),
            cross_fade_curve: FadeCurve::default(),
            pending_resume: None,
            switching: false,
            paused: false,
            stack: ZoneStack::new(),
            clock: 0.0,
            timeline: Timeline::default(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn stack(&self) -> &ZoneStack {
        &self.stack
    }

    pub(crate) fn stack_mut(&mut self) -> &mut ZoneStack {
        &mut self.stack
    }

    /// Zone on top of the stack, i.e. the zone driving playback decisions.
    pub fn current_zone(&self) -> Option<ZoneId> {
        self.stack.top()
    }

    pub fn slots(&self) -> &[S; SLOT_COUNT] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&S> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut S> {
        self.slots.get_mut(index)
    }

    /// Index of the slot carrying the incoming track.
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Index of the slot carrying the outgoing track.
    pub fn secondary_index(&self) -> Option<usize> {
        self.secondary
    }

    pub fn active_slot(&self) -> Option<&S> {
        self.active.map(|index| &self.slots[index])
    }

    pub fn secondary_slot(&self) -> Option<&S> {
        self.secondary.map(|index| &self.slots[index])
    }

    /// Volume the current fade or cross-fade is heading for.
    pub fn target_volume(&self) -> f32 {
        self.target_volume
    }

    pub fn fade_timer(&self) -> &FadeTimer {
        &self.fade
    }

    pub fn cross_fade_timer(&self) -> &FadeTimer {
        &self.cross_fade
    }

    /// Seconds of simulated time seen by [`Mixer::begin_frame`].
    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    /// Seconds left in the active slot's clip, 0 without one.
    pub fn active_remaining(&self) -> f32 {
        self.active_slot().map(|slot| slot.remaining()).unwrap_or(0.0)
    }

    pub fn active_is_playing(&self) -> bool {
        self.active_slot().map(|slot| slot.is_playing()).unwrap_or(false)
    }

    /// First playing slot, if any.
    pub fn playing_index(&self) -> Option<usize> {
        self.slots.iter().position(|slot| slot.is_playing())
    }

    fn unused_index(&self) -> Option<usize> {
        self.slots.iter().position(|slot| !slot.is_playing())
    }

    /// Apply a state change and record it in the timeline.
    pub(crate) fn apply_state(&mut self, state: PlaybackState) {
        self.timeline.record(Transition {
            time: self.clock,
            zone: self.stack.top(),
            from: self.state,
            to: state,
        });
        self.state = state;
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Advance the backends and land any seek staged on the previous tick.
    pub(crate) fn begin_frame(&mut self, dt: f32) {
        self.clock += dt.max(0.0);
        for slot in self.slots.iter_mut() {
            slot.update(dt);
        }
        self.apply_pending_resume();
    }

    fn apply_pending_resume(&mut self) {
        let Some(pending) = self.pending_resume.take() else {
            return;
        };
        let slot = &mut self.slots[pending.slot];
        slot.set_time(pending.time);
        if let Some(volume) = pending.volume {
            slot.set_volume(volume);
        }
        debug!("resumed slot {} at {:.2}s", pending.slot, pending.time);
    }

    /// Find a free slot and assign roles for a new track.
    ///
    /// If the active slot is idle it is simply replaced; otherwise it becomes
    /// the secondary (outgoing) slot and the free slot becomes active.
    fn switch_sources(&mut self) -> bool {
        let Some(unused) = self.unused_index() else {
            error!("unable to find a free slot to play into");
            return false;
        };

        let active_busy = self
            .active_slot()
            .map(|slot| slot.clip().is_some() && slot.is_playing())
            .unwrap_or(false);
        if !active_busy {
            debug!("nothing playing on the active slot; assigning slot {}", unused);
            self.active = Some(unused);
            return true;
        }

        self.secondary = self.active;
        self.active = Some(unused);
        debug!(
            "swapping slots: slot {} outgoing, slot {} incoming",
            self.secondary.unwrap_or(unused),
            unused
        );
        true
    }

    /// Assign `clip` to a free slot without starting it.
    ///
    /// Fails, leaving every slot untouched, when both slots are playing.
    pub fn play_track(&mut self, clip: &Clip) -> bool {
        if !self.switch_sources() {
            return false;
        }
        let Some(index) = self.active else {
            return false;
        };
        self.slots[index].set_clip(Some(clip.clone()));
        true
    }

    /// Return true if `sender` may mutate shared state: it must be the top of
    /// the stack or the zone directly beneath it.
    fn authorized(&self, sender: ZoneId) -> bool {
        self.stack.top() == Some(sender) || self.stack.below_top() == Some(sender)
    }

    /// Pause every playing slot regardless of the sender.
    pub(crate) fn pause_playing(&mut self) {
        for slot in self.slots.iter_mut().filter(|slot| slot.is_playing()) {
            slot.pause();
        }
    }

    /// Prepare slot roles for an engine-level pause.
    pub(crate) fn release_active(&mut self) -> bool {
        self.drop_outgoing();
        self.switch_sources()
    }

    /// Cancel an unfinished cross-fade: the outgoing slot stops at once and
    /// only the incoming track is left playing.
    fn drop_outgoing(&mut self) {
        if !self.slots.iter().all(|slot| slot.is_playing()) {
            return;
        }
        let outgoing = self
            .secondary
            .filter(|index| Some(*index) != self.active)
            .or_else(|| (0..SLOT_COUNT).find(|index| Some(*index) != self.active));
        if let Some(index) = outgoing {
            let slot = &mut self.slots[index];
            slot.set_volume(0.0);
            slot.stop();
            debug!("cancelled cross-fade, slot {} stopped", index);
        }
        self.cross_fade.reset();
    }

    /// Run one fade-in step on the active slot.
    ///
    /// # Returns
    ///
    /// `true` once the fade completed; the active slot then sits exactly at
    /// the target volume.
    pub(crate) fn do_fade_in(&mut self, dt: f32) -> bool {
        let Some(index) = self.active else {
            return true;
        };
        let slot = &mut self.slots[index];
        if !slot.is_playing() {
            slot.set_volume(0.0);
            let resume_time = slot.time();
            slot.play();
            slot.set_time(resume_time);
            self.fade.reset();
        }

        match self.fade.step(dt) {
            FadeStep::Running(alpha) => {
                slot.set_volume(lerp(0.0, self.target_volume, alpha));
                false
            }
            FadeStep::Finished => {
                slot.set_volume(self.target_volume);
                self.fade.reset();
                true
            }
        }
    }

    /// Run one fade-out step on the secondary slot, stopping it at the end.
    pub(crate) fn do_fade_out(&mut self, dt: f32) -> bool {
        let Some(index) = self.secondary else {
            self.fade.reset();
            return true;
        };
        let slot = &mut self.slots[index];
        match self.fade.step(dt) {
            FadeStep::Running(alpha) => {
                slot.set_volume(lerp(self.target_volume, 0.0, alpha));
                false
            }
            FadeStep::Finished => {
                slot.set_volume(0.0);
                slot.stop();
                self.fade.reset();
                true
            }
        }
    }

    /// Run one cross-fade step, weighting the slots through the curve.
    pub(crate) fn do_cross_fade(&mut self, dt: f32) -> bool {
        let Some(active) = self.active else {
            return true;
        };
        if !self.slots[active].is_playing() {
            self.slots[active].set_volume(0.0);
            self.slots[active].play();
            self.cross_fade.reset();
        }

        match self.cross_fade.step(dt) {
            FadeStep::Running(alpha) => {
                let weight = self.cross_fade_curve.evaluate(alpha);
                self.slots[active].set_volume(lerp(0.0, self.target_volume, weight));
                if let Some(secondary) = self.secondary {
                    self.slots[secondary].set_volume(lerp(self.target_volume, 0.0, weight));
                }
                false
            }
            FadeStep::Finished => {
                self.slots[active].set_volume(self.target_volume);
                if let Some(secondary) = self.secondary {
                    self.slots[secondary].set_volume(0.0);
                    self.slots[secondary].stop();
                }
                self.cross_fade.reset();
                true
            }
        }
    }

    /// Seconds left on the outgoing slot while it is still audible.
    pub(crate) fn outgoing_remaining(&self) -> Option<f32> {
        self.secondary_slot()
            .filter(|slot| slot.is_playing())
            .map(|slot| slot.remaining())
    }

    /// Turn an in-flight fade-out back into a fade-in on the same track.
    ///
    /// The slot roles swap back and the fade timer jumps to the point that
    /// matches the slot's current volume, so the level keeps rising from
    /// where it is.
    pub(crate) fn splice_fade_in(&mut self) {
        std::mem::swap(&mut self.active, &mut self.secondary);
        let volume = self.active_slot().map(|slot| slot.volume()).unwrap_or(0.0);
        let progress = if self.target_volume > 0.0 {
            volume / self.target_volume
        } else {
            1.0
        };
        self.fade.seek_progress(progress);
        self.apply_state(PlaybackState::FadeIn);
    }
}

impl<S: AudioSlot> MixerControl for Mixer<S> {
    fn switch_track(&mut self, clip: &Clip, volume: f32, resume_at: f32) -> bool {
        if !self.play_track(clip) {
            return false;
        }
        let Some(index) = self.active else {
            return false;
        };
        let slot = &mut self.slots[index];
        slot.play();

        // Seeking a slot on the tick it starts is unreliable; hold the
        // volume at 0 until the seek lands.
        if resume_at > 0.0 {
            slot.set_volume(0.0);
            self.pending_resume = Some(PendingResume {
                slot: index,
                time: resume_at,
                volume: Some(volume),
            });
        } else {
            slot.set_volume(volume);
        }
        info!("switched to '{}' (volume {:.2}, resume {:.2}s)", clip.name, volume, resume_at);
        true
    }

    fn fade_track(&mut self, clip: &Clip, duration: f32, volume: f32, resume_at: f32) -> bool {
        if !self.play_track(clip) {
            return false;
        }
        self.fade.restart(duration);
        self.target_volume = volume;
        if resume_at > 0.0 {
            if let Some(index) = self.active {
                self.pending_resume = Some(PendingResume {
                    slot: index,
                    time: resume_at,
                    volume: None,
                });
            }
        }
        info!(
            "fading in '{}' over {:.2}s to volume {:.2} at {:.2}s",
            clip.name, duration, volume, resume_at
        );
        true
    }

    fn cross_fade_track(
        &mut self,
        clip: &Clip,
        duration: f32,
        curve: &FadeCurve,
        volume: f32,
    ) -> bool {
        if !self.play_track(clip) {
            return false;
        }
        self.cross_fade.restart(duration);
        self.cross_fade_curve = curve.clone();
        self.target_volume = volume;
        info!("cross-fading to '{}' over {:.2}s", clip.name, duration);
        true
    }

    fn fade_out(&mut self, duration: f32, volume: f32) {
        self.drop_outgoing();
        if self.active_is_playing() {
            self.switch_sources();
        }
        self.target_volume = volume;
        self.fade.restart(duration);
        let current = self.secondary_slot().map(|slot| slot.volume()).unwrap_or(0.0);
        let progress = if volume > 0.0 { 1.0 - current / volume } else { 1.0 };
        self.fade.seek_progress(progress);
        self.apply_state(PlaybackState::FadeOut);
        debug!("fading out over {:.2}s from volume {:.2}", duration, current);
    }

    fn pause_sources(&mut self, sender: ZoneId) -> bool {
        if !self.authorized(sender) {
            error!(
                "rejected pause request from zone {}: not the current or previous zone",
                sender
            );
            return false;
        }
        debug!("pausing slots for zone {}", sender);
        self.drop_outgoing();
        self.pause_playing();
        true
    }

    fn set_state(&mut self, sender: ZoneId, state: PlaybackState) -> bool {
        if !self.authorized(sender) {
            error!(
                "rejected state change to {:?} from zone {}: not the current or previous zone",
                state, sender
            );
            return false;
        }
        debug!("zone {} set state {:?}", sender, state);
        self.apply_state(state);
        true
    }

    fn set_switching(&mut self, value: bool) {
        self.switching = value;
    }

    fn is_switching(&self) -> bool {
        self.switching
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn playback_time(&self) -> f32 {
        self.active
            .filter(|index| self.slots[*index].is_playing())
            .or_else(|| self.playing_index())
            .map(|index| self.slots[index].time())
            .unwrap_or(0.0)
    }

    fn is_audible(&self) -> bool {
        self.playing_index().is_some()
    }
}

fn lerp(from: f32, to: f32, alpha: f32) -> f32 {
    from + (to - from) * alpha.clamp(0.0, 1.0)
}
