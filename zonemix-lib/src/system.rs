//! The music system: one mixer, every registered zone, and the frame tick.

use log::{debug, info};

use crate::clip::Clip;
use crate::constants::SLOT_COUNT;
use crate::curve::FadeCurve;
use crate::diagnostics::Timeline;
use crate::mixer::{Mixer, MixerControl, PlaybackState, ZoneId, ZoneSwitchType};
use crate::slot::AudioSlot;
use crate::zone::{ExitAction, MuteSettings, MuteZone, MuteZoneId, Playlist, ZoneKind, ZoneSettings};

/// Owns the mixer and all zones, and runs the per-frame state machine.
///
/// Zones are registered once and addressed by [`ZoneId`]. The zone on top of
/// the mixer's stack decides what happens on each tick.
pub struct MusicSystem<S: AudioSlot> {
    mixer: Mixer<S>,
    zones: Vec<Playlist>,
    inside: Vec<bool>,
    mutes: Vec<MuteZone>,
    inside_mute: Vec<bool>,
}

impl<S: AudioSlot> MusicSystem<S> {
    pub fn new(slots: [S; SLOT_COUNT]) -> Self {
        Self {
            mixer: Mixer::new(slots),
            zones: Vec::new(),
            inside: Vec::new(),
            mutes: Vec::new(),
            inside_mute: Vec::new(),
        }
    }

    /// Register a zone and return its handle.
    pub fn add_zone(
        &mut self,
        name: impl Into<String>,
        kind: ZoneKind,
        settings: ZoneSettings,
        seed: Option<u64>,
    ) -> ZoneId {
        let id = ZoneId::new(self.zones.len());
        self.zones.push(Playlist::new(id, name, kind, settings, seed));
        self.inside.push(false);
        id
    }

    /// Register a mute zone and return its handle.
    pub fn add_mute_zone(&mut self, name: impl Into<String>, settings: MuteSettings) -> MuteZoneId {
        let id = MuteZoneId::new(self.mutes.len());
        self.mutes.push(MuteZone::new(id, name, settings));
        self.inside_mute.push(false);
        id
    }

    pub fn mute_zone(&self, id: MuteZoneId) -> Option<&MuteZone> {
        self.mutes.get(id.index())
    }

    pub fn mute_zones(&self) -> &[MuteZone] {
        &self.mutes
    }

    pub fn mute_zone_id(&self, name: &str) -> Option<MuteZoneId> {
        self.mutes.iter().find(|zone| zone.name() == name).map(MuteZone::id)
    }

    pub fn is_inside_mute(&self, id: MuteZoneId) -> bool {
        self.inside_mute.get(id.index()).copied().unwrap_or(false)
    }

    pub fn mixer(&self) -> &Mixer<S> {
        &self.mixer
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Playlist> {
        self.zones.get(id.index())
    }

    pub fn zones(&self) -> &[Playlist] {
        &self.zones
    }

    /// Look up a zone handle by name.
    pub fn zone_id(&self, name: &str) -> Option<ZoneId> {
        self.zones.iter().find(|zone| zone.name() == name).map(Playlist::id)
    }

    pub fn state(&self) -> PlaybackState {
        self.mixer.state()
    }

    pub fn current_zone(&self) -> Option<ZoneId> {
        self.mixer.current_zone()
    }

    pub fn is_paused(&self) -> bool {
        self.mixer.is_paused()
    }

    pub fn timeline(&self) -> &Timeline {
        self.mixer.timeline()
    }

    /// Whether the listener is currently inside `id`.
    pub fn is_inside(&self, id: ZoneId) -> bool {
        self.inside.get(id.index()).copied().unwrap_or(false)
    }

    /// Activate every global zone configured to auto-play, in registration
    /// order.
    pub fn start(&mut self) {
        let auto: Vec<ZoneId> = self
            .zones
            .iter()
            .filter(|zone| matches!(zone.kind(), ZoneKind::Global { auto_play: true }))
            .map(Playlist::id)
            .collect();
        for id in auto {
            self.switch_zone(id);
        }
    }

    /// Make `id` the current zone.
    ///
    /// # Returns
    ///
    /// `false` when the zone is unknown or already on the stack.
    pub fn switch_zone(&mut self, id: ZoneId) -> bool {
        let Some(zone) = self.zones.get_mut(id.index()) else {
            return false;
        };

        if self.mixer.stack().is_empty() {
            info!("no current zone, switching to '{}'", zone.name());
            zone.activate();
            self.mixer.stack_mut().push(id);
            // still fading out after passing through an empty area
            if self.mixer.state() == PlaybackState::FadeOut {
                debug!("fade-out in progress, '{}' waits for it", zone.name());
                return true;
            }
            zone.engage(&mut self.mixer);
            return true;
        }

        if self.mixer.stack().contains(id) {
            debug!("zone '{}' is already on the stack", zone.name());
            return false;
        }

        info!("switching to zone '{}'", zone.name());
        zone.activate();
        if let Some(top) = self.mixer.current_zone() {
            self.zones[top.index()].disengage(&mut self.mixer);
        }
        self.mixer.stack_mut().push(id);
        true
    }

    /// Pop the current zone and return control to the one beneath it.
    ///
    /// If the zone beneath is still fading out because the popped zone never
    /// took over, its track fades back in where it is instead of restarting.
    pub fn switch_zone_back(&mut self) -> bool {
        let Some(top) = self.mixer.current_zone() else {
            return false;
        };

        if let Some(below) = self.splice_candidate(top) {
            self.mixer.stack_mut().pop();
            self.mixer.splice_fade_in();
            let zone = &mut self.zones[below.index()];
            zone.engage(&mut self.mixer);
            zone.clear_playback_time();
            info!("zone '{}' still fading out, fading back in", zone.name());
            return true;
        }

        self.zones[top.index()].disengage(&mut self.mixer);
        self.mixer.stack_mut().pop();

        match self.mixer.current_zone() {
            Some(current) => {
                debug!("back to zone '{}'", self.zones[current.index()].name());
            }
            None => {
                info!("no zones left, idling");
                if self.mixer.state() != PlaybackState::FadeOut {
                    self.mixer.apply_state(PlaybackState::Idle);
                }
            }
        }
        true
    }

    fn splice_candidate(&self, top: ZoneId) -> Option<ZoneId> {
        if self.mixer.state() != PlaybackState::FadeOut || self.zones[top.index()].engaged() {
            return None;
        }
        let below = self.mixer.stack().below_top()?;
        let remaining = self.mixer.outgoing_remaining()?;
        (remaining >= self.zones[below.index()].end_threshold()).then_some(below)
    }

    /// Leave `id` wherever it sits on the stack.
    pub fn leave_zone(&mut self, id: ZoneId) -> bool {
        if self.mixer.current_zone() == Some(id) {
            return self.switch_zone_back();
        }
        self.mixer.stack_mut().remove(id)
    }

    /// Pause playback, honoring the current zone's switch-out style.
    pub fn pause(&mut self) {
        let Some(top) = self.mixer.current_zone() else {
            return;
        };
        if self.mixer.is_paused() {
            return;
        }
        self.mixer.set_paused(true);

        let zone = &mut self.zones[top.index()];
        zone.save_playback_time(&self.mixer);
        zone.reset_wait();
        let switch_out = zone.settings().switch_out;
        let volume = zone.settings().volume;
        info!("pausing zone '{}'", zone.name());

        match switch_out.kind {
            ZoneSwitchType::Fade => self.mixer.fade_out(switch_out.fade_time, volume),
            ZoneSwitchType::Cut => {
                self.mixer.release_active();
                self.mixer.pause_playing();
                self.mixer.apply_state(PlaybackState::Paused);
            }
        }
    }

    /// Pause immediately, whatever the zone's switch-out style.
    pub fn hard_pause(&mut self) {
        let Some(top) = self.mixer.current_zone() else {
            return;
        };
        let zone = &mut self.zones[top.index()];
        if !self.mixer.is_paused() {
            zone.save_playback_time(&self.mixer);
        }
        zone.reset_wait();
        info!("hard pausing zone '{}'", zone.name());
        self.mixer.set_paused(true);
        self.mixer.pause_playing();
        self.mixer.apply_state(PlaybackState::Paused);
    }

    /// Clear the pause flag. Playback resumes on the next tick.
    pub fn unpause(&mut self) {
        if self.mixer.current_zone().is_none() || !self.mixer.is_paused() {
            return;
        }
        info!("unpausing");
        self.mixer.set_paused(false);
    }

    /// The listener entered `id`.
    pub fn enter_zone(&mut self, id: ZoneId) {
        let now = self.mixer.clock();
        let Some(zone) = self.zones.get_mut(id.index()) else {
            return;
        };
        self.inside[id.index()] = true;
        if zone.kind().is_global() || zone.debounce_mut().enter(now) {
            debug!("listener entered '{}', switching", zone.name());
            self.switch_zone(id);
        } else {
            debug!("listener entered '{}', waiting stay time", zone.name());
        }
    }

    /// The listener stayed inside `id` for another `dt` seconds.
    pub fn stay_in_zone(&mut self, id: ZoneId, dt: f32) {
        let active = self.mixer.stack().contains(id);
        let Some(zone) = self.zones.get_mut(id.index()) else {
            return;
        };
        if zone.kind().is_global() {
            return;
        }
        if zone.debounce_mut().stay(dt, active) {
            info!("stay time in '{}' reached, switching", zone.name());
            self.switch_zone(id);
        }
    }

    /// The listener left `id`.
    pub fn exit_zone(&mut self, id: ZoneId) {
        let now = self.mixer.clock();
        let active = self.mixer.stack().contains(id);
        let Some(zone) = self.zones.get_mut(id.index()) else {
            return;
        };
        self.inside[id.index()] = false;
        if zone.kind().is_global() {
            if active {
                self.leave_zone(id);
            }
            return;
        }
        match zone.debounce_mut().exit(now, active) {
            ExitAction::Immediate => {
                debug!("listener left '{}', switching back", zone.name());
                self.leave_zone(id);
            }
            ExitAction::Deferred => {
                debug!("listener left '{}', switching back later", zone.name());
            }
            ExitAction::Ignore => {}
        }
    }

    /// The listener entered mute zone `id`.
    pub fn enter_mute_zone(&mut self, id: MuteZoneId) {
        let now = self.mixer.clock();
        let Some(zone) = self.mutes.get_mut(id.index()) else {
            return;
        };
        self.inside_mute[id.index()] = true;
        if zone.enter(now) {
            debug!("listener entered mute zone '{}', pausing", zone.name());
            self.mute(id);
        } else {
            debug!("listener entered mute zone '{}', waiting stay time", zone.name());
        }
    }

    /// The listener stayed inside mute zone `id` for another `dt` seconds.
    pub fn stay_in_mute_zone(&mut self, id: MuteZoneId, dt: f32) {
        let Some(zone) = self.mutes.get_mut(id.index()) else {
            return;
        };
        if zone.stay(dt) {
            info!("stay time in mute zone '{}' reached, pausing", zone.name());
            self.mute(id);
        }
    }

    /// The listener left mute zone `id`.
    pub fn exit_mute_zone(&mut self, id: MuteZoneId) {
        let now = self.mixer.clock();
        let Some(zone) = self.mutes.get_mut(id.index()) else {
            return;
        };
        self.inside_mute[id.index()] = false;
        if zone.exit(now) {
            debug!("listener left mute zone '{}', unpausing", zone.name());
            self.unmute();
        }
    }

    fn mute(&mut self, id: MuteZoneId) {
        let Some(zone) = self.mutes.get_mut(id.index()) else {
            return;
        };
        zone.set_engaged(true);
        if zone.settings().hard_pause {
            self.hard_pause();
        } else {
            self.pause();
        }
    }

    /// Resume unless another mute zone still holds the pause.
    fn unmute(&mut self) {
        if self.mutes.iter().any(MuteZone::engaged) {
            debug!("another mute zone is still engaged");
            return;
        }
        self.unpause();
    }

    fn poll_listener(&mut self, dt: f32) {
        for index in 0..self.mutes.len() {
            let id = MuteZoneId::new(index);
            if self.inside_mute[index] {
                self.stay_in_mute_zone(id, dt);
            }
            let now = self.mixer.clock();
            if self.mutes[index].fire(now) {
                info!("unpausing after mute zone '{}'", self.mutes[index].name());
                self.unmute();
            }
        }

        for index in 0..self.zones.len() {
            let id = ZoneId::new(index);
            if self.inside[index] {
                self.stay_in_zone(id, dt);
            }
            let now = self.mixer.clock();
            if self.zones[index].debounce_mut().fire(now) && self.mixer.stack().contains(id) {
                info!("switching back from '{}'", self.zones[index].name());
                self.leave_zone(id);
            }
        }
    }

    /// Advance by one frame of `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.mixer.begin_frame(dt);
        self.poll_listener(dt);

        let Some(top) = self.mixer.current_zone() else {
            if self.mixer.state() == PlaybackState::FadeOut && self.mixer.do_fade_out(dt) {
                self.mixer.apply_state(PlaybackState::Idle);
            }
            return;
        };

        let zone = &mut self.zones[top.index()];
        let mixer = &mut self.mixer;
        let state = mixer.state();
        let next = match state {
            PlaybackState::Idle => zone.handle_idle(mixer),
            PlaybackState::Paused => zone.handle_pause(mixer, dt, state),
            PlaybackState::FadeIn => {
                if mixer.do_fade_in(dt) {
                    zone.handle_faded_in(state)
                } else {
                    state
                }
            }
            PlaybackState::FadeOut => {
                if mixer.do_fade_out(dt) {
                    zone.handle_faded_out(mixer, state)
                } else {
                    state
                }
            }
            PlaybackState::CrossFade => {
                if mixer.do_cross_fade(dt) {
                    zone.handle_cross_faded(state)
                } else {
                    state
                }
            }
            PlaybackState::Playing => {
                let ending = !mixer.active_is_playing()
                    || mixer.active_remaining() <= zone.end_threshold();
                if ending {
                    let next = zone.handle_track_ending(mixer, state);
                    debug!("track ending, next state {:?}", next);
                    next
                } else {
                    state
                }
            }
            PlaybackState::TrackEnding => {
                if mixer.active_is_playing() {
                    state
                } else {
                    let next = zone.handle_track_ended(mixer, state);
                    debug!("track ended, next state {:?}", next);
                    next
                }
            }
        };
        mixer.apply_state(next);
    }

    /// Assign `clip` to a free slot without starting it.
    pub fn play_track(&mut self, clip: &Clip) -> bool {
        self.mixer.play_track(clip)
    }

    pub fn switch_track(&mut self, clip: &Clip, volume: f32, resume_at: f32) -> bool {
        self.mixer.switch_track(clip, volume, resume_at)
    }

    pub fn fade_track(&mut self, clip: &Clip, duration: f32, volume: f32, resume_at: f32) -> bool {
        self.mixer.fade_track(clip, duration, volume, resume_at)
    }

    pub fn cross_fade_track(
        &mut self,
        clip: &Clip,
        duration: f32,
        curve: &FadeCurve,
        volume: f32,
    ) -> bool {
        self.mixer.cross_fade_track(clip, duration, curve, volume)
    }

    /// Write the playback state on behalf of `sender`.
    pub fn set_state(&mut self, sender: ZoneId, state: PlaybackState) -> bool {
        self.mixer.set_state(sender, state)
    }
}
