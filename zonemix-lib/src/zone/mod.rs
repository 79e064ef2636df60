//! Zones: per-area playlists and the decisions they make for the mixer.
//!
//! Every handler receives the current [`PlaybackState`] and returns the next
//! one. The mixer never picks tracks or pause lengths itself; it asks the
//! zone on top of the stack and stores whatever comes back. A handler whose
//! mixer call fails returns the state it was given so the same decision is
//! retried on a later tick.

mod debounce;
mod mute;
mod schedule;
mod settings;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::clip::Clip;
use crate::mixer::{MixerControl, PlaybackState, SwitchType, ZoneId, ZoneSwitchType};

pub use debounce::{ExitAction, StayDebounce};
pub use mute::{MuteSettings, MuteZone, MuteZoneId};
pub use schedule::{shuffle_in_place, TrackSchedule};
pub use settings::{LongBreak, PauseCadence, ZoneKind, ZoneSettings, ZoneSwitch};

/// Inter-track wait.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Wait {
    elapsed: f32,
    wait_for: f32,
}

impl Wait {
    fn start(seconds: f32) -> Self {
        Self {
            elapsed: 0.0,
            wait_for: seconds,
        }
    }

    fn done(&self) -> bool {
        self.elapsed >= self.wait_for
    }
}

/// How a fresh or resumed track gets started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    /// Regular scheduling inside the zone.
    Transition,
    /// First track after taking over from another zone.
    SwitchIn,
}

/// A zone's playlist and scheduling state.
pub struct Playlist {
    id: ZoneId,
    name: String,
    kind: ZoneKind,
    settings: ZoneSettings,
    schedule: TrackSchedule,
    initialized: bool,
    total_tracks_played: u32,
    current_track: Option<usize>,
    engaged: bool,
    wait: Wait,
    playback_time: f32,
    rng: StdRng,
    debounce: StayDebounce,
}

impl Playlist {
    /// Create a zone. A `seed` makes shuffling and randomized pauses
    /// reproducible.
    pub fn new(
        id: ZoneId,
        name: impl Into<String>,
        kind: ZoneKind,
        settings: ZoneSettings,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            id,
            name: name.into(),
            kind,
            schedule: TrackSchedule::new(settings.tracks.len()),
            settings,
            initialized: false,
            total_tracks_played: 0,
            current_track: None,
            engaged: false,
            wait: Wait::default(),
            playback_time: 0.0,
            rng,
            debounce: StayDebounce::new(kind.stay_delay()),
        }
    }

    pub fn id(&self) -> ZoneId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ZoneKind {
        self.kind
    }

    pub fn settings(&self) -> &ZoneSettings {
        &self.settings
    }

    pub fn schedule(&self) -> &TrackSchedule {
        &self.schedule
    }

    pub fn engaged(&self) -> bool {
        self.engaged
    }

    pub fn total_tracks_played(&self) -> u32 {
        self.total_tracks_played
    }

    /// Saved resume offset in seconds, 0 when nothing is saved.
    pub fn playback_time(&self) -> f32 {
        self.playback_time
    }

    /// Track currently (or most recently) started by this zone.
    pub fn current_track(&self) -> Option<&Clip> {
        self.current_track.and_then(|index| self.settings.tracks.get(index))
    }

    pub fn end_threshold(&self) -> f32 {
        self.settings.end_threshold()
    }

    pub(crate) fn debounce_mut(&mut self) -> &mut StayDebounce {
        &mut self.debounce
    }

    /// Prepare the play order on first activation.
    pub(crate) fn activate(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        if self.settings.shuffle {
            self.schedule.shuffle(&mut self.rng);
        }
        debug!("zone '{}': order {:?}", self.name, self.schedule.order());
    }

    pub(crate) fn reset_wait(&mut self) {
        self.wait = Wait::default();
    }

    pub(crate) fn clear_playback_time(&mut self) {
        self.playback_time = 0.0;
    }

    /// Mark the zone as owning audible output.
    pub fn engage(&mut self, mixer: &mut dyn MixerControl) {
        info!("zone '{}': engaged", self.name);
        self.engaged = true;
        self.wait = Wait::default();
        mixer.set_switching(false);
    }

    /// Hand output over to whichever zone becomes current next.
    pub fn disengage(&mut self, mixer: &mut dyn MixerControl) {
        self.save_playback_time(mixer);
        self.engaged = false;
        mixer.set_switching(true);
        if self.settings.long_break.reset_on_switch_out {
            self.total_tracks_played = 0;
        }
        info!(
            "zone '{}': disengaged, playback time {:.2}s",
            self.name, self.playback_time
        );

        match self.settings.switch_out.kind {
            ZoneSwitchType::Fade => {
                mixer.fade_out(self.settings.switch_out.fade_time, self.settings.volume);
            }
            ZoneSwitchType::Cut => {
                debug!("zone '{}': cutting", self.name);
                mixer.pause_sources(self.id);
                mixer.set_state(self.id, PlaybackState::Paused);
            }
        }
    }

    /// Remember where playback will be once the switch-out completes.
    ///
    /// Only an engaged zone owns the playing track, so nothing is saved
    /// otherwise. Between tracks nothing is audible and the offset is cleared,
    /// so the finished track is not picked up again.
    pub fn save_playback_time(&mut self, mixer: &dyn MixerControl) {
        if !self.engaged {
            return;
        }
        self.playback_time = if mixer.is_audible() {
            mixer.playback_time() + self.settings.switch_out.effective_fade()
        } else {
            0.0
        };
    }

    pub fn handle_idle(&mut self, mixer: &mut dyn MixerControl) -> PlaybackState {
        self.handle_unpause(mixer, PlaybackState::Idle)
    }

    /// Count down the inter-track wait.
    pub fn handle_pause(
        &mut self,
        mixer: &mut dyn MixerControl,
        dt: f32,
        current: PlaybackState,
    ) -> PlaybackState {
        if mixer.is_paused() {
            return current;
        }
        if mixer.is_switching() {
            return self.start_track(mixer, current, Entry::SwitchIn);
        }
        self.wait.elapsed += dt.max(0.0);
        if self.wait.done() {
            return self.handle_unpause(mixer, current);
        }
        current
    }

    /// Resume the interrupted track if enough of it is left, or start the
    /// next one.
    pub fn handle_unpause(
        &mut self,
        mixer: &mut dyn MixerControl,
        current: PlaybackState,
    ) -> PlaybackState {
        debug!("zone '{}': unpausing", self.name);
        if mixer.is_switching() {
            return self.start_track(mixer, current, Entry::SwitchIn);
        }
        self.start_track(mixer, current, Entry::Transition)
    }

    pub fn handle_switch_in(
        &mut self,
        mixer: &mut dyn MixerControl,
        current: PlaybackState,
    ) -> PlaybackState {
        self.start_track(mixer, current, Entry::SwitchIn)
    }

    /// The playing track reached the end threshold.
    pub fn handle_track_ending(
        &mut self,
        mixer: &mut dyn MixerControl,
        current: PlaybackState,
    ) -> PlaybackState {
        debug!("zone '{}': track ending", self.name);
        match self.settings.transition {
            SwitchType::Fade => {
                mixer.fade_out(self.settings.fade_time, self.settings.volume);
                PlaybackState::FadeOut
            }
            SwitchType::CrossFade => {
                if self.long_break_due() {
                    // keep the break silent
                    mixer.fade_out(self.settings.cross_fade_time, self.settings.volume);
                    return PlaybackState::FadeOut;
                }
                let Some(track) = self.schedule.next_track(self.settings.shuffle, &mut self.rng)
                else {
                    return current;
                };
                let clip = &self.settings.tracks[track];
                if mixer.cross_fade_track(
                    clip,
                    self.settings.cross_fade_time,
                    &self.settings.cross_fade_curve,
                    self.settings.volume,
                ) {
                    self.commit_fresh(track);
                    return PlaybackState::CrossFade;
                }
                current
            }
            SwitchType::Cut => PlaybackState::TrackEnding,
        }
    }

    /// The playing track stopped. Decide between waiting and the next track.
    pub fn handle_track_ended(
        &mut self,
        mixer: &mut dyn MixerControl,
        current: PlaybackState,
    ) -> PlaybackState {
        debug!("zone '{}': track ended", self.name);
        if mixer.is_paused() {
            self.wait = Wait::default();
            return PlaybackState::Paused;
        }
        if mixer.is_switching() {
            return self.start_track(mixer, current, Entry::SwitchIn);
        }

        let wait_for = if self.long_break_due() {
            info!(
                "zone '{}': long break for {:.2}s",
                self.name, self.settings.long_break.duration
            );
            self.settings.long_break.duration
        } else {
            self.settings.pause.sample(&mut self.rng)
        };
        if wait_for > 0.0 {
            debug!("zone '{}': pausing for {:.2}s", self.name, wait_for);
            self.wait = Wait::start(wait_for);
            return PlaybackState::Paused;
        }
        self.start_track(mixer, current, Entry::Transition)
    }

    pub fn handle_faded_in(&mut self, _current: PlaybackState) -> PlaybackState {
        debug!("zone '{}': fade-in finished", self.name);
        PlaybackState::Playing
    }

    pub fn handle_faded_out(
        &mut self,
        mixer: &mut dyn MixerControl,
        current: PlaybackState,
    ) -> PlaybackState {
        debug!("zone '{}': fade-out finished", self.name);
        self.handle_track_ended(mixer, current)
    }

    pub fn handle_cross_faded(&mut self, _current: PlaybackState) -> PlaybackState {
        debug!("zone '{}': cross-fade finished", self.name);
        PlaybackState::Playing
    }

    /// Seconds of the pending inter-track wait left, `None` outside a wait.
    pub fn wait_remaining(&self) -> Option<f32> {
        (self.wait.wait_for > 0.0 && !self.wait.done())
            .then(|| self.wait.wait_for - self.wait.elapsed)
    }

    fn long_break_due(&self) -> bool {
        self.settings.long_break.is_due(self.total_tracks_played)
    }

    /// The interrupted track, when the saved offset leaves room for both the
    /// switch-in fade and the end threshold.
    fn resumable_track(&self) -> Option<usize> {
        if self.playback_time <= 0.0 {
            return None;
        }
        let index = self.current_track?;
        let remaining = self.settings.tracks.get(index)?.remaining(self.playback_time);
        (remaining > self.settings.switch_in.effective_fade() && remaining > self.end_threshold())
            .then_some(index)
    }

    fn start_track(
        &mut self,
        mixer: &mut dyn MixerControl,
        current: PlaybackState,
        entry: Entry,
    ) -> PlaybackState {
        let resumed = self.resumable_track();
        let (track, resume_at) = match resumed {
            Some(track) => (track, self.playback_time),
            None => match self.schedule.next_track(self.settings.shuffle, &mut self.rng) {
                Some(track) => (track, 0.0),
                None => {
                    warn!("zone '{}': no tracks to play", self.name);
                    return current;
                }
            },
        };

        let clip = &self.settings.tracks[track];
        let volume = self.settings.volume;
        let (started, next) = match entry {
            Entry::SwitchIn => match self.settings.switch_in.kind {
                ZoneSwitchType::Fade => (
                    mixer.fade_track(clip, self.settings.switch_in.fade_time, volume, resume_at),
                    PlaybackState::FadeIn,
                ),
                ZoneSwitchType::Cut => (
                    mixer.switch_track(clip, volume, resume_at),
                    PlaybackState::Playing,
                ),
            },
            // a stopped zone has nothing to cross-fade against
            Entry::Transition => match self.settings.transition {
                SwitchType::Fade => (
                    mixer.fade_track(clip, self.settings.fade_time, volume, resume_at),
                    PlaybackState::FadeIn,
                ),
                SwitchType::CrossFade => (
                    mixer.fade_track(clip, self.settings.cross_fade_time, volume, resume_at),
                    PlaybackState::FadeIn,
                ),
                SwitchType::Cut => (
                    mixer.switch_track(clip, volume, resume_at),
                    PlaybackState::Playing,
                ),
            },
        };
        if !started {
            return current;
        }

        match resumed {
            Some(_) => info!(
                "zone '{}': resuming '{}' at {:.2}s",
                self.name, clip.name, resume_at
            ),
            None => {
                info!("zone '{}': playing '{}'", self.name, clip.name);
                self.commit_fresh(track);
            }
        }
        self.playback_time = 0.0;
        if entry == Entry::SwitchIn {
            self.engage(mixer);
        }
        next
    }

    fn commit_fresh(&mut self, track: usize) {
        self.schedule.advance();
        self.total_tracks_played += 1;
        self.current_track = Some(track);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::FadeCurve;

    /// Records calls and answers from a script.
    #[derive(Default)]
    struct FakeMixer {
        calls: Vec<String>,
        refuse: bool,
        paused: bool,
        switching: bool,
        audible: bool,
        time: f32,
    }

    impl MixerControl for FakeMixer {
        fn switch_track(&mut self, clip: &Clip, _volume: f32, resume_at: f32) -> bool {
            self.calls.push(format!("switch {} {}", clip.name, resume_at));
            !self.refuse
        }

        fn fade_track(&mut self, clip: &Clip, duration: f32, _volume: f32, resume_at: f32) -> bool {
            self.calls
                .push(format!("fade {} {} {}", clip.name, duration, resume_at));
            !self.refuse
        }

        fn cross_fade_track(
            &mut self,
            clip: &Clip,
            duration: f32,
            _curve: &FadeCurve,
            _volume: f32,
        ) -> bool {
            self.calls.push(format!("cross {} {}", clip.name, duration));
            !self.refuse
        }

        fn fade_out(&mut self, duration: f32, _volume: f32) {
            self.calls.push(format!("fade_out {}", duration));
        }

        fn pause_sources(&mut self, _sender: ZoneId) -> bool {
            self.calls.push("pause_sources".into());
            true
        }

        fn set_state(&mut self, _sender: ZoneId, state: PlaybackState) -> bool {
            self.calls.push(format!("state {:?}", state));
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
            self.time
        }

        fn is_audible(&self) -> bool {
            self.audible
        }
    }

    fn zone(settings: ZoneSettings) -> Playlist {
        let mut zone = Playlist::new(ZoneId::new(0), "test", ZoneKind::default(), settings, Some(5));
        zone.activate();
        zone
    }

    fn tracks(n: usize) -> Vec<Clip> {
        (0..n).map(|i| Clip::new(format!("t{}", i), 30.0)).collect()
    }

    #[test]
    fn idle_starts_first_track_with_cut() {
        let mut mixer = FakeMixer::default();
        let mut zone = zone(ZoneSettings::with_tracks(tracks(2)));
        assert_eq!(zone.handle_idle(&mut mixer), PlaybackState::Playing);
        assert_eq!(mixer.calls, vec!["switch t0 0"]);
        assert_eq!(zone.total_tracks_played(), 1);
        assert_eq!(zone.schedule().index(), 1);
    }

    #[test]
    fn failed_start_leaves_zone_untouched() {
        let mut mixer = FakeMixer {
            refuse: true,
            ..FakeMixer::default()
        };
        let mut zone = zone(ZoneSettings::with_tracks(tracks(2)));
        assert_eq!(zone.handle_idle(&mut mixer), PlaybackState::Idle);
        assert_eq!(zone.total_tracks_played(), 0);
        assert_eq!(zone.schedule().index(), 0);
        assert!(zone.current_track().is_none());
    }

    #[test]
    fn transition_cross_fade_fades_in_from_silence() {
        let mut mixer = FakeMixer::default();
        let mut zone = zone(ZoneSettings {
            transition: SwitchType::CrossFade,
            cross_fade_time: 3.0,
            ..ZoneSettings::with_tracks(tracks(2))
        });
        assert_eq!(zone.handle_idle(&mut mixer), PlaybackState::FadeIn);
        assert_eq!(mixer.calls, vec!["fade t0 3 0"]);
    }

    #[test]
    fn track_ending_per_transition() {
        let mut mixer = FakeMixer::default();
        let mut cut = zone(ZoneSettings::with_tracks(tracks(2)));
        assert_eq!(
            cut.handle_track_ending(&mut mixer, PlaybackState::Playing),
            PlaybackState::TrackEnding
        );

        let mut fade = zone(ZoneSettings {
            transition: SwitchType::Fade,
            fade_time: 2.0,
            ..ZoneSettings::with_tracks(tracks(2))
        });
        assert_eq!(
            fade.handle_track_ending(&mut mixer, PlaybackState::Playing),
            PlaybackState::FadeOut
        );
        assert_eq!(mixer.calls.last().map(String::as_str), Some("fade_out 2"));

        let mut cross = zone(ZoneSettings {
            transition: SwitchType::CrossFade,
            cross_fade_time: 4.0,
            ..ZoneSettings::with_tracks(tracks(2))
        });
        cross.handle_idle(&mut mixer);
        assert_eq!(
            cross.handle_track_ending(&mut mixer, PlaybackState::Playing),
            PlaybackState::CrossFade
        );
        assert_eq!(mixer.calls.last().map(String::as_str), Some("cross t1 4"));
        assert_eq!(cross.total_tracks_played(), 2);
    }

    #[test]
    fn cross_fade_yields_to_long_break() {
        let mut mixer = FakeMixer::default();
        let mut zone = zone(ZoneSettings {
            transition: SwitchType::CrossFade,
            cross_fade_time: 4.0,
            long_break: LongBreak::every(1, 60.0),
            ..ZoneSettings::with_tracks(tracks(2))
        });
        zone.handle_idle(&mut mixer);
        assert_eq!(
            zone.handle_track_ending(&mut mixer, PlaybackState::Playing),
            PlaybackState::FadeOut
        );
        assert_eq!(
            zone.handle_faded_out(&mut mixer, PlaybackState::FadeOut),
            PlaybackState::Paused
        );
        assert_eq!(zone.wait_remaining(), Some(60.0));
    }

    #[test]
    fn track_ended_waits_static_pause() {
        let mut mixer = FakeMixer::default();
        let mut zone = zone(ZoneSettings::with_tracks(tracks(2)));
        zone.handle_idle(&mut mixer);
        assert_eq!(
            zone.handle_track_ended(&mut mixer, PlaybackState::TrackEnding),
            PlaybackState::Paused
        );
        assert_eq!(
            zone.handle_pause(&mut mixer, 4.0, PlaybackState::Paused),
            PlaybackState::Paused
        );
        assert_eq!(
            zone.handle_pause(&mut mixer, 1.0, PlaybackState::Paused),
            PlaybackState::Playing
        );
        assert_eq!(mixer.calls.last().map(String::as_str), Some("switch t1 0"));
    }

    #[test]
    fn zero_pause_starts_next_track_immediately() {
        let mut mixer = FakeMixer::default();
        let mut zone = zone(ZoneSettings {
            pause: PauseCadence::Static { seconds: 0.0 },
            ..ZoneSettings::with_tracks(tracks(2))
        });
        zone.handle_idle(&mut mixer);
        assert_eq!(
            zone.handle_track_ended(&mut mixer, PlaybackState::TrackEnding),
            PlaybackState::Playing
        );
    }

    #[test]
    fn engine_pause_holds_the_wait() {
        let mut mixer = FakeMixer::default();
        let mut zone = zone(ZoneSettings::with_tracks(tracks(2)));
        zone.handle_idle(&mut mixer);
        mixer.paused = true;
        assert_eq!(
            zone.handle_track_ended(&mut mixer, PlaybackState::FadeOut),
            PlaybackState::Paused
        );
        assert_eq!(
            zone.handle_pause(&mut mixer, 100.0, PlaybackState::Paused),
            PlaybackState::Paused
        );
        mixer.paused = false;
        assert_eq!(
            zone.handle_pause(&mut mixer, 0.0, PlaybackState::Paused),
            PlaybackState::Playing
        );
    }

    #[test]
    fn resume_requires_room_for_fade_and_threshold() {
        let settings = ZoneSettings {
            switch_in: ZoneSwitch::fade(2.0),
            ..ZoneSettings::with_tracks(tracks(2))
        };

        let mut mixer = FakeMixer::default();
        let mut zone = zone(settings.clone());
        zone.handle_idle(&mut mixer);
        zone.engage(&mut mixer);
        mixer.audible = true;
        mixer.time = 10.0;
        zone.disengage(&mut mixer);
        assert_eq!(zone.playback_time(), 10.0);
        assert_eq!(
            zone.handle_switch_in(&mut mixer, PlaybackState::Paused),
            PlaybackState::FadeIn
        );
        assert_eq!(mixer.calls.last().map(String::as_str), Some("fade t0 2 10"));
        assert_eq!(zone.total_tracks_played(), 1);
        assert_eq!(zone.playback_time(), 0.0);
        assert!(zone.engaged());

        let mut mixer = FakeMixer::default();
        let mut zone = self::zone(settings);
        zone.handle_idle(&mut mixer);
        zone.engage(&mut mixer);
        mixer.audible = true;
        mixer.time = 28.5;
        zone.disengage(&mut mixer);
        zone.handle_switch_in(&mut mixer, PlaybackState::Paused);
        assert_eq!(mixer.calls.last().map(String::as_str), Some("fade t1 2 0"));
        assert_eq!(zone.total_tracks_played(), 2);
    }

    #[test]
    fn disengage_saves_offset_including_fade() {
        let mut mixer = FakeMixer::default();
        let mut zone = zone(ZoneSettings {
            switch_out: ZoneSwitch::fade(1.5),
            long_break: LongBreak {
                reset_on_switch_out: true,
                ..LongBreak::every(3, 10.0)
            },
            ..ZoneSettings::with_tracks(tracks(2))
        });
        zone.handle_idle(&mut mixer);
        zone.engage(&mut mixer);
        mixer.audible = true;
        mixer.time = 4.0;
        zone.disengage(&mut mixer);
        assert_eq!(zone.playback_time(), 5.5);
        assert!(mixer.switching);
        assert!(!zone.engaged());
        assert_eq!(zone.total_tracks_played(), 0);
        assert_eq!(mixer.calls.last().map(String::as_str), Some("fade_out 1.5"));
    }

    #[test]
    fn disengage_between_tracks_forgets_finished_track() {
        let mut mixer = FakeMixer::default();
        let mut zone = zone(ZoneSettings {
            switch_out: ZoneSwitch::fade(2.0),
            switch_in: ZoneSwitch::fade(2.0),
            pause: PauseCadence::Static { seconds: 30.0 },
            ..ZoneSettings::with_tracks(tracks(2))
        });
        zone.handle_idle(&mut mixer);
        zone.engage(&mut mixer);
        assert_eq!(
            zone.handle_track_ended(&mut mixer, PlaybackState::TrackEnding),
            PlaybackState::Paused
        );

        zone.disengage(&mut mixer);
        assert_eq!(zone.playback_time(), 0.0);
        zone.handle_switch_in(&mut mixer, PlaybackState::Paused);
        assert_eq!(mixer.calls.last().map(String::as_str), Some("fade t1 2 0"));
    }

    #[test]
    fn cut_disengage_pauses_sources() {
        let mut mixer = FakeMixer::default();
        let mut zone = zone(ZoneSettings::with_tracks(tracks(1)));
        zone.engage(&mut mixer);
        zone.disengage(&mut mixer);
        assert_eq!(
            mixer.calls,
            vec!["pause_sources".to_string(), "state Paused".to_string()]
        );
    }

    #[test]
    fn empty_zone_never_plays() {
        let mut mixer = FakeMixer::default();
        let mut zone = zone(ZoneSettings::default());
        assert_eq!(zone.handle_idle(&mut mixer), PlaybackState::Idle);
        assert!(mixer.calls.is_empty());
    }
}
