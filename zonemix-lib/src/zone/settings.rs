//! Static zone configuration.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::clip::Clip;
use crate::constants::{
    DEFAULT_LONG_BREAK, DEFAULT_RANDOM_PAUSE_MAX, DEFAULT_STATIC_PAUSE, DEFAULT_STAY_DELAY,
    DEFAULT_VOLUME, END_THRESHOLD_PADDING,
};
use crate::curve::FadeCurve;
use crate::mixer::{SwitchType, ZoneSwitchType};

/// Zone flavor. Both variants drive the mixer the same way; they only differ
/// in how they get activated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ZoneKind {
    /// Fallback zone without a spatial trigger.
    Global {
        #[serde(default = "default_auto_play")]
        auto_play: bool,
    },
    /// Trigger-activated zone with a minimum stay time.
    Local {
        #[serde(default = "default_stay_delay")]
        stay_delay: f32,
    },
}

impl Default for ZoneKind {
    fn default() -> Self {
        ZoneKind::Global { auto_play: true }
    }
}

impl ZoneKind {
    pub fn is_global(&self) -> bool {
        matches!(self, ZoneKind::Global { .. })
    }

    /// Seconds the listener must stay inside before the zone activates.
    pub fn stay_delay(&self) -> f32 {
        match self {
            ZoneKind::Global { .. } => 0.0,
            ZoneKind::Local { stay_delay } => *stay_delay,
        }
    }
}

fn default_auto_play() -> bool {
    true
}

fn default_stay_delay() -> f32 {
    DEFAULT_STAY_DELAY
}

/// Zone entry or exit behavior.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneSwitch {
    pub kind: ZoneSwitchType,
    pub fade_time: f32,
}

impl ZoneSwitch {
    pub fn cut() -> Self {
        Self::default()
    }

    pub fn fade(fade_time: f32) -> Self {
        Self {
            kind: ZoneSwitchType::Fade,
            fade_time,
        }
    }

    /// Fade duration when fading, 0 for cuts.
    pub fn effective_fade(&self) -> f32 {
        match self.kind {
            ZoneSwitchType::Fade => self.fade_time,
            ZoneSwitchType::Cut => 0.0,
        }
    }
}

/// Silence inserted between two tracks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PauseCadence {
    Static {
        #[serde(default = "default_static_pause")]
        seconds: f32,
    },
    /// Uniformly drawn from `[min, max]` after every track.
    Random {
        #[serde(default)]
        min: f32,
        #[serde(default = "default_random_max")]
        max: f32,
    },
}

impl Default for PauseCadence {
    fn default() -> Self {
        PauseCadence::Static {
            seconds: DEFAULT_STATIC_PAUSE,
        }
    }
}

impl PauseCadence {
    /// Draw the next pause length in seconds.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f32 {
        match *self {
            PauseCadence::Static { seconds } => seconds.max(0.0),
            PauseCadence::Random { min, max } => {
                if max > min {
                    rng.gen_range(min..=max)
                } else {
                    min
                }
            }
        }
    }
}

fn default_static_pause() -> f32 {
    DEFAULT_STATIC_PAUSE
}

fn default_random_max() -> f32 {
    DEFAULT_RANDOM_PAUSE_MAX
}

/// Extended pause every `track_count` tracks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongBreak {
    pub enabled: bool,
    pub track_count: u32,
    pub duration: f32,
    /// Reset the track counter whenever the zone is switched out.
    pub reset_on_switch_out: bool,
}

impl Default for LongBreak {
    fn default() -> Self {
        Self {
            enabled: false,
            track_count: 0,
            duration: DEFAULT_LONG_BREAK,
            reset_on_switch_out: false,
        }
    }
}

impl LongBreak {
    pub fn every(track_count: u32, duration: f32) -> Self {
        Self {
            enabled: true,
            track_count,
            duration,
            reset_on_switch_out: false,
        }
    }

    /// Return true when `tracks_played` lands on a break.
    pub fn is_due(&self, tracks_played: u32) -> bool {
        self.enabled
            && self.track_count > 0
            && tracks_played > 0
            && tracks_played % self.track_count == 0
    }
}

/// Per-zone playback policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneSettings {
    pub tracks: Vec<Clip>,
    pub shuffle: bool,
    pub volume: f32,
    pub switch_in: ZoneSwitch,
    pub switch_out: ZoneSwitch,
    pub transition: SwitchType,
    pub fade_time: f32,
    pub cross_fade_time: f32,
    pub cross_fade_curve: FadeCurve,
    pub pause: PauseCadence,
    pub long_break: LongBreak,
}

impl Default for ZoneSettings {
    fn default() -> Self {
        Self {
            tracks: Vec::new(),
            shuffle: false,
            volume: DEFAULT_VOLUME,
            switch_in: ZoneSwitch::default(),
            switch_out: ZoneSwitch::default(),
            transition: SwitchType::default(),
            fade_time: 0.0,
            cross_fade_time: 0.0,
            cross_fade_curve: FadeCurve::default(),
            pause: PauseCadence::default(),
            long_break: LongBreak::default(),
        }
    }
}

impl ZoneSettings {
    pub fn with_tracks(tracks: Vec<Clip>) -> Self {
        Self {
            tracks,
            ..Self::default()
        }
    }

    /// Lead time before a track's end at which the zone decides what follows.
    pub fn end_threshold(&self) -> f32 {
        match self.transition {
            SwitchType::Fade => self.fade_time + END_THRESHOLD_PADDING,
            _ => self.cross_fade_time + END_THRESHOLD_PADDING,
        }
    }

    /// Sort keyed cross-fade curves so they can be sampled.
    pub fn normalize(&mut self) {
        if let FadeCurve::Keys(keys) = &self.cross_fade_curve {
            self.cross_fade_curve = FadeCurve::from_keys(keys.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn end_threshold_follows_transition() {
        let mut settings = ZoneSettings {
            fade_time: 2.0,
            cross_fade_time: 4.0,
            ..ZoneSettings::default()
        };
        assert!((settings.end_threshold() - 4.1).abs() < 1e-6);
        settings.transition = SwitchType::Fade;
        assert!((settings.end_threshold() - 2.1).abs() < 1e-6);
        settings.transition = SwitchType::CrossFade;
        assert!((settings.end_threshold() - 4.1).abs() < 1e-6);
    }

    #[test]
    fn long_break_lands_on_multiples() {
        let long_break = LongBreak::every(3, 60.0);
        let due: Vec<u32> = (0..10).filter(|n| long_break.is_due(*n)).collect();
        assert_eq!(due, vec![3, 6, 9]);
        assert!(!LongBreak::default().is_due(3));
    }

    #[test]
    fn random_pause_stays_in_range() {
        let cadence = PauseCadence::Random { min: 2.0, max: 4.0 };
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let wait = cadence.sample(&mut rng);
            assert!((2.0..=4.0).contains(&wait));
        }
        let degenerate = PauseCadence::Random { min: 3.0, max: 3.0 };
        assert_eq!(degenerate.sample(&mut rng), 3.0);
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: ZoneSettings = serde_json::from_str(
            r#"{
                "tracks": [{ "name": "a", "length": 10.0 }],
                "transition": "cross_fade",
                "pause": { "type": "random", "max": 12.0 },
                "switch_out": { "kind": "fade", "fade_time": 1.5 }
            }"#,
        )
        .expect("settings");
        assert_eq!(settings.volume, 1.0);
        assert_eq!(settings.transition, SwitchType::CrossFade);
        assert_eq!(settings.pause, PauseCadence::Random { min: 0.0, max: 12.0 });
        assert_eq!(settings.switch_out, ZoneSwitch::fade(1.5));
        assert_eq!(settings.switch_in, ZoneSwitch::cut());
        assert_eq!(settings.long_break.duration, 120.0);
    }

    #[test]
    fn zone_kind_defaults() {
        let kind: ZoneKind = serde_json::from_str(r#"{ "type": "local" }"#).expect("kind");
        assert_eq!(kind, ZoneKind::Local { stay_delay: 5.0 });
        let kind: ZoneKind = serde_json::from_str(r#"{ "type": "global" }"#).expect("kind");
        assert_eq!(kind, ZoneKind::Global { auto_play: true });
    }
}
