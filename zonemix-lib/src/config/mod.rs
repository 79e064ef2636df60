//! JSON configuration for a music system and its listener scripts.

mod error;
mod script;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::constants::SLOT_COUNT;
use crate::mixer::ZoneSwitchType;
use crate::slot::AudioSlot;
use crate::system::MusicSystem;
use crate::zone::{MuteSettings, PauseCadence, ZoneKind, ZoneSettings};

pub use error::ConfigError;
pub use script::{Event, EventKind, Script};

/// One zone entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub name: String,
    #[serde(default)]
    pub kind: ZoneKind,
    /// Seed for shuffling and randomized pauses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(flatten)]
    pub settings: ZoneSettings,
}

/// One mute zone entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuteZoneConfig {
    pub name: String,
    #[serde(flatten)]
    pub settings: MuteSettings,
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MusicConfig {
    pub zones: Vec<ZoneConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mute_zones: Vec<MuteZoneConfig>,
}

impl MusicConfig {
    /// Read a configuration file.
    ///
    /// Relative track paths are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let mut config = Self::from_json(&text)?;
        if let Some(base) = path.parent() {
            config.rebase_paths(base);
        }
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(text)?;
        for zone in config.zones.iter_mut() {
            zone.settings.normalize();
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn rebase_paths(&mut self, base: &Path) {
        for zone in self.zones.iter_mut() {
            for clip in zone.settings.tracks.iter_mut() {
                if let Some(path) = clip.path.as_mut() {
                    if path.is_relative() {
                        *path = base.join(&*path);
                    }
                }
            }
        }
    }

    /// Fill in missing track lengths by probing the audio files.
    #[cfg(feature = "output")]
    pub fn resolve_lengths(&mut self) {
        for zone in self.zones.iter_mut() {
            for clip in zone.settings.tracks.iter_mut() {
                if clip.length > 0.0 {
                    continue;
                }
                let probed = clip.path.as_deref().and_then(crate::slot::probe_length);
                if let Some(length) = probed {
                    info!("probed '{}': {:.2}s", clip.name, length);
                    clip.length = length;
                }
            }
        }
    }

    pub fn zone(&self, name: &str) -> Option<&ZoneConfig> {
        self.zones.iter().find(|zone| zone.name == name)
    }

    pub fn mute_zone(&self, name: &str) -> Option<&MuteZoneConfig> {
        self.mute_zones.iter().find(|zone| zone.name == name)
    }

    /// Return true if `name` is a music zone or a mute zone.
    pub fn has_zone(&self, name: &str) -> bool {
        self.zone(name).is_some() || self.mute_zone(name).is_some()
    }

    /// Check every zone for values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.zones.is_empty() {
            return Err(ConfigError::Invalid("no zones configured".to_string()));
        }
        let mut names = HashSet::new();
        for zone in &self.zones {
            if !names.insert(zone.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate zone name '{}'",
                    zone.name
                )));
            }
            validate_zone(zone).map_err(|err| {
                ConfigError::Invalid(format!("zone '{}': {}", zone.name, err))
            })?;
        }
        for mute in &self.mute_zones {
            if !names.insert(mute.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate zone name '{}'",
                    mute.name
                )));
            }
            if !(mute.settings.stay_delay >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "mute zone '{}': stay_delay must be non-negative, got {}",
                    mute.name, mute.settings.stay_delay
                )));
            }
        }
        Ok(())
    }

    /// Validate and build a music system on top of `slots`.
    pub fn build<S: AudioSlot>(&self, slots: [S; SLOT_COUNT]) -> Result<MusicSystem<S>, ConfigError> {
        self.validate()?;
        let mut system = MusicSystem::new(slots);
        for zone in &self.zones {
            system.add_zone(zone.name.clone(), zone.kind, zone.settings.clone(), zone.seed);
        }
        for mute in &self.mute_zones {
            system.add_mute_zone(mute.name.clone(), mute.settings);
        }
        info!(
            "built music system with {} zones and {} mute zones",
            self.zones.len(),
            self.mute_zones.len()
        );
        Ok(system)
    }

    /// A small configuration used as a starting point: a global zone, a local
    /// zone and a mute zone.
    pub fn template() -> Self {
        use crate::clip::Clip;
        use crate::mixer::SwitchType;
        use crate::zone::{LongBreak, ZoneSwitch};

        Self {
            zones: vec![
                ZoneConfig {
                    name: "world".to_string(),
                    kind: ZoneKind::Global { auto_play: true },
                    seed: None,
                    settings: ZoneSettings {
                        tracks: vec![
                            Clip::with_path("overworld", 120.0, "music/overworld.ogg"),
                            Clip::with_path("meadow", 95.0, "music/meadow.ogg"),
                            Clip::with_path("river", 110.0, "music/river.ogg"),
                        ],
                        shuffle: true,
                        transition: SwitchType::CrossFade,
                        cross_fade_time: 4.0,
                        pause: PauseCadence::Random { min: 5.0, max: 20.0 },
                        long_break: LongBreak::every(3, 60.0),
                        switch_out: ZoneSwitch::fade(2.0),
                        switch_in: ZoneSwitch::fade(2.0),
                        ..ZoneSettings::default()
                    },
                },
                ZoneConfig {
                    name: "cave".to_string(),
                    kind: ZoneKind::Local { stay_delay: 3.0 },
                    seed: None,
                    settings: ZoneSettings {
                        tracks: vec![Clip::with_path("drips", 80.0, "music/drips.ogg")],
                        volume: 0.8,
                        transition: SwitchType::Fade,
                        fade_time: 2.0,
                        switch_in: ZoneSwitch::fade(1.5),
                        switch_out: ZoneSwitch::fade(1.5),
                        ..ZoneSettings::default()
                    },
                },
            ],
            mute_zones: vec![MuteZoneConfig {
                name: "library".to_string(),
                settings: MuteSettings::default(),
            }],
        }
    }
}

fn validate_zone(zone: &ZoneConfig) -> Result<(), String> {
    let settings = &zone.settings;
    if settings.tracks.is_empty() {
        return Err("no tracks".to_string());
    }
    for clip in &settings.tracks {
        if !(clip.length > 0.0) {
            return Err(format!("track '{}' has no positive length", clip.name));
        }
    }
    if !(0.0..=1.0).contains(&settings.volume) {
        return Err(format!("volume {} outside [0, 1]", settings.volume));
    }

    let durations = [
        ("fade_time", settings.fade_time),
        ("cross_fade_time", settings.cross_fade_time),
        ("switch_in.fade_time", settings.switch_in.fade_time),
        ("switch_out.fade_time", settings.switch_out.fade_time),
        ("long_break.duration", settings.long_break.duration),
        ("stay_delay", zone.kind.stay_delay()),
    ];
    for (field, value) in durations {
        if !(value >= 0.0) {
            return Err(format!("{} must be non-negative, got {}", field, value));
        }
    }

    match settings.pause {
        PauseCadence::Static { seconds } if !(seconds >= 0.0) => {
            return Err(format!("static pause must be non-negative, got {}", seconds));
        }
        PauseCadence::Random { min, max } if !(min >= 0.0 && min <= max) => {
            return Err(format!("random pause needs 0 <= min <= max, got [{}, {}]", min, max));
        }
        _ => {}
    }

    if settings.long_break.enabled && settings.long_break.track_count == 0 {
        return Err("long break enabled with a track count of 0".to_string());
    }
    if settings.switch_in.kind == ZoneSwitchType::Fade && settings.switch_in.fade_time == 0.0 {
        log::warn!("zone '{}': switch-in fade of 0s acts as a cut", zone.name);
    }
    settings.cross_fade_curve.check()
}
