//! Scripted listener paths for offline simulation.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{ConfigError, MusicConfig};
use crate::mixer::ZoneId;
use crate::slot::AudioSlot;
use crate::system::MusicSystem;
use crate::zone::MuteZoneId;

/// What the listener does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Enter,
    Exit,
    Pause,
    HardPause,
    Unpause,
}

impl EventKind {
    fn needs_zone(self) -> bool {
        matches!(self, EventKind::Enter | EventKind::Exit)
    }
}

/// A timed listener event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Seconds since the start of the run.
    pub at: f32,
    pub event: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

/// A listener path through the configured zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Total simulated seconds.
    pub duration: f32,
    /// Fixed frame delta in seconds.
    #[serde(default = "default_frame")]
    pub frame: f32,
    #[serde(default)]
    pub events: Vec<Event>,
}

fn default_frame() -> f32 {
    1.0 / 60.0
}

impl Script {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let mut script: Self = serde_json::from_str(text)?;
        script
            .events
            .sort_by(|a, b| a.at.total_cmp(&b.at));
        Ok(script)
    }

    /// Check timing values and that every event names a configured zone.
    pub fn validate(&self, config: &MusicConfig) -> Result<(), ConfigError> {
        if !(self.duration >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "script duration must be non-negative, got {}",
                self.duration
            )));
        }
        if !(self.frame > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "script frame must be positive, got {}",
                self.frame
            )));
        }
        for event in &self.events {
            match &event.zone {
                Some(zone) if !config.has_zone(zone) => {
                    return Err(ConfigError::UnknownZone(zone.clone()));
                }
                None if event.event.needs_zone() => {
                    return Err(ConfigError::Invalid(format!(
                        "{:?} event at {}s names no zone",
                        event.event, event.at
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Start `system` and drive it through the script with fixed frames.
    ///
    /// `on_frame` runs after every tick with the elapsed time.
    pub fn run<S, F>(&self, system: &mut MusicSystem<S>, mut on_frame: F) -> Result<(), ConfigError>
    where
        S: AudioSlot,
        F: FnMut(f32, &MusicSystem<S>),
    {
        let mut events = self.events.iter().peekable();
        let mut elapsed = 0.0f32;
        let frames = (self.duration / self.frame).ceil() as u64;

        system.start();
        for _ in 0..frames {
            while let Some(event) = events.next_if(|event| event.at <= elapsed) {
                apply(event, system)?;
            }
            system.tick(self.frame);
            elapsed += self.frame;
            on_frame(elapsed, system);
        }
        Ok(())
    }
}

fn apply<S: AudioSlot>(event: &Event, system: &mut MusicSystem<S>) -> Result<(), ConfigError> {
    debug!("script event at {:.2}s: {:?} {:?}", event.at, event.event, event.zone);
    let target = match &event.zone {
        Some(name) => Some(target(system, name)?),
        None => None,
    };
    match (event.event, target) {
        (EventKind::Enter, Some(Target::Music(id))) => system.enter_zone(id),
        (EventKind::Exit, Some(Target::Music(id))) => system.exit_zone(id),
        (EventKind::Enter, Some(Target::Mute(id))) => system.enter_mute_zone(id),
        (EventKind::Exit, Some(Target::Mute(id))) => system.exit_mute_zone(id),
        (EventKind::Pause, _) => system.pause(),
        (EventKind::HardPause, _) => system.hard_pause(),
        (EventKind::Unpause, _) => system.unpause(),
        (kind, None) => {
            return Err(ConfigError::Invalid(format!("{:?} event names no zone", kind)));
        }
    }
    Ok(())
}

/// A zone an event can name.
#[derive(Debug, Clone, Copy)]
enum Target {
    Music(ZoneId),
    Mute(MuteZoneId),
}

fn target<S: AudioSlot>(system: &MusicSystem<S>, name: &str) -> Result<Target, ConfigError> {
    if let Some(id) = system.zone_id(name) {
        return Ok(Target::Music(id));
    }
    system
        .mute_zone_id(name)
        .map(Target::Mute)
        .ok_or_else(|| ConfigError::UnknownZone(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::PlaybackState;
    use crate::slot::VirtualSlot;

    const CONFIG: &str = r#"{ "zones": [
        { "name": "world", "tracks": [{ "name": "w", "length": 60 }] },
        { "name": "cave", "kind": { "type": "local", "stay_delay": 0 },
          "tracks": [{ "name": "c", "length": 60 }] }
    ], "mute_zones": [{ "name": "library", "stay_delay": 1 }] }"#;

    #[test]
    fn events_are_sorted_and_defaults_apply() {
        let script = Script::from_json(
            r#"{ "duration": 10, "events": [
                { "at": 5, "event": "exit", "zone": "cave" },
                { "at": 1, "event": "enter", "zone": "cave" }
            ] }"#,
        )
        .expect("script");
        assert_eq!(script.events[0].event, EventKind::Enter);
        assert!((script.frame - 1.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_zone_is_rejected() {
        let config = MusicConfig::from_json(CONFIG).expect("config");
        let script = Script::from_json(
            r#"{ "duration": 1, "events": [{ "at": 0, "event": "enter", "zone": "attic" }] }"#,
        )
        .expect("script");
        assert!(matches!(
            script.validate(&config),
            Err(ConfigError::UnknownZone(name)) if name == "attic"
        ));

        let script = Script::from_json(r#"{ "duration": 1, "events": [{ "at": 0, "event": "exit" }] }"#)
            .expect("script");
        assert!(matches!(script.validate(&config), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn run_follows_the_listener() {
        let config = MusicConfig::from_json(CONFIG).expect("config");
        let script = Script::from_json(
            r#"{ "duration": 6, "frame": 0.05, "events": [
                { "at": 1, "event": "enter", "zone": "cave" },
                { "at": 3, "event": "exit", "zone": "cave" },
                { "at": 4, "event": "pause" }
            ] }"#,
        )
        .expect("script");
        script.validate(&config).expect("valid");

        let mut system = config
            .build([VirtualSlot::new(), VirtualSlot::new()])
            .expect("system");
        let mut saw_cave = false;
        script
            .run(&mut system, |_, system| {
                saw_cave |= system.current_zone() == system.zone_id("cave");
            })
            .expect("run");

        assert!(saw_cave);
        assert_eq!(system.current_zone(), system.zone_id("world"));
        assert!(system.is_paused());
        assert_eq!(system.state(), PlaybackState::Paused);
    }

    #[test]
    fn run_drives_mute_zones() {
        let config = MusicConfig::from_json(CONFIG).expect("config");
        let script = Script::from_json(
            r#"{ "duration": 8, "frame": 0.05, "events": [
                { "at": 1, "event": "enter", "zone": "library" },
                { "at": 4, "event": "exit", "zone": "library" }
            ] }"#,
        )
        .expect("script");
        script.validate(&config).expect("valid");

        let mut system = config
            .build([VirtualSlot::new(), VirtualSlot::new()])
            .expect("system");
        let mut paused_at = None;
        let mut resumed_at = None;
        script
            .run(&mut system, |elapsed, system| {
                if system.is_paused() && paused_at.is_none() {
                    paused_at = Some(elapsed);
                }
                if !system.is_paused() && paused_at.is_some() && resumed_at.is_none() {
                    resumed_at = Some(elapsed);
                }
            })
            .expect("run");

        let paused_at = paused_at.expect("music paused");
        let resumed_at = resumed_at.expect("music resumed");
        assert!(paused_at > 1.9 && paused_at < 2.2, "paused at {}", paused_at);
        assert!(resumed_at > 4.9 && resumed_at < 5.2, "resumed at {}", resumed_at);
        assert_eq!(system.state(), PlaybackState::Playing);
    }
}
