//! `zmix validate`: configuration checks without playback.

use std::path::Path;

use clap::ArgMatches;
use log::info;
use zonemix_lib::config::{ConfigError, MusicConfig, Script};
use zonemix_lib::zone::ZoneKind;

pub fn run(args: &ArgMatches) -> Result<i32, ConfigError> {
    let path = args
        .get_one::<String>("CONFIG")
        .ok_or_else(|| ConfigError::Invalid("missing configuration path".to_string()))?;
    let config = MusicConfig::load(Path::new(path))?;
    config.validate()?;

    if let Some(script_path) = args.get_one::<String>("script") {
        let script = Script::load(Path::new(script_path))?;
        script.validate(&config)?;
        println!(
            "script ok: {} events over {:.1}s",
            script.events.len(),
            script.duration
        );
    }

    for zone in &config.zones {
        let kind = match zone.kind {
            ZoneKind::Global { auto_play } => {
                format!("global{}", if auto_play { ", auto-play" } else { "" })
            }
            ZoneKind::Local { stay_delay } => format!("local, stay {:.1}s", stay_delay),
        };
        println!(
            "{:<16} {:<24} {} tracks, {:?}",
            zone.name,
            kind,
            zone.settings.tracks.len(),
            zone.settings.transition
        );
    }
    for mute in &config.mute_zones {
        println!(
            "{:<16} {:<24} {}",
            mute.name,
            format!("mute, stay {:.1}s", mute.settings.stay_delay),
            if mute.settings.hard_pause { "hard pause" } else { "soft pause" }
        );
    }
    if config.mute_zones.is_empty() {
        println!("config ok: {} zones", config.zones.len());
    } else {
        println!(
            "config ok: {} zones, {} mute zones",
            config.zones.len(),
            config.mute_zones.len()
        );
    }
    info!("validated {}", path);
    Ok(0)
}
