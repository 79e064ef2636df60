//! `zmix simulate`: deterministic offline runs on virtual slots.

use std::path::Path;

use clap::ArgMatches;
use log::info;
use zonemix_lib::config::{ConfigError, MusicConfig, Script};
use zonemix_lib::slot::VirtualSlot;
use zonemix_lib::system::MusicSystem;

use super::seconds_arg;
use crate::logging::{self, LogBuffer};

pub fn run(args: &ArgMatches, log_buffer: &LogBuffer) -> Result<i32, ConfigError> {
    let path = args
        .get_one::<String>("CONFIG")
        .ok_or_else(|| ConfigError::Invalid("missing configuration path".to_string()))?;
    let config = MusicConfig::load(Path::new(path))?;

    let mut script = match args.get_one::<String>("script") {
        Some(script_path) => Script::load(Path::new(script_path))?,
        None => Script {
            duration: seconds_arg(args, "duration")?.unwrap_or(300.0),
            frame: 1.0 / 60.0,
            events: Vec::new(),
        },
    };
    if let Some(frame) = seconds_arg(args, "frame")? {
        script.frame = frame;
    }
    script.validate(&config)?;

    let mut system = config.build([VirtualSlot::new(), VirtualSlot::new()])?;
    info!(
        "simulating {:.1}s at {:.4}s per frame",
        script.duration, script.frame
    );
    script.run(&mut system, |_, _| {})?;

    print!("{}", report(&system));
    if args.get_flag("log") {
        println!("\nlog:");
        for line in logging::snapshot(log_buffer) {
            println!("  {}", line);
        }
    }
    Ok(0)
}

fn report(system: &MusicSystem<VirtualSlot>) -> String {
    let mut out = String::from("timeline:\n");
    for entry in system.timeline().entries() {
        let zone = entry
            .zone
            .and_then(|id| system.zone(id))
            .map(|zone| zone.name())
            .unwrap_or("-");
        out.push_str(&format!(
            "  {:>9.2}s  {:<16} {:?} -> {:?}\n",
            entry.time, zone, entry.from, entry.to
        ));
    }

    out.push_str("zones:\n");
    for zone in system.zones() {
        let track = zone
            .current_track()
            .map(|clip| clip.name.as_str())
            .unwrap_or("-");
        out.push_str(&format!(
            "  {:<16} played {:>3}  last '{}'{}\n",
            zone.name(),
            zone.total_tracks_played(),
            track,
            if zone.engaged() { "  (engaged)" } else { "" }
        ));
    }

    for mute in system.mute_zones() {
        out.push_str(&format!(
            "  {:<16} mute{}\n",
            mute.name(),
            if mute.engaged() { "  (engaged)" } else { "" }
        ));
    }

    let current = system
        .current_zone()
        .and_then(|id| system.zone(id))
        .map(|zone| zone.name())
        .unwrap_or("-");
    out.push_str(&format!(
        "final: {:?} in '{}' at {:.2}s{}\n",
        system.state(),
        current,
        system.mixer().clock(),
        if system.is_paused() { " (paused)" } else { "" }
    ));
    out
}
