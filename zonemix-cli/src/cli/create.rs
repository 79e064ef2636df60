//! `zmix create`: starter JSON payloads.

use clap::ArgMatches;
use zonemix_lib::config::{ConfigError, Event, EventKind, MusicConfig, Script};

pub fn run(args: &ArgMatches) -> Result<i32, ConfigError> {
    let text = match args.subcommand() {
        Some(("config", _)) => MusicConfig::template().to_json()?,
        Some(("script", _)) => serde_json::to_string_pretty(&script_template())?,
        _ => return Ok(-1),
    };
    println!("{}", text);
    Ok(0)
}

fn script_template() -> Script {
    let event = |at: f32, event: EventKind, zone: Option<&str>| Event {
        at,
        event,
        zone: zone.map(str::to_string),
    };
    Script {
        duration: 600.0,
        frame: 1.0 / 60.0,
        events: vec![
            event(90.0, EventKind::Enter, Some("cave")),
            event(200.0, EventKind::Exit, Some("cave")),
            event(202.0, EventKind::Enter, Some("cave")),
            event(320.0, EventKind::Exit, Some("cave")),
            event(400.0, EventKind::Pause, None),
            event(430.0, EventKind::Unpause, None),
            event(500.0, EventKind::Enter, Some("library")),
            event(520.0, EventKind::Exit, Some("library")),
        ],
    }
}
