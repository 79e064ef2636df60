use std::{io, path::Path};

use clap::ArgMatches;
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{info, warn};
use ratatui::{backend::CrosstermBackend, Terminal};
use zonemix_lib::config::{ConfigError, MusicConfig};
use zonemix_lib::diagnostics::FrameClock;
use zonemix_lib::slot::{AudioSlot, VirtualSlot};
use zonemix_lib::system::MusicSystem;

use crate::{cli, controls, logging::LogBuffer, ui};

pub fn run(args: &ArgMatches, log_buffer: LogBuffer) -> Result<i32, ConfigError> {
    info!("Starting zmix");
    match args.subcommand() {
        Some(("validate", sub)) => cli::validate::run(sub),
        Some(("simulate", sub)) => cli::simulate::run(sub, &log_buffer),
        Some(("create", sub)) => cli::create::run(sub),
        Some(("play", sub)) => play(sub, &log_buffer),
        _ => Ok(-1),
    }
}

fn play(args: &ArgMatches, log_buffer: &LogBuffer) -> Result<i32, ConfigError> {
    let path = args
        .get_one::<String>("CONFIG")
        .ok_or_else(|| ConfigError::Invalid("missing configuration path".to_string()))?;
    #[allow(unused_mut)]
    let mut config = MusicConfig::load(Path::new(path))?;
    let quiet = args.get_flag("quiet");
    let title = format!("zmix  {}", path);

    #[cfg(feature = "output")]
    {
        if !args.get_flag("dry-run") {
            use zonemix_lib::slot::{open_output_stream_with_retry, SinkSlot};

            config.resolve_lengths();
            let Some(stream) = open_output_stream_with_retry() else {
                return Err(ConfigError::Invalid(
                    "no audio output device available".to_string(),
                ));
            };
            let slots = [SinkSlot::new(stream.mixer()), SinkSlot::new(stream.mixer())];
            let mut system = config.build(slots)?;
            return live_loop(&mut system, &title, quiet, log_buffer);
        }
    }

    if !args.get_flag("dry-run") {
        warn!("built without audio output; playing on virtual slots");
    }
    let mut system = config.build([VirtualSlot::new(), VirtualSlot::new()])?;
    live_loop(&mut system, &title, quiet, log_buffer)
}

fn live_loop<S: AudioSlot>(
    system: &mut MusicSystem<S>,
    title: &str,
    quiet: bool,
    log_buffer: &LogBuffer,
) -> Result<i32, ConfigError> {
    let _raw_mode = RawModeGuard::enable().ok();
    let mut terminal = if !quiet {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, EnterAlternateScreen, cursor::Hide);
        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend).ok()
    } else {
        None
    };

    let mut clock = FrameClock::new();
    clock.start();
    system.start();

    loop {
        system.tick(clock.frame());

        if let Some(term) = terminal.as_mut() {
            let log_lines = crate::logging::snapshot(log_buffer);
            let status = controls::status_text(system);
            ui::draw_status(term, title, &status, &log_lines);
        }

        if !controls::handle_key_event(system) {
            break;
        }
    }

    // Restore the terminal state before exiting.
    if let Some(mut term) = terminal {
        let _ = term.show_cursor();
        let stdout = term.backend_mut();
        let _ = execute!(stdout, LeaveAlternateScreen, cursor::Show);
    }

    info!("stopped after {:.1}s", system.mixer().clock());
    Ok(0)
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
