//! CLI argument definitions for `zmix`.

use clap::{Arg, ArgAction, Command};

fn config_arg() -> Arg {
    Arg::new("CONFIG")
        .help("Path to the music configuration JSON")
        .required(true)
        .index(1)
}

/// Build the CLI argument parser and command definitions.
pub fn build_cli() -> Command {
    Command::new("zmix")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Simulate and play zone-driven background music")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .subcommand(
            Command::new("validate")
                .about("Check a configuration (and optionally a listener script)")
                .arg(config_arg())
                .arg(
                    Arg::new("script")
                        .long("script")
                        .value_name("PATH")
                        .help("Listener script to validate against the configuration"),
                ),
        )
        .subcommand(
            Command::new("simulate")
                .about("Run a configuration offline and print the state timeline")
                .arg(config_arg())
                .arg(
                    Arg::new("script")
                        .long("script")
                        .short('s')
                        .value_name("PATH")
                        .help("Listener script with timed zone events"),
                )
                .arg(
                    Arg::new("duration")
                        .long("duration")
                        .short('t')
                        .value_name("SECONDS")
                        .default_value("300")
                        .help("Seconds to simulate when no script is given"),
                )
                .arg(
                    Arg::new("frame")
                        .long("frame")
                        .value_name("SECONDS")
                        .help("Override the frame delta in seconds"),
                )
                .arg(
                    Arg::new("log")
                        .long("log")
                        .action(ArgAction::SetTrue)
                        .help("Print the engine log after the timeline"),
                ),
        )
        .subcommand(
            Command::new("play")
                .about("Run a configuration live in a terminal UI")
                .arg(config_arg())
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Drive virtual slots instead of the audio device"),
                )
                .arg(
                    Arg::new("quiet")
                        .long("quiet")
                        .short('q')
                        .action(ArgAction::SetTrue)
                        .help("Do not draw the terminal UI"),
                ),
        )
        .subcommand(
            Command::new("create")
                .about("Emit default JSON payloads")
                .subcommand_required(true)
                .subcommand(
                    Command::new("config").about("Print a starter music configuration"),
                )
                .subcommand(
                    Command::new("script").about("Print a starter listener script"),
                ),
        )
}
