pub mod args;
pub mod create;
pub mod simulate;
pub mod validate;

use clap::ArgMatches;
use zonemix_lib::config::ConfigError;

/// Parse an optional seconds value.
pub(crate) fn seconds_arg(args: &ArgMatches, name: &str) -> Result<Option<f32>, ConfigError> {
    let Some(raw) = args.get_one::<String>(name) else {
        return Ok(None);
    };
    match raw.parse::<f32>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(Some(value)),
        _ => Err(ConfigError::Invalid(format!(
            "--{} expects a non-negative number of seconds, got '{}'",
            name, raw
        ))),
    }
}
