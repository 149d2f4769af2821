//! Logging setup.
//!
//! `-v` flags raise the level of this crate's own spans and events only.
//! Dependencies (tokio, the Prometheus exporter) stay at `warn` unless
//! `FORTUNE_ROULETTE_LOG_LEVEL` says otherwise, which keeps `-vvv` readable
//! while a spin is being drawn on the same terminal.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;

/// Environment variable holding a full `EnvFilter` directive string.
pub const LOG_LEVEL_ENV: &str = "FORTUNE_ROULETTE_LOG_LEVEL";

/// Target prefix of everything this crate logs.
const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

/// How log lines are rendered on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per line
    Json,
}

/// Level for this crate at a given `-v` count. Saturates at `trace`.
#[must_use]
pub const fn crate_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Directive used when the environment does not provide one.
#[must_use]
pub fn default_directive(verbosity: u8) -> String {
    format!("warn,{CRATE_TARGET}={}", crate_level(verbosity))
}

/// Installs the global subscriber.
///
/// Calling it again is a no-op, so tests and the binary can both call it.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let filter = match EnvFilter::try_from_env(LOG_LEVEL_ENV) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(default_directive(verbosity)),
    };

    // Targets only help once several modules are talking
    let with_target = verbosity >= 2;
    let ansi = match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => {
            std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(with_target)
        .with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Human => builder.with_ansi(ansi).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_level_saturates() {
        assert_eq!(crate_level(0), "warn");
        assert_eq!(crate_level(1), "info");
        assert_eq!(crate_level(2), "debug");
        assert_eq!(crate_level(3), "trace");
        assert_eq!(crate_level(u8::MAX), "trace");
    }

    #[test]
    fn test_default_directive_scoped_to_crate() {
        assert_eq!(default_directive(0), "warn,fortune_roulette=warn");
        assert_eq!(default_directive(2), "warn,fortune_roulette=debug");
        assert!(EnvFilter::try_new(default_directive(3)).is_ok());
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(LogFormat::Human, 0, ColorChoice::Never);
        init_logging(LogFormat::Json, 3, ColorChoice::Always);
    }
}
