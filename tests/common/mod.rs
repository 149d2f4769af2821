//! Shared integration-test harness for running the `fortune-roulette`
//! binary and building in-process wheels.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};

use fortune_roulette::roulette::Candidate;

/// Runs the binary with `args` and waits for it to exit.
///
/// Logging is silenced and the environment overrides the binary reads are
/// cleared so host settings cannot leak into assertions.
#[allow(clippy::missing_panics_doc)]
pub fn spawn_command(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fortune-roulette"))
        .args(args)
        .env_remove("FORTUNE_ROULETTE_CONFIG")
        .env_remove("FORTUNE_ROULETTE_ARTISTS")
        .env_remove("FORTUNE_ROULETTE_RECORD")
        .env_remove("FORTUNE_ROULETTE_NICKNAME")
        .env_remove("FORTUNE_ROULETTE_METRICS_PORT")
        .env_remove("FORTUNE_ROULETTE_LOG_LEVEL")
        .output()
        .expect("failed to run fortune-roulette")
}

/// Path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Same as [`fixture_path`], as a `String` for argument lists.
pub fn fixture_arg(name: &str) -> String {
    fixture_path(name).to_string_lossy().into_owned()
}

/// Parses stdout as JSON, panicking with the raw output on failure.
#[allow(clippy::missing_panics_doc)]
pub fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {stdout}"))
}

/// `n` distinct candidates.
pub fn candidates(n: usize) -> Vec<Candidate> {
    (0..n)
        .map(|i| Candidate::new(format!("artist-{i}"), format!("작가 {i}")))
        .collect()
}
