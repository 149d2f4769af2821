//! Metrics collection for `fortune-roulette`.
//!
//! Prometheus-compatible counters and histograms for spins, phase changes
//! and ticks. Labels only ever carry phase names and fixed reason strings,
//! so cardinality is bounded by construction.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::RouletteError;
use crate::roulette::RoulettePhase;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without
/// an HTTP endpoint.
///
/// # Errors
///
/// Returns `RouletteError::Io` if the recorder or HTTP listener
/// cannot be installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), RouletteError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| RouletteError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

/// Registers metric descriptions with the global recorder.
fn describe_metrics() {
    describe_counter!(
        "fortune_roulette_spins_total",
        "Total number of spins started"
    );
    describe_counter!(
        "fortune_roulette_phase_transitions_total",
        "Total number of applied phase transitions"
    );
    describe_counter!(
        "fortune_roulette_ticks_total",
        "Section-boundary ticks raised by the renderer"
    );
    describe_counter!(
        "fortune_roulette_stale_steps_dropped_total",
        "Scheduled steps dropped because their spin was superseded"
    );
    describe_counter!(
        "fortune_roulette_rejected_spins_total",
        "Spin requests rejected by precondition checks"
    );
    describe_histogram!(
        "fortune_roulette_spin_duration_ms",
        "Time from spin start to the result phase in milliseconds"
    );
}

/// Records a started spin.
pub fn record_spin_started(candidates: usize) {
    counter!("fortune_roulette_spins_total", "wheel_size" => size_bucket(candidates)).increment(1);
}

/// Records a rejected spin request.
pub fn record_rejected_spin(reason: &'static str) {
    counter!("fortune_roulette_rejected_spins_total", "reason" => reason).increment(1);
}

/// Records an applied phase transition.
pub fn record_phase_transition(from: RoulettePhase, to: RoulettePhase) {
    counter!(
        "fortune_roulette_phase_transitions_total",
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);
}

/// Records a tick raised in `phase`.
pub fn record_tick(phase: RoulettePhase) {
    counter!("fortune_roulette_ticks_total", "phase" => phase.as_str()).increment(1);
}

/// Records a scheduled step dropped by the epoch guard.
pub fn record_stale_step() {
    counter!("fortune_roulette_stale_steps_dropped_total").increment(1);
}

/// Records the time a spin took to reach `result`.
pub fn record_spin_duration(duration: Duration) {
    histogram!("fortune_roulette_spin_duration_ms").record(duration.as_secs_f64() * 1000.0);
}

/// Buckets wheel sizes so the label set stays small.
fn size_bucket(candidates: usize) -> &'static str {
    match candidates {
        0..=10 => "1-10",
        11..=30 => "11-30",
        31..=60 => "31-60",
        _ => "61+",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_bucket_boundaries() {
        assert_eq!(size_bucket(1), "1-10");
        assert_eq!(size_bucket(10), "1-10");
        assert_eq!(size_bucket(30), "11-30");
        assert_eq!(size_bucket(31), "31-60");
        assert_eq!(size_bucket(1000), "61+");
    }

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        // metrics macros silently no-op when no global recorder is installed
        record_spin_started(30);
        record_rejected_spin("spin_in_progress");
        record_phase_transition(RoulettePhase::Spinning, RoulettePhase::Slowing);
        record_tick(RoulettePhase::Stopping);
        record_stale_step();
        record_spin_duration(Duration::from_millis(6000));
    }
}
