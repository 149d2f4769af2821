//! `simulate` command
//!
//! Drives many spins through the sequencer on a virtual clock and reports
//! how often each candidate came up.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{Wheel, prepare_wheel};
use crate::cli::args::{OutputFormat, SimulateArgs};
use crate::error::RouletteError;
use crate::roulette::{
    ManualScheduler, PhaseSequencer, RoulettePhase, TickDetector, compute_display_state,
};

/// Run the simulation.
///
/// # Errors
///
/// Returns an error if the wheel cannot be prepared or a spin is rejected.
pub fn run(args: &SimulateArgs, cancel: &CancellationToken) -> Result<(), RouletteError> {
    let wheel = prepare_wheel(&args.source)?;
    let report = simulate(&wheel, args.spins, cancel)?;

    if report.spins < args.spins {
        warn!(
            completed = report.spins,
            requested = args.spins,
            "simulation interrupted"
        );
    }

    match args.format {
        OutputFormat::Human => print_human(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    spins: u32,
    candidates: usize,
    hits: Vec<Hit>,
    ticks: u64,
    mean_ticks_per_spin: f64,
    #[serde(with = "display_duration")]
    virtual_time: Duration,
}

#[derive(Debug, Serialize)]
struct Hit {
    id: String,
    label: String,
    count: u32,
}

mod display_duration {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&humantime::format_duration(*d).to_string())
    }
}

fn simulate(
    wheel: &Wheel,
    spins: u32,
    cancel: &CancellationToken,
) -> Result<SimulationReport, RouletteError> {
    let spin = wheel.config.spin;
    let mut seq = match wheel.seed {
        Some(seed) => PhaseSequencer::with_seed(spin, ManualScheduler::new(), seed),
        None => PhaseSequencer::new(spin, ManualScheduler::new()),
    };
    let frame = wheel.config.wheel.frame_interval();
    let count = wheel.candidates.len();

    let mut hits: HashMap<usize, u32> = HashMap::new();
    let mut ticks = 0_u64;
    let mut completed = 0_u32;
    let mut virtual_time = Duration::ZERO;

    for _ in 0..spins {
        if cancel.is_cancelled() {
            break;
        }
        if seq.phase() == RoulettePhase::Result {
            seq.reset();
        }
        let outcome = seq.start_spin(&wheel.candidates)?;
        let mut detector = TickDetector::new();

        while seq.phase() != RoulettePhase::Result {
            seq.advance(frame);
            let state = compute_display_state(seq.elapsed(), &outcome, 0.0, count);
            if detector.observe(seq.phase(), state.section_index) {
                ticks += 1;
            }
        }

        virtual_time += seq.elapsed();
        *hits.entry(outcome.selected_index).or_default() += 1;
        completed += 1;
    }

    info!(spins = completed, ticks, "simulation finished");

    let mut hits: Vec<Hit> = wheel
        .candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| Hit {
            id: candidate.id.clone(),
            label: candidate.label.clone(),
            count: hits.get(&index).copied().unwrap_or(0),
        })
        .collect();
    hits.sort_by(|a, b| b.count.cmp(&a.count));

    Ok(SimulationReport {
        spins: completed,
        candidates: count,
        hits,
        ticks,
        mean_ticks_per_spin: if completed == 0 {
            0.0
        } else {
            mean(ticks, completed)
        },
        virtual_time,
    })
}

#[allow(clippy::cast_precision_loss)]
fn mean(total: u64, n: u32) -> f64 {
    total as f64 / f64::from(n)
}

fn print_human(report: &SimulationReport) {
    println!(
        "{} spins over {} candidates ({} of virtual time)",
        report.spins,
        report.candidates,
        humantime::format_duration(report.virtual_time)
    );
    println!(
        "ticks: {} total, {:.1} per spin",
        report.ticks, report.mean_ticks_per_spin
    );
    println!();
    for hit in &report.hits {
        let share = if report.spins == 0 {
            0.0
        } else {
            f64::from(hit.count) / f64::from(report.spins) * 100.0
        };
        println!("  {:>6}  {share:>6.2}%  {}", hit.count, hit.label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::RouletteConfig;

    fn wheel(seed: u64) -> Wheel {
        let catalog = Catalog::from_json_str(
            r#"[
                {"한글이름": "가", "영어이름": "A", "id": "a"},
                {"한글이름": "나", "영어이름": "B", "id": "b"},
                {"한글이름": "다", "영어이름": "C", "id": "c"},
                {"한글이름": "라", "영어이름": "D", "id": "d"}
            ]"#,
        )
        .unwrap();
        let candidates = catalog.artists().iter().map(|a| a.to_candidate()).collect();
        Wheel {
            config: RouletteConfig::default(),
            catalog,
            candidates,
            seed: Some(seed),
        }
    }

    #[test]
    fn test_hits_add_up() {
        let report = simulate(&wheel(11), 40, &CancellationToken::new()).unwrap();
        assert_eq!(report.spins, 40);
        assert_eq!(report.hits.len(), 4);
        assert_eq!(report.hits.iter().map(|h| h.count).sum::<u32>(), 40);
        assert!(report.hits.windows(2).all(|w| w[0].count >= w[1].count));
        assert_eq!(report.virtual_time, Duration::from_millis(6000 * 40));
        assert!(report.ticks >= 40);
    }

    #[test]
    fn test_seeded_simulation_reproducible() {
        let a = simulate(&wheel(5), 25, &CancellationToken::new()).unwrap();
        let b = simulate(&wheel(5), 25, &CancellationToken::new()).unwrap();
        let counts = |r: &SimulationReport| {
            r.hits
                .iter()
                .map(|h| (h.id.clone(), h.count))
                .collect::<Vec<_>>()
        };
        assert_eq!(counts(&a), counts(&b));
        assert_eq!(a.ticks, b.ticks);
    }

    #[test]
    fn test_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let report = simulate(&wheel(1), 10, &cancel).unwrap();
        assert_eq!(report.spins, 0);
        assert!(report.mean_ticks_per_spin.abs() < f64::EPSILON);
    }
}
