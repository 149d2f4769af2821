//! `spin` command
//!
//! Runs one spin end to end: draw, phase sequencing, per-frame rendering
//! with ticks, result recording and the delayed reveal.

use std::io::{IsTerminal, Write};
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::card::{ResultCard, SpinSummary};
use super::{Wheel, prepare_wheel};
use crate::cli::args::SpinArgs;
use crate::error::RouletteError;
use crate::observability::events::{Event, EventEmitter};
use crate::observability::metrics;
use crate::record::{FortuneRecord, JsonlRecorder, ResultRecorder};
use crate::roulette::{
    ManualScheduler, PhaseSequencer, PhaseTransition, RoulettePhase, Scheduler, SpinOutcome,
    TickDetector, TokioScheduler, compute_display_state,
};

/// Run one spin.
///
/// # Errors
///
/// Returns an error if the wheel cannot be prepared, the event file cannot
/// be opened, or the spin is rejected. Recording failures are only logged.
pub async fn run(
    args: &SpinArgs,
    quiet: bool,
    cancel: CancellationToken,
) -> Result<(), RouletteError> {
    if let Some(port) = args.metrics_port {
        crate::observability::init_metrics(Some(port))?;
        info!(port, "Prometheus metrics endpoint started");
    }

    let wheel = prepare_wheel(&args.source)?;

    let emitter = if let Some(ref path) = args.events {
        EventEmitter::from_file(path)?
    } else if args.emit_events {
        EventEmitter::stderr()
    } else {
        EventEmitter::noop()
    };

    let recorder = match args.record.as_deref().map(JsonlRecorder::open).transpose() {
        Ok(recorder) => recorder,
        Err(e) => {
            warn!(error = %e, "result recording disabled");
            emitter.emit(Event::RecordFailed {
                timestamp: Utc::now(),
                reason: e.to_string(),
            });
            None
        }
    };

    let mut spin = SpinRun {
        wheel: &wheel,
        emitter: &emitter,
        ticks: TickDetector::new(),
        tick_count: 0,
        status: StatusLine::new(!quiet && !args.instant && std::io::stderr().is_terminal()),
    };

    let finished = if args.instant {
        spin.run_virtual()?
    } else {
        spin.run_realtime(&cancel).await?
    };
    spin.status.finish();

    let Some(finished) = finished else {
        warn!("spin interrupted before the result");
        return Ok(());
    };

    let record = FortuneRecord::new(args.nickname.clone(), &finished.outcome.selected_candidate);
    let mut recorded = false;
    if let Some(ref recorder) = recorder {
        // A failed write never undoes the result
        match recorder.record(&record) {
            Ok(()) => {
                recorded = true;
                info!(path = %recorder.path().display(), id = %record.id, "result recorded");
            }
            Err(e) => {
                warn!(error = %e, "failed to record result");
                emitter.emit(Event::RecordFailed {
                    timestamp: Utc::now(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if !args.instant && !reveal(&wheel, args, quiet, &cancel).await {
        return Ok(());
    }

    let candidate = &finished.outcome.selected_candidate;
    ResultCard::new(&candidate.id, &candidate.label, &wheel.catalog)
        .with_spin(finished.summary(spin.tick_count))
        .with_record(recorded.then_some(&record))
        .print(args.format)
}

/// Waits out the presentation delays. Returns `false` if cancelled.
async fn reveal(wheel: &Wheel, args: &SpinArgs, quiet: bool, cancel: &CancellationToken) -> bool {
    let presentation = wheel.config.presentation;
    let fireworks = Duration::from_millis(presentation.fireworks_delay_ms);
    let reveal = args
        .reveal_delay
        .unwrap_or_else(|| Duration::from_millis(presentation.reveal_delay_ms));

    let mut cues = vec![(fireworks, Cue::Fireworks), (reveal, Cue::Reveal)];
    cues.sort_by_key(|(at, _)| *at);

    let mut waited = Duration::ZERO;
    for (at, cue) in cues {
        tokio::select! {
            () = cancel.cancelled() => return false,
            () = tokio::time::sleep(at.saturating_sub(waited)) => {}
        }
        waited = waited.max(at);
        if cue == Cue::Fireworks && !quiet {
            eprintln!("🎆 🎆 🎆");
        }
    }
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cue {
    Fireworks,
    Reveal,
}

/// A spin that reached `result`.
struct Finished {
    epoch: u64,
    outcome: SpinOutcome,
    at: Duration,
}

impl Finished {
    fn summary(&self, ticks: u64) -> SpinSummary {
        SpinSummary {
            selected_index: self.outcome.selected_index,
            full_turns: self.outcome.full_turns,
            rotation_degrees: self.outcome.rotation_degrees,
            duration_ms: self.outcome.total_duration_ms,
            epoch: self.epoch,
            elapsed_ms: u64::try_from(self.at.as_millis()).unwrap_or(u64::MAX),
            ticks,
        }
    }
}

struct SpinRun<'a> {
    wheel: &'a Wheel,
    emitter: &'a EventEmitter,
    ticks: TickDetector,
    tick_count: u64,
    status: StatusLine,
}

impl SpinRun<'_> {
    fn start<S: Scheduler>(
        &self,
        seq: &mut PhaseSequencer<S>,
    ) -> Result<SpinOutcome, RouletteError> {
        let outcome = seq.start_spin(&self.wheel.candidates)?;
        self.emitter.emit(Event::SpinStarted {
            timestamp: Utc::now(),
            epoch: seq.epoch(),
            candidates: self.wheel.candidates.len(),
            selected_index: outcome.selected_index,
            rotation_degrees: outcome.rotation_degrees,
            duration_ms: outcome.total_duration_ms,
        });
        Ok(outcome)
    }

    fn sequencer<S: Scheduler>(&self, scheduler: S) -> PhaseSequencer<S> {
        let spin = self.wheel.config.spin;
        match self.wheel.seed {
            Some(seed) => PhaseSequencer::with_seed(spin, scheduler, seed),
            None => PhaseSequencer::new(spin, scheduler),
        }
    }

    /// Handles an applied transition. Returns the finished spin on `result`.
    fn on_transition(&self, transition: PhaseTransition) -> Option<Finished> {
        self.emitter.emit(Event::PhaseEntered {
            timestamp: Utc::now(),
            epoch: transition.epoch,
            from: transition.from,
            to: transition.to,
            at_ms: u64::try_from(transition.at.as_millis()).unwrap_or(u64::MAX),
        });
        let outcome = transition.outcome?;
        self.emitter.emit(Event::SpinResult {
            timestamp: Utc::now(),
            epoch: transition.epoch,
            candidate_id: outcome.selected_candidate.id.clone(),
            candidate_label: outcome.selected_candidate.label.clone(),
        });
        Some(Finished {
            epoch: transition.epoch,
            outcome,
            at: transition.at,
        })
    }

    fn on_frame<S: Scheduler>(&mut self, seq: &PhaseSequencer<S>, outcome: &SpinOutcome) {
        let phase = seq.phase();
        let frame = compute_display_state(
            seq.elapsed(),
            outcome,
            0.0,
            self.wheel.candidates.len(),
        );
        if self.ticks.observe(phase, frame.section_index) {
            self.tick_count += 1;
            metrics::record_tick(phase);
            self.emitter.emit(Event::Tick {
                timestamp: Utc::now(),
                epoch: seq.epoch(),
                phase,
                section_index: frame.section_index,
            });
        }
        let label = self
            .wheel
            .candidates
            .get(frame.section_index)
            .map_or("", |c| c.label.as_str());
        self.status.draw(phase, frame.progress, label);
    }

    /// Runs the spin on a virtual clock, one frame interval at a time.
    fn run_virtual(&mut self) -> Result<Option<Finished>, RouletteError> {
        let mut seq = self.sequencer(ManualScheduler::new());
        let outcome = self.start(&mut seq)?;
        let frame = self.wheel.config.wheel.frame_interval();

        loop {
            for transition in seq.advance(frame) {
                if let Some(finished) = self.on_transition(transition) {
                    self.on_frame(&seq, &outcome);
                    return Ok(Some(finished));
                }
            }
            self.on_frame(&seq, &outcome);
        }
    }

    /// Runs the spin on tokio timers, rendering at the configured frame rate.
    async fn run_realtime(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<Option<Finished>, RouletteError> {
        let (scheduler, mut steps) = TokioScheduler::new();
        let mut seq = self.sequencer(scheduler);
        let outcome = self.start(&mut seq)?;

        let mut frames = tokio::time::interval(self.wheel.config.wheel.frame_interval());
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    let from = seq.reset();
                    self.emitter.emit(Event::SpinReset { timestamp: Utc::now(), from });
                    return Ok(None);
                }
                Some(step) = steps.recv() => {
                    if let Some(transition) = seq.apply(step) {
                        if let Some(finished) = self.on_transition(transition) {
                            self.on_frame(&seq, &outcome);
                            return Ok(Some(finished));
                        }
                    }
                }
                _ = frames.tick() => self.on_frame(&seq, &outcome),
            }
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Single status line redrawn in place on stderr.
struct StatusLine {
    enabled: bool,
    drawn: bool,
}

impl StatusLine {
    const fn new(enabled: bool) -> Self {
        Self {
            enabled,
            drawn: false,
        }
    }

    fn draw(&mut self, phase: RoulettePhase, progress: f64, label: &str) {
        if !self.enabled {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = write!(
            stderr,
            "\r\x1b[2K{:<8} {:>5.1}%  ▶ {label}",
            phase.as_str(),
            progress * 100.0
        );
        let _ = stderr.flush();
        self.drawn = true;
    }

    fn finish(&mut self) {
        if self.drawn {
            eprintln!();
            self.drawn = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::RouletteConfig;
    use crate::roulette::Candidate;

    fn wheel() -> Wheel {
        let catalog = Catalog::from_json_str(
            r#"[
                {"한글이름": "클로드 모네", "영어이름": "Claude Monet", "id": "monet",
                 "운세": "빛이 머무는 한 해", "keywords": ["빛", "정원"]},
                {"한글이름": "김환기", "영어이름": "Kim Whanki", "id": "kim-whanki"},
                {"한글이름": "이중섭", "영어이름": "Lee Jung-seob", "id": "lee-jungseob"}
            ]"#,
        )
        .unwrap();
        let candidates = catalog.artists().iter().map(|a| a.to_candidate()).collect();
        Wheel {
            config: RouletteConfig::default(),
            catalog,
            candidates,
            seed: Some(3),
        }
    }

    #[test]
    fn test_virtual_run_reaches_result_with_ticks() {
        let wheel = wheel();
        let emitter = EventEmitter::noop();
        let mut spin = SpinRun {
            wheel: &wheel,
            emitter: &emitter,
            ticks: TickDetector::new(),
            tick_count: 0,
            status: StatusLine::new(false),
        };
        let finished = spin.run_virtual().unwrap().unwrap();
        assert_eq!(finished.at, Duration::from_millis(6000));
        assert_eq!(finished.epoch, 1);
        assert!(spin.tick_count > 0);
        // started + 3 phases + result + ticks
        assert_eq!(emitter.event_count(), 5 + spin.tick_count);
    }

    #[test]
    fn test_finished_summary() {
        let finished = Finished {
            epoch: 2,
            outcome: SpinOutcome {
                selected_index: 1,
                selected_candidate: Candidate::new("kim-whanki", "김환기"),
                full_turns: 6,
                rotation_degrees: 2040.0,
                total_duration_ms: 6000,
            },
            at: Duration::from_micros(6_000_400),
        };
        let summary = finished.summary(9);
        assert_eq!(summary.epoch, 2);
        assert_eq!(summary.full_turns, 6);
        assert_eq!(summary.elapsed_ms, 6000);
        assert_eq!(summary.ticks, 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_realtime_run_cancelled_resets() {
        let wheel = wheel();
        let emitter = EventEmitter::noop();
        let mut spin = SpinRun {
            wheel: &wheel,
            emitter: &emitter,
            ticks: TickDetector::new(),
            tick_count: 0,
            status: StatusLine::new(false),
        };
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(3000)).await;
            trigger.cancel();
        });
        let finished = spin.run_realtime(&cancel).await.unwrap();
        assert!(finished.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_realtime_run_completes() {
        let wheel = wheel();
        let emitter = EventEmitter::noop();
        let mut spin = SpinRun {
            wheel: &wheel,
            emitter: &emitter,
            ticks: TickDetector::new(),
            tick_count: 0,
            status: StatusLine::new(false),
        };
        let finished = spin
            .run_realtime(&CancellationToken::new())
            .await
            .unwrap()
            .unwrap();
        // Timer wheel resolution is one millisecond
        assert!(finished.at >= Duration::from_millis(6000));
        assert!(finished.at < Duration::from_millis(6010));
        assert!(spin.tick_count > 0);
    }
}
