//! End-to-end spin lifecycle through the public library API.

mod common;

use std::time::Duration;

use common::candidates;
use fortune_roulette::config::{ConfigLoader, SpinConfig};
use fortune_roulette::error::SpinError;
use fortune_roulette::record::{FortuneRecord, FortuneStats, MemoryRecorder, ResultRecorder};
use fortune_roulette::roulette::{
    ManualScheduler, PhaseSequencer, PhaseStep, RoulettePhase, TickDetector, TokioScheduler,
    compute_display_state,
};

fn sequencer(seed: u64) -> PhaseSequencer<ManualScheduler> {
    PhaseSequencer::with_seed(SpinConfig::default(), ManualScheduler::new(), seed)
}

#[test]
fn thirty_candidates_follow_timeline() {
    let wheel = candidates(30);
    let mut seq = sequencer(2026);
    let outcome = seq.start_spin(&wheel).unwrap();
    assert!(outcome.selected_index < 30);
    assert_eq!(outcome.total_duration_ms, 6000);

    let transitions = seq.run_to_completion();
    let timeline: Vec<(u128, RoulettePhase)> = transitions
        .iter()
        .map(|t| (t.at.as_millis(), t.to))
        .collect();
    assert_eq!(
        timeline,
        vec![
            (2400, RoulettePhase::Slowing),
            (4000, RoulettePhase::Stopping),
            (6000, RoulettePhase::Result),
        ]
    );

    let result = transitions.last().unwrap().outcome.as_ref().unwrap();
    assert_eq!(result, &outcome);
    assert_eq!(seq.phase(), RoulettePhase::Result);
}

#[test]
fn final_frame_rests_on_selected_sector() {
    for seed in 0..50 {
        let wheel = candidates(30);
        let mut seq = sequencer(seed);
        let outcome = seq.start_spin(&wheel).unwrap();
        let last = compute_display_state(Duration::from_millis(6000), &outcome, 0.0, wheel.len());
        assert!(last.finished);
        assert_eq!(last.section_index, outcome.selected_index, "seed {seed}");
    }
}

#[test]
fn second_spin_rejected_until_result() {
    let wheel = candidates(12);
    let mut seq = sequencer(1);
    seq.start_spin(&wheel).unwrap();

    for _ in 0..5 {
        seq.advance(Duration::from_millis(1000));
        let phase = seq.phase();
        assert!(matches!(
            seq.start_spin(&wheel),
            Err(SpinError::SpinInProgress { phase: p }) if p == phase
        ));
    }

    seq.advance(Duration::from_millis(1000));
    assert_eq!(seq.phase(), RoulettePhase::Result);
    seq.start_spin(&wheel).unwrap();
    assert_eq!(seq.epoch(), 2);
}

#[test]
fn reset_mid_spin_drops_old_steps() {
    let wheel = candidates(8);
    let mut seq = sequencer(3);
    seq.start_spin(&wheel).unwrap();
    seq.advance(Duration::from_millis(3000));
    assert_eq!(seq.phase(), RoulettePhase::Slowing);

    assert_eq!(seq.reset(), RoulettePhase::Slowing);
    assert_eq!(seq.phase(), RoulettePhase::Idle);
    assert_eq!(seq.scheduler().pending(), 0);

    // A late step from the old spin changes nothing
    let stale = PhaseStep {
        epoch: 1,
        to: RoulettePhase::Stopping,
    };
    assert!(seq.apply(stale).is_none());
    assert_eq!(seq.phase(), RoulettePhase::Idle);

    // The next spin runs its own full timeline
    seq.start_spin(&wheel).unwrap();
    let transitions = seq.run_to_completion();
    assert_eq!(transitions.len(), 3);
    assert!(transitions.iter().all(|t| t.epoch == seq.epoch()));
    assert_eq!(transitions[2].at, Duration::from_millis(6000));
}

#[test]
fn ticks_only_while_slowing_down() {
    let wheel = candidates(30);
    let mut seq = sequencer(11);
    let outcome = seq.start_spin(&wheel).unwrap();
    let mut detector = TickDetector::new();
    let mut ticks = Vec::new();

    while seq.phase() != RoulettePhase::Result {
        seq.advance(Duration::from_millis(16));
        let frame = compute_display_state(seq.elapsed(), &outcome, 0.0, wheel.len());
        if detector.observe(seq.phase(), frame.section_index) {
            ticks.push((seq.phase(), seq.elapsed()));
        }
    }

    assert!(!ticks.is_empty());
    assert_eq!(ticks[0].0, RoulettePhase::Slowing);
    assert_eq!(ticks[0].1, Duration::from_millis(2400));
    assert!(ticks.iter().all(|(phase, at)| {
        matches!(phase, RoulettePhase::Slowing | RoulettePhase::Stopping)
            && *at >= Duration::from_millis(2400)
            && *at < Duration::from_millis(6000)
    }));
}

#[test]
fn loaded_config_drives_timeline() {
    let loaded = ConfigLoader::with_defaults()
        .load_from_str("spin:\n  base_duration_ms: 1000\n  suspense_duration_ms: 500\n")
        .unwrap();
    let mut seq = PhaseSequencer::with_seed(loaded.config.spin, ManualScheduler::new(), 5);
    seq.start_spin(&candidates(4)).unwrap();
    let offsets: Vec<u128> = seq
        .run_to_completion()
        .iter()
        .map(|t| t.at.as_millis())
        .collect();
    assert_eq!(offsets, vec![600, 1000, 1500]);
}

#[test]
fn recorded_results_feed_stats() {
    let wheel = candidates(3);
    let recorder = MemoryRecorder::new();
    let mut seq = sequencer(99);

    for round in 0..9 {
        if seq.phase() == RoulettePhase::Result {
            seq.reset();
        }
        seq.start_spin(&wheel).unwrap();
        let result = seq
            .run_to_completion()
            .pop()
            .and_then(|t| t.outcome)
            .unwrap();
        let nickname = if round % 3 == 0 { "" } else { "호랑이" };
        recorder
            .record(&FortuneRecord::new(nickname, &result.selected_candidate))
            .unwrap();
    }

    let stats = FortuneStats::from_records(&recorder.records());
    assert_eq!(stats.total_spins, 9);
    assert_eq!(stats.artists.values().sum::<u64>(), 9);
    assert_eq!(stats.nicknames["호랑이"], 6);

    let ranking = stats.artist_ranking(None);
    assert!(ranking.windows(2).all(|w| w[0].count >= w[1].count));
}

#[tokio::test(start_paused = true)]
async fn tokio_scheduler_delivers_full_spin() {
    let (scheduler, mut steps) = TokioScheduler::new();
    let mut seq = PhaseSequencer::with_seed(SpinConfig::default(), scheduler, 8);
    seq.start_spin(&candidates(30)).unwrap();

    let mut entered = Vec::new();
    while let Some(step) = steps.recv().await {
        if let Some(transition) = seq.apply(step) {
            entered.push(transition.to);
            if transition.to == RoulettePhase::Result {
                break;
            }
        }
    }
    assert_eq!(
        entered,
        vec![
            RoulettePhase::Slowing,
            RoulettePhase::Stopping,
            RoulettePhase::Result
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn tokio_reset_silences_old_timers() {
    let (scheduler, mut steps) = TokioScheduler::new();
    let mut seq = PhaseSequencer::with_seed(SpinConfig::default(), scheduler, 8);
    seq.start_spin(&candidates(5)).unwrap();

    tokio::time::sleep(Duration::from_millis(1000)).await;
    seq.reset();
    assert_eq!(seq.scheduler().active_epochs(), 0);

    tokio::time::sleep(Duration::from_millis(10_000)).await;
    assert!(steps.try_recv().is_err());
    assert_eq!(seq.phase(), RoulettePhase::Idle);
}
