//! Phase sequencer
//!
//! [`PhaseSequencer`] is the single owner of [`SpinState`]. A spin draws its
//! outcome, arms the timer plan on the injected [`Scheduler`], and then only
//! moves forward when the driver feeds delivered steps back through
//! [`apply`](PhaseSequencer::apply).
//!
//! Every step carries the epoch it was armed in. Starting a spin or
//! resetting bumps the epoch, so a late step from an earlier spin is
//! dropped instead of overwriting the current one.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use super::schedule::{ManualScheduler, PhaseStep, Scheduler, timer_plan};
use super::selection::{Candidate, SpinOutcome, select};
use super::state::{PhaseTransition, RoulettePhase, SpinEvent, SpinState, transition};
use crate::config::schema::SpinConfig;
use crate::error::SpinError;
use crate::observability::metrics;

/// Drives `idle → spinning → slowing → stopping → result`.
#[derive(Debug)]
pub struct PhaseSequencer<S: Scheduler> {
    config: SpinConfig,
    state: SpinState,
    outcome: Option<SpinOutcome>,
    epoch: u64,
    started_at: Duration,
    scheduler: S,
    rng: StdRng,
}

impl<S: Scheduler> PhaseSequencer<S> {
    /// Creates a sequencer seeded from the operating system RNG.
    #[must_use]
    pub fn new(config: SpinConfig, scheduler: S) -> Self {
        Self::with_rng(config, scheduler, StdRng::from_os_rng())
    }

    /// Creates a sequencer whose draws are reproducible for `seed`.
    #[must_use]
    pub fn with_seed(config: SpinConfig, scheduler: S, seed: u64) -> Self {
        Self::with_rng(config, scheduler, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SpinConfig, scheduler: S, rng: StdRng) -> Self {
        Self {
            config,
            state: SpinState::idle(),
            outcome: None,
            epoch: 0,
            started_at: Duration::ZERO,
            scheduler,
            rng,
        }
    }

    /// Current state snapshot.
    #[must_use]
    pub const fn state(&self) -> &SpinState {
        &self.state
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> RoulettePhase {
        self.state.phase
    }

    /// Current spin generation.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Spin configuration.
    #[must_use]
    pub const fn config(&self) -> &SpinConfig {
        &self.config
    }

    /// Outcome of the current spin, if one is running or finished.
    #[must_use]
    pub const fn outcome(&self) -> Option<&SpinOutcome> {
        self.outcome.as_ref()
    }

    /// The scheduler steps are armed on.
    #[must_use]
    pub const fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Time since the current spin started, or zero when idle.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        if self.outcome.is_none() {
            return Duration::ZERO;
        }
        self.scheduler.now().saturating_sub(self.started_at)
    }

    /// Starts a spin over `candidates`.
    ///
    /// # Errors
    ///
    /// - [`SpinError::SpinInProgress`] while the wheel is moving
    /// - [`SpinError::NoCandidates`] when `candidates` is empty
    ///
    /// The state is left untouched in both cases.
    pub fn start_spin(&mut self, candidates: &[Candidate]) -> Result<SpinOutcome, SpinError> {
        let phase = self.state.phase;
        if !phase.accepts_spin() {
            debug!(%phase, "spin rejected: already spinning");
            metrics::record_rejected_spin("spin_in_progress");
            return Err(SpinError::SpinInProgress { phase });
        }

        let Some(outcome) = select(candidates, &self.config, &mut self.rng) else {
            debug!("spin rejected: no candidates");
            metrics::record_rejected_spin("no_candidates");
            return Err(SpinError::NoCandidates);
        };

        self.epoch += 1;
        self.started_at = self.scheduler.now();
        self.state = transition(
            std::mem::take(&mut self.state),
            SpinEvent::Start(outcome.clone()),
        );
        self.outcome = Some(outcome.clone());

        for (offset, to) in timer_plan(&self.config) {
            self.scheduler.schedule(
                offset,
                PhaseStep {
                    epoch: self.epoch,
                    to,
                },
            );
        }

        info!(
            epoch = self.epoch,
            candidates = candidates.len(),
            selected_index = outcome.selected_index,
            candidate = %outcome.selected_candidate.label,
            full_turns = outcome.full_turns,
            rotation_degrees = outcome.rotation_degrees,
            duration_ms = outcome.total_duration_ms,
            "spin started"
        );
        metrics::record_spin_started(candidates.len());
        metrics::record_phase_transition(phase, RoulettePhase::Spinning);

        Ok(outcome)
    }

    /// Applies a delivered step.
    ///
    /// Returns the applied transition, or `None` when the step belongs to a
    /// superseded epoch or does not follow the current phase.
    pub fn apply(&mut self, step: PhaseStep) -> Option<PhaseTransition> {
        if step.epoch != self.epoch {
            debug!(
                step_epoch = step.epoch,
                current_epoch = self.epoch,
                to = %step.to,
                "dropping stale phase step"
            );
            metrics::record_stale_step();
            return None;
        }

        let from = self.state.phase;
        let next = transition(self.state.clone(), SpinEvent::Advance(step.to));
        if next.phase == from {
            debug!(%from, to = %step.to, "ignoring out-of-order phase step");
            return None;
        }
        self.state = next;

        let at = self.elapsed();
        let outcome = if step.to == RoulettePhase::Result {
            metrics::record_spin_duration(at);
            self.outcome.clone()
        } else {
            None
        };

        info!(
            epoch = self.epoch,
            %from,
            to = %step.to,
            at_ms = at.as_millis(),
            "phase entered"
        );
        metrics::record_phase_transition(from, step.to);

        Some(PhaseTransition {
            epoch: self.epoch,
            from,
            to: step.to,
            at,
            outcome,
        })
    }

    /// Returns to `idle` from any phase, cancelling pending steps.
    ///
    /// Returns the phase the sequencer was in.
    pub fn reset(&mut self) -> RoulettePhase {
        let from = self.state.phase;
        self.scheduler.cancel(self.epoch);
        self.epoch += 1;
        self.state = transition(std::mem::take(&mut self.state), SpinEvent::Reset);
        self.outcome = None;
        info!(%from, epoch = self.epoch, "spin reset");
        from
    }
}

impl PhaseSequencer<ManualScheduler> {
    /// Moves the virtual clock forward by `by`, applying every step that
    /// comes due on the way.
    pub fn advance(&mut self, by: Duration) -> Vec<PhaseTransition> {
        let until = self.scheduler.now() + by;
        let mut applied = Vec::new();
        while let Some(step) = self.scheduler.pop_due(until) {
            applied.extend(self.apply(step));
        }
        self.scheduler.set_now(until);
        applied
    }

    /// Runs the virtual clock until no steps remain.
    pub fn run_to_completion(&mut self) -> Vec<PhaseTransition> {
        let mut applied = Vec::new();
        while let Some(due) = self.scheduler.next_due() {
            let by = due.saturating_sub(self.scheduler.now());
            applied.extend(self.advance(by));
        }
        applied
    }

    /// Mutable access to the virtual clock.
    pub const fn scheduler_mut(&mut self) -> &mut ManualScheduler {
        &mut self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate::new(format!("artist-{i}"), format!("작가 {i}")))
            .collect()
    }

    fn sequencer() -> PhaseSequencer<ManualScheduler> {
        PhaseSequencer::with_seed(SpinConfig::default(), ManualScheduler::new(), 42)
    }

    #[test]
    fn test_starts_idle() {
        let seq = sequencer();
        assert_eq!(seq.phase(), RoulettePhase::Idle);
        assert_eq!(seq.epoch(), 0);
        assert!(seq.outcome().is_none());
        assert_eq!(seq.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_start_spin_arms_three_steps() {
        let mut seq = sequencer();
        let outcome = seq.start_spin(&candidates(30)).unwrap();
        assert_eq!(seq.phase(), RoulettePhase::Spinning);
        assert_eq!(seq.epoch(), 1);
        assert_eq!(seq.state().selected_index, Some(outcome.selected_index));
        assert_eq!(seq.state().duration_ms, 6000);
        assert_eq!(seq.scheduler().pending(), 3);
    }

    #[test]
    fn test_empty_candidates_rejected() {
        let mut seq = sequencer();
        assert_eq!(seq.start_spin(&[]), Err(SpinError::NoCandidates));
        assert_eq!(seq.state(), &SpinState::idle());
        assert_eq!(seq.epoch(), 0);
        assert_eq!(seq.scheduler().pending(), 0);
    }

    #[test]
    fn test_spin_rejected_while_moving() {
        let mut seq = sequencer();
        seq.start_spin(&candidates(30)).unwrap();

        let mut rejected_in = Vec::new();
        for _ in 0..6 {
            let before = seq.state().clone();
            let epoch = seq.epoch();
            let err = seq.start_spin(&candidates(5)).unwrap_err();
            assert_eq!(err, SpinError::SpinInProgress { phase: before.phase });
            assert_eq!(seq.state(), &before);
            assert_eq!(seq.epoch(), epoch);
            rejected_in.push(before.phase);
            seq.advance(Duration::from_millis(1000));
            if seq.phase() == RoulettePhase::Result {
                break;
            }
        }
        assert!(rejected_in.contains(&RoulettePhase::Slowing));
        assert!(rejected_in.contains(&RoulettePhase::Stopping));
    }

    #[test]
    fn test_phases_fire_at_plan_offsets() {
        let mut seq = sequencer();
        seq.start_spin(&candidates(30)).unwrap();
        let applied = seq.run_to_completion();

        let observed: Vec<(RoulettePhase, u128)> =
            applied.iter().map(|t| (t.to, t.at.as_millis())).collect();
        assert_eq!(
            observed,
            vec![
                (RoulettePhase::Slowing, 2400),
                (RoulettePhase::Stopping, 4000),
                (RoulettePhase::Result, 6000),
            ]
        );
        assert!(applied[..2].iter().all(|t| t.outcome.is_none()));
        assert!(applied[2].outcome.is_some());
    }

    #[test]
    fn test_tiny_base_keeps_phases_strictly_ordered() {
        for base in [1, 2, 3, 4001] {
            let config = SpinConfig {
                base_duration_ms: base,
                suspense_duration_ms: 2,
                ..SpinConfig::default()
            };
            let mut seq = PhaseSequencer::with_seed(config, ManualScheduler::new(), 1);
            seq.start_spin(&candidates(4)).unwrap();
            let applied = seq.run_to_completion();

            let offsets: Vec<Duration> = applied.iter().map(|t| t.at).collect();
            assert_eq!(offsets.len(), 3, "base={base}");
            assert!(Duration::ZERO < offsets[0], "base={base}");
            assert!(offsets.windows(2).all(|w| w[0] < w[1]), "base={base}");
            assert_eq!(offsets[0], Duration::from_micros(base * 600));
        }
    }

    #[test]
    fn test_advance_partial() {
        let mut seq = sequencer();
        seq.start_spin(&candidates(3)).unwrap();
        assert!(seq.advance(Duration::from_millis(2399)).is_empty());
        assert_eq!(seq.phase(), RoulettePhase::Spinning);
        let applied = seq.advance(Duration::from_millis(1));
        assert_eq!(applied.len(), 1);
        assert_eq!(seq.phase(), RoulettePhase::Slowing);
        assert_eq!(seq.elapsed(), Duration::from_millis(2400));
    }

    #[test]
    fn test_result_keeps_selection_and_allows_respin() {
        let mut seq = sequencer();
        let first = seq.start_spin(&candidates(8)).unwrap();
        seq.run_to_completion();
        assert_eq!(seq.phase(), RoulettePhase::Result);
        assert_eq!(seq.state().selected_index, Some(first.selected_index));

        seq.start_spin(&candidates(8)).unwrap();
        assert_eq!(seq.phase(), RoulettePhase::Spinning);
        assert_eq!(seq.epoch(), 2);
    }

    #[test]
    fn test_reset_from_every_phase() {
        for steps in 0..=3 {
            let mut seq = sequencer();
            seq.start_spin(&candidates(10)).unwrap();
            let plan = timer_plan(seq.config());
            if steps > 0 {
                seq.advance(plan[steps - 1].0);
            }
            seq.reset();
            assert_eq!(seq.state(), &SpinState::idle());
            assert_eq!(seq.state().selected_index, None);
            assert!(seq.state().rotation_degrees.abs() < f64::EPSILON);
            assert_eq!(seq.scheduler().pending(), 0);
        }
    }

    #[test]
    fn test_reset_while_idle() {
        let mut seq = sequencer();
        assert_eq!(seq.reset(), RoulettePhase::Idle);
        assert_eq!(seq.phase(), RoulettePhase::Idle);
    }

    #[test]
    fn test_stale_step_dropped_after_reset_and_respin() {
        let mut seq = sequencer();
        seq.start_spin(&candidates(10)).unwrap();
        let stale_epoch = seq.epoch();
        seq.advance(Duration::from_millis(3000));
        seq.reset();
        seq.start_spin(&candidates(10)).unwrap();

        let before = seq.state().clone();
        for to in [
            RoulettePhase::Slowing,
            RoulettePhase::Stopping,
            RoulettePhase::Result,
        ] {
            let applied = seq.apply(PhaseStep {
                epoch: stale_epoch,
                to,
            });
            assert!(applied.is_none());
            assert_eq!(seq.state(), &before);
        }
    }

    #[test]
    fn test_out_of_order_step_ignored() {
        let mut seq = sequencer();
        seq.start_spin(&candidates(4)).unwrap();
        let applied = seq.apply(PhaseStep {
            epoch: seq.epoch(),
            to: RoulettePhase::Result,
        });
        assert!(applied.is_none());
        assert_eq!(seq.phase(), RoulettePhase::Spinning);
    }

    #[test]
    fn test_same_seed_same_winner() {
        let list = candidates(30);
        let mut a = sequencer();
        let mut b = sequencer();
        assert_eq!(a.start_spin(&list).unwrap(), b.start_spin(&list).unwrap());
    }
}
