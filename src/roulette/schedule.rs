//! Phase step scheduling
//!
//! The sequencer never sleeps itself. It hands each future phase change to a
//! [`Scheduler`] as a [`PhaseStep`] and applies the step when the scheduler
//! delivers it back. Two clocks are provided:
//!
//! - [`ManualScheduler`]: a virtual clock advanced explicitly, used by tests
//!   and by offline simulation
//! - [`TokioScheduler`]: wall-clock timers on the tokio runtime, delivered
//!   over an mpsc channel to the task that owns the sequencer

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::state::RoulettePhase;
use crate::config::schema::SpinConfig;

/// A scheduled phase change, tagged with the spin generation that armed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhaseStep {
    /// Epoch of the spin that scheduled this step
    pub epoch: u64,
    /// Phase to enter when the step fires
    pub to: RoulettePhase,
}

/// Deferred delivery of [`PhaseStep`]s.
pub trait Scheduler {
    /// Time elapsed on this scheduler's clock since it was created.
    fn now(&self) -> Duration;

    /// Arranges for `step` to be delivered after `delay`.
    fn schedule(&mut self, delay: Duration, step: PhaseStep);

    /// Drops every pending step armed in `epoch`.
    fn cancel(&mut self, epoch: u64);
}

/// Returns the phase changes of one spin as offsets from its start.
///
/// Offsets are strictly increasing for any valid configuration, so steps
/// fire in state-machine order.
#[must_use]
pub fn timer_plan(config: &SpinConfig) -> [(Duration, RoulettePhase); 3] {
    [
        (config.slowing_at(), RoulettePhase::Slowing),
        (config.stopping_at(), RoulettePhase::Stopping),
        (config.result_at(), RoulettePhase::Result),
    ]
}

// ============================================================================
// Manual Scheduler
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    due: Duration,
    seq: u64,
    step: PhaseStep,
}

impl Ord for Pending {
    // Reversed so the BinaryHeap pops the earliest (due, seq) first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Virtual-clock scheduler.
///
/// Time only moves when the owner calls [`pop_due`](Self::pop_due) or
/// [`set_now`](Self::set_now). Steps due at the same instant are delivered
/// in the order they were scheduled.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_seq: u64,
    queue: BinaryHeap<Pending>,
}

impl ManualScheduler {
    /// Creates a scheduler with its clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of steps waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Due time of the earliest pending step.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.peek().map(|p| p.due)
    }

    /// Pops the earliest step due at or before `until`.
    ///
    /// The clock jumps to the step's due time, so code reading
    /// [`Scheduler::now`] while applying the step sees the firing instant.
    pub fn pop_due(&mut self, until: Duration) -> Option<PhaseStep> {
        if self.queue.peek()?.due > until {
            return None;
        }
        let pending = self.queue.pop()?;
        self.now = self.now.max(pending.due);
        Some(pending.step)
    }

    /// Moves the clock forward to `now`. Never moves it backwards.
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule(&mut self, delay: Duration, step: PhaseStep) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Pending {
            due: self.now + delay,
            seq,
            step,
        });
    }

    fn cancel(&mut self, epoch: u64) {
        self.queue.retain(|p| p.step.epoch != epoch);
    }
}

// ============================================================================
// Tokio Scheduler
// ============================================================================

/// Wall-clock scheduler backed by tokio timers.
///
/// Each scheduled step runs in its own task that sleeps, then sends the step
/// on the channel returned by [`new`](Self::new). Every epoch shares one
/// [`CancellationToken`]; cancelling it wakes the sleeping tasks so they exit
/// without sending.
#[derive(Debug)]
pub struct TokioScheduler {
    origin: tokio::time::Instant,
    tx: mpsc::UnboundedSender<PhaseStep>,
    tokens: HashMap<u64, CancellationToken>,
}

impl TokioScheduler {
    /// Creates a scheduler and the receiver its steps are delivered on.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PhaseStep>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            origin: tokio::time::Instant::now(),
            tx,
            tokens: HashMap::new(),
        };
        (scheduler, rx)
    }

    /// Number of epochs with live timers.
    #[must_use]
    pub fn active_epochs(&self) -> usize {
        self.tokens.len()
    }

    fn token_for(&mut self, epoch: u64) -> CancellationToken {
        // A newer epoch supersedes everything armed before it
        self.tokens.retain(|&e, token| {
            if e < epoch {
                token.cancel();
                false
            } else {
                true
            }
        });
        self.tokens.entry(epoch).or_default().clone()
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    fn schedule(&mut self, delay: Duration, step: PhaseStep) {
        let token = self.token_for(step.epoch);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    // Receiver gone means the driver shut down
                    let _ = tx.send(step);
                }
            }
        });
    }

    fn cancel(&mut self, epoch: u64) {
        if let Some(token) = self.tokens.remove(&epoch) {
            debug!(epoch, "cancelling pending phase steps");
            token.cancel();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for token in self.tokens.values() {
            token.cancel();
        }
    }
}
