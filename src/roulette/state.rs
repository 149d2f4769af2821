//! Spin state representation and pure transitions
//!
//! [`SpinState`] is the sequencer's authoritative snapshot. It only ever
//! changes through [`transition`], a pure `(state, event) -> state` function,
//! so every ordering rule lives in one place and is testable without timers.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use super::selection::{Candidate, SpinOutcome};

/// Phase of the spin state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoulettePhase {
    /// Waiting for a spin request
    #[default]
    Idle,
    /// Fast initial spin
    Spinning,
    /// First deceleration
    Slowing,
    /// Suspenseful crawl to a stop
    Stopping,
    /// Wheel stopped on the selected candidate
    Result,
}

impl RoulettePhase {
    /// Returns the phase that follows this one in a running spin.
    ///
    /// `Idle` and `Result` have no timed successor: leaving them requires
    /// a new spin or a reset.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Spinning => Some(Self::Slowing),
            Self::Slowing => Some(Self::Stopping),
            Self::Stopping => Some(Self::Result),
            Self::Idle | Self::Result => None,
        }
    }

    /// Returns whether a new spin may start from this phase.
    #[must_use]
    pub const fn accepts_spin(self) -> bool {
        matches!(self, Self::Idle | Self::Result)
    }

    /// Returns whether the wheel is moving.
    #[must_use]
    pub const fn is_spinning(self) -> bool {
        matches!(self, Self::Spinning | Self::Slowing | Self::Stopping)
    }

    /// Returns the lowercase phase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Spinning => "spinning",
            Self::Slowing => "slowing",
            Self::Stopping => "stopping",
            Self::Result => "result",
        }
    }
}

impl fmt::Display for RoulettePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the sequencer state.
///
/// Readers (renderer, recorder) receive clones; only the sequencer
/// replaces it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SpinState {
    /// Current phase
    pub phase: RoulettePhase,
    /// Index of the selected candidate, if a spin has started
    pub selected_index: Option<usize>,
    /// The selected candidate, if a spin has started
    pub selected_candidate: Option<Candidate>,
    /// Total rotation of the current spin in degrees
    pub rotation_degrees: f64,
    /// Total animation duration of the current spin in milliseconds
    pub duration_ms: u64,
}

impl SpinState {
    /// Returns the idle state with all outcome fields cleared.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    /// Returns the animation duration of the current spin.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Input to the pure transition function.
#[derive(Debug, Clone, PartialEq)]
pub enum SpinEvent {
    /// Begin a spin with a freshly selected outcome.
    Start(SpinOutcome),
    /// A scheduled step wants to move the machine into the given phase.
    Advance(RoulettePhase),
    /// Unconditionally return to idle.
    Reset,
}

/// Applies `event` to `state` and returns the resulting state.
///
/// Rejected events return `state` unchanged:
/// - `Start` outside `idle`/`result`
/// - `Advance` to anything other than the current phase's successor
pub fn transition(state: SpinState, event: SpinEvent) -> SpinState {
    match event {
        SpinEvent::Start(outcome) if state.phase.accepts_spin() => SpinState {
            phase: RoulettePhase::Spinning,
            selected_index: Some(outcome.selected_index),
            selected_candidate: Some(outcome.selected_candidate),
            rotation_degrees: outcome.rotation_degrees,
            duration_ms: outcome.total_duration_ms,
        },
        SpinEvent::Advance(to) if state.phase.next() == Some(to) => SpinState {
            phase: to,
            ..state
        },
        SpinEvent::Reset => SpinState::idle(),
        SpinEvent::Start(_) | SpinEvent::Advance(_) => state,
    }
}

/// Record of an applied phase change, handed back to the driver.
///
/// When `to` is [`RoulettePhase::Result`], `outcome` holds the finished
/// spin for the persistence collaborator.
#[derive(Debug, Clone)]
pub struct PhaseTransition {
    /// Spin generation the change belongs to
    pub epoch: u64,
    /// Phase before the change
    pub from: RoulettePhase,
    /// Phase after the change
    pub to: RoulettePhase,
    /// Time since the spin started
    pub at: Duration,
    /// Finished outcome, present only when entering `result`
    pub outcome: Option<SpinOutcome>,
}
