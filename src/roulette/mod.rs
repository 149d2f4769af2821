//! Fortune wheel engine
//!
//! Selects a winner, sequences the spin phases on a scheduler, and computes
//! the per-frame display state a renderer needs.
//!
//! # Architecture
//!
//! - [`selection`]: uniform winner draw and target rotation
//! - [`state`]: [`SpinState`] snapshot and the pure [`transition`] function
//! - [`schedule`]: [`Scheduler`] trait with manual and tokio clocks
//! - [`sequencer`]: [`PhaseSequencer`], the single owner of spin state
//! - [`motion`]: easing, display state and tick detection

pub mod motion;
pub mod schedule;
pub mod selection;
pub mod sequencer;
pub mod state;

pub use crate::config::schema::SpinConfig;
pub use motion::{DisplayState, TickDetector, compute_display_state, eased_progress, progress};
pub use schedule::{ManualScheduler, PhaseStep, Scheduler, TokioScheduler, timer_plan};
pub use selection::{Candidate, FULL_TURN_DEGREES, SpinOutcome, sector_angle, select};
pub use sequencer::PhaseSequencer;
pub use state::{PhaseTransition, RoulettePhase, SpinEvent, SpinState, transition};
