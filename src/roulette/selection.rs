//! Selection engine
//!
//! Picks the winning candidate uniformly at random and computes the
//! cumulative rotation that lands the pointer on its sector.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::schema::SpinConfig;

/// Degrees in one full turn of the wheel.
pub const FULL_TURN_DEGREES: f64 = 360.0;

/// One selectable item on the wheel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    /// Stable identifier
    pub id: String,
    /// Display label
    pub label: String,
}

impl Candidate {
    /// Creates a candidate from an id and a label.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Result of a selection, fixed for the lifetime of one spin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpinOutcome {
    /// Index of the winner in the candidate list
    pub selected_index: usize,
    /// The winning candidate
    pub selected_candidate: Candidate,
    /// Whole turns added before the target angle
    pub full_turns: u32,
    /// `full_turns * 360 + selected_index * sector_angle`
    pub rotation_degrees: f64,
    /// `base_duration_ms + suspense_duration_ms`
    pub total_duration_ms: u64,
}

impl SpinOutcome {
    /// Returns the angle of the selected sector's start within one turn.
    #[must_use]
    pub fn target_angle(&self) -> f64 {
        self.rotation_degrees - f64::from(self.full_turns) * FULL_TURN_DEGREES
    }
}

/// Returns the angular width of one sector for `count` candidates.
///
/// Zero candidates yield a full turn so callers never divide by zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sector_angle(count: usize) -> f64 {
    if count == 0 {
        FULL_TURN_DEGREES
    } else {
        FULL_TURN_DEGREES / count as f64
    }
}

/// Returns the start angle of sector `index` on a wheel of `count` sectors.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sector_start(index: usize, count: usize) -> f64 {
    index as f64 * sector_angle(count)
}

/// Selects a winner and the rotation that lands on it.
///
/// Returns `None` when `candidates` is empty. The index is uniform over the
/// list and previous winners are not excluded. The number of full turns is
/// drawn once, uniformly from `[min_rotations, max_rotations)`, or is exactly
/// `min_rotations` when both bounds are equal.
pub fn select<R: Rng + ?Sized>(
    candidates: &[Candidate],
    config: &SpinConfig,
    rng: &mut R,
) -> Option<SpinOutcome> {
    if candidates.is_empty() {
        return None;
    }

    let count = candidates.len();
    let selected_index = rng.random_range(0..count);
    let full_turns = draw_full_turns(config, rng);
    let rotation_degrees =
        f64::from(full_turns) * FULL_TURN_DEGREES + sector_start(selected_index, count);

    Some(SpinOutcome {
        selected_index,
        selected_candidate: candidates[selected_index].clone(),
        full_turns,
        rotation_degrees,
        total_duration_ms: config.total_duration_ms(),
    })
}

fn draw_full_turns<R: Rng + ?Sized>(config: &SpinConfig, rng: &mut R) -> u32 {
    let span = config.max_rotations.saturating_sub(config.min_rotations);
    if span == 0 {
        return config.min_rotations;
    }
    config.min_rotations + rng.random_range(0..span)
}
