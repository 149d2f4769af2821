//! Frame-level motion contract
//!
//! A renderer calls [`compute_display_state`] every frame with the time
//! elapsed since the spin started. Nothing here depends on frame count, so
//! a dropped frame is simply caught up on the next one.

use std::time::Duration;

use serde::Serialize;

use super::selection::{FULL_TURN_DEGREES, SpinOutcome, sector_angle};
use super::state::RoulettePhase;

const SECTION_EPSILON: f64 = 1e-9;

/// Linear progress `min(elapsed / duration, 1)`. A zero duration is complete.
#[must_use]
pub fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0)
}

/// Front-loaded easing curve.
///
/// | progress | eased |
/// |---|---|
/// | `[0, 0.1)` | `5p` |
/// | `[0.1, 0.5)` | `0.5 + (p - 0.1) * 1.125` |
/// | `[0.5, 0.8)` | `1 - (1 - p)^2 * 0.2` |
/// | `[0.8, 1]` | `1 - (1 - p)^4 * 0.05` |
///
/// The cruise slope is 1.125 rather than 1.25: it is the slope that meets
/// the third piece at exactly 0.95 when `p = 0.5`. With 1.25 the curve would
/// fall from 1.0 back to 0.95 there and the wheel would visibly jump back.
///
/// The last fifth of the time resolves well under one percent of the
/// rotation. Input is clamped to `[0, 1]`; NaN maps to 0.
#[must_use]
pub fn eased_progress(p: f64) -> f64 {
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
    if p < 0.1 {
        p * 5.0
    } else if p < 0.5 {
        (p - 0.1).mul_add(1.125, 0.5)
    } else if p < 0.8 {
        (1.0 - p).powi(2).mul_add(-0.2, 1.0)
    } else {
        (1.0 - p).powi(4).mul_add(-0.05, 1.0)
    }
}

/// What the renderer draws on one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayState {
    /// Linear progress in `[0, 1]`
    pub progress: f64,
    /// Eased progress in `[0, 1]`
    pub eased: f64,
    /// Absolute wheel rotation in degrees
    pub rotation: f64,
    /// Section under the pointer
    pub section_index: usize,
    /// Whether the animation has reached its end
    pub finished: bool,
}

/// Computes the frame for `elapsed` time into the spin described by
/// `outcome`, starting from `prior_rotation`, on a wheel of
/// `candidate_count` sectors.
#[must_use]
pub fn compute_display_state(
    elapsed: Duration,
    outcome: &SpinOutcome,
    prior_rotation: f64,
    candidate_count: usize,
) -> DisplayState {
    let progress = progress(elapsed, Duration::from_millis(outcome.total_duration_ms));
    let eased = eased_progress(progress);
    let rotation = outcome.rotation_degrees.mul_add(eased, prior_rotation);
    DisplayState {
        progress,
        eased,
        rotation,
        section_index: section_at(rotation, candidate_count),
        finished: progress >= 1.0,
    }
}

/// Index of the section at `rotation` on a wheel of `count` sectors.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn section_at(rotation: f64, count: usize) -> usize {
    if count == 0 || !rotation.is_finite() {
        return 0;
    }
    let within_turn = rotation.rem_euclid(FULL_TURN_DEGREES);
    // A wheel resting exactly on a sector start belongs to that sector,
    // even when float error leaves it a hair short.
    let position = within_turn / sector_angle(count) + SECTION_EPSILON;
    (position.floor() as usize).min(count - 1)
}

/// Raises a tick each time the pointer enters a new section.
///
/// Ticks are suppressed outside `slowing` and `stopping`; sections seen
/// during the fast spin are not tracked, so the first frame after slowing
/// begins always ticks.
#[derive(Debug, Default, Clone)]
pub struct TickDetector {
    last_section: Option<usize>,
}

impl TickDetector {
    /// Creates a detector that has seen no sections.
    #[must_use]
    pub const fn new() -> Self {
        Self { last_section: None }
    }

    /// Observes a frame and returns whether it ticks.
    pub fn observe(&mut self, phase: RoulettePhase, section_index: usize) -> bool {
        if !matches!(phase, RoulettePhase::Slowing | RoulettePhase::Stopping) {
            return false;
        }
        if self.last_section == Some(section_index) {
            return false;
        }
        self.last_section = Some(section_index);
        true
    }

    /// Forgets the last section, as at the start of a new spin.
    pub const fn reset(&mut self) {
        self.last_section = None;
    }
}
