#![no_main]

use std::time::Duration;

use fortune_roulette::roulette::{Candidate, SpinOutcome, compute_display_state};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u64, u64, f64, f64, u8)| {
    let (elapsed_ms, duration_ms, rotation, prior, count) = input;
    let count = usize::from(count);
    let outcome = SpinOutcome {
        selected_index: 0,
        selected_candidate: Candidate::new("fuzz", "fuzz"),
        full_turns: 0,
        rotation_degrees: rotation,
        total_duration_ms: duration_ms,
    };
    let state = compute_display_state(Duration::from_millis(elapsed_ms), &outcome, prior, count);
    assert!((0.0..=1.0).contains(&state.progress));
    assert!((0.0..=1.0).contains(&state.eased));
    assert!(count == 0 || state.section_index < count);
});
