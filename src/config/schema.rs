//! Configuration schema types
//!
//! Deserialized from the YAML configuration file. Every section has serde
//! defaults so an empty mapping yields the stock wheel.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default number of artists drawn onto the wheel.
pub const DEFAULT_DISPLAY_COUNT: usize = 30;

// ============================================================================
// Top-Level Configuration
// ============================================================================

/// Root configuration for the fortune wheel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouletteConfig {
    /// Spin timing and rotation bounds
    pub spin: SpinConfig,

    /// Wheel composition and frame pacing
    pub wheel: WheelConfig,

    /// Post-result presentation cues
    pub presentation: PresentationConfig,
}

// ============================================================================
// Spin
// ============================================================================

/// Rotation bounds and phase timing for a single spin.
///
/// Immutable for the lifetime of a spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpinConfig {
    /// Fewest whole turns before landing (inclusive)
    pub min_rotations: u32,

    /// Upper bound on whole turns (exclusive unless equal to the minimum)
    pub max_rotations: u32,

    /// Duration of the spinning and slowing phases, in milliseconds
    pub base_duration_ms: u64,

    /// Duration of the stopping phase, in milliseconds
    pub suspense_duration_ms: u64,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            min_rotations: 5,
            max_rotations: 8,
            base_duration_ms: 4000,
            suspense_duration_ms: 2000,
        }
    }
}

impl SpinConfig {
    /// Total animation time of a spin in milliseconds.
    #[must_use]
    pub const fn total_duration_ms(&self) -> u64 {
        self.base_duration_ms.saturating_add(self.suspense_duration_ms)
    }

    /// Offset at which `spinning` turns into `slowing` (60% of the base).
    ///
    /// Kept at microsecond precision so a 1 ms base still lands strictly
    /// after the start.
    #[must_use]
    pub const fn slowing_at(&self) -> Duration {
        Duration::from_micros(self.base_duration_ms.saturating_mul(600))
    }

    /// Offset at which `slowing` turns into `stopping`.
    #[must_use]
    pub const fn stopping_at(&self) -> Duration {
        Duration::from_millis(self.base_duration_ms)
    }

    /// Offset at which `stopping` turns into `result`.
    #[must_use]
    pub const fn result_at(&self) -> Duration {
        Duration::from_millis(self.total_duration_ms())
    }
}

// ============================================================================
// Wheel
// ============================================================================

/// Wheel composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WheelConfig {
    /// Number of artists drawn from the catalog onto the wheel
    pub display_count: usize,

    /// Interval between rendered frames, in milliseconds
    pub frame_interval_ms: u64,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            display_count: DEFAULT_DISPLAY_COUNT,
            frame_interval_ms: 16,
        }
    }
}

impl WheelConfig {
    /// Frame interval as a [`Duration`].
    #[must_use]
    pub const fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

// ============================================================================
// Presentation
// ============================================================================

/// Delays between reaching `result` and the celebration steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PresentationConfig {
    /// Delay before fireworks start, in milliseconds
    pub fireworks_delay_ms: u64,

    /// Delay before the result card is revealed, in milliseconds
    pub reveal_delay_ms: u64,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            fireworks_delay_ms: 300,
            reveal_delay_ms: 2000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spin_defaults() {
        let config = SpinConfig::default();
        assert_eq!(config.min_rotations, 5);
        assert_eq!(config.max_rotations, 8);
        assert_eq!(config.base_duration_ms, 4000);
        assert_eq!(config.suspense_duration_ms, 2000);
        assert_eq!(config.total_duration_ms(), 6000);
    }

    #[test]
    fn test_phase_offsets() {
        let config = SpinConfig::default();
        assert_eq!(config.slowing_at(), Duration::from_millis(2400));
        assert_eq!(config.stopping_at(), Duration::from_millis(4000));
        assert_eq!(config.result_at(), Duration::from_millis(6000));
    }

    #[test]
    fn test_slowing_offset_keeps_fraction() {
        let odd = SpinConfig {
            base_duration_ms: 4001,
            ..SpinConfig::default()
        };
        assert_eq!(odd.slowing_at(), Duration::from_micros(2_400_600));

        let tiny = SpinConfig {
            base_duration_ms: 1,
            suspense_duration_ms: 2,
            ..SpinConfig::default()
        };
        assert_eq!(tiny.slowing_at(), Duration::from_micros(600));
        assert!(Duration::ZERO < tiny.slowing_at());
        assert!(tiny.slowing_at() < tiny.stopping_at());
        assert!(tiny.stopping_at() < tiny.result_at());
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: RouletteConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, RouletteConfig::default());
        assert_eq!(config.wheel.display_count, DEFAULT_DISPLAY_COUNT);
        assert_eq!(config.presentation.reveal_delay_ms, 2000);
    }

    #[test]
    fn test_partial_yaml_merges_defaults() {
        let yaml = r"
spin:
  base_duration_ms: 3000
wheel:
  display_count: 12
";
        let config: RouletteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.spin.base_duration_ms, 3000);
        assert_eq!(config.spin.suspense_duration_ms, 2000);
        assert_eq!(config.wheel.display_count, 12);
        assert_eq!(config.wheel.frame_interval_ms, 16);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "spin:\n  min_turns: 3\n";
        assert!(serde_yaml::from_str::<RouletteConfig>(yaml).is_err());
    }
}
