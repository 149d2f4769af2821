//! Configuration validation
//!
//! Semantic checks run on the deserialized [`RouletteConfig`]. Validation
//! collects ALL issues instead of stopping at the first one.

use crate::config::loader::ConfigLimits;
use crate::config::schema::{PresentationConfig, RouletteConfig, SpinConfig, WheelConfig};
use crate::error::{Severity, ValidationIssue};

/// Wheels with more sectors than this render unreadable labels.
const CROWDED_WHEEL_THRESHOLD: usize = 60;

/// Frame intervals above this look choppy.
const CHOPPY_FRAME_INTERVAL_MS: u64 = 100;

// ============================================================================
// Public API
// ============================================================================

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns the result.
    pub fn validate(&mut self, config: &RouletteConfig, limits: &ConfigLimits) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_spin(&config.spin);
        self.validate_wheel(&config.wheel, limits);
        self.validate_presentation(&config.presentation);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Sections
    // ========================================================================

    fn validate_spin(&mut self, spin: &SpinConfig) {
        if spin.min_rotations == 0 {
            self.add_error("spin.min_rotations", "Must be at least 1");
        }

        if spin.max_rotations < spin.min_rotations {
            self.add_error(
                "spin.max_rotations",
                &format!(
                    "Must be >= min_rotations ({} < {})",
                    spin.max_rotations, spin.min_rotations
                ),
            );
        }

        if spin.base_duration_ms == 0 {
            self.add_error("spin.base_duration_ms", "Must be greater than 0");
        }

        if spin.suspense_duration_ms == 0 {
            self.add_error("spin.suspense_duration_ms", "Must be greater than 0");
        }
    }

    fn validate_wheel(&mut self, wheel: &WheelConfig, limits: &ConfigLimits) {
        if wheel.display_count == 0 {
            self.add_error("wheel.display_count", "Must be at least 1");
        } else if wheel.display_count > limits.max_display_count {
            self.add_error(
                "wheel.display_count",
                &format!(
                    "Exceeds maximum of {} (got {})",
                    limits.max_display_count, wheel.display_count
                ),
            );
        } else if wheel.display_count > CROWDED_WHEEL_THRESHOLD {
            self.add_warning(
                "wheel.display_count",
                &format!(
                    "More than {CROWDED_WHEEL_THRESHOLD} sectors; labels will overlap"
                ),
            );
        }

        if wheel.frame_interval_ms == 0 {
            self.add_error("wheel.frame_interval_ms", "Must be greater than 0");
        } else if wheel.frame_interval_ms > CHOPPY_FRAME_INTERVAL_MS {
            self.add_warning(
                "wheel.frame_interval_ms",
                "Frame interval above 100ms will look choppy",
            );
        }
    }

    fn validate_presentation(&mut self, presentation: &PresentationConfig) {
        if presentation.fireworks_delay_ms > presentation.reveal_delay_ms {
            self.add_warning(
                "presentation.fireworks_delay_ms",
                "Fireworks start after the result card is revealed",
            );
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}
