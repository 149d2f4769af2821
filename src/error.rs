//! Error types for `fortune-roulette`
//!
//! Domain errors for spins, configuration, the artist catalog and the
//! result recorder, aggregated by [`RouletteError`] for exit-code mapping.

use std::path::PathBuf;
use thiserror::Error;

use crate::roulette::RoulettePhase;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `fortune-roulette` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Spin rejected (no candidates, spin already running)
    pub const SPIN_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `fortune-roulette` operations.
#[derive(Debug, Error)]
pub enum RouletteError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Spin precondition not met
    #[error(transparent)]
    Spin(#[from] SpinError),

    /// Artist catalog error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Result recorder error
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Invalid command-line usage
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RouletteError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => ExitCode::CONFIG_ERROR,
            Self::Spin(_) => ExitCode::SPIN_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Catalog(CatalogError::Io { .. }) | Self::Record(RecordError::Io(_)) | Self::Io(_) => {
                ExitCode::IO_ERROR
            }
            Self::Catalog(_) | Self::Record(_) | Self::Json(_) => ExitCode::ERROR,
        }
    }
}

// ============================================================================
// Spin Errors
// ============================================================================

/// Precondition violations when starting a spin.
///
/// Both leave the sequencer state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpinError {
    /// The candidate list was empty.
    #[error("cannot spin without candidates")]
    NoCandidates,

    /// A spin is already running.
    #[error("spin already in progress (phase: {phase})")]
    SpinInProgress {
        /// Phase the sequencer was in when the request arrived
        phase: RoulettePhase,
    },
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}")]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Environment variable referenced in configuration is not set
    #[error("environment variable '{var}' not set (referenced at {location})")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
        /// Location in the configuration where it was referenced
        location: String,
    },
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Dotted path to the problematic field (e.g., "spin.max_rotations")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - validation failure that prevents configuration from being used
    Error,
    /// Warning - potential issue that does not prevent configuration loading
    Warning,
}

// ============================================================================
// Catalog Errors
// ============================================================================

/// Artist catalog loading errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog file could not be read
    #[error("cannot read artist catalog {path}: {source}")]
    Io {
        /// Path to the catalog file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Catalog JSON is malformed
    #[error("invalid artist catalog: {0}")]
    Json(#[from] serde_json::Error),

    /// Catalog contained no artists
    #[error("artist catalog is empty")]
    Empty,
}

// ============================================================================
// Record Errors
// ============================================================================

/// Result recorder errors.
#[derive(Debug, Error)]
pub enum RecordError {
    /// I/O failure while writing or reading records
    #[error("record I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record serialization failed
    #[error("record serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `fortune-roulette` operations.
pub type Result<T> = std::result::Result<T, RouletteError>;

// ============================================================================
// Tests
// ============================================================================
