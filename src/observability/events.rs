//! Structured event stream for `fortune-roulette`.
//!
//! Discrete, typed events emitted while a spin runs. Events are serialized
//! as newline-delimited JSON (JSONL) with a monotonically increasing
//! sequence number.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::roulette::RoulettePhase;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during a spin.
///
/// Each variant is tagged with `"type"` when serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A spin was accepted and its outcome drawn.
    SpinStarted {
        /// When the spin started.
        timestamp: DateTime<Utc>,
        /// Spin generation.
        epoch: u64,
        /// Number of candidates on the wheel.
        candidates: usize,
        /// Index of the selected candidate.
        selected_index: usize,
        /// Total rotation in degrees.
        rotation_degrees: f64,
        /// Total animation duration in milliseconds.
        duration_ms: u64,
    },

    /// The sequencer entered a new phase.
    PhaseEntered {
        /// When the transition was applied.
        timestamp: DateTime<Utc>,
        /// Spin generation.
        epoch: u64,
        /// Phase before the change.
        from: RoulettePhase,
        /// Phase after the change.
        to: RoulettePhase,
        /// Milliseconds since the spin started.
        at_ms: u64,
    },

    /// The rendered rotation crossed into a new section.
    Tick {
        /// When the tick was raised.
        timestamp: DateTime<Utc>,
        /// Spin generation.
        epoch: u64,
        /// Phase the tick was raised in.
        phase: RoulettePhase,
        /// Section under the pointer.
        section_index: usize,
    },

    /// The wheel stopped on a candidate.
    SpinResult {
        /// When the result phase was entered.
        timestamp: DateTime<Utc>,
        /// Spin generation.
        epoch: u64,
        /// Winning candidate id.
        candidate_id: String,
        /// Winning candidate label.
        candidate_label: String,
    },

    /// The sequencer was reset to idle.
    SpinReset {
        /// When the reset happened.
        timestamp: DateTime<Utc>,
        /// Phase the sequencer was in.
        from: RoulettePhase,
    },

    /// Persisting a result failed. The spin itself is unaffected.
    RecordFailed {
        /// When the failure occurred.
        timestamp: DateTime<Utc>,
        /// Error description.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Serialization or I/O failures are silently dropped.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

// Box<dyn Write> is not Debug
impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates an emitter that silently discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}
