//! Fortune results and statistics
//!
//! Each finished spin produces a [`FortuneRecord`] handed to a
//! [`ResultRecorder`]. Recording is best-effort: the caller logs a failure
//! and carries on, the spin itself already reached `result`.
//!
//! [`JsonlRecorder`] appends one NDJSON line per record; [`load_records`]
//! reads them back for [`FortuneStats`].

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::error::RecordError;
use crate::roulette::Candidate;

// ============================================================================
// Records
// ============================================================================

/// One persisted fortune result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FortuneRecord {
    pub id: Uuid,
    /// Player nickname; empty when anonymous
    #[serde(default)]
    pub nickname: String,
    pub artist_id: String,
    pub artist_name: String,
    pub timestamp: DateTime<Utc>,
}

impl FortuneRecord {
    /// Creates a record for `candidate`, stamped now.
    #[must_use]
    pub fn new(nickname: impl Into<String>, candidate: &Candidate) -> Self {
        Self {
            id: Uuid::new_v4(),
            nickname: nickname.into(),
            artist_id: candidate.id.clone(),
            artist_name: candidate.label.clone(),
            timestamp: Utc::now(),
        }
    }
}

/// Persistence collaborator for finished spins.
pub trait ResultRecorder {
    /// Stores one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or written.
    fn record(&self, record: &FortuneRecord) -> Result<(), RecordError>;
}

/// Appends records as NDJSON to a file.
#[derive(Debug)]
pub struct JsonlRecorder {
    // Held only for one buffered write and flush
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlRecorder {
    /// Opens `path` for appending, creating it and its parent directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created.
    pub fn open(path: &Path) -> Result<Self, RecordError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        debug!(path = %path.display(), "record file opened");
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Path of the record file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultRecorder for JsonlRecorder {
    fn record(&self, record: &FortuneRecord) -> Result<(), RecordError> {
        let line = serde_json::to_string(record)?;
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{line}")?;
        writer.flush()?;
        drop(writer);
        Ok(())
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    records: Mutex<Vec<FortuneRecord>>,
}

impl MemoryRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn records(&self) -> Vec<FortuneRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ResultRecorder for MemoryRecorder {
    fn record(&self, record: &FortuneRecord) -> Result<(), RecordError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}

/// Reads records written by [`JsonlRecorder`].
///
/// Blank lines are skipped; malformed lines are skipped with a warning.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn load_records(path: &Path) -> Result<Vec<FortuneRecord>, RecordError> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<FortuneRecord>(trimmed) {
            Ok(record) => records.push(record),
            Err(e) => warn!(
                path = %path.display(),
                line = index + 1,
                error = %e,
                "skipping malformed record"
            ),
        }
    }
    Ok(records)
}

// ============================================================================
// Statistics
// ============================================================================

/// Aggregate counts over a set of records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FortuneStats {
    pub total_spins: u64,
    /// Spins per artist id
    pub artists: BTreeMap<String, u64>,
    /// Spins per nickname; anonymous spins are not counted here
    pub nicknames: BTreeMap<String, u64>,
}

/// One row of a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingEntry {
    /// Artist id or nickname
    pub key: String,
    /// Display name
    pub name: String,
    pub count: u64,
    /// Share of all spins, two decimals
    pub percentage: String,
}

impl FortuneStats {
    /// Folds records into counts.
    #[must_use]
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a FortuneRecord>) -> Self {
        let mut stats = Self::default();
        for record in records {
            stats.add(record);
        }
        stats
    }

    /// Counts one more record.
    pub fn add(&mut self, record: &FortuneRecord) {
        self.total_spins += 1;
        *self.artists.entry(record.artist_id.clone()).or_default() += 1;
        if !record.nickname.is_empty() {
            *self.nicknames.entry(record.nickname.clone()).or_default() += 1;
        }
    }

    /// Artists by spin count, names resolved through `catalog` when given.
    #[must_use]
    pub fn artist_ranking(&self, catalog: Option<&Catalog>) -> Vec<RankingEntry> {
        self.rank(&self.artists, |id| {
            catalog
                .and_then(|c| c.find(id))
                .map_or_else(|| id.to_string(), |a| a.korean_name.clone())
        })
    }

    /// Nicknames by spin count.
    #[must_use]
    pub fn nickname_ranking(&self) -> Vec<RankingEntry> {
        self.rank(&self.nicknames, str::to_string)
    }

    fn rank(
        &self,
        counts: &BTreeMap<String, u64>,
        name_of: impl Fn(&str) -> String,
    ) -> Vec<RankingEntry> {
        let mut entries: Vec<RankingEntry> = counts
            .iter()
            .map(|(key, &count)| RankingEntry {
                key: key.clone(),
                name: name_of(key),
                count,
                percentage: percentage(count, self.total_spins),
            })
            .collect();
        // BTreeMap iteration is already key-ordered, so a stable sort keeps
        // ties by key
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(count: u64, total: u64) -> String {
    if total == 0 {
        return "0.00".to_string();
    }
    format!("{:.2}", count as f64 / total as f64 * 100.0)
}
