//! `stats` command
//!
//! Summarizes a record file: total spins, then artist and nickname
//! rankings with shares of all spins.

use std::fmt::Write as _;

use serde::Serialize;
use tracing::info;

use crate::catalog::Catalog;
use crate::cli::args::{OutputFormat, StatsArgs};
use crate::error::RouletteError;
use crate::record::{FortuneStats, RankingEntry, load_records};

/// Print statistics for a record file.
///
/// # Errors
///
/// Returns an error if the record file or the catalog cannot be read.
pub fn run(args: &StatsArgs) -> Result<(), RouletteError> {
    let records = load_records(&args.record)?;
    let catalog = args
        .artists
        .as_deref()
        .map(Catalog::from_path)
        .transpose()?;
    info!(path = %args.record.display(), records = records.len(), "records loaded");

    let stats = FortuneStats::from_records(&records);
    let report = StatsReport::new(&stats, catalog.as_ref(), args.top);

    match args.format {
        OutputFormat::Human => print!("{}", report.render_human()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct StatsReport {
    total_spins: u64,
    artists: Vec<RankingEntry>,
    nicknames: Vec<RankingEntry>,
}

impl StatsReport {
    fn new(stats: &FortuneStats, catalog: Option<&Catalog>, top: usize) -> Self {
        let mut artists = stats.artist_ranking(catalog);
        artists.truncate(top);
        let mut nicknames = stats.nickname_ranking();
        nicknames.truncate(top);
        Self {
            total_spins: stats.total_spins,
            artists,
            nicknames,
        }
    }

    fn render_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "total spins: {}", self.total_spins);
        render_ranking(&mut out, "artists", &self.artists);
        render_ranking(&mut out, "nicknames", &self.nicknames);
        out
    }
}

fn render_ranking(out: &mut String, title: &str, entries: &[RankingEntry]) {
    let _ = writeln!(out, "\n{title}:");
    if entries.is_empty() {
        let _ = writeln!(out, "  (none)");
        return;
    }
    for (rank, entry) in entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>2}. {}  {} ({}%)",
            rank + 1,
            entry.name,
            entry.count,
            entry.percentage
        );
    }
}
