//! CLI argument definitions
//!
//! All clap derive structs for `fortune-roulette` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::catalog::SortKey;

// ============================================================================
// Root CLI
// ============================================================================

/// New Year's fortune wheel: spin to meet the artist guiding your year.
#[derive(Parser, Debug)]
#[command(name = "fortune-roulette", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(
        long,
        default_value = "auto",
        global = true,
        env = "FORTUNE_ROULETTE_COLOR"
    )]
    pub color: ColorChoice,

    /// Log format.
    #[arg(long, default_value = "human", global = true)]
    pub log_format: OutputFormat,
}

// ============================================================================
// Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Spin the wheel once and reveal the result.
    Spin(SpinArgs),

    /// Run many spins on a virtual clock and report hit counts.
    Simulate(SimulateArgs),

    /// Show the result card for an artist without spinning.
    Show(ShowArgs),

    /// Show fortune statistics from a record file.
    Stats(StatsArgs),

    /// List the artist catalog.
    Artists(ArtistsArgs),

    /// Validate configuration files.
    Validate(ValidateArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Inputs shared by commands that build a wheel.
#[derive(Args, Debug, Clone)]
pub struct WheelSource {
    /// Path to YAML configuration file.
    #[arg(short, long, env = "FORTUNE_ROULETTE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the artist catalog (JSON).
    #[arg(
        short,
        long,
        default_value = "data/artists.json",
        env = "FORTUNE_ROULETTE_ARTISTS"
    )]
    pub artists: PathBuf,

    /// Number of artists drawn onto the wheel (overrides config).
    #[arg(long)]
    pub display_count: Option<usize>,

    /// Seed for reproducible draws.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for `spin`.
#[derive(Args, Debug)]
pub struct SpinArgs {
    #[command(flatten)]
    pub source: WheelSource,

    /// Skip real-time waits and run the spin on a virtual clock.
    #[arg(long)]
    pub instant: bool,

    /// Append the result to this NDJSON record file.
    #[arg(long, env = "FORTUNE_ROULETTE_RECORD")]
    pub record: Option<PathBuf>,

    /// Nickname stored with the result.
    #[arg(long, default_value = "", env = "FORTUNE_ROULETTE_NICKNAME")]
    pub nickname: String,

    /// Write structured events to this file instead of stderr.
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Emit structured events at all.
    #[arg(long)]
    pub emit_events: bool,

    /// Delay before the result card is revealed (e.g. `2s`, `500ms`).
    #[arg(long, value_parser = humantime::parse_duration)]
    pub reveal_delay: Option<Duration>,

    /// Serve Prometheus metrics on this port while spinning.
    #[arg(long, env = "FORTUNE_ROULETTE_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Result output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `simulate`.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub source: WheelSource,

    /// Number of spins to run.
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub spins: u32,

    /// Report output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Artist id (or English name for entries without one).
    pub id: String,

    /// Path to the artist catalog (JSON).
    #[arg(
        short,
        long,
        default_value = "data/artists.json",
        env = "FORTUNE_ROULETTE_ARTISTS"
    )]
    pub artists: PathBuf,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// NDJSON record file written by `spin --record`.
    #[arg(long, env = "FORTUNE_ROULETTE_RECORD")]
    pub record: PathBuf,

    /// Artist catalog used to resolve names.
    #[arg(short, long, env = "FORTUNE_ROULETTE_ARTISTS")]
    pub artists: Option<PathBuf>,

    /// Number of rows per ranking.
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `artists`.
#[derive(Args, Debug)]
pub struct ArtistsArgs {
    /// Path to the artist catalog (JSON).
    #[arg(
        short,
        long,
        default_value = "data/artists.json",
        env = "FORTUNE_ROULETTE_ARTISTS"
    )]
    pub artists: PathBuf,

    /// Sort order.
    #[arg(long, default_value = "korean")]
    pub sort: ArtistSort,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Catalog sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ArtistSort {
    /// Korean name.
    #[default]
    Korean,
    /// English name.
    English,
    /// Popularity, most popular first.
    Popularity,
}

impl From<ArtistSort> for SortKey {
    fn from(sort: ArtistSort) -> Self {
        match sort {
            ArtistSort::Korean => Self::Korean,
            ArtistSort::English => Self::English,
            ArtistSort::Popularity => Self::Popularity,
        }
    }
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================
