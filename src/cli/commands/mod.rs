//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod artists;
pub mod card;
pub mod completions;
pub mod show;
pub mod simulate;
pub mod spin;
pub mod stats;
pub mod validate;
pub mod version;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::cli::args::{Cli, Commands, WheelSource};
use crate::config::{ConfigLoader, ConfigLimits, RouletteConfig};
use crate::error::RouletteError;
use crate::roulette::Candidate;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// `cancel` fires on SIGINT/SIGTERM; long-running commands stop early
/// when it does.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), RouletteError> {
    let quiet = cli.quiet;
    match cli.command {
        Commands::Spin(args) => spin::run(&args, quiet, cancel).await,
        Commands::Simulate(args) => simulate::run(&args, &cancel),
        Commands::Show(args) => show::run(&args),
        Commands::Stats(args) => stats::run(&args),
        Commands::Artists(args) => artists::run(&args),
        Commands::Validate(args) => validate::run(&args),
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// Everything needed to spin: validated config, catalog and the drawn
/// candidates.
#[derive(Debug)]
pub struct Wheel {
    pub config: RouletteConfig,
    pub catalog: Catalog,
    pub candidates: Vec<Candidate>,
    pub seed: Option<u64>,
}

/// Loads config and catalog for `source` and draws the display subset.
///
/// # Errors
///
/// Returns a config, catalog or usage error.
pub fn prepare_wheel(source: &WheelSource) -> Result<Wheel, RouletteError> {
    let limits = ConfigLimits::default();
    let mut config = match &source.config {
        Some(path) => {
            info!(config = %path.display(), "loading configuration");
            let loaded = ConfigLoader::new(limits.clone()).load(path)?;
            for warning in &loaded.warnings {
                warn!(
                    location = warning.location.as_deref().unwrap_or("<unknown>"),
                    "{}",
                    warning.message
                );
            }
            loaded.config
        }
        None => RouletteConfig::default(),
    };

    if let Some(count) = source.display_count {
        if count == 0 || count > limits.max_display_count {
            return Err(RouletteError::Usage(format!(
                "--display-count must be between 1 and {}",
                limits.max_display_count
            )));
        }
        config.wheel.display_count = count;
    }

    let catalog = Catalog::from_path(&source.artists)?;
    let mut rng = source
        .seed
        .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
    let candidates = catalog.display_subset(config.wheel.display_count, &mut rng);
    info!(
        artists = catalog.len(),
        on_wheel = candidates.len(),
        "wheel prepared"
    );

    Ok(Wheel {
        config,
        catalog,
        candidates,
        seed: source.seed,
    })
}
