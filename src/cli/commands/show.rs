//! `show` command
//!
//! Reveals the result card for a given artist without spinning, the way a
//! shared result link opens straight onto the card.

use tracing::debug;

use super::card::ResultCard;
use crate::catalog::Catalog;
use crate::cli::args::ShowArgs;
use crate::error::RouletteError;

/// Print the result card for `args.id`.
///
/// # Errors
///
/// Returns a catalog error if the catalog cannot be loaded, or a usage
/// error if no artist has the given id.
pub fn run(args: &ShowArgs) -> Result<(), RouletteError> {
    let catalog = Catalog::from_path(&args.artists)?;
    card_for(&catalog, &args.id)?.print(args.format)
}

fn card_for(catalog: &Catalog, id: &str) -> Result<ResultCard, RouletteError> {
    let artist = catalog
        .find(id)
        .ok_or_else(|| RouletteError::Usage(format!("unknown artist id: {id}")))?;
    debug!(id, artist = %artist.korean_name, "showing result card");
    Ok(ResultCard::new(artist.key(), &artist.korean_name, catalog))
}
