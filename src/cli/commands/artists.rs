//! `artists` command
//!
//! Lists the artist catalog in the requested order.

use std::fmt::Write as _;

use crate::catalog::{Artist, Catalog};
use crate::cli::args::{ArtistsArgs, OutputFormat};
use crate::error::RouletteError;

/// List the catalog.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
pub fn run(args: &ArtistsArgs) -> Result<(), RouletteError> {
    let catalog = Catalog::from_path(&args.artists)?;
    let sorted = catalog.sorted(args.sort.into());

    match args.format {
        OutputFormat::Human => print!("{}", render_human(&sorted)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&sorted)?),
    }
    Ok(())
}

fn render_human(artists: &[&Artist]) -> String {
    let width = artists
        .iter()
        .map(|a| a.key().chars().count())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for artist in artists {
        let _ = write!(
            out,
            "{:<width$}  {} ({})",
            artist.key(),
            artist.korean_name,
            artist.english_name
        );
        if let Some(score) = artist.popularity_score {
            let _ = write!(out, "  ★{score}");
        }
        out.push('\n');
    }
    let _ = writeln!(out, "\n{} artists", artists.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SortKey;

    #[test]
    fn test_render_human_lists_every_artist() {
        let catalog = Catalog::from_json_str(
            r#"[
                {"한글이름": "클로드 모네", "영어이름": "Claude Monet", "id": "monet", "popularityScore": 80},
                {"한글이름": "김환기", "영어이름": "Kim Whanki", "id": "kim-whanki"}
            ]"#,
        )
        .unwrap();
        let text = render_human(&catalog.sorted(SortKey::Popularity));
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("monet"));
        assert!(lines[0].contains("클로드 모네 (Claude Monet)"));
        assert!(lines[0].ends_with("★80"));
        assert!(lines[1].starts_with("kim-whanki"));
        assert!(text.trim_end().ends_with("2 artists"));
    }
}
