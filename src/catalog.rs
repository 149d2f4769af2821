//! Artist catalog
//!
//! Loads the artist list the wheel is built from. The on-disk format is a
//! JSON array keyed in Korean:
//!
//! ```json
//! [{ "한글이름": "빈센트 반 고흐", "영어이름": "Vincent van Gogh", "id": "van-gogh",
//!    "운세": "...", "keywords": ["열정"], "popularityScore": 87 }]
//! ```

use std::path::Path;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CatalogError;
use crate::roulette::Candidate;

/// One artist entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    /// Name shown on the wheel
    #[serde(rename = "한글이름")]
    pub korean_name: String,

    #[serde(rename = "영어이름")]
    pub english_name: String,

    /// Stable identifier used by records and statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Fortune text revealed on the result card
    #[serde(rename = "운세", default, skip_serializing_if = "Option::is_none")]
    pub fortune: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    #[serde(
        rename = "popularityScore",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub popularity_score: Option<f64>,
}

impl Artist {
    /// Identifier, falling back to the English name when none is set.
    #[must_use]
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.english_name)
    }

    /// Converts the artist into a wheel candidate.
    #[must_use]
    pub fn to_candidate(&self) -> Candidate {
        Candidate::new(self.key(), self.korean_name.clone())
    }

    /// Text for sharing this artist as a result.
    #[must_use]
    pub fn share_text(&self) -> String {
        share_text(&self.korean_name)
    }
}

/// Share message for a result, hashtagged with the artist's Korean name.
#[must_use]
pub fn share_text(korean_name: &str) -> String {
    format!(
        "🐴 2026 병오년 나의 예술가: {korean_name}\n\
         ✨ 예술가와 함께하는 특별한 한 해!\n\
         #아트프렌즈 #2026운세 #병오년 #{korean_name}"
    )
}

/// Catalog ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Korean name, ascending
    #[default]
    Korean,
    /// English name, ascending, ignoring case
    English,
    /// Popularity score, descending; missing scores count as zero
    Popularity,
}

/// The full artist list.
#[derive(Debug, Clone)]
pub struct Catalog {
    artists: Vec<Artist>,
}

impl Catalog {
    /// Builds a catalog from already-parsed artists.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Empty`] when `artists` is empty.
    pub fn new(artists: Vec<Artist>) -> Result<Self, CatalogError> {
        if artists.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { artists })
    }

    /// Parses a catalog from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Json`] on malformed input and
    /// [`CatalogError::Empty`] for an empty array.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let json = json.strip_prefix('\u{feff}').unwrap_or(json);
        let artists: Vec<Artist> = serde_json::from_str(json)?;
        Self::new(artists)
    }

    /// Reads and parses a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read, plus the
    /// errors of [`from_json_str`](Self::from_json_str).
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&json)?;
        debug!(path = %path.display(), artists = catalog.len(), "artist catalog loaded");
        Ok(catalog)
    }

    /// Number of artists.
    #[must_use]
    pub fn len(&self) -> usize {
        self.artists.len()
    }

    /// Always `false`; an empty catalog cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artists.is_empty()
    }

    /// All artists in catalog order.
    #[must_use]
    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    /// Looks an artist up by [`Artist::key`].
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Artist> {
        self.artists.iter().find(|a| a.key() == id)
    }

    /// Returns the artists ordered by `key`. Ties keep catalog order.
    #[must_use]
    pub fn sorted(&self, key: SortKey) -> Vec<&Artist> {
        let mut sorted: Vec<&Artist> = self.artists.iter().collect();
        match key {
            SortKey::Korean => sorted.sort_by(|a, b| a.korean_name.cmp(&b.korean_name)),
            SortKey::English => sorted.sort_by_cached_key(|a| a.english_name.to_lowercase()),
            SortKey::Popularity => sorted.sort_by(|a, b| {
                let a = a.popularity_score.unwrap_or(0.0);
                let b = b.popularity_score.unwrap_or(0.0);
                b.total_cmp(&a)
            }),
        }
        sorted
    }

    /// Draws `count` distinct artists uniformly at random as wheel
    /// candidates. A `count` above the catalog size returns every artist in
    /// shuffled order.
    pub fn display_subset<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Candidate> {
        let mut shuffled: Vec<&Artist> = self.artists.iter().collect();
        shuffled.shuffle(rng);
        shuffled
            .into_iter()
            .take(count)
            .map(Artist::to_candidate)
            .collect()
    }
}
