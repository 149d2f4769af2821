//! Result card shared by `spin` and `show`.

use std::fmt::Write as _;

use serde::Serialize;

use crate::catalog::{self, Catalog};
use crate::cli::args::OutputFormat;
use crate::error::RouletteError;
use crate::record::FortuneRecord;

/// The revealed result.
#[derive(Debug, Serialize)]
pub struct ResultCard {
    pub artist_id: String,
    pub artist_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub english_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fortune: Option<String>,
    pub keywords: Vec<String>,
    pub share_text: String,
    /// Present only when the card came out of a spin
    #[serde(flatten)]
    pub spin: Option<SpinSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

/// How the wheel got to the result.
#[derive(Debug, Clone, Serialize)]
pub struct SpinSummary {
    pub selected_index: usize,
    pub full_turns: u32,
    pub rotation_degrees: f64,
    pub duration_ms: u64,
    pub epoch: u64,
    pub elapsed_ms: u64,
    pub ticks: u64,
}

impl ResultCard {
    /// Card for `id`, filled in from the catalog where the artist is known.
    #[must_use]
    pub fn new(id: &str, label: &str, catalog: &Catalog) -> Self {
        let artist = catalog.find(id);
        Self {
            artist_id: id.to_string(),
            artist_name: label.to_string(),
            english_name: artist.map(|a| a.english_name.clone()),
            fortune: artist.and_then(|a| a.fortune.clone()),
            keywords: artist.map(|a| a.keywords.clone()).unwrap_or_default(),
            share_text: catalog::share_text(label),
            spin: None,
            record_id: None,
        }
    }

    #[must_use]
    pub fn with_spin(mut self, spin: SpinSummary) -> Self {
        self.spin = Some(spin);
        self
    }

    #[must_use]
    pub fn with_record(mut self, record: Option<&FortuneRecord>) -> Self {
        self.record_id = record.map(|r| r.id.to_string());
        self
    }

    /// Writes the card to stdout in `format`.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn print(&self, format: OutputFormat) -> Result<(), RouletteError> {
        match format {
            OutputFormat::Human => print!("{}", self.render_human()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(self)?),
        }
        Ok(())
    }

    #[must_use]
    pub fn render_human(&self) -> String {
        let mut out = String::from("✨ 올해의 운세 ✨\n");
        let _ = match &self.english_name {
            Some(english) => writeln!(out, "{} ({english})", self.artist_name),
            None => writeln!(out, "{}", self.artist_name),
        };
        if let Some(fortune) = &self.fortune {
            let _ = writeln!(out, "\n{fortune}");
        }
        if !self.keywords.is_empty() {
            let tags: Vec<String> = self.keywords.iter().map(|k| format!("#{k}")).collect();
            let _ = writeln!(out, "\n{}", tags.join(" "));
        }
        let _ = writeln!(out, "\n공유하기:\n{}", self.share_text);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_json_str(
            r#"[
                {"한글이름": "클로드 모네", "영어이름": "Claude Monet", "id": "monet",
                 "운세": "빛이 머무는 한 해", "keywords": ["빛", "정원"]}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_human_card() {
        let card = ResultCard::new("monet", "클로드 모네", &catalog());
        let text = card.render_human();
        assert!(text.contains("클로드 모네 (Claude Monet)"));
        assert!(text.contains("빛이 머무는 한 해"));
        assert!(text.contains("#빛 #정원"));
        assert!(text.contains("🐴 2026 병오년 나의 예술가: 클로드 모네"));
        assert!(text.ends_with("#병오년 #클로드 모네\n"));
    }

    #[test]
    fn test_json_without_spin() {
        let card = ResultCard::new("monet", "클로드 모네", &catalog());
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["artist_id"], "monet");
        assert!(
            json["share_text"]
                .as_str()
                .unwrap()
                .contains("#아트프렌즈 #2026운세")
        );
        assert!(json.get("ticks").is_none());
        assert!(json.get("full_turns").is_none());
        assert!(json.get("record_id").is_none());
    }

    #[test]
    fn test_json_with_spin_flattened() {
        let card = ResultCard::new("monet", "클로드 모네", &catalog()).with_spin(SpinSummary {
            selected_index: 0,
            full_turns: 5,
            rotation_degrees: 1800.0,
            duration_ms: 6000,
            epoch: 1,
            elapsed_ms: 6000,
            ticks: 12,
        });
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["ticks"], 12);
        assert_eq!(json["full_turns"], 5);
        assert!(json.get("spin").is_none());
    }

    #[test]
    fn test_unknown_artist_keeps_label() {
        let card = ResultCard::new("ghost", "유령", &catalog());
        assert!(card.english_name.is_none());
        assert!(card.keywords.is_empty());
        assert!(card.share_text.ends_with("#유령"));
    }
}
