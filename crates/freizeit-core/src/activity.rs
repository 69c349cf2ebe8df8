//! Aktivitätsdatensätze und der zweigeteilte Katalog (indoor/outdoor).
//!
//! Der Katalog wird einmal beim Prozessstart aus zwei JSONL-Pools geladen
//! und ist danach unveränderlich. Datensätze mit `estimated_minutes == 0`
//! verletzen die Katalog-Invariante und werden beim Aufbau aussortiert,
//! nie ausgewählt.

use serde::{Deserialize, Serialize};
use std::io::BufRead;
use thiserror::Error;

/// Ein Kandidat für eine Freizeitaktivität.
///
/// `name` ist die stabile Identität innerhalb eines Katalog-Snapshots und
/// wird für Ausschlusslisten verwendet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub name: String,
    pub category: String,
    pub subcategory: String,
    /// Geschätzte Dauer in Minuten; muss > 0 sein.
    pub estimated_minutes: u32,
    /// Freier UI-Hinweis, fließt nicht in die Auswahl ein.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Activity {
    /// Katalog-Invariante: nur positive Dauern sind auswählbar.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.estimated_minutes > 0
    }
}

#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("Failed to read pool data: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid activity record on line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
}

/// Unveränderlicher Katalog aus den zwei festen Pools.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    indoor: Vec<Activity>,
    outdoor: Vec<Activity>,
}

impl Catalogue {
    /// Baut den Katalog auf und sortiert ungültige Datensätze aus.
    #[must_use]
    pub fn new(indoor: Vec<Activity>, outdoor: Vec<Activity>) -> Self {
        Self {
            indoor: retain_valid(indoor, "indoor"),
            outdoor: retain_valid(outdoor, "outdoor"),
        }
    }

    /// Liest einen Pool aus zeilenweisem JSON (JSONL). Leere Zeilen werden
    /// übersprungen; Parse-Fehler tragen die 1-basierte Zeilennummer.
    pub fn read_pool<R: BufRead>(reader: R) -> Result<Vec<Activity>, CatalogueError> {
        let mut pool = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let activity: Activity =
                serde_json::from_str(&line).map_err(|source| CatalogueError::Parse {
                    line: idx + 1,
                    source,
                })?;
            pool.push(activity);
        }
        Ok(pool)
    }

    /// Projektion auf die bei gegebenem Wetter zulässigen Kandidaten:
    /// indoor ∪ outdoor bei gutem Wetter, sonst nur indoor.
    pub fn pool(&self, good_weather: bool) -> impl Iterator<Item = &Activity> {
        let outdoor: &[Activity] = if good_weather { &self.outdoor } else { &[] };
        self.indoor.iter().chain(outdoor.iter())
    }

    #[must_use]
    pub fn indoor(&self) -> &[Activity] {
        &self.indoor
    }

    #[must_use]
    pub fn outdoor(&self) -> &[Activity] {
        &self.outdoor
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indoor.is_empty() && self.outdoor.is_empty()
    }
}

fn retain_valid(pool: Vec<Activity>, label: &str) -> Vec<Activity> {
    let before = pool.len();
    let pool: Vec<Activity> = pool.into_iter().filter(Activity::is_valid).collect();
    let skipped = before - pool.len();
    if skipped > 0 {
        warn_skipped(label, skipped);
    }
    pool
}

#[cfg(feature = "telemetry")]
fn warn_skipped(label: &str, skipped: usize) {
    tracing::warn!(pool = label, skipped, "skipped invalid activity records");
}

#[cfg(not(feature = "telemetry"))]
fn warn_skipped(label: &str, skipped: usize) {
    eprintln!("Warning: skipped {skipped} invalid activity records in {label} pool");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn act(name: &str, minutes: u32) -> Activity {
        Activity {
            name: name.into(),
            category: "Cook".into(),
            subcategory: "Baking".into(),
            estimated_minutes: minutes,
            hint: None,
        }
    }

    #[test]
    fn pool_is_indoor_only_on_bad_weather() {
        let cat = Catalogue::new(vec![act("a", 30)], vec![act("b", 20)]);
        let names: Vec<&str> = cat.pool(false).map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn pool_is_union_on_good_weather() {
        let cat = Catalogue::new(vec![act("a", 30)], vec![act("b", 20)]);
        let names: Vec<&str> = cat.pool(true).map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn invalid_records_are_filtered_at_construction() {
        let cat = Catalogue::new(vec![act("a", 0), act("b", 10)], vec![act("c", 0)]);
        assert_eq!(cat.indoor().len(), 1);
        assert!(cat.outdoor().is_empty());
        assert_eq!(cat.indoor()[0].name, "b");
    }

    #[test]
    fn read_pool_skips_blank_lines() {
        let data = "\n{\"name\":\"a\",\"category\":\"Cook\",\"subcategory\":\"Baking\",\"estimated_minutes\":30}\n\n";
        let pool = Catalogue::read_pool(Cursor::new(data)).expect("pool should parse");
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].name, "a");
    }

    #[test]
    fn read_pool_reports_line_number_on_parse_error() {
        let data = "{\"name\":\"a\",\"category\":\"c\",\"subcategory\":\"s\",\"estimated_minutes\":30}\nnot json\n";
        let err = Catalogue::read_pool(Cursor::new(data)).unwrap_err();
        match err {
            CatalogueError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn hint_field_is_optional_in_json() {
        let json = r#"{"name":"a","category":"c","subcategory":"s","estimated_minutes":15,"hint":"bring gloves"}"#;
        let a: Activity = serde_json::from_str(json).expect("deserialize");
        assert_eq!(a.hint.as_deref(), Some("bring gloves"));

        let serialized = serde_json::to_string(&act("b", 5)).expect("serialize");
        assert!(!serialized.contains("hint"));
    }
}
