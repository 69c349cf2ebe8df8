//! Auswahl-Engine für freizeit.
//!
//! Alle drei Vorschlagsmodi (frisch, ähnlich, anders) laufen über dieselbe
//! Filter-Pipeline: Pool-Projektion nach Wetter, Constraint-Prädikat,
//! Zeitbudget, Ausschlussliste, dann genau ein gleichverteilter Zufallszug.
//! Die Engine ist frei von Seiteneffekten; die Ausschlussliste gehört dem
//! Aufrufer und wird hier nur gelesen.

use freizeit_core::{Activity, Catalogue};
use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub mod error;
pub use error::{Result, SelectError};

/// Eingabe für einen einzelnen Auswahlschritt.
///
/// `excluded` enthält die Namen bereits gezeigter Aktivitäten; der
/// Aufrufer pflegt die Menge zwischen den Aufrufen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionRequest {
    pub good_weather: bool,
    pub available_minutes: u32,
    #[serde(default)]
    pub excluded: BTreeSet<String>,
}

impl SelectionRequest {
    #[must_use]
    pub fn new(good_weather: bool, available_minutes: u32) -> Self {
        Self {
            good_weather,
            available_minutes,
            excluded: BTreeSet::new(),
        }
    }
}

/// Zusätzliches Prädikat über den Kandidatenpool; die drei Modi
/// unterscheiden sich nur hierin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    /// Frischer Vorschlag ohne Einschränkung.
    Any,
    /// Gleiche Kategorie, andere Subkategorie ("etwas Ähnliches").
    SimilarTo {
        category: String,
        subcategory: String,
    },
    /// Andere Kategorie ("etwas ganz anderes").
    DifferentFrom { category: String },
}

impl Constraint {
    fn matches(&self, activity: &Activity) -> bool {
        match self {
            Constraint::Any => true,
            Constraint::SimilarTo {
                category,
                subcategory,
            } => activity.category == *category && activity.subcategory != *subcategory,
            Constraint::DifferentFrom { category } => activity.category != *category,
        }
    }
}

/// Gemeinsame Pipeline: filtert den Pool und zieht genau einen Kandidaten
/// gleichverteilt. Leere Restmenge ergibt `None` und ist kein Fehler.
#[must_use]
pub fn select<'a>(
    catalogue: &'a Catalogue,
    request: &SelectionRequest,
    constraint: &Constraint,
) -> Option<&'a Activity> {
    let candidates: Vec<&Activity> = catalogue
        .pool(request.good_weather)
        .filter(|a| constraint.matches(a))
        // Defensiv: Invariante estimated_minutes > 0 gilt auch hier.
        .filter(|a| a.is_valid())
        .filter(|a| a.estimated_minutes <= request.available_minutes)
        .filter(|a| !request.excluded.contains(&a.name))
        .collect();
    candidates.choose(&mut thread_rng()).copied()
}

/// Frischer Vorschlag über den vollen wetterabhängigen Pool.
#[must_use]
pub fn suggest<'a>(catalogue: &'a Catalogue, request: &SelectionRequest) -> Option<&'a Activity> {
    select(catalogue, request, &Constraint::Any)
}

/// Vorschlag aus derselben Kategorie, aber anderer Subkategorie.
#[must_use]
pub fn suggest_similar<'a>(
    catalogue: &'a Catalogue,
    request: &SelectionRequest,
    category: &str,
    subcategory: &str,
) -> Option<&'a Activity> {
    select(
        catalogue,
        request,
        &Constraint::SimilarTo {
            category: category.to_string(),
            subcategory: subcategory.to_string(),
        },
    )
}

/// Vorschlag aus einer anderen Kategorie.
#[must_use]
pub fn suggest_different<'a>(
    catalogue: &'a Catalogue,
    request: &SelectionRequest,
    category: &str,
) -> Option<&'a Activity> {
    select(
        catalogue,
        request,
        &Constraint::DifferentFrom {
            category: category.to_string(),
        },
    )
}
