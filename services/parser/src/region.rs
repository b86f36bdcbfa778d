//! Autonomous community canonicalization
//!
//! INE tables spell the same community several ways ("Madrid, Comunidad de",
//! "Comunidad de Madrid", "Madrid"). Every spelling seen in the six tables maps
//! to one canonical name; the nationwide aggregate maps to no region at all.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::warn;

/// Known spellings and their canonical name. `None` marks the nationwide aggregate.
const CCAA_VARIANTS: &[(&str, Option<&str>)] = &[
    ("Andalucía", Some("Andalucía")),
    ("Aragón", Some("Aragón")),
    // Asturias
    ("Asturias", Some("Asturias")),
    ("Principado de Asturias", Some("Asturias")),
    ("Asturias, Principado de", Some("Asturias")),
    // Illes Balears
    ("Illes Balears", Some("Illes Balears")),
    ("Balears, Illes", Some("Illes Balears")),
    ("Balears", Some("Illes Balears")),
    ("Canarias", Some("Canarias")),
    ("Cantabria", Some("Cantabria")),
    // hyphen, en dash and em dash variants
    ("Castilla - La Mancha", Some("Castilla-La Mancha")),
    ("Castilla – La Mancha", Some("Castilla-La Mancha")),
    ("Castilla — La Mancha", Some("Castilla-La Mancha")),
    ("Castilla-La Mancha", Some("Castilla-La Mancha")),
    ("Castilla y León", Some("Castilla y León")),
    ("Cataluña", Some("Cataluña")),
    ("Ceuta", Some("Ceuta")),
    ("Melilla", Some("Melilla")),
    // Madrid
    ("Comunidad de Madrid", Some("Comunidad de Madrid")),
    ("Madrid, Comunidad de", Some("Comunidad de Madrid")),
    ("Madrid", Some("Comunidad de Madrid")),
    ("Comunitat Valenciana", Some("Comunitat Valenciana")),
    ("Extremadura", Some("Extremadura")),
    ("Galicia", Some("Galicia")),
    // La Rioja
    ("La Rioja", Some("La Rioja")),
    ("Rioja, La", Some("La Rioja")),
    ("Rioja", Some("La Rioja")),
    // Murcia
    ("Región de Murcia", Some("Región de Murcia")),
    ("Murcia, Región de", Some("Región de Murcia")),
    ("Murcia", Some("Región de Murcia")),
    // Navarra
    ("Comunidad Foral de Navarra", Some("Navarra")),
    ("Navarra, Comunidad Foral de", Some("Navarra")),
    ("Navarra", Some("Navarra")),
    ("País Vasco", Some("País Vasco")),
    ("Total Nacional", None),
];

static EXACT: Lazy<HashMap<&'static str, Option<&'static str>>> =
    Lazy::new(|| CCAA_VARIANTS.iter().copied().collect());

static CASE_FOLDED: Lazy<HashMap<String, Option<&'static str>>> = Lazy::new(|| {
    CCAA_VARIANTS
        .iter()
        .map(|(raw, canonical)| (raw.to_lowercase(), *canonical))
        .collect()
});

/// Outcome of looking up a raw community name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionMatch {
    Canonical(&'static str),
    /// Not in the table; the raw spelling is kept so it stays visible downstream
    Unmapped(String),
    /// The nationwide aggregate, never part of a regional breakdown
    NationalTotal,
}

impl RegionMatch {
    /// Region name to emit, or `None` when the row must be dropped
    pub fn into_name(self) -> Option<String> {
        match self {
            RegionMatch::Canonical(name) => Some(name.to_string()),
            RegionMatch::Unmapped(raw) => Some(raw),
            RegionMatch::NationalTotal => None,
        }
    }
}

/// Exact lookup, then case-insensitive lookup, then pass-through with a warning
pub fn normalize_region(raw: &str) -> RegionMatch {
    let found = EXACT
        .get(raw)
        .or_else(|| CASE_FOLDED.get(&raw.to_lowercase()))
        .copied();

    match found {
        Some(Some(canonical)) => RegionMatch::Canonical(canonical),
        Some(None) => RegionMatch::NationalTotal,
        None => {
            warn!("Community name '{}' not found in canonical table", raw);
            RegionMatch::Unmapped(raw.to_string())
        }
    }
}
