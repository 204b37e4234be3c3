//! # Unit Taxonomy Module
//!
//! Static knowledge of recognized units of measure, grouped into systems
//! (volume, weight, count). Every regex in this crate that needs a unit-token
//! alternation derives it from this table rather than duplicating the
//! vocabulary inline.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The measurement system a unit belongs to
///
/// Conversions are only ever suggested within a single system; cross-system
/// conversion is never attempted automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    Volume,
    Weight,
    Count,
}

/// A canonical unit of measure
///
/// Each variant belongs to exactly one [`UnitSystem`]. Case/format variants
/// of the same unit (`"ml"`, `"mL"`, `"milliliter"`) all canonicalize to one
/// variant via [`Uom::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Uom {
    #[serde(rename = "mL")]
    Ml,
    #[serde(rename = "L")]
    L,
    #[serde(rename = "oz")]
    Oz,
    #[serde(rename = "gal")]
    Gal,
    #[serde(rename = "qt")]
    Qt,
    #[serde(rename = "pt")]
    Pt,
    #[serde(rename = "g")]
    G,
    #[serde(rename = "kg")]
    Kg,
    #[serde(rename = "lb")]
    Lb,
    #[serde(rename = "each")]
    Each,
    #[serde(rename = "unit")]
    Unit,
    #[serde(rename = "case")]
    Case,
    #[serde(rename = "box")]
    Box,
}

/// Alias table: every recognized spelling of every unit, lowercase
///
/// This is the single source of truth for unit recognition. The `#` pound
/// marker is handled by the weight-specific patterns directly since it has no
/// word boundary.
const UOM_ALIASES: &[(&str, Uom)] = &[
    ("ml", Uom::Ml),
    ("milliliter", Uom::Ml),
    ("milliliters", Uom::Ml),
    ("millilitre", Uom::Ml),
    ("millilitres", Uom::Ml),
    ("l", Uom::L),
    ("lt", Uom::L),
    ("ltr", Uom::L),
    ("liter", Uom::L),
    ("liters", Uom::L),
    ("litre", Uom::L),
    ("litres", Uom::L),
    ("oz", Uom::Oz),
    ("ounce", Uom::Oz),
    ("ounces", Uom::Oz),
    ("fl oz", Uom::Oz),
    ("floz", Uom::Oz),
    ("gal", Uom::Gal),
    ("gallon", Uom::Gal),
    ("gallons", Uom::Gal),
    ("qt", Uom::Qt),
    ("quart", Uom::Qt),
    ("quarts", Uom::Qt),
    ("pt", Uom::Pt),
    ("pint", Uom::Pt),
    ("pints", Uom::Pt),
    ("g", Uom::G),
    ("gr", Uom::G),
    ("gram", Uom::G),
    ("grams", Uom::G),
    ("kg", Uom::Kg),
    ("kilo", Uom::Kg),
    ("kilogram", Uom::Kg),
    ("kilograms", Uom::Kg),
    ("lb", Uom::Lb),
    ("lbs", Uom::Lb),
    ("pound", Uom::Lb),
    ("pounds", Uom::Lb),
    ("ea", Uom::Each),
    ("each", Uom::Each),
    ("unit", Uom::Unit),
    ("units", Uom::Unit),
    ("cs", Uom::Case),
    ("case", Uom::Case),
    ("cases", Uom::Case),
    ("box", Uom::Box),
    ("boxes", Uom::Box),
];

lazy_static! {
    static ref ALIAS_LOOKUP: HashMap<&'static str, Uom> =
        UOM_ALIASES.iter().copied().collect();
}

impl Uom {
    /// Canonicalize a unit token, folding case and spelling variants
    ///
    /// Returns `None` for unrecognized tokens.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use invoice_mapper::units::Uom;
    ///
    /// assert_eq!(Uom::parse("mL"), Some(Uom::Ml));
    /// assert_eq!(Uom::parse("LITER"), Some(Uom::L));
    /// assert_eq!(Uom::parse("lbs"), Some(Uom::Lb));
    /// assert_eq!(Uom::parse("furlong"), None);
    /// ```
    pub fn parse(token: &str) -> Option<Uom> {
        let normalized = token.trim().to_lowercase();
        if normalized == "#" {
            return Some(Uom::Lb);
        }
        ALIAS_LOOKUP.get(normalized.as_str()).copied()
    }

    /// The single system this unit belongs to
    pub fn system(&self) -> UnitSystem {
        match self {
            Uom::Ml | Uom::L | Uom::Oz | Uom::Gal | Uom::Qt | Uom::Pt => UnitSystem::Volume,
            Uom::G | Uom::Kg | Uom::Lb => UnitSystem::Weight,
            Uom::Each | Uom::Unit | Uom::Case | Uom::Box => UnitSystem::Count,
        }
    }

    /// Canonical display token (`mL`, `L`, `oz`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Uom::Ml => "mL",
            Uom::L => "L",
            Uom::Oz => "oz",
            Uom::Gal => "gal",
            Uom::Qt => "qt",
            Uom::Pt => "pt",
            Uom::G => "g",
            Uom::Kg => "kg",
            Uom::Lb => "lb",
            Uom::Each => "each",
            Uom::Unit => "unit",
            Uom::Case => "case",
            Uom::Box => "box",
        }
    }
}

impl std::fmt::Display for Uom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Build a regex alternation of unit aliases, longest token first
///
/// Sorting longest-first prevents partial matches (`"lb"` must not shadow
/// `"lbs"` inside an alternation).
fn alternation(aliases: impl Iterator<Item = &'static str>) -> String {
    let mut tokens: Vec<&str> = aliases.collect();
    tokens.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    let escaped: Vec<String> = tokens.into_iter().map(regex::escape).collect();
    escaped.join("|")
}

/// Alternation of every size-bearing unit alias (volume + weight)
///
/// Used by the pack-pattern cascade and the text normalizer wherever a
/// `number + unit` size token must be recognized.
pub fn size_token_pattern() -> String {
    alternation(
        UOM_ALIASES
            .iter()
            .filter(|(_, uom)| uom.system() != UnitSystem::Count)
            .map(|(alias, _)| *alias),
    )
}

/// Alternation of every unit alias in the taxonomy, count units included
pub fn any_token_pattern() -> String {
    alternation(UOM_ALIASES.iter().map(|(alias, _)| *alias))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalization_folds_variants() {
        for token in ["ml", "mL", "ML", "milliliter", "millilitres"] {
            assert_eq!(Uom::parse(token), Some(Uom::Ml), "token: {}", token);
        }
        for token in ["l", "lt", "ltr", "liter", "litre", "LITERS"] {
            assert_eq!(Uom::parse(token), Some(Uom::L), "token: {}", token);
        }
        for token in ["lb", "lbs", "pound", "POUNDS", "#"] {
            assert_eq!(Uom::parse(token), Some(Uom::Lb), "token: {}", token);
        }
    }

    #[test]
    fn test_unrecognized_tokens() {
        assert_eq!(Uom::parse(""), None);
        assert_eq!(Uom::parse("furlong"), None);
        assert_eq!(Uom::parse("12"), None);
    }

    #[test]
    fn test_each_uom_has_exactly_one_system() {
        assert_eq!(Uom::Ml.system(), UnitSystem::Volume);
        assert_eq!(Uom::Oz.system(), UnitSystem::Volume);
        assert_eq!(Uom::Lb.system(), UnitSystem::Weight);
        assert_eq!(Uom::Kg.system(), UnitSystem::Weight);
        assert_eq!(Uom::Each.system(), UnitSystem::Count);
        assert_eq!(Uom::Case.system(), UnitSystem::Count);
    }

    #[test]
    fn test_size_pattern_excludes_count_units() {
        let pattern = size_token_pattern();
        assert!(pattern.contains("ml"));
        assert!(pattern.contains("gallons"));
        assert!(!pattern.split('|').any(|t| t == "case"));
        assert!(!pattern.split('|').any(|t| t == "each"));
    }

    #[test]
    fn test_longest_alias_sorts_first() {
        let pattern = size_token_pattern();
        let lbs_pos = pattern.find("lbs").expect("lbs in pattern");
        let lb_pos = pattern.rfind("|lb|").unwrap_or(pattern.len());
        assert!(lbs_pos < lb_pos, "lbs must precede lb in the alternation");
    }
}
