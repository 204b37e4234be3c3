//! # Pack-Configuration Pattern Cascade
//!
//! An ordered sequence of pattern matchers extracting purchasing structure
//! (units-per-pack × unit-size × unit-size-UOM) from description text.
//!
//! The priority order is a data structure, not control flow: rules live in
//! a fixed slice evaluated in a loop, and the first match wins. Rules with
//! an explicit case multiplier are strictly more specific and sit ahead of
//! the single-unit fallbacks that would otherwise shadow them by matching
//! the embedded size token alone.

use crate::classifier;
use crate::types::{PackConfig, PackConfigCandidate, PackType};
use crate::units::{self, UnitSystem, Uom};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

/// One cascade rule: a name for provenance/debugging plus its extractor
pub struct PackRule {
    pub name: &'static str,
    extract: fn(&str) -> Option<PackConfig>,
}

/// The cascade, in priority order
static RULES: [PackRule; 7] = [
    PackRule {
        name: "case_multiplier",
        extract: extract_case_multiplier,
    },
    PackRule {
        name: "pieces_per_case",
        extract: extract_pieces_per_case,
    },
    PackRule {
        name: "size_per_case",
        extract: extract_size_per_case,
    },
    PackRule {
        name: "bare_weight",
        extract: extract_bare_weight,
    },
    PackRule {
        name: "bare_each",
        extract: extract_bare_each,
    },
    PackRule {
        name: "bare_size",
        extract: extract_bare_size,
    },
    PackRule {
        name: "beverage_default",
        extract: extract_beverage_default,
    },
];

lazy_static! {
    /// Rule 1: `N x SIZE UOM` (e.g. "12x750ml")
    static ref CASE_MULTIPLIER: Regex = Regex::new(&format!(
        r"(?i)\b(\d+(?:\.\d+)?)\s*[x×]\s*(\d+(?:\.\d+)?)\s*({})\b",
        units::size_token_pattern()
    ))
    .expect("case multiplier pattern should be valid");

    /// Rule 2: `N [pc|piece|ea|each]? / (cs|case|box)` (e.g. "6 PC/CS")
    ///
    /// A trailing `cs` is a case marker here, never a milliliter unit; the
    /// legacy coercion of a literal `cs` suffix to mL is intentionally gone.
    static ref PIECES_PER_CASE: Regex =
        Regex::new(r"(?i)\b(\d+)\s*(?:pcs?|pieces?|ea|each)?\s*/\s*(?:cs|case|box)\b")
            .expect("pieces per case pattern should be valid");

    /// Rule 3: `N / SIZE UOM` (e.g. "6/750ml")
    static ref SIZE_PER_CASE: Regex = Regex::new(&format!(
        r"(?i)\b(\d+)\s*/\s*(\d+(?:\.\d+)?)\s*({})\b",
        units::size_token_pattern()
    ))
    .expect("size per case pattern should be valid");

    /// Rule 4: bare `SIZE lb` (e.g. "5 LB", "10#")
    static ref BARE_WEIGHT: Regex =
        Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(?:lbs?\b|pounds?\b|#)")
            .expect("bare weight pattern should be valid");

    /// Rule 5: bare `ea`/`each` token
    static ref BARE_EACH: Regex =
        Regex::new(r"(?i)\b(?:ea|each)\b").expect("bare each pattern should be valid");

    /// Rule 6: bare `SIZE UOM` with no case multiplier (e.g. "750ml")
    static ref BARE_SIZE: Regex = Regex::new(&format!(
        r"(?i)\b(\d+(?:\.\d+)?)\s*({})\b",
        units::size_token_pattern()
    ))
    .expect("bare size pattern should be valid");

    /// Catch-weight protein/seafood keywords: actual per-unit weight varies
    /// by shipment, so these get a generic 1 lb reference unit
    static ref CATCH_WEIGHT: Regex = Regex::new(
        r"(?i)\b(?:salmon|tuna|fish|shrimp|halibut|cod|snapper|mahi|swordfish|grouper|beef|chicken|pork|lamb|veal|brisket|ribeye|tenderloin|loin|filet|fillet)\b"
    )
    .expect("catch weight pattern should be valid");
}

/// Standard bottle assumption when a beverage has no size token at all
const STANDARD_BOTTLE_ML: f64 = 750.0;

/// Extract a pack-configuration candidate from a description
///
/// Tries the cascade rules in priority order and returns the first match
/// tagged `source=parsed`, or `None` when no pattern fires.
///
/// # Examples
///
/// ```rust
/// use invoice_mapper::pack_patterns::extract_pack_config;
/// use invoice_mapper::types::PackType;
/// use invoice_mapper::units::Uom;
///
/// let candidate = extract_pack_config("12x750ml Tequila Anejo").expect("matches");
/// assert_eq!(candidate.config.pack_type, PackType::Case);
/// assert_eq!(candidate.config.units_per_pack, 12.0);
/// assert_eq!(candidate.config.unit_size, 750.0);
/// assert_eq!(candidate.config.unit_size_uom, Uom::Ml);
/// ```
pub fn extract_pack_config(description: &str) -> Option<PackConfigCandidate> {
    for rule in &RULES {
        if let Some(config) = (rule.extract)(description) {
            if let Err(e) = config.validate() {
                warn!(
                    rule = rule.name,
                    error = %e,
                    "Rule produced an invalid pack config, skipping"
                );
                return None;
            }
            debug!(
                rule = rule.name,
                units_per_pack = config.units_per_pack,
                unit_size = config.unit_size,
                uom = %config.unit_size_uom,
                "Pack pattern matched"
            );
            return Some(PackConfigCandidate::parsed(config));
        }
    }
    debug!("No pack pattern matched");
    None
}

/// Names of every rule whose pattern fires on the description, in cascade order
///
/// The cascade itself stops at the first rule; this exists so each rule's
/// trigger condition can be tested in isolation.
pub fn matching_rule_names(description: &str) -> Vec<&'static str> {
    RULES
        .iter()
        .filter(|rule| (rule.extract)(description).is_some())
        .map(|rule| rule.name)
        .collect()
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok()
}

fn extract_case_multiplier(description: &str) -> Option<PackConfig> {
    let capture = CASE_MULTIPLIER.captures(description)?;
    Some(PackConfig {
        pack_type: PackType::Case,
        units_per_pack: parse_number(capture.get(1)?.as_str())?,
        unit_size: parse_number(capture.get(2)?.as_str())?,
        unit_size_uom: Uom::parse(capture.get(3)?.as_str())?,
    })
}

fn extract_pieces_per_case(description: &str) -> Option<PackConfig> {
    let capture = PIECES_PER_CASE.captures(description)?;
    Some(PackConfig {
        pack_type: PackType::Case,
        units_per_pack: parse_number(capture.get(1)?.as_str())?,
        unit_size: 1.0,
        unit_size_uom: Uom::Each,
    })
}

fn extract_size_per_case(description: &str) -> Option<PackConfig> {
    let capture = SIZE_PER_CASE.captures(description)?;
    Some(PackConfig {
        pack_type: PackType::Case,
        units_per_pack: parse_number(capture.get(1)?.as_str())?,
        unit_size: parse_number(capture.get(2)?.as_str())?,
        unit_size_uom: Uom::parse(capture.get(3)?.as_str())?,
    })
}

fn extract_bare_weight(description: &str) -> Option<PackConfig> {
    let capture = BARE_WEIGHT.captures(description)?;
    let parsed_weight = parse_number(capture.get(1)?.as_str())?;
    // Catch-weight items get a generic 1 lb reference unit since actual
    // weight varies shipment to shipment; fixed-weight items keep the size.
    let unit_size = if CATCH_WEIGHT.is_match(description) {
        1.0
    } else {
        parsed_weight
    };
    Some(PackConfig {
        pack_type: PackType::Each,
        units_per_pack: 1.0,
        unit_size,
        unit_size_uom: Uom::Lb,
    })
}

fn extract_bare_each(description: &str) -> Option<PackConfig> {
    if !BARE_EACH.is_match(description) || BARE_SIZE.is_match(description) {
        return None;
    }
    Some(PackConfig {
        pack_type: PackType::Each,
        units_per_pack: 1.0,
        unit_size: 1.0,
        unit_size_uom: Uom::Each,
    })
}

fn extract_bare_size(description: &str) -> Option<PackConfig> {
    let capture = BARE_SIZE.captures(description)?;
    let uom = Uom::parse(capture.get(2)?.as_str())?;
    let pack_type = if uom.system() == UnitSystem::Weight {
        PackType::Each
    } else {
        PackType::Bottle
    };
    Some(PackConfig {
        pack_type,
        units_per_pack: 1.0,
        unit_size: parse_number(capture.get(1)?.as_str())?,
        unit_size_uom: uom,
    })
}

fn extract_beverage_default(description: &str) -> Option<PackConfig> {
    if !classifier::is_beverage(description) {
        return None;
    }
    Some(PackConfig {
        pack_type: PackType::Bottle,
        units_per_pack: 1.0,
        unit_size: STANDARD_BOTTLE_ML,
        unit_size_uom: Uom::Ml,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PackSource;

    fn config_for(description: &str) -> PackConfig {
        extract_pack_config(description)
            .unwrap_or_else(|| panic!("expected pack config for '{}'", description))
            .config
    }

    #[test]
    fn test_case_multiplier() {
        let config = config_for("12x750ml Tequila Anejo");
        assert_eq!(config.pack_type, PackType::Case);
        assert_eq!(config.units_per_pack, 12.0);
        assert_eq!(config.unit_size, 750.0);
        assert_eq!(config.unit_size_uom, Uom::Ml);

        let config = config_for("6 x 1.75 L Vodka");
        assert_eq!(config.units_per_pack, 6.0);
        assert_eq!(config.unit_size, 1.75);
        assert_eq!(config.unit_size_uom, Uom::L);
    }

    #[test]
    fn test_pieces_per_case() {
        let config = config_for("6 PC/CS Chicken Breast");
        assert_eq!(config.pack_type, PackType::Case);
        assert_eq!(config.units_per_pack, 6.0);
        assert_eq!(config.unit_size, 1.0);
        assert_eq!(config.unit_size_uom, Uom::Each);

        assert_eq!(config_for("24/case Napkin Packs").units_per_pack, 24.0);
        assert_eq!(config_for("4 ea/box Trays").units_per_pack, 4.0);
    }

    #[test]
    fn test_size_per_case() {
        let config = config_for("6/750ml House Red");
        assert_eq!(config.pack_type, PackType::Case);
        assert_eq!(config.units_per_pack, 6.0);
        assert_eq!(config.unit_size, 750.0);
        assert_eq!(config.unit_size_uom, Uom::Ml);
    }

    #[test]
    fn test_literal_cs_is_case_marker_not_unit() {
        // "12/cs" must resolve through the pieces-per-case rule, not as a
        // 12-unit case of some coerced milliliter size
        let candidate = extract_pack_config("Fryer Oil 12/cs").expect("matches");
        assert_eq!(candidate.config.unit_size_uom, Uom::Each);
        assert_eq!(candidate.config.unit_size, 1.0);
    }

    #[test]
    fn test_catch_weight_gets_reference_pound() {
        let config = config_for("5 LB Salmon Fillet");
        assert_eq!(config.pack_type, PackType::Each);
        assert_eq!(config.units_per_pack, 1.0);
        assert_eq!(config.unit_size, 1.0);
        assert_eq!(config.unit_size_uom, Uom::Lb);
    }

    #[test]
    fn test_fixed_weight_keeps_parsed_size() {
        let config = config_for("5 LB Granulated Sugar");
        assert_eq!(config.pack_type, PackType::Each);
        assert_eq!(config.unit_size, 5.0);
        assert_eq!(config.unit_size_uom, Uom::Lb);
    }

    #[test]
    fn test_pound_sign_weight() {
        let config = config_for("10# Ground Sumac");
        assert_eq!(config.unit_size, 10.0);
        assert_eq!(config.unit_size_uom, Uom::Lb);
    }

    #[test]
    fn test_bare_each() {
        let config = config_for("Avocado Hass EACH");
        assert_eq!(config.pack_type, PackType::Each);
        assert_eq!(config.units_per_pack, 1.0);
        assert_eq!(config.unit_size, 1.0);
        assert_eq!(config.unit_size_uom, Uom::Each);
    }

    #[test]
    fn test_bare_size_volume_is_bottle() {
        let config = config_for("750ml Olive Oil");
        assert_eq!(config.pack_type, PackType::Bottle);
        assert_eq!(config.units_per_pack, 1.0);
        assert_eq!(config.unit_size, 750.0);
        assert_eq!(config.unit_size_uom, Uom::Ml);
    }

    #[test]
    fn test_bare_size_weight_is_each() {
        let config = config_for("2 kg Flour");
        assert_eq!(config.pack_type, PackType::Each);
        assert_eq!(config.unit_size_uom, Uom::Kg);
    }

    #[test]
    fn test_beverage_default_bottle() {
        let config = config_for("House Cabernet");
        assert_eq!(config.pack_type, PackType::Bottle);
        assert_eq!(config.units_per_pack, 1.0);
        assert_eq!(config.unit_size, 750.0);
        assert_eq!(config.unit_size_uom, Uom::Ml);
    }

    #[test]
    fn test_no_candidate() {
        assert!(extract_pack_config("Mystery Item 42").is_none());
        assert!(extract_pack_config("").is_none());
    }

    #[test]
    fn test_multiplier_wins_over_embedded_size_token() {
        // "12x750ml" contains a bare "750ml" token that rule 6 would match;
        // the explicit multiplier rule must fire first
        let matched = matching_rule_names("12x750ml Tequila Anejo");
        assert_eq!(matched.first().copied(), Some("case_multiplier"));
        assert!(matched.contains(&"bare_size"));
        let config = config_for("12x750ml Tequila Anejo");
        assert_eq!(config.units_per_pack, 12.0);
    }

    #[test]
    fn test_cascade_returns_single_candidate() {
        let candidate = extract_pack_config("12x750ml Tequila Anejo").expect("matches");
        assert_eq!(candidate.source, PackSource::Parsed);
        assert_eq!(candidate.sample_count, None);
        assert_eq!(candidate.brand, None);
    }
}
