//! # Recipe-UOM Resolver Module
//!
//! Determines the unit recipes will use to measure an item, independent of
//! how it is purchased. Beverages are always measured in ounces regardless
//! of any size token present (a 1-liter bottle is still poured by the ounce).

use crate::classifier;
use crate::units::{self, Uom};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    /// First recognized size token in the description (volume or weight)
    // The optional leading number lets attached forms like "750ml" match;
    // a bare `\b` would find no boundary between the digits and the unit.
    static ref SIZE_TOKEN: Regex = Regex::new(&format!(
        r"(?i)\b(?:\d+(?:\.\d+)?\s*)?({})\b",
        units::size_token_pattern()
    ))
    .expect("size token pattern should be valid");

    /// Generic pack words, scanned only after size tokens
    static ref PACK_TOKEN: Regex = Regex::new(r"(?i)\b(cases?|cs|box(?:es)?|ea|each)\b")
        .expect("pack token pattern should be valid");
}

/// Resolve the recipe unit of measure for a description
///
/// The beverage override takes precedence over all size-token matches; after
/// that, the first recognized size token wins, then generic pack words, then
/// the `unit` default.
///
/// # Examples
///
/// ```rust
/// use invoice_mapper::recipe_uom::resolve_recipe_uom;
/// use invoice_mapper::units::Uom;
///
/// assert_eq!(resolve_recipe_uom("1L Absolut Vodka"), Uom::Oz);
/// assert_eq!(resolve_recipe_uom("5 LB Salmon Fillet"), Uom::Lb);
/// assert_eq!(resolve_recipe_uom("Mystery Item"), Uom::Unit);
/// ```
pub fn resolve_recipe_uom(description: &str) -> Uom {
    if classifier::is_beverage(description) {
        debug!("Beverage override: recipe UOM is oz");
        return Uom::Oz;
    }

    if let Some(capture) = SIZE_TOKEN.captures(description) {
        let token = capture
            .get(1)
            .expect("size token capture group should be present")
            .as_str();
        if let Some(uom) = Uom::parse(token) {
            debug!(token = %token, uom = %uom, "Size token resolved recipe UOM");
            return uom;
        }
    }

    if let Some(capture) = PACK_TOKEN.captures(description) {
        let token = capture
            .get(1)
            .expect("pack token capture group should be present")
            .as_str();
        if let Some(uom) = Uom::parse(token) {
            debug!(token = %token, uom = %uom, "Pack token resolved recipe UOM");
            return uom;
        }
    }

    Uom::Unit
}
