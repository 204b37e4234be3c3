//! End-to-end classification tests over the pure pipeline stages, covering
//! the worked examples and testable properties of the design.

use invoice_mapper::mapping::{self, LineRequest};
use invoice_mapper::pack_patterns;
use invoice_mapper::recipe_uom::resolve_recipe_uom;
use invoice_mapper::types::{Category, PackSource, PackType, QuantityUnit};
use invoice_mapper::units::Uom;

fn request(description: &str, vendor: Option<&str>, qty: f64) -> LineRequest {
    LineRequest {
        description: description.to_string(),
        vendor_name: vendor.map(String::from),
        invoiced_qty: qty,
        unit_cost: 0.0,
    }
}

#[test]
fn test_tequila_case_example() {
    let result = mapping::classify_offline(&request(
        "12x750ml Tequila Anejo",
        Some("Republic National"),
        3.0,
    ));

    assert_eq!(result.category, Category::Liquor);
    assert_eq!(result.subcategory.as_deref(), Some("tequila"));
    assert_eq!(result.uom, Uom::Oz);

    let candidate = result.pack_config_candidate.expect("candidate");
    assert_eq!(candidate.source, PackSource::Parsed);
    assert_eq!(candidate.config.pack_type, PackType::Case);
    assert_eq!(candidate.config.units_per_pack, 12.0);
    assert_eq!(candidate.config.unit_size, 750.0);
    assert_eq!(candidate.config.unit_size_uom, Uom::Ml);
}

#[test]
fn test_chicken_pieces_example() {
    let result = mapping::classify_offline(&request("6 PC/CS Chicken Breast", None, 1.0));

    assert_eq!(result.category, Category::Meat);
    let candidate = result.pack_config_candidate.expect("candidate");
    assert_eq!(candidate.config.pack_type, PackType::Case);
    assert_eq!(candidate.config.units_per_pack, 6.0);
    assert_eq!(candidate.config.unit_size, 1.0);
    assert_eq!(candidate.config.unit_size_uom, Uom::Each);
}

#[test]
fn test_catch_weight_salmon_example() {
    let result = mapping::classify_offline(&request("5 LB Salmon Fillet", None, 2.0));

    assert_eq!(result.category, Category::Seafood);
    assert_eq!(result.name, "Salmon Fillet");
    // Generic reference weight, not the invoiced 5
    let candidate = result.pack_config_candidate.expect("candidate");
    assert_eq!(candidate.config.pack_type, PackType::Each);
    assert_eq!(candidate.config.units_per_pack, 1.0);
    assert_eq!(candidate.config.unit_size, 1.0);
    assert_eq!(candidate.config.unit_size_uom, Uom::Lb);
}

#[test]
fn test_quantity_interpretation_example() {
    // invoiced_qty=3 against a 6-pack: 3 as invoiced, 0.5 cases, 18 bottles
    let result = mapping::classify_offline(&request("6/750ml House Red", None, 3.0));

    let by_unit = |unit: QuantityUnit| {
        result
            .quantity_interpretations
            .iter()
            .find(|i| i.unit == unit)
            .map(|i| i.quantity)
    };
    assert_eq!(by_unit(QuantityUnit::AsInvoiced), Some(3.0));
    assert_eq!(by_unit(QuantityUnit::Case), Some(0.5));
    assert_eq!(by_unit(QuantityUnit::Bottle), Some(18.0));
}

#[test]
fn test_beverage_uom_override_property() {
    // For any description containing a beverage keyword the recipe UOM is
    // oz, regardless of any weight/volume token present
    for description in [
        "1L Absolut Vodka",
        "12x750ml Tequila Anejo",
        "5 gal Chardonnay Bulk",
        "Bud Light Lager 24/12oz",
        "2 kg Sake Premium",
    ] {
        assert_eq!(resolve_recipe_uom(description), Uom::Oz, "{}", description);
    }
}

#[test]
fn test_cascade_first_match_is_deterministic() {
    // Pattern 1 fires whenever an explicit NxSIZE token is present, even if
    // a bare size token also appears elsewhere in the string
    let candidate =
        pack_patterns::extract_pack_config("12x750ml Anejo plus 50ml sampler").expect("candidate");
    assert_eq!(candidate.config.units_per_pack, 12.0);
    assert_eq!(candidate.config.unit_size, 750.0);

    let fired = pack_patterns::matching_rule_names("12x750ml Anejo plus 50ml sampler");
    assert_eq!(fired.first().copied(), Some("case_multiplier"));
}

#[test]
fn test_unrecognized_input_best_effort() {
    let result = mapping::classify_offline(&request("???", None, 0.0));
    assert_eq!(result.category, Category::Food);
    assert_eq!(result.uom, Uom::Unit);
    assert!(result.pack_config_candidate.is_none());
}

#[test]
fn test_vendor_signal_in_full_pipeline() {
    let with_vendor = mapping::classify_offline(&request(
        "Reserva Especial 750",
        Some("Southern Glazers Wine & Spirits"),
        1.0,
    ));
    assert_eq!(with_vendor.category, Category::Liquor);

    let without_vendor = mapping::classify_offline(&request("Reserva Especial 750", None, 1.0));
    assert_eq!(without_vendor.category, Category::Food);
}

#[test]
fn test_classification_result_serializes() {
    let result = mapping::classify_offline(&request("12x750ml Tequila Anejo", None, 3.0));
    let json = serde_json::to_value(&result).expect("serializes");

    assert_eq!(json["category"], "liquor");
    assert_eq!(json["uom"], "oz");
    assert_eq!(json["pack_config_candidate"]["source"], "parsed");
    assert_eq!(json["pack_config_candidate"]["unit_size_uom"], "mL");
}
