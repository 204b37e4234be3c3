//! # Shared Data Model
//!
//! Core data types flowing through the mapping pipeline: pack configurations
//! and their provenance, classification results, quantity interpretations,
//! and the terminal mapping action.

use crate::errors::{AppError, AppResult};
use crate::units::Uom;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the vendor packages the purchasing unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackType {
    Case,
    Bottle,
    Bag,
    Box,
    Each,
    Keg,
    Pail,
    Drum,
}

/// Origin of a pack-configuration candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackSource {
    /// Extracted from the current description by the pattern cascade
    Parsed,
    /// Derived from prior catalog entries of the same brand
    Learned,
    /// Found via external web search
    WebSearch,
}

/// Confidence attached to a candidate by its producer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Low,
}

/// The purchasing structure of an item: units-per-pack × unit-size × unit-size-UOM
///
/// Multiple pack configs may coexist for one catalog item (different vendors
/// sell different pack sizes); each pipeline invocation yields at most one
/// new candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackConfig {
    pub pack_type: PackType,
    pub units_per_pack: f64,
    pub unit_size: f64,
    pub unit_size_uom: Uom,
}

impl PackConfig {
    /// Validate the pack-config invariants: `units_per_pack >= 1`, `unit_size > 0`
    pub fn validate(&self) -> AppResult<()> {
        if self.units_per_pack < 1.0 {
            return Err(AppError::Validation(format!(
                "units_per_pack must be at least 1, got {}",
                self.units_per_pack
            )));
        }
        if self.unit_size <= 0.0 {
            return Err(AppError::Validation(format!(
                "unit_size must be positive, got {}",
                self.unit_size
            )));
        }
        Ok(())
    }
}

/// A [`PackConfig`] tagged with its provenance
///
/// `sample_count` and `brand` are populated for `learned` candidates only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackConfigCandidate {
    #[serde(flatten)]
    pub config: PackConfig,
    pub source: PackSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    /// Number of historical items the candidate was derived from (learned only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<u32>,
    /// Matched brand string (learned only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

impl PackConfigCandidate {
    /// A candidate freshly parsed from description text
    pub fn parsed(config: PackConfig) -> Self {
        Self {
            config,
            source: PackSource::Parsed,
            confidence: None,
            sample_count: None,
            brand: None,
        }
    }
}

/// Closed category enumeration for invoice line items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Wine,
    Liquor,
    Beer,
    Produce,
    Meat,
    Seafood,
    Dairy,
    DryGoods,
    Frozen,
    Packaging,
    Disposables,
    Chemicals,
    BarConsumable,
    NonAlcoholicBeverage,
    Food,
    Other,
}

/// Category plus optional subcategory, as produced by the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    pub subcategory: Option<String>,
}

/// The full normalization result for one description
///
/// Produced once per description; mutable only by explicit user override
/// before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub name: String,
    pub sku: Option<String>,
    pub uom: Uom,
    pub category: Category,
    pub subcategory: Option<String>,
    pub gl_account_id: Option<i64>,
}

/// The three purchasing-unit readings of an invoiced quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityUnit {
    AsInvoiced,
    Case,
    Bottle,
}

/// One interpretation of the invoiced quantity under a purchasing unit
///
/// Derived, never persisted directly; only the chosen interpretation's
/// resulting quantity is persisted as part of a [`MappingAction`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityInterpretation {
    pub unit: QuantityUnit,
    pub quantity: f64,
}

/// Terminal event associating an invoice line with a catalog item
///
/// Never mutated after creation; mapping a line twice replaces the prior
/// mapping rather than reverting state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingAction {
    pub line_id: i64,
    pub item_id: i64,
    /// Whether the item was newly created as part of this mapping
    pub item_created: bool,
    pub quantity: f64,
    pub quantity_unit: QuantityUnit,
    pub created_at: DateTime<Utc>,
}

/// Specification for an item created from a classification result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItemSpec {
    pub name: String,
    pub sku: Option<String>,
    pub uom: Uom,
    pub category: Category,
    pub subcategory: Option<String>,
    pub gl_account_id: Option<i64>,
    pub pack_config: Option<PackConfig>,
}

impl NewItemSpec {
    /// Build a creation spec from a classification snapshot and the chosen
    /// pack configuration
    pub fn from_result(result: ClassificationResult, pack_config: Option<PackConfig>) -> Self {
        Self {
            name: result.name,
            sku: result.sku,
            uom: result.uom,
            category: result.category,
            subcategory: result.subcategory,
            gl_account_id: result.gl_account_id,
            pack_config,
        }
    }
}
