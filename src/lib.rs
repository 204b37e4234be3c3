//! # Invoice Line Mapper
//!
//! Converts OCR-extracted vendor invoice line descriptions (e.g.
//! `"12x750ml Tequila Anejo"`) into structured purchasing and accounting
//! metadata: a normalized item name, a recipe unit of measure, a
//! category/subcategory classification, a GL-account suggestion, and a
//! pack-configuration candidate with recorded provenance.

pub mod arbiter;
pub mod classifier;
pub mod config;
pub mod errors;
pub mod mapping;
pub mod normalizer;
pub mod pack_patterns;
pub mod quantity;
pub mod recipe_uom;
pub mod types;
pub mod units;

// Re-export types for easier access
pub use config::MapperConfig;
pub use mapping::{LineClassification, LineRequest, MappingOrchestrator};
pub use types::{PackConfig, PackConfigCandidate, PackSource};
pub use units::{UnitSystem, Uom};
