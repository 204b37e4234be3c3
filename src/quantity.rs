//! # Purchasing-Unit Quantity Resolver
//!
//! Given an invoiced quantity and a detected pack size, computes the
//! equivalent quantity under each purchasing-unit interpretation (as
//! invoiced, case, bottle/each) so a human can pick the intended one.
//!
//! Pure arithmetic; no rounding beyond display formatting.

use crate::errors::{AppError, AppResult};
use crate::types::{QuantityInterpretation, QuantityUnit};

/// Resolve an invoiced quantity under one purchasing-unit interpretation
///
/// `case` interprets the invoiced quantity as bottles and converts to cases;
/// `bottle` interprets it as cases and converts to bottles. Without a pack
/// size only `as_invoiced` is valid.
///
/// # Examples
///
/// ```rust
/// use invoice_mapper::quantity::resolve_quantity;
/// use invoice_mapper::types::QuantityUnit;
///
/// assert_eq!(resolve_quantity(3.0, Some(6.0), QuantityUnit::AsInvoiced).unwrap(), 3.0);
/// assert_eq!(resolve_quantity(3.0, Some(6.0), QuantityUnit::Case).unwrap(), 0.5);
/// assert_eq!(resolve_quantity(3.0, Some(6.0), QuantityUnit::Bottle).unwrap(), 18.0);
/// ```
pub fn resolve_quantity(
    invoiced_qty: f64,
    pack_size: Option<f64>,
    chosen: QuantityUnit,
) -> AppResult<f64> {
    if let Some(size) = pack_size {
        if size <= 0.0 {
            return Err(AppError::Validation(format!(
                "pack size must be positive, got {}",
                size
            )));
        }
    }

    match chosen {
        QuantityUnit::AsInvoiced => Ok(invoiced_qty),
        QuantityUnit::Case => match pack_size {
            Some(size) => Ok(invoiced_qty / size),
            None => Err(AppError::Validation(
                "case interpretation requires a pack size".to_string(),
            )),
        },
        QuantityUnit::Bottle => match pack_size {
            Some(size) => Ok(invoiced_qty * size),
            None => Err(AppError::Validation(
                "bottle interpretation requires a pack size".to_string(),
            )),
        },
    }
}

/// Compute every valid interpretation of the invoiced quantity
///
/// The interpretations are always produced together so the user can compare
/// them side by side before committing. Without a pack size only the
/// as-invoiced reading exists.
pub fn quantity_interpretations(
    invoiced_qty: f64,
    pack_size: Option<f64>,
) -> Vec<QuantityInterpretation> {
    let units: &[QuantityUnit] = match pack_size {
        Some(_) => &[
            QuantityUnit::AsInvoiced,
            QuantityUnit::Case,
            QuantityUnit::Bottle,
        ],
        None => &[QuantityUnit::AsInvoiced],
    };

    units
        .iter()
        .filter_map(|unit| {
            resolve_quantity(invoiced_qty, pack_size, *unit)
                .ok()
                .map(|quantity| QuantityInterpretation {
                    unit: *unit,
                    quantity,
                })
        })
        .collect()
}
