//! Pure display derivations for positions.

use crate::entities::{Pair, Position};
use crate::errors::DomainError;
use crate::value_objects::{Price, PriceRange};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Returns the approximate price at a bin.
/// P = (1 + binStep/10000) ^ binId
///
/// A bin step of zero is defined as price 1 for every bin, sidestepping
/// the degenerate computation.
pub fn bin_price(bin_id: i32, bin_step: u16) -> Result<Price, DomainError> {
    if bin_step == 0 {
        return Ok(Price::new(Decimal::ONE));
    }
    let base = 1.0 + f64::from(bin_step) / 10_000.0;
    let value = base.powi(bin_id);
    Decimal::from_f64(value)
        .map(Price::new)
        .ok_or(DomainError::PriceOverflow { bin_id })
}

/// Price range of a position for display. An empty shell has no
/// meaningful range and yields `None`; callers render a placeholder.
pub fn price_range(position: &Position, pair: &Pair) -> Result<Option<PriceRange>, DomainError> {
    if !position.has_liquidity() {
        return Ok(None);
    }
    let lower = bin_price(position.lower_bin_id, pair.bin_step)?;
    let upper = bin_price(position.upper_bin_id, pair.bin_step)?;
    Ok(Some(PriceRange::new(lower, upper)))
}
