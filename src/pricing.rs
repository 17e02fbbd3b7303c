//! Prices

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// A menu price. Catalog prices live for the whole program, so the currency
/// reference is always `'static`.
pub type Price = Money<'static, Currency>;

/// Errors that can occur while calculating totals.
#[derive(Debug, Error, PartialEq)]
pub enum PriceError {
    /// A line or running total no longer fits in minor units.
    #[error("price total overflowed")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Price of `quantity` units at `price` each.
///
/// # Errors
///
/// Returns [`PriceError::Overflow`] if the product does not fit in minor units.
pub fn line_total(price: &Price, quantity: u32) -> Result<Price, PriceError> {
    let minor_units = price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(PriceError::Overflow)?;

    Ok(Money::from_minor(minor_units, price.currency()))
}

/// Sums `price × quantity` over the given lines. An empty iterator yields
/// zero in `currency`.
///
/// # Errors
///
/// - [`PriceError::Overflow`]: a line total overflowed.
/// - [`PriceError::Money`]: a line is priced in a different currency.
pub fn total_price<'p>(
    lines: impl IntoIterator<Item = (&'p Price, u32)>,
    currency: &'static Currency,
) -> Result<Price, PriceError> {
    lines
        .into_iter()
        .try_fold(Money::from_minor(0, currency), |acc, (price, quantity)| {
            Ok(acc.add(line_total(price, quantity)?)?)
        })
}
