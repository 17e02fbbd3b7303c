//! Menu Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, RUB, USD},
};
use serde::Deserialize;

use crate::{
    catalog::{Catalog, DEFAULT_ALL_LABEL, MenuItem, MenuItemId},
    fixtures::FixtureError,
};

/// Menu file contents
#[derive(Debug, Deserialize)]
pub struct MenuFixture {
    /// Catalog currency code (e.g., "RUB"). Taken from the first item if omitted.
    #[serde(default)]
    pub currency: Option<String>,

    /// Label of the "every category" filter
    #[serde(default = "default_all_label")]
    pub all_label: String,

    /// Items in menu order
    pub items: Vec<MenuItemFixture>,
}

/// Menu Item Fixture
#[derive(Debug, Deserialize)]
pub struct MenuItemFixture {
    /// Item id
    pub id: u32,

    /// Item name
    pub name: String,

    /// Item category
    pub category: String,

    /// Item price (e.g., "120 RUB")
    pub price: String,

    /// Image reference
    #[serde(default)]
    pub image: String,

    /// Whether the item is being served
    #[serde(default = "served")]
    pub available: bool,

    /// Short description
    #[serde(default)]
    pub description: String,
}

fn default_all_label() -> String {
    DEFAULT_ALL_LABEL.to_string()
}

fn served() -> bool {
    true
}

impl TryFrom<MenuItemFixture> for MenuItem {
    type Error = FixtureError;

    fn try_from(fixture: MenuItemFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        Ok(MenuItem {
            id: MenuItemId(fixture.id),
            name: fixture.name,
            category: fixture.category,
            price: Money::from_minor(minor_units, currency),
            image_ref: fixture.image,
            available: fixture.available,
            description: fixture.description,
        })
    }
}

impl TryFrom<MenuFixture> for Catalog {
    type Error = FixtureError;

    fn try_from(fixture: MenuFixture) -> Result<Self, Self::Error> {
        let items = fixture
            .items
            .into_iter()
            .map(MenuItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let currency = match (&fixture.currency, items.first()) {
            (Some(code), _) => parse_currency(code)?,
            (None, Some(first)) => first.price.currency(),
            (None, None) => return Err(FixtureError::NoCurrency),
        };

        Ok(Catalog::with_items(items, currency)?.with_all_label(fixture.all_label))
    }
}

/// Parse price string (e.g., "120 RUB" or "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a decimal number, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, parse_currency(code)?))
}

/// Look up a supported ISO currency code.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for anything else.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "RUB" => Ok(RUB),
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}
