//! Catalog

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    sync::Arc,
};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::Price;

pub mod filter;

/// Label used for the "every category" filter when a catalog doesn't name one.
pub const DEFAULT_ALL_LABEL: &str = "All";

/// Menu item identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuItemId(pub u32);

impl Display for MenuItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

/// An orderable dish.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    /// Item id, unique within a catalog
    pub id: MenuItemId,

    /// Display name
    pub name: String,

    /// Category the item is listed under
    pub category: String,

    /// Unit price
    pub price: Price,

    /// Image reference (URL or asset path)
    pub image_ref: String,

    /// Whether the kitchen is currently serving it
    pub available: bool,

    /// Short description
    pub description: String,
}

/// Errors related to catalog construction.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// An item's currency differs from the catalog currency (item, item currency, catalog currency).
    #[error("Item {0} has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(MenuItemId, &'static str, &'static str),

    /// Two items share an id.
    #[error("Duplicate menu item id {0}")]
    DuplicateId(MenuItemId),

    /// Prices are never negative.
    #[error("Item {0} has a negative price")]
    NegativePrice(MenuItemId),
}

/// The static set of orderable items, in menu order.
///
/// Items are handed out as `Arc<MenuItem>`, so carts and orders can hold on to
/// them without copying and without being able to change them.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<Arc<MenuItem>>,
    index: FxHashMap<MenuItemId, usize>,
    currency: &'static Currency,
    all_label: String,
}

impl Catalog {
    /// Create an empty catalog priced in `currency`.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            items: Vec::new(),
            index: FxHashMap::default(),
            currency,
            all_label: DEFAULT_ALL_LABEL.to_string(),
        }
    }

    /// Create a catalog from the given items.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] on a duplicate id, a negative price or a
    /// currency mismatch.
    pub fn with_items(
        items: impl IntoIterator<Item = MenuItem>,
        currency: &'static Currency,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(currency);

        for item in items {
            catalog.push(item)?;
        }

        Ok(catalog)
    }

    /// Set the label shown for the "every category" filter.
    #[must_use]
    pub fn with_all_label(mut self, label: impl Into<String>) -> Self {
        self.all_label = label.into();
        self
    }

    /// Append an item to the end of the menu.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] on a duplicate id, a negative price or a
    /// currency mismatch.
    pub fn push(&mut self, item: MenuItem) -> Result<&mut Self, CatalogError> {
        let item_currency = item.price.currency();

        if item_currency != self.currency {
            return Err(CatalogError::CurrencyMismatch(
                item.id,
                item_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if item.price.to_minor_units() < 0 {
            return Err(CatalogError::NegativePrice(item.id));
        }

        if self.index.contains_key(&item.id) {
            return Err(CatalogError::DuplicateId(item.id));
        }

        self.index.insert(item.id, self.items.len());
        self.items.push(Arc::new(item));

        Ok(self)
    }

    /// Look up an item by id.
    pub fn get(&self, id: MenuItemId) -> Option<&Arc<MenuItem>> {
        self.index.get(&id).and_then(|&idx| self.items.get(idx))
    }

    /// All items in menu order.
    pub fn items(&self) -> &[Arc<MenuItem>] {
        &self.items
    }

    /// Iterate over items in menu order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<MenuItem>> {
        self.items.iter()
    }

    /// Number of items on the menu.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the menu is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Currency every item is priced in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Label of the "every category" filter.
    pub fn all_label(&self) -> &str {
        &self.all_label
    }
}


#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso};
    use testresult::TestResult;

    use super::{test_support::item, *};

    #[test]
    fn with_items_keeps_menu_order() -> TestResult {
        let catalog = Catalog::with_items(
            [
                item(2, "Pasta", "Mains", 180),
                item(1, "Soup", "Soups", 120),
            ],
            iso::RUB,
        )?;

        let names: Vec<&str> = catalog.iter().map(|i| i.name.as_str()).collect();

        assert_eq!(names, ["Pasta", "Soup"]);
        assert_eq!(catalog.len(), 2);

        Ok(())
    }

    #[test]
    fn get_finds_by_id() -> TestResult {
        let catalog = Catalog::with_items([item(7, "Eclair", "Desserts", 90)], iso::RUB)?;

        assert_eq!(
            catalog.get(MenuItemId(7)).map(|i| i.name.as_str()),
            Some("Eclair")
        );
        assert!(catalog.get(MenuItemId(8)).is_none());

        Ok(())
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = Catalog::with_items(
            [item(1, "Soup", "Soups", 120), item(1, "Pasta", "Mains", 180)],
            iso::RUB,
        );

        assert_eq!(
            result.err(),
            Some(CatalogError::DuplicateId(MenuItemId(1)))
        );
    }

    #[test]
    fn currency_mismatch_is_rejected() {
        let mut euro_item = item(3, "Salad", "Salads", 150);
        euro_item.price = Money::from_major(5, iso::EUR);

        let result = Catalog::with_items([euro_item], iso::RUB);

        assert_eq!(
            result.err(),
            Some(CatalogError::CurrencyMismatch(
                MenuItemId(3),
                iso::EUR.iso_alpha_code,
                iso::RUB.iso_alpha_code,
            ))
        );
    }

    #[test]
    fn negative_prices_are_rejected() {
        let result = Catalog::with_items([item(4, "Compote", "Drinks", -60)], iso::RUB);

        assert_eq!(
            result.err(),
            Some(CatalogError::NegativePrice(MenuItemId(4)))
        );
    }

    #[test]
    fn all_label_defaults_and_overrides() {
        let catalog = Catalog::new(iso::RUB);
        assert_eq!(catalog.all_label(), DEFAULT_ALL_LABEL);

        let catalog = catalog.with_all_label("Все");
        assert_eq!(catalog.all_label(), "Все");
    }
}
