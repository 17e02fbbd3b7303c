//! Cart

use std::{mem, num::NonZeroU32, sync::Arc};

use rusty_money::iso::Currency;

use crate::{
    catalog::{MenuItem, MenuItemId},
    pricing::{Price, PriceError, line_total, total_price},
};

/// One item in the cart with its quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    item: Arc<MenuItem>,
    quantity: NonZeroU32,
}

impl CartLine {
    /// Creates a line holding a single unit of `item`.
    pub fn new(item: Arc<MenuItem>) -> Self {
        Self {
            item,
            quantity: NonZeroU32::MIN,
        }
    }

    /// The menu item
    pub fn item(&self) -> &MenuItem {
        &self.item
    }

    /// Units ordered, always at least one
    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    /// `price × quantity` for this line.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the total does not fit in minor units.
    pub fn total(&self) -> Result<Price, PriceError> {
        line_total(&self.item.price, self.quantity())
    }
}

/// The in-progress, pre-checkout selection.
///
/// Holds at most one line per menu item id, in the order items were first added.
#[derive(Debug, Clone)]
pub struct Cart {
    lines: Vec<CartLine>,
    currency: &'static Currency,
}

impl Cart {
    /// Create an empty cart.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            lines: Vec::new(),
            currency,
        }
    }

    /// Add one unit of `item`, returning the line's new quantity.
    pub fn add(&mut self, item: Arc<MenuItem>) -> u32 {
        if let Some(line) = self.line_mut(item.id) {
            line.quantity = line.quantity.saturating_add(1);
            return line.quantity();
        }

        self.lines.push(CartLine::new(item));

        1
    }

    /// Overwrite the quantity for `id`. Zero removes the line; an id that is
    /// not in the cart is left alone.
    pub fn set_quantity(&mut self, id: MenuItemId, quantity: u32) {
        match NonZeroU32::new(quantity) {
            None => {
                self.remove(id);
            }
            Some(quantity) => {
                if let Some(line) = self.line_mut(id) {
                    line.quantity = quantity;
                }
            }
        }
    }

    /// Remove the line for `id`, if there is one.
    pub fn remove(&mut self, id: MenuItemId) -> Option<CartLine> {
        let position = self.lines.iter().position(|line| line.item.id == id)?;

        Some(self.lines.remove(position))
    }

    /// Sum of `price × quantity` over all lines; zero for an empty cart.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if a line total overflows.
    pub fn total(&self) -> Result<Price, PriceError> {
        total_price(
            self.lines
                .iter()
                .map(|line| (&line.item.price, line.quantity())),
            self.currency,
        )
    }

    /// Lines in the order they were first added.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for `id`, if present.
    pub fn line(&self, id: MenuItemId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.item.id == id)
    }

    /// Number of distinct items in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    pub fn units(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity())).sum()
    }

    /// Currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Empty the cart, handing back its lines.
    pub fn take(&mut self) -> Vec<CartLine> {
        mem::take(&mut self.lines)
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    fn line_mut(&mut self, id: MenuItemId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.item.id == id)
    }
}
