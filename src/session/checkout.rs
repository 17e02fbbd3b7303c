//! Checkout

use mockall::automock;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    notifications::NotificationKey,
    orders::{Order, OrderId},
    profile::Role,
    views::{Stage, View},
};

use super::{Session, SessionError};

/// Question put to the user before an order is committed.
pub const CONFIRM_PROMPT: &str = "Are you sure you want to place this order?";

/// Message sent to the student once an order is placed.
pub const PLACED_MESSAGE: &str =
    "Your order has been placed! You'll be notified when it's ready.";

/// Asks the user to confirm an action.
#[automock]
pub trait Confirm {
    /// Show `prompt`; `true` means go ahead.
    fn confirm(&self, prompt: &str) -> bool;
}

/// A fixed answer, for scripted and non-interactive use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

/// Checkout validation failures.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutError {
    /// No profile, or a blank name. Registration already insists on a group.
    #[error("Please enter your name")]
    MissingName,

    /// Nothing to order
    #[error("Your cart is empty")]
    EmptyCart,
}

/// How a checkout attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkout {
    /// The order was recorded and the cart emptied.
    Placed {
        /// The new order
        order: OrderId,
        /// Confirmation sent to the student
        notification: NotificationKey,
    },

    /// The user backed out at the confirmation prompt. Nothing changed.
    Declined,
}

impl Session {
    /// Turn the cart into an order.
    ///
    /// Validates the profile and cart, asks `confirm`, then snapshots the cart
    /// into a new order, empties the cart, switches to the orders view and
    /// notifies the student.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotPermitted`]: the acting role is not a student.
    /// - [`SessionError::Checkout`]: missing name or an empty cart.
    /// - [`SessionError::Price`]: the total overflowed.
    /// - [`SessionError::Time`]: the pickup deadline or notification expiry
    ///   is out of range.
    pub fn place_order(&mut self, confirm: &impl Confirm) -> Result<Checkout, SessionError> {
        if self.role != Some(Role::Student) {
            let stage = self.stage();
            warn!(%stage, "checkout attempted by non-student");
            return Err(SessionError::NotPermitted {
                action: "place an order",
                stage,
            });
        }

        self.validate_checkout().inspect_err(|err| {
            warn!(%err, "checkout rejected");
        })?;

        let Some(user) = self.profile.clone() else {
            return Err(CheckoutError::MissingName.into());
        };

        let total = self.cart.total()?;
        let placed_at = self.clock.now();
        let ready_by = placed_at.checked_add(self.config.pickup_window())?;
        let expires_at = self.notifications.expiry(placed_at)?;

        if !confirm.confirm(CONFIRM_PROMPT) {
            info!(user = %user.id(), "checkout declined");
            return Ok(Checkout::Declined);
        }

        let owner = user.id();
        let order = Order::new(
            user,
            self.cart.take(),
            total,
            placed_at,
            ready_by,
            self.config.flow.initial_status(),
        );

        let order = self.ledger.record(order);
        let notification =
            self.notifications
                .insert(owner, PLACED_MESSAGE, placed_at, expires_at);

        self.active_view = View::Orders;

        info!(%order, user = %owner, %total, "order placed");

        Ok(Checkout::Placed {
            order,
            notification,
        })
    }

    fn validate_checkout(&self) -> Result<(), CheckoutError> {
        let profile = self.profile.as_ref().ok_or(CheckoutError::MissingName)?;

        if profile.name().trim().is_empty() {
            return Err(CheckoutError::MissingName);
        }

        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        debug_assert_eq!(self.stage(), Stage::Student, "checkout needs a registered student");

        Ok(())
    }
}
