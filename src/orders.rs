//! Orders

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::CartLine,
    ids::TypedUuid,
    pricing::Price,
    profile::{UserId, UserProfile},
};

/// Order id, time-ordered
pub type OrderId = TypedUuid<Order>;

/// Where an order is in its lifecycle.
///
/// Statuses only ever move forward: `Preparing → Ready → PickedUp`.
/// `Accepted` is the single status of the counter flow and never moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Taken at the counter; nothing further is tracked.
    Accepted,

    /// With the kitchen.
    Preparing,

    /// Waiting at the pickup window.
    Ready,

    /// Handed to the student.
    PickedUp,
}

impl OrderStatus {
    /// Terminal orders drop off the kitchen board.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Accepted | OrderStatus::PickedUp)
    }

    /// Whether the lifecycle allows moving straight from `self` to `next`.
    pub fn can_advance_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Preparing, OrderStatus::Ready)
                | (OrderStatus::Ready, OrderStatus::PickedUp)
        )
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            OrderStatus::Accepted => "Order accepted",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Ready => "Ready",
            OrderStatus::PickedUp => "Picked up",
        })
    }
}

/// Lifecycle errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// No order with this id in the ledger
    #[error("Order {0} not found")]
    NotFound(OrderId),

    /// The lifecycle doesn't allow this move
    #[error("Order {order} can't go from {from} to {to}")]
    InvalidTransition {
        /// Order being moved
        order: OrderId,
        /// Current status
        from: OrderStatus,
        /// Requested status
        to: OrderStatus,
    },
}

/// A placed order: a frozen copy of the cart plus a status.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: OrderId,
    user: UserProfile,
    items: Vec<CartLine>,
    total: Price,
    placed_at: Timestamp,
    ready_by: Timestamp,
    status: OrderStatus,
}

impl Order {
    /// Build an order from a checkout snapshot.
    pub fn new(
        user: UserProfile,
        items: Vec<CartLine>,
        total: Price,
        placed_at: Timestamp,
        ready_by: Timestamp,
        status: OrderStatus,
    ) -> Self {
        Self {
            id: OrderId::now_v7(),
            user,
            items,
            total,
            placed_at,
            ready_by,
            status,
        }
    }

    /// Order id
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// The placing user as they were at checkout
    pub fn user(&self) -> &UserProfile {
        &self.user
    }

    /// Id of the placing user
    pub fn owner(&self) -> UserId {
        self.user.id()
    }

    /// Items as they were in the cart at checkout
    pub fn items(&self) -> &[CartLine] {
        &self.items
    }

    /// Total at checkout
    pub fn total(&self) -> Price {
        self.total
    }

    /// When the order was placed
    pub fn placed_at(&self) -> Timestamp {
        self.placed_at
    }

    /// Pickup deadline shown to the student. Display only, nothing enforces it.
    pub fn ready_by(&self) -> Timestamp {
        self.ready_by
    }

    /// Current status
    pub fn status(&self) -> OrderStatus {
        self.status
    }
}

/// Result of a status change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The status moved on from `from`.
    Advanced {
        /// Status before the move
        from: OrderStatus,
    },

    /// The order already had the requested status; nothing changed.
    Unchanged,
}

/// Append-only list of placed orders.
#[derive(Debug, Clone, Default)]
pub struct OrderLedger {
    orders: Vec<Order>,
}

impl OrderLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new order.
    pub fn record(&mut self, order: Order) -> OrderId {
        let id = order.id();
        self.orders.push(order);
        id
    }

    /// Look up an order.
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| order.id == id)
    }

    /// The `n`th order ever placed, counting from zero.
    pub fn nth_placed(&self, n: usize) -> Option<&Order> {
        self.orders.get(n)
    }

    /// Move an order to `to`, if the lifecycle allows it. Asking for the
    /// status the order already has is accepted and changes nothing.
    ///
    /// # Errors
    ///
    /// - [`OrderError::NotFound`]: no such order.
    /// - [`OrderError::InvalidTransition`]: the lifecycle forbids the move.
    pub fn advance(&mut self, id: OrderId, to: OrderStatus) -> Result<Transition, OrderError> {
        let order = self
            .orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or(OrderError::NotFound(id))?;

        let from = order.status;

        if from == to {
            return Ok(Transition::Unchanged);
        }

        if !from.can_advance_to(to) {
            return Err(OrderError::InvalidTransition {
                order: id,
                from,
                to,
            });
        }

        order.status = to;

        Ok(Transition::Advanced { from })
    }

    /// All orders, newest first.
    pub fn newest_first(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().rev()
    }

    /// Orders placed by `owner`, newest first.
    pub fn for_owner(&self, owner: UserId) -> impl Iterator<Item = &Order> {
        self.newest_first()
            .filter(move |order| order.owner() == owner)
    }

    /// Orders the kitchen still has to deal with, newest first.
    pub fn open(&self) -> impl Iterator<Item = &Order> {
        self.newest_first()
            .filter(|order| !order.status.is_terminal())
    }

    /// Number of orders ever placed.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Check if no order was ever placed.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
