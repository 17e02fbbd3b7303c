//! Canteen prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartLine},
    catalog::{Catalog, CatalogError, MenuItem, MenuItemId, filter::CategoryFilter},
    clock::{Clock, ManualClock, SystemClock, Ticker},
    config::{Flow, SessionConfig},
    fixtures::{Fixture, FixtureError},
    live::LiveSession,
    notifications::{Notification, NotificationKey, NotificationQueue},
    orders::{Order, OrderError, OrderId, OrderLedger, OrderStatus},
    pricing::{Price, PriceError},
    profile::{RegistrationDraft, RegistrationError, Role, UserId, UserProfile},
    script::{Action, Outcome, Script, ScriptError, Transcript},
    session::{
        Session, SessionError,
        checkout::{AutoConfirm, Checkout, CheckoutError, Confirm},
        kitchen::ReadyOutcome,
    },
    views::{Stage, View},
};
