//! Canteen
//!
//! A cafeteria ordering session: students browse a menu, fill a cart and
//! place orders; the cook marks them ready for pickup; short-lived
//! notifications tell each student what happened.
//!
//! [`session::Session`] holds all state and is driven synchronously.
//! [`live::LiveSession`] puts it on a tokio runtime so notifications expire on
//! their own, and [`script::Script`] replays a recorded session from YAML.

pub mod cart;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod fixtures;
pub mod ids;
pub mod live;
pub mod notifications;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod profile;
pub mod report;
pub mod script;
pub mod session;
pub mod views;
