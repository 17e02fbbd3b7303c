//! Session report
//!
//! Console tables for the menu, cart, order ledger, notifications and a
//! script transcript.

use std::io;

use tabled::{
    Table,
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    catalog::filter::CategoryFilter,
    orders::{Order, OrderStatus},
    pricing::PriceError,
    script::{Outcome, Transcript},
    session::{Session, kitchen::ReadyOutcome},
};

/// Errors that can occur when writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Cart total could not be calculated.
    #[error(transparent)]
    Price(#[from] PriceError),

    /// IO error
    #[error("IO error")]
    IO,
}

const TIME_FORMAT: &str = "%H:%M:%S";

/// Write the menu as filtered by the selected category.
///
/// # Errors
///
/// Returns [`ReportError::IO`] if the output can't be written.
pub fn write_menu(out: &mut impl io::Write, session: &Session) -> Result<(), ReportError> {
    let mut builder = Builder::default();

    builder.push_record(["#", "Item", "Category", "Price", "Available"]);

    for item in session.menu() {
        builder.push_record([
            item.id.to_string(),
            item.name.clone(),
            item.category.clone(),
            item.price.to_string(),
            if item.available { "yes" } else { "no" }.to_string(),
        ]);
    }

    let mut table = builder.build();
    table.modify(Columns::new(3..4), Alignment::right());

    let category = match session.selected_category() {
        CategoryFilter::All => session.catalog().all_label(),
        CategoryFilter::Only(category) => category.as_str(),
    };

    write_table(out, &format!("Menu ({category})"), table)
}

/// Write the cart and its total.
///
/// # Errors
///
/// Returns an error if the total overflows or the output can't be written.
pub fn write_cart(out: &mut impl io::Write, session: &Session) -> Result<(), ReportError> {
    let mut builder = Builder::default();

    builder.push_record(["Item", "Qty", "Price", "Line Total"]);

    for line in session.cart().lines() {
        builder.push_record([
            line.item().name.clone(),
            line.quantity().to_string(),
            line.item().price.to_string(),
            line.total()?.to_string(),
        ]);
    }

    let mut table = builder.build();
    table.modify(Columns::new(1..4), Alignment::right());

    write_table(out, "Cart", table)?;

    writeln!(out, " Total: {}", session.cart_total()?).map_err(|_err| ReportError::IO)
}

/// Write every order in the ledger, newest first.
///
/// # Errors
///
/// Returns [`ReportError::IO`] if the output can't be written.
pub fn write_orders(out: &mut impl io::Write, session: &Session) -> Result<(), ReportError> {
    let mut builder = Builder::default();
    let mut colors = Vec::new();

    builder.push_record(["Order", "Student", "Group", "Items", "Total", "Placed", "Ready By", "Status"]);

    for (row, order) in session.ledger().newest_first().enumerate() {
        builder.push_record(order_row(order));

        if let Some(color) = status_color(order.status()) {
            colors.push((row + 1, color));
        }
    }

    let mut table = builder.build();
    table.modify(Columns::new(4..5), Alignment::right());

    for (row, color) in colors {
        table.modify((row, 7), color);
    }

    write_table(out, "Orders", table)
}

/// Write live notifications, newest first.
///
/// # Errors
///
/// Returns [`ReportError::IO`] if the output can't be written.
pub fn write_notifications(out: &mut impl io::Write, session: &Session) -> Result<(), ReportError> {
    let mut builder = Builder::default();

    builder.push_record(["Recipient", "Message", "Expires"]);

    for (_, notification) in session.notifications().iter() {
        builder.push_record([
            notification.recipient.to_string(),
            notification.message.clone(),
            notification.expires_at.strftime(TIME_FORMAT).to_string(),
        ]);
    }

    write_table(out, "Notifications", builder.build())
}

/// Write each script step and what came of it.
///
/// # Errors
///
/// Returns [`ReportError::IO`] if the output can't be written.
pub fn write_transcript(out: &mut impl io::Write, transcript: &Transcript) -> Result<(), ReportError> {
    let mut builder = Builder::default();
    let mut rejected = Vec::new();

    builder.push_record(["Step", "Action", "Outcome"]);

    for step in transcript.steps() {
        builder.push_record([
            step.index.to_string(),
            format!("{:?}", step.action),
            describe(&step.outcome),
        ]);

        if step.outcome.is_rejected() {
            rejected.push(step.index + 1);
        }
    }

    let mut table = builder.build();

    for row in rejected {
        table.modify((row, 2), Color::FG_RED);
    }

    write_table(out, "Transcript", table)
}

fn order_row(order: &Order) -> [String; 8] {
    let items = order
        .items()
        .iter()
        .map(|line| format!("{} x{}", line.item().name, line.quantity()))
        .collect::<Vec<_>>()
        .join(", ");

    [
        order.id().to_string(),
        order.user().name().to_string(),
        order.user().group().unwrap_or_default().to_string(),
        items,
        order.total().to_string(),
        order.placed_at().strftime(TIME_FORMAT).to_string(),
        order.ready_by().strftime(TIME_FORMAT).to_string(),
        order.status().to_string(),
    ]
}

fn status_color(status: OrderStatus) -> Option<Color> {
    match status {
        OrderStatus::Preparing => Some(Color::FG_YELLOW),
        OrderStatus::Ready => Some(Color::FG_GREEN),
        OrderStatus::Accepted | OrderStatus::PickedUp => None,
    }
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Applied => "ok".to_string(),
        Outcome::Placed(order) => format!("placed #{order}"),
        Outcome::Declined => "declined".to_string(),
        Outcome::Marked(ReadyOutcome::Marked { .. }) => "marked ready".to_string(),
        Outcome::Marked(ReadyOutcome::AlreadyReady) => "already ready".to_string(),
        Outcome::Dismissed(true) => "dismissed".to_string(),
        Outcome::Dismissed(false) => "nothing to dismiss".to_string(),
        Outcome::Expired(count) => format!("{count} expired"),
        Outcome::Rejected(err) => err.to_string(),
    }
}

fn write_table(out: &mut impl io::Write, title: &str, mut table: Table) -> Result<(), ReportError> {
    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);

    writeln!(out, "\n {title}\n{table}").map_err(|_err| ReportError::IO)
}
