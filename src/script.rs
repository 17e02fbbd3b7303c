//! Scripted sessions
//!
//! A [`Script`] is a list of user actions loaded from YAML, e.g.
//!
//! ```yaml
//! steps:
//!   - action: select_role
//!     role: student
//!   - action: fill_registration
//!     name: Anna
//!     group: IT-21
//!   - action: register
//!   - action: add
//!     item: 1
//!   - action: place_order
//! ```
//!
//! Running a script drives a [`Session`] step by step. Actions the session
//! refuses are recorded in the [`Transcript`] and the run carries on, the same
//! way a user would see an error and keep going. Only steps that can't be
//! expressed at all (a negative quantity, an order that was never placed)
//! stop the run.

use jiff::SignedDuration;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::MenuItemId,
    clock::ManualClock,
    orders::{Order, OrderId},
    profile::Role,
    session::{
        Session, SessionError,
        checkout::{AutoConfirm, Checkout},
        kitchen::ReadyOutcome,
    },
    views::View,
};

/// Errors that abort a script run.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Quantities below zero can't be entered.
    #[error("Step {step}: quantity {quantity} is negative")]
    NegativeQuantity {
        /// Step index
        step: usize,
        /// Requested quantity
        quantity: i64,
    },

    /// Quantity beyond what a cart line can hold.
    #[error("Step {step}: quantity {quantity} is too large")]
    QuantityTooLarge {
        /// Step index
        step: usize,
        /// Requested quantity
        quantity: i64,
    },

    /// The step refers to an order that was never placed.
    #[error("Step {step}: no order #{index} has been placed")]
    UnknownOrder {
        /// Step index
        step: usize,
        /// Placement index the step asked for
        index: usize,
    },

    /// Advancing the clock overflowed.
    #[error(transparent)]
    Clock(#[from] jiff::Error),
}

/// One user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Choose student or cook.
    SelectRole {
        /// Role to act as
        role: Role,
    },

    /// Type into the registration form. Omitted fields are left alone.
    FillRegistration {
        /// Student name
        #[serde(default)]
        name: Option<String>,
        /// Study group
        #[serde(default)]
        group: Option<String>,
    },

    /// Submit the registration form.
    Register,

    /// Switch views.
    SelectView {
        /// View to show
        view: View,
    },

    /// Pick a category filter by label.
    SelectCategory {
        /// Filter-bar label
        category: String,
    },

    /// Add one unit to the cart.
    Add {
        /// Menu item
        item: MenuItemId,
    },

    /// Type a quantity into a cart line.
    SetQuantity {
        /// Menu item
        item: MenuItemId,
        /// New quantity
        quantity: i64,
    },

    /// Remove a cart line.
    Remove {
        /// Menu item
        item: MenuItemId,
    },

    /// Check out, answering the confirmation prompt with `confirm`.
    PlaceOrder {
        /// Answer to the prompt
        #[serde(default = "confirmed")]
        confirm: bool,
    },

    /// Cook marks an order ready.
    MarkReady {
        /// Placement index, counting from zero
        order: usize,
    },

    /// Cook hands an order over.
    MarkPickedUp {
        /// Placement index, counting from zero
        order: usize,
    },

    /// Close the acting user's newest notification.
    Dismiss,

    /// Let time pass, then drop expired notifications.
    Wait {
        /// Seconds to wait
        seconds: u32,
    },

    /// Log out.
    Logout,
}

fn confirmed() -> bool {
    true
}

/// What happened at one step.
#[derive(Debug)]
pub enum Outcome {
    /// The action went through.
    Applied,

    /// An order was placed.
    Placed(OrderId),

    /// The user declined at the confirmation prompt.
    Declined,

    /// The cook marked an order ready.
    Marked(ReadyOutcome),

    /// A notification was closed, or there was none to close.
    Dismissed(bool),

    /// Time passed; this many notifications expired.
    Expired(usize),

    /// The session refused the action.
    Rejected(SessionError),
}

impl Outcome {
    /// Whether the session refused the action.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }
}

/// A step and its outcome.
#[derive(Debug)]
pub struct Step {
    /// Position in the script, counting from zero
    pub index: usize,

    /// What was attempted
    pub action: Action,

    /// What came of it
    pub outcome: Outcome,
}

/// Record of a script run.
#[derive(Debug, Default)]
pub struct Transcript {
    steps: Vec<Step>,
}

impl Transcript {
    /// Steps in the order they ran
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Steps the session refused
    pub fn rejected(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|step| step.outcome.is_rejected())
    }

    /// Orders placed during the run, in placement order
    pub fn placed(&self) -> impl Iterator<Item = OrderId> {
        self.steps.iter().filter_map(|step| match step.outcome {
            Outcome::Placed(order) => Some(order),
            _ => None,
        })
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if nothing ran
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl FromIterator<Step> for Transcript {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

/// A scripted session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Actions in order
    pub steps: Vec<Action>,
}

impl Script {
    /// Play the script against `session`. `clock` must be the clock the
    /// session reads; [`Action::Wait`] advances it.
    ///
    /// # Errors
    ///
    /// Returns a [`ScriptError`] for a step that can't be carried out at all.
    /// Session refusals are recorded in the transcript instead.
    pub fn run(&self, session: &mut Session, clock: &ManualClock) -> Result<Transcript, ScriptError> {
        let mut transcript = Transcript::default();

        for (index, action) in self.steps.iter().enumerate() {
            let outcome = match apply(index, action, session, clock)? {
                Ok(outcome) => outcome,
                Err(err) => Outcome::Rejected(err),
            };

            debug!(step = index, ?action, ?outcome, "script step");

            transcript.steps.push(Step {
                index,
                action: action.clone(),
                outcome,
            });
        }

        Ok(transcript)
    }
}

fn apply(
    step: usize,
    action: &Action,
    session: &mut Session,
    clock: &ManualClock,
) -> Result<Result<Outcome, SessionError>, ScriptError> {
    let outcome = match action {
        Action::SelectRole { role } => session.select_role(*role).map(|()| Outcome::Applied),
        Action::FillRegistration { name, group } => fill(session, name.as_deref(), group.as_deref()),
        Action::Register => session.register().map(|_| Outcome::Applied),
        Action::SelectView { view } => session.select_view(*view).map(|()| Outcome::Applied),
        Action::SelectCategory { category } => {
            session.select_category(category);
            Ok(Outcome::Applied)
        }
        Action::Add { item } => session.add_to_cart(*item).map(|_| Outcome::Applied),
        Action::SetQuantity { item, quantity } => {
            let quantity = entered_quantity(step, *quantity)?;
            session
                .set_quantity(*item, quantity)
                .map(|()| Outcome::Applied)
        }
        Action::Remove { item } => session.remove_from_cart(*item).map(|()| Outcome::Applied),
        Action::PlaceOrder { confirm } => {
            session
                .place_order(&AutoConfirm(*confirm))
                .map(|checkout| match checkout {
                    Checkout::Placed { order, .. } => Outcome::Placed(order),
                    Checkout::Declined => Outcome::Declined,
                })
        }
        Action::MarkReady { order } => {
            let id = placed_order(step, session, *order)?;
            session.mark_order_ready(id).map(Outcome::Marked)
        }
        Action::MarkPickedUp { order } => {
            let id = placed_order(step, session, *order)?;
            session.mark_order_picked_up(id).map(|()| Outcome::Applied)
        }
        Action::Dismiss => {
            let newest = session.my_notifications().next().map(|(key, _)| key);
            let dismissed = newest.and_then(|key| session.dismiss_notification(key));
            Ok(Outcome::Dismissed(dismissed.is_some()))
        }
        Action::Wait { seconds } => {
            clock.advance(SignedDuration::from_secs(i64::from(*seconds)))?;
            Ok(Outcome::Expired(session.expire_notifications().len()))
        }
        Action::Logout => {
            session.logout();
            Ok(Outcome::Applied)
        }
    };

    Ok(outcome)
}

fn fill(
    session: &mut Session,
    name: Option<&str>,
    group: Option<&str>,
) -> Result<Outcome, SessionError> {
    if let Some(name) = name {
        session.set_registration_name(name)?;
    }

    if let Some(group) = group {
        session.set_registration_group(group)?;
    }

    Ok(Outcome::Applied)
}

fn entered_quantity(step: usize, quantity: i64) -> Result<u32, ScriptError> {
    if quantity < 0 {
        return Err(ScriptError::NegativeQuantity { step, quantity });
    }

    u32::try_from(quantity).map_err(|_err| ScriptError::QuantityTooLarge { step, quantity })
}

fn placed_order(step: usize, session: &Session, index: usize) -> Result<OrderId, ScriptError> {
    session
        .ledger()
        .nth_placed(index)
        .map(Order::id)
        .ok_or(ScriptError::UnknownOrder { step, index })
}
