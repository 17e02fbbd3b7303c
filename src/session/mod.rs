//! Ordering session
//!
//! [`Session`] owns every piece of state for one user session: the catalog,
//! cart, order ledger, notifications, and who is acting. Queries borrow;
//! mutations go through explicit methods and return a [`SessionError`] when
//! the current stage doesn't allow them.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use jiff::Timestamp;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    cart::Cart,
    catalog::{Catalog, MenuItem, MenuItemId, filter::CategoryFilter},
    clock::{Clock, SystemClock},
    config::{Flow, SessionConfig},
    notifications::{Notification, NotificationKey, NotificationQueue},
    orders::{Order, OrderError, OrderLedger},
    pricing::{Price, PriceError},
    profile::{RegistrationDraft, RegistrationError, Role, UserProfile},
    views::{Stage, View},
};

pub mod checkout;
pub mod kitchen;

/// Errors returned by session operations. All of them leave the session as
/// it was, so the user can correct the input and retry.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The action isn't available at the current stage.
    #[error("Can't {action} while {stage}")]
    NotPermitted {
        /// What was attempted
        action: &'static str,
        /// Stage the session was in
        stage: Stage,
    },

    /// A role was already chosen; log out first.
    #[error("A role is already selected")]
    RoleAlreadySelected,

    /// The view isn't reachable at the current stage.
    #[error("The {0} view isn't available")]
    ViewUnavailable(View),

    /// No such item on the menu.
    #[error("Menu item {0} not found")]
    UnknownItem(MenuItemId),

    /// Registration form is incomplete.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// Checkout preconditions failed.
    #[error(transparent)]
    Checkout(#[from] checkout::CheckoutError),

    /// Order lifecycle error.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Total calculation failed.
    #[error(transparent)]
    Price(#[from] PriceError),

    /// A timestamp fell out of range.
    #[error(transparent)]
    Time(#[from] jiff::Error),
}

/// One user's ordering session.
pub struct Session {
    config: SessionConfig,
    catalog: Arc<Catalog>,
    clock: Box<dyn Clock>,
    role: Option<Role>,
    profile: Option<UserProfile>,
    draft: RegistrationDraft,
    active_view: View,
    category: CategoryFilter,
    cart: Cart,
    ledger: OrderLedger,
    notifications: NotificationQueue,
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Session")
            .field("flow", &self.config.flow)
            .field("role", &self.role)
            .field("profile", &self.profile)
            .field("active_view", &self.active_view)
            .field("category", &self.category)
            .field("cart", &self.cart)
            .field("orders", &self.ledger.len())
            .field("notifications", &self.notifications.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Start a session on the wall clock.
    pub fn new(catalog: Arc<Catalog>, config: SessionConfig) -> Self {
        Self::with_clock(catalog, config, SystemClock)
    }

    /// Start a session reading time from `clock`.
    pub fn with_clock(
        catalog: Arc<Catalog>,
        config: SessionConfig,
        clock: impl Clock + 'static,
    ) -> Self {
        let role = config.flow.initial_role();
        let active_view = Stage::of(role, false).default_view();

        Self {
            cart: Cart::new(catalog.currency()),
            notifications: NotificationQueue::new(config.notification_ttl()),
            ledger: OrderLedger::new(),
            clock: Box::new(clock),
            role,
            profile: None,
            draft: RegistrationDraft::default(),
            active_view,
            category: CategoryFilter::All,
            catalog,
            config,
        }
    }

    // Queries

    /// Session settings
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Ordering flow
    pub fn flow(&self) -> Flow {
        self.config.flow
    }

    /// Current time according to the session clock
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Acting role, if chosen
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Acting user's profile, once registered
    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// Registration form contents
    pub fn draft(&self) -> &RegistrationDraft {
        &self.draft
    }

    /// Where the session is in the sign-in flow
    pub fn stage(&self) -> Stage {
        Stage::of(self.role, self.profile.is_some())
    }

    /// View currently shown
    pub fn active_view(&self) -> View {
        self.active_view
    }

    /// Views the user can switch to
    pub fn available_views(&self) -> &'static [View] {
        self.stage().views()
    }

    /// The full menu
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Filter-bar labels
    pub fn categories(&self) -> SmallVec<[&str; 8]> {
        self.catalog.categories()
    }

    /// Selected category filter
    pub fn selected_category(&self) -> &CategoryFilter {
        &self.category
    }

    /// Menu items passing the selected category filter
    pub fn menu(&self) -> impl Iterator<Item = &Arc<MenuItem>> {
        self.catalog.filtered(&self.category)
    }

    /// The cart
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Cart total
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if the total overflows.
    pub fn cart_total(&self) -> Result<Price, PriceError> {
        self.cart.total()
    }

    /// Every order ever placed
    pub fn ledger(&self) -> &OrderLedger {
        &self.ledger
    }

    /// The acting user's orders, newest first. Empty until registered.
    pub fn my_orders(&self) -> impl Iterator<Item = &Order> {
        self.profile
            .as_ref()
            .map(|profile| self.ledger.for_owner(profile.id()))
            .into_iter()
            .flatten()
    }

    /// Every open order across all students, newest first
    pub fn kitchen_orders(&self) -> impl Iterator<Item = &Order> {
        self.ledger.open()
    }

    /// All live notifications
    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    /// Live notifications addressed to the acting user, newest first
    pub fn my_notifications(&self) -> impl Iterator<Item = (NotificationKey, &Notification)> {
        let recipient = self.profile.as_ref().map(UserProfile::id);

        self.notifications
            .iter()
            .filter(move |(_, n)| Some(n.recipient) == recipient)
    }

    // Identity

    /// Choose a role. Cooks get a synthesized profile and go straight to the
    /// kitchen; students go to registration.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::RoleAlreadySelected`] if a role is already set.
    pub fn select_role(&mut self, role: Role) -> Result<(), SessionError> {
        if self.role.is_some() {
            warn!(%role, "role selection rejected, role already set");
            return Err(SessionError::RoleAlreadySelected);
        }

        self.role = Some(role);

        if role == Role::Cook {
            self.profile = Some(UserProfile::cook());
        }

        self.active_view = self.stage().default_view();

        info!(%role, view = %self.active_view, "role selected");

        Ok(())
    }

    /// Update the name on the registration form.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotPermitted`] outside registration.
    pub fn set_registration_name(&mut self, name: impl Into<String>) -> Result<(), SessionError> {
        self.require_stage(Stage::Registering, "edit the registration form")?;
        self.draft.name = name.into();
        Ok(())
    }

    /// Update the group on the registration form.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotPermitted`] outside registration.
    pub fn set_registration_group(
        &mut self,
        group: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.require_stage(Stage::Registering, "edit the registration form")?;
        self.draft.group = group.into();
        Ok(())
    }

    /// Submit the registration form and move on to the menu.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotPermitted`]: not registering.
    /// - [`SessionError::Registration`]: name or group left blank.
    pub fn register(&mut self) -> Result<&UserProfile, SessionError> {
        self.require_stage(Stage::Registering, "register")?;

        let profile = self.draft.register().inspect_err(|err| {
            warn!(%err, "registration rejected");
        })?;

        info!(user = %profile.id(), name = profile.name(), "student registered");

        self.active_view = Stage::Student.default_view();

        Ok(self.profile.insert(profile))
    }

    /// Reset the whole session to its initial state: role, profile,
    /// registration form, cart, view and category filter. Orders and live
    /// notifications stay.
    pub fn logout(&mut self) {
        info!(role = ?self.role, "logout");

        self.role = self.config.flow.initial_role();
        self.profile = None;
        self.draft = RegistrationDraft::default();
        self.cart.clear();
        self.category = CategoryFilter::All;
        self.active_view = self.stage().default_view();
    }

    // Navigation

    /// Switch to another view.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ViewUnavailable`] if the view isn't reachable.
    pub fn select_view(&mut self, view: View) -> Result<(), SessionError> {
        if !self.stage().allows(view) {
            warn!(%view, stage = %self.stage(), "view unavailable");
            return Err(SessionError::ViewUnavailable(view));
        }

        self.active_view = view;

        Ok(())
    }

    /// Pick a category by its filter-bar label.
    pub fn select_category(&mut self, label: &str) -> &CategoryFilter {
        self.category = self.catalog.category_filter(label);
        &self.category
    }

    // Cart

    /// Add one unit of a menu item, returning the new quantity.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotPermitted`]: not a registered student.
    /// - [`SessionError::UnknownItem`]: no such item.
    pub fn add_to_cart(&mut self, id: MenuItemId) -> Result<u32, SessionError> {
        self.require_stage(Stage::Student, "change the cart")?;

        let item = self
            .catalog
            .get(id)
            .cloned()
            .ok_or(SessionError::UnknownItem(id))?;

        let quantity = self.cart.add(item);

        debug!(item = %id, quantity, "added to cart");

        Ok(quantity)
    }

    /// Overwrite an item's quantity; zero removes it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotPermitted`] unless a registered student.
    pub fn set_quantity(&mut self, id: MenuItemId, quantity: u32) -> Result<(), SessionError> {
        self.require_stage(Stage::Student, "change the cart")?;

        self.cart.set_quantity(id, quantity);

        debug!(item = %id, quantity, "cart quantity set");

        Ok(())
    }

    /// Remove an item from the cart. Absent items are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotPermitted`] unless a registered student.
    pub fn remove_from_cart(&mut self, id: MenuItemId) -> Result<(), SessionError> {
        self.require_stage(Stage::Student, "change the cart")?;

        if self.cart.remove(id).is_some() {
            debug!(item = %id, "removed from cart");
        }

        Ok(())
    }

    // Notifications

    /// Close a notification by hand.
    pub fn dismiss_notification(&mut self, key: NotificationKey) -> Option<Notification> {
        self.notifications.dismiss(key)
    }

    /// Drop every notification that has outlived its TTL.
    pub fn expire_notifications(&mut self) -> SmallVec<[NotificationKey; 4]> {
        let expired = self.notifications.expire(self.clock.now());

        if !expired.is_empty() {
            debug!(count = expired.len(), "notifications expired");
        }

        expired
    }

    fn require_stage(&self, stage: Stage, action: &'static str) -> Result<(), SessionError> {
        let current = self.stage();

        if current == stage {
            Ok(())
        } else {
            warn!(action, stage = %current, "action not permitted");
            Err(SessionError::NotPermitted {
                action,
                stage: current,
            })
        }
    }
}
