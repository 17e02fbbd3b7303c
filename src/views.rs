//! Role and view gating

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::profile::Role;

/// A screen the display layer can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Pick student or cook.
    RoleSelection,

    /// Name and group form.
    Registration,

    /// Browse and filter the menu.
    Menu,

    /// Review the cart and check out.
    Cart,

    /// The student's own orders.
    Orders,

    /// Every open order, for the cook.
    Kitchen,
}

impl Display for View {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            View::RoleSelection => "role selection",
            View::Registration => "registration",
            View::Menu => "menu",
            View::Cart => "cart",
            View::Orders => "orders",
            View::Kitchen => "kitchen",
        })
    }
}

/// Where the session is in the sign-in flow. Decides which views exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// No role yet.
    ChoosingRole,

    /// Student without a profile.
    Registering,

    /// Registered student.
    Student,

    /// Cook, profile synthesized.
    Kitchen,
}

impl Stage {
    /// Work out the stage from the role and whether a profile exists.
    pub fn of(role: Option<Role>, registered: bool) -> Self {
        match (role, registered) {
            (None, _) => Stage::ChoosingRole,
            (Some(Role::Student), false) => Stage::Registering,
            (Some(Role::Student), true) => Stage::Student,
            (Some(Role::Cook), _) => Stage::Kitchen,
        }
    }

    /// Views reachable at this stage, the default first.
    pub fn views(self) -> &'static [View] {
        match self {
            Stage::ChoosingRole => &[View::RoleSelection],
            Stage::Registering => &[View::Registration],
            Stage::Student => &[View::Menu, View::Cart, View::Orders],
            Stage::Kitchen => &[View::Kitchen],
        }
    }

    /// View shown on entering this stage.
    pub fn default_view(self) -> View {
        match self {
            Stage::ChoosingRole => View::RoleSelection,
            Stage::Registering => View::Registration,
            Stage::Student => View::Menu,
            Stage::Kitchen => View::Kitchen,
        }
    }

    /// Whether `view` can be shown at this stage.
    pub fn allows(self, view: View) -> bool {
        self.views().contains(&view)
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Stage::ChoosingRole => "choosing a role",
            Stage::Registering => "registering",
            Stage::Student => "student",
            Stage::Kitchen => "kitchen",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_follows_role_and_profile() {
        assert_eq!(Stage::of(None, false), Stage::ChoosingRole);
        assert_eq!(Stage::of(None, true), Stage::ChoosingRole);
        assert_eq!(Stage::of(Some(Role::Student), false), Stage::Registering);
        assert_eq!(Stage::of(Some(Role::Student), true), Stage::Student);
        assert_eq!(Stage::of(Some(Role::Cook), true), Stage::Kitchen);
    }

    #[test]
    fn default_view_is_reachable() {
        for stage in [
            Stage::ChoosingRole,
            Stage::Registering,
            Stage::Student,
            Stage::Kitchen,
        ] {
            assert!(
                stage.allows(stage.default_view()),
                "default view of {stage} must be reachable"
            );
            assert_eq!(stage.views().first(), Some(&stage.default_view()));
        }
    }

    #[test]
    fn student_views_exclude_kitchen() {
        assert!(Stage::Student.allows(View::Cart));
        assert!(Stage::Student.allows(View::Orders));
        assert!(!Stage::Student.allows(View::Kitchen));
        assert!(!Stage::Kitchen.allows(View::Menu));
        assert!(!Stage::Registering.allows(View::Menu));
    }
}
