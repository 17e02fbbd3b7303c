//! Roles and user profiles

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::TypedUuid;

/// Name given to the synthesized cook profile.
pub const COOK_NAME: &str = "Cook";

/// User id, assigned at registration
pub type UserId = TypedUuid<UserProfile>;

/// The acting party's capability class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Browses the menu and places orders.
    Student,

    /// Works the kitchen and fulfils orders.
    Cook,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Role::Student => f.write_str("student"),
            Role::Cook => f.write_str("cook"),
        }
    }
}

/// A registered user. Never changes once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    id: UserId,
    name: String,
    group: Option<String>,
    role: Role,
}

impl UserProfile {
    /// The kitchen's profile, created without a form.
    #[must_use]
    pub fn cook() -> Self {
        Self {
            id: UserId::now_v7(),
            name: COOK_NAME.to_string(),
            group: None,
            role: Role::Cook,
        }
    }

    /// Profile id
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Study group, for students
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Role the profile was created for
    pub fn role(&self) -> Role {
        self.role
    }
}

/// Validation failures on the registration form.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationError {
    /// Name left blank
    #[error("Please enter your name")]
    MissingName,

    /// Group left blank
    #[error("Please enter your group")]
    MissingGroup,
}

/// Registration form contents, not yet submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationDraft {
    /// Name as typed
    pub name: String,

    /// Group as typed
    pub group: String,
}

impl RegistrationDraft {
    /// Check that both fields are filled in. Whitespace counts as blank.
    ///
    /// # Errors
    ///
    /// Returns the first missing field.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        if self.name.trim().is_empty() {
            return Err(RegistrationError::MissingName);
        }

        if self.group.trim().is_empty() {
            return Err(RegistrationError::MissingGroup);
        }

        Ok(())
    }

    /// Submit the form, minting a fresh student profile.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistrationError`] if a field is blank.
    pub fn register(&self) -> Result<UserProfile, RegistrationError> {
        self.validate()?;

        Ok(UserProfile {
            id: UserId::now_v7(),
            name: self.name.trim().to_string(),
            group: Some(self.group.trim().to_string()),
            role: Role::Student,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn draft(name: &str, group: &str) -> RegistrationDraft {
        RegistrationDraft {
            name: name.to_string(),
            group: group.to_string(),
        }
    }

    #[test]
    fn blank_name_is_rejected_first() {
        assert_eq!(
            draft("  ", "").register(),
            Err(RegistrationError::MissingName)
        );
    }

    #[test]
    fn blank_group_is_rejected() {
        assert_eq!(
            draft("Anna", "").register(),
            Err(RegistrationError::MissingGroup)
        );
    }

    #[test]
    fn register_trims_and_assigns_unique_ids() -> TestResult {
        let form = draft(" Anna ", " IT-21 ");

        let first = form.register()?;
        let second = form.register()?;

        assert_eq!(first.name(), "Anna");
        assert_eq!(first.group(), Some("IT-21"));
        assert_eq!(first.role(), Role::Student);
        assert_ne!(first.id(), second.id());

        Ok(())
    }

    #[test]
    fn cook_profile_is_synthesized() {
        let cook = UserProfile::cook();

        assert_eq!(cook.name(), COOK_NAME);
        assert_eq!(cook.role(), Role::Cook);
        assert!(cook.group().is_none());
    }
}
