use serde::{Deserialize, Serialize};

use super::identifier::Identifier;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActingUserError {
    #[error("acting user has no username to qualify table names with")]
    BlankUsername,
    #[error("acting user '{0}' has a blank organization name")]
    BlankOrganization(String),
}

/// Identity under which unqualified table names are resolved.
///
/// The username doubles as the user's database schema. A user without an
/// organization is a standalone tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActingUser {
    pub username: String,
    #[serde(default)]
    pub organization: Option<String>,
}

impl ActingUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            organization: None,
        }
    }

    pub fn in_organization(username: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            organization: Some(organization.into()),
        }
    }

    pub fn validate(&self) -> Result<(), ActingUserError> {
        if self.username.trim().is_empty() {
            return Err(ActingUserError::BlankUsername);
        }
        if matches!(&self.organization, Some(org) if org.trim().is_empty()) {
            return Err(ActingUserError::BlankOrganization(self.username.clone()));
        }
        Ok(())
    }

    /// The user's own schema, quoted when the username requires it.
    pub fn schema(&self) -> Identifier {
        Identifier::from_raw(self.username.clone())
    }
}
