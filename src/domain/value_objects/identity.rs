//! # Identity and Ownership
//!
//! The caller identity as consumed from the upstream auth gateway, and the
//! single owner every quote and booking belongs to.

use super::ids::{GuestId, OrganizationId, SubjectId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque caller identity.
///
/// An absent subject means the caller is a guest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Authenticated subject, if any.
    pub subject: Option<SubjectId>,
    /// Active organization, if any.
    pub organization: Option<OrganizationId>,
}

impl Identity {
    /// Guest identity.
    #[must_use]
    pub fn guest() -> Self {
        Self::default()
    }

    /// Authenticated user without organization.
    #[must_use]
    pub fn user(subject: impl Into<SubjectId>) -> Self {
        Self {
            subject: Some(subject.into()),
            organization: None,
        }
    }

    /// Sets the active organization.
    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<OrganizationId>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Returns true if no subject is present.
    #[inline]
    #[must_use]
    pub fn is_guest(&self) -> bool {
        self.subject.is_none()
    }

    /// Actor name written to audit entries.
    #[must_use]
    pub fn actor_label(&self) -> String {
        self.subject
            .as_ref()
            .map_or_else(|| "public".to_string(), ToString::to_string)
    }
}

/// Owner of a quote or booking: exactly one of guest, user or organization.
///
/// # Examples
///
/// ```
/// use freight_quote::domain::value_objects::{Identity, Owner};
///
/// let identity = Identity::user("user_1").with_organization("org_1");
/// let owner = Owner::for_identity(&identity);
/// assert_eq!(owner.to_string(), "org:org_1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Owner {
    /// Anonymous guest.
    Guest(GuestId),
    /// Authenticated user acting personally.
    User(SubjectId),
    /// Organization.
    Organization(OrganizationId),
}

impl Owner {
    /// Resolves the owner for a new record: organization, then user, then a
    /// freshly generated guest id.
    #[must_use]
    pub fn for_identity(identity: &Identity) -> Self {
        if let Some(org) = &identity.organization {
            return Self::Organization(org.clone());
        }
        match &identity.subject {
            Some(subject) => Self::User(subject.clone()),
            None => Self::Guest(GuestId::generate()),
        }
    }

    /// Returns the organization if this is an organization owner.
    #[must_use]
    pub fn organization(&self) -> Option<&OrganizationId> {
        match self {
            Self::Organization(org) => Some(org),
            _ => None,
        }
    }

    /// Returns the subject if this is a user owner.
    #[must_use]
    pub fn subject(&self) -> Option<&SubjectId> {
        match self {
            Self::User(subject) => Some(subject),
            _ => None,
        }
    }

    /// Returns true if `identity` acts as this owner.
    #[must_use]
    pub fn is_held_by(&self, identity: &Identity) -> bool {
        match self {
            Self::Organization(org) => identity.organization.as_ref() == Some(org),
            Self::User(subject) => identity.subject.as_ref() == Some(subject),
            Self::Guest(_) => false,
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guest(id) => write!(f, "guest:{id}"),
            Self::User(id) => write!(f, "user:{id}"),
            Self::Organization(id) => write!(f, "org:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn organization_takes_precedence() {
        let identity = Identity::user("u1").with_organization("o1");
        assert_eq!(
            Owner::for_identity(&identity),
            Owner::Organization(OrganizationId::new("o1"))
        );
    }

    #[test]
    fn user_without_org() {
        let owner = Owner::for_identity(&Identity::user("u1"));
        assert_eq!(owner.subject().map(SubjectId::as_str), Some("u1"));
    }

    #[test]
    fn guest_gets_generated_id() {
        match Owner::for_identity(&Identity::guest()) {
            Owner::Guest(id) => assert!(id.as_str().starts_with("guest-")),
            other => unreachable!("unexpected owner {other}"),
        }
    }

    #[test]
    fn holder_check() {
        let owner = Owner::User(SubjectId::new("u1"));
        assert!(owner.is_held_by(&Identity::user("u1")));
        assert!(!owner.is_held_by(&Identity::user("u2")));
        assert!(!owner.is_held_by(&Identity::guest()));
    }

    #[test]
    fn actor_label() {
        assert_eq!(Identity::guest().actor_label(), "public");
        assert_eq!(Identity::user("u9").actor_label(), "u9");
    }
}
