//! User domain entity
//!
//! Users are provisioned by the identity service; this workflow only reads
//! them for party resolution and embedded summaries.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Marketplace role carried in bearer tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    /// Rents properties
    Renter,
    /// Lists and rents out properties
    Owner,
    /// Customer-support agent arbitrating disputed checkouts
    Agent,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Renter => "renter",
            Self::Owner => "owner",
            Self::Agent => "agent",
            Self::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "renter" => Some(Self::Renter),
            "owner" => Some(Self::Owner),
            "agent" => Some(Self::Agent),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Agents and admins may arbitrate disputed checkouts
    pub fn can_arbitrate(&self) -> bool {
        matches!(self, Self::Agent | Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Marketplace user
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(display_name: impl Into<String>, email: impl Into<String>, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
            email: email.into(),
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_roundtrip() {
        for role in &[UserRole::Renter, UserRole::Owner, UserRole::Agent, UserRole::Admin] {
            let parsed = UserRole::from_str(role.as_str()).unwrap();
            assert_eq!(&parsed, role);
        }
        assert!(UserRole::from_str("superuser").is_none());
    }

    #[test]
    fn only_agents_and_admins_arbitrate() {
        assert!(UserRole::Agent.can_arbitrate());
        assert!(UserRole::Admin.can_arbitrate());
        assert!(!UserRole::Renter.can_arbitrate());
        assert!(!UserRole::Owner.can_arbitrate());
    }
}
