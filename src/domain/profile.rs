use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Cents;

pub type ProfileId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Initiates contracts and pays for jobs
    Client,
    /// Fulfills jobs and receives payment
    Contractor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Contractor => "contractor",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "client" => Some(Role::Client),
            "contractor" => Some(Role::Contractor),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A marketplace participant. The balance is only ever mutated by a job
/// settlement (transfer) or a capped deposit; profiles are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub first_name: String,
    pub last_name: String,
    pub profession: String,
    pub balance_cents: Cents,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(
        id: ProfileId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        profession: impl Into<String>,
        balance_cents: Cents,
        role: Role,
    ) -> Self {
        assert!(balance_cents >= 0, "Profile balance must not be negative");
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            profession: profession.into(),
            balance_cents,
            role,
            created_at: Utc::now(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_client(&self) -> bool {
        self.role == Role::Client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::Client, Role::Contractor] {
            assert_eq!(Role::from_str(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_str("admin"), None);
    }

    #[test]
    fn test_full_name() {
        let profile = Profile::new(1, "Ada", "Lovelace", "programmer", 10000, Role::Contractor);
        assert_eq!(profile.full_name(), "Ada Lovelace");
        assert!(!profile.is_client());
    }

    #[test]
    #[should_panic(expected = "Profile balance must not be negative")]
    fn test_profile_requires_non_negative_balance() {
        Profile::new(1, "A", "B", "c", -1, Role::Client);
    }
}
