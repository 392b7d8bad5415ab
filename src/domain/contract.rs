use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ProfileId;

pub type ContractId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    New,
    InProgress,
    Terminated,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::New => "new",
            ContractStatus::InProgress => "in_progress",
            ContractStatus::Terminated => "terminated",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "new" => Some(ContractStatus::New),
            "in_progress" => Some(ContractStatus::InProgress),
            "terminated" => Some(ContractStatus::Terminated),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which side of a contract an aggregation groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractParty {
    Client,
    Contractor,
}

/// An agreement between exactly one client and one contractor. Contracts are
/// read-only for the settlement core; only their jobs and the party balances
/// change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub terms: String,
    pub status: ContractStatus,
    pub client_id: ProfileId,
    pub contractor_id: ProfileId,
    pub created_at: DateTime<Utc>,
}

impl Contract {
    pub fn new(
        id: ContractId,
        terms: impl Into<String>,
        status: ContractStatus,
        client_id: ProfileId,
        contractor_id: ProfileId,
    ) -> Self {
        Self {
            id,
            terms: terms.into(),
            status,
            client_id,
            contractor_id,
            created_at: Utc::now(),
        }
    }

    /// Whether the given profile is one of the two contract parties.
    pub fn involves(&self, profile_id: ProfileId) -> bool {
        self.client_id == profile_id || self.contractor_id == profile_id
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == ContractStatus::InProgress
    }

    pub fn is_terminated(&self) -> bool {
        self.status == ContractStatus::Terminated
    }
}
