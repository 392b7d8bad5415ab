use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Cents, Profile, ProfileId};

/// The contractor who earned the most over a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestProfession {
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
    pub contractor: Profile,
    pub total_earned: Cents,
}

/// One entry of the top-paying-clients report, ordered by total paid
/// descending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestClientEntry {
    pub client_id: ProfileId,
    pub full_name: String,
    pub total_paid: Cents,
}
