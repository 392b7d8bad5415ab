use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Cents, ContractId};

pub type JobId = i64;

/// A unit of work under a contract. The price never changes after creation,
/// and a job moves from unpaid to paid exactly once: `paid` is true iff
/// `payment_date` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub contract_id: ContractId,
    pub description: String,
    pub price_cents: Cents,
    pub paid: bool,
    pub payment_date: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(
        id: JobId,
        contract_id: ContractId,
        description: impl Into<String>,
        price_cents: Cents,
    ) -> Self {
        assert!(price_cents > 0, "Job price must be positive");
        Self {
            id,
            contract_id,
            description: description.into(),
            price_cents,
            paid: false,
            payment_date: None,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.paid
    }

    /// Mark this job as settled. Panics if already paid; the storage layer
    /// guards the same transition with a conditional update.
    pub fn mark_paid(&mut self, payment_date: DateTime<Utc>) {
        assert!(!self.paid, "Job is already paid");
        self.paid = true;
        self.payment_date = Some(payment_date);
    }
}
