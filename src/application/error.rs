use thiserror::Error;

use crate::domain::{Cents, ContractId, JobId, ProfileId, Role};

/// Every failure the core can report to the request layer. Each outcome is
/// distinct and inspectable so the caller can choose its own status codes.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Profile not found: {0}")]
    ProfileNotFound(ProfileId),

    #[error("Contract not found: {0}")]
    ContractNotFound(ContractId),

    #[error("Job not found: {0}")]
    JobNotFound(JobId),

    #[error("Profile {profile_id} has role {role}, operation requires {required}")]
    ForbiddenRole {
        profile_id: ProfileId,
        role: Role,
        required: Role,
    },

    #[error("Job {0} is already paid")]
    AlreadyPaid(JobId),

    #[error("Insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds { balance: Cents, required: Cents },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Client {0} has no outstanding jobs to deposit against")]
    NoOutstandingJobs(ProfileId),

    #[error("Deposit of {requested} cents exceeds cap of {cap} cents (outstanding {outstanding})")]
    DepositExceedsCap {
        requested: Cents,
        cap: Cents,
        outstanding: Cents,
    },

    #[error("No paid jobs in the requested date range")]
    NoData,

    #[error("Ledger store unavailable: {0}")]
    StoreUnavailable(#[from] anyhow::Error),
}
