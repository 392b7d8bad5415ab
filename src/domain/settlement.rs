use super::{Cents, Job};

/// A client may deposit at most 125% of the total price of their currently
/// outstanding (unpaid) jobs in a single deposit.
pub const DEPOSIT_CAP_PERCENT: i64 = 125;

/// Compute the deposit cap for a given outstanding-jobs total.
/// Integer cents, rounded down.
pub fn deposit_cap(outstanding: Cents) -> Cents {
    outstanding * DEPOSIT_CAP_PERCENT / 100
}

/// Validate a deposit amount against the outstanding total at request time.
pub fn validate_deposit(amount: Cents, outstanding: Cents) -> Result<(), DepositRuleError> {
    if outstanding <= 0 {
        return Err(DepositRuleError::NoOutstandingJobs);
    }
    let cap = deposit_cap(outstanding);
    if amount > cap {
        return Err(DepositRuleError::ExceedsCap {
            requested: amount,
            cap,
            outstanding,
        });
    }
    Ok(())
}

/// Sum the prices of the unpaid jobs in a list.
pub fn outstanding_total(jobs: &[Job]) -> Cents {
    jobs.iter()
        .filter(|j| !j.is_paid())
        .map(|j| j.price_cents)
        .sum()
}

/// Pick the winning party from per-party totals: highest total, ties broken
/// by the lowest party id so the result is deterministic regardless of input
/// order.
pub fn best_party(totals: &[(i64, Cents)]) -> Option<(i64, Cents)> {
    totals
        .iter()
        .copied()
        .max_by(|(id_a, total_a), (id_b, total_b)| {
            total_a.cmp(total_b).then(id_b.cmp(id_a))
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepositRuleError {
    NoOutstandingJobs,
    ExceedsCap {
        requested: Cents,
        cap: Cents,
        outstanding: Cents,
    },
}

impl std::fmt::Display for DepositRuleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DepositRuleError::NoOutstandingJobs => {
                write!(f, "no outstanding jobs to deposit against")
            }
            DepositRuleError::ExceedsCap {
                requested,
                cap,
                outstanding,
            } => write!(
                f,
                "deposit of {} cents exceeds cap of {} cents ({}% of {} outstanding)",
                requested, cap, DEPOSIT_CAP_PERCENT, outstanding
            ),
        }
    }
}

impl std::error::Error for DepositRuleError {}
