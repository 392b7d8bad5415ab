use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::domain::{
    validate_deposit, Cents, Contract, ContractId, ContractParty, ContractStatus,
    DepositRuleError, Job, JobId, Profile, ProfileId, Role, best_party,
};
use crate::storage::LedgerStore;

use super::reporting::{BestClientEntry, BestProfession};
use super::AppError;

/// Number of clients returned by the best-clients report when the caller
/// does not ask for a specific limit.
const DEFAULT_BEST_CLIENTS_LIMIT: usize = 2;

/// Application service providing the marketplace operations: job settlement,
/// capped deposits, aggregation reports and the contract/job reads. This is
/// the primary interface for any request layer (CLI, API, ...). Caller
/// identity arrives as an already-resolved profile id.
pub struct MarketplaceService {
    store: LedgerStore,
}

/// Result of a successful job settlement: the paid job and both party
/// profiles with their post-transfer balances.
#[derive(Debug)]
pub struct SettlementResult {
    pub job: Job,
    pub client: Profile,
    pub contractor: Profile,
}

impl MarketplaceService {
    /// Create a new service with the given ledger store.
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let store = LedgerStore::init(&db_url).await?;
        Ok(Self::new(store))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let store = LedgerStore::connect(&db_url).await?;
        Ok(Self::new(store))
    }

    // ========================
    // Settlement engine
    // ========================

    /// Pay for a job: mark it paid and move its price from the client's
    /// balance to the contractor's, all-or-nothing.
    ///
    /// The caller must be the client on the job's contract, the job must be
    /// unpaid, and the client balance must cover the price. The three writes
    /// happen inside one store transaction; if any step fails the
    /// transaction is rolled back and no partial effect is observable.
    pub async fn pay_job(
        &self,
        caller_id: ProfileId,
        job_id: JobId,
    ) -> Result<SettlementResult, AppError> {
        let caller = self
            .store
            .get_profile(caller_id)
            .await?
            .ok_or(AppError::ProfileNotFound(caller_id))?;

        if caller.role != Role::Client {
            return Err(AppError::ForbiddenRole {
                profile_id: caller_id,
                role: caller.role,
                required: Role::Client,
            });
        }

        let (mut job, contract) = self
            .store
            .get_job_with_contract(job_id)
            .await?
            .ok_or(AppError::JobNotFound(job_id))?;

        // A job on someone else's contract is reported the same as a
        // missing one.
        if contract.client_id != caller_id {
            return Err(AppError::JobNotFound(job_id));
        }

        if job.is_paid() {
            return Err(AppError::AlreadyPaid(job_id));
        }

        if caller.balance_cents < job.price_cents {
            return Err(AppError::InsufficientFunds {
                balance: caller.balance_cents,
                required: job.price_cents,
            });
        }

        let payment_date = Utc::now();
        let mut tx = self.store.begin().await?;

        // 1. Mark the job paid. Zero rows affected means a concurrent
        //    payment won the race after our read.
        if !self
            .store
            .mark_job_paid(&mut tx, job_id, payment_date)
            .await?
        {
            warn!(job_id, client = caller_id, "settlement lost race, rolling back");
            tx.rollback()
                .await
                .context("Failed to roll back settlement")?;
            return Err(AppError::AlreadyPaid(job_id));
        }

        // 2. Credit the contractor.
        if !self
            .store
            .adjust_balance(&mut tx, contract.contractor_id, job.price_cents)
            .await?
        {
            tx.rollback()
                .await
                .context("Failed to roll back settlement")?;
            return Err(AppError::ProfileNotFound(contract.contractor_id));
        }

        // 3. Debit the client, guarded against going negative.
        if !self
            .store
            .adjust_balance(&mut tx, caller_id, -job.price_cents)
            .await?
        {
            warn!(job_id, client = caller_id, "balance fell short at settlement, rolling back");
            tx.rollback()
                .await
                .context("Failed to roll back settlement")?;
            return Err(AppError::InsufficientFunds {
                balance: caller.balance_cents,
                required: job.price_cents,
            });
        }

        tx.commit().await.context("Failed to commit settlement")?;

        info!(
            job_id,
            client = caller_id,
            contractor = contract.contractor_id,
            amount_cents = job.price_cents,
            "job settled"
        );

        job.mark_paid(payment_date);
        let client = self.require_profile(caller_id).await?;
        let contractor = self.require_profile(contract.contractor_id).await?;

        Ok(SettlementResult {
            job,
            client,
            contractor,
        })
    }

    // ========================
    // Deposit guard
    // ========================

    /// Deposit money into a client's balance, bounded by the deposit cap:
    /// at most 125% of the client's outstanding (unpaid) job total, which is
    /// read fresh from the store at request time.
    ///
    /// Returns the updated target profile.
    pub async fn deposit(
        &self,
        caller_id: ProfileId,
        target_id: ProfileId,
        amount: Cents,
    ) -> Result<Profile, AppError> {
        if amount <= 0 {
            return Err(AppError::InvalidAmount(format!(
                "deposit must be positive, got {} cents",
                amount
            )));
        }

        let target = self
            .store
            .get_profile(target_id)
            .await?
            .ok_or(AppError::ProfileNotFound(target_id))?;

        if target.role != Role::Client {
            return Err(AppError::ForbiddenRole {
                profile_id: target_id,
                role: target.role,
                required: Role::Client,
            });
        }

        let outstanding = self.store.outstanding_for_client(target_id).await?;
        debug!(target = target_id, outstanding, amount, "evaluating deposit cap");

        validate_deposit(amount, outstanding).map_err(|err| match err {
            DepositRuleError::NoOutstandingJobs => AppError::NoOutstandingJobs(target_id),
            DepositRuleError::ExceedsCap {
                requested,
                cap,
                outstanding,
            } => AppError::DepositExceedsCap {
                requested,
                cap,
                outstanding,
            },
        })?;

        self.store.deposit_into(target_id, amount).await?;
        info!(
            caller = caller_id,
            target = target_id,
            amount_cents = amount,
            "deposit accepted"
        );

        self.require_profile(target_id).await
    }

    // ========================
    // Aggregation reports
    // ========================

    /// The contractor who earned the most from jobs paid within the
    /// inclusive date range. Ties resolve to the lowest contractor id.
    pub async fn best_profession(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<BestProfession, AppError> {
        let totals = self
            .store
            .aggregate_paid_jobs(ContractParty::Contractor, start, end)
            .await?;

        let (contractor_id, total_earned) = best_party(&totals).ok_or(AppError::NoData)?;
        let contractor = self.require_profile(contractor_id).await?;

        Ok(BestProfession {
            from_date: start,
            to_date: end,
            contractor,
            total_earned,
        })
    }

    /// The clients who paid the most for jobs within the inclusive date
    /// range, ordered by total paid descending and truncated to `limit`
    /// (default 2). May return fewer entries than the limit.
    pub async fn best_clients(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Result<Vec<BestClientEntry>, AppError> {
        let limit = limit.unwrap_or(DEFAULT_BEST_CLIENTS_LIMIT);

        let totals = self
            .store
            .aggregate_paid_jobs(ContractParty::Client, start, end)
            .await?;
        if totals.is_empty() {
            return Err(AppError::NoData);
        }

        let mut entries = Vec::with_capacity(limit.min(totals.len()));
        for (client_id, total_paid) in totals.into_iter().take(limit) {
            let profile = self.require_profile(client_id).await?;
            entries.push(BestClientEntry {
                client_id,
                full_name: profile.full_name(),
                total_paid,
            });
        }

        Ok(entries)
    }

    // ========================
    // Contract and job reads
    // ========================

    /// Get a profile by id.
    pub async fn get_profile(&self, id: ProfileId) -> Result<Profile, AppError> {
        self.require_profile(id).await
    }

    /// Get a contract by id. Only the contract's client or contractor may
    /// see it; anyone else gets the same answer as for a missing contract.
    pub async fn get_contract(
        &self,
        caller_id: ProfileId,
        contract_id: ContractId,
    ) -> Result<Contract, AppError> {
        self.store
            .get_contract_for_profile(contract_id, caller_id)
            .await?
            .ok_or(AppError::ContractNotFound(contract_id))
    }

    /// List the caller's non-terminated contracts.
    pub async fn list_contracts(&self, caller_id: ProfileId) -> Result<Vec<Contract>, AppError> {
        Ok(self.store.list_contracts_for_profile(caller_id).await?)
    }

    /// List the unpaid jobs of the caller's in-progress contracts, as either
    /// party.
    pub async fn list_unpaid_jobs(&self, caller_id: ProfileId) -> Result<Vec<Job>, AppError> {
        Ok(self.store.list_unpaid_jobs_for_profile(caller_id).await?)
    }

    // ========================
    // Fixture creation (seeding and tests)
    // ========================

    /// Create a new profile with an explicit id.
    pub async fn create_profile(
        &self,
        id: ProfileId,
        first_name: String,
        last_name: String,
        profession: String,
        balance_cents: Cents,
        role: Role,
    ) -> Result<Profile, AppError> {
        let profile = Profile::new(id, first_name, last_name, profession, balance_cents, role);
        self.store.save_profile(&profile).await?;
        Ok(profile)
    }

    /// Create a new contract with an explicit id.
    pub async fn create_contract(
        &self,
        id: ContractId,
        terms: String,
        status: ContractStatus,
        client_id: ProfileId,
        contractor_id: ProfileId,
    ) -> Result<Contract, AppError> {
        let contract = Contract::new(id, terms, status, client_id, contractor_id);
        self.store.save_contract(&contract).await?;
        Ok(contract)
    }

    /// Create a new job with an explicit id. A payment date marks the job
    /// as already settled, which fixtures use to backfill report data.
    pub async fn create_job(
        &self,
        id: JobId,
        contract_id: ContractId,
        description: String,
        price_cents: Cents,
        payment_date: Option<DateTime<Utc>>,
    ) -> Result<Job, AppError> {
        let mut job = Job::new(id, contract_id, description, price_cents);
        if let Some(paid_at) = payment_date {
            job.mark_paid(paid_at);
        }
        self.store.save_job(&job).await?;
        Ok(job)
    }

    async fn require_profile(&self, id: ProfileId) -> Result<Profile, AppError> {
        self.store
            .get_profile(id)
            .await?
            .ok_or(AppError::ProfileNotFound(id))
    }
}
