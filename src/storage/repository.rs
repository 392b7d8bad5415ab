use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::domain::{Cents, Contract, ContractParty, ContractStatus, Job, Profile, ProfileId, Role};

use super::MIGRATION_001_INITIAL;

/// How long a request may wait for a pooled connection before the store is
/// considered unavailable.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// The ledger store: persistent records for profiles, contracts and jobs,
/// plus the transactional primitives the settlement engine builds on.
pub struct LedgerStore {
    pool: SqlitePool,
}

impl LedgerStore {
    /// Create a new store over an existing SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let store = Self::connect(database_url).await?;
        store.migrate().await?;
        Ok(store)
    }

    // ========================
    // Profile operations
    // ========================

    /// Save a new profile to the database.
    pub async fn save_profile(&self, profile: &Profile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, first_name, last_name, profession, balance_cents, role, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(profile.id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.profession)
        .bind(profile.balance_cents)
        .bind(profile.role.as_str())
        .bind(profile.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save profile")?;
        Ok(())
    }

    /// Get a profile by ID.
    pub async fn get_profile(&self, id: ProfileId) -> Result<Option<Profile>> {
        let row = sqlx::query(
            r#"
            SELECT id, first_name, last_name, profession, balance_cents, role, created_at
            FROM profiles
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch profile")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_profile(&row)?)),
            None => Ok(None),
        }
    }

    /// Increase a profile's balance outside of any settlement transaction.
    /// Used by the deposit guard after its cap check has passed.
    pub async fn deposit_into(&self, id: ProfileId, amount: Cents) -> Result<()> {
        sqlx::query("UPDATE profiles SET balance_cents = balance_cents + ? WHERE id = ?")
            .bind(amount)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to apply deposit")?;
        Ok(())
    }

    // ========================
    // Contract operations
    // ========================

    /// Save a new contract to the database.
    pub async fn save_contract(&self, contract: &Contract) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO contracts (id, terms, status, client_id, contractor_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(contract.id)
        .bind(&contract.terms)
        .bind(contract.status.as_str())
        .bind(contract.client_id)
        .bind(contract.contractor_id)
        .bind(contract.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save contract")?;
        Ok(())
    }

    /// Get a contract by ID, but only if the given profile is one of its
    /// parties.
    pub async fn get_contract_for_profile(
        &self,
        contract_id: i64,
        profile_id: ProfileId,
    ) -> Result<Option<Contract>> {
        let row = sqlx::query(
            r#"
            SELECT id, terms, status, client_id, contractor_id, created_at
            FROM contracts
            WHERE id = ? AND (client_id = ? OR contractor_id = ?)
            "#,
        )
        .bind(contract_id)
        .bind(profile_id)
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch contract")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_contract(&row)?)),
            None => Ok(None),
        }
    }

    /// List a profile's non-terminated contracts.
    pub async fn list_contracts_for_profile(&self, profile_id: ProfileId) -> Result<Vec<Contract>> {
        let rows = sqlx::query(
            r#"
            SELECT id, terms, status, client_id, contractor_id, created_at
            FROM contracts
            WHERE (client_id = ? OR contractor_id = ?) AND status != 'terminated'
            ORDER BY id
            "#,
        )
        .bind(profile_id)
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list contracts")?;

        rows.iter().map(Self::row_to_contract).collect()
    }

    // ========================
    // Job operations
    // ========================

    /// Save a new job to the database.
    pub async fn save_job(&self, job: &Job) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO jobs (id, contract_id, description, price_cents, paid, payment_date)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(job.id)
        .bind(job.contract_id)
        .bind(&job.description)
        .bind(job.price_cents)
        .bind(if job.paid { Some(1i64) } else { None })
        .bind(job.payment_date.map(|dt| dt.to_rfc3339()))
        .execute(&self.pool)
        .await
        .context("Failed to save job")?;
        Ok(())
    }

    /// Get a job together with its contract.
    pub async fn get_job_with_contract(&self, job_id: i64) -> Result<Option<(Job, Contract)>> {
        let row = sqlx::query(
            r#"
            SELECT
                j.id, j.contract_id, j.description, j.price_cents, j.paid, j.payment_date,
                c.id AS c_id, c.terms, c.status, c.client_id, c.contractor_id, c.created_at
            FROM jobs j
            JOIN contracts c ON c.id = j.contract_id
            WHERE j.id = ?
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch job")?;

        match row {
            Some(row) => {
                let job = Self::row_to_job(&row)?;
                let contract = Contract {
                    id: row.get("c_id"),
                    terms: row.get("terms"),
                    status: Self::parse_status(&row)?,
                    client_id: row.get("client_id"),
                    contractor_id: row.get("contractor_id"),
                    created_at: Self::parse_timestamp(row.get::<String, _>("created_at"))?,
                };
                Ok(Some((job, contract)))
            }
            None => Ok(None),
        }
    }

    /// List the unpaid jobs of a profile's in-progress contracts
    /// (as client or contractor).
    pub async fn list_unpaid_jobs_for_profile(&self, profile_id: ProfileId) -> Result<Vec<Job>> {
        let rows = sqlx::query(
            r#"
            SELECT j.id, j.contract_id, j.description, j.price_cents, j.paid, j.payment_date
            FROM jobs j
            JOIN contracts c ON c.id = j.contract_id
            WHERE j.paid IS NULL
              AND c.status = 'in_progress'
              AND (c.client_id = ? OR c.contractor_id = ?)
            ORDER BY j.id
            "#,
        )
        .bind(profile_id)
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list unpaid jobs")?;

        rows.iter().map(Self::row_to_job).collect()
    }

    /// Sum the prices of a client's unpaid jobs across all of their
    /// contracts, using SQL aggregation. This is the outstanding total the
    /// deposit cap is evaluated against, read fresh at request time.
    pub async fn outstanding_for_client(&self, client_id: ProfileId) -> Result<Cents> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(j.price_cents), 0) AS total
            FROM jobs j
            JOIN contracts c ON c.id = j.contract_id
            WHERE c.client_id = ? AND j.paid IS NULL
            "#,
        )
        .bind(client_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to compute outstanding total")?;

        Ok(row.get("total"))
    }

    // ========================
    // Settlement primitives
    // ========================

    /// Begin a settlement transaction. Dropping the returned transaction
    /// without committing rolls it back.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .context("Failed to begin transaction")
    }

    /// Mark a job paid inside a transaction. Returns false if the job was
    /// already paid (or does not exist), in which case nothing was written;
    /// the `paid IS NULL` guard is what serializes concurrent payments of
    /// the same job.
    pub async fn mark_job_paid(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        job_id: i64,
        payment_date: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE jobs SET paid = 1, payment_date = ? WHERE id = ? AND paid IS NULL",
        )
        .bind(payment_date.to_rfc3339())
        .bind(job_id)
        .execute(&mut **tx)
        .await
        .context("Failed to mark job paid")?;

        Ok(result.rows_affected() > 0)
    }

    /// Adjust a profile's balance by a (possibly negative) delta inside a
    /// transaction. Returns false if the adjustment would take the balance
    /// below zero, in which case nothing was written.
    pub async fn adjust_balance(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        profile_id: ProfileId,
        delta: Cents,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET balance_cents = balance_cents + ?
            WHERE id = ? AND balance_cents + ? >= 0
            "#,
        )
        .bind(delta)
        .bind(profile_id)
        .bind(delta)
        .execute(&mut **tx)
        .await
        .context("Failed to adjust balance")?;

        Ok(result.rows_affected() > 0)
    }

    // ========================
    // Aggregation
    // ========================

    /// Sum paid jobs by contract party over an inclusive payment-date range.
    /// Returns (party id, total) pairs ordered by total descending, then by
    /// party id ascending, so ties resolve deterministically to the lowest
    /// id.
    pub async fn aggregate_paid_jobs(
        &self,
        party: ContractParty,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<(ProfileId, Cents)>> {
        let party_column = match party {
            ContractParty::Client => "c.client_id",
            ContractParty::Contractor => "c.contractor_id",
        };

        let query = format!(
            r#"
            SELECT {party_column} AS party_id, SUM(j.price_cents) AS total
            FROM jobs j
            JOIN contracts c ON c.id = j.contract_id
            WHERE j.paid = 1 AND j.payment_date >= ? AND j.payment_date <= ?
            GROUP BY party_id
            ORDER BY total DESC, party_id ASC
            "#
        );

        let rows = sqlx::query(&query)
            .bind(start.to_rfc3339())
            .bind(end.to_rfc3339())
            .fetch_all(&self.pool)
            .await
            .context("Failed to aggregate paid jobs")?;

        Ok(rows
            .iter()
            .map(|row| (row.get("party_id"), row.get("total")))
            .collect())
    }

    // ========================
    // Row mappers
    // ========================

    fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> Result<Profile> {
        let role_str: String = row.get("role");

        Ok(Profile {
            id: row.get("id"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            profession: row.get("profession"),
            balance_cents: row.get("balance_cents"),
            role: Role::from_str(&role_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid profile role: {}", role_str))?,
            created_at: Self::parse_timestamp(row.get::<String, _>("created_at"))?,
        })
    }

    fn row_to_contract(row: &sqlx::sqlite::SqliteRow) -> Result<Contract> {
        Ok(Contract {
            id: row.get("id"),
            terms: row.get("terms"),
            status: Self::parse_status(row)?,
            client_id: row.get("client_id"),
            contractor_id: row.get("contractor_id"),
            created_at: Self::parse_timestamp(row.get::<String, _>("created_at"))?,
        })
    }

    fn row_to_job(row: &sqlx::sqlite::SqliteRow) -> Result<Job> {
        let paid: Option<i64> = row.get("paid");
        let payment_date_str: Option<String> = row.get("payment_date");

        Ok(Job {
            id: row.get("id"),
            contract_id: row.get("contract_id"),
            description: row.get("description"),
            price_cents: row.get("price_cents"),
            paid: paid.is_some(),
            payment_date: payment_date_str
                .as_deref()
                .map(Self::parse_timestamp)
                .transpose()?,
        })
    }

    fn parse_status(row: &sqlx::sqlite::SqliteRow) -> Result<ContractStatus> {
        let status_str: String = row.get("status");
        ContractStatus::from_str(&status_str)
            .ok_or_else(|| anyhow::anyhow!("Invalid contract status: {}", status_str))
    }

    fn parse_timestamp(value: impl AsRef<str>) -> Result<DateTime<Utc>> {
        Ok(DateTime::parse_from_rfc3339(value.as_ref())
            .context("Invalid timestamp")?
            .with_timezone(&Utc))
    }
}
