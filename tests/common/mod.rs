// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use gigpay::application::MarketplaceService;
use gigpay::domain::{ContractStatus, Role};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(MarketplaceService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = MarketplaceService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into DateTime<Utc> at midnight
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

/// Helper to parse a full timestamp, e.g. "2024-01-31T23:59:59"
pub fn parse_datetime(datetime_str: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(datetime_str, "%Y-%m-%dT%H:%M:%S")
        .unwrap()
        .and_utc()
}

/// Test fixture: a small marketplace with two clients, two contractors and
/// three contracts. Jobs are created per test.
///
///   Profile 1: client   Harry Potter     balance 100.00
///   Profile 2: client   Mia Wallace      balance 500.00
///   Profile 5: contractor Linus Torvalds (programmer)    balance 64.00
///   Profile 6: contractor Alan Turing    (mathematician) balance 22.00
///
///   Contract 1: in_progress  client 1 / contractor 5
///   Contract 2: in_progress  client 2 / contractor 6
///   Contract 3: terminated   client 1 / contractor 6
pub struct StandardMarketplace;

pub const CLIENT_1: i64 = 1;
pub const CLIENT_2: i64 = 2;
pub const CONTRACTOR_5: i64 = 5;
pub const CONTRACTOR_6: i64 = 6;

impl StandardMarketplace {
    pub async fn create(service: &MarketplaceService) -> Result<()> {
        service
            .create_profile(
                CLIENT_1,
                "Harry".into(),
                "Potter".into(),
                "wizard".into(),
                10000,
                Role::Client,
            )
            .await?;
        service
            .create_profile(
                CLIENT_2,
                "Mia".into(),
                "Wallace".into(),
                "dancer".into(),
                50000,
                Role::Client,
            )
            .await?;
        service
            .create_profile(
                CONTRACTOR_5,
                "Linus".into(),
                "Torvalds".into(),
                "programmer".into(),
                6400,
                Role::Contractor,
            )
            .await?;
        service
            .create_profile(
                CONTRACTOR_6,
                "Alan".into(),
                "Turing".into(),
                "mathematician".into(),
                2200,
                Role::Contractor,
            )
            .await?;

        service
            .create_contract(
                1,
                "build things".into(),
                ContractStatus::InProgress,
                CLIENT_1,
                CONTRACTOR_5,
            )
            .await?;
        service
            .create_contract(
                2,
                "compute things".into(),
                ContractStatus::InProgress,
                CLIENT_2,
                CONTRACTOR_6,
            )
            .await?;
        service
            .create_contract(
                3,
                "old engagement".into(),
                ContractStatus::Terminated,
                CLIENT_1,
                CONTRACTOR_6,
            )
            .await?;

        Ok(())
    }

    /// Fixture plus one unpaid job of the given price on contract 1
    /// (client 1 / contractor 5).
    pub async fn create_with_job(service: &MarketplaceService, price_cents: i64) -> Result<()> {
        Self::create(service).await?;
        service
            .create_job(1, 1, "a job".into(), price_cents, None)
            .await?;
        Ok(())
    }
}
