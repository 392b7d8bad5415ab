mod common;

use anyhow::Result;
use common::{
    parse_date, parse_datetime, test_service, StandardMarketplace, CLIENT_1, CLIENT_2,
    CONTRACTOR_5,
};
use gigpay::application::AppError;

#[tokio::test]
async fn test_best_profession_picks_highest_earner() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardMarketplace::create(&service).await?;

    // Contractor 5 earns 60.00 + 20.00, contractor 6 earns 50.00, all in January
    service
        .create_job(1, 1, "job a".into(), 6000, Some(parse_date("2024-01-10")))
        .await?;
    service
        .create_job(2, 1, "job b".into(), 2000, Some(parse_date("2024-01-15")))
        .await?;
    service
        .create_job(3, 2, "job c".into(), 5000, Some(parse_date("2024-01-20")))
        .await?;

    let report = service
        .best_profession(parse_date("2024-01-01"), parse_date("2024-01-31"))
        .await?;

    assert_eq!(report.contractor.id, CONTRACTOR_5);
    assert_eq!(report.contractor.profession, "programmer");
    assert_eq!(report.total_earned, 8000);

    Ok(())
}

#[tokio::test]
async fn test_reports_exclude_unpaid_and_out_of_range_jobs() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardMarketplace::create(&service).await?;

    // In range
    service
        .create_job(1, 1, "in range".into(), 3000, Some(parse_date("2024-01-15")))
        .await?;
    // Paid, but outside the range
    service
        .create_job(2, 1, "too early".into(), 9000, Some(parse_date("2023-12-31")))
        .await?;
    service
        .create_job(3, 1, "too late".into(), 9000, Some(parse_date("2024-02-01")))
        .await?;
    // In range for contract 2's contractor, larger but unpaid
    service
        .create_job(4, 2, "unpaid".into(), 9000, None)
        .await?;

    let report = service
        .best_profession(parse_date("2024-01-01"), parse_datetime("2024-01-31T23:59:59"))
        .await?;

    assert_eq!(report.contractor.id, CONTRACTOR_5);
    assert_eq!(report.total_earned, 3000);

    Ok(())
}

#[tokio::test]
async fn test_report_date_range_is_inclusive_at_both_ends() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardMarketplace::create(&service).await?;

    let start = parse_date("2024-01-10");
    let end = parse_datetime("2024-01-20T23:59:59");

    // Exactly on each boundary
    service
        .create_job(1, 1, "at start".into(), 1000, Some(start))
        .await?;
    service.create_job(2, 1, "at end".into(), 500, Some(end)).await?;
    // One second outside each boundary
    service
        .create_job(
            3,
            1,
            "before start".into(),
            9000,
            Some(parse_datetime("2024-01-09T23:59:59")),
        )
        .await?;
    service
        .create_job(
            4,
            1,
            "after end".into(),
            9000,
            Some(parse_datetime("2024-01-21T00:00:00")),
        )
        .await?;

    let report = service.best_profession(start, end).await?;
    assert_eq!(report.total_earned, 1500);

    Ok(())
}

#[tokio::test]
async fn test_best_profession_breaks_ties_by_lowest_contractor_id() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardMarketplace::create(&service).await?;

    // Both contractors earn exactly 40.00
    service
        .create_job(1, 1, "job a".into(), 4000, Some(parse_date("2024-01-10")))
        .await?;
    service
        .create_job(2, 2, "job b".into(), 4000, Some(parse_date("2024-01-12")))
        .await?;

    let report = service
        .best_profession(parse_date("2024-01-01"), parse_date("2024-01-31"))
        .await?;

    assert_eq!(report.contractor.id, CONTRACTOR_5);
    assert_eq!(report.total_earned, 4000);

    Ok(())
}

#[tokio::test]
async fn test_best_profession_with_no_paid_jobs_is_no_data() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardMarketplace::create(&service).await?;

    service.create_job(1, 1, "unpaid".into(), 4000, None).await?;

    let err = service
        .best_profession(parse_date("2024-01-01"), parse_date("2024-01-31"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NoData), "got {:?}", err);

    Ok(())
}

#[tokio::test]
async fn test_best_clients_orders_by_total_paid() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardMarketplace::create(&service).await?;

    // Client 1 pays 50.00, client 2 pays 90.00
    service
        .create_job(1, 1, "job a".into(), 5000, Some(parse_date("2024-01-10")))
        .await?;
    service
        .create_job(2, 2, "job b".into(), 9000, Some(parse_date("2024-01-15")))
        .await?;

    let entries = service
        .best_clients(parse_date("2024-01-01"), parse_date("2024-01-31"), None)
        .await?;

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].client_id, CLIENT_2);
    assert_eq!(entries[0].full_name, "Mia Wallace");
    assert_eq!(entries[0].total_paid, 9000);
    assert_eq!(entries[1].client_id, CLIENT_1);
    assert_eq!(entries[1].total_paid, 5000);

    Ok(())
}

#[tokio::test]
async fn test_best_clients_respects_limit() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardMarketplace::create(&service).await?;

    service
        .create_job(1, 1, "job a".into(), 5000, Some(parse_date("2024-01-10")))
        .await?;
    service
        .create_job(2, 2, "job b".into(), 9000, Some(parse_date("2024-01-15")))
        .await?;

    let entries = service
        .best_clients(parse_date("2024-01-01"), parse_date("2024-01-31"), Some(1))
        .await?;

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].client_id, CLIENT_2);

    Ok(())
}

#[tokio::test]
async fn test_best_clients_may_return_fewer_than_limit() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardMarketplace::create(&service).await?;

    service
        .create_job(1, 1, "only job".into(), 5000, Some(parse_date("2024-01-10")))
        .await?;

    let entries = service
        .best_clients(parse_date("2024-01-01"), parse_date("2024-01-31"), Some(5))
        .await?;

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].client_id, CLIENT_1);

    Ok(())
}

#[tokio::test]
async fn test_best_clients_with_no_paid_jobs_is_no_data() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardMarketplace::create(&service).await?;

    let err = service
        .best_clients(parse_date("2024-01-01"), parse_date("2024-01-31"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NoData), "got {:?}", err);

    Ok(())
}

#[tokio::test]
async fn test_settled_job_shows_up_in_reports() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardMarketplace::create_with_job(&service, 6000).await?;

    service.pay_job(CLIENT_1, 1).await?;

    // The payment date is "now", so query a range around the current moment
    let now = chrono::Utc::now();
    let report = service
        .best_profession(now - chrono::Duration::hours(1), now + chrono::Duration::hours(1))
        .await?;

    assert_eq!(report.contractor.id, CONTRACTOR_5);
    assert_eq!(report.total_earned, 6000);

    Ok(())
}
