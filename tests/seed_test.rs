mod common;

use anyhow::Result;
use common::test_service;
use gigpay::io::Seeder;

const PROFILES_CSV: &str = "\
id,first_name,last_name,profession,balance,role
1,Harry,Potter,wizard,100.00,client
5,Linus,Torvalds,programmer,64.00,contractor
";

const CONTRACTS_CSV: &str = "\
id,terms,status,client_id,contractor_id
1,build things,in_progress,1,5
";

const JOBS_CSV: &str = "\
id,contract_id,description,price,payment_date
1,1,first job,50.00,
2,1,settled job,20.00,2024-01-15T00:00:00+00:00
";

#[tokio::test]
async fn test_seed_loads_a_full_marketplace() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let seeder = Seeder::new(&service);

    let profiles = seeder.seed_profiles(PROFILES_CSV.as_bytes()).await?;
    assert_eq!(profiles.imported, 2);
    assert!(profiles.errors.is_empty());

    let contracts = seeder.seed_contracts(CONTRACTS_CSV.as_bytes()).await?;
    assert_eq!(contracts.imported, 1);

    let jobs = seeder.seed_jobs(JOBS_CSV.as_bytes()).await?;
    assert_eq!(jobs.imported, 2);

    // The seeded data behaves like any other marketplace state
    let profile = service.get_profile(1).await?;
    assert_eq!(profile.balance_cents, 10000);

    let unpaid = service.list_unpaid_jobs(1).await?;
    assert_eq!(unpaid.len(), 1);
    assert_eq!(unpaid[0].id, 1);

    service.pay_job(1, 1).await?;
    assert_eq!(service.get_profile(1).await?.balance_cents, 5000);
    assert_eq!(service.get_profile(5).await?.balance_cents, 6400 + 5000);

    Ok(())
}

#[tokio::test]
async fn test_seed_collects_bad_lines_without_aborting() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let seeder = Seeder::new(&service);

    let csv = "\
id,first_name,last_name,profession,balance,role
1,Harry,Potter,wizard,100.00,client
2,Bad,Row,nothing,not-a-number,client
3,Worse,Row,nothing,10.00,wizard
4,Mia,Wallace,dancer,500.00,client
";

    let result = seeder.seed_profiles(csv.as_bytes()).await?;
    assert_eq!(result.imported, 2);
    assert_eq!(result.errors.len(), 2);
    assert_eq!(result.errors[0].line, 3);
    assert_eq!(result.errors[0].field.as_deref(), Some("balance"));
    assert_eq!(result.errors[1].line, 4);
    assert_eq!(result.errors[1].field.as_deref(), Some("role"));

    Ok(())
}

#[tokio::test]
async fn test_seed_rejects_nonpositive_job_price() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let seeder = Seeder::new(&service);

    seeder.seed_profiles(PROFILES_CSV.as_bytes()).await?;
    seeder.seed_contracts(CONTRACTS_CSV.as_bytes()).await?;

    let csv = "\
id,contract_id,description,price,payment_date
1,1,free work,0.00,
";

    let result = seeder.seed_jobs(csv.as_bytes()).await?;
    assert_eq!(result.imported, 0);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field.as_deref(), Some("price"));

    Ok(())
}
