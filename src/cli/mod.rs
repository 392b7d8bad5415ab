use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use crate::application::MarketplaceService;
use crate::domain::{format_cents, parse_cents};
use crate::io::{SeedResult, Seeder};

/// gigpay - freelance marketplace settlement backend
#[derive(Parser)]
#[command(name = "gigpay")]
#[command(about = "Settle jobs, guard deposits and report on a freelance-marketplace ledger")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "gigpay.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Load fixture CSV files (profiles, contracts, jobs)
    Seed {
        /// Profiles CSV (id,first_name,last_name,profession,balance,role)
        #[arg(long)]
        profiles: Option<String>,

        /// Contracts CSV (id,terms,status,client_id,contractor_id)
        #[arg(long)]
        contracts: Option<String>,

        /// Jobs CSV (id,contract_id,description,price,payment_date)
        #[arg(long)]
        jobs: Option<String>,
    },

    /// Show a profile and its balance
    Profile {
        /// Profile ID
        id: i64,
    },

    /// List the acting profile's non-terminated contracts
    Contracts {
        /// Acting profile ID
        #[arg(long = "as")]
        profile: i64,
    },

    /// Show one contract (visible to its parties only)
    Contract {
        /// Contract ID
        id: i64,

        /// Acting profile ID
        #[arg(long = "as")]
        profile: i64,
    },

    /// List unpaid jobs on the acting profile's in-progress contracts
    UnpaidJobs {
        /// Acting profile ID
        #[arg(long = "as")]
        profile: i64,
    },

    /// Pay for a job: marks it paid and transfers the price to the contractor
    Pay {
        /// Job ID
        job_id: i64,

        /// Acting client profile ID
        #[arg(long = "as")]
        profile: i64,
    },

    /// Deposit into a client's balance (capped at 125% of outstanding jobs)
    Deposit {
        /// Amount to deposit (e.g., "50.00" or "50")
        amount: String,

        /// Acting profile ID
        #[arg(long = "as")]
        profile: i64,

        /// Target client profile ID
        #[arg(long)]
        to: i64,
    },

    /// Aggregation reports over paid jobs
    #[command(subcommand)]
    Report(ReportCommands),
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// The contractor who earned the most in a date range
    BestProfession {
        /// Start date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// End date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: String,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// The clients who paid the most in a date range
    BestClients {
        /// Start date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// End date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: String,

        /// Maximum number of clients to return
        #[arg(long, default_value = "2")]
        limit: usize,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                MarketplaceService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Seed {
                profiles,
                contracts,
                jobs,
            } => {
                let service = MarketplaceService::connect(&self.database).await?;
                run_seed_command(&service, profiles, contracts, jobs).await?;
            }

            Commands::Profile { id } => {
                let service = MarketplaceService::connect(&self.database).await?;
                let profile = service.get_profile(id).await?;

                println!("Profile: {} (#{})", profile.full_name(), profile.id);
                println!("  Role:       {}", profile.role);
                println!("  Profession: {}", profile.profession);
                println!("  Balance:    {}", format_cents(profile.balance_cents));
            }

            Commands::Contracts { profile } => {
                let service = MarketplaceService::connect(&self.database).await?;
                let contracts = service.list_contracts(profile).await?;

                if contracts.is_empty() {
                    println!("No contracts found.");
                } else {
                    println!(
                        "{:<6} {:<12} {:<8} {:<10} TERMS",
                        "ID", "STATUS", "CLIENT", "CONTRACTOR"
                    );
                    println!("{}", "-".repeat(60));
                    for contract in contracts {
                        println!(
                            "{:<6} {:<12} {:<8} {:<10} {}",
                            contract.id,
                            contract.status,
                            contract.client_id,
                            contract.contractor_id,
                            truncate(&contract.terms, 30)
                        );
                    }
                }
            }

            Commands::Contract { id, profile } => {
                let service = MarketplaceService::connect(&self.database).await?;
                let contract = service.get_contract(profile, id).await?;

                println!("Contract: {}", contract.id);
                println!("  Status:     {}", contract.status);
                println!("  Client:     {}", contract.client_id);
                println!("  Contractor: {}", contract.contractor_id);
                println!("  Terms:      {}", contract.terms);
                println!(
                    "  Created:    {}",
                    contract.created_at.format("%Y-%m-%d %H:%M:%S")
                );
            }

            Commands::UnpaidJobs { profile } => {
                let service = MarketplaceService::connect(&self.database).await?;
                let jobs = service.list_unpaid_jobs(profile).await?;

                if jobs.is_empty() {
                    println!("No unpaid jobs.");
                } else {
                    println!("{:<6} {:<10} {:>10} DESCRIPTION", "ID", "CONTRACT", "PRICE");
                    println!("{}", "-".repeat(60));
                    for job in &jobs {
                        println!(
                            "{:<6} {:<10} {:>10} {}",
                            job.id,
                            job.contract_id,
                            format_cents(job.price_cents),
                            truncate(&job.description, 30)
                        );
                    }
                    let total: i64 = jobs.iter().map(|j| j.price_cents).sum();
                    println!("{}", "-".repeat(60));
                    println!("{:<17} {:>10}", "TOTAL", format_cents(total));
                }
            }

            Commands::Pay { job_id, profile } => {
                let service = MarketplaceService::connect(&self.database).await?;
                let result = service.pay_job(profile, job_id).await?;

                println!(
                    "Paid job {}: {} -> {}",
                    result.job.id,
                    result.client.full_name(),
                    result.contractor.full_name()
                );
                println!("  Amount:             {}", format_cents(result.job.price_cents));
                println!(
                    "  Client balance:     {}",
                    format_cents(result.client.balance_cents)
                );
                println!(
                    "  Contractor balance: {}",
                    format_cents(result.contractor.balance_cents)
                );
            }

            Commands::Deposit {
                amount,
                profile,
                to,
            } => {
                let service = MarketplaceService::connect(&self.database).await?;
                let amount_cents =
                    parse_cents(&amount).context("Invalid amount format. Use '50.00' or '50'")?;

                let target = service.deposit(profile, to, amount_cents).await?;

                println!(
                    "Deposited {} into {} (#{})",
                    format_cents(amount_cents),
                    target.full_name(),
                    target.id
                );
                println!("  New balance: {}", format_cents(target.balance_cents));
            }

            Commands::Report(report_cmd) => {
                let service = MarketplaceService::connect(&self.database).await?;
                run_report_command(&service, report_cmd).await?;
            }
        }

        Ok(())
    }
}

async fn run_seed_command(
    service: &MarketplaceService,
    profiles: Option<String>,
    contracts: Option<String>,
    jobs: Option<String>,
) -> Result<()> {
    use std::fs::File;

    let seeder = Seeder::new(service);

    if let Some(path) = profiles {
        let file =
            File::open(&path).with_context(|| format!("Failed to open profiles file: {}", path))?;
        let result = seeder.seed_profiles(file).await?;
        print_seed_result("profiles", &result);
    }

    if let Some(path) = contracts {
        let file = File::open(&path)
            .with_context(|| format!("Failed to open contracts file: {}", path))?;
        let result = seeder.seed_contracts(file).await?;
        print_seed_result("contracts", &result);
    }

    if let Some(path) = jobs {
        let file =
            File::open(&path).with_context(|| format!("Failed to open jobs file: {}", path))?;
        let result = seeder.seed_jobs(file).await?;
        print_seed_result("jobs", &result);
    }

    Ok(())
}

fn print_seed_result(kind: &str, result: &SeedResult) {
    println!("Seeded {} {}", result.imported, kind);
    if !result.errors.is_empty() {
        println!("  {} line(s) rejected:", result.errors.len());
        for error in result.errors.iter().take(10) {
            match &error.field {
                Some(field) => println!("  Line {}: {}: {}", error.line, field, error.error),
                None => println!("  Line {}: {}", error.line, error.error),
            }
        }
        if result.errors.len() > 10 {
            println!("  ... and {} more errors", result.errors.len() - 10);
        }
    }
}

async fn run_report_command(service: &MarketplaceService, cmd: ReportCommands) -> Result<()> {
    match cmd {
        ReportCommands::BestProfession { from, to, format } => {
            let (start, end) = parse_date_range(&from, &to)?;
            let report = service.best_profession(start, end).await?;

            match format.as_str() {
                "json" => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                _ => {
                    println!("Best Profession Report");
                    println!(
                        "Period: {} to {}",
                        start.format("%Y-%m-%d"),
                        end.format("%Y-%m-%d")
                    );
                    println!();
                    println!("Profession: {}", report.contractor.profession);
                    println!(
                        "Contractor: {} (#{})",
                        report.contractor.full_name(),
                        report.contractor.id
                    );
                    println!("Earned:     {}", format_cents(report.total_earned));
                }
            }
        }

        ReportCommands::BestClients {
            from,
            to,
            limit,
            format,
        } => {
            let (start, end) = parse_date_range(&from, &to)?;
            let entries = service.best_clients(start, end, Some(limit)).await?;

            match format.as_str() {
                "json" => {
                    println!("{}", serde_json::to_string_pretty(&entries)?);
                }
                _ => {
                    println!("Best Clients Report");
                    println!(
                        "Period: {} to {}",
                        start.format("%Y-%m-%d"),
                        end.format("%Y-%m-%d")
                    );
                    println!();
                    println!("{:<6} {:<25} {:>12}", "ID", "CLIENT", "PAID");
                    println!("{}", "-".repeat(45));
                    for entry in &entries {
                        println!(
                            "{:<6} {:<25} {:>12}",
                            entry.client_id,
                            truncate(&entry.full_name, 25),
                            format_cents(entry.total_paid)
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

/// Parse an inclusive YYYY-MM-DD date range: the start is taken at midnight
/// and the end at the last second of its day, so both days are included.
fn parse_date_range(from: &str, to: &str) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start = parse_day(from)?
        .and_hms_opt(0, 0, 0)
        .context("Invalid start date")?
        .and_utc();
    let end = parse_day(to)?
        .and_hms_opt(23, 59, 59)
        .context("Invalid end date")?
        .and_utc();
    Ok((start, end))
}

fn parse_day(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").context("Date must be in YYYY-MM-DD format")
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
