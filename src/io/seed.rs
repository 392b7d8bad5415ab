use anyhow::Result;
use chrono::{DateTime, Utc};
use std::io::Read;

use crate::application::MarketplaceService;
use crate::domain::{parse_cents, ContractStatus, Role};

/// Result of loading one fixture file.
#[derive(Debug, Clone, Default)]
pub struct SeedResult {
    pub imported: usize,
    pub errors: Vec<SeedError>,
}

/// Error for a single rejected CSV line. Bad lines are collected instead of
/// aborting the whole load.
#[derive(Debug, Clone)]
pub struct SeedError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Loads marketplace fixtures (profiles, contracts, jobs) from CSV files.
///
/// Expected columns:
///   profiles:  id,first_name,last_name,profession,balance,role
///   contracts: id,terms,status,client_id,contractor_id
///   jobs:      id,contract_id,description,price,payment_date
/// Amounts are decimal strings ("12.50"); payment_date is an optional
/// RFC 3339 timestamp that marks the job as already paid.
pub struct Seeder<'a> {
    service: &'a MarketplaceService,
}

impl<'a> Seeder<'a> {
    pub fn new(service: &'a MarketplaceService) -> Self {
        Self { service }
    }

    /// Load profiles from CSV.
    pub async fn seed_profiles<R: Read>(&self, reader: R) -> Result<SeedResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut result = SeedResult::default();

        for (line_num, record) in csv_reader.records().enumerate() {
            let line = line_num + 2; // header + 0-indexing

            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    result.errors.push(csv_error(line, e));
                    continue;
                }
            };

            let id = match parse_field::<i64>(&record, 0, "id", line) {
                Ok(v) => v,
                Err(e) => {
                    result.errors.push(e);
                    continue;
                }
            };
            let first_name = record.get(1).unwrap_or("").to_string();
            let last_name = record.get(2).unwrap_or("").to_string();
            let profession = record.get(3).unwrap_or("").to_string();

            let balance_cents = match parse_cents(record.get(4).unwrap_or("")) {
                Ok(v) => v,
                Err(e) => {
                    result.errors.push(SeedError {
                        line,
                        field: Some("balance".to_string()),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let role = match Role::from_str(record.get(5).unwrap_or("")) {
                Some(r) => r,
                None => {
                    result.errors.push(SeedError {
                        line,
                        field: Some("role".to_string()),
                        error: "expected 'client' or 'contractor'".to_string(),
                    });
                    continue;
                }
            };

            match self
                .service
                .create_profile(id, first_name, last_name, profession, balance_cents, role)
                .await
            {
                Ok(_) => result.imported += 1,
                Err(e) => result.errors.push(SeedError {
                    line,
                    field: None,
                    error: e.to_string(),
                }),
            }
        }

        Ok(result)
    }

    /// Load contracts from CSV.
    pub async fn seed_contracts<R: Read>(&self, reader: R) -> Result<SeedResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut result = SeedResult::default();

        for (line_num, record) in csv_reader.records().enumerate() {
            let line = line_num + 2;

            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    result.errors.push(csv_error(line, e));
                    continue;
                }
            };

            let id = match parse_field::<i64>(&record, 0, "id", line) {
                Ok(v) => v,
                Err(e) => {
                    result.errors.push(e);
                    continue;
                }
            };
            let terms = record.get(1).unwrap_or("").to_string();

            let status = match ContractStatus::from_str(record.get(2).unwrap_or("")) {
                Some(s) => s,
                None => {
                    result.errors.push(SeedError {
                        line,
                        field: Some("status".to_string()),
                        error: "expected 'new', 'in_progress' or 'terminated'".to_string(),
                    });
                    continue;
                }
            };

            let client_id = match parse_field::<i64>(&record, 3, "client_id", line) {
                Ok(v) => v,
                Err(e) => {
                    result.errors.push(e);
                    continue;
                }
            };
            let contractor_id = match parse_field::<i64>(&record, 4, "contractor_id", line) {
                Ok(v) => v,
                Err(e) => {
                    result.errors.push(e);
                    continue;
                }
            };

            match self
                .service
                .create_contract(id, terms, status, client_id, contractor_id)
                .await
            {
                Ok(_) => result.imported += 1,
                Err(e) => result.errors.push(SeedError {
                    line,
                    field: None,
                    error: e.to_string(),
                }),
            }
        }

        Ok(result)
    }

    /// Load jobs from CSV.
    pub async fn seed_jobs<R: Read>(&self, reader: R) -> Result<SeedResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut result = SeedResult::default();

        for (line_num, record) in csv_reader.records().enumerate() {
            let line = line_num + 2;

            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    result.errors.push(csv_error(line, e));
                    continue;
                }
            };

            let id = match parse_field::<i64>(&record, 0, "id", line) {
                Ok(v) => v,
                Err(e) => {
                    result.errors.push(e);
                    continue;
                }
            };
            let contract_id = match parse_field::<i64>(&record, 1, "contract_id", line) {
                Ok(v) => v,
                Err(e) => {
                    result.errors.push(e);
                    continue;
                }
            };
            let description = record.get(2).unwrap_or("").to_string();

            let price_cents = match parse_cents(record.get(3).unwrap_or("")) {
                Ok(v) if v > 0 => v,
                Ok(_) => {
                    result.errors.push(SeedError {
                        line,
                        field: Some("price".to_string()),
                        error: "job price must be positive".to_string(),
                    });
                    continue;
                }
                Err(e) => {
                    result.errors.push(SeedError {
                        line,
                        field: Some("price".to_string()),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let payment_date = match record.get(4).filter(|s| !s.is_empty()) {
                Some(raw) => match parse_payment_date(raw) {
                    Ok(ts) => Some(ts),
                    Err(e) => {
                        result.errors.push(SeedError {
                            line,
                            field: Some("payment_date".to_string()),
                            error: e.to_string(),
                        });
                        continue;
                    }
                },
                None => None,
            };

            match self
                .service
                .create_job(id, contract_id, description, price_cents, payment_date)
                .await
            {
                Ok(_) => result.imported += 1,
                Err(e) => result.errors.push(SeedError {
                    line,
                    field: None,
                    error: e.to_string(),
                }),
            }
        }

        Ok(result)
    }
}

fn csv_error(line: usize, err: csv::Error) -> SeedError {
    SeedError {
        line,
        field: None,
        error: format!("CSV parse error: {}", err),
    }
}

fn parse_field<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: usize,
    field: &str,
    line: usize,
) -> Result<T, SeedError> {
    record
        .get(index)
        .unwrap_or("")
        .trim()
        .parse()
        .map_err(|_| SeedError {
            line,
            field: Some(field.to_string()),
            error: format!("invalid {}", field),
        })
}

fn parse_payment_date(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw.trim())
        .map_err(|e| anyhow::anyhow!("invalid payment_date: {}", e))?
        .with_timezone(&Utc))
}
