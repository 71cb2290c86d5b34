use chrono::{NaiveDate, Utc};
use clap::Args;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

use credit_sentinel_core::loan::{Loan, LoanStatus};
use credit_sentinel_core::risk::RiskLevel;
use credit_sentinel_core::store::{InMemoryLoanStore, LoanQuery, LoanStore};
use credit_sentinel_core::{with_metadata, Money, Score};

use super::as_of_instant;
use crate::input;

/// Arguments for the filtered loan listing
#[derive(Args)]
pub struct ListArgs {
    /// Path to a JSON/YAML list of loans; the demo book is used when absent
    #[arg(long)]
    pub input: Option<String>,

    /// Only loans in this status (Draft, Active, Watchlist, Distressed, Repaid, or All)
    #[arg(long)]
    pub status: Option<String>,

    /// Case-insensitive match on borrower name or loan id
    #[arg(long)]
    pub search: Option<String>,

    /// Evaluation date used when loans are scored on load (YYYY-MM-DD)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

/// One line of a loan listing.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRow {
    pub loan_id: String,
    pub borrower: String,
    pub industry: String,
    pub status: String,
    pub amount: Money,
    pub currency: String,
    pub score: Option<Score>,
    pub level: Option<RiskLevel>,
}

impl From<&Loan> for LoanRow {
    fn from(l: &Loan) -> Self {
        LoanRow {
            loan_id: l.id.clone(),
            borrower: l.borrower.name.clone(),
            industry: l.borrower.industry.clone(),
            status: l.status.to_string(),
            amount: l.amount,
            currency: l.currency.to_string(),
            score: l.risk_profile.as_ref().map(|p| p.score),
            level: l.risk_profile.as_ref().map(|p| p.level),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListOutput {
    loans: Vec<LoanRow>,
    matched: usize,
    total: usize,
}

pub fn run_list(args: ListArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let now = as_of_instant(args.as_of).unwrap_or_else(Utc::now);

    // Loads go through the store's create path, so every listed loan
    // carries a profile computed on insert.
    let store = InMemoryLoanStore::new().with_clock(move || now);
    let store = match input::load::<Value>(args.input.as_deref())? {
        Some(doc) => {
            let loans: Vec<Loan> = input::parse_part(doc, "loan list")?;
            for loan in loans {
                store.create_loan(loan)?;
            }
            store
        }
        None => store.with_seed_portfolio()?,
    };

    let query = loan_query(args.status.as_deref(), args.search.as_deref());
    let total = store.list_loans()?.len();
    let found = store.find_loans(&query)?;

    let output = ListOutput {
        loans: found.iter().map(LoanRow::from).collect(),
        matched: found.len(),
        total,
    };
    let assumptions = serde_json::json!({
        "as_of": now.to_rfc3339(),
        "status": query.status.as_ref().map(|s| s.to_string()),
        "search": query.search,
    });
    let result = with_metadata(
        "Loan book filtered by status and borrower/loan id search",
        &assumptions,
        vec![],
        start.elapsed().as_micros() as u64,
        output,
    );
    Ok(serde_json::to_value(result)?)
}

/// "All" (any case) or an absent flag lists every status.
fn loan_query(status: Option<&str>, search: Option<&str>) -> LoanQuery {
    let mut query = LoanQuery::default();
    if let Some(status) = status.filter(|s| !s.eq_ignore_ascii_case("all")) {
        query = query.with_status(LoanStatus::from(status.to_string()));
    }
    if let Some(search) = search {
        query = query.with_search(search);
    }
    query
}
