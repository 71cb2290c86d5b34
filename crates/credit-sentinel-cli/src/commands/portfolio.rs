use chrono::{NaiveDate, Utc};
use clap::Args;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

use credit_sentinel_core::portfolio::{self, PortfolioInput, PortfolioKpis};
use credit_sentinel_core::store::{InMemoryLoanStore, LoanStore};
use credit_sentinel_core::with_metadata;

use super::as_of_instant;
use super::loans::LoanRow;
use crate::input;

/// Arguments for portfolio aggregation
#[derive(Args)]
pub struct PortfolioArgs {
    /// Path to a JSON/YAML document: a list of loans, or `{ loans, rescore, asOf }`
    #[arg(long)]
    pub input: Option<String>,

    /// Re-derive every risk profile before aggregating
    #[arg(long)]
    pub rescore: bool,

    /// Evaluation date for rescoring (YYYY-MM-DD)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

/// Arguments for the demo portfolio
#[derive(Args)]
pub struct SeedArgs {
    /// Evaluation date for scoring the demo loans (YYYY-MM-DD)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SeedOutput {
    loans: Vec<LoanRow>,
    kpis: PortfolioKpis,
}

pub fn run_portfolio(args: PortfolioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let doc = input::load::<Value>(args.input.as_deref())?
        .ok_or("--input is required (or pipe a loan list on stdin)")?;
    let mut portfolio_input = portfolio_input_from_document(doc)?;
    portfolio_input.rescore |= args.rescore;
    if let Some(as_of) = as_of_instant(args.as_of) {
        portfolio_input.as_of = Some(as_of);
    }

    let result = portfolio::analyze_portfolio(&portfolio_input)?;
    Ok(serde_json::to_value(result)?)
}

/// A portfolio document is either a bare list of loans or
/// `{ loans, rescore, asOf }`.
fn portfolio_input_from_document(doc: Value) -> Result<PortfolioInput, Box<dyn std::error::Error>> {
    if doc.is_array() {
        Ok(PortfolioInput {
            loans: input::parse_part(doc, "loan list")?,
            rescore: false,
            as_of: None,
        })
    } else {
        input::parse_part(doc, "portfolio document")
    }
}

pub fn run_seed(args: SeedArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let now = as_of_instant(args.as_of).unwrap_or_else(Utc::now);

    let store = InMemoryLoanStore::new()
        .with_clock(move || now)
        .with_seed_portfolio()?;
    let loans = store.list_loans()?;

    let rows = loans.iter().map(LoanRow::from).collect();

    let output = SeedOutput {
        loans: rows,
        kpis: portfolio::portfolio_kpis(&loans),
    };

    let assumptions = serde_json::json!({
        "as_of": now.to_rfc3339(),
        "loan_count": loans.len(),
    });
    let result = with_metadata(
        "Demo loan book scored through the in-memory store",
        &assumptions,
        vec![],
        start.elapsed().as_micros() as u64,
        output,
    );
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_list_and_wrapped_document() {
        let bare = portfolio_input_from_document(serde_json::json!([])).unwrap();
        assert!(bare.loans.is_empty());
        assert!(!bare.rescore);

        let wrapped =
            portfolio_input_from_document(serde_json::json!({ "loans": [], "rescore": true }))
                .unwrap();
        assert!(wrapped.rescore);
    }

    #[test]
    fn test_bad_loan_in_list_reported() {
        let err = portfolio_input_from_document(serde_json::json!([{ "id": "LN-1" }]))
            .unwrap_err()
            .to_string();
        assert!(err.starts_with("Invalid loan list"), "{err}");
        assert!(err.contains("missing field"), "{err}");
    }
}
