use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use credit_sentinel_core::loan::{Borrower, CovenantStatus, Loan, LoanStatus};
use credit_sentinel_core::risk::scoring::{self, ScoreLoanInput};
use credit_sentinel_core::Currency;

use super::as_of_instant;
use crate::input;

/// Arguments for scoring a single loan
#[derive(Args)]
pub struct ScoreArgs {
    /// Path to a JSON/YAML document: a loan, or `{ loan, asOf }` (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan identifier
    #[arg(long, default_value = "LN-ADHOC")]
    pub loan_id: String,

    /// Borrower identifier
    #[arg(long, default_value = "BR-ADHOC")]
    pub borrower_id: String,

    /// Borrower name
    #[arg(long, default_value = "Unnamed borrower")]
    pub borrower_name: String,

    /// Borrower industry sector, e.g. Retail, Technology
    #[arg(long)]
    pub industry: Option<String>,

    /// Agency-style credit rating, e.g. AAA, BBB, CCC
    #[arg(long, alias = "rating")]
    pub credit_rating: Option<String>,

    /// Borrower annual revenue
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub annual_revenue: Decimal,

    /// Loan face amount
    #[arg(long, allow_hyphen_values = true)]
    pub amount: Option<Decimal>,

    /// ISO currency code
    #[arg(long, default_value = "USD")]
    pub currency: String,

    /// Annual interest rate in percentage points (5.5 = 5.5%)
    #[arg(long, allow_hyphen_values = true)]
    pub interest_rate: Option<Decimal>,

    /// Start date (YYYY-MM-DD); defaults to the evaluation date, or the
    /// maturity date when the loan is already past due
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Maturity date (YYYY-MM-DD)
    #[arg(long)]
    pub maturity_date: Option<NaiveDate>,

    /// Loan status: Draft, Active, Watchlist, Distressed, Repaid
    #[arg(long, default_value = "Active")]
    pub status: String,

    /// Covenant status: Compliant, Breach, Waiver
    #[arg(long, alias = "covenant", default_value = "Compliant")]
    pub covenant_status: String,

    /// Evaluate as of this date instead of now (YYYY-MM-DD)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

pub fn run_score(args: ScoreArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let as_of = as_of_instant(args.as_of);
    let mut score_input = match input::load::<Value>(args.input.as_deref())? {
        Some(doc) => score_input_from_document(doc)?,
        None => ScoreLoanInput {
            loan: loan_from_flags(&args, as_of)?,
            as_of: None,
        },
    };
    if as_of.is_some() {
        score_input.as_of = as_of;
    }

    let result = scoring::score_loan(&score_input)?;
    Ok(serde_json::to_value(result)?)
}

/// A score document is either `{ loan, asOf }` or a bare loan record.
fn score_input_from_document(doc: Value) -> Result<ScoreLoanInput, Box<dyn std::error::Error>> {
    if doc.get("loan").is_some() {
        input::parse_part(doc, "score document")
    } else {
        Ok(ScoreLoanInput {
            loan: input::parse_part(doc, "loan record")?,
            as_of: None,
        })
    }
}

fn loan_from_flags(
    args: &ScoreArgs,
    as_of: Option<DateTime<Utc>>,
) -> Result<Loan, Box<dyn std::error::Error>> {
    let maturity_date = args
        .maturity_date
        .ok_or("--maturity-date is required (or provide --input)")?;
    let evaluation_day = as_of.unwrap_or_else(Utc::now).date_naive();
    // A loan cannot start after it matures; past-due loans start on maturity.
    let start_date = args
        .start_date
        .unwrap_or_else(|| evaluation_day.min(maturity_date));

    Ok(Loan {
        id: args.loan_id.clone(),
        borrower_id: args.borrower_id.clone(),
        borrower: Borrower {
            id: args.borrower_id.clone(),
            name: args.borrower_name.clone(),
            industry: args
                .industry
                .clone()
                .ok_or("--industry is required (or provide --input)")?,
            credit_rating: args
                .credit_rating
                .clone()
                .ok_or("--credit-rating is required (or provide --input)")?,
            annual_revenue: args.annual_revenue,
        },
        amount: args.amount.ok_or("--amount is required (or provide --input)")?,
        currency: Currency::from(args.currency.as_str()),
        interest_rate: args
            .interest_rate
            .ok_or("--interest-rate is required (or provide --input)")?,
        start_date,
        maturity_date,
        status: LoanStatus::from(args.status.clone()),
        covenant_status: CovenantStatus::from(args.covenant_status.clone()),
        risk_profile: None,
        notes: String::new(),
        documents: vec![],
    })
}
