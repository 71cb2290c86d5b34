use chrono::{NaiveDate, Utc};
use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use serde_json::Value;

use credit_sentinel_core::loan::Loan;
use credit_sentinel_core::risk::compute_risk_profile_at;
use credit_sentinel_core::stress::{self, StressInput};

use super::as_of_instant;
use crate::input;

const DEFAULT_RATE_HIKE: Decimal = dec!(2.0);
const DEFAULT_REVENUE_DROP: Decimal = dec!(15);

/// Arguments for a stress projection
#[derive(Args)]
pub struct StressArgs {
    /// Path to a JSON/YAML document: a loan, or `{ loan, rateHike, revenueDrop }`
    #[arg(long)]
    pub input: Option<String>,

    /// Rate shock in percentage points (0-10). Overrides the document's
    /// `rateHike`; defaults to 2.0
    #[arg(long, allow_hyphen_values = true)]
    pub rate_hike: Option<Decimal>,

    /// Revenue shock in percentage points (0-50). Overrides the document's
    /// `revenueDrop`; defaults to 15
    #[arg(long, allow_hyphen_values = true)]
    pub revenue_drop: Option<Decimal>,

    /// Date used to score a loan that arrives without a risk profile
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

/// `{ loan, rateHike?, revenueDrop? }`; either shock may be left to flags.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StressDocument {
    loan: Loan,
    #[serde(default)]
    rate_hike: Option<Decimal>,
    #[serde(default)]
    revenue_drop: Option<Decimal>,
}

pub fn run_stress(args: StressArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let doc = input::load::<Value>(args.input.as_deref())?
        .ok_or("--input is required (or pipe a loan document on stdin)")?;
    let mut stress_input = stress_input_from_document(doc, &args)?;

    // A raw loan record has not been through the store yet; score it the
    // way the store would before projecting.
    if stress_input.loan.risk_profile.is_none() {
        let now = as_of_instant(args.as_of).unwrap_or_else(Utc::now);
        let profile = compute_risk_profile_at(&stress_input.loan, now);
        tracing::debug!(loan_id = %stress_input.loan.id, score = profile.score, "scored loan before stress");
        stress_input.loan.risk_profile = Some(profile);
    }

    let result = stress::project_stress(&stress_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Shocks resolve flag first, then document, then the desk default.
fn stress_input_from_document(
    doc: Value,
    args: &StressArgs,
) -> Result<StressInput, Box<dyn std::error::Error>> {
    let document: StressDocument = if doc.get("loan").is_some() {
        input::parse_part(doc, "stress document")?
    } else {
        StressDocument {
            loan: input::parse_part(doc, "loan record")?,
            rate_hike: None,
            revenue_drop: None,
        }
    };

    Ok(StressInput {
        loan: document.loan,
        rate_hike: args
            .rate_hike
            .or(document.rate_hike)
            .unwrap_or(DEFAULT_RATE_HIKE),
        revenue_drop: args
            .revenue_drop
            .or(document.revenue_drop)
            .unwrap_or(DEFAULT_REVENUE_DROP),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(rate_hike: Option<Decimal>, revenue_drop: Option<Decimal>) -> StressArgs {
        StressArgs {
            input: None,
            rate_hike,
            revenue_drop,
            as_of: None,
        }
    }

    fn loan_json() -> Value {
        serde_json::json!({
            "id": "LN-2024-001",
            "borrowerId": "BR-101",
            "borrower": {
                "id": "BR-101",
                "name": "Acme Logistics",
                "industry": "Transportation",
                "creditRating": "BBB",
                "annualRevenue": 50000000
            },
            "amount": 1500000,
            "currency": "USD",
            "interestRate": 5.5,
            "startDate": "2023-01-15",
            "maturityDate": "2026-01-15",
            "status": "Active"
        })
    }

    #[test]
    fn test_bare_loan_uses_defaults() {
        let input = stress_input_from_document(loan_json(), &args(None, None)).unwrap();
        assert_eq!(input.rate_hike, dec!(2.0));
        assert_eq!(input.revenue_drop, dec!(15));
    }

    #[test]
    fn test_document_shocks_used_without_flags() {
        let doc = serde_json::json!({ "loan": loan_json(), "rateHike": 3, "revenueDrop": 10 });
        let input = stress_input_from_document(doc, &args(None, None)).unwrap();
        assert_eq!(input.rate_hike, dec!(3));
        assert_eq!(input.revenue_drop, dec!(10));
    }

    #[test]
    fn test_flags_override_document_shocks() {
        let doc = serde_json::json!({ "loan": loan_json(), "rateHike": 3, "revenueDrop": 10 });
        let input = stress_input_from_document(doc, &args(Some(dec!(5)), None)).unwrap();
        assert_eq!(input.rate_hike, dec!(5));
        assert_eq!(input.revenue_drop, dec!(10));
    }

    #[test]
    fn test_bad_loan_field_reported() {
        let mut loan = loan_json();
        loan["maturityDate"] = serde_json::json!("soon");
        let doc = serde_json::json!({ "loan": loan });
        let err = stress_input_from_document(doc, &args(None, None))
            .unwrap_err()
            .to_string();
        assert!(err.starts_with("Invalid stress document"), "{err}");
    }
}
