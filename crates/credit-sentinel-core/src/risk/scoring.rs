use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::engine::{compute_risk_profile_at, time_to_maturity};
use super::profile::RiskProfile;
use crate::loan::{validate_loan, CovenantStatus, Loan, LoanStatus};
use crate::{types::*, SentinelResult};

/// Every grade on the agency scale, notches included. Used only to word
/// warnings; scoring itself matches on the strong/moderate sets.
const AGENCY_GRADES: [&str; 22] = [
    "AAA", "AA+", "AA", "AA-", "A+", "A", "A-", "BBB+", "BBB", "BBB-", "BB+", "BB", "BB-", "B+",
    "B", "B-", "CCC+", "CCC", "CCC-", "CC", "C", "D",
];

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreLoanInput {
    pub loan: Loan,
    /// Evaluation time; defaults to now.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreLoanOutput {
    pub loan_id: String,
    pub borrower_name: String,
    #[serde(flatten)]
    pub profile: RiskProfile,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Validate a loan and run it through the risk engine, flagging inputs that
/// were scored by a default arm rather than an explicit rule branch.
pub fn score_loan(input: &ScoreLoanInput) -> SentinelResult<ComputationOutput<ScoreLoanOutput>> {
    let start = Instant::now();
    let loan = &input.loan;

    validate_loan(loan)?;

    let now = input.as_of.unwrap_or_else(Utc::now);
    let profile = compute_risk_profile_at(loan, now);
    let warnings = scoring_warnings(loan, now);

    let output = ScoreLoanOutput {
        loan_id: loan.id.clone(),
        borrower_name: loan.borrower.name.clone(),
        profile,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "base_score": 100,
        "as_of": now.to_rfc3339(),
        "high_risk_industries": ["Retail", "Hospitality", "Construction"],
        "maturity_window_days": super::engine::MATURITY_WINDOW_DAYS,
    });

    Ok(with_metadata(
        "Deterministic rule-based loan risk scoring",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn scoring_warnings(loan: &Loan, now: DateTime<Utc>) -> Vec<String> {
    let mut warnings = Vec::new();

    let rating = loan.borrower.credit_rating.as_str();
    if !AGENCY_GRADES.contains(&rating) {
        warnings.push(format!(
            "Credit rating '{rating}' is not an agency grade; scored as poor."
        ));
    }

    if let CovenantStatus::Unrecognized(raw) = &loan.covenant_status {
        warnings.push(format!(
            "Covenant status '{raw}' is not recognised; scored as compliant."
        ));
    }

    if let LoanStatus::Unrecognized(raw) = &loan.status {
        warnings.push(format!(
            "Loan status '{raw}' is not recognised; treated as outstanding."
        ));
    }

    if !loan.is_repaid() && time_to_maturity(loan.maturity_date, now) < TimeDelta::zero() {
        warnings.push(format!(
            "Loan matured on {} and is not marked repaid.",
            loan.maturity_date
        ));
    }

    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
