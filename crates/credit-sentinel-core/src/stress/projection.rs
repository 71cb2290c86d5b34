use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::loan::Loan;
use crate::risk::profile::MAX_SCORE;
use crate::risk::RiskLevel;
use crate::{types::*, SentinelError, SentinelResult};

/// Score points lost per percentage point of rate hike.
const RATE_HIKE_SENSITIVITY: Decimal = dec!(4);
/// Score points lost per percentage point of revenue drop.
const REVENUE_DROP_SENSITIVITY: Decimal = dec!(0.8);
/// A stressed loan never projects below this score.
const PROJECTED_SCORE_FLOOR: Score = 10;

const MAX_RATE_HIKE: Decimal = dec!(10);
const MAX_REVENUE_DROP: Decimal = dec!(50);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StressInput {
    /// Must carry a risk profile; the projection starts from the stored score.
    pub loan: Loan,
    /// Parallel rate shock in percentage points, 0..=10.
    pub rate_hike: Percent,
    /// Borrower revenue shock in percentage points, 0..=50.
    pub revenue_drop: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StressOutput {
    pub loan_id: String,
    pub base_score: Score,
    pub base_level: RiskLevel,
    pub projected_score: Score,
    pub projected_level: RiskLevel,
    /// Projected minus base; zero or negative.
    pub score_change: i32,
    pub base_interest_rate: Percent,
    pub stressed_interest_rate: Percent,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project a loan's risk score under a rate and revenue shock.
///
/// `projected = max(10, floor(score - 4 * rate_hike - 0.8 * revenue_drop))`
///
/// The stored profile is the starting point; the loan is not re-scored.
pub fn project_stress(input: &StressInput) -> SentinelResult<ComputationOutput<StressOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    check_shock("rate_hike", input.rate_hike, MAX_RATE_HIKE)?;
    check_shock("revenue_drop", input.revenue_drop, MAX_REVENUE_DROP)?;

    let loan = &input.loan;
    let profile = loan.risk_profile.as_ref().ok_or_else(|| {
        SentinelError::InsufficientData(format!(
            "Loan '{}' has no risk profile; score it before stress testing.",
            loan.id
        ))
    })?;

    // Stored profiles are deserialised, not engine output; re-band from a
    // clamped score rather than trust the recorded level.
    if !profile.is_well_formed() {
        warnings.push(format!(
            "Stored risk profile (score {}, level {}) is out of range or mis-banded; \
             projecting from score {} instead. Rescore the loan to correct it.",
            profile.score,
            profile.level,
            profile.score.min(MAX_SCORE)
        ));
    }
    let base_score = profile.score.min(MAX_SCORE);
    let base_level = RiskLevel::from_score(base_score);
    let raw = Decimal::from(base_score)
        - input.rate_hike * RATE_HIKE_SENSITIVITY
        - input.revenue_drop * REVENUE_DROP_SENSITIVITY;
    let floored = raw.floor();
    let projected_score = floored
        .to_u8()
        .map_or(PROJECTED_SCORE_FLOOR, |s| s.max(PROJECTED_SCORE_FLOOR));

    if floored < Decimal::from(PROJECTED_SCORE_FLOOR) {
        warnings.push(format!(
            "Projected score {floored} is below the floor; reported as {PROJECTED_SCORE_FLOOR}."
        ));
    }

    let output = StressOutput {
        loan_id: loan.id.clone(),
        base_score,
        base_level,
        projected_score,
        projected_level: RiskLevel::from_score(projected_score),
        score_change: i32::from(projected_score) - i32::from(base_score),
        base_interest_rate: loan.interest_rate,
        stressed_interest_rate: loan.interest_rate + input.rate_hike,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "rate_hike": input.rate_hike.to_string(),
        "revenue_drop": input.revenue_drop.to_string(),
        "rate_hike_sensitivity": RATE_HIKE_SENSITIVITY.to_string(),
        "revenue_drop_sensitivity": REVENUE_DROP_SENSITIVITY.to_string(),
        "score_floor": PROJECTED_SCORE_FLOOR,
    });

    Ok(with_metadata(
        "Linear score sensitivity to rate and revenue shocks",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

fn check_shock(field: &str, value: Decimal, max: Decimal) -> SentinelResult<()> {
    if value < Decimal::ZERO || value > max {
        return Err(SentinelError::invalid(
            field,
            format!("Shock must be between 0 and {max} percentage points, got {value}."),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
