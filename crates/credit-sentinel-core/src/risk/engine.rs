//! Deterministic, explainable loan risk scoring.
//!
//! Every loan starts at 100 and passes through four independent rules, in
//! this order:
//! 1. **Industry** -- high-risk sectors lose 15 points.
//! 2. **Covenant** -- a breach costs 30 points, a waiver 10.
//! 3. **Credit rating** -- strong grades cost nothing, moderate 10, the rest 25.
//! 4. **Maturity proximity** -- unrepaid loans maturing within 90 days lose 10.
//!
//! Each rule contributes at most one factor. The factors are the complete
//! explanation of the score: `clamp(100 + sum(score_impact)) == score`.
//!
//! The engine is pure and total: no I/O, no shared state, no error path.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};

use super::profile::{RiskFactor, RiskLevel, RiskProfile, MAX_SCORE};
use crate::loan::{CovenantStatus, Loan, LoanStatus};
use crate::types::Score;

const HIGH_RISK_INDUSTRIES: [&str; 3] = ["Retail", "Hospitality", "Construction"];
const STRONG_RATINGS: [&str; 3] = ["AAA", "AA", "A"];
const MODERATE_RATINGS: [&str; 2] = ["BBB", "BB"];

const INDUSTRY_PENALTY: i32 = -15;
const COVENANT_BREACH_PENALTY: i32 = -30;
const COVENANT_WAIVER_PENALTY: i32 = -10;
const MODERATE_RATING_PENALTY: i32 = -10;
const POOR_RATING_PENALTY: i32 = -25;
const MATURITY_PENALTY: i32 = -10;

/// Loans maturing inside this window are flagged unless already repaid.
pub const MATURITY_WINDOW_DAYS: i64 = 90;

type Rule = fn(&Loan, DateTime<Utc>) -> Option<RiskFactor>;

/// Evaluation order is the order factors appear in the profile.
const RULES: [Rule; 4] = [
    industry_rule,
    covenant_rule,
    credit_rating_rule,
    maturity_rule,
];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Score a loan against the current UTC time.
pub fn compute_risk_profile(loan: &Loan) -> RiskProfile {
    compute_risk_profile_at(loan, Utc::now())
}

/// Score a loan as of `now`. `now` drives both the maturity rule and the
/// profile's `last_updated` stamp.
pub fn compute_risk_profile_at(loan: &Loan, now: DateTime<Utc>) -> RiskProfile {
    let mut raw_score = i32::from(MAX_SCORE);
    let mut factors = Vec::with_capacity(RULES.len());

    for rule in RULES {
        if let Some(factor) = rule(loan, now) {
            raw_score += factor.score_impact;
            factors.push(factor);
        }
    }

    let score = clamp_score(raw_score);

    RiskProfile {
        score,
        level: RiskLevel::from_score(score),
        factors,
        last_updated: now,
    }
}

/// Time from `now` until the start (00:00 UTC) of the maturity date.
/// Negative once the loan is past maturity.
pub fn time_to_maturity(maturity_date: NaiveDate, now: DateTime<Utc>) -> TimeDelta {
    maturity_date.and_time(NaiveTime::MIN).and_utc() - now
}

pub fn is_high_risk_industry(industry: &str) -> bool {
    HIGH_RISK_INDUSTRIES.contains(&industry)
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

fn industry_rule(loan: &Loan, _now: DateTime<Utc>) -> Option<RiskFactor> {
    let industry = &loan.borrower.industry;
    let factor = if is_high_risk_industry(industry) {
        RiskFactor::negative(
            "IND-01",
            format!("High-risk industry sector: {industry}"),
            INDUSTRY_PENALTY,
        )
    } else {
        RiskFactor::positive("IND-02", format!("Stable industry sector: {industry}"))
    };
    Some(factor)
}

fn covenant_rule(loan: &Loan, _now: DateTime<Utc>) -> Option<RiskFactor> {
    match &loan.covenant_status {
        CovenantStatus::Breach => Some(RiskFactor::negative(
            "COV-01",
            "Active Covenant Breach detected",
            COVENANT_BREACH_PENALTY,
        )),
        CovenantStatus::Waiver => Some(RiskFactor::negative(
            "COV-02",
            "Operating under Covenant Waiver",
            COVENANT_WAIVER_PENALTY,
        )),
        // Unknown covenant states carry no deduction, same as Compliant.
        CovenantStatus::Compliant | CovenantStatus::Unrecognized(_) => None,
    }
}

fn credit_rating_rule(loan: &Loan, _now: DateTime<Utc>) -> Option<RiskFactor> {
    let rating = loan.borrower.credit_rating.as_str();
    let factor = match rating {
        r if STRONG_RATINGS.contains(&r) => {
            RiskFactor::positive("CR-01", format!("Strong Credit Rating ({rating})"))
        }
        r if MODERATE_RATINGS.contains(&r) => RiskFactor::negative(
            "CR-02",
            format!("Moderate Credit Rating ({rating})"),
            MODERATE_RATING_PENALTY,
        ),
        // Everything else is poor: sub-investment grades, notched grades
        // outside the two sets, and strings that are not grades at all.
        _ => RiskFactor::negative(
            "CR-03",
            format!("Poor Credit Rating ({rating})"),
            POOR_RATING_PENALTY,
        ),
    };
    Some(factor)
}

fn maturity_rule(loan: &Loan, now: DateTime<Utc>) -> Option<RiskFactor> {
    if loan.status == LoanStatus::Repaid {
        return None;
    }
    let remaining = time_to_maturity(loan.maturity_date, now);
    (remaining < TimeDelta::days(MATURITY_WINDOW_DAYS)).then(|| {
        RiskFactor::negative("MAT-01", "Maturity within 90 days", MATURITY_PENALTY)
    })
}

fn clamp_score(raw: i32) -> Score {
    // The clamp bounds the value to 0..=100, so the narrowing cast is exact.
    raw.clamp(0, i32::from(MAX_SCORE)) as Score
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
