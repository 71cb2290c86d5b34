use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::time::Instant;
use tracing::debug;

use crate::loan::{Loan, LoanStatus};
use crate::risk::profile::MAX_SCORE;
use crate::risk::{compute_risk_profile_at, RiskLevel};
use crate::{types::*, SentinelResult};

/// Loans scoring below this are surfaced for analyst review.
pub const SCREENING_THRESHOLD: Score = 70;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioInput {
    pub loans: Vec<Loan>,
    /// Re-derive every profile before aggregating, as the store would on
    /// write. Off by default: stored profiles are authoritative.
    #[serde(default)]
    pub rescore: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<DateTime<Utc>>,
}

/// Headline dashboard figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioKpis {
    /// Face amount across all loans, summed without FX conversion.
    pub total_exposure: Money,
    /// Mean score over scored loans, 2dp; zero when nothing is scored.
    pub avg_risk_score: Decimal,
    /// Loans on Watchlist or Distressed.
    pub watchlist_count: usize,
    /// Face amount of loans at High or Critical.
    pub loans_at_risk_value: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: LoanStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelCount {
    pub level: RiskLevel,
    pub count: usize,
    pub exposure: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryExposure {
    pub industry: String,
    pub exposure: Money,
    pub loan_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenedLoan {
    pub loan_id: String,
    pub borrower_name: String,
    pub industry: String,
    pub score: Score,
    pub level: RiskLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioOutput {
    pub kpis: PortfolioKpis,
    pub status_distribution: Vec<StatusCount>,
    pub level_distribution: Vec<LevelCount>,
    /// In order of first appearance in the book.
    pub industry_exposure: Vec<IndustryExposure>,
    /// Loans below the screening threshold, worst first.
    pub screened_loans: Vec<ScreenedLoan>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the dashboard KPIs from stored profiles.
///
/// Loans without a profile count towards exposure and watchlist figures but
/// are left out of the average score and the value at risk.
pub fn portfolio_kpis(loans: &[Loan]) -> PortfolioKpis {
    let total_exposure: Money = loans.iter().map(|l| l.amount).sum();

    let scores: Vec<Score> = loans
        .iter()
        .filter_map(|l| l.risk_profile.as_ref().map(|p| p.score))
        .collect();
    let avg_risk_score = if scores.is_empty() {
        Decimal::ZERO
    } else {
        let total: Decimal = scores.iter().map(|s| Decimal::from(*s)).sum();
        (total / Decimal::from(scores.len())).round_dp(2)
    };

    let watchlist_count = loans.iter().filter(|l| l.status.is_monitored()).count();

    let loans_at_risk_value: Money = loans
        .iter()
        .filter(|l| {
            l.risk_profile
                .as_ref()
                .is_some_and(|p| p.level.is_elevated())
        })
        .map(|l| l.amount)
        .sum();

    PortfolioKpis {
        total_exposure,
        avg_risk_score,
        watchlist_count,
        loans_at_risk_value,
    }
}

/// Aggregate a loan book into KPIs, distributions and a screening list.
pub fn analyze_portfolio(
    input: &PortfolioInput,
) -> SentinelResult<ComputationOutput<PortfolioOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let now = input.as_of.unwrap_or_else(Utc::now);
    let mut book: Cow<'_, [Loan]> = if input.rescore {
        let rescored: Vec<Loan> = input
            .loans
            .iter()
            .map(|l| {
                let profile = compute_risk_profile_at(l, now);
                l.clone().with_risk_profile(profile)
            })
            .collect();
        debug!(count = rescored.len(), "portfolio rescored");
        Cow::Owned(rescored)
    } else {
        Cow::Borrowed(input.loans.as_slice())
    };

    let malformed: Vec<String> = book
        .iter()
        .filter(|l| l.risk_profile.as_ref().is_some_and(|p| !p.is_well_formed()))
        .map(|l| l.id.clone())
        .collect();
    if !malformed.is_empty() {
        warnings.push(format!(
            "{} loan(s) carry an out-of-range or mis-banded risk profile; score clamped \
             to 0-{MAX_SCORE} and level re-banded: {}.",
            malformed.len(),
            malformed.join(", ")
        ));
        for profile in book.to_mut().iter_mut().filter_map(|l| l.risk_profile.as_mut()) {
            profile.score = profile.score.min(MAX_SCORE);
            profile.level = RiskLevel::from_score(profile.score);
        }
    }
    let loans: &[Loan] = &book;

    if loans.is_empty() {
        warnings.push("Portfolio is empty; all figures are zero.".into());
    }

    let unscored: Vec<&str> = loans
        .iter()
        .filter(|l| l.risk_profile.is_none())
        .map(|l| l.id.as_str())
        .collect();
    if !unscored.is_empty() {
        warnings.push(format!(
            "{} loan(s) have no risk profile and are excluded from score figures: {}.",
            unscored.len(),
            unscored.join(", ")
        ));
    }

    let mut currencies: Vec<&Currency> = Vec::new();
    for loan in loans {
        if !currencies.contains(&&loan.currency) {
            currencies.push(&loan.currency);
        }
    }
    if currencies.len() > 1 {
        let codes: Vec<&str> = currencies.iter().map(|c| c.code()).collect();
        warnings.push(format!(
            "Exposure sums face amounts across {} without FX conversion.",
            codes.join(", ")
        ));
    }

    let output = PortfolioOutput {
        kpis: portfolio_kpis(loans),
        status_distribution: status_distribution(loans),
        level_distribution: level_distribution(loans),
        industry_exposure: industry_exposure(loans),
        screened_loans: screen_loans(loans),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "loan_count": loans.len(),
        "rescored": input.rescore,
        "screening_threshold": SCREENING_THRESHOLD,
        "fx_conversion": false,
    });

    Ok(with_metadata(
        "Loan portfolio risk aggregation",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn status_distribution(loans: &[Loan]) -> Vec<StatusCount> {
    let mut counts: Vec<StatusCount> = [
        LoanStatus::Draft,
        LoanStatus::Active,
        LoanStatus::Watchlist,
        LoanStatus::Distressed,
        LoanStatus::Repaid,
    ]
    .into_iter()
    .map(|status| StatusCount { status, count: 0 })
    .collect();

    for loan in loans {
        match counts.iter_mut().find(|c| c.status == loan.status) {
            Some(entry) => entry.count += 1,
            None => counts.push(StatusCount {
                status: loan.status.clone(),
                count: 1,
            }),
        }
    }
    counts
}

fn level_distribution(loans: &[Loan]) -> Vec<LevelCount> {
    [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ]
    .into_iter()
    .map(|level| {
        let matching = loans
            .iter()
            .filter(|l| l.risk_profile.as_ref().is_some_and(|p| p.level == level));
        let (count, exposure) = matching.fold((0, Decimal::ZERO), |(n, sum), l| {
            (n + 1, sum + l.amount)
        });
        LevelCount {
            level,
            count,
            exposure,
        }
    })
    .collect()
}

fn industry_exposure(loans: &[Loan]) -> Vec<IndustryExposure> {
    let mut rows: Vec<IndustryExposure> = Vec::new();
    for loan in loans {
        let industry = &loan.borrower.industry;
        match rows.iter_mut().find(|r| &r.industry == industry) {
            Some(row) => {
                row.exposure += loan.amount;
                row.loan_count += 1;
            }
            None => rows.push(IndustryExposure {
                industry: industry.clone(),
                exposure: loan.amount,
                loan_count: 1,
            }),
        }
    }
    rows
}

fn screen_loans(loans: &[Loan]) -> Vec<ScreenedLoan> {
    let mut screened: Vec<ScreenedLoan> = loans
        .iter()
        .filter_map(|l| {
            let profile = l.risk_profile.as_ref()?;
            (profile.score < SCREENING_THRESHOLD).then(|| ScreenedLoan {
                loan_id: l.id.clone(),
                borrower_name: l.borrower.name.clone(),
                industry: l.borrower.industry.clone(),
                score: profile.score,
                level: profile.level,
            })
        })
        .collect();
    // Stable sort keeps book order among equal scores.
    screened.sort_by_key(|s| s.score);
    screened
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::{Borrower, CovenantStatus};
    use crate::risk::{RiskFactor, RiskProfile};
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal_macros::dec;

    fn scored_loan(id: &str, industry: &str, amount: Money, status: LoanStatus, score: Score) -> Loan {
        Loan {
            id: id.into(),
            borrower_id: format!("BR-{id}"),
            borrower: Borrower {
                id: format!("BR-{id}"),
                name: format!("Borrower {id}"),
                industry: industry.into(),
                credit_rating: "BBB".into(),
                annual_revenue: dec!(1_000_000),
            },
            amount,
            currency: Currency::USD,
            interest_rate: dec!(6),
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            maturity_date: NaiveDate::from_ymd_opt(2028, 1, 1).unwrap(),
            status,
            covenant_status: CovenantStatus::Compliant,
            risk_profile: Some(RiskProfile {
                score,
                level: RiskLevel::from_score(score),
                factors: vec![RiskFactor::negative("CR-03", "test", i32::from(score) - 100)],
                last_updated: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            }),
            notes: String::new(),
            documents: vec![],
        }
    }

    #[test]
    fn test_kpis_basic() {
        let loans = vec![
            scored_loan("A", "Retail", dec!(1_000), LoanStatus::Active, 90),
            scored_loan("B", "Retail", dec!(3_000), LoanStatus::Watchlist, 45),
            scored_loan("C", "Energy", dec!(6_000), LoanStatus::Distressed, 60),
        ];
        let k = portfolio_kpis(&loans);
        assert_eq!(k.total_exposure, dec!(10_000));
        assert_eq!(k.avg_risk_score, dec!(65));
        assert_eq!(k.watchlist_count, 2);
        // B is Critical, C is High.
        assert_eq!(k.loans_at_risk_value, dec!(9_000));
    }

    #[test]
    fn test_kpis_empty_book() {
        let k = portfolio_kpis(&[]);
        assert_eq!(k.total_exposure, Decimal::ZERO);
        assert_eq!(k.avg_risk_score, Decimal::ZERO);
        assert_eq!(k.watchlist_count, 0);
    }

    #[test]
    fn test_average_rounds_to_two_places() {
        let loans = vec![
            scored_loan("A", "Retail", dec!(1), LoanStatus::Active, 100),
            scored_loan("B", "Retail", dec!(1), LoanStatus::Active, 100),
            scored_loan("C", "Retail", dec!(1), LoanStatus::Active, 50),
        ];
        assert_eq!(portfolio_kpis(&loans).avg_risk_score, dec!(83.33));
    }

    #[test]
    fn test_unscored_loans_excluded_from_score_figures() {
        let mut unscored = scored_loan("U", "Energy", dec!(500), LoanStatus::Active, 10);
        unscored.risk_profile = None;
        let loans = vec![
            scored_loan("A", "Retail", dec!(1_000), LoanStatus::Active, 80),
            unscored,
        ];
        let k = portfolio_kpis(&loans);
        assert_eq!(k.total_exposure, dec!(1_500));
        assert_eq!(k.avg_risk_score, dec!(80));
        assert_eq!(k.loans_at_risk_value, Decimal::ZERO);
    }

    #[test]
    fn test_industry_exposure_keeps_first_seen_order() {
        let loans = vec![
            scored_loan("A", "Energy", dec!(100), LoanStatus::Active, 90),
            scored_loan("B", "Retail", dec!(200), LoanStatus::Active, 90),
            scored_loan("C", "Energy", dec!(300), LoanStatus::Active, 90),
        ];
        let rows = industry_exposure(&loans);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].industry, "Energy");
        assert_eq!(rows[0].exposure, dec!(400));
        assert_eq!(rows[0].loan_count, 2);
        assert_eq!(rows[1].industry, "Retail");
    }

    #[test]
    fn test_screening_sorted_worst_first() {
        let loans = vec![
            scored_loan("A", "Retail", dec!(1), LoanStatus::Active, 65),
            scored_loan("B", "Retail", dec!(1), LoanStatus::Active, 70),
            scored_loan("C", "Retail", dec!(1), LoanStatus::Active, 20),
        ];
        let screened = screen_loans(&loans);
        let ids: Vec<&str> = screened.iter().map(|s| s.loan_id.as_str()).collect();
        // 70 sits on the threshold and is not screened.
        assert_eq!(ids, vec!["C", "A"]);
    }

    #[test]
    fn test_unrecognised_status_gets_own_row() {
        let loans = vec![scored_loan(
            "A",
            "Retail",
            dec!(1),
            LoanStatus::Unrecognized("Restructured".into()),
            90,
        )];
        let counts = status_distribution(&loans);
        assert_eq!(counts.len(), 6);
        assert_eq!(counts[5].status, LoanStatus::Unrecognized("Restructured".into()));
        assert!(counts[..5].iter().all(|c| c.count == 0));
    }

    #[test]
    fn test_out_of_range_stored_score_is_rebanded() {
        let mut forged = scored_loan("F", "Retail", dec!(2_000), LoanStatus::Active, 40);
        if let Some(p) = forged.risk_profile.as_mut() {
            p.score = 150;
            p.level = RiskLevel::Critical;
        }
        let input = PortfolioInput {
            loans: vec![
                scored_loan("A", "Retail", dec!(1_000), LoanStatus::Active, 80),
                forged,
            ],
            rescore: false,
            as_of: None,
        };
        let result = analyze_portfolio(&input).unwrap();
        let out = &result.result;

        // 150 is read as 100 (Low), so it adds nothing to value at risk.
        assert_eq!(out.kpis.avg_risk_score, dec!(90));
        assert_eq!(out.kpis.loans_at_risk_value, Decimal::ZERO);
        let critical = out
            .level_distribution
            .iter()
            .find(|c| c.level == RiskLevel::Critical)
            .unwrap();
        assert_eq!(critical.count, 0);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("mis-banded") && w.ends_with(": F.")));
    }

    #[test]
    fn test_mixed_currency_warning() {
        let mut gbp = scored_loan("B", "Retail", dec!(1), LoanStatus::Active, 90);
        gbp.currency = Currency::GBP;
        let input = PortfolioInput {
            loans: vec![scored_loan("A", "Retail", dec!(1), LoanStatus::Active, 90), gbp],
            rescore: false,
            as_of: None,
        };
        let result = analyze_portfolio(&input).unwrap();
        assert!(result.warnings.iter().any(|w| w.contains("USD, GBP")));
    }
}
