use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use credit_sentinel_core::loan::{Borrower, CovenantStatus, Loan, LoanStatus};
use credit_sentinel_core::risk::{
    compute_risk_profile, compute_risk_profile_at, FactorImpact, RiskLevel, RiskProfile,
};
use credit_sentinel_core::Currency;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
}

fn days_out(days: i64) -> NaiveDate {
    (as_of() + Duration::days(days)).date_naive()
}

fn loan(
    industry: &str,
    rating: &str,
    covenant: CovenantStatus,
    maturity: NaiveDate,
    status: LoanStatus,
) -> Loan {
    Loan {
        id: "LN-2025-100".into(),
        borrower_id: "BR-300".into(),
        borrower: Borrower {
            id: "BR-300".into(),
            name: "Fixture Holdings".into(),
            industry: industry.into(),
            credit_rating: rating.into(),
            annual_revenue: dec!(25_000_000),
        },
        amount: dec!(3_000_000),
        currency: Currency::USD,
        interest_rate: dec!(6.0),
        start_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
        maturity_date: maturity,
        status,
        covenant_status: covenant,
        risk_profile: None,
        notes: String::new(),
        documents: vec![],
    }
}

fn score(l: &Loan) -> RiskProfile {
    compute_risk_profile_at(l, as_of())
}

fn assert_explained(p: &RiskProfile) {
    let expected = (100 + p.total_impact()).clamp(0, 100);
    assert_eq!(i32::from(p.score), expected, "factors must explain the score");
    assert_eq!(p.level, RiskLevel::from_score(p.score));
}

// ===========================================================================
// Reference scenarios
// ===========================================================================

#[test]
fn test_scenario_clean_technology_credit() {
    let p = score(&loan(
        "Technology",
        "AAA",
        CovenantStatus::Compliant,
        days_out(365),
        LoanStatus::Active,
    ));
    assert_eq!(p.score, 100);
    assert_eq!(p.level, RiskLevel::Low);
    assert_eq!(p.rule_ids(), vec!["IND-02", "CR-01"]);
    assert!(p.factors.iter().all(|f| f.score_impact == 0));
    assert_explained(&p);
}

#[test]
fn test_scenario_retail_breach_near_maturity() {
    let p = score(&loan(
        "Retail",
        "BBB",
        CovenantStatus::Breach,
        days_out(30),
        LoanStatus::Active,
    ));
    // 100 - 15 - 30 - 10 - 10
    assert_eq!(p.score, 35);
    assert_eq!(p.level, RiskLevel::Critical);
    assert_eq!(p.rule_ids(), vec!["IND-01", "COV-01", "CR-02", "MAT-01"]);
    let impacts: Vec<i32> = p.factors.iter().map(|f| f.score_impact).collect();
    assert_eq!(impacts, vec![-15, -30, -10, -10]);
    assert!(p.factors.iter().all(|f| f.impact == FactorImpact::Negative));
    assert_explained(&p);
}

#[test]
fn test_scenario_hospitality_waiver_lands_on_high_boundary() {
    let p = score(&loan(
        "Hospitality",
        "CCC",
        CovenantStatus::Waiver,
        days_out(400),
        LoanStatus::Active,
    ));
    // 100 - 15 - 10 - 25
    assert_eq!(p.score, 50);
    assert_eq!(p.level, RiskLevel::High);
    assert_eq!(p.rule_ids(), vec!["IND-01", "COV-02", "CR-03"]);
    assert_explained(&p);
}

#[test]
fn test_scenario_repaid_loan_skips_maturity_rule() {
    let p = score(&loan(
        "Technology",
        "AA",
        CovenantStatus::Compliant,
        days_out(10),
        LoanStatus::Repaid,
    ));
    assert!(!p.has_factor("MAT-01"));
    assert_eq!(p.score, 100);
}

// ===========================================================================
// Rule coverage
// ===========================================================================

#[test]
fn test_each_high_risk_industry_penalised() {
    for industry in ["Retail", "Hospitality", "Construction"] {
        let p = score(&loan(
            industry,
            "AAA",
            CovenantStatus::Compliant,
            days_out(365),
            LoanStatus::Active,
        ));
        assert_eq!(p.score, 85, "{industry}");
        assert_eq!(p.level, RiskLevel::Low, "85 is the bottom of Low");
        assert_eq!(p.factors[0].rule_id, "IND-01");
    }
}

#[test]
fn test_credit_rating_branches() {
    let cases = [
        ("AAA", "CR-01", 100),
        ("AA", "CR-01", 100),
        ("A", "CR-01", 100),
        ("BBB", "CR-02", 90),
        ("BB", "CR-02", 90),
        ("B", "CR-03", 75),
        ("CCC", "CR-03", 75),
        ("AA+", "CR-03", 75),
        ("BBB-", "CR-03", 75),
        ("", "CR-03", 75),
        ("not-a-grade", "CR-03", 75),
    ];
    for (rating, rule, expected) in cases {
        let p = score(&loan(
            "Technology",
            rating,
            CovenantStatus::Compliant,
            days_out(365),
            LoanStatus::Active,
        ));
        let rating_factors: Vec<&str> = p
            .rule_ids()
            .into_iter()
            .filter(|id| id.starts_with("CR-"))
            .collect();
        assert_eq!(rating_factors, vec![rule], "rating {rating:?}");
        assert_eq!(p.score, expected, "rating {rating:?}");
    }
}

#[test]
fn test_unrecognised_covenant_scores_as_compliant() {
    let compliant = score(&loan(
        "Technology",
        "A",
        CovenantStatus::Compliant,
        days_out(365),
        LoanStatus::Active,
    ));
    let unknown = score(&loan(
        "Technology",
        "A",
        CovenantStatus::Unrecognized("Pending Review".into()),
        days_out(365),
        LoanStatus::Active,
    ));
    assert_eq!(unknown.factors, compliant.factors);
    assert_eq!(unknown.score, compliant.score);
}

#[test]
fn test_unrecognised_status_still_gets_maturity_penalty() {
    let p = score(&loan(
        "Technology",
        "A",
        CovenantStatus::Compliant,
        days_out(20),
        LoanStatus::Unrecognized("Restructured".into()),
    ));
    assert!(p.has_factor("MAT-01"));
    assert_eq!(p.score, 90);
}

#[test]
fn test_maturity_window_edges() {
    let fires = |days: i64| {
        score(&loan(
            "Technology",
            "AAA",
            CovenantStatus::Compliant,
            days_out(days),
            LoanStatus::Active,
        ))
        .has_factor("MAT-01")
    };
    assert!(fires(0));
    assert!(fires(89));
    assert!(!fires(90));
    assert!(!fires(91));
}

#[test]
fn test_past_due_unrepaid_loan_flagged() {
    let p = score(&loan(
        "Hospitality",
        "CCC",
        CovenantStatus::Breach,
        NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
        LoanStatus::Distressed,
    ));
    // 100 - 15 - 30 - 25 - 10 = 20
    assert_eq!(p.score, 20);
    assert_eq!(p.level, RiskLevel::Critical);
    assert!(p.has_factor("MAT-01"));
}

#[test]
fn test_every_status_other_than_repaid_is_checked() {
    for status in [
        LoanStatus::Draft,
        LoanStatus::Active,
        LoanStatus::Watchlist,
        LoanStatus::Distressed,
    ] {
        let p = score(&loan(
            "Technology",
            "AAA",
            CovenantStatus::Compliant,
            days_out(5),
            status.clone(),
        ));
        assert!(p.has_factor("MAT-01"), "{status}");
    }
}

// ===========================================================================
// Properties
// ===========================================================================

#[test]
fn test_invariants_hold_across_input_grid() {
    let industries = ["Retail", "Technology", "Construction", "Energy"];
    let ratings = ["AAA", "A", "BBB", "BB", "B-", "CCC", "junk"];
    let covenants = [
        CovenantStatus::Compliant,
        CovenantStatus::Breach,
        CovenantStatus::Waiver,
    ];
    let maturities = [-30, 10, 89, 90, 400];
    let statuses = [LoanStatus::Active, LoanStatus::Repaid];

    for industry in industries {
        for rating in ratings {
            for covenant in &covenants {
                for days in maturities {
                    for status in &statuses {
                        let p = score(&loan(
                            industry,
                            rating,
                            covenant.clone(),
                            days_out(days),
                            status.clone(),
                        ));
                        assert!(p.score <= 100);
                        assert_explained(&p);

                        let ids = p.rule_ids();
                        let count = |prefix: &str| ids.iter().filter(|id| id.starts_with(prefix)).count();
                        assert_eq!(count("IND-"), 1);
                        assert_eq!(count("CR-"), 1);
                        assert_eq!(count("COV-"), usize::from(*covenant != CovenantStatus::Compliant));
                        assert!(count("MAT-") <= 1);
                        if *status == LoanStatus::Repaid {
                            assert_eq!(count("MAT-"), 0);
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn test_factor_order_follows_rule_order() {
    let p = score(&loan(
        "Construction",
        "BB",
        CovenantStatus::Waiver,
        days_out(1),
        LoanStatus::Watchlist,
    ));
    let prefixes: Vec<&str> = p
        .factors
        .iter()
        .map(|f| f.rule_id.split('-').next().unwrap())
        .collect();
    assert_eq!(prefixes, vec!["IND", "COV", "CR", "MAT"]);
}

#[test]
fn test_repeat_scoring_is_idempotent() {
    let l = loan(
        "Retail",
        "BB",
        CovenantStatus::Waiver,
        days_out(45),
        LoanStatus::Watchlist,
    );
    let first = compute_risk_profile(&l);
    let second = compute_risk_profile(&l);
    assert!(first.same_assessment(&second));
    assert_eq!(first.factors, second.factors);
    assert!(second.last_updated >= first.last_updated);
}

#[test]
fn test_engine_does_not_touch_input() {
    let l = loan(
        "Retail",
        "BB",
        CovenantStatus::Breach,
        days_out(45),
        LoanStatus::Active,
    );
    let before = l.clone();
    let _ = score(&l);
    assert_eq!(l, before);
}

#[test]
fn test_profile_json_shape() {
    let p = score(&loan(
        "Retail",
        "BBB",
        CovenantStatus::Breach,
        days_out(30),
        LoanStatus::Active,
    ));
    let v = serde_json::to_value(&p).unwrap();
    assert_eq!(v["score"], 35);
    assert_eq!(v["level"], "Critical");
    assert_eq!(v["factors"][0]["ruleId"], "IND-01");
    assert_eq!(v["factors"][0]["scoreImpact"], -15);
    assert!(v["lastUpdated"].as_str().unwrap().starts_with("2025-03-01T00:00:00"));

    let back: RiskProfile = serde_json::from_value(v).unwrap();
    assert_eq!(back, p);
}

#[test]
fn test_scoring_is_safe_across_threads() {
    let l = std::sync::Arc::new(loan(
        "Retail",
        "BBB",
        CovenantStatus::Breach,
        days_out(30),
        LoanStatus::Active,
    ));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let l = std::sync::Arc::clone(&l);
            std::thread::spawn(move || compute_risk_profile_at(&l, as_of()))
        })
        .collect();
    for h in handles {
        let p = h.join().unwrap();
        assert_eq!(p.score, 35);
    }
}
