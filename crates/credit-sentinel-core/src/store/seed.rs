use chrono::NaiveDate;
use rust_decimal_macros::dec;

use crate::loan::{Borrower, CovenantStatus, Loan, LoanStatus};
use crate::types::{Currency, Money, Percent};

/// Demo book used to populate an empty dashboard: one loan per corner of
/// the risk grid, from a clean investment-grade credit to a distressed
/// hospitality name in covenant breach.
pub fn seed_loans() -> Vec<Loan> {
    vec![
        seed(
            SeedTerms {
                id: "LN-2024-001",
                amount: dec!(1_500_000),
                currency: Currency::USD,
                interest_rate: dec!(5.5),
                start: (2023, 1, 15),
                maturity: (2026, 1, 15),
                status: LoanStatus::Active,
                covenant: CovenantStatus::Compliant,
                notes: "Borrower showing steady growth.",
                documents: &["LoanAgreement.pdf", "Q3_Financials.xlsx"],
            },
            borrower("BR-101", "Acme Logistics", "Transportation", "BBB", dec!(50_000_000)),
        ),
        seed(
            SeedTerms {
                id: "LN-2023-882",
                amount: dec!(5_000_000),
                currency: Currency::GBP,
                interest_rate: dec!(7.2),
                start: (2022, 6, 1),
                maturity: (2025, 6, 1),
                status: LoanStatus::Watchlist,
                covenant: CovenantStatus::Breach,
                notes: "Missed EBITDA target for Q2. Watchlist triggered.",
                documents: &["Covenant_Compliance_Cert.pdf"],
            },
            borrower("BR-105", "Summit Retail Group", "Retail", "B-", dec!(12_000_000)),
        ),
        seed(
            SeedTerms {
                id: "LN-2024-112",
                amount: dec!(10_000_000),
                currency: Currency::USD,
                interest_rate: dec!(4.8),
                start: (2024, 2, 10),
                maturity: (2027, 2, 10),
                status: LoanStatus::Active,
                covenant: CovenantStatus::Compliant,
                notes: "High growth potential.",
                documents: &["Term_Sheet.pdf", "IP_Valuation.pdf"],
            },
            borrower("BR-109", "TechNova Solutions", "Technology", "A-", dec!(85_000_000)),
        ),
        seed(
            SeedTerms {
                id: "LN-2021-055",
                amount: dec!(2_500_000),
                currency: Currency::EUR,
                interest_rate: dec!(8.5),
                start: (2021, 3, 20),
                maturity: (2024, 3, 20),
                status: LoanStatus::Distressed,
                covenant: CovenantStatus::Breach,
                notes: "Severe cash flow issues.",
                documents: &["Restructuring_Plan.pdf"],
            },
            borrower("BR-202", "BlueWater Hospitality", "Hospitality", "CCC", dec!(5_000_000)),
        ),
    ]
}

struct SeedTerms {
    id: &'static str,
    amount: Money,
    currency: Currency,
    interest_rate: Percent,
    start: (i32, u32, u32),
    maturity: (i32, u32, u32),
    status: LoanStatus,
    covenant: CovenantStatus,
    notes: &'static str,
    documents: &'static [&'static str],
}

fn borrower(id: &str, name: &str, industry: &str, rating: &str, revenue: Money) -> Borrower {
    Borrower {
        id: id.to_string(),
        name: name.to_string(),
        industry: industry.to_string(),
        credit_rating: rating.to_string(),
        annual_revenue: revenue,
    }
}

fn seed(terms: SeedTerms, borrower: Borrower) -> Loan {
    Loan {
        id: terms.id.to_string(),
        borrower_id: borrower.id.clone(),
        borrower,
        amount: terms.amount,
        currency: terms.currency,
        interest_rate: terms.interest_rate,
        start_date: date(terms.start),
        maturity_date: date(terms.maturity),
        status: terms.status,
        covenant_status: terms.covenant,
        risk_profile: None,
        notes: terms.notes.to_string(),
        documents: terms.documents.iter().map(|d| d.to_string()).collect(),
    }
}

fn date((y, m, d): (i32, u32, u32)) -> NaiveDate {
    // Seed dates are literals checked by the tests below.
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}
