use napi::Result as NapiResult;
use napi_derive::napi;

use credit_sentinel_core::loan::Loan;
use credit_sentinel_core::store::{InMemoryLoanStore, LoanQuery, LoanStore};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Risk engine
// ---------------------------------------------------------------------------

/// Score a loan record and return the bare `RiskProfile` as JSON.
#[napi]
pub fn compute_risk_profile(loan_json: String) -> NapiResult<String> {
    let loan: Loan = serde_json::from_str(&loan_json).map_err(to_napi_error)?;
    let profile = credit_sentinel_core::risk::compute_risk_profile(&loan);
    serde_json::to_string(&profile).map_err(to_napi_error)
}

#[napi]
pub fn score_loan(input_json: String) -> NapiResult<String> {
    let input: credit_sentinel_core::risk::scoring::ScoreLoanInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = credit_sentinel_core::risk::scoring::score_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Loan book
// ---------------------------------------------------------------------------

/// Load `loans_json` through the store (scoring each loan on insert) and
/// return the loans matching `query_json` (`{ status?, search? }`).
#[napi]
pub fn list_loans(loans_json: String, query_json: String) -> NapiResult<String> {
    let loans: Vec<Loan> = serde_json::from_str(&loans_json).map_err(to_napi_error)?;
    let query: LoanQuery = serde_json::from_str(&query_json).map_err(to_napi_error)?;
    let store = InMemoryLoanStore::new();
    for loan in loans {
        store.create_loan(loan).map_err(to_napi_error)?;
    }
    let found = store.find_loans(&query).map_err(to_napi_error)?;
    serde_json::to_string(&found).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_portfolio(input_json: String) -> NapiResult<String> {
    let input: credit_sentinel_core::portfolio::PortfolioInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        credit_sentinel_core::portfolio::analyze_portfolio(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Stress
// ---------------------------------------------------------------------------

#[napi]
pub fn project_stress(input_json: String) -> NapiResult<String> {
    let input: credit_sentinel_core::stress::StressInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = credit_sentinel_core::stress::project_stress(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
