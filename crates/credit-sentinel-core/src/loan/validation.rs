use rust_decimal::Decimal;

use super::model::Loan;
use crate::{SentinelError, SentinelResult};

/// Structural checks applied by the store before a loan is scored and
/// written. The risk engine itself never rejects a loan.
///
/// Past-due maturities are accepted: a loan that has run past maturity
/// without being repaid is exactly what the maturity rule should flag.
pub fn validate_loan(loan: &Loan) -> SentinelResult<()> {
    if loan.id.trim().is_empty() {
        return Err(SentinelError::invalid("id", "Loan id must not be empty."));
    }
    if loan.borrower.id.trim().is_empty() {
        return Err(SentinelError::invalid(
            "borrower.id",
            "Borrower id must not be empty.",
        ));
    }
    if loan.borrower_id != loan.borrower.id {
        return Err(SentinelError::invalid(
            "borrowerId",
            format!(
                "'{}' does not match embedded borrower '{}'.",
                loan.borrower_id, loan.borrower.id
            ),
        ));
    }
    if loan.amount < Decimal::ZERO {
        return Err(SentinelError::invalid(
            "amount",
            format!("Loan amount must be non-negative, got {}.", loan.amount),
        ));
    }
    if loan.borrower.annual_revenue < Decimal::ZERO {
        return Err(SentinelError::invalid(
            "borrower.annualRevenue",
            format!(
                "Annual revenue must be non-negative, got {}.",
                loan.borrower.annual_revenue
            ),
        ));
    }
    if loan.interest_rate < Decimal::ZERO {
        return Err(SentinelError::invalid(
            "interestRate",
            format!(
                "Interest rate must be non-negative, got {}.",
                loan.interest_rate
            ),
        ));
    }
    if loan.maturity_date < loan.start_date {
        return Err(SentinelError::invalid(
            "maturityDate",
            format!(
                "Maturity {} precedes start date {}.",
                loan.maturity_date, loan.start_date
            ),
        ));
    }
    Ok(())
}
