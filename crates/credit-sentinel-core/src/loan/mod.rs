//! Loan and borrower records as the portfolio holds them.
//!
//! Records are wire-compatible with the dashboard's camelCase JSON. Status
//! fields accept any string: values outside the known sets are preserved in
//! an `Unrecognized` variant and scored by the engine's default arms.

pub mod model;
pub mod validation;

pub use model::{Borrower, CovenantStatus, Loan, LoanStatus};
pub use validation::validate_loan;
