//! Loan persistence collaborator.
//!
//! The store is the only caller of the risk engine on the write path: every
//! create and update re-derives the loan's risk profile immediately before
//! the record is written, and readers never observe a loan whose profile is
//! stale relative to its fields.

pub mod audit;
pub mod memory;
pub mod query;
pub mod seed;

pub use audit::{AuditKind, AuditLogEntry};
pub use memory::InMemoryLoanStore;
pub use query::LoanQuery;

use crate::loan::Loan;
use crate::SentinelResult;

pub trait LoanStore: Send + Sync {
    /// All loans, ordered by id.
    fn list_loans(&self) -> SentinelResult<Vec<Loan>>;

    /// Loans matching `query`, ordered by id.
    fn find_loans(&self, query: &LoanQuery) -> SentinelResult<Vec<Loan>> {
        Ok(self
            .list_loans()?
            .into_iter()
            .filter(|l| query.matches(l))
            .collect())
    }

    fn get_loan(&self, id: &str) -> SentinelResult<Option<Loan>>;

    /// Validate, score and insert a new loan. Fails if the id is taken.
    fn create_loan(&self, loan: Loan) -> SentinelResult<Loan>;

    /// Validate, re-score and replace an existing loan. Any risk profile on
    /// the incoming record is discarded.
    fn update_loan(&self, loan: Loan) -> SentinelResult<Loan>;

    /// Audit trail, oldest entry first.
    fn audit_log(&self) -> SentinelResult<Vec<AuditLogEntry>>;
}
