use serde::{Deserialize, Serialize};

use crate::loan::{Loan, LoanStatus};

/// Loan list filter: an optional exact status plus a case-insensitive
/// substring matched against the borrower name or the loan id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanQuery {
    /// `None` lists every status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LoanStatus>,
    /// Blank or absent matches everything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl LoanQuery {
    pub fn with_status(mut self, status: LoanStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn matches(&self, loan: &Loan) -> bool {
        let status_ok = self.status.as_ref().map_or(true, |s| *s == loan.status);
        status_ok && self.matches_search(loan)
    }

    fn matches_search(&self, loan: &Loan) -> bool {
        let needle = match self.search.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_lowercase(),
            _ => return true,
        };
        loan.borrower.name.to_lowercase().contains(&needle)
            || loan.id.to_lowercase().contains(&needle)
    }
}
