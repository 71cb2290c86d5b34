use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::risk::profile::RiskProfile;
use crate::types::{Currency, Money, Percent};

// ---------------------------------------------------------------------------
// Borrower
// ---------------------------------------------------------------------------

/// Snapshot of the obligor, embedded in every loan it borrows under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Borrower {
    pub id: String,
    pub name: String,
    /// Free-form sector label, e.g. "Retail" or "Technology".
    pub industry: String,
    /// Agency-style grade string ("AAA" .. "CCC"). Kept as text: notched or
    /// unknown grades are legal and fall to the poor-rating branch.
    pub credit_rating: String,
    pub annual_revenue: Money,
}

// ---------------------------------------------------------------------------
// Status enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LoanStatus {
    Draft,
    Active,
    Watchlist,
    Distressed,
    Repaid,
    /// Any status string outside the lifecycle above. Treated as not repaid.
    Unrecognized(String),
}

impl LoanStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Draft => "Draft",
            Self::Active => "Active",
            Self::Watchlist => "Watchlist",
            Self::Distressed => "Distressed",
            Self::Repaid => "Repaid",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Watchlist and Distressed loans are the ones under special monitoring.
    pub fn is_monitored(&self) -> bool {
        matches!(self, Self::Watchlist | Self::Distressed)
    }
}

impl From<String> for LoanStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Draft" => Self::Draft,
            "Active" => Self::Active,
            "Watchlist" => Self::Watchlist,
            "Distressed" => Self::Distressed,
            "Repaid" => Self::Repaid,
            _ => Self::Unrecognized(raw),
        }
    }
}

impl From<LoanStatus> for String {
    fn from(status: LoanStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CovenantStatus {
    #[default]
    Compliant,
    Breach,
    Waiver,
    /// Any covenant string outside the three above. Scored as compliant.
    Unrecognized(String),
}

impl CovenantStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Compliant => "Compliant",
            Self::Breach => "Breach",
            Self::Waiver => "Waiver",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for CovenantStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Compliant" => Self::Compliant,
            "Breach" => Self::Breach,
            "Waiver" => Self::Waiver,
            _ => Self::Unrecognized(raw),
        }
    }
}

impl From<CovenantStatus> for String {
    fn from(status: CovenantStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for CovenantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Loan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: String,
    pub borrower_id: String,
    pub borrower: Borrower,
    pub amount: Money,
    pub currency: Currency,
    /// Annual coupon in percentage points.
    pub interest_rate: Percent,
    pub start_date: NaiveDate,
    pub maturity_date: NaiveDate,
    pub status: LoanStatus,
    #[serde(default)]
    pub covenant_status: CovenantStatus,
    /// Produced by the risk engine on every create/update; absent on loans
    /// that have not been through the store yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_profile: Option<RiskProfile>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub documents: Vec<String>,
}

impl Loan {
    pub fn is_repaid(&self) -> bool {
        self.status == LoanStatus::Repaid
    }

    /// Replace any prior profile wholesale.
    pub fn with_risk_profile(mut self, profile: RiskProfile) -> Self {
        self.risk_profile = Some(profile);
        self
    }
}
