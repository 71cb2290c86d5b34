use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditKind {
    System,
    User,
    Alert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub loan_id: String,
    pub action: String,
    pub user: String,
    pub details: String,
    #[serde(rename = "type")]
    pub kind: AuditKind,
}

pub const ACTION_ORIGINATED: &str = "Loan Originated";
pub const ACTION_UPDATED: &str = "Loan Updated";
pub const ACTION_ESCALATED: &str = "Risk Level Escalated";

/// Sequential entry ids, e.g. `AUD-000042`.
pub(crate) fn entry_id(sequence: u64) -> String {
    format!("AUD-{sequence:06}")
}
