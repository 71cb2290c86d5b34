use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

use super::audit::{self, AuditKind, AuditLogEntry};
use super::seed::seed_loans;
use super::{LoanQuery, LoanStore};
use crate::loan::{validate_loan, Loan};
use crate::risk::{compute_risk_profile_at, RiskProfile};
use crate::{SentinelError, SentinelResult};

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Default)]
struct StoreState {
    loans: BTreeMap<String, Loan>,
    audit: Vec<AuditLogEntry>,
}

impl StoreState {
    fn record(
        &mut self,
        timestamp: DateTime<Utc>,
        loan_id: &str,
        action: &str,
        user: &str,
        details: String,
        kind: AuditKind,
    ) {
        let id = audit::entry_id(self.audit.len() as u64 + 1);
        self.audit.push(AuditLogEntry {
            id,
            timestamp,
            loan_id: loan_id.to_string(),
            action: action.to_string(),
            user: user.to_string(),
            details,
            kind,
        });
    }
}

/// Thread-safe in-memory loan book.
///
/// A single `RwLock` guards both the loans and the audit trail, so a write
/// (validate, score, insert, audit) is observed atomically by readers.
pub struct InMemoryLoanStore {
    state: RwLock<StoreState>,
    clock: Clock,
    actor: String,
}

impl Default for InMemoryLoanStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLoanStore {
    /// Empty store scoring against the wall clock.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            clock: Box::new(Utc::now),
            actor: "system".to_string(),
        }
    }

    /// Pin the evaluation clock, e.g. for reproducible scoring runs.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Name recorded against user-initiated audit entries.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    /// Load the demo portfolio through the normal create path.
    pub fn with_seed_portfolio(self) -> SentinelResult<Self> {
        for loan in seed_loans() {
            self.create_loan(loan)?;
        }
        Ok(self)
    }

    fn read(&self) -> SentinelResult<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|_| SentinelError::StoreUnavailable("loan book lock poisoned".into()))
    }

    fn write(&self) -> SentinelResult<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|_| SentinelError::StoreUnavailable("loan book lock poisoned".into()))
    }

    fn score(&self, loan: Loan) -> (Loan, RiskProfile, DateTime<Utc>) {
        let now = (self.clock)();
        let profile = compute_risk_profile_at(&loan, now);
        debug!(
            loan_id = %loan.id,
            score = profile.score,
            level = %profile.level,
            factors = ?profile.rule_ids(),
            "risk profile recomputed"
        );
        (loan.with_risk_profile(profile.clone()), profile, now)
    }
}

impl LoanStore for InMemoryLoanStore {
    fn list_loans(&self) -> SentinelResult<Vec<Loan>> {
        Ok(self.read()?.loans.values().cloned().collect())
    }

    fn find_loans(&self, query: &LoanQuery) -> SentinelResult<Vec<Loan>> {
        let state = self.read()?;
        let found: Vec<Loan> = state
            .loans
            .values()
            .filter(|l| query.matches(l))
            .cloned()
            .collect();
        debug!(matched = found.len(), total = state.loans.len(), "loan query");
        Ok(found)
    }

    fn get_loan(&self, id: &str) -> SentinelResult<Option<Loan>> {
        Ok(self.read()?.loans.get(id).cloned())
    }

    fn create_loan(&self, loan: Loan) -> SentinelResult<Loan> {
        if let Err(e) = validate_loan(&loan) {
            warn!(loan_id = %loan.id, error = %e, "rejected loan on create");
            return Err(e);
        }

        let mut state = self.write()?;
        if state.loans.contains_key(&loan.id) {
            return Err(SentinelError::DuplicateLoan(loan.id));
        }

        let (loan, profile, now) = self.score(loan);
        state.record(
            now,
            &loan.id,
            audit::ACTION_ORIGINATED,
            &self.actor,
            format!("Initial risk score {} ({})", profile.score, profile.level),
            AuditKind::System,
        );
        state.loans.insert(loan.id.clone(), loan.clone());

        info!(loan_id = %loan.id, score = profile.score, "loan created");
        Ok(loan)
    }

    fn update_loan(&self, loan: Loan) -> SentinelResult<Loan> {
        if let Err(e) = validate_loan(&loan) {
            warn!(loan_id = %loan.id, error = %e, "rejected loan on update");
            return Err(e);
        }

        let mut state = self.write()?;
        let previous = match state.loans.get(&loan.id) {
            Some(existing) => existing.risk_profile.clone(),
            None => return Err(SentinelError::LoanNotFound(loan.id)),
        };

        let (loan, profile, now) = self.score(loan);
        let details = match &previous {
            Some(prev) => format!(
                "Risk score {} ({}) -> {} ({})",
                prev.score, prev.level, profile.score, profile.level
            ),
            None => format!("Risk score {} ({})", profile.score, profile.level),
        };
        state.record(
            now,
            &loan.id,
            audit::ACTION_UPDATED,
            &self.actor,
            details,
            AuditKind::User,
        );

        let escalated = profile.level.is_elevated()
            && previous.as_ref().map_or(true, |prev| profile.level > prev.level);
        if escalated {
            let reasons: Vec<&str> = profile
                .factors
                .iter()
                .filter(|f| f.score_impact < 0)
                .map(|f| f.description.as_str())
                .collect();
            state.record(
                now,
                &loan.id,
                audit::ACTION_ESCALATED,
                &self.actor,
                format!("Now {}: {}", profile.level, reasons.join("; ")),
                AuditKind::Alert,
            );
            warn!(loan_id = %loan.id, level = %profile.level, "risk level escalated");
        }

        state.loans.insert(loan.id.clone(), loan.clone());
        info!(loan_id = %loan.id, score = profile.score, "loan updated");
        Ok(loan)
    }

    fn audit_log(&self) -> SentinelResult<Vec<AuditLogEntry>> {
        Ok(self.read()?.audit.clone())
    }
}
