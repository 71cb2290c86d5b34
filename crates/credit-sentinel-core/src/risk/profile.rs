use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Score;

/// Best possible score; every loan starts here before deductions.
pub const MAX_SCORE: Score = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Band a score. Each band is inclusive on its lower edge: 85 is Low,
    /// 70 is Medium, 50 is High, 49 is Critical.
    pub fn from_score(score: Score) -> Self {
        match score {
            0..=49 => Self::Critical,
            50..=69 => Self::High,
            70..=84 => Self::Medium,
            _ => Self::Low,
        }
    }

    /// High and Critical loans count towards value at risk.
    pub fn is_elevated(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactorImpact {
    Positive,
    Negative,
    Neutral,
}

/// One rule's verdict on a loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactor {
    /// Stable short code, e.g. "IND-01".
    pub rule_id: String,
    pub description: String,
    pub impact: FactorImpact,
    /// Signed delta applied to the score; 0 for informational factors.
    pub score_impact: i32,
}

impl RiskFactor {
    pub fn negative(rule_id: &str, description: impl Into<String>, score_impact: i32) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            description: description.into(),
            impact: FactorImpact::Negative,
            score_impact,
        }
    }

    /// Informational factor: explains the loan's standing, moves nothing.
    pub fn positive(rule_id: &str, description: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            description: description.into(),
            impact: FactorImpact::Positive,
            score_impact: 0,
        }
    }
}

/// Output of the risk engine. Owned by exactly one loan and replaced
/// wholesale whenever the loan is created or updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfile {
    pub score: Score,
    pub level: RiskLevel,
    /// In rule evaluation order.
    pub factors: Vec<RiskFactor>,
    pub last_updated: DateTime<Utc>,
}

impl RiskProfile {
    /// Sum of all factor deltas, before clamping.
    pub fn total_impact(&self) -> i32 {
        self.factors.iter().map(|f| f.score_impact).sum()
    }

    pub fn rule_ids(&self) -> Vec<&str> {
        self.factors.iter().map(|f| f.rule_id.as_str()).collect()
    }

    pub fn has_factor(&self, rule_id: &str) -> bool {
        self.factors.iter().any(|f| f.rule_id == rule_id)
    }

    /// Score within `0..=MAX_SCORE` and level matching its band. Always true
    /// for engine output; a deserialised profile may violate either.
    pub fn is_well_formed(&self) -> bool {
        self.score <= MAX_SCORE && self.level == RiskLevel::from_score(self.score)
    }

    /// True when score, level and factors agree, ignoring the timestamp.
    pub fn same_assessment(&self, other: &RiskProfile) -> bool {
        self.score == other.score && self.level == other.level && self.factors == other.factors
    }
}
