pub mod engine;
pub mod profile;
pub mod scoring;

pub use engine::{compute_risk_profile, compute_risk_profile_at};
pub use profile::{FactorImpact, RiskFactor, RiskLevel, RiskProfile};
