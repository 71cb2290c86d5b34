//! Deterministic stress projection of a loan's stored risk score.

pub mod projection;

pub use projection::{project_stress, StressInput, StressOutput};
