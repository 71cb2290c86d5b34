pub mod error;
pub mod loan;
pub mod risk;
pub mod types;

#[cfg(feature = "store")]
pub mod store;

#[cfg(feature = "portfolio")]
pub mod portfolio;

#[cfg(feature = "stress")]
pub mod stress;

pub use error::SentinelError;
pub use types::*;

/// Standard result type for all credit-sentinel operations
pub type SentinelResult<T> = Result<T, SentinelError>;
