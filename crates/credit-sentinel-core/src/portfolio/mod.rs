//! Portfolio-level aggregation of stored risk profiles.

pub mod analytics;

pub use analytics::{analyze_portfolio, portfolio_kpis, PortfolioInput, PortfolioKpis, PortfolioOutput};
