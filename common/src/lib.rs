//! Shared domain model for the CT tracker ledger.
//!
//! Every other crate in the workspace speaks in these types: influencers,
//! the signals attributed to them, the portfolio settings used for sizing
//! and the serialisable ledger document that ties them together.

mod error;
mod lenient;
mod models;
mod rounding;
mod state;

pub use error::{LedgerError, LedgerResult};
pub use lenient::legacy_id;
pub use models::{
    Action, Influencer, Outcome, PortfolioSettings, Signal, Tier, DEFAULT_PORTFOLIO_VALUE,
    DEFAULT_RISK_PER_TRADE,
};
pub use rounding::round_dp;
pub use state::{LedgerState, SCHEMA_VERSION};

// Re-exported so downstream crates agree on a single version
pub use chrono::{DateTime, Utc};
pub use uuid::Uuid;
