//! Read-side analytics for the tracker
//!
//! Global outcome stats, leaderboards, tier and asset rollups and
//! confluence detection. All views are pure functions of the ledger state.

pub mod attribution;
pub mod config;
pub mod confluence;
pub mod metrics;
pub mod report;

pub use attribution::{global_stats, trade_extremes, GlobalStats, TradeExtremes};
pub use config::{AnalyticsConfig, ConfluenceConfig};
pub use confluence::{detect_confluence, ConfluencePlay};
pub use metrics::{
    asset_performance, tier_performance, top_performers, AssetPerformance, TierPerformance,
};
pub use report::PerformanceReport;
