//! One-shot performance report over the whole ledger

use chrono::{DateTime, Utc};
use common::{Influencer, LedgerState};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::attribution::{global_stats, trade_extremes, GlobalStats};
use crate::config::{AnalyticsConfig, ConfluenceConfig};
use crate::confluence::{detect_confluence, ConfluencePlay};
use crate::metrics::{
    asset_performance, tier_performance, top_performers, AssetPerformance, TierPerformance,
};

/// Every aggregate view, computed together from one ledger snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub generated_at: DateTime<Utc>,
    pub stats: GlobalStats,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub top_performers: Vec<Influencer>,
    pub tiers: Vec<TierPerformance>,
    pub assets: Vec<AssetPerformance>,
    pub confluence: Vec<ConfluencePlay>,
}

impl PerformanceReport {
    pub fn build(
        state: &LedgerState,
        analytics: &AnalyticsConfig,
        confluence: &ConfluenceConfig,
    ) -> Self {
        let extremes = trade_extremes(&state.signals);

        let report = Self {
            generated_at: Utc::now(),
            stats: global_stats(&state.signals),
            best_trade: extremes.best_trade,
            worst_trade: extremes.worst_trade,
            top_performers: top_performers(&state.influencers, analytics)
                .into_iter()
                .cloned()
                .collect(),
            tiers: tier_performance(state),
            assets: asset_performance(&state.signals, analytics.top_assets_limit),
            confluence: detect_confluence(state, confluence),
        };

        info!(
            signals = report.stats.total,
            completed = report.stats.completed,
            win_rate = report.stats.win_rate,
            confluence = report.confluence.len(),
            "Performance report built"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{influencer, signal};
    use common::{Outcome, Tier};

    #[test]
    fn test_report_on_empty_ledger() {
        let report = PerformanceReport::build(
            &LedgerState::default(),
            &AnalyticsConfig::default(),
            &ConfluenceConfig::default(),
        );
        assert_eq!(report.stats, GlobalStats::default());
        assert_eq!(report.tiers.len(), 5);
        assert!(report.assets.is_empty());
        assert!(report.top_performers.is_empty());
        assert!(report.confluence.is_empty());
    }

    #[test]
    fn test_report_bundles_views() {
        let mut hsaka = influencer("Hsaka", Tier::S);
        hsaka.total_calls = 3;
        hsaka.win_rate = 50.0;
        let cobie = influencer("Cobie", Tier::A);

        let state = LedgerState {
            signals: vec![
                signal("BTC", Some(&hsaka), Outcome::Win, Some(12.0)),
                signal("ETH", Some(&hsaka), Outcome::Loss, Some(-6.0)),
                signal("SOL", Some(&hsaka), Outcome::Pending, None),
                signal("SOL", Some(&cobie), Outcome::Pending, None),
            ],
            influencers: vec![hsaka, cobie],
            ..Default::default()
        };

        let report = PerformanceReport::build(
            &state,
            &AnalyticsConfig::default(),
            &ConfluenceConfig::default(),
        );
        assert_eq!(report.stats.total_pnl, 6.0);
        assert_eq!(report.best_trade, 12.0);
        assert_eq!(report.worst_trade, -6.0);
        assert_eq!(report.top_performers.len(), 1);
        assert_eq!(report.assets.len(), 2);
        assert_eq!(report.confluence[0].coin, "SOL");

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("topPerformers").is_some());
        assert_eq!(json["stats"]["winRate"], 50.0);
    }
}
