//! Analytics and confluence configuration

use common::Tier;
use serde::{Deserialize, Serialize};

/// Leaderboard sizing for the performance report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Influencers need at least this many calls to rank as top performers
    #[serde(default = "default_top_performer_min_calls")]
    pub top_performer_min_calls: u32,

    /// Maximum number of top performers listed
    #[serde(default = "default_top_performers_limit")]
    pub top_performers_limit: usize,

    /// Maximum number of assets listed
    #[serde(default = "default_top_assets_limit")]
    pub top_assets_limit: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_performer_min_calls: default_top_performer_min_calls(),
            top_performers_limit: default_top_performers_limit(),
            top_assets_limit: default_top_assets_limit(),
        }
    }
}

fn default_top_performer_min_calls() -> u32 {
    3
}

fn default_top_performers_limit() -> usize {
    5
}

fn default_top_assets_limit() -> usize {
    5
}

/// Which pending calls count towards a confluence play
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceConfig {
    /// Minimum group size for a coin to qualify
    #[serde(default = "default_min_sources")]
    pub min_sources: usize,

    /// Tiers trusted enough to contribute
    #[serde(default = "default_confluence_tiers")]
    pub tiers: Vec<Tier>,

    /// Count distinct influencers instead of raw signals
    #[serde(default = "default_dedupe_by_source")]
    pub dedupe_by_source: bool,
}

impl Default for ConfluenceConfig {
    fn default() -> Self {
        Self {
            min_sources: default_min_sources(),
            tiers: default_confluence_tiers(),
            dedupe_by_source: default_dedupe_by_source(),
        }
    }
}

impl ConfluenceConfig {
    pub fn includes(&self, tier: Tier) -> bool {
        self.tiers.contains(&tier)
    }
}

fn default_min_sources() -> usize {
    2
}

fn default_confluence_tiers() -> Vec<Tier> {
    vec![Tier::S, Tier::A]
}

fn default_dedupe_by_source() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let cfg: ConfluenceConfig = serde_json::from_str(r#"{"min_sources": 3}"#).unwrap();
        assert_eq!(cfg.min_sources, 3);
        assert_eq!(cfg.tiers, vec![Tier::S, Tier::A]);
        assert!(cfg.dedupe_by_source);

        let cfg: AnalyticsConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, AnalyticsConfig::default());
    }
}
