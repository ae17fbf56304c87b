//! Influencer, tier and asset rollups
//!
//! Everything here is recomputed from the collections on each call.

use common::{round_dp, Influencer, LedgerState, Outcome, Signal, Tier};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::attribution::percentage;
use crate::config::AnalyticsConfig;

/// Influencers with at least `min_calls` calls, best win rate first
pub fn top_performers<'a>(
    influencers: &'a [Influencer],
    config: &AnalyticsConfig,
) -> Vec<&'a Influencer> {
    let mut eligible: Vec<&Influencer> = influencers
        .iter()
        .filter(|inf| inf.total_calls >= config.top_performer_min_calls)
        .collect();

    eligible.sort_by(|a, b| descending(a.win_rate, b.win_rate));
    eligible.truncate(config.top_performers_limit);
    eligible
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierPerformance {
    pub tier: Tier,
    /// Influencers currently in the tier
    pub influencers: usize,
    /// Completed signals from influencers in the tier
    pub completed: usize,
    pub wins: usize,
    pub win_rate: f64,
}

/// One row per tier, S through D, including empty tiers.
///
/// Signals are joined to tiers through their influencer, so orphaned
/// signals are left out.
pub fn tier_performance(state: &LedgerState) -> Vec<TierPerformance> {
    let tiers_by_id: HashMap<_, _> = state
        .influencers
        .iter()
        .map(|inf| (inf.id, inf.tier))
        .collect();

    Tier::ALL
        .iter()
        .map(|&tier| {
            let influencers = state.influencers.iter().filter(|i| i.tier == tier).count();

            let (completed, wins) = state
                .signals
                .iter()
                .filter(|s| s.is_resolved())
                .filter(|s| {
                    s.influencer_id
                        .and_then(|id| tiers_by_id.get(&id))
                        .map_or(false, |t| *t == tier)
                })
                .fold((0, 0), |(completed, wins), s| {
                    (completed + 1, wins + usize::from(s.outcome == Outcome::Win))
                });

            TierPerformance {
                tier,
                influencers,
                completed,
                wins,
                win_rate: percentage(wins, completed),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPerformance {
    pub coin: String,
    /// Completed signals on this asset
    pub total: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub avg_pnl: f64,
}

/// Completed signals grouped by coin, best win rate first.
///
/// Ties keep the order in which each coin first appears in the log.
pub fn asset_performance(signals: &[Signal], limit: usize) -> Vec<AssetPerformance> {
    struct Acc<'a> {
        coin: &'a str,
        total: usize,
        wins: usize,
        pnl: f64,
    }

    let mut groups: Vec<Acc> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for signal in signals.iter().filter(|s| s.is_resolved()) {
        let slot = *index.entry(signal.coin.as_str()).or_insert_with(|| {
            groups.push(Acc {
                coin: signal.coin.as_str(),
                total: 0,
                wins: 0,
                pnl: 0.0,
            });
            groups.len() - 1
        });

        let acc = &mut groups[slot];
        acc.total += 1;
        if signal.outcome == Outcome::Win {
            acc.wins += 1;
        }
        acc.pnl += signal.pnl.unwrap_or(0.0);
    }

    // Rank on the exact ratio; the rounded rate is for display only
    groups.sort_by(|a, b| {
        descending(
            a.wins as f64 / a.total as f64,
            b.wins as f64 / b.total as f64,
        )
    });
    groups.truncate(limit);

    groups
        .into_iter()
        .map(|acc| AssetPerformance {
            coin: acc.coin.to_string(),
            total: acc.total,
            wins: acc.wins,
            win_rate: percentage(acc.wins, acc.total),
            total_pnl: round_dp(acc.pnl, 2),
            avg_pnl: round_dp(acc.pnl / acc.total as f64, 2),
        })
        .collect()
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{influencer, signal};

    #[test]
    fn test_top_performers_requires_min_calls() {
        let mut two_calls = influencer("Lucky", Tier::C);
        two_calls.total_calls = 2;
        two_calls.wins = 2;
        two_calls.win_rate = 100.0;

        let mut three_calls = influencer("Steady", Tier::B);
        three_calls.total_calls = 3;
        three_calls.wins = 2;
        three_calls.losses = 1;
        three_calls.win_rate = 66.7;

        let influencers = vec![two_calls, three_calls];
        let top = top_performers(&influencers, &AnalyticsConfig::default());
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "Steady");
    }

    #[test]
    fn test_top_performers_order_and_limit() {
        let influencers: Vec<Influencer> = [50.0, 80.0, 80.0, 20.0]
            .iter()
            .enumerate()
            .map(|(i, rate)| {
                let mut inf = influencer(&format!("inf{}", i), Tier::A);
                inf.total_calls = 5;
                inf.win_rate = *rate;
                inf
            })
            .collect();

        let config = AnalyticsConfig {
            top_performers_limit: 3,
            ..Default::default()
        };
        let names: Vec<&str> = top_performers(&influencers, &config)
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["inf1", "inf2", "inf0"]);
    }

    #[test]
    fn test_tier_performance_covers_every_tier() {
        let s = influencer("Hsaka", Tier::S);
        let d = influencer("Degen", Tier::D);
        let mut state = LedgerState::default();
        state.signals = vec![
            signal("BTC", Some(&s), Outcome::Win, Some(5.0)),
            signal("ETH", Some(&s), Outcome::Loss, Some(-2.0)),
            signal("SOL", Some(&s), Outcome::Pending, None),
            signal("DOGE", Some(&d), Outcome::Loss, Some(-30.0)),
            signal("PEPE", None, Outcome::Win, Some(90.0)),
        ];
        state.influencers = vec![s, d];

        let rows = tier_performance(&state);
        assert_eq!(rows.len(), 5);
        assert_eq!(
            rows.iter().map(|r| r.tier).collect::<Vec<_>>(),
            Tier::ALL.to_vec()
        );

        assert_eq!(rows[0].influencers, 1);
        assert_eq!((rows[0].completed, rows[0].wins), (2, 1));
        assert_eq!(rows[0].win_rate, 50.0);

        assert_eq!(rows[1].influencers, 0);
        assert_eq!(rows[1].win_rate, 0.0);

        assert_eq!((rows[4].completed, rows[4].wins), (1, 0));
        let counted: usize = rows.iter().map(|r| r.completed).sum();
        assert_eq!(counted, 3);
    }

    #[test]
    fn test_asset_performance_ranking() {
        let signals = vec![
            signal("ETH", None, Outcome::Loss, Some(-5.0)),
            signal("BTC", None, Outcome::Win, Some(10.0)),
            signal("ETH", None, Outcome::Win, Some(8.0)),
            signal("BTC", None, Outcome::Win, Some(4.5)),
            signal("SOL", None, Outcome::Loss, Some(-1.0)),
            signal("LINK", None, Outcome::Pending, None),
            signal("AVAX", None, Outcome::Win, Some(3.0)),
            signal("AVAX", None, Outcome::Loss, Some(-3.0)),
        ];

        let assets = asset_performance(&signals, 5);
        let coins: Vec<&str> = assets.iter().map(|a| a.coin.as_str()).collect();
        assert_eq!(coins, vec!["BTC", "ETH", "AVAX", "SOL"]);

        assert_eq!(assets[0].total, 2);
        assert_eq!(assets[0].win_rate, 100.0);
        assert_eq!(assets[0].total_pnl, 14.5);
        assert_eq!(assets[0].avg_pnl, 7.25);
        assert_eq!(assets[1].avg_pnl, 1.5);

        assert_eq!(asset_performance(&signals, 2).len(), 2);
    }

    #[test]
    fn test_asset_ranking_uses_exact_win_ratio() {
        // 5/28 and 7/39 both display as 17.9%
        let mut signals = Vec::new();
        for (coin, wins, total) in [("DOGE", 5, 28), ("PEPE", 7, 39)] {
            for i in 0..total {
                let (outcome, pnl) = if i < wins {
                    (Outcome::Win, 5.0)
                } else {
                    (Outcome::Loss, -1.0)
                };
                signals.push(signal(coin, None, outcome, Some(pnl)));
            }
        }

        let assets = asset_performance(&signals, 5);
        assert_eq!(assets[0].win_rate, assets[1].win_rate);
        assert_eq!(assets[0].coin, "PEPE");
        assert_eq!(assets[1].coin, "DOGE");
    }
}
