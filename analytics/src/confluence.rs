// Confluence detection
// Pending calls on the same coin from several trusted influencers

use common::{LedgerState, Signal, Uuid};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::config::ConfluenceConfig;

/// A coin with enough independent trusted calls behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfluencePlay {
    pub coin: String,
    /// Distinct influencers, or raw signals when deduplication is off
    pub count: usize,
    /// Contributing signals in log order
    pub signals: Vec<Signal>,
}

/// Group qualifying pending signals by coin and keep groups that reach
/// `min_sources`, strongest first.
///
/// Only signals whose influencer still exists and sits in a configured tier
/// contribute. Equal counts keep the order in which each coin first
/// appears among qualifying signals.
pub fn detect_confluence(state: &LedgerState, config: &ConfluenceConfig) -> Vec<ConfluencePlay> {
    let mut groups: Vec<(&str, Vec<&Signal>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for signal in state.signals.iter().filter(|s| s.is_pending()) {
        let trusted = state
            .influencer_for(signal)
            .map_or(false, |inf| config.includes(inf.tier));
        if !trusted {
            continue;
        }

        let slot = *index.entry(signal.coin.as_str()).or_insert_with(|| {
            groups.push((signal.coin.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(signal);
    }

    let mut plays: Vec<ConfluencePlay> = groups
        .into_iter()
        .filter_map(|(coin, members)| {
            let count = if config.dedupe_by_source {
                members
                    .iter()
                    .filter_map(|s| s.influencer_id)
                    .collect::<HashSet<Uuid>>()
                    .len()
            } else {
                members.len()
            };

            if count < config.min_sources {
                return None;
            }
            Some(ConfluencePlay {
                coin: coin.to_string(),
                count,
                signals: members.into_iter().cloned().collect(),
            })
        })
        .collect();

    plays.sort_by(|a, b| b.count.cmp(&a.count));

    debug!(plays = plays.len(), min_sources = config.min_sources, "Confluence detected");
    plays
}
