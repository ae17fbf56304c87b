// Signal queries
// Read-only filtering and ordering over the signal log

use common::{LedgerError, LedgerState, Outcome, Signal, Tier, Uuid};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Ordering applied after filtering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSort {
    /// Newest timestamp first
    #[default]
    Recent,
    /// Highest P&L first; unresolved signals count as 0
    Pnl,
}

impl FromStr for SignalSort {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recent" => Ok(SignalSort::Recent),
            "pnl" => Ok(SignalSort::Pnl),
            _ => Err(LedgerError::invalid_value("sort", s)),
        }
    }
}

/// Conjunction of optional criteria. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalFilter {
    pub tier: Option<Tier>,
    pub outcome: Option<Outcome>,
    pub influencer_id: Option<Uuid>,
    /// Case-insensitive match on the asset symbol
    pub coin: Option<String>,
}

impl SignalFilter {
    pub fn tier(mut self, tier: Tier) -> Self {
        self.tier = Some(tier);
        self
    }

    pub fn outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn influencer(mut self, id: Uuid) -> Self {
        self.influencer_id = Some(id);
        self
    }

    pub fn coin(mut self, coin: impl Into<String>) -> Self {
        self.coin = Some(coin.into());
        self
    }

    /// Tier matching goes through the influencer join, so orphaned signals
    /// never match a tier filter.
    pub fn matches(&self, state: &LedgerState, signal: &Signal) -> bool {
        if let Some(outcome) = self.outcome {
            if signal.outcome != outcome {
                return false;
            }
        }
        if let Some(id) = self.influencer_id {
            if signal.influencer_id != Some(id) {
                return false;
            }
        }
        if let Some(coin) = &self.coin {
            if !signal.coin.eq_ignore_ascii_case(coin.trim()) {
                return false;
            }
        }
        if let Some(tier) = self.tier {
            match state.influencer_for(signal) {
                Some(influencer) if influencer.tier == tier => {}
                _ => return false,
            }
        }
        true
    }
}

/// Signals matching `filter`, ordered by `sort`. Both orderings are stable.
pub fn filter_signals<'a>(
    state: &'a LedgerState,
    filter: &SignalFilter,
    sort: SignalSort,
) -> Vec<&'a Signal> {
    let mut matched: Vec<&Signal> = state
        .signals
        .iter()
        .filter(|s| filter.matches(state, s))
        .collect();

    match sort {
        SignalSort::Recent => matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        SignalSort::Pnl => matched.sort_by(|a, b| {
            let (a, b) = (a.pnl.unwrap_or(0.0), b.pnl.unwrap_or(0.0));
            b.partial_cmp(&a).unwrap_or(Ordering::Equal)
        }),
    }
    matched
}

/// The `n` most recent signals by timestamp
pub fn recent_signals(state: &LedgerState, n: usize) -> Vec<&Signal> {
    let mut signals = filter_signals(state, &SignalFilter::default(), SignalSort::Recent);
    signals.truncate(n);
    signals
}
