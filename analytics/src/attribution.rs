use common::{round_dp, Outcome, Signal};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Ledger-wide outcome and P&L summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub wins: usize,
    pub losses: usize,
    /// wins / (wins + losses), one decimal
    pub win_rate: f64,
    /// Sum of P&L over completed signals, two decimals
    pub total_pnl: f64,
    pub avg_pnl: f64,
}

/// Outcome counts and P&L totals across every signal
pub fn global_stats(signals: &[Signal]) -> GlobalStats {
    let mut stats = GlobalStats {
        total: signals.len(),
        ..Default::default()
    };
    let mut pnl_sum = 0.0;

    for signal in signals {
        match signal.outcome {
            Outcome::Pending => stats.pending += 1,
            Outcome::Win => stats.wins += 1,
            Outcome::Loss => stats.losses += 1,
        }
        if signal.is_resolved() {
            pnl_sum += signal.pnl.unwrap_or(0.0);
        }
    }

    stats.completed = stats.wins + stats.losses;
    stats.win_rate = percentage(stats.wins, stats.completed);
    stats.total_pnl = round_dp(pnl_sum, 2);
    stats.avg_pnl = if stats.completed > 0 {
        round_dp(pnl_sum / stats.completed as f64, 2)
    } else {
        0.0
    };
    stats
}

/// Best and worst recorded P&L
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeExtremes {
    pub best_trade: f64,
    pub worst_trade: f64,
}

/// Max and min P&L over signals that carry one; both 0 when none do
pub fn trade_extremes(signals: &[Signal]) -> TradeExtremes {
    let pnls: Vec<f64> = signals.iter().filter_map(|s| s.pnl).collect();
    if pnls.is_empty() {
        return TradeExtremes::default();
    }

    TradeExtremes {
        best_trade: Statistics::max(pnls.iter()),
        worst_trade: Statistics::min(pnls.iter()),
    }
}

/// `part / whole × 100` with one decimal; 0 for an empty whole
pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_dp(part as f64 / whole as f64 * 100.0, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::signal;

    #[test]
    fn test_global_stats() {
        let signals = vec![
            signal("BTC", None, Outcome::Win, Some(10.0)),
            signal("ETH", None, Outcome::Loss, Some(-4.5)),
            signal("SOL", None, Outcome::Win, Some(2.25)),
            signal("BTC", None, Outcome::Pending, None),
        ];

        let stats = global_stats(&signals);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.completed, 3);
        assert_eq!((stats.wins, stats.losses), (2, 1));
        assert_eq!(stats.win_rate, 66.7);
        assert_eq!(stats.total_pnl, 7.75);
        assert_eq!(stats.avg_pnl, 2.58);
    }

    #[test]
    fn test_empty_ledger_is_all_zero() {
        assert_eq!(global_stats(&[]), GlobalStats::default());
        assert_eq!(trade_extremes(&[]), TradeExtremes::default());
    }

    #[test]
    fn test_trade_extremes() {
        let signals = vec![
            signal("BTC", None, Outcome::Win, Some(31.4)),
            signal("ETH", None, Outcome::Loss, Some(-12.0)),
            signal("SOL", None, Outcome::Pending, None),
        ];
        let extremes = trade_extremes(&signals);
        assert_eq!(extremes.best_trade, 31.4);
        assert_eq!(extremes.worst_trade, -12.0);
    }

    #[test]
    fn test_single_losing_trade_is_both_extremes() {
        let signals = vec![signal("BTC", None, Outcome::Loss, Some(-3.0))];
        let extremes = trade_extremes(&signals);
        assert_eq!(extremes.best_trade, -3.0);
        assert_eq!(extremes.worst_trade, -3.0);
    }
}
