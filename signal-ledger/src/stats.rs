// Influencer rolling statistics
// Incremental update on resolution and batch recompute from signal history

use common::{round_dp, Influencer, Outcome, Signal};
use statrs::statistics::Statistics;
use tracing::debug;

/// Win percentage with one decimal; 0 when nothing has resolved
pub fn win_rate(wins: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_dp(wins as f64 / total as f64 * 100.0, 1)
}

/// Fold one resolution into the influencer's rolling statistics.
///
/// `total` is taken after the increment, so the running mean divides by
/// the new sample count.
pub fn apply_resolution(influencer: &mut Influencer, outcome: Outcome, pnl: f64) {
    match outcome {
        Outcome::Win => influencer.wins += 1,
        Outcome::Loss => influencer.losses += 1,
        Outcome::Pending => return,
    }

    let total = influencer.resolved();
    influencer.win_rate = win_rate(influencer.wins, total);
    influencer.avg_return = round_dp(
        (influencer.avg_return * (total - 1) as f64 + pnl) / total as f64,
        2,
    );

    debug!(
        influencer = %influencer.name,
        wins = influencer.wins,
        losses = influencer.losses,
        win_rate = influencer.win_rate,
        avg_return = influencer.avg_return,
        "Applied resolution"
    );
}

/// Rebuild every statistic from the signals attributed to `influencer`.
///
/// `totalCalls` becomes the number of signals, `avgReturn` the arithmetic
/// mean of the recorded P&L of resolved ones.
pub fn recompute<'a>(influencer: &mut Influencer, signals: impl IntoIterator<Item = &'a Signal>) {
    let signals: Vec<&Signal> = signals.into_iter().collect();
    influencer.total_calls = signals.len() as u32;
    recompute_resolved(influencer, signals);
}

/// Rebuild wins, losses, win rate and average return from resolved
/// signals, leaving `totalCalls` alone. Pending signals are skipped.
pub fn recompute_resolved<'a>(
    influencer: &mut Influencer,
    signals: impl IntoIterator<Item = &'a Signal>,
) {
    let mut wins = 0;
    let mut losses = 0;
    let mut pnls = Vec::new();

    for signal in signals {
        match signal.outcome {
            Outcome::Win => wins += 1,
            Outcome::Loss => losses += 1,
            Outcome::Pending => continue,
        }
        pnls.push(signal.pnl.unwrap_or(0.0));
    }

    influencer.wins = wins;
    influencer.losses = losses;
    influencer.win_rate = win_rate(wins, wins + losses);
    influencer.avg_return = if pnls.is_empty() {
        0.0
    } else {
        round_dp(pnls.iter().mean(), 2)
    };

    debug!(
        influencer = %influencer.name,
        wins,
        losses,
        avg_return = influencer.avg_return,
        "Recomputed resolved statistics"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Action, Tier, Utc, Uuid};

    fn resolved_signal(influencer: &Influencer, outcome: Outcome, pnl: f64) -> Signal {
        Signal {
            id: Uuid::new_v4(),
            influencer_id: Some(influencer.id),
            influencer: influencer.name.clone(),
            coin: "ETH".to_string(),
            action: Action::Buy,
            entry_price: 100.0,
            target_price: 0.0,
            stop_loss: 0.0,
            position_size: 0.0,
            outcome,
            exit_price: Some(100.0 + pnl),
            pnl: Some(pnl),
            timestamp: Utc::now(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_first_win() {
        let mut inf = Influencer::new("Hsaka", "@HsakaTrades", Tier::S);
        apply_resolution(&mut inf, Outcome::Win, 10.0);

        assert_eq!(inf.wins, 1);
        assert_eq!(inf.losses, 0);
        assert_eq!(inf.win_rate, 100.0);
        assert_eq!(inf.avg_return, 10.0);
    }

    #[test]
    fn test_pending_is_ignored() {
        let mut inf = Influencer::new("Hsaka", "@HsakaTrades", Tier::S);
        apply_resolution(&mut inf, Outcome::Pending, 50.0);
        assert_eq!(inf.resolved(), 0);
        assert_eq!(inf.avg_return, 0.0);
    }

    #[test]
    fn test_incremental_matches_batch() {
        let sequence = [
            (Outcome::Win, 10.0),
            (Outcome::Loss, -4.0),
            (Outcome::Win, 6.0),
            (Outcome::Loss, 0.0),
            (Outcome::Win, 8.0),
            (Outcome::Loss, -2.0),
        ];

        let mut inf = Influencer::new("Cobie", "@cobie", Tier::A);
        for (outcome, pnl) in sequence {
            apply_resolution(&mut inf, outcome, pnl);
        }

        let wins = sequence.iter().filter(|(o, _)| *o == Outcome::Win).count() as f64;
        let mean = sequence.iter().map(|(_, p)| *p).sum::<f64>() / sequence.len() as f64;

        assert_eq!(inf.win_rate, 100.0 * wins / sequence.len() as f64);
        assert_eq!(inf.avg_return, mean);
    }

    #[test]
    fn test_incremental_stays_close_with_rounding() {
        let pnls = [12.5, -3.3, 7.1, 2.0, -8.4, 5.55, 1.0, -0.75];

        let mut inf = Influencer::new("Cobie", "@cobie", Tier::A);
        for pnl in pnls {
            let outcome = if pnl >= 0.0 { Outcome::Win } else { Outcome::Loss };
            apply_resolution(&mut inf, outcome, pnl);
        }

        let mean = pnls.iter().sum::<f64>() / pnls.len() as f64;
        assert!((inf.avg_return - mean).abs() < 0.01);
        assert_eq!(inf.win_rate, 62.5);
    }

    #[test]
    fn test_recompute_resolved_keeps_call_count() {
        let mut inf = Influencer::new("Cobie", "@cobie", Tier::A);
        inf.total_calls = 7;
        let signals = [
            resolved_signal(&inf, Outcome::Win, 10.0),
            resolved_signal(&inf, Outcome::Loss, -4.0),
        ];

        recompute_resolved(&mut inf, &signals);
        assert_eq!(inf.total_calls, 7);
        assert_eq!(inf.wins, 1);
        assert_eq!(inf.losses, 1);
        assert_eq!(inf.win_rate, 50.0);
        assert_eq!(inf.avg_return, 3.0);

        recompute_resolved(&mut inf, std::iter::empty());
        assert_eq!(inf.resolved(), 0);
        assert_eq!(inf.win_rate, 0.0);
        assert_eq!(inf.avg_return, 0.0);
    }

    #[test]
    fn test_recompute_from_history() {
        let mut inf = Influencer::new("Ansem", "@blknoiz06", Tier::S);
        let mut signals = vec![
            resolved_signal(&inf, Outcome::Win, 20.0),
            resolved_signal(&inf, Outcome::Loss, -5.0),
            resolved_signal(&inf, Outcome::Win, 3.5),
        ];
        let mut pending = resolved_signal(&inf, Outcome::Pending, 0.0);
        pending.pnl = None;
        pending.exit_price = None;
        signals.push(pending);

        // Corrupted intermediate values are overwritten
        inf.avg_return = 999.0;
        inf.wins = 40;

        recompute(&mut inf, &signals);
        assert_eq!(inf.total_calls, 4);
        assert_eq!(inf.wins, 2);
        assert_eq!(inf.losses, 1);
        assert_eq!(inf.win_rate, 66.7);
        assert_eq!(inf.avg_return, 6.17);
    }
}
