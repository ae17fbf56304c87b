//! Build a small ledger and print the performance report

use analytics::{AnalyticsConfig, ConfluenceConfig, PerformanceReport};
use common::{Action, Outcome, Tier};
use signal_ledger::{InfluencerDraft, SignalDraft, SignalLedger};

fn main() -> anyhow::Result<()> {
    let mut ledger = SignalLedger::new();
    ledger.add_influencer(InfluencerDraft::new("Hsaka", "@HsakaTrades", Tier::S))?;
    ledger.add_influencer(InfluencerDraft::new("Cobie", "@cobie", Tier::A))?;
    ledger.add_influencer(InfluencerDraft::new("Degen", "@degen", Tier::D))?;

    let settings = ledger.settings();
    let btc = ledger.create_signal(
        &SignalDraft::new("Hsaka", "BTC", Action::Long, "64000").with_stop("61500"),
        settings,
    )?;
    ledger.create_signal(&SignalDraft::new("Hsaka", "SOL", Action::Buy, "150"), settings)?;
    ledger.create_signal(&SignalDraft::new("Cobie", "SOL", Action::Buy, "148"), settings)?;
    let doge_call = SignalDraft::new("Degen", "DOGE", Action::Long, "0.16");
    let doge = ledger.create_signal(&doge_call, settings)?;

    ledger.resolve_signal(btc.id, Outcome::Win, 70_400.0)?;
    ledger.resolve_signal(doge.id, Outcome::Loss, 0.12)?;

    let report = PerformanceReport::build(
        ledger.state(),
        &AnalyticsConfig::default(),
        &ConfluenceConfig::default(),
    );

    println!("=== Performance Report ===\n");
    println!(
        "Signals: {} ({} pending, {} completed)",
        report.stats.total, report.stats.pending, report.stats.completed
    );
    println!("Win rate: {:.1}%", report.stats.win_rate);
    println!("Total P&L: {:+.2}%", report.stats.total_pnl);
    println!("Best / worst: {:+.2}% / {:+.2}%\n", report.best_trade, report.worst_trade);

    for tier in &report.tiers {
        println!(
            "  Tier {}: {} influencers, {}/{} wins ({:.1}%)",
            tier.tier, tier.influencers, tier.wins, tier.completed, tier.win_rate
        );
    }

    println!();
    for play in &report.confluence {
        println!("  Confluence {}: {} sources", play.coin, play.count);
    }

    println!("\n{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
