//! Human-readable and JSON rendering for command results

use analytics::{ConfluencePlay, PerformanceReport};
use anyhow::Result;
use common::{Influencer, LedgerState, PortfolioSettings, Signal};
use portfolio_risk::SizeRecommendation;
use serde::Serialize;

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn price(value: f64) -> String {
    if value > 0.0 {
        format!("{}", value)
    } else {
        "-".to_string()
    }
}

pub fn print_signal_created(signal: &Signal) {
    println!(
        "Logged {} {} by {} @ {} [{}]",
        signal.action, signal.coin, signal.influencer, signal.entry_price, signal.id
    );
    println!(
        "  target {}  stop {}  size {}",
        price(signal.target_price),
        price(signal.stop_loss),
        if signal.position_size > 0.0 {
            format!("{:.2} units", signal.position_size)
        } else {
            "n/a (no stop)".to_string()
        }
    );
}

pub fn print_signal_resolved(signal: &Signal, state: &LedgerState) {
    println!(
        "Resolved {} {} as {} at {}: {:+.2}%",
        signal.action,
        signal.coin,
        signal.outcome,
        signal.exit_price.unwrap_or(0.0),
        signal.pnl.unwrap_or(0.0)
    );

    match state.influencer_for(signal) {
        Some(inf) => println!(
            "  {} now {}W/{}L, {:.1}% win rate, {:+.2}% avg return",
            inf.name, inf.wins, inf.losses, inf.win_rate, inf.avg_return
        ),
        None => println!("  {} is no longer tracked; stats unchanged", signal.influencer),
    }
}

pub fn print_settings(settings: PortfolioSettings) {
    println!("Portfolio value: ${:.2}", settings.portfolio_value);
    println!("Risk per trade:  {}%", settings.risk_per_trade);
    println!(
        "Risk amount:     ${:.2}",
        settings.portfolio_value * settings.risk_per_trade / 100.0
    );
}

pub fn print_influencers(influencers: &[&Influencer], json: bool) -> Result<()> {
    if json {
        return print_json(influencers);
    }
    if influencers.is_empty() {
        println!("No influencers tracked");
        return Ok(());
    }

    println!(
        "{:<4} {:<20} {:<18} {:>6} {:>5} {:>5} {:>8} {:>9}",
        "TIER", "NAME", "HANDLE", "CALLS", "WINS", "LOSS", "WIN %", "AVG %"
    );
    for inf in influencers {
        println!(
            "{:<4} {:<20} {:<18} {:>6} {:>5} {:>5} {:>8.1} {:>+9.2}",
            inf.tier,
            inf.name,
            inf.handle,
            inf.total_calls,
            inf.wins,
            inf.losses,
            inf.win_rate,
            inf.avg_return
        );
    }
    Ok(())
}

pub fn print_signals(signals: &[&Signal], json: bool) -> Result<()> {
    if json {
        return print_json(signals);
    }
    if signals.is_empty() {
        println!("No signals match");
        return Ok(());
    }

    for s in signals {
        let result = match s.pnl {
            Some(pnl) => format!("{} {:+.2}%", s.outcome, pnl),
            None => s.outcome.to_string(),
        };
        println!(
            "{}  {:<16} {:<5} {:<8} @ {:<12} {:<16} {}",
            s.timestamp.format("%Y-%m-%d %H:%M"),
            s.influencer,
            s.action,
            s.coin,
            s.entry_price,
            result,
            s.id
        );
    }
    Ok(())
}

pub fn print_confluence(plays: &[ConfluencePlay], json: bool) -> Result<()> {
    if json {
        return print_json(plays);
    }
    if plays.is_empty() {
        println!("No confluence among trusted sources");
        return Ok(());
    }

    for play in plays {
        let sources: Vec<&str> = play.signals.iter().map(|s| s.influencer.as_str()).collect();
        println!("{:<8} {} sources: {}", play.coin, play.count, sources.join(", "));
    }
    Ok(())
}

pub fn print_size(rec: &SizeRecommendation, settings: PortfolioSettings, json: bool) -> Result<()> {
    if json {
        return print_json(&serde_json::json!({
            "portfolioValue": settings.portfolio_value,
            "riskPerTrade": settings.risk_per_trade,
            "units": rec.units,
            "riskAmount": rec.risk_amount,
            "riskPerUnit": rec.risk_per_unit,
            "notional": rec.notional,
        }));
    }

    if rec.units <= 0.0 {
        println!("No position size: stop missing or equal to entry");
    } else {
        println!("Units:         {:.2}", rec.units);
        println!("Notional:      ${:.2}", rec.notional);
    }
    println!("Risk amount:   ${:.2}", rec.risk_amount);
    println!("Risk per unit: ${}", rec.risk_per_unit);
    Ok(())
}

pub fn print_report(report: &PerformanceReport, json: bool) -> Result<()> {
    if json {
        return print_json(report);
    }

    let stats = &report.stats;
    println!("=== Performance Report ===\n");
    println!(
        "Signals: {} total, {} pending, {} completed",
        stats.total, stats.pending, stats.completed
    );
    println!(
        "Record:  {}W/{}L ({:.1}% win rate)",
        stats.wins, stats.losses, stats.win_rate
    );
    println!(
        "P&L:     {:+.2}% total, {:+.2}% avg",
        stats.total_pnl, stats.avg_pnl
    );
    println!(
        "Best:    {:+.2}%   Worst: {:+.2}%",
        report.best_trade, report.worst_trade
    );

    println!("\nTop performers");
    if report.top_performers.is_empty() {
        println!("  (none with enough calls yet)");
    }
    for (rank, inf) in report.top_performers.iter().enumerate() {
        println!(
            "  {}. {} [{}] {:.1}% over {} calls, {:+.2}% avg",
            rank + 1,
            inf.name,
            inf.tier,
            inf.win_rate,
            inf.total_calls,
            inf.avg_return
        );
    }

    println!("\nBy tier");
    for tier in &report.tiers {
        println!(
            "  {}  {:>3} influencers  {:>4} completed  {:>4} wins  {:>5.1}%",
            tier.tier, tier.influencers, tier.completed, tier.wins, tier.win_rate
        );
    }

    println!("\nBy asset");
    if report.assets.is_empty() {
        println!("  (no completed signals)");
    }
    for asset in &report.assets {
        println!(
            "  {:<8} {}/{} wins  {:>5.1}%  {:+.2}% total  {:+.2}% avg",
            asset.coin, asset.wins, asset.total, asset.win_rate, asset.total_pnl, asset.avg_pnl
        );
    }

    println!("\nConfluence");
    if report.confluence.is_empty() {
        println!("  (none)");
    }
    for play in &report.confluence {
        println!("  {:<8} {} sources", play.coin, play.count);
    }
    Ok(())
}
