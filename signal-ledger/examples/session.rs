//! Example: a persisted ledger session

use common::{Action, Outcome, Tier};
use signal_ledger::{
    recent_signals, InfluencerDraft, JsonFileStore, LedgerSession, SignalDraft,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("ct-tracker-data.json");

    // Example 1: first session creates the file
    let mut session = LedgerSession::open(JsonFileStore::new(&path)).await;
    session
        .apply(|ledger| ledger.add_influencer(InfluencerDraft::new("Ansem", "@blknoiz06", Tier::S)))
        .await?;

    let settings = session.ledger().settings();
    let signal = session
        .apply(|ledger| {
            ledger.create_signal(
                &SignalDraft::new("Ansem", "sol", Action::Long, "142.50").with_stop("130"),
                settings,
            )
        })
        .await?;
    println!(
        "Logged {} {} @ {} ({} units)",
        signal.action, signal.coin, signal.entry_price, signal.position_size
    );

    // Example 2: a later session picks up where the first left off
    let mut session = LedgerSession::open(JsonFileStore::new(&path)).await;
    let resolved = session
        .apply(|ledger| ledger.resolve_signal(signal.id, Outcome::Win, 171.0))
        .await?;
    println!("Resolved {} with {:+.2}%", resolved.coin, resolved.pnl.unwrap_or(0.0));

    let ansem = &session.ledger().influencers()[0];
    println!(
        "{}: {} calls, {:.1}% win rate, {:+.2}% avg",
        ansem.name, ansem.total_calls, ansem.win_rate, ansem.avg_return
    );

    for s in recent_signals(session.ledger().state(), 5) {
        println!(
            "  {} {} {} {}",
            s.timestamp.format("%Y-%m-%d %H:%M"),
            s.influencer,
            s.coin,
            s.outcome
        );
    }

    Ok(())
}
