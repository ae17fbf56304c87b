// Subcommand handlers
// Each mutation runs as load, mutate, commit through a LedgerSession

use analytics::{detect_confluence, ConfluenceConfig, PerformanceReport};
use anyhow::{bail, Context, Result};
use common::{LedgerResult, PortfolioSettings, Uuid};
use portfolio_risk::PositionSizer;
use signal_ledger::validators::{parse_optional_price, parse_required_price};
use signal_ledger::{
    filter_signals, InfluencerDraft, InfluencerRef, JsonFileStore, LedgerSession, SignalDraft,
    SignalFilter, SignalLedger,
};
use tracing::{info, warn};

use crate::config::{save_config, TrackerConfig};
use crate::output;
use crate::{Cli, Commands};

type Session = LedgerSession<JsonFileStore>;

pub async fn run(cli: Cli, config: TrackerConfig) -> Result<()> {
    match cli.command {
        Commands::InitConfig { output, force } => {
            let path = output.unwrap_or(cli.config);
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            save_config(&config, &path)?;
            println!("Wrote {}", path.display());
        }

        Commands::AddInfluencer {
            name,
            handle,
            tier,
            twitter,
            followers,
            specialty,
            notes,
        } => {
            let draft = InfluencerDraft {
                name,
                handle,
                tier,
                twitter,
                followers,
                specialty,
                notes,
            };
            let mut session = open_session(&config).await;
            let influencer = apply(&mut session, |ledger| ledger.add_influencer(draft)).await?;
            println!(
                "Added {} ({}) tier {} [{}]",
                influencer.name, influencer.handle, influencer.tier, influencer.id
            );
        }

        Commands::RemoveInfluencer { influencer } => {
            let mut session = open_session(&config).await;
            let id = influencer_id(session.ledger(), &influencer)?;
            let removed = apply(&mut session, |ledger| ledger.remove_influencer(id)).await?;
            println!("Removed {}", removed.name);
        }

        Commands::RenameInfluencer {
            influencer,
            new_name,
        } => {
            let mut session = open_session(&config).await;
            let id = influencer_id(session.ledger(), &influencer)?;
            apply(&mut session, |ledger| ledger.rename_influencer(id, &new_name)).await?;
            println!("Renamed {} to {}", influencer, new_name.trim());
        }

        Commands::SetTier { influencer, tier } => {
            let mut session = open_session(&config).await;
            let id = influencer_id(session.ledger(), &influencer)?;
            apply(&mut session, |ledger| ledger.set_tier(id, tier)).await?;
            println!("{} is now tier {}", influencer, tier);
        }

        Commands::AddSignal {
            influencer,
            coin,
            action,
            entry,
            target,
            stop,
            at,
            notes,
        } => {
            let draft = SignalDraft {
                influencer,
                coin,
                action,
                entry_price: entry,
                target_price: target,
                stop_loss: stop,
                timestamp: at,
                notes,
            };
            let mut session = open_session(&config).await;
            let settings = session.ledger().settings();
            let signal =
                apply(&mut session, |ledger| ledger.create_signal(&draft, settings)).await?;
            output::print_signal_created(&signal);
        }

        Commands::Resolve {
            signal,
            outcome,
            exit_price,
        } => {
            let exit = parse_required_price("exitPrice", &exit_price)?;
            let mut session = open_session(&config).await;
            let resolved =
                apply(&mut session, |ledger| ledger.resolve_signal(signal, outcome, exit)).await?;
            output::print_signal_resolved(&resolved, session.ledger().state());
        }

        Commands::DeleteSignal { signal } => {
            let mut session = open_session(&config).await;
            let removed = apply(&mut session, |ledger| ledger.delete_signal(signal)).await?;
            println!(
                "Deleted {} {} by {}",
                removed.action, removed.coin, removed.influencer
            );
        }

        Commands::Settings {
            portfolio_value,
            risk_per_trade,
        } => {
            let mut session = open_session(&config).await;
            let current = session.ledger().settings();
            if portfolio_value.is_some() || risk_per_trade.is_some() {
                let updated = PortfolioSettings::new(
                    portfolio_value.unwrap_or(current.portfolio_value),
                    risk_per_trade.unwrap_or(current.risk_per_trade),
                );
                apply(&mut session, |ledger| ledger.update_settings(updated)).await?;
            }
            output::print_settings(session.ledger().settings());
        }

        Commands::List {
            influencers,
            tier,
            outcome,
            influencer,
            coin,
            sort,
            limit,
            json,
        } => {
            let session = open_session(&config).await;
            let ledger = session.ledger();

            if influencers {
                let mut listed: Vec<_> = ledger
                    .influencers()
                    .iter()
                    .filter(|inf| tier.map_or(true, |t| inf.tier == t))
                    .collect();
                listed.sort_by_key(|inf| inf.tier);
                if let Some(limit) = limit {
                    listed.truncate(limit);
                }
                return output::print_influencers(&listed, json);
            }

            let filter = SignalFilter {
                tier,
                outcome,
                influencer_id: influencer
                    .as_deref()
                    .map(|reference| influencer_id(ledger, reference))
                    .transpose()?,
                coin,
            };
            let mut signals = filter_signals(ledger.state(), &filter, sort);
            if let Some(limit) = limit {
                signals.truncate(limit);
            }
            output::print_signals(&signals, json)?;
        }

        Commands::Report { json } => {
            let session = open_session(&config).await;
            let report = PerformanceReport::build(
                session.ledger().state(),
                &config.analytics,
                &config.confluence,
            );
            output::print_report(&report, json)?;
        }

        Commands::Confluence { min_sources, json } => {
            let confluence = ConfluenceConfig {
                min_sources: min_sources.unwrap_or(config.confluence.min_sources),
                ..config.confluence.clone()
            };
            let session = open_session(&config).await;
            let plays = detect_confluence(session.ledger().state(), &confluence);
            output::print_confluence(&plays, json)?;
        }

        Commands::Size {
            entry,
            stop,
            portfolio_value,
            risk_per_trade,
            json,
        } => {
            let entry = parse_required_price("entryPrice", &entry)?;
            let stop = parse_optional_price("stopLoss", &stop)?;

            let session = open_session(&config).await;
            let stored = session.ledger().settings();
            let settings = PortfolioSettings::new(
                portfolio_value.unwrap_or(stored.portfolio_value),
                risk_per_trade.unwrap_or(stored.risk_per_trade),
            );
            settings.validate()?;

            let recommendation = PositionSizer::new(settings).recommend(entry, stop);
            output::print_size(&recommendation, settings, json)?;
        }

        Commands::Export { output } => {
            let session = open_session(&config).await;
            let document = session.ledger().export_document()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, document)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(path = %path.display(), "Ledger exported");
                    println!("Exported to {}", path.display());
                }
                None => println!("{}", document),
            }
        }

        Commands::Import { input } => {
            let document = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let mut session = open_session(&config).await;
            apply(&mut session, |ledger| ledger.import_document(&document)).await?;

            let state = session.ledger().state();
            println!(
                "Imported {} influencers and {} signals",
                state.influencers.len(),
                state.signals.len()
            );
            let orphans = state.orphaned_signals().count();
            if orphans > 0 {
                warn!(orphans, "Imported signals without a matching influencer");
            }
        }

        Commands::Recompute { influencer, relink } => {
            let mut session = open_session(&config).await;
            let target = influencer
                .as_deref()
                .map(|reference| influencer_id(session.ledger(), reference))
                .transpose()?;

            let (relinked, rebuilt) = apply(&mut session, |ledger| {
                let relinked = if relink { ledger.relink_orphans() } else { 0 };
                let rebuilt = ledger.recompute_influencer_stats(target)?;
                Ok((relinked, rebuilt))
            })
            .await?;

            if relink {
                println!("Relinked {} orphaned signals", relinked);
            }
            println!("Recomputed stats for {} influencers", rebuilt);
        }
    }

    Ok(())
}

async fn open_session(config: &TrackerConfig) -> Session {
    let store = JsonFileStore::new(&config.storage.data_file);
    LedgerSession::open_with_defaults(store, config.fresh_state()).await
}

/// Run one mutation and fail the command if it did not reach the data file
async fn apply<T, F>(session: &mut Session, mutation: F) -> Result<T>
where
    F: FnOnce(&mut SignalLedger) -> LedgerResult<T>,
{
    let value = session.apply(mutation).await?;
    if session.has_unsaved_changes() {
        let path = session.store().path().display();
        if session.load_failed() {
            bail!("{} could not be loaded; fix or move it aside, nothing was saved", path);
        }
        bail!("change was not saved to {}", path);
    }
    Ok(value)
}

fn influencer_id(ledger: &SignalLedger, reference: &str) -> Result<Uuid> {
    let influencer = ledger.find_influencer(&InfluencerRef::parse(reference))?;
    Ok(influencer.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use common::Outcome;
    use signal_ledger::LedgerStore;
    use std::path::Path;

    async fn run_args(data_file: &Path, args: &[&str]) -> Result<()> {
        let data = data_file.to_string_lossy().to_string();
        let mut argv = vec![
            "ct-tracker",
            "--config",
            "does-not-exist.toml",
            "--data-file",
            data.as_str(),
        ];
        argv.extend_from_slice(args);

        let cli = Cli::try_parse_from(argv)?;
        let mut config = TrackerConfig::default();
        config.storage.data_file = data_file.to_path_buf();
        run(cli, config).await
    }

    async fn stored(data_file: &Path) -> common::LedgerState {
        JsonFileStore::new(data_file).load().await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_signal_lifecycle_through_cli() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("ledger.json");

        run_args(&data, &["add-influencer", "Hsaka", "--handle", "@HsakaTrades", "--tier", "S"])
            .await
            .unwrap();
        run_args(&data, &["add-signal", "Hsaka", "btc", "--entry", "100", "--stop", "95"])
            .await
            .unwrap();

        let state = stored(&data).await;
        assert_eq!(state.signals.len(), 1);
        assert_eq!(state.signals[0].position_size, 40.0);
        let id = state.signals[0].id.to_string();

        run_args(&data, &["resolve", &id, "win", "110"]).await.unwrap();

        let state = stored(&data).await;
        assert_eq!(state.signals[0].outcome, Outcome::Win);
        assert_eq!(state.signals[0].pnl, Some(10.0));
        assert_eq!(state.influencers[0].win_rate, 100.0);
        assert_eq!(state.influencers[0].avg_return, 10.0);

        assert!(run_args(&data, &["resolve", &id, "loss", "90"]).await.is_err());
        assert!(run_args(&data, &["report", "--json"]).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("ledger.json");

        run_args(&data, &["add-influencer", "Cobie", "--handle", "@cobie", "--tier", "A"])
            .await
            .unwrap();
        let before = stored(&data).await;

        let unknown = ["add-signal", "Nobody", "ETH", "--entry", "3000"];
        assert!(run_args(&data, &unknown).await.is_err());
        assert!(run_args(&data, &["add-signal", "Cobie", "ETH", "--entry", "abc"]).await.is_err());
        assert_eq!(stored(&data).await, before);
    }

    #[tokio::test]
    async fn test_mutation_fails_when_data_file_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("ledger.json");
        std::fs::write(&data, "{ truncated").unwrap();

        let err = run_args(&data, &["add-influencer", "Cobie", "--handle", "@cobie"])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("nothing was saved"));
        assert_eq!(std::fs::read_to_string(&data).unwrap(), "{ truncated");

        // Read-only commands still work against the fallback state
        assert!(run_args(&data, &["list", "--influencers"]).await.is_ok());
    }

    #[tokio::test]
    async fn test_settings_export_import() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("ledger.json");
        let export = dir.path().join("export.json");

        run_args(&data, &["settings", "--portfolio-value", "50000", "--risk-per-trade", "1"])
            .await
            .unwrap();
        run_args(&data, &["add-influencer", "Ansem", "--handle", "@blknoiz06", "--tier", "S"])
            .await
            .unwrap();
        run_args(&data, &["export", "--output", export.to_str().unwrap()])
            .await
            .unwrap();

        let other = dir.path().join("other.json");
        run_args(&other, &["import", export.to_str().unwrap()])
            .await
            .unwrap();

        let state = stored(&other).await;
        assert_eq!(state, stored(&data).await);
        assert_eq!(state.portfolio_value, 50_000.0);
        assert_eq!(state.risk_per_trade, 1.0);
    }

    #[tokio::test]
    async fn test_init_config_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("ledger.json");
        let cfg = dir.path().join("ct-tracker.toml");
        let cfg = cfg.to_str().unwrap();

        run_args(&data, &["init-config", "--output", cfg]).await.unwrap();
        assert!(run_args(&data, &["init-config", "--output", cfg]).await.is_err());
        run_args(&data, &["init-config", "--output", cfg, "--force"]).await.unwrap();

        let loaded = crate::config::load_config(Path::new(cfg)).unwrap();
        assert_eq!(loaded.storage.data_file, data);
        assert_eq!(loaded.confluence, ConfluenceConfig::default());
        assert_eq!(loaded.analytics, TrackerConfig::default().analytics);
    }
}
