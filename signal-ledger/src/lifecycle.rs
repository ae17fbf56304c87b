//! Signal lifecycle: creation, one-shot resolution and deletion, plus the
//! influencer bookkeeping each of them cascades into.

use chrono::Utc;
use common::{
    round_dp, Influencer, LedgerError, LedgerResult, LedgerState, Outcome, PortfolioSettings,
    Signal, Tier, Uuid,
};
use portfolio_risk::PositionSizer;
use tracing::{debug, info, warn};

use crate::stats;
use crate::validators::{InfluencerDraft, InfluencerRef, SignalDraft};

/// Owns the ledger state and is the only mutation path into it.
///
/// Every mutation takes `&mut self`; hosts that share a ledger across
/// threads must serialise access around it.
#[derive(Debug, Clone, Default)]
pub struct SignalLedger {
    state: LedgerState,
}

impl SignalLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: LedgerState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn into_state(self) -> LedgerState {
        self.state
    }

    pub fn influencers(&self) -> &[Influencer] {
        &self.state.influencers
    }

    pub fn signals(&self) -> &[Signal] {
        &self.state.signals
    }

    pub fn settings(&self) -> PortfolioSettings {
        self.state.settings()
    }

    // ------------------------------------------------------------------
    // Influencers
    // ------------------------------------------------------------------

    pub fn add_influencer(&mut self, draft: InfluencerDraft) -> LedgerResult<Influencer> {
        draft.validate()?;

        let name = draft.name.trim().to_string();
        if self.state.influencer_by_name(&name).is_some() {
            return Err(LedgerError::DuplicateInfluencer { name });
        }

        let mut influencer = Influencer::new(name, draft.handle.trim(), draft.tier);
        influencer.twitter = draft.twitter.trim().to_string();
        influencer.followers = draft.followers.trim().to_string();
        influencer.specialty = draft.specialty.trim().to_string();
        influencer.notes = draft.notes.trim().to_string();

        info!(
            influencer_id = %influencer.id,
            name = %influencer.name,
            tier = %influencer.tier,
            "Influencer added"
        );

        self.state.influencers.push(influencer.clone());
        Ok(influencer)
    }

    /// Remove an influencer. Their signals stay in the ledger as orphans.
    pub fn remove_influencer(&mut self, id: Uuid) -> LedgerResult<Influencer> {
        let index = self.influencer_index(id)?;
        let removed = self.state.influencers.remove(index);

        let orphaned = self
            .state
            .signals
            .iter()
            .filter(|s| s.influencer_id == Some(id))
            .count();

        info!(
            influencer_id = %id,
            name = %removed.name,
            orphaned,
            "Influencer removed"
        );
        Ok(removed)
    }

    /// Rename an influencer and refresh the display name on their signals
    pub fn rename_influencer(&mut self, id: Uuid, new_name: &str) -> LedgerResult<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(LedgerError::MissingField { field: "name" });
        }
        if let Some(existing) = self.state.influencer_by_name(new_name) {
            if existing.id != id {
                return Err(LedgerError::DuplicateInfluencer {
                    name: new_name.to_string(),
                });
            }
        }

        let index = self.influencer_index(id)?;
        let old_name =
            std::mem::replace(&mut self.state.influencers[index].name, new_name.to_string());

        for signal in self
            .state
            .signals
            .iter_mut()
            .filter(|s| s.influencer_id == Some(id))
        {
            signal.influencer = new_name.to_string();
        }

        info!(influencer_id = %id, from = %old_name, to = %new_name, "Influencer renamed");
        Ok(())
    }

    pub fn set_tier(&mut self, id: Uuid, tier: Tier) -> LedgerResult<()> {
        let index = self.influencer_index(id)?;
        let influencer = &mut self.state.influencers[index];
        let previous = std::mem::replace(&mut influencer.tier, tier);

        info!(influencer_id = %id, from = %previous, to = %tier, "Influencer re-tiered");
        Ok(())
    }

    /// Look up an influencer by id or exact name
    pub fn find_influencer(&self, reference: &InfluencerRef) -> LedgerResult<&Influencer> {
        let found = match reference {
            InfluencerRef::Id(id) => self.state.influencer(*id),
            InfluencerRef::Name(name) => self.state.influencer_by_name(name),
        };

        found.ok_or_else(|| LedgerError::UnknownInfluencerReference {
            reference: reference.to_string(),
        })
    }

    // ------------------------------------------------------------------
    // Signals
    // ------------------------------------------------------------------

    /// Validate a draft and append it as a pending signal.
    ///
    /// `settings` is the sizing snapshot for this signal only; the stored
    /// position size is never recomputed afterwards.
    pub fn create_signal(
        &mut self,
        draft: &SignalDraft,
        settings: PortfolioSettings,
    ) -> LedgerResult<Signal> {
        let validated = draft.validate()?;
        let (influencer_id, influencer_name) = {
            let influencer = self.find_influencer(&validated.influencer)?;
            (influencer.id, influencer.name.clone())
        };

        let position_size =
            PositionSizer::new(settings).units_for(validated.entry_price, validated.stop_loss);

        let signal = Signal {
            id: Uuid::new_v4(),
            influencer_id: Some(influencer_id),
            influencer: influencer_name,
            coin: validated.coin,
            action: validated.action,
            entry_price: validated.entry_price,
            target_price: validated.target_price,
            stop_loss: validated.stop_loss,
            position_size,
            outcome: Outcome::Pending,
            exit_price: None,
            pnl: None,
            timestamp: validated.timestamp.unwrap_or_else(Utc::now),
            notes: validated.notes,
        };

        self.state.signals.push(signal.clone());
        if let Some(influencer) = self.state.influencer_mut(influencer_id) {
            influencer.total_calls += 1;
        }

        info!(
            signal_id = %signal.id,
            influencer = %signal.influencer,
            coin = %signal.coin,
            action = %signal.action,
            entry = signal.entry_price,
            position_size = signal.position_size,
            "Signal created"
        );
        Ok(signal)
    }

    /// Resolve a pending signal to a win or a loss at `exit_price`.
    ///
    /// P&L is computed from the prices alone; the outcome label is taken
    /// as given and not checked against its sign.
    pub fn resolve_signal(
        &mut self,
        id: Uuid,
        outcome: Outcome,
        exit_price: f64,
    ) -> LedgerResult<Signal> {
        if !outcome.is_terminal() {
            return Err(LedgerError::InvalidOutcome { outcome });
        }
        if !exit_price.is_finite() || exit_price < 0.0 {
            return Err(LedgerError::invalid_numeric("exitPrice", exit_price.to_string()));
        }

        let index = self.signal_index(id)?;
        let signal = &mut self.state.signals[index];
        if signal.is_resolved() {
            return Err(LedgerError::AlreadyResolved {
                id,
                outcome: signal.outcome,
            });
        }
        if !signal.entry_price.is_finite() || signal.entry_price <= 0.0 {
            return Err(LedgerError::invalid_numeric(
                "entryPrice",
                signal.entry_price.to_string(),
            ));
        }

        let pnl = round_dp(
            (exit_price - signal.entry_price) / signal.entry_price * 100.0,
            2,
        );
        signal.outcome = outcome;
        signal.exit_price = Some(exit_price);
        signal.pnl = Some(pnl);
        let resolved = signal.clone();

        match resolved
            .influencer_id
            .and_then(|inf_id| self.state.influencer_mut(inf_id))
        {
            Some(influencer) => stats::apply_resolution(influencer, outcome, pnl),
            None => warn!(
                signal_id = %id,
                influencer = %resolved.influencer,
                "Resolved orphaned signal, influencer stats not updated"
            ),
        }

        info!(
            signal_id = %id,
            coin = %resolved.coin,
            outcome = %outcome,
            exit = exit_price,
            pnl,
            "Signal resolved"
        );
        Ok(resolved)
    }

    /// Delete a signal and reverse what it contributed to its influencer.
    ///
    /// Resolved statistics are rebuilt from the influencer's remaining
    /// signals, so they match the history exactly after the delete.
    pub fn delete_signal(&mut self, id: Uuid) -> LedgerResult<Signal> {
        let index = self.signal_index(id)?;
        let removed = self.state.signals.remove(index);

        let LedgerState {
            influencers,
            signals,
            ..
        } = &mut self.state;
        if let Some(inf_id) = removed.influencer_id {
            if let Some(influencer) = influencers.iter_mut().find(|inf| inf.id == inf_id) {
                influencer.total_calls = influencer.total_calls.saturating_sub(1);
                if removed.is_resolved() {
                    stats::recompute_resolved(
                        influencer,
                        signals.iter().filter(|s| s.influencer_id == Some(inf_id)),
                    );
                }
            }
        }

        info!(signal_id = %id, coin = %removed.coin, outcome = %removed.outcome, "Signal deleted");
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Settings and maintenance
    // ------------------------------------------------------------------

    /// Replace the stored portfolio settings. Existing position sizes are
    /// left as they were.
    pub fn update_settings(&mut self, settings: PortfolioSettings) -> LedgerResult<()> {
        settings.validate()?;
        self.state.set_settings(settings);

        info!(
            portfolio_value = settings.portfolio_value,
            risk_per_trade = settings.risk_per_trade,
            "Portfolio settings updated"
        );
        Ok(())
    }

    /// Rebuild influencer statistics from signal history, for one
    /// influencer or (with `None`) all of them. Returns how many were
    /// rebuilt.
    pub fn recompute_influencer_stats(&mut self, id: Option<Uuid>) -> LedgerResult<usize> {
        if let Some(id) = id {
            self.influencer_index(id)?;
        }

        let LedgerState {
            influencers,
            signals,
            ..
        } = &mut self.state;

        let mut rebuilt = 0;
        for influencer in influencers
            .iter_mut()
            .filter(|inf| id.map_or(true, |target| inf.id == target))
        {
            let inf_id = influencer.id;
            stats::recompute(
                influencer,
                signals.iter().filter(|s| s.influencer_id == Some(inf_id)),
            );
            rebuilt += 1;
        }

        info!(rebuilt, "Influencer statistics recomputed");
        Ok(rebuilt)
    }

    pub fn relink_orphans(&mut self) -> usize {
        self.state.relink_orphans()
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    pub fn export_document(&self) -> LedgerResult<String> {
        self.state.to_document()
    }

    /// Replace the whole ledger with an imported document. On error the
    /// current state is left untouched.
    pub fn import_document(&mut self, json: &str) -> LedgerResult<()> {
        let mut imported = LedgerState::from_document(json)?;
        let relinked = imported.relink_orphans();

        info!(
            influencers = imported.influencers.len(),
            signals = imported.signals.len(),
            relinked,
            "Ledger imported"
        );
        self.state = imported;
        Ok(())
    }

    fn influencer_index(&self, id: Uuid) -> LedgerResult<usize> {
        self.state
            .influencers
            .iter()
            .position(|inf| inf.id == id)
            .ok_or(LedgerError::InfluencerNotFound { id })
    }

    fn signal_index(&self, id: Uuid) -> LedgerResult<usize> {
        let index = self.state.signals.iter().position(|s| s.id == id);
        debug!(signal_id = %id, found = index.is_some(), "Signal lookup");
        index.ok_or(LedgerError::SignalNotFound { id })
    }
}
