//! Load-on-start, save-after-mutation wrapper around a [`SignalLedger`].
//!
//! Persistence is best-effort: a failed load starts from an empty ledger and
//! a failed save is logged and otherwise ignored. The in-memory ledger stays
//! authoritative for the rest of the session either way.
//!
//! A store that failed to load is never written back to. Whatever it holds
//! (a corrupt file, a document from a newer build) stays as it was, and
//! every mutation in that session is reported as unsaved.

use common::{LedgerResult, LedgerState};
use tracing::{error, info, warn};

use crate::lifecycle::SignalLedger;
use crate::storage::LedgerStore;

pub struct LedgerSession<S: LedgerStore> {
    store: S,
    ledger: SignalLedger,
    load_failed: bool,
    unsaved: bool,
}

impl<S: LedgerStore> LedgerSession<S> {
    /// Open a session, starting from the default state if nothing loads
    pub async fn open(store: S) -> Self {
        Self::open_with_defaults(store, LedgerState::default()).await
    }

    /// Open a session, starting from `fallback` if nothing loads
    pub async fn open_with_defaults(store: S, fallback: LedgerState) -> Self {
        let mut load_failed = false;
        let state = match store.load().await {
            Ok(Some(state)) => {
                info!(
                    influencers = state.influencers.len(),
                    signals = state.signals.len(),
                    "Ledger session opened"
                );
                state
            }
            Ok(None) => {
                info!("No stored ledger, starting fresh");
                fallback
            }
            Err(e) => {
                warn!(
                    error = %format!("{:#}", e),
                    "Failed to load ledger, starting fresh without saving"
                );
                load_failed = true;
                fallback
            }
        };

        Self {
            store,
            ledger: SignalLedger::from_state(state),
            load_failed,
            unsaved: false,
        }
    }

    pub fn ledger(&self) -> &SignalLedger {
        &self.ledger
    }

    /// Direct access for callers that batch several mutations before a
    /// single [`commit`](Self::commit).
    pub fn ledger_mut(&mut self) -> &mut SignalLedger {
        self.unsaved = true;
        &mut self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether the store failed to load when the session opened
    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    /// Whether the ledger holds mutations the store has not accepted
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Save the current state. Returns whether the save succeeded.
    pub async fn commit(&mut self) -> bool {
        if self.load_failed {
            error!("Ledger was not loaded, refusing to overwrite stored data");
            return false;
        }

        match self.store.save(self.ledger.state()).await {
            Ok(()) => {
                self.unsaved = false;
                true
            }
            Err(e) => {
                error!(error = %format!("{:#}", e), "Failed to save ledger");
                false
            }
        }
    }

    /// Run one mutation and commit if it succeeded. A failed save does not
    /// fail the mutation; check [`has_unsaved_changes`](Self::has_unsaved_changes).
    pub async fn apply<T, F>(&mut self, mutation: F) -> LedgerResult<T>
    where
        F: FnOnce(&mut SignalLedger) -> LedgerResult<T>,
    {
        let result = mutation(&mut self.ledger)?;
        self.unsaved = true;
        self.commit().await;
        Ok(result)
    }
}
