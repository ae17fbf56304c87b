//! The ledger document: both collections plus the portfolio settings.
//!
//! The serialised shape is the in-memory shape. Exports carry a
//! `schemaVersion`; documents without one predate versioning and are read
//! as version 1.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    Influencer, PortfolioSettings, Signal, DEFAULT_PORTFOLIO_VALUE, DEFAULT_RISK_PER_TRADE,
};

/// Newest document version this build reads and the one it writes
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerState {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub influencers: Vec<Influencer>,
    #[serde(default)]
    pub signals: Vec<Signal>,
    #[serde(default = "default_portfolio_value")]
    pub portfolio_value: f64,
    #[serde(default = "default_risk_per_trade")]
    pub risk_per_trade: f64,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            influencers: Vec::new(),
            signals: Vec::new(),
            portfolio_value: DEFAULT_PORTFOLIO_VALUE,
            risk_per_trade: DEFAULT_RISK_PER_TRADE,
        }
    }
}

fn default_schema_version() -> u32 {
    1
}

fn default_portfolio_value() -> f64 {
    DEFAULT_PORTFOLIO_VALUE
}

fn default_risk_per_trade() -> f64 {
    DEFAULT_RISK_PER_TRADE
}

impl LedgerState {
    /// Empty ledger seeded with the given settings
    pub fn with_settings(settings: PortfolioSettings) -> Self {
        let mut state = Self::default();
        state.set_settings(settings);
        state
    }

    pub fn settings(&self) -> PortfolioSettings {
        PortfolioSettings::new(self.portfolio_value, self.risk_per_trade)
    }

    pub fn set_settings(&mut self, settings: PortfolioSettings) {
        self.portfolio_value = settings.portfolio_value;
        self.risk_per_trade = settings.risk_per_trade;
    }

    pub fn influencer(&self, id: Uuid) -> Option<&Influencer> {
        self.influencers.iter().find(|inf| inf.id == id)
    }

    pub fn influencer_mut(&mut self, id: Uuid) -> Option<&mut Influencer> {
        self.influencers.iter_mut().find(|inf| inf.id == id)
    }

    pub fn influencer_by_name(&self, name: &str) -> Option<&Influencer> {
        self.influencers.iter().find(|inf| inf.name == name)
    }

    /// The influencer a signal is attributed to, if it still exists
    pub fn influencer_for(&self, signal: &Signal) -> Option<&Influencer> {
        signal.influencer_id.and_then(|id| self.influencer(id))
    }

    pub fn signal(&self, id: Uuid) -> Option<&Signal> {
        self.signals.iter().find(|sig| sig.id == id)
    }

    /// Signals whose influencer id is missing or dangling
    pub fn orphaned_signals(&self) -> impl Iterator<Item = &Signal> {
        self.signals
            .iter()
            .filter(move |sig| self.influencer_for(sig).is_none())
    }

    /// Attach orphaned signals to the influencer carrying the same display
    /// name. Returns how many signals were relinked.
    pub fn relink_orphans(&mut self) -> usize {
        let mut relinked = 0;
        for i in 0..self.signals.len() {
            if self.influencer_for(&self.signals[i]).is_some() {
                continue;
            }
            let Some(id) = self
                .influencer_by_name(&self.signals[i].influencer)
                .map(|inf| inf.id)
            else {
                continue;
            };
            self.signals[i].influencer_id = Some(id);
            relinked += 1;
        }

        if relinked > 0 {
            debug!(relinked, "Relinked orphaned signals by name");
        }
        relinked
    }

    /// Serialise as a pretty-printed, versioned document
    pub fn to_document(&self) -> LedgerResult<String> {
        let mut doc = self.clone();
        doc.schema_version = SCHEMA_VERSION;
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Parse a document, falling back to defaults for missing fields
    pub fn from_document(json: &str) -> LedgerResult<Self> {
        let state: LedgerState = serde_json::from_str(json)?;
        if state.schema_version > SCHEMA_VERSION {
            return Err(LedgerError::UnsupportedSchema {
                found: state.schema_version,
                supported: SCHEMA_VERSION,
            });
        }
        Ok(state)
    }
}
