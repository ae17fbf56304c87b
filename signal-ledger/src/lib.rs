//! Signal ledger
//!
//! The mutation side of the tracker: validation of user input, the signal
//! lifecycle with its cascade into influencer statistics, read-only signal
//! queries, and whole-state persistence with a best-effort session wrapper.

pub mod lifecycle;
pub mod query;
pub mod session;
pub mod stats;
pub mod storage;
pub mod validators;

pub use lifecycle::SignalLedger;
pub use query::{filter_signals, recent_signals, SignalFilter, SignalSort};
pub use session::LedgerSession;
pub use storage::{InMemoryStore, JsonFileStore, LedgerStore};
pub use validators::{InfluencerDraft, InfluencerRef, SignalDraft, ValidatedSignal};
