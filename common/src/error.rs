use thiserror::Error;
use uuid::Uuid;

use crate::models::Outcome;

/// Typed error hierarchy for ledger operations.
///
/// Core operations return these directly; hosts that also do I/O wrap them
/// with `anyhow::Context`.
#[derive(Error, Debug)]
pub enum LedgerError {
    // -- Input validation ---------------------------------------------------
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid numeric value for {field}: {value:?}")]
    InvalidNumeric { field: &'static str, value: String },

    #[error("invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },

    #[error("no influencer matches reference {reference:?}")]
    UnknownInfluencerReference { reference: String },

    #[error("influencer named {name:?} already exists")]
    DuplicateInfluencer { name: String },

    // -- Lookups ------------------------------------------------------------
    #[error("influencer not found: {id}")]
    InfluencerNotFound { id: Uuid },

    #[error("signal not found: {id}")]
    SignalNotFound { id: Uuid },

    // -- Lifecycle ----------------------------------------------------------
    #[error("signal {id} is already resolved as {outcome}")]
    AlreadyResolved { id: Uuid, outcome: Outcome },

    #[error("cannot resolve a signal to {outcome}")]
    InvalidOutcome { outcome: Outcome },

    // -- Documents ----------------------------------------------------------
    #[error("unsupported schema version {found} (supported up to {supported})")]
    UnsupportedSchema { found: u32, supported: u32 },

    #[error("malformed ledger document: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl LedgerError {
    pub fn invalid_numeric(field: &'static str, value: impl Into<String>) -> Self {
        LedgerError::InvalidNumeric {
            field,
            value: value.into(),
        }
    }

    pub fn invalid_value(field: &'static str, value: impl Into<String>) -> Self {
        LedgerError::InvalidValue {
            field,
            value: value.into(),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
