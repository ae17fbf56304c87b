// Input validation
// Turns raw, form-like drafts into typed values or a LedgerError

use chrono::{DateTime, Utc};
use common::{Action, LedgerError, LedgerResult, Tier, Uuid};
use std::fmt;
use tracing::debug;

/// How a draft points at its influencer: stable id, or exact display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfluencerRef {
    Id(Uuid),
    Name(String),
}

impl InfluencerRef {
    /// UUID-shaped input is treated as an id, anything else as a name
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match Uuid::parse_str(raw) {
            Ok(id) => InfluencerRef::Id(id),
            Err(_) => InfluencerRef::Name(raw.to_string()),
        }
    }
}

impl From<Uuid> for InfluencerRef {
    fn from(id: Uuid) -> Self {
        InfluencerRef::Id(id)
    }
}

impl fmt::Display for InfluencerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfluencerRef::Id(id) => write!(f, "{}", id),
            InfluencerRef::Name(name) => f.write_str(name),
        }
    }
}

/// A new signal as entered by the user. Prices are raw text.
#[derive(Debug, Clone, Default)]
pub struct SignalDraft {
    /// Influencer id or display name
    pub influencer: String,
    pub coin: String,
    pub action: Action,
    pub entry_price: String,
    pub target_price: String,
    pub stop_loss: String,
    /// Defaults to now
    pub timestamp: Option<DateTime<Utc>>,
    pub notes: String,
}

impl SignalDraft {
    pub fn new(
        influencer: impl Into<String>,
        coin: impl Into<String>,
        action: Action,
        entry_price: impl Into<String>,
    ) -> Self {
        Self {
            influencer: influencer.into(),
            coin: coin.into(),
            action,
            entry_price: entry_price.into(),
            ..Default::default()
        }
    }

    pub fn with_stop(mut self, stop_loss: impl Into<String>) -> Self {
        self.stop_loss = stop_loss.into();
        self
    }

    pub fn with_target(mut self, target_price: impl Into<String>) -> Self {
        self.target_price = target_price.into();
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn validate(&self) -> LedgerResult<ValidatedSignal> {
        let influencer = self.influencer.trim();
        if influencer.is_empty() {
            return Err(LedgerError::MissingField { field: "influencer" });
        }

        let coin = self.coin.trim();
        if coin.is_empty() {
            return Err(LedgerError::MissingField { field: "coin" });
        }

        let entry_price = parse_required_price("entryPrice", &self.entry_price)?;
        if entry_price <= 0.0 {
            return Err(LedgerError::invalid_numeric("entryPrice", self.entry_price.trim()));
        }

        let validated = ValidatedSignal {
            influencer: InfluencerRef::parse(influencer),
            coin: coin.to_uppercase(),
            action: self.action,
            entry_price,
            target_price: parse_optional_price("targetPrice", &self.target_price)?,
            stop_loss: parse_optional_price("stopLoss", &self.stop_loss)?,
            timestamp: self.timestamp,
            notes: self.notes.trim().to_string(),
        };

        debug!(coin = %validated.coin, entry = validated.entry_price, "Signal draft validated");
        Ok(validated)
    }
}

/// Output of `SignalDraft::validate`
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSignal {
    pub influencer: InfluencerRef,
    pub coin: String,
    pub action: Action,
    pub entry_price: f64,
    pub target_price: f64,
    pub stop_loss: f64,
    pub timestamp: Option<DateTime<Utc>>,
    pub notes: String,
}

/// A new influencer profile. Name and handle are required.
#[derive(Debug, Clone, Default)]
pub struct InfluencerDraft {
    pub name: String,
    pub handle: String,
    pub tier: Tier,
    pub twitter: String,
    pub followers: String,
    pub specialty: String,
    pub notes: String,
}

impl InfluencerDraft {
    pub fn new(name: impl Into<String>, handle: impl Into<String>, tier: Tier) -> Self {
        Self {
            name: name.into(),
            handle: handle.into(),
            tier,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> LedgerResult<()> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::MissingField { field: "name" });
        }
        if self.handle.trim().is_empty() {
            return Err(LedgerError::MissingField { field: "handle" });
        }
        Ok(())
    }
}

/// Parse a price that must be present, finite and non-negative
pub fn parse_required_price(field: &'static str, raw: &str) -> LedgerResult<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(LedgerError::MissingField { field });
    }
    parse_price(field, raw)
}

/// Parse an optional price; empty input means "not specified" and yields 0
pub fn parse_optional_price(field: &'static str, raw: &str) -> LedgerResult<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    parse_price(field, raw)
}

fn parse_price(field: &'static str, raw: &str) -> LedgerResult<f64> {
    // Tolerate "$1,250.50" as typed into a form
    let unprefixed = raw.strip_prefix('$').unwrap_or(raw);
    let cleaned =
        strip_thousands(unprefixed).ok_or_else(|| LedgerError::invalid_numeric(field, raw))?;
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(LedgerError::invalid_numeric(field, raw)),
    }
}

/// Remove thousands separators from the integer part. `None` when a comma
/// is anywhere else, so "1,5" is never read as 15.
fn strip_thousands(raw: &str) -> Option<String> {
    if !raw.contains(',') {
        return Some(raw.to_string());
    }

    let (integer, fraction) = match raw.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (raw, None),
    };
    if fraction.is_some_and(|f| f.contains(',')) {
        return None;
    }

    let mut groups = integer.split(',');
    let head = groups.next()?;
    let head_ok = (1..=3).contains(&head.len()) && head.chars().all(|c| c.is_ascii_digit());
    if !head_ok {
        return None;
    }

    let mut cleaned = head.to_string();
    for group in groups {
        if group.len() != 3 || !group.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        cleaned.push_str(group);
    }
    if let Some(fraction) = fraction {
        cleaned.push('.');
        cleaned.push_str(fraction);
    }
    Some(cleaned)
}
