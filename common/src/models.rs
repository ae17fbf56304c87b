//! Influencer and signal entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::lenient;

pub const DEFAULT_PORTFOLIO_VALUE: f64 = 10_000.0;
pub const DEFAULT_RISK_PER_TRADE: f64 = 2.0;

/// Trust classification, highest first. Assigned by the user, never derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Elite
    S,
    A,
    #[default]
    B,
    C,
    /// Watch-only
    D,
}

impl Tier {
    pub const ALL: [Tier; 5] = [Tier::S, Tier::A, Tier::B, Tier::C, Tier::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::S => "S",
            Tier::A => "A",
            Tier::B => "B",
            Tier::C => "C",
            Tier::D => "D",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S" => Ok(Tier::S),
            "A" => Ok(Tier::A),
            "B" => Ok(Tier::B),
            "C" => Ok(Tier::C),
            "D" => Ok(Tier::D),
            _ => Err(LedgerError::invalid_value("tier", s)),
        }
    }
}

/// Direction of a call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    #[default]
    Buy,
    Sell,
    Long,
    Short,
}

impl Action {
    /// BUY and LONG are bullish, SELL and SHORT bearish
    pub fn is_bullish(&self) -> bool {
        matches!(self, Action::Buy | Action::Long)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Long => "LONG",
            Action::Short => "SHORT",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Action {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Action::Buy),
            "SELL" => Ok(Action::Sell),
            "LONG" => Ok(Action::Long),
            "SHORT" => Ok(Action::Short),
            _ => Err(LedgerError::invalid_value("action", s)),
        }
    }
}

/// Signal outcome. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    #[default]
    Pending,
    Win,
    Loss,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Pending => "pending",
            Outcome::Win => "win",
            Outcome::Loss => "loss",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Outcome::Pending),
            "win" => Ok(Outcome::Win),
            "loss" => Ok(Outcome::Loss),
            _ => Err(LedgerError::invalid_value("outcome", s)),
        }
    }
}

/// A tracked prediction source and its rolling performance statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Influencer {
    #[serde(deserialize_with = "lenient::id")]
    pub id: Uuid,
    pub name: String,
    pub handle: String,
    #[serde(default)]
    pub twitter: String,
    #[serde(default)]
    pub followers: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tier: Tier,

    /// Percentage, one decimal place
    #[serde(default, deserialize_with = "lenient::number")]
    pub win_rate: f64,

    /// Signals created against this influencer
    #[serde(default)]
    pub total_calls: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,

    /// Running mean of resolved P&L percentages, two decimal places
    #[serde(default, deserialize_with = "lenient::number")]
    pub avg_return: f64,
}

impl Influencer {
    pub fn new(name: impl Into<String>, handle: impl Into<String>, tier: Tier) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            handle: handle.into(),
            twitter: String::new(),
            followers: String::new(),
            specialty: String::new(),
            notes: String::new(),
            tier,
            win_rate: 0.0,
            total_calls: 0,
            wins: 0,
            losses: 0,
            avg_return: 0.0,
        }
    }

    /// Number of resolved signals counted in the statistics
    pub fn resolved(&self) -> u32 {
        self.wins + self.losses
    }
}

/// A recorded directional call on an asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    #[serde(deserialize_with = "lenient::id")]
    pub id: Uuid,

    /// Owning influencer. `None` only for documents written before signals
    /// carried the id; see `LedgerState::relink_orphans`.
    #[serde(
        default,
        deserialize_with = "lenient::optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub influencer_id: Option<Uuid>,

    /// Display name of the influencer, kept in sync on rename
    pub influencer: String,

    /// Upper-cased asset symbol
    pub coin: String,
    #[serde(default)]
    pub action: Action,
    #[serde(deserialize_with = "lenient::number")]
    pub entry_price: f64,

    /// 0 when not specified
    #[serde(default, deserialize_with = "lenient::number")]
    pub target_price: f64,

    /// 0 when not specified
    #[serde(default, deserialize_with = "lenient::number")]
    pub stop_loss: f64,

    /// Units recommended at creation time. Never recomputed.
    #[serde(default, deserialize_with = "lenient::number")]
    pub position_size: f64,

    #[serde(default)]
    pub outcome: Outcome,
    #[serde(
        default,
        deserialize_with = "lenient::optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub exit_price: Option<f64>,

    /// Signed percentage return, set on resolution
    #[serde(
        default,
        deserialize_with = "lenient::optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub pnl: Option<f64>,

    #[serde(deserialize_with = "lenient::timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
}

impl Signal {
    pub fn is_pending(&self) -> bool {
        self.outcome == Outcome::Pending
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome.is_terminal()
    }

    pub fn has_stop(&self) -> bool {
        self.stop_loss > 0.0
    }

    pub fn has_target(&self) -> bool {
        self.target_price > 0.0
    }
}

/// Sizing inputs, passed by value into signal creation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSettings {
    #[serde(default = "default_portfolio_value")]
    pub portfolio_value: f64,

    /// Percentage of the portfolio risked per trade
    #[serde(default = "default_risk_per_trade")]
    pub risk_per_trade: f64,
}

impl PortfolioSettings {
    pub fn new(portfolio_value: f64, risk_per_trade: f64) -> Self {
        Self {
            portfolio_value,
            risk_per_trade,
        }
    }

    /// Reject non-finite or negative values and risk above 100%
    pub fn validate(&self) -> LedgerResult<()> {
        if !self.portfolio_value.is_finite() || self.portfolio_value < 0.0 {
            return Err(LedgerError::invalid_numeric(
                "portfolioValue",
                self.portfolio_value.to_string(),
            ));
        }
        if !self.risk_per_trade.is_finite() || !(0.0..=100.0).contains(&self.risk_per_trade) {
            return Err(LedgerError::invalid_numeric(
                "riskPerTrade",
                self.risk_per_trade.to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PortfolioSettings {
    fn default() -> Self {
        Self {
            portfolio_value: DEFAULT_PORTFOLIO_VALUE,
            risk_per_trade: DEFAULT_RISK_PER_TRADE,
        }
    }
}

fn default_portfolio_value() -> f64 {
    DEFAULT_PORTFOLIO_VALUE
}

fn default_risk_per_trade() -> f64 {
    DEFAULT_RISK_PER_TRADE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_string(&Tier::S).unwrap(), "\"S\"");
        assert_eq!(serde_json::to_string(&Action::Short).unwrap(), "\"SHORT\"");
        assert_eq!(serde_json::to_string(&Outcome::Pending).unwrap(), "\"pending\"");
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("a".parse::<Tier>().unwrap(), Tier::A);
        assert_eq!("long".parse::<Action>().unwrap(), Action::Long);
        assert_eq!("WIN".parse::<Outcome>().unwrap(), Outcome::Win);
        assert!("Z".parse::<Tier>().is_err());
    }

    #[test]
    fn test_tier_order() {
        assert!(Tier::S < Tier::A);
        assert!(Tier::C < Tier::D);
        assert_eq!(Tier::default(), Tier::B);
    }

    #[test]
    fn test_influencer_defaults_from_sparse_json() {
        let json = serde_json::json!({
            "id": "00000000-0000-0000-0000-000000000001",
            "name": "Ansem",
            "handle": "@blknoiz06"
        });
        let inf: Influencer = serde_json::from_value(json).unwrap();
        assert_eq!(inf.tier, Tier::B);
        assert_eq!(inf.total_calls, 0);
        assert_eq!(inf.win_rate, 0.0);
    }

    #[test]
    fn test_signal_camel_case_fields() {
        let signal = Signal {
            id: Uuid::new_v4(),
            influencer_id: None,
            influencer: "Ansem".to_string(),
            coin: "SOL".to_string(),
            action: Action::Long,
            entry_price: 100.0,
            target_price: 0.0,
            stop_loss: 95.0,
            position_size: 40.0,
            outcome: Outcome::Pending,
            exit_price: None,
            pnl: None,
            timestamp: Utc::now(),
            notes: String::new(),
        };

        let value = serde_json::to_value(&signal).unwrap();
        assert_eq!(value["entryPrice"], 100.0);
        assert_eq!(value["stopLoss"], 95.0);
        assert!(value.get("pnl").is_none());
        assert!(signal.has_stop());
        assert!(!signal.has_target());
    }

    #[test]
    fn test_settings_validation() {
        assert!(PortfolioSettings::default().validate().is_ok());
        assert!(PortfolioSettings::new(-1.0, 2.0).validate().is_err());
        assert!(PortfolioSettings::new(1000.0, 150.0).validate().is_err());
        assert!(PortfolioSettings::new(f64::NAN, 2.0).validate().is_err());
    }
}
