//! Fixed-fractional position sizing

use common::{round_dp, PortfolioSettings};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Recommended units for a trade risking `risk_percent` of the portfolio
/// between `entry_price` and `stop_loss`.
///
/// `riskAmount / |entry - stop|`, rounded to two decimals. Returns 0 (no
/// recommendation) when entry equals stop or any input is not finite.
pub fn position_size(
    portfolio_value: f64,
    risk_percent: f64,
    entry_price: f64,
    stop_loss: f64,
) -> f64 {
    let risk_amount = portfolio_value * (risk_percent / 100.0);
    let risk_per_unit = (entry_price - stop_loss).abs();

    if !risk_amount.is_finite() || risk_amount <= 0.0 {
        return 0.0;
    }
    if !risk_per_unit.is_finite() || risk_per_unit <= 0.0 {
        return 0.0;
    }

    round_dp(risk_amount / risk_per_unit, 2)
}

/// Sizing breakdown for a single entry/stop pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeRecommendation {
    /// Units to buy or sell; 0 means no recommendation
    pub units: f64,

    /// Capital at risk if the stop is hit
    pub risk_amount: f64,

    /// Price distance between entry and stop
    pub risk_per_unit: f64,

    /// units × entry
    pub notional: f64,
}

/// Position sizer bound to a snapshot of the portfolio settings
#[derive(Debug, Clone, Copy)]
pub struct PositionSizer {
    settings: PortfolioSettings,
}

impl PositionSizer {
    pub fn new(settings: PortfolioSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> PortfolioSettings {
        self.settings
    }

    /// Capital risked per trade
    pub fn risk_amount(&self) -> f64 {
        round_dp(
            self.settings.portfolio_value * (self.settings.risk_per_trade / 100.0),
            2,
        )
    }

    /// Units for a signal. A stop of 0 means none was given, which yields 0
    /// rather than sizing against a zero price.
    pub fn units_for(&self, entry_price: f64, stop_loss: f64) -> f64 {
        if stop_loss <= 0.0 {
            debug!(entry_price, "No stop loss given, skipping position size");
            return 0.0;
        }

        position_size(
            self.settings.portfolio_value,
            self.settings.risk_per_trade,
            entry_price,
            stop_loss,
        )
    }

    pub fn recommend(&self, entry_price: f64, stop_loss: f64) -> SizeRecommendation {
        let units = self.units_for(entry_price, stop_loss);
        let risk_per_unit = if stop_loss > 0.0 {
            (entry_price - stop_loss).abs()
        } else {
            0.0
        };

        SizeRecommendation {
            units,
            risk_amount: self.risk_amount(),
            risk_per_unit,
            notional: round_dp(units * entry_price, 2),
        }
    }
}

impl Default for PositionSizer {
    fn default() -> Self {
        Self::new(PortfolioSettings::default())
    }
}
