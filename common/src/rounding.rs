use rust_decimal::prelude::*;

/// Round `value` to `dp` decimal places, halves away from zero.
///
/// Rounding goes through `Decimal` so that 0.125 rounds to 0.13 the way a
/// person reading the number expects, rather than following its binary
/// representation. Non-finite values are returned unchanged.
pub fn round_dp(value: f64, dp: u32) -> f64 {
    match Decimal::from_f64(value) {
        Some(d) => d
            .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
            .to_f64()
            .unwrap_or(value),
        None => value,
    }
}
