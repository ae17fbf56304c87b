//! Example usage of the position sizing calculator

use common::PortfolioSettings;
use portfolio_risk::{position_size, PositionSizer};

fn main() -> anyhow::Result<()> {
    println!("=== Position Sizing Example ===\n");

    // Example 1: Free function
    println!("Example 1: Fixed fractional sizing");
    let units = position_size(10_000.0, 2.0, 100.0, 95.0);
    println!("  $10,000 at 2% risk, entry 100, stop 95 -> {:.2} units\n", units);

    // Example 2: Sizer built from settings
    println!("Example 2: Sizer from portfolio settings");
    let settings = PortfolioSettings::new(25_000.0, 1.0);
    settings.validate()?;
    let sizer = PositionSizer::new(settings);
    let rec = sizer.recommend(64_000.0, 61_500.0);
    println!("  Risk amount:   ${:.2}", rec.risk_amount);
    println!("  Risk per unit: ${:.2}", rec.risk_per_unit);
    println!("  Units:         {:.2}", rec.units);
    println!("  Notional:      ${:.2}\n", rec.notional);

    // Example 3: No stop, no recommendation
    println!("Example 3: Missing stop loss");
    println!("  Units without a stop: {:.2}", sizer.units_for(64_000.0, 0.0));
    println!("  Units with stop at entry: {:.2}", sizer.units_for(64_000.0, 64_000.0));

    Ok(())
}
