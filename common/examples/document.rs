//! Example: reading a legacy ledger document

use common::{LedgerState, SCHEMA_VERSION};

fn main() -> Result<(), common::LedgerError> {
    // Written before documents were versioned or signals carried an id
    let legacy = r#"{
        "influencers": [
            {"id": "6f1c1a52-3a57-4d3c-9f0e-2d8b8f6f3a10", "name": "Cobie", "handle": "@cobie",
             "tier": "A"}
        ],
        "signals": [
            {"id": "b7d2e3f4-1111-4c2a-8e3d-5a6b7c8d9e0f", "influencer": "Cobie", "coin": "ETH",
             "action": "LONG", "entryPrice": 3200.0, "timestamp": "2024-05-01T09:30:00Z"}
        ]
    }"#;

    let mut state = LedgerState::from_document(legacy)?;
    println!("Read schema v{} document", state.schema_version);
    println!("  Orphaned signals: {}", state.orphaned_signals().count());
    println!("  Relinked by name: {}", state.relink_orphans());
    println!("  Settings: {:?}", state.settings());

    let exported = state.to_document()?;
    println!("\nRe-exported as schema v{}:\n{}", SCHEMA_VERSION, exported);
    Ok(())
}
