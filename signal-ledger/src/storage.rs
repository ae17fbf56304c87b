// Ledger storage interface
// Whole-state persistence behind an async boundary

use anyhow::{Context, Result};
use common::LedgerState;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Trait for ledger storage backends
#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync {
    /// Load the stored ledger, or `None` when nothing has been saved yet
    async fn load(&self) -> Result<Option<LedgerState>>;

    /// Replace the stored ledger with `state`
    async fn save(&self, state: &LedgerState) -> Result<()>;
}

/// In-memory ledger storage (for testing and development)
pub struct InMemoryStore {
    state: tokio::sync::RwLock<Option<LedgerState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: tokio::sync::RwLock::new(None),
        }
    }

    /// A store that already holds `state`
    pub fn with_state(state: LedgerState) -> Self {
        Self {
            state: tokio::sync::RwLock::new(Some(state)),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LedgerStore for InMemoryStore {
    async fn load(&self) -> Result<Option<LedgerState>> {
        let state = self.state.read().await;
        Ok(state.clone())
    }

    async fn save(&self, state: &LedgerState) -> Result<()> {
        let mut stored = self.state.write().await;
        *stored = Some(state.clone());
        Ok(())
    }
}

/// Ledger stored as one pretty-printed JSON document on disk
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl LedgerStore for JsonFileStore {
    async fn load(&self) -> Result<Option<LedgerState>> {
        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            debug!(path = %self.path.display(), "No ledger file yet");
            return Ok(None);
        }

        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read ledger file {}", self.path.display()))?;
        let state = LedgerState::from_document(&contents)
            .with_context(|| format!("Failed to parse ledger file {}", self.path.display()))?;

        debug!(
            path = %self.path.display(),
            influencers = state.influencers.len(),
            signals = state.signals.len(),
            "Ledger loaded"
        );
        Ok(Some(state))
    }

    async fn save(&self, state: &LedgerState) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let document = state.to_document()?;

        // Write then rename so a crash never leaves a truncated ledger
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, document)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!(path = %self.path.display(), "Ledger saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Influencer, PortfolioSettings, Tier};

    fn sample_state() -> LedgerState {
        let mut state = LedgerState::with_settings(PortfolioSettings::new(25_000.0, 1.5));
        state
            .influencers
            .push(Influencer::new("Hsaka", "@HsakaTrades", Tier::S));
        state
    }

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let store = InMemoryStore::new();
        assert!(store.load().await.unwrap().is_none());

        let state = sample_state();
        store.save(&state).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(state));
    }

    #[tokio::test]
    async fn test_json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("ledger.json"));

        assert!(store.load().await.unwrap().is_none());

        let state = sample_state();
        store.save(&state).await.unwrap();
        assert!(store.path().exists());
        assert_eq!(store.load().await.unwrap(), Some(state));
    }

    #[tokio::test]
    async fn test_json_file_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.load().await.is_err());
    }
}
