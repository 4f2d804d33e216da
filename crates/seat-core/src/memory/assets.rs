use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::PipelineError;
use crate::model::{AssetSnapshot, VenueId};
use crate::ports::AssetSource;

#[derive(Debug, Default)]
struct AssetState {
    venues: HashMap<VenueId, AssetSnapshot>,
    failures_left: u32,
    fetches: usize,
}

/// Fuente de assets compartible (`Clone` comparte el estado).
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssetSource {
    state: Arc<RwLock<AssetState>>,
}

impl InMemoryAssetSource {
    pub fn new() -> Self { Self::default() }

    pub async fn put(&self, snapshot: AssetSnapshot) {
        self.state.write().await.venues.insert(snapshot.venue_id.clone(), snapshot);
    }

    pub async fn get(&self, venue_id: &VenueId) -> AssetSnapshot {
        self.state.read().await.venues.get(venue_id).cloned().unwrap_or_else(|| AssetSnapshot::empty(venue_id.clone()))
    }

    /// Las próximas `n` lecturas fallan con `Fetch`.
    pub async fn fail_next(&self, n: u32) { self.state.write().await.failures_left = n; }

    pub async fn fetch_count(&self) -> usize { self.state.read().await.fetches }

    /// Aplica una mutación al snapshot del venue (lo crea vacío si no existe).
    pub(crate) async fn update<F>(&self, venue_id: &VenueId, f: F)
    where
        F: FnOnce(&mut AssetSnapshot),
    {
        let mut state = self.state.write().await;
        let entry = state.venues.entry(venue_id.clone()).or_insert_with(|| AssetSnapshot::empty(venue_id.clone()));
        f(entry);
    }
}

#[async_trait]
impl AssetSource for InMemoryAssetSource {
    async fn get_asset_snapshot(&self, venue_id: &VenueId) -> Result<AssetSnapshot, PipelineError> {
        let mut state = self.state.write().await;
        state.fetches += 1;
        if state.failures_left > 0 {
            state.failures_left -= 1;
            return Err(PipelineError::Fetch(format!("asset store unavailable for {venue_id}")));
        }
        Ok(state.venues.get(venue_id).cloned().unwrap_or_else(|| AssetSnapshot::empty(venue_id.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_venue_reads_as_empty() {
        let source = InMemoryAssetSource::new();
        let snap = source.get_asset_snapshot(&"nowhere".into()).await.unwrap();
        assert_eq!(snap, AssetSnapshot::empty("nowhere".into()));
    }

    #[tokio::test]
    async fn injected_failures_are_consumed() {
        let source = InMemoryAssetSource::new();
        source.fail_next(1).await;
        assert!(matches!(source.get_asset_snapshot(&"v".into()).await, Err(PipelineError::Fetch(_))));
        assert!(source.get_asset_snapshot(&"v".into()).await.is_ok());
        assert_eq!(source.fetch_count().await, 2);
    }
}
