use crate::types::PriceSeries;
use moka::future::Cache;
use std::time::Duration;

/// In-memory history cache keyed by the raw user query. Purely a fetch-layer
/// shortcut: pipeline state (scaler, weights) is never cached, every run
/// starts fresh.
pub struct HistoryCache {
    series: Cache<String, PriceSeries>,
}

impl HistoryCache {
    pub fn new() -> Self {
        let series = Cache::builder()
            .time_to_live(Duration::from_secs(6 * 60 * 60))
            .build();
        Self { series }
    }

    pub async fn get(&self, query: &str) -> Option<PriceSeries> {
        self.series.get(query).await
    }

    pub async fn insert(&self, query: String, data: PriceSeries) {
        self.series.insert(query, data).await;
    }
}

impl Default for HistoryCache {
    fn default() -> Self {
        Self::new()
    }
}
