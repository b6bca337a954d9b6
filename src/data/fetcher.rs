use anyhow::{Result, anyhow};
use std::collections::HashMap;

use crate::domain::{SeriesSpec, TimeSeries};

/// Producer of time-series windows. Implementations own retrieval, caching
/// (see [`crate::domain::SeriesKind::cache_ttl`]) and resampling to the kind's
/// cadence; the engine only ever reads what they hand over.
pub trait SeriesFetcher {
    fn fetch(&self, spec: &SeriesSpec) -> Result<TimeSeries>;
}

/// Fetcher backed by series already held in memory, keyed by series id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFetcher {
    series: HashMap<String, TimeSeries>,
}

impl InMemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the series stored under `id`.
    pub fn insert(&mut self, id: &str, series: TimeSeries) {
        self.series.insert(id.to_string(), series);
    }

    pub fn remove(&mut self, id: &str) -> Option<TimeSeries> {
        self.series.remove(id)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.series.keys().cloned().collect()
    }
}

impl SeriesFetcher for InMemoryFetcher {
    fn fetch(&self, spec: &SeriesSpec) -> Result<TimeSeries> {
        self.series
            .get(&spec.id)
            .cloned()
            .ok_or_else(|| anyhow!("No data available for series {}", spec.id))
    }
}
