//! JSON snapshot of series, written by an external collector and read by the CLI.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SNAPSHOT_VERSION;
use crate::data::fetcher::{InMemoryFetcher, SeriesFetcher};
use crate::domain::{SeriesKind, SeriesSpec, TimeSeries};
use crate::utils::time_utils::epoch_ms_to_utc;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SeriesSnapshot {
    pub version: u32,
    pub series: Vec<SnapshotEntry>,
}

/// One series in the snapshot. Samples are `[epoch_ms, value]` pairs; a
/// `null` value marks a missing sample.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SnapshotEntry {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub kind: Option<SeriesKind>,
    pub samples: Vec<(i64, Option<f64>)>,
}

impl SnapshotEntry {
    pub fn from_series(spec: &SeriesSpec, series: &TimeSeries) -> Self {
        Self {
            id: spec.id.clone(),
            display_name: Some(spec.display_name.clone()),
            kind: Some(spec.kind),
            samples: series
                .timestamps()
                .iter()
                .zip(series.values())
                .map(|(t, v)| (t.timestamp_millis(), v.is_finite().then_some(*v)))
                .collect(),
        }
    }

    pub fn to_series(&self) -> Result<TimeSeries> {
        let samples = self
            .samples
            .iter()
            .map(|(ms, value)| -> Result<_> {
                let ts = epoch_ms_to_utc(*ms)
                    .with_context(|| format!("{}: invalid timestamp {}", self.id, ms))?;
                Ok((ts, value.unwrap_or(f64::NAN)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(TimeSeries::new(&self.id, samples)?)
    }

    /// Spec described by the entry, if it names its kind.
    pub fn spec(&self) -> Option<SeriesSpec> {
        self.kind.map(|kind| {
            SeriesSpec::with_id(
                kind,
                &self.id,
                self.display_name.as_deref().unwrap_or(&self.id),
            )
        })
    }
}

impl SeriesSnapshot {
    pub fn new(series: Vec<SnapshotEntry>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            series,
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot: SeriesSnapshot = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            bail!(
                "Snapshot {} has version {}, expected {}",
                path.display(),
                snapshot.version,
                SNAPSHOT_VERSION
            );
        }
        Ok(snapshot)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("Failed to serialize snapshot")?;
        fs::write(path, text)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))
    }

    pub fn specs(&self) -> Vec<SeriesSpec> {
        self.series.iter().filter_map(SnapshotEntry::spec).collect()
    }
}

/// Serves series from a snapshot file. `reload` re-reads the file so an
/// external collector can keep it fresh between ticks.
pub struct JsonSnapshotFetcher {
    path: PathBuf,
    cache: InMemoryFetcher,
    specs: Vec<SeriesSpec>,
}

impl JsonSnapshotFetcher {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut fetcher = Self {
            path: path.into(),
            cache: InMemoryFetcher::new(),
            specs: Vec::new(),
        };
        fetcher.reload()?;
        Ok(fetcher)
    }

    pub fn reload(&mut self) -> Result<()> {
        let snapshot = SeriesSnapshot::read(&self.path)?;
        let mut cache = InMemoryFetcher::new();
        for entry in &snapshot.series {
            // A malformed entry only loses that series
            match entry.to_series() {
                Ok(series) => cache.insert(&entry.id, series),
                Err(e) => log::warn!("Ignoring snapshot entry {}: {:#}", entry.id, e),
            }
        }
        self.specs = snapshot.specs();
        self.cache = cache;
        Ok(())
    }

    /// Specs for entries that declare their kind.
    pub fn specs(&self) -> &[SeriesSpec] {
        &self.specs
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SeriesFetcher for JsonSnapshotFetcher {
    fn fetch(&self, spec: &SeriesSpec) -> Result<TimeSeries> {
        self.cache.fetch(spec)
    }
}
