use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::analysis::EnvelopePosition;

/// Represents what the engine remembers about a single series between ticks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesState {
    /// Position of the newest point at the last analysis
    pub position: EnvelopePosition,

    /// Newest point seen at the last analysis
    pub last_timestamp: Option<DateTime<Utc>>,
    pub last_value: Option<f64>,

    /// Whether the last fit was flagged as a regression anomaly
    pub anomalous: bool,
}

impl SeriesState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one analysis. Returns the previous position.
    pub fn record(
        &mut self,
        position: EnvelopePosition,
        timestamp: DateTime<Utc>,
        value: f64,
    ) -> EnvelopePosition {
        let previous = self.position;
        self.position = position;
        self.last_timestamp = Some(timestamp);
        self.last_value = Some(value);
        previous
    }
}

/// Registry of per-series state, owned by the engine. Entries appear on the
/// first analysis of a series and disappear only on [`SeriesRegistry::reset`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesRegistry {
    states: HashMap<String, SeriesState>,
}

impl SeriesRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prior position of a series; `Unknown` if never analysed.
    pub fn position(&self, series_id: &str) -> EnvelopePosition {
        self.states
            .get(series_id)
            .map(|s| s.position)
            .unwrap_or_default()
    }

    pub fn get(&self, series_id: &str) -> Option<&SeriesState> {
        self.states.get(series_id)
    }

    pub fn record(
        &mut self,
        series_id: &str,
        position: EnvelopePosition,
        timestamp: DateTime<Utc>,
        value: f64,
    ) -> EnvelopePosition {
        self.states
            .entry(series_id.to_string())
            .or_default()
            .record(position, timestamp, value)
    }

    /// Stores the anomaly flag of a series' latest fit. Returns the previous flag.
    pub fn set_anomalous(&mut self, series_id: &str, anomalous: bool) -> bool {
        let state = self.states.entry(series_id.to_string()).or_default();
        std::mem::replace(&mut state.anomalous, anomalous)
    }

    pub fn reset(&mut self) {
        self.states.clear();
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SeriesState)> {
        self.states.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_series_is_unknown() {
        let registry = SeriesRegistry::new();
        assert_eq!(registry.position("nope"), EnvelopePosition::Unknown);
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn record_returns_previous_position() {
        let mut registry = SeriesRegistry::new();
        let now = Utc::now();
        let prev = registry.record("a", EnvelopePosition::Inside, now, 1.0);
        assert_eq!(prev, EnvelopePosition::Unknown);
        let prev = registry.record("a", EnvelopePosition::Outside, now, 9.0);
        assert_eq!(prev, EnvelopePosition::Inside);

        let state = registry.get("a").unwrap();
        assert_eq!(state.position, EnvelopePosition::Outside);
        assert_eq!(state.last_value, Some(9.0));
    }

    #[test]
    fn anomaly_flag_reports_previous_value() {
        let mut registry = SeriesRegistry::new();
        registry.record("a", EnvelopePosition::Inside, Utc::now(), 1.0);
        assert!(!registry.set_anomalous("a", true));
        assert!(registry.set_anomalous("a", true));
        assert!(registry.set_anomalous("a", false));
        assert!(!registry.get("a").unwrap().anomalous);
    }

    #[test]
    fn reset_clears_everything() {
        let mut registry = SeriesRegistry::new();
        registry.record("a", EnvelopePosition::Inside, Utc::now(), 1.0);
        registry.reset();
        assert!(registry.is_empty());
        assert_eq!(registry.position("a"), EnvelopePosition::Unknown);
    }
}
