use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::{BreakoutEvent, RegressionDiagnostics};
use crate::domain::SeriesKind;

/// Several series broke out in the same tick. Raised alongside, not instead
/// of, the individual events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiBreakoutEvent {
    pub series_ids: Vec<String>,
    /// Distinct kinds involved, in first-seen order
    pub kinds: Vec<SeriesKind>,
    pub tick_timestamp: DateTime<Utc>,
}

/// A series that could not be analysed this tick, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSeries {
    pub series_id: String,
    pub reason: String,
}

/// A series whose trend fit is too weak to trust.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyNote {
    pub series_id: String,
    pub display_name: String,
    pub kind: SeriesKind,
    pub diagnostics: RegressionDiagnostics,
}

/// Everything one tick produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub tick_timestamp: DateTime<Utc>,
    pub analysed: usize,
    pub breakouts: Vec<BreakoutEvent>,
    pub multi_breakout: Option<MultiBreakoutEvent>,
    pub skipped: Vec<SkippedSeries>,
    pub anomalies: Vec<AnomalyNote>,
}

impl TickReport {
    pub fn empty(tick_timestamp: DateTime<Utc>) -> Self {
        Self {
            tick_timestamp,
            analysed: 0,
            breakouts: Vec::new(),
            multi_breakout: None,
            skipped: Vec::new(),
            anomalies: Vec::new(),
        }
    }

    pub fn has_alerts(&self) -> bool {
        !self.breakouts.is_empty() || self.multi_breakout.is_some()
    }

    /// Human-readable notes for skipped series
    pub fn diagnostic_notes(&self) -> Vec<String> {
        self.skipped
            .iter()
            .map(|s| format!("Skipped {}: {}", s.series_id, s.reason))
            .collect()
    }
}
