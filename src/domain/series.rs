use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisError;
use crate::domain::SeriesKind;

/// Static description of one monitored series.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesSpec {
    pub id: String,
    pub display_name: String,
    pub kind: SeriesKind,
}

impl SeriesSpec {
    /// Builds a spec whose id is `<kind>_<slugged name>`, e.g. `prices_btc`.
    pub fn new(kind: SeriesKind, display_name: &str) -> Self {
        Self {
            id: format!("{}_{}", kind, slug(display_name)),
            display_name: display_name.to_string(),
            kind,
        }
    }

    pub fn with_id(kind: SeriesKind, id: &str, display_name: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            kind,
        }
    }
}

/// Lowercases and replaces spaces and dashes with underscores.
pub fn slug(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Ordered (timestamp, value) samples for one monitored quantity.
/// Timestamps are strictly increasing. Values may be NaN (missing).
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    id: String,
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
}

impl TimeSeries {
    pub fn new(id: &str, samples: Vec<(DateTime<Utc>, f64)>) -> Result<Self, AnalysisError> {
        if let Some(index) = samples
            .windows(2)
            .position(|pair| pair[1].0 <= pair[0].0)
        {
            return Err(AnalysisError::UnorderedTimestamps {
                series_id: id.to_string(),
                index: index + 1,
            });
        }

        let (timestamps, values) = samples.into_iter().unzip();
        Ok(Self {
            id: id.to_string(),
            timestamps,
            values,
        })
    }

    /// Uniformly spaced series starting at `start`.
    pub fn from_uniform(
        id: &str,
        start: DateTime<Utc>,
        step: Duration,
        values: Vec<f64>,
    ) -> Result<Self, AnalysisError> {
        let samples = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (start + step * i as i32, v))
            .collect();
        Self::new(id, samples)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of finite values.
    pub fn valid_len(&self) -> usize {
        self.values.iter().filter(|v| v.is_finite()).count()
    }

    /// Strips missing values and keeps the most recent `regression_window`
    /// of what remains. Fails when fewer than `minimum_points` survive.
    pub fn analysis_window(
        &self,
        minimum_points: usize,
        regression_window: usize,
    ) -> Result<SeriesWindow, AnalysisError> {
        let (timestamps, values): (Vec<DateTime<Utc>>, Vec<f64>) = self
            .timestamps
            .iter()
            .zip(self.values.iter())
            .filter(|(_, v)| v.is_finite())
            .map(|(t, v)| (*t, *v))
            .unzip();

        if values.len() < minimum_points {
            return Err(AnalysisError::InsufficientData {
                series_id: self.id.clone(),
                required: minimum_points,
                available: values.len(),
            });
        }

        let window_start_index = values.len().saturating_sub(regression_window.max(minimum_points));
        Ok(SeriesWindow {
            timestamps: timestamps[window_start_index..].to_vec(),
            values: values[window_start_index..].to_vec(),
            window_start_index,
        })
    }
}

/// The cleaned, most-recent slice of a series that a regression is fitted on.
/// `window_start_index` is the offset of the first point within the cleaned
/// (NaN-free) series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesWindow {
    pub timestamps: Vec<DateTime<Utc>>,
    pub values: Vec<f64>,
    pub window_start_index: usize,
}

impl SeriesWindow {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
