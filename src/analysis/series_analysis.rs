use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::breakout::{BreakoutEvent, Classification, Observation, classify};
use crate::analysis::envelope::{Envelope, EnvelopePosition, normalized_rmse};
use crate::analysis::regression::{RegressionResult, fit_window};
use crate::analysis::AnalysisError;
use crate::config::{ENGINE, EngineConfig};
use crate::domain::{SeriesSpec, TimeSeries};

/// Everything one pass of fit -> envelope -> classify produced for a series.
#[derive(Debug, Clone)]
pub struct SeriesAnalysis {
    pub series_id: String,
    pub regression: RegressionResult,
    pub envelope: Envelope,
    pub classification: Classification,
    pub event: Option<BreakoutEvent>,
    pub last_timestamp: DateTime<Utc>,
    pub last_value: f64,
    pub diagnostics: RegressionDiagnostics,
}

/// Runs the full per-series pipeline against the prior envelope position.
pub fn analyze_series(
    spec: &SeriesSpec,
    series: &TimeSeries,
    config: &EngineConfig,
    prior: EnvelopePosition,
) -> Result<SeriesAnalysis, AnalysisError> {
    let window = series
        .analysis_window(config.minimum_points, config.regression_window)
        .map_err(|e| with_series_id(e, &spec.id))?;

    let regression = fit_window(&window, config.minimum_points)
        .map_err(|e| with_series_id(e, &spec.id))?;
    let envelope = Envelope::new(&regression, config.sigma_multiplier)?;

    // The window always holds at least `absolute_minimum_points` (>= 3) values
    let current_idx = window.len() - 1;
    let previous_idx = current_idx - 1;
    let current = Observation {
        index: current_idx,
        value: window.values[current_idx],
    };
    let previous = Observation {
        index: previous_idx,
        value: window.values[previous_idx],
    };

    let classification = classify(&envelope, previous, current, prior);
    let last_timestamp = window.timestamps[current_idx];

    let event = classification
        .crossing()
        .map(|crossing| BreakoutEvent::new(spec, last_timestamp, crossing, &regression));

    let diagnostics = RegressionDiagnostics::new(&regression, config.sigma_multiplier);

    Ok(SeriesAnalysis {
        series_id: spec.id.clone(),
        regression,
        envelope,
        classification,
        event,
        last_timestamp,
        last_value: current.value,
        diagnostics,
    })
}

fn with_series_id(err: AnalysisError, id: &str) -> AnalysisError {
    match err {
        AnalysisError::InsufficientData {
            required,
            available,
            ..
        } => AnalysisError::InsufficientData {
            series_id: id.to_string(),
            required,
            available,
        },
        other => other,
    }
}

/// Fit quality summary for dashboards and anomaly alerts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionDiagnostics {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub p_value: f64,
    pub rmse: f64,
    pub normalized_rmse: f64,
    pub sigma_multiplier: f64,
    pub data_points: usize,
}

impl RegressionDiagnostics {
    pub fn new(regression: &RegressionResult, sigma_multiplier: f64) -> Self {
        Self {
            slope: regression.slope,
            intercept: regression.intercept,
            r_squared: regression.r_squared(),
            p_value: regression.p_value,
            rmse: regression.rmse,
            normalized_rmse: normalized_rmse(regression),
            sigma_multiplier,
            data_points: regression.n,
        }
    }

    /// The trend explains little and the scatter is large relative to the level.
    // NaN normalized RMSE (zero-mean series) never counts as anomalous.
    pub fn is_anomalous(&self) -> bool {
        self.r_squared < ENGINE.alerts.anomaly_max_r_squared
            && self.normalized_rmse > ENGINE.alerts.anomaly_min_normalized_rmse
    }
}

/// Diagnostics for a series without touching any state.
pub fn diagnose(
    series: &TimeSeries,
    config: &EngineConfig,
) -> Result<RegressionDiagnostics, AnalysisError> {
    let window = series
        .analysis_window(config.minimum_points, config.regression_window)?;
    let regression = fit_window(&window, config.minimum_points)?;
    Ok(RegressionDiagnostics::new(&regression, config.sigma_multiplier))
}
