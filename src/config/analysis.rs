//! Analysis and alerting configuration

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::analysis::AnalysisError;
use crate::domain::SeriesSpec;

/// Settings for the regression window
pub struct RegressionSettings {
    // Fewer valid points than this and the series is skipped for the tick
    pub minimum_points: usize,
    // Most recent points fitted (168 = 7 days of hourly data)
    pub regression_window: usize,
    // Below this a fit has no degrees of freedom left for a p-value
    pub absolute_minimum_points: usize,
}

/// Settings for the confidence envelope
pub struct EnvelopeSettings {
    pub default_sigma: f64,
    pub min_sigma: f64,
    pub max_sigma: f64,
    // Residual spread at or below this is treated as a zero-width envelope
    pub degenerate_residual_std: f64,
}

/// Settings for alert classification and formatting
pub struct AlertSettings {
    // Breakouts in a single tick needed to raise a multi-breakout alert
    pub multi_breakout_threshold: usize,
    // Sigma distances separating the Moderate / High / Extreme labels
    pub high_sigma: f64,
    pub extreme_sigma: f64,
    // A fit with r² below this AND normalized RMSE above the next is flagged
    pub anomaly_max_r_squared: f64,
    pub anomaly_min_normalized_rmse: f64,
    // Display durations forwarded to the notification channel
    pub breakout_duration_ms: u64,
    pub multi_breakout_duration_ms: u64,
    pub anomaly_duration_ms: u64,
}

/// The master engine defaults
pub struct EngineDefaults {
    pub regression: RegressionSettings,
    pub envelope: EnvelopeSettings,
    pub alerts: AlertSettings,
}

pub const ENGINE: EngineDefaults = EngineDefaults {
    regression: RegressionSettings {
        minimum_points: 48,
        regression_window: 168,
        absolute_minimum_points: 3,
    },

    envelope: EnvelopeSettings {
        default_sigma: 2.0,
        min_sigma: 1.0,
        max_sigma: 4.0,
        degenerate_residual_std: 1e-10,
    },

    alerts: AlertSettings {
        multi_breakout_threshold: 3,
        high_sigma: 3.0,
        extreme_sigma: 4.0,
        anomaly_max_r_squared: 0.1,
        anomaly_min_normalized_rmse: 0.2,
        breakout_duration_ms: 8_000,
        multi_breakout_duration_ms: 10_000,
        anomaly_duration_ms: 5_000,
    },
};

/// Runtime configuration handed to the engine at construction.
/// Every field is range-checked by [`EngineConfig::validate`]; nothing is clamped.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub sigma_multiplier: f64,
    pub minimum_points: usize,
    pub regression_window: usize,
    pub multi_breakout_threshold: usize,
    pub series: Vec<SeriesSpec>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sigma_multiplier: ENGINE.envelope.default_sigma,
            minimum_points: ENGINE.regression.minimum_points,
            regression_window: ENGINE.regression.regression_window,
            multi_breakout_threshold: ENGINE.alerts.multi_breakout_threshold,
            series: Vec::new(),
        }
    }
}

/// Rejects sigma multipliers outside the supported band.
pub fn validate_sigma(sigma: f64) -> Result<f64, AnalysisError> {
    let band = &ENGINE.envelope;
    if !sigma.is_finite() || sigma < band.min_sigma || sigma > band.max_sigma {
        return Err(AnalysisError::invalid(
            "sigma_multiplier",
            sigma,
            format!("must be within {:.1}..={:.1}", band.min_sigma, band.max_sigma),
        ));
    }
    Ok(sigma)
}

impl EngineConfig {
    pub fn with_series(series: Vec<SeriesSpec>) -> Self {
        Self {
            series,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        validate_sigma(self.sigma_multiplier)?;

        let floor = ENGINE.regression.absolute_minimum_points;
        if self.minimum_points < floor {
            return Err(AnalysisError::invalid(
                "minimum_points",
                self.minimum_points,
                format!("must be at least {}", floor),
            ));
        }
        if self.regression_window < self.minimum_points {
            return Err(AnalysisError::invalid(
                "regression_window",
                self.regression_window,
                format!("must not be below minimum_points ({})", self.minimum_points),
            ));
        }
        if self.multi_breakout_threshold < 2 {
            return Err(AnalysisError::invalid(
                "multi_breakout_threshold",
                self.multi_breakout_threshold,
                "a simultaneous breakout needs at least 2 series",
            ));
        }

        let mut seen = HashSet::new();
        for spec in &self.series {
            if spec.id.trim().is_empty() {
                return Err(AnalysisError::invalid("series.id", "\"\"", "must not be empty"));
            }
            if !seen.insert(spec.id.as_str()) {
                return Err(AnalysisError::invalid(
                    "series.id",
                    &spec.id,
                    "duplicate series identifier",
                ));
            }
        }
        Ok(())
    }
}
