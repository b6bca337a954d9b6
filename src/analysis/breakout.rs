use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::{Envelope, EnvelopePosition, RegressionResult};
use crate::config::ENGINE;
use crate::domain::{SeriesKind, SeriesSpec};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakoutDirection {
    Upward,
    Downward,
}

impl BreakoutDirection {
    /// Word used in alert bodies ("2.4σ above trend")
    pub fn relation(&self) -> &'static str {
        match self {
            BreakoutDirection::Upward => "above",
            BreakoutDirection::Downward => "below",
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            BreakoutDirection::Upward => "📈",
            BreakoutDirection::Downward => "📉",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLabel {
    Moderate,
    High,
    Extreme,
}

impl ConfidenceLabel {
    pub fn from_sigma_distance(sigma_distance: f64) -> Self {
        let alerts = &ENGINE.alerts;
        if sigma_distance >= alerts.extreme_sigma {
            ConfidenceLabel::Extreme
        } else if sigma_distance >= alerts.high_sigma {
            ConfidenceLabel::High
        } else {
            ConfidenceLabel::Moderate
        }
    }
}

/// One point of the fitted window, addressed by its window index.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Observation {
    pub index: usize,
    pub value: f64,
}

/// The numbers behind a crossing of the envelope.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Crossing {
    pub direction: BreakoutDirection,
    pub previous_value: f64,
    pub current_value: f64,
    pub predicted_value: f64,
    pub sigma_distance: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Verdict {
    /// Inside -> Outside edge
    Breakout(Crossing),
    NoBreakout,
    /// Zero-width envelope: cannot evaluate a breakout
    Degenerate,
}

/// Classifier output. `position` is always filled so the caller can update
/// its series state whether or not an event fired.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Classification {
    pub position: EnvelopePosition,
    pub verdict: Verdict,
}

impl Classification {
    pub fn crossing(&self) -> Option<&Crossing> {
        match &self.verdict {
            Verdict::Breakout(crossing) => Some(crossing),
            _ => None,
        }
    }
}

/// Decides whether `current` just left the envelope.
///
/// Fires only on the edge: the prior state must be `Inside`, `previous` must
/// lie within `[lower, upper]` at its index and `current` strictly outside at
/// its own. `Unknown` and `Outside` priors never fire, so a sustained
/// deviation alerts once.
pub fn classify(
    envelope: &Envelope,
    previous: Observation,
    current: Observation,
    prior: EnvelopePosition,
) -> Classification {
    let position = envelope.position(current.index, current.value);

    if envelope.is_degenerate() {
        return Classification {
            position,
            verdict: Verdict::Degenerate,
        };
    }

    let was_inside =
        prior == EnvelopePosition::Inside && envelope.contains(previous.index, previous.value);

    let verdict = if was_inside && position == EnvelopePosition::Outside {
        let direction = if current.value > envelope.upper(current.index) {
            BreakoutDirection::Upward
        } else {
            BreakoutDirection::Downward
        };
        Verdict::Breakout(Crossing {
            direction,
            previous_value: previous.value,
            current_value: current.value,
            predicted_value: envelope.predicted(current.index),
            sigma_distance: envelope.sigma_distance(current.index, current.value),
        })
    } else {
        Verdict::NoBreakout
    };

    Classification { position, verdict }
}

/// A confirmed breakout of one series. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakoutEvent {
    pub series_id: String,
    pub display_name: String,
    pub kind: SeriesKind,
    pub timestamp: DateTime<Utc>,
    pub direction: BreakoutDirection,
    pub previous_value: f64,
    pub current_value: f64,
    pub predicted_value: f64,
    pub sigma_distance: f64,
    pub confidence_label: ConfidenceLabel,
    /// min(100, |r| · 100 · (1 - p)): how much the trend itself can be trusted
    pub confidence_pct: f64,
}

impl BreakoutEvent {
    pub fn new(
        spec: &SeriesSpec,
        timestamp: DateTime<Utc>,
        crossing: &Crossing,
        regression: &RegressionResult,
    ) -> Self {
        Self {
            series_id: spec.id.clone(),
            display_name: spec.display_name.clone(),
            kind: spec.kind,
            timestamp,
            direction: crossing.direction,
            previous_value: crossing.previous_value,
            current_value: crossing.current_value,
            predicted_value: crossing.predicted_value,
            sigma_distance: crossing.sigma_distance,
            confidence_label: ConfidenceLabel::from_sigma_distance(crossing.sigma_distance),
            confidence_pct: trend_confidence_pct(regression),
        }
    }
}

pub fn trend_confidence_pct(regression: &RegressionResult) -> f64 {
    let pct = regression.r_value.abs() * 100.0 * (1.0 - regression.p_value);
    if pct.is_nan() { 0.0 } else { pct.min(100.0) }
}
