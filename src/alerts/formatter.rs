use itertools::Itertools;
use serde::Serialize;

use crate::analysis::{BreakoutEvent, ConfidenceLabel};
use crate::config::ENGINE;
use crate::domain::{SeriesKind, slug};
use crate::engine::{AnomalyNote, MultiBreakoutEvent};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Numbers behind an alert, for channels that render them separately.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericContext {
    pub current: f64,
    pub expected: f64,
    pub sigma_distance: f64,
}

/// Channel-agnostic alert, ready for a notifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertPayload {
    pub title: String,
    pub body: String,
    pub severity: Severity,
    pub series_ids: Vec<String>,
    /// Channels replace an earlier alert carrying the same tag
    pub tag: String,
    pub duration_ms: u64,
    pub context: Option<NumericContext>,
}

pub fn format_breakout(event: &BreakoutEvent) -> AlertPayload {
    let severity = match event.confidence_label {
        ConfidenceLabel::Moderate => Severity::Warning,
        ConfidenceLabel::High | ConfidenceLabel::Extreme => Severity::Critical,
    };

    let body = format!(
        "{}: {}\n{:.1}σ {} trend ({:.0}% confidence)\nActual: {} | Expected: {}",
        event.kind.label(),
        event.display_name,
        event.sigma_distance,
        event.direction.relation(),
        event.confidence_pct,
        format_value(event.kind, event.current_value),
        format_value(event.kind, event.predicted_value),
    );

    AlertPayload {
        title: format!("🚨 {} Statistical Breakout", event.direction.arrow()),
        body,
        severity,
        series_ids: vec![event.series_id.clone()],
        tag: format!("statistical_{}_{}", event.kind, slug(&event.display_name)),
        duration_ms: ENGINE.alerts.breakout_duration_ms,
        context: Some(NumericContext {
            current: event.current_value,
            expected: event.predicted_value,
            sigma_distance: event.sigma_distance,
        }),
    }
}

pub fn format_multi_breakout(event: &MultiBreakoutEvent) -> AlertPayload {
    let summary = event.kinds.iter().map(|k| k.short_label()).join(", ");
    AlertPayload {
        title: format!("🚨 Multiple Breakouts Detected ({})", event.series_ids.len()),
        body: format!(
            "Simultaneous breakouts across: {}\nThis may indicate significant market movement",
            summary
        ),
        severity: Severity::Critical,
        series_ids: event.series_ids.clone(),
        tag: "multiple_breakouts".to_string(),
        duration_ms: ENGINE.alerts.multi_breakout_duration_ms,
        context: None,
    }
}

pub fn format_regression_anomaly(note: &AnomalyNote) -> AlertPayload {
    let d = &note.diagnostics;
    AlertPayload {
        title: format!("⚠️ {} Regression Anomaly", note.kind.icon()),
        body: format!(
            "{} showing unusual pattern\nR² = {:.1}% | RMSE = {:.1}%\nTrend reliability compromised",
            note.display_name,
            d.r_squared * 100.0,
            d.normalized_rmse * 100.0
        ),
        severity: Severity::Warning,
        series_ids: vec![note.series_id.clone()],
        tag: format!("anomaly_{}_{}", note.kind, slug(&note.display_name)),
        duration_ms: ENGINE.alerts.anomaly_duration_ms,
        context: None,
    }
}

/// Kind-aware value rendering: `$1,234.56` for prices, `+1.23%` for futures
/// premiums, one decimal otherwise.
pub fn format_value(kind: SeriesKind, value: f64) -> String {
    match kind {
        SeriesKind::Prices => {
            let sign = if value < 0.0 { "-" } else { "" };
            format!("{}${}", sign, with_thousands(value.abs(), 2))
        }
        SeriesKind::FuturesPremiums => format!("{:+.2}%", value),
        _ => format!("{:.1}", value),
    }
}

fn with_thousands(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value);
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let grouped = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .join(",");

    match frac_part {
        Some(f) => format!("{}.{}", grouped, f),
        None => grouped,
    }
}
