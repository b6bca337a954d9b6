use chrono::{DateTime, Utc};
use itertools::Itertools;
use std::collections::HashMap;

use crate::analysis::{
    AnalysisError, BreakoutEvent, EnvelopePosition, RegressionDiagnostics, analyze_series,
};
use crate::config::{DEBUG_FLAGS, EngineConfig, validate_sigma};
use crate::data::SeriesFetcher;
use crate::domain::{SeriesSpec, TimeSeries};
use crate::utils::time_utils::format_utc;

use super::messages::{AnomalyNote, MultiBreakoutEvent, SkippedSeries, TickReport};
use super::state::{SeriesRegistry, SeriesState};

pub struct BreakoutEngine {
    /// Validated configuration, including the monitored series
    config: EngineConfig,

    /// Per-series envelope position, the only state carried between ticks
    registry: SeriesRegistry,

    /// Fit diagnostics from each series' latest successful analysis
    diagnostics: HashMap<String, RegressionDiagnostics>,

    enabled: bool,
    ticks_run: u64,
}

impl BreakoutEngine {
    /// Validates the configuration up front; a bad value aborts construction.
    pub fn new(config: EngineConfig) -> Result<Self, AnalysisError> {
        config.validate()?;

        log::info!(
            "Breakout engine ready: {} series, sigma {:.1}, window {} (min {})",
            config.series.len(),
            config.sigma_multiplier,
            config.regression_window,
            config.minimum_points
        );

        Ok(Self {
            config,
            registry: SeriesRegistry::new(),
            diagnostics: HashMap::new(),
            enabled: true,
            ticks_run: 0,
        })
    }

    /// THE TICK.
    /// Fetches and analyses every configured series in order. One series
    /// failing never stops the others; it is reported in `skipped` instead.
    pub fn run_tick(&mut self, fetcher: &dyn SeriesFetcher, tick_ts: DateTime<Utc>) -> TickReport {
        let mut report = TickReport::empty(tick_ts);
        if !self.enabled {
            return report;
        }

        for spec in &self.config.series {
            let series = match fetcher.fetch(spec) {
                Ok(series) => series,
                Err(e) => {
                    log::warn!("[{}] Skipped: fetch failed: {:#}", spec.id, e);
                    report.skipped.push(SkippedSeries {
                        series_id: spec.id.clone(),
                        reason: format!("fetch failed: {:#}", e),
                    });
                    continue;
                }
            };

            let outcome = track_series(
                &self.config,
                &mut self.registry,
                &mut self.diagnostics,
                spec,
                &series,
            );
            match outcome {
                Ok((event, anomaly)) => {
                    report.analysed += 1;
                    report.breakouts.extend(event);
                    report.anomalies.extend(anomaly);
                }
                Err(e) => {
                    log::warn!("[{}] Skipped: {}", spec.id, e);
                    report.skipped.push(SkippedSeries {
                        series_id: spec.id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.multi_breakout = self.detect_multi_breakout(&report.breakouts, tick_ts);
        self.ticks_run += 1;

        if DEBUG_FLAGS.print_tick_summary {
            log::info!(
                "Tick {} @ {}: analysed {}, skipped {}, breakouts {}{}",
                self.ticks_run,
                format_utc(&tick_ts),
                report.analysed,
                report.skipped.len(),
                report.breakouts.len(),
                if report.multi_breakout.is_some() {
                    " (MULTI)"
                } else {
                    ""
                }
            );
        }

        report
    }

    /// Analyse one series that the caller already holds, updating its state.
    pub fn process_series(
        &mut self,
        spec: &SeriesSpec,
        series: &TimeSeries,
    ) -> Result<Option<BreakoutEvent>, AnalysisError> {
        let (event, _) = track_series(
            &self.config,
            &mut self.registry,
            &mut self.diagnostics,
            spec,
            series,
        )?;
        Ok(event)
    }

    fn detect_multi_breakout(
        &self,
        breakouts: &[BreakoutEvent],
        tick_ts: DateTime<Utc>,
    ) -> Option<MultiBreakoutEvent> {
        if breakouts.len() < self.config.multi_breakout_threshold {
            return None;
        }
        log::warn!(
            "Simultaneous breakouts across {} series: {}",
            breakouts.len(),
            breakouts.iter().map(|b| b.series_id.as_str()).join(", ")
        );
        Some(MultiBreakoutEvent {
            series_ids: breakouts.iter().map(|b| b.series_id.clone()).collect(),
            kinds: breakouts.iter().map(|b| b.kind).unique().collect(),
            tick_timestamp: tick_ts,
        })
    }

    // --- CONFIG / LIFECYCLE ---

    /// Changes the envelope width for subsequent ticks. Out-of-range values
    /// are rejected, not clamped.
    pub fn set_sigma_multiplier(&mut self, sigma: f64) -> Result<(), AnalysisError> {
        self.config.sigma_multiplier = validate_sigma(sigma)?;
        Ok(())
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Forget every series' state (session reset).
    pub fn reset(&mut self) {
        self.registry.reset();
        self.diagnostics.clear();
        self.ticks_run = 0;
    }

    // --- ACCESSORS ---

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &SeriesRegistry {
        &self.registry
    }

    pub fn series_state(&self, series_id: &str) -> Option<&SeriesState> {
        self.registry.get(series_id)
    }

    pub fn position(&self, series_id: &str) -> EnvelopePosition {
        self.registry.position(series_id)
    }

    pub fn diagnostics(&self, series_id: &str) -> Option<&RegressionDiagnostics> {
        self.diagnostics.get(series_id)
    }

    pub fn ticks_run(&self) -> u64 {
        self.ticks_run
    }
}

/// Runs one series through the analysis and records the outcome. Returns the
/// breakout event, if any, and an anomaly note when the fit has just turned
/// anomalous; a series that stays anomalous is reported once.
fn track_series(
    config: &EngineConfig,
    registry: &mut SeriesRegistry,
    diagnostics: &mut HashMap<String, RegressionDiagnostics>,
    spec: &SeriesSpec,
    series: &TimeSeries,
) -> Result<(Option<BreakoutEvent>, Option<AnomalyNote>), AnalysisError> {
    let prior = registry.position(&spec.id);
    let analysis = analyze_series(spec, series, config, prior)?;

    let position = analysis.classification.position;
    registry.record(&spec.id, position, analysis.last_timestamp, analysis.last_value);

    let diag = analysis.diagnostics;
    let anomalous = diag.is_anomalous();
    let was_anomalous = registry.set_anomalous(&spec.id, anomalous);
    diagnostics.insert(spec.id.clone(), diag);

    if DEBUG_FLAGS.print_state_transitions && prior != position {
        log::info!("[{}] Envelope position {:?} -> {:?}", spec.id, prior, position);
    }
    if DEBUG_FLAGS.print_series_diagnostics {
        log::info!(
            "[{}] slope {:.4}, r² {:.3}, p {:.3}, nrmse {:.4}, n {}",
            spec.id,
            diag.slope,
            diag.r_squared,
            diag.p_value,
            diag.normalized_rmse,
            diag.data_points
        );
    }

    if let Some(event) = &analysis.event {
        log::info!(
            "[{}] Breakout {:?}: {:.4} vs expected {:.4} ({:.2}σ)",
            spec.id,
            event.direction,
            event.current_value,
            event.predicted_value,
            event.sigma_distance
        );
    }

    let anomaly = (anomalous && !was_anomalous).then(|| {
        log::info!(
            "[{}] Regression anomaly: r² {:.3}, nrmse {:.3}",
            spec.id,
            diag.r_squared,
            diag.normalized_rmse
        );
        AnomalyNote {
            series_id: spec.id.clone(),
            display_name: spec.display_name.clone(),
            kind: spec.kind,
            diagnostics: diag,
        }
    });

    Ok((analysis.event, anomaly))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::InMemoryFetcher;
    use crate::domain::SeriesKind;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()
    }

    fn zigzag(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect()
    }

    fn series(id: &str, values: Vec<f64>) -> TimeSeries {
        TimeSeries::from_uniform(id, start(), Duration::hours(1), values).unwrap()
    }

    #[test]
    fn invalid_config_fails_construction() {
        let config = EngineConfig {
            sigma_multiplier: 7.0,
            ..Default::default()
        };
        assert!(BreakoutEngine::new(config).is_err());
    }

    #[test]
    fn first_analysis_never_alerts() {
        let spec = SeriesSpec::new(SeriesKind::Prices, "BTC");
        let mut engine = BreakoutEngine::new(EngineConfig::with_series(vec![spec.clone()])).unwrap();

        let mut values = zigzag(100);
        values.push(150.0);
        let event = engine.process_series(&spec, &series(&spec.id, values)).unwrap();
        assert!(event.is_none());
        assert_eq!(engine.position(&spec.id), EnvelopePosition::Outside);
    }

    #[test]
    fn disabled_engine_leaves_state_alone() {
        let spec = SeriesSpec::new(SeriesKind::Volume, "BTCUSD");
        let mut fetcher = InMemoryFetcher::new();
        fetcher.insert(&spec.id, series(&spec.id, zigzag(60)));

        let mut engine = BreakoutEngine::new(EngineConfig::with_series(vec![spec])).unwrap();
        engine.set_enabled(false);
        let report = engine.run_tick(&fetcher, start());
        assert_eq!(report.analysed, 0);
        assert!(engine.registry().is_empty());
        assert_eq!(engine.ticks_run(), 0);
    }

    #[test]
    fn missing_data_is_skipped() {
        let spec = SeriesSpec::new(SeriesKind::Trends, "Solana");
        let mut engine = BreakoutEngine::new(EngineConfig::with_series(vec![spec])).unwrap();
        let report = engine.run_tick(&InMemoryFetcher::new(), start());
        assert_eq!(report.skipped.len(), 1);
        assert!(report.diagnostic_notes()[0].contains("trends_solana"));
        assert!(!report.has_alerts());
    }

    #[test]
    fn sigma_updates_are_validated() {
        let mut engine = BreakoutEngine::new(EngineConfig::default()).unwrap();
        assert!(engine.set_sigma_multiplier(3.0).is_ok());
        assert_eq!(engine.config().sigma_multiplier, 3.0);
        assert!(engine.set_sigma_multiplier(5.0).is_err());
        assert_eq!(engine.config().sigma_multiplier, 3.0);
    }

    #[test]
    fn persistent_anomaly_is_reported_once() {
        let spec = SeriesSpec::new(SeriesKind::Trends, "Bitcoin");
        let mut engine = BreakoutEngine::new(EngineConfig::with_series(vec![spec.clone()])).unwrap();

        let noisy: Vec<f64> = (0..100)
            .map(|i| 10.0 + if i % 2 == 0 { 5.0 } else { -5.0 })
            .collect();
        let clean: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();

        let mut fetcher = InMemoryFetcher::new();
        fetcher.insert(&spec.id, series(&spec.id, noisy.clone()));

        let notes: usize = (0..5)
            .map(|h| engine.run_tick(&fetcher, start() + Duration::hours(h)).anomalies.len())
            .sum();
        assert_eq!(notes, 1);
        assert!(engine.series_state(&spec.id).unwrap().anomalous);

        // Recovering clears the flag, so a relapse alerts again
        fetcher.insert(&spec.id, series(&spec.id, clean));
        assert!(engine.run_tick(&fetcher, start()).anomalies.is_empty());
        assert!(!engine.series_state(&spec.id).unwrap().anomalous);

        fetcher.insert(&spec.id, series(&spec.id, noisy));
        let report = engine.run_tick(&fetcher, start());
        assert_eq!(report.anomalies.len(), 1);
        assert_eq!(report.anomalies[0].series_id, spec.id);
        assert_eq!(report.anomalies[0].kind, SeriesKind::Trends);

        engine.reset();
        assert_eq!(engine.run_tick(&fetcher, start()).anomalies.len(), 1);
    }

    #[test]
    fn reset_forgets_positions_and_diagnostics() {
        let spec = SeriesSpec::new(SeriesKind::Prices, "ETH");
        let mut engine = BreakoutEngine::new(EngineConfig::with_series(vec![spec.clone()])).unwrap();
        engine.process_series(&spec, &series(&spec.id, zigzag(60))).unwrap();
        assert!(engine.diagnostics(&spec.id).is_some());

        engine.reset();
        assert_eq!(engine.position(&spec.id), EnvelopePosition::Unknown);
        assert!(engine.diagnostics(&spec.id).is_none());
    }
}
