#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]

// Core modules
pub mod alerts;
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod utils;

// The orchestrator
pub mod engine;

// Re-export commonly used types
pub use alerts::{AlertPayload, LogNotifier, Notifier, dispatch_report};
pub use analysis::{AnalysisError, BreakoutEvent, Envelope, RegressionResult};
pub use config::{EngineConfig, default_series_specs};
pub use data::{InMemoryFetcher, JsonSnapshotFetcher, SeriesFetcher};
pub use domain::{SeriesKind, SeriesSpec, TimeSeries};
pub use engine::{BreakoutEngine, MultiBreakoutEvent, TickReport, TickScheduler};

// CLI argument parsing
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON snapshot to read series from (re-read before every tick)
    #[arg(long, default_value = config::SNAPSHOT_PATH)]
    pub snapshot: PathBuf,

    /// Envelope width in residual standard deviations (1.0 - 4.0)
    #[arg(long, default_value_t = config::ENGINE.envelope.default_sigma)]
    pub sigma: f64,

    /// Minimum valid points before a series is analysed
    #[arg(long, default_value_t = config::ENGINE.regression.minimum_points)]
    pub min_points: usize,

    /// Number of most recent points fitted
    #[arg(long, default_value_t = config::ENGINE.regression.regression_window)]
    pub window: usize,

    /// Seconds between ticks
    #[arg(long, default_value_t = 60)]
    pub interval_secs: u64,

    /// Stop after this many ticks (0 = run until interrupted)
    #[arg(long, default_value_t = 1)]
    pub ticks: u64,

    /// Monitor the built-in series catalogue instead of the snapshot's own specs
    #[arg(long, default_value_t = false)]
    pub default_catalogue: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long, default_value_t = false)]
    pub print_config: bool,
}

impl Cli {
    /// Engine configuration for the given series, not yet validated.
    pub fn engine_config(&self, series: Vec<SeriesSpec>) -> EngineConfig {
        EngineConfig {
            sigma_multiplier: self.sigma,
            minimum_points: self.min_points,
            regression_window: self.window,
            series,
            ..Default::default()
        }
    }
}
