// Breakout detection: regression fit, confidence envelope and edge classifier
pub mod breakout;
pub mod envelope;
pub mod error;
pub mod regression;
pub mod series_analysis;

// Re-export commonly used types
pub use breakout::{
    BreakoutDirection, BreakoutEvent, Classification, ConfidenceLabel, Crossing, Observation,
    Verdict, classify,
};
pub use envelope::{Envelope, EnvelopePosition, normalized_rmse};
pub use error::AnalysisError;
pub use regression::{RegressionResult, fit_regression, fit_window};
pub use series_analysis::{RegressionDiagnostics, SeriesAnalysis, analyze_series, diagnose};
