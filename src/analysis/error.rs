use std::error::Error;
use std::fmt;

/// Failures raised by the analysis pipeline and by configuration checks.
///
/// `InsufficientData` is recoverable: the engine skips the series for the
/// current tick. `InvalidParameter` is raised at configuration time and is
/// meant to abort construction. A zero-width envelope is not an error at all,
/// see [`crate::analysis::Verdict::Degenerate`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    InsufficientData {
        series_id: String,
        required: usize,
        available: usize,
    },
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },
    UnorderedTimestamps {
        series_id: String,
        index: usize,
    },
}

impl AnalysisError {
    pub fn invalid(name: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors the orchestrator recovers from by skipping the series.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AnalysisError::InvalidParameter { .. })
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnalysisError::InsufficientData {
                series_id,
                required,
                available,
            } => write!(
                f,
                "Insufficient data for {}: {} valid points, need at least {}",
                series_id, available, required
            ),
            AnalysisError::InvalidParameter {
                name,
                value,
                reason,
            } => write!(f, "Invalid parameter {} = {}: {}", name, value, reason),
            AnalysisError::UnorderedTimestamps { series_id, index } => write!(
                f,
                "Timestamps of {} are not strictly increasing at index {}",
                series_id, index
            ),
        }
    }
}

impl Error for AnalysisError {}
