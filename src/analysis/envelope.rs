use crate::analysis::{AnalysisError, RegressionResult};
use crate::config::{ENGINE, validate_sigma};
use crate::utils::maths_utils::safe_ratio;

/// Where a value sits relative to the envelope at its index.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, serde::Serialize)]
pub enum EnvelopePosition {
    /// Never analysed (or state reset)
    #[default]
    Unknown,
    Inside,
    Outside,
}

/// Symmetric band of `sigma_multiplier × residual_std` around the fitted line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub sigma_multiplier: f64,
    pub residual_std: f64,
    slope: f64,
    intercept: f64,
    len: usize,
}

impl Envelope {
    pub fn new(regression: &RegressionResult, sigma_multiplier: f64) -> Result<Self, AnalysisError> {
        Ok(Self {
            sigma_multiplier: validate_sigma(sigma_multiplier)?,
            residual_std: regression.residual_std,
            slope: regression.slope,
            intercept: regression.intercept,
            len: regression.n,
        })
    }

    /// Number of window points the envelope was built for.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn predicted(&self, i: usize) -> f64 {
        self.slope * i as f64 + self.intercept
    }

    #[inline]
    pub fn half_width(&self) -> f64 {
        self.sigma_multiplier * self.residual_std
    }

    #[inline]
    pub fn upper(&self, i: usize) -> f64 {
        self.predicted(i) + self.half_width()
    }

    #[inline]
    pub fn lower(&self, i: usize) -> f64 {
        self.predicted(i) - self.half_width()
    }

    pub fn upper_boundary(&self) -> Vec<f64> {
        (0..self.len).map(|i| self.upper(i)).collect()
    }

    pub fn lower_boundary(&self) -> Vec<f64> {
        (0..self.len).map(|i| self.lower(i)).collect()
    }

    /// Boundary inclusive: a value exactly on a boundary is inside.
    pub fn contains(&self, i: usize, value: f64) -> bool {
        self.lower(i) <= value && value <= self.upper(i)
    }

    pub fn position(&self, i: usize, value: f64) -> EnvelopePosition {
        if self.contains(i, value) {
            EnvelopePosition::Inside
        } else {
            EnvelopePosition::Outside
        }
    }

    /// A band with no measurable width cannot call a breakout.
    pub fn is_degenerate(&self) -> bool {
        self.residual_std <= ENGINE.envelope.degenerate_residual_std
    }

    /// |value - predicted(i)| in residual standard deviations. NaN on a
    /// degenerate envelope.
    pub fn sigma_distance(&self, i: usize, value: f64) -> f64 {
        if self.is_degenerate() {
            return f64::NAN;
        }
        (value - self.predicted(i)).abs() / self.residual_std
    }
}

/// sqrt(mean(residual²)) / |mean(values)|. NaN when the mean is zero.
pub fn normalized_rmse(regression: &RegressionResult) -> f64 {
    safe_ratio(regression.rmse, regression.mean.abs())
}
