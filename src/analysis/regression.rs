use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::analysis::AnalysisError;
use crate::config::ENGINE;
use crate::domain::SeriesWindow;
use crate::utils::maths_utils::{mean, population_std, root_mean_square, sum_sq_deviations};

/// Ordinary least-squares fit of a window against the synthetic index `0..n`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    pub r_value: f64,
    /// Two-sided p-value for the null hypothesis "slope == 0"
    pub p_value: f64,
    /// Standard error of the slope
    pub standard_error: f64,
    /// Population standard deviation of the residuals
    pub residual_std: f64,
    pub window_start_index: usize,

    pub n: usize,
    pub mean: f64,
    pub rmse: f64,
    /// actual - predicted, one per window point
    pub residuals: Vec<f64>,
}

impl RegressionResult {
    /// Value of the fitted line at window index `i`.
    #[inline]
    pub fn predicted(&self, i: usize) -> f64 {
        self.slope * i as f64 + self.intercept
    }

    pub fn r_squared(&self) -> f64 {
        self.r_value * self.r_value
    }

    pub fn last_index(&self) -> usize {
        self.n.saturating_sub(1)
    }
}

/// Fits a cleaned window, carrying its offset into the result.
pub fn fit_window(
    window: &SeriesWindow,
    minimum_points: usize,
) -> Result<RegressionResult, AnalysisError> {
    let mut result = fit_regression(&window.values, minimum_points)?;
    result.window_start_index = window.window_start_index;
    Ok(result)
}

/// Closed-form OLS over `values` (NaN already removed by the caller).
///
/// The index, not wall-clock time, is the regressor, which keeps the sums
/// small and the fit numerically stable. Pure: the same slice always yields a
/// bit-identical result.
pub fn fit_regression(
    values: &[f64],
    minimum_points: usize,
) -> Result<RegressionResult, AnalysisError> {
    let required = minimum_points.max(ENGINE.regression.absolute_minimum_points);
    let n = values.len();
    if n < required {
        return Err(AnalysisError::InsufficientData {
            series_id: String::new(),
            required,
            available: n,
        });
    }
    if let Some(bad) = values.iter().position(|v| !v.is_finite()) {
        return Err(AnalysisError::invalid(
            "values",
            values[bad],
            format!("non-finite value at index {}, strip missing values first", bad),
        ));
    }

    let y_mean = mean(values);

    // Zero variance: flat line through the constant, nothing to explain.
    if values.iter().all(|v| *v == values[0]) {
        return Ok(RegressionResult {
            slope: 0.0,
            intercept: values[0],
            r_value: 0.0,
            p_value: 1.0,
            standard_error: 0.0,
            residual_std: 0.0,
            window_start_index: 0,
            n,
            mean: values[0],
            rmse: 0.0,
            residuals: vec![0.0; n],
        });
    }

    let nf = n as f64;
    let x_mean = (nf - 1.0) / 2.0;
    let ss_xx: f64 = (0..n).map(|i| (i as f64 - x_mean).powi(2)).sum();
    let ss_yy = sum_sq_deviations(values, y_mean);
    let ss_xy: f64 = values
        .iter()
        .enumerate()
        .map(|(i, y)| (i as f64 - x_mean) * (y - y_mean))
        .sum();

    let slope = ss_xy / ss_xx;
    let intercept = y_mean - slope * x_mean;

    let r_value = if ss_yy > 0.0 {
        (ss_xy / (ss_xx * ss_yy).sqrt()).clamp(-1.0, 1.0)
    } else {
        0.0
    };

    let df = nf - 2.0;
    let one_minus_r2 = (1.0 - r_value) * (1.0 + r_value);
    let (p_value, standard_error) = if one_minus_r2 <= 0.0 {
        // Perfect fit
        (0.0, 0.0)
    } else {
        let t = r_value * (df / one_minus_r2).sqrt();
        let se = (one_minus_r2 * ss_yy / ss_xx / df).sqrt();
        (two_sided_p_value(t, df), se)
    };

    let residuals: Vec<f64> = values
        .iter()
        .enumerate()
        .map(|(i, y)| y - (slope * i as f64 + intercept))
        .collect();

    Ok(RegressionResult {
        slope,
        intercept,
        r_value,
        p_value,
        standard_error,
        residual_std: population_std(&residuals),
        window_start_index: 0,
        n,
        mean: y_mean,
        rmse: root_mean_square(&residuals),
        residuals,
    })
}

/// P(|T| >= |t|) for a Student t with `df` degrees of freedom.
fn two_sided_p_value(t: f64, df: f64) -> f64 {
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * dist.sf(t.abs())).min(1.0),
        Err(e) => {
            log::warn!("Cannot build t-distribution with df={}: {}", df, e);
            f64::NAN
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn recovers_exact_line() {
        let values: Vec<f64> = (0..50).map(|i| 3.0 + 0.5 * i as f64).collect();
        let fit = fit_regression(&values, 48).unwrap();
        assert!(approx_eq(fit.slope, 0.5, 1e-12));
        assert!(approx_eq(fit.intercept, 3.0, 1e-9));
        assert!(approx_eq(fit.r_value, 1.0, 1e-12));
        assert!(fit.residual_std < 1e-9);
        assert!(fit.p_value < 1e-12);
    }

    #[test]
    fn constant_series_has_zero_slope_and_spread() {
        for constant in [0.0, 0.1, 100.0, -7.3] {
            let fit = fit_regression(&[constant; 60], 48).unwrap();
            assert_eq!(fit.slope, 0.0);
            assert_eq!(fit.r_value, 0.0);
            assert_eq!(fit.residual_std, 0.0);
            assert_eq!(fit.predicted(59), constant);
        }
    }

    #[test]
    fn fitting_is_deterministic() {
        let values: Vec<f64> = (0..168)
            .map(|i| 50.0 + (i as f64 * 0.37).sin() * 4.0 + i as f64 * 0.1)
            .collect();
        let a = fit_regression(&values, 48).unwrap();
        let b = fit_regression(&values, 48).unwrap();
        assert_eq!(a.slope.to_bits(), b.slope.to_bits());
        assert_eq!(a.intercept.to_bits(), b.intercept.to_bits());
        assert_eq!(a.p_value.to_bits(), b.p_value.to_bits());
        assert_eq!(a.residual_std.to_bits(), b.residual_std.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn matches_reference_statistics() {
        // y = [1, 3, 2, 5, 4], x = 0..5
        // ss_xx = 10, ss_xy = 8, ss_yy = 10 -> slope 0.8, intercept 1.4, r = 0.8
        let values = [1.0, 3.0, 2.0, 5.0, 4.0];
        let fit = fit_regression(&values, 3).unwrap();
        assert!(approx_eq(fit.slope, 0.8, 1e-12));
        assert!(approx_eq(fit.intercept, 1.4, 1e-12));
        assert!(approx_eq(fit.r_value, 0.8, 1e-12));
        // se = sqrt((1 - 0.64) * 10 / 10 / 3) = sqrt(0.12)
        assert!(approx_eq(fit.standard_error, 0.12f64.sqrt(), 1e-12));
        // t = 0.8 * sqrt(3 / 0.36) = 2.3094, df = 3 -> p ≈ 0.1041
        assert!(approx_eq(fit.p_value, 0.1041, 1e-3));
        // residuals [-0.4, 0.8, -1.0, 1.2, -0.6] -> population variance 0.72
        assert!(approx_eq(fit.residual_std, 0.72f64.sqrt(), 1e-12));
    }

    #[test]
    fn short_input_is_insufficient() {
        let err = fit_regression(&[1.0; 30], 48).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientData {
                required: 48,
                available: 30,
                ..
            }
        ));
    }

    #[test]
    fn nan_input_is_rejected() {
        let mut values = vec![1.0; 50];
        values[3] = f64::NAN;
        assert!(fit_regression(&values, 48).is_err());
    }
}
