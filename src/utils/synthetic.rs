//! Seeded synthetic series for demos and tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// `n` points of `base + slope·i + N(0, noise_std)`. Same seed, same values.
pub fn trending_values(n: usize, base: f64, slope: f64, noise_std: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let noise: f64 = rng.sample(StandardNormal);
            base + slope * i as f64 + noise_std * noise
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::maths_utils::{mean, population_std};

    #[test]
    fn same_seed_same_values() {
        assert_eq!(
            trending_values(20, 1.0, 0.1, 1.0, 7),
            trending_values(20, 1.0, 0.1, 1.0, 7)
        );
        assert_ne!(
            trending_values(20, 1.0, 0.1, 1.0, 7),
            trending_values(20, 1.0, 0.1, 1.0, 8)
        );
    }

    #[test]
    fn gaussian_noise_is_roughly_standard() {
        let values = trending_values(5_000, 0.0, 0.0, 1.0, 42);
        assert!(mean(&values).abs() < 0.1);
        assert!((population_std(&values) - 1.0).abs() < 0.1);
    }

    #[test]
    fn zero_noise_is_an_exact_line() {
        let values = trending_values(4, 10.0, 2.0, 0.0, 1);
        assert_eq!(values, vec![10.0, 12.0, 14.0, 16.0]);
    }
}
