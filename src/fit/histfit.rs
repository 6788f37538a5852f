//! Gaussian fit of a histogram with noise resampling.
//!
//! Fits `A·φ(x; μ, σ)` to histogram densities by least squares. The fit is
//! repeated `n_fit` times, each time adding independent Gaussian noise
//! (`N(0, error_rate)`) to `y`, and the reported parameters are the means over
//! repetitions. The spread of the repeated curves gives a pointwise envelope.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;
use statrs::statistics::Statistics;

use crate::catalog::{FamilyKind, density};
use crate::data::{Histogram, edges_to_centers};
use crate::error::FitError;
use crate::math::{SimplexOptions, nelder_mead};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistFitOptions {
    /// Standard deviation of the noise added to `y` on each repetition.
    pub error_rate: f64,
    pub n_fit: usize,
    pub seed: u64,
}

impl Default for HistFitOptions {
    fn default() -> Self {
        Self {
            error_rate: 0.05,
            n_fit: 100,
            seed: 0,
        }
    }
}

/// Result of [`HistFit::fit`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaussianHistFit {
    pub mu: f64,
    pub sigma: f64,
    pub amplitude: f64,
    pub mus: Vec<f64>,
    pub sigmas: Vec<f64>,
    pub amplitudes: Vec<f64>,
    /// Pointwise mean of the repeated fitted curves.
    pub mean_curve: Vec<f64>,
    /// Pointwise (population) standard deviation of the repeated curves.
    pub std_curve: Vec<f64>,
}

/// A histogram prepared for Gaussian fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct HistFit {
    x: Vec<f64>,
    y: Vec<f64>,
    guess: [f64; 3],
}

impl HistFit {
    /// Density histogram of `data`; starts from the sample mean and std.
    pub fn from_sample(data: &[f64], bins: usize) -> Result<Self, FitError> {
        if data.iter().any(|v| !v.is_finite()) {
            return Err(FitError::InvalidSample("Non-finite value in sample.".to_string()));
        }
        let hist = Histogram::from_sample(data, bins)?;
        let mean = data.iter().mean();
        let std = data.iter().population_std_dev();
        let std = if std > 0.0 { std } else { hist.bin_width };
        Ok(Self {
            x: hist.x,
            y: hist.y,
            guess: [mean, std, 1.0],
        })
    }

    /// Precomputed histogram. `x` may hold `N` centers or `N + 1` edges; `y` is
    /// normalized by its sum.
    pub fn from_xy(x: &[f64], y: &[f64]) -> Result<Self, FitError> {
        if y.is_empty() {
            return Err(FitError::InvalidSample("Histogram has no bins.".to_string()));
        }
        let x = edges_to_centers(x, y.len()).ok_or_else(|| {
            FitError::InvalidSample(format!(
                "x has {} values; expected {} or {}.",
                x.len(),
                y.len(),
                y.len() + 1
            ))
        })?;
        let total: f64 = y.iter().sum();
        if !(total > 0.0) || !total.is_finite() {
            return Err(FitError::InvalidSample("Histogram has no mass.".to_string()));
        }
        let y: Vec<f64> = y.iter().map(|v| v / total).collect();

        let n = x.len();
        let x_mean = x.iter().mean();
        let spread = (x.iter().map(|v| (v - x_mean).powi(2)).sum::<f64>() / n as f64).sqrt();
        let sigma = spread / (2.0 * std::f64::consts::PI).sqrt();
        let sigma = if sigma > 0.0 { sigma } else { 1.0 };

        Ok(Self {
            guess: [x[n / 2], sigma, 1.0],
            x,
            y,
        })
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// `amplitude · φ(x; mu, sigma)` on the bin centers.
    pub fn curve(&self, mu: f64, sigma: f64, amplitude: f64) -> Vec<f64> {
        self.x
            .iter()
            .map(|&x| amplitude * density::pdf(FamilyKind::Norm, x, &[mu, sigma]))
            .collect()
    }

    pub fn fit(&self, opts: &HistFitOptions) -> Result<GaussianHistFit, FitError> {
        if opts.n_fit == 0 {
            return Err(FitError::InvalidConfig("n_fit must be >= 1.".to_string()));
        }
        if !(opts.error_rate.is_finite() && opts.error_rate >= 0.0) {
            return Err(FitError::InvalidConfig(format!(
                "error_rate must be finite and >= 0, got {}.",
                opts.error_rate
            )));
        }
        let noise = Normal::new(0.0, opts.error_rate)
            .map_err(|e| FitError::InvalidConfig(format!("Invalid error_rate: {e}")))?;
        let mut rng = StdRng::seed_from_u64(opts.seed);

        let simplex = SimplexOptions {
            xatol: 1e-8,
            fatol: 1e-12,
            max_iter: 2_000,
            max_evals: 4_000,
        };

        let mut mus = Vec::with_capacity(opts.n_fit);
        let mut sigmas = Vec::with_capacity(opts.n_fit);
        let mut amplitudes = Vec::with_capacity(opts.n_fit);
        let mut curves = Vec::with_capacity(opts.n_fit);

        for _ in 0..opts.n_fit {
            let target: Vec<f64> = self.y.iter().map(|v| v + noise.sample(&mut rng)).collect();
            let objective = |p: &[f64]| {
                if p[1] <= 0.0 {
                    return f64::INFINITY;
                }
                self.curve(p[0], p[1], p[2])
                    .iter()
                    .zip(&target)
                    .map(|(c, t)| (c - t).powi(2))
                    .sum()
            };
            let best = nelder_mead(objective, &self.guess, &simplex, || false)
                .map_err(|e| FitError::InvalidSample(format!("Histogram fit failed: {e}")))?;

            let (mu, sigma, amplitude) = (best.x[0], best.x[1], best.x[2]);
            curves.push(self.curve(mu, sigma, amplitude));
            mus.push(mu);
            sigmas.push(sigma);
            amplitudes.push(amplitude);
        }

        let (mean_curve, std_curve): (Vec<f64>, Vec<f64>) = (0..self.x.len())
            .map(|i| {
                let column: Vec<f64> = curves.iter().map(|c| c[i]).collect();
                (column.iter().mean(), column.iter().population_std_dev())
            })
            .unzip();

        log::debug!(
            "Histogram fit over {} repetitions: mu={:.4} sigma={:.4}",
            opts.n_fit,
            mus.iter().mean(),
            sigmas.iter().mean()
        );

        Ok(GaussianHistFit {
            mu: mus.iter().mean(),
            sigma: sigmas.iter().mean(),
            amplitude: amplitudes.iter().mean(),
            mus,
            sigmas,
            amplitudes,
            mean_curve,
            std_curve: std_curve
                .into_iter()
                .map(|s| if s.is_nan() { 0.0 } else { s })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal_sample(mu: f64, sigma: f64, n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let dist = Normal::new(mu, sigma).unwrap();
        (0..n).map(|_| dist.sample(&mut rng)).collect()
    }

    #[test]
    fn recovers_gaussian_from_sample() {
        let data = normal_sample(2.0, 3.4, 10_000, 11);
        let hf = HistFit::from_sample(&data, 30).unwrap();
        let out = hf
            .fit(&HistFitOptions {
                error_rate: 0.001,
                n_fit: 5,
                seed: 3,
            })
            .unwrap();
        assert!((out.mu - 2.0).abs() < 0.3, "mu={}", out.mu);
        assert!((out.sigma - 3.4).abs() < 0.3, "sigma={}", out.sigma);
        assert!((out.amplitude - 1.0).abs() < 0.1, "amplitude={}", out.amplitude);
        assert_eq!(out.mus.len(), 5);
        assert_eq!(out.mean_curve.len(), 30);
        assert_eq!(out.std_curve.len(), 30);
    }

    #[test]
    fn accepts_edges_and_normalizes_counts() {
        let edges: Vec<f64> = (0..=10).map(|i| i as f64).collect();
        let counts = [1.0, 2.0, 5.0, 9.0, 12.0, 12.0, 9.0, 5.0, 2.0, 1.0];
        let hf = HistFit::from_xy(&edges, &counts).unwrap();
        assert_eq!(hf.x().len(), 10);
        assert!((hf.x()[0] - 0.5).abs() < 1e-12);
        assert!((hf.y().iter().sum::<f64>() - 1.0).abs() < 1e-12);

        let out = hf
            .fit(&HistFitOptions {
                error_rate: 0.0,
                n_fit: 2,
                seed: 1,
            })
            .unwrap();
        assert!((out.mu - 5.0).abs() < 0.2, "mu={}", out.mu);
        // No noise: every repetition is identical.
        assert!(out.std_curve.iter().all(|s| s.abs() < 1e-9));
    }

    #[test]
    fn rejects_mismatched_lengths_and_bad_options() {
        assert!(HistFit::from_xy(&[1.0, 2.0, 3.0, 4.0], &[1.0, 1.0]).is_err());
        let hf = HistFit::from_xy(&[1.0, 2.0], &[1.0, 1.0]).unwrap();
        let bad = HistFitOptions {
            n_fit: 0,
            ..HistFitOptions::default()
        };
        assert!(matches!(hf.fit(&bad), Err(FitError::InvalidConfig(_))));
        let bad = HistFitOptions {
            error_rate: -1.0,
            ..HistFitOptions::default()
        };
        assert!(matches!(hf.fit(&bad), Err(FitError::InvalidConfig(_))));
    }

    #[test]
    fn error_rate_must_be_finite_and_non_negative() {
        let hf = HistFit::from_xy(&[1.0, 2.0, 3.0], &[1.0, 3.0, 1.0]).unwrap();
        for rate in [-0.05, f64::NAN, f64::INFINITY] {
            let opts = HistFitOptions {
                error_rate: rate,
                ..HistFitOptions::default()
            };
            assert!(
                matches!(hf.fit(&opts), Err(FitError::InvalidConfig(_))),
                "error_rate={rate} accepted"
            );
        }
        let exact = HistFitOptions {
            error_rate: 0.0,
            n_fit: 2,
            ..HistFitOptions::default()
        };
        assert!(hf.fit(&exact).is_ok());
    }
}
