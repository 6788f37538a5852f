//! Fit and score a single candidate family.
//!
//! Given the trimmed sample and its histogram `(x, y)`:
//!
//! 1. estimate parameters under the time budget
//! 2. evaluate the fitted density at every bin center (`pdf_fitted`)
//! 3. score: SSE, AIC/BIC from the log-density summed over bin centers,
//!    KL divergence against `y`, KS against the trimmed sample
//!
//! Any failure (timeout, estimator error, panic, non-finite density) is
//! returned as a [`CandidateFailure`] so the batch can record a skip.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::Estimator;
use crate::data::Histogram;
use crate::domain::{CandidateFit, FitScores};
use crate::error::CandidateFailure;
use crate::math::{aic, bic, kl_divergence, ks_test, sum_square_error};

use super::budget::estimate_within_budget;

/// Estimate parameters for `estimator` and score the result.
pub fn fit_candidate(
    estimator: Arc<dyn Estimator>,
    sample: Arc<[f64]>,
    histogram: &Histogram,
    budget: Duration,
) -> Result<CandidateFit, CandidateFailure> {
    let name = estimator.name().to_string();
    let param_names = estimator.param_names();

    let estimate = estimate_within_budget(Arc::clone(&estimator), Arc::clone(&sample), budget)?;

    let scored = panic::catch_unwind(AssertUnwindSafe(|| {
        score_fit(estimator.as_ref(), &estimate.params, &sample, histogram)
    }))
    .map_err(|_| CandidateFailure::Panicked)??;

    Ok(CandidateFit {
        name,
        params: estimate.params,
        param_names,
        pdf_fitted: scored.pdf_fitted,
        scores: scored.scores,
        elapsed: estimate.elapsed,
    })
}

/// Fitted density on the histogram grid plus its scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredFit {
    pub pdf_fitted: Vec<f64>,
    pub scores: FitScores,
}

/// Score already-estimated parameters against the sample and histogram.
pub fn score_fit(
    estimator: &dyn Estimator,
    params: &[f64],
    sample: &[f64],
    histogram: &Histogram,
) -> Result<ScoredFit, CandidateFailure> {
    if params.iter().any(|p| !p.is_finite()) {
        return Err(CandidateFailure::Scoring(format!(
            "non-finite parameters {params:?}"
        )));
    }

    let pdf_fitted = estimator.densities(&histogram.x, params);
    if let Some(i) = pdf_fitted.iter().position(|v| v.is_nan()) {
        return Err(CandidateFailure::Scoring(format!(
            "density is NaN at x={}",
            histogram.x[i]
        )));
    }

    let sumsquare_error = sum_square_error(&pdf_fitted, &histogram.y);

    // Log-likelihood over the evaluation grid, not the raw sample.
    let log_likelihood: f64 = histogram.x.iter().map(|&x| estimator.logpdf(x, params)).sum();
    let k = params.len();
    let n = sample.len();

    let kl_div = kl_divergence(&pdf_fitted, &histogram.y);
    let ks = ks_test(sample, |v| estimator.cdf(v, params));

    Ok(ScoredFit {
        pdf_fitted,
        scores: FitScores {
            sumsquare_error,
            aic: aic(k, log_likelihood),
            bic: bic(k, n, log_likelihood),
            kl_div,
            ks_statistic: ks.statistic,
            ks_pvalue: ks.pvalue,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FamilyKind, ParametricFamily};

    fn grid_sample() -> Vec<f64> {
        // Deterministic, roughly bell-shaped sample.
        (1..=999)
            .map(|i| {
                let u = i as f64 / 1000.0;
                (u / (1.0 - u)).ln()
            })
            .collect()
    }

    #[test]
    fn scores_are_consistent_with_definitions() {
        let sample = grid_sample();
        let hist = Histogram::from_sample(&sample, 30).unwrap();
        let est = ParametricFamily::new(FamilyKind::Logistic);
        let params = [0.0, 1.0];

        let scored = score_fit(&est, &params, &sample, &hist).unwrap();
        assert_eq!(scored.pdf_fitted.len(), hist.x.len());

        let ll: f64 = hist.x.iter().map(|&x| est.logpdf(x, &params)).sum();
        assert!((scored.scores.aic - (4.0 - 2.0 * ll)).abs() < 1e-9);
        assert!((scored.scores.bic - (2.0 * 999f64.ln() - 2.0 * ll)).abs() < 1e-9);
        // Sample quantiles of the true logistic: tiny KS distance, large p-value.
        assert!(scored.scores.ks_statistic < 0.01);
        assert!(scored.scores.ks_pvalue > 0.5);
        assert!(scored.scores.kl_div >= 0.0);
    }

    #[test]
    fn nan_density_is_a_scoring_failure() {
        let sample = grid_sample();
        let hist = Histogram::from_sample(&sample, 10).unwrap();
        let est = ParametricFamily::new(FamilyKind::Norm);
        let err = score_fit(&est, &[0.0, -1.0], &sample, &hist).unwrap_err();
        assert!(matches!(err, CandidateFailure::Scoring(_)));
    }

    #[test]
    fn fit_candidate_fills_every_field() {
        let sample: Arc<[f64]> = grid_sample().into();
        let hist = Histogram::from_sample(&sample, 40).unwrap();
        let est: Arc<dyn Estimator> = Arc::new(ParametricFamily::new(FamilyKind::Norm));

        let fit = fit_candidate(est, sample, &hist, Duration::from_secs(10)).unwrap();
        assert_eq!(fit.name, "norm");
        assert_eq!(fit.param_names, vec!["loc", "scale"]);
        assert_eq!(fit.params.len(), 2);
        assert!(fit.params[0].abs() < 1e-9);
        assert_eq!(fit.pdf_fitted.len(), 40);
        assert!(fit.scores.sumsquare_error.is_finite());
    }
}
