//! Maximum-likelihood estimation for the built-in families.
//!
//! `norm`, `expon`, `uniform` and `laplace` have closed-form estimates. The
//! other families start from moment-matched values and are refined by
//! minimizing the negative log-likelihood with the Nelder–Mead simplex.

use crate::error::EstimateError;
use crate::fit::CancelToken;
use crate::math::{SampleMoments, SimplexError, SimplexOptions, nelder_mead};

use super::density::negative_log_likelihood;
use super::kind::FamilyKind;

/// Euler–Mascheroni constant.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Estimate `[shapes..., loc, scale]` for `kind` from `sample`.
pub fn fit_family(
    kind: FamilyKind,
    sample: &[f64],
    cancel: &CancelToken,
) -> Result<Vec<f64>, EstimateError> {
    let moments = SampleMoments::of(sample)
        .ok_or_else(|| EstimateError::DegenerateSample("empty sample".to_string()))?;
    if !(moments.max > moments.min) {
        return Err(EstimateError::DegenerateSample(format!(
            "all observations equal {}",
            moments.min
        )));
    }

    if kind.has_closed_form() {
        return closed_form(kind, sample, &moments);
    }

    let start = start_params(kind, sample, &moments);
    maximum_likelihood(kind, sample, &start, cancel)
}

fn closed_form(
    kind: FamilyKind,
    sample: &[f64],
    m: &SampleMoments,
) -> Result<Vec<f64>, EstimateError> {
    let (loc, scale) = match kind {
        FamilyKind::Norm => (m.mean, m.std),
        FamilyKind::Expon => (m.min, m.mean - m.min),
        FamilyKind::Uniform => (m.min, m.max - m.min),
        FamilyKind::Laplace => {
            let mad = sample.iter().map(|x| (x - m.median).abs()).sum::<f64>() / m.n as f64;
            (m.median, mad)
        }
        other => {
            return Err(EstimateError::Diverged(format!(
                "{other} has no closed-form estimate"
            )));
        }
    };
    if !(scale > 0.0) || !loc.is_finite() || !scale.is_finite() {
        return Err(EstimateError::DegenerateSample(format!(
            "estimated scale {scale} is not positive"
        )));
    }
    Ok(vec![loc, scale])
}

/// Moment-matched starting point, always inside the support of the sample.
pub fn start_params(kind: FamilyKind, sample: &[f64], m: &SampleMoments) -> Vec<f64> {
    let range = m.max - m.min;
    let pad = 0.01 * range;
    let below = m.min - pad;
    let spread = if m.std > 0.0 { m.std } else { range };

    match kind {
        FamilyKind::Beta => {
            let width = range + 2.0 * pad;
            let (a, b) = beta_moments(sample, below, width);
            vec![a, b, below, width]
        }
        FamilyKind::Cauchy => {
            let scale = if m.iqr > 0.0 { m.iqr / 2.0 } else { spread };
            vec![m.median, scale]
        }
        FamilyKind::Chi2 => {
            let (a, loc, scale) = gamma_moments(m, below);
            // chi2(df, scale s) is gamma(df / 2, scale 2s).
            vec![2.0 * a, loc, scale / 2.0]
        }
        FamilyKind::ExponPow => vec![1.0, below, m.mean - below],
        FamilyKind::Gamma => {
            let (a, loc, scale) = gamma_moments(m, below);
            vec![a, loc, scale]
        }
        FamilyKind::GumbelR => {
            let scale = spread * 6f64.sqrt() / std::f64::consts::PI;
            vec![m.mean - EULER_GAMMA * scale, scale]
        }
        FamilyKind::Logistic => {
            let scale = spread * 3f64.sqrt() / std::f64::consts::PI;
            vec![m.mean, scale]
        }
        FamilyKind::LogNorm => {
            let loc = m.min - 0.1 * spread.max(range);
            let logs: Vec<f64> = sample.iter().map(|x| (x - loc).ln()).collect();
            let lm = SampleMoments::of(&logs);
            let (mu, s) = lm.map_or((0.0, 1.0), |l| (l.mean, l.std));
            vec![if s > 0.0 { s } else { 1.0 }, loc, mu.exp()]
        }
        FamilyKind::PowerLaw => {
            let width = range + 2.0 * pad;
            let zbar = (m.mean - below) / width;
            let a = (zbar / (1.0 - zbar)).clamp(0.05, 50.0);
            vec![a, below, width]
        }
        FamilyKind::Rayleigh => {
            let second = sample.iter().map(|x| (x - below).powi(2)).sum::<f64>() / m.n as f64;
            vec![below, (second / 2.0).sqrt()]
        }
        FamilyKind::WeibullMin => vec![1.0, below, m.mean - below],
        FamilyKind::Norm => vec![m.mean, spread],
        FamilyKind::Expon => vec![m.min, m.mean - m.min],
        FamilyKind::Uniform => vec![m.min, range],
        FamilyKind::Laplace => vec![m.median, spread],
    }
}

/// Shape from skewness (`skew = 2/√a`), then scale and loc from the first two
/// moments. `loc` is kept strictly below the sample minimum.
fn gamma_moments(m: &SampleMoments, below: f64) -> (f64, f64, f64) {
    let a = if m.skewness > 0.0 {
        (2.0 / m.skewness).powi(2).clamp(0.5, 100.0)
    } else {
        4.0
    };
    let mut scale = m.std / a.sqrt();
    let mut loc = m.mean - a * scale;
    if loc >= below {
        loc = below;
        scale = (m.mean - loc) / a;
    }
    (a, loc, scale)
}

fn beta_moments(sample: &[f64], loc: f64, width: f64) -> (f64, f64) {
    let z: Vec<f64> = sample.iter().map(|x| (x - loc) / width).collect();
    let Some(zm) = SampleMoments::of(&z) else {
        return (1.0, 1.0);
    };
    let var = zm.std * zm.std;
    if !(var > 0.0) {
        return (1.0, 1.0);
    }
    let common = zm.mean * (1.0 - zm.mean) / var - 1.0;
    if !(common > 0.0) {
        return (1.0, 1.0);
    }
    (
        (zm.mean * common).clamp(0.1, 1e3),
        ((1.0 - zm.mean) * common).clamp(0.1, 1e3),
    )
}

/// Minimize the negative log-likelihood from `start`.
pub fn maximum_likelihood(
    kind: FamilyKind,
    sample: &[f64],
    start: &[f64],
    cancel: &CancelToken,
) -> Result<Vec<f64>, EstimateError> {
    let objective = |p: &[f64]| negative_log_likelihood(kind, sample, p);
    if !objective(start).is_finite() {
        return Err(EstimateError::Diverged(format!(
            "{kind}: starting point {start:?} is outside the support"
        )));
    }

    let opts = SimplexOptions::for_dim(start.len());
    let best = nelder_mead(objective, start, &opts, || cancel.is_cancelled()).map_err(
        |e| match e {
            SimplexError::Cancelled => EstimateError::Cancelled,
            other => EstimateError::Diverged(other.to_string()),
        },
    )?;

    if !best.fval.is_finite() || best.x.iter().any(|v| !v.is_finite()) {
        return Err(EstimateError::Diverged(format!(
            "{kind}: negative log-likelihood is {}",
            best.fval
        )));
    }
    if !best.converged {
        log::debug!(
            "{kind}: simplex stopped after {} iterations without meeting tolerance",
            best.iterations
        );
    }
    Ok(best.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Gamma, Normal};

    #[test]
    fn closed_form_norm_and_uniform() {
        let sample = [1.0, 2.0, 3.0, 4.0];
        let t = CancelToken::new();
        let norm = fit_family(FamilyKind::Norm, &sample, &t).unwrap();
        assert!((norm[0] - 2.5).abs() < 1e-12);
        assert!((norm[1] - 1.25f64.sqrt()).abs() < 1e-12);

        let uni = fit_family(FamilyKind::Uniform, &sample, &t).unwrap();
        assert_eq!(uni, vec![1.0, 3.0]);

        let expon = fit_family(FamilyKind::Expon, &sample, &t).unwrap();
        assert_eq!(expon, vec![1.0, 1.5]);
    }

    #[test]
    fn every_start_is_feasible() {
        let mut rng = StdRng::seed_from_u64(7);
        let normal = Normal::new(3.0, 1.5).unwrap();
        let sample: Vec<f64> = (0..500).map(|_| normal.sample(&mut rng)).collect();
        let m = SampleMoments::of(&sample).unwrap();
        for kind in FamilyKind::ALL {
            let start = start_params(kind, &sample, &m);
            assert_eq!(start.len(), kind.param_count(), "{kind}");
            let nll = negative_log_likelihood(kind, &sample, &start);
            assert!(nll.is_finite(), "{kind}: start {start:?} gives nll={nll}");
        }
    }

    #[test]
    fn gamma_recovers_parameters() {
        let mut rng = StdRng::seed_from_u64(42);
        let gamma = Gamma::new(3.0, 2.0).unwrap();
        let sample: Vec<f64> = (0..5_000).map(|_| 1.0 + gamma.sample(&mut rng)).collect();

        let p = fit_family(FamilyKind::Gamma, &sample, &CancelToken::new()).unwrap();
        let mean = p[1] + p[0] * p[2];
        let m = SampleMoments::of(&sample).unwrap();
        assert!((mean - m.mean).abs() < 0.2, "params={p:?}");
        assert!(p[1] < m.min);
    }

    #[test]
    fn cancelled_token_stops_simplex() {
        let sample: Vec<f64> = (1..200).map(|i| (i as f64).sqrt()).collect();
        let t = CancelToken::new();
        t.cancel();
        let err = fit_family(FamilyKind::Gamma, &sample, &t).unwrap_err();
        assert_eq!(err, EstimateError::Cancelled);
    }

    #[test]
    fn constant_sample_is_degenerate() {
        let err = fit_family(FamilyKind::Norm, &[2.0, 2.0], &CancelToken::new()).unwrap_err();
        assert!(matches!(err, EstimateError::DegenerateSample(_)));
    }
}
