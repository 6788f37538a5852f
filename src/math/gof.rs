//! Goodness-of-fit statistics.
//!
//! - sum of squared errors between fitted and empirical densities
//! - information criteria (AIC / BIC) from a log-likelihood
//! - relative entropy (KL divergence) over a shared grid
//! - one-sample Kolmogorov–Smirnov statistic and asymptotic p-value

/// Σ (fitted_i − observed_i)².
pub fn sum_square_error(fitted: &[f64], observed: &[f64]) -> f64 {
    fitted
        .iter()
        .zip(observed)
        .map(|(f, o)| (f - o).powi(2))
        .sum()
}

/// `2k − 2·logLik`.
pub fn aic(k: usize, log_likelihood: f64) -> f64 {
    2.0 * k as f64 - 2.0 * log_likelihood
}

/// `k·ln(n) − 2·logLik`.
pub fn bic(k: usize, n: usize, log_likelihood: f64) -> f64 {
    k as f64 * (n as f64).ln() - 2.0 * log_likelihood
}

/// Relative entropy `Σ p·ln(p/q)` after normalizing both inputs to sum 1.
///
/// Terms with `p == 0` contribute nothing; `p > 0` against `q == 0` gives `+∞`.
/// Returns NaN when either input has no mass or contains negative values.
pub fn kl_divergence(p: &[f64], q: &[f64]) -> f64 {
    if p.len() != q.len() || p.iter().chain(q).any(|v| *v < 0.0 || v.is_nan()) {
        return f64::NAN;
    }
    let p_sum: f64 = p.iter().sum();
    let q_sum: f64 = q.iter().sum();
    if !(p_sum > 0.0) || !(q_sum > 0.0) {
        return f64::NAN;
    }

    let mut total = 0.0;
    for (&pi, &qi) in p.iter().zip(q) {
        let pi = pi / p_sum;
        let qi = qi / q_sum;
        if pi == 0.0 {
            continue;
        }
        if qi == 0.0 {
            return f64::INFINITY;
        }
        total += pi * (pi / qi).ln();
    }
    total
}

/// Two-sided KS statistic and p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KsTest {
    pub statistic: f64,
    pub pvalue: f64,
}

/// `D = sup |F_n(x) − F(x)|` for the sample against `cdf`.
pub fn ks_statistic<F>(sample: &[f64], cdf: F) -> f64
where
    F: Fn(f64) -> f64,
{
    if sample.is_empty() {
        return f64::NAN;
    }
    let mut sorted = sample.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len() as f64;

    let mut d_plus = 0.0_f64;
    let mut d_minus = 0.0_f64;
    for (i, &x) in sorted.iter().enumerate() {
        let c = cdf(x);
        if c.is_nan() {
            return f64::NAN;
        }
        d_plus = d_plus.max((i + 1) as f64 / n - c);
        d_minus = d_minus.max(c - i as f64 / n);
    }
    d_plus.max(d_minus)
}

/// Asymptotic p-value of a KS statistic `d` for sample size `n`.
///
/// Uses the Kolmogorov limiting distribution with the effective-size
/// correction `λ = (√n + 0.12 + 0.11/√n)·d`.
pub fn ks_pvalue(d: f64, n: usize) -> f64 {
    if d.is_nan() || n == 0 {
        return f64::NAN;
    }
    let sqrt_n = (n as f64).sqrt();
    let lambda = (sqrt_n + 0.12 + 0.11 / sqrt_n) * d;
    kolmogorov_q(lambda).clamp(0.0, 1.0)
}

pub fn ks_test<F>(sample: &[f64], cdf: F) -> KsTest
where
    F: Fn(f64) -> f64,
{
    let statistic = ks_statistic(sample, cdf);
    KsTest {
        statistic,
        pvalue: ks_pvalue(statistic, sample.len()),
    }
}

/// `Q_KS(λ) = 2 Σ_{j≥1} (−1)^{j−1} exp(−2 j² λ²)`.
fn kolmogorov_q(lambda: f64) -> f64 {
    const EPS1: f64 = 1e-3;
    const EPS2: f64 = 1e-8;

    let a2 = -2.0 * lambda * lambda;
    let mut fac = 2.0;
    let mut sum = 0.0;
    let mut prev_term = 0.0_f64;
    for j in 1..=100 {
        let jf = j as f64;
        let term = fac * (a2 * jf * jf).exp();
        sum += term;
        if term.abs() <= EPS1 * prev_term || term.abs() <= EPS2 * sum {
            return sum;
        }
        fac = -fac;
        prev_term = term.abs();
    }
    // Series failed to converge (λ → 0).
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_and_information_criteria() {
        assert!((sum_square_error(&[1.0, 2.0, 3.0], &[1.5, 2.0, 2.0]) - 1.25).abs() < 1e-12);
        assert!((aic(2, -10.0) - 24.0).abs() < 1e-12);
        let expected = 3.0 * 100f64.ln() + 20.0;
        assert!((bic(3, 100, -10.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn kl_of_identical_inputs_is_zero() {
        let p = [0.1, 0.4, 0.5];
        assert!(kl_divergence(&p, &[1.0, 4.0, 5.0]).abs() < 1e-12);
    }

    #[test]
    fn kl_matches_hand_computation() {
        let got = kl_divergence(&[0.5, 0.5], &[0.25, 0.75]);
        let expected = 0.5 * (2.0f64).ln() + 0.5 * (0.5f64 / 0.75).ln();
        assert!((got - expected).abs() < 1e-12);
    }

    #[test]
    fn kl_zero_mass_rules() {
        // p = 0 terms are ignored.
        assert!(kl_divergence(&[0.0, 1.0], &[0.5, 0.5]).is_finite());
        // p > 0 where q = 0 diverges.
        assert_eq!(kl_divergence(&[0.5, 0.5], &[1.0, 0.0]), f64::INFINITY);
        assert!(kl_divergence(&[0.0, 0.0], &[1.0, 1.0]).is_nan());
    }

    #[test]
    fn ks_statistic_against_uniform() {
        let sample = [0.1, 0.4, 0.7];
        let d = ks_statistic(&sample, |x: f64| x.clamp(0.0, 1.0));
        // D+ = max(1/3-0.1, 2/3-0.4, 1-0.7) = 0.3; D- = max(0.1, 0.4-1/3, 0.7-2/3) = 0.1
        assert!((d - 0.3).abs() < 1e-12);
    }

    #[test]
    fn ks_pvalue_limits() {
        assert!((ks_pvalue(0.0, 100) - 1.0).abs() < 1e-12);
        assert!(ks_pvalue(0.5, 1000) < 1e-12);
        let mid = ks_pvalue(0.05, 500);
        assert!(mid > 0.05 && mid < 0.5, "p={mid}");
    }

    #[test]
    fn ks_pvalue_matches_kolmogorov_table() {
        // Q_KS(1.3581) ≈ 0.05 (the classic 5 % critical value).
        let n = 1_000_000usize;
        let sqrt_n = (n as f64).sqrt();
        let d = 1.3581 / (sqrt_n + 0.12 + 0.11 / sqrt_n);
        assert!((ks_pvalue(d, n) - 0.05).abs() < 1e-3);
    }
}
