//! Densities and distribution functions for the built-in families.
//!
//! Every family is evaluated in standardized form: with `z = (x − loc) / scale`,
//!
//! ```text
//! logpdf(x) = log f(z; shapes) − ln(scale)
//! cdf(x)    = F(z; shapes)
//! ```
//!
//! Families that statrs ships are evaluated through its distribution types at
//! unit scale. The rest (`exponpow`, `gumbel_r`, `logistic`, `powerlaw`,
//! `rayleigh`) have closed forms here.
//!
//! Invalid parameters (non-positive scale or shape) give `NaN`; points outside the
//! support give `−∞` for `logpdf` and 0 / 1 for `cdf`.

use statrs::distribution::{
    Beta, Cauchy, ChiSquared, Continuous, ContinuousCDF, Exp, Gamma, Laplace, LogNormal, Normal,
    Uniform, Weibull,
};

use super::kind::FamilyKind;

/// Split a parameter vector into `(shapes, loc, scale)`.
///
/// `None` when the length does not match the family or a value is invalid.
fn unpack(kind: FamilyKind, params: &[f64]) -> Option<(&[f64], f64, f64)> {
    let k = kind.shape_names().len();
    if params.len() != k + 2 || params.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let (shapes, rest) = params.split_at(k);
    let (loc, scale) = (rest[0], rest[1]);
    if scale <= 0.0 || shapes.iter().any(|s| *s <= 0.0) {
        return None;
    }
    Some((shapes, loc, scale))
}

pub fn logpdf(kind: FamilyKind, x: f64, params: &[f64]) -> f64 {
    let Some((shapes, loc, scale)) = unpack(kind, params) else {
        return f64::NAN;
    };
    let z = (x - loc) / scale;
    std_logpdf(kind, z, shapes) - scale.ln()
}

pub fn pdf(kind: FamilyKind, x: f64, params: &[f64]) -> f64 {
    logpdf(kind, x, params).exp()
}

pub fn cdf(kind: FamilyKind, x: f64, params: &[f64]) -> f64 {
    let Some((shapes, loc, scale)) = unpack(kind, params) else {
        return f64::NAN;
    };
    std_cdf(kind, (x - loc) / scale, shapes)
}

/// `−Σ logpdf(x_i)`; `+∞` if any point is outside the support or the
/// parameters are invalid.
pub fn negative_log_likelihood(kind: FamilyKind, sample: &[f64], params: &[f64]) -> f64 {
    let Some((shapes, loc, scale)) = unpack(kind, params) else {
        return f64::INFINITY;
    };
    let ln_scale = scale.ln();
    let mut total = 0.0;
    for &x in sample {
        let lp = std_logpdf(kind, (x - loc) / scale, shapes) - ln_scale;
        if !lp.is_finite() {
            return f64::INFINITY;
        }
        total -= lp;
    }
    total
}

fn ln_pdf_at<D: Continuous<f64, f64>, E>(dist: Result<D, E>, z: f64) -> f64 {
    dist.map_or(f64::NAN, |d| d.ln_pdf(z))
}

fn cdf_at<D: ContinuousCDF<f64, f64>, E>(dist: Result<D, E>, z: f64) -> f64 {
    dist.map_or(f64::NAN, |d| d.cdf(z))
}

fn std_logpdf(kind: FamilyKind, z: f64, shapes: &[f64]) -> f64 {
    match kind {
        // Open supports: statrs reports +∞ at the boundary for some shapes.
        FamilyKind::Beta if z <= 0.0 || z >= 1.0 => f64::NEG_INFINITY,
        FamilyKind::Chi2 | FamilyKind::Gamma if z <= 0.0 => f64::NEG_INFINITY,

        FamilyKind::Beta => ln_pdf_at(Beta::new(shapes[0], shapes[1]), z),
        FamilyKind::Cauchy => ln_pdf_at(Cauchy::new(0.0, 1.0), z),
        FamilyKind::Chi2 => ln_pdf_at(ChiSquared::new(shapes[0]), z),
        FamilyKind::Expon => ln_pdf_at(Exp::new(1.0), z),
        FamilyKind::Gamma => ln_pdf_at(Gamma::new(shapes[0], 1.0), z),
        FamilyKind::Laplace => ln_pdf_at(Laplace::new(0.0, 1.0), z),
        FamilyKind::LogNorm => ln_pdf_at(LogNormal::new(0.0, shapes[0]), z),
        FamilyKind::Norm => ln_pdf_at(Normal::new(0.0, 1.0), z),
        FamilyKind::Uniform => ln_pdf_at(Uniform::new(0.0, 1.0), z),
        FamilyKind::WeibullMin => ln_pdf_at(Weibull::new(shapes[0], 1.0), z),

        FamilyKind::ExponPow => {
            let b = shapes[0];
            if z < 0.0 {
                return f64::NEG_INFINITY;
            }
            let zb = z.powf(b);
            b.ln() + (b - 1.0) * z.ln() + 1.0 + zb - zb.exp()
        }
        FamilyKind::GumbelR => -z - (-z).exp(),
        FamilyKind::Logistic => {
            let a = z.abs();
            -a - 2.0 * (-a).exp().ln_1p()
        }
        FamilyKind::PowerLaw => {
            let a = shapes[0];
            if !(0.0..=1.0).contains(&z) {
                return f64::NEG_INFINITY;
            }
            a.ln() + (a - 1.0) * z.ln()
        }
        FamilyKind::Rayleigh => {
            if z < 0.0 {
                return f64::NEG_INFINITY;
            }
            z.ln() - z * z / 2.0
        }
    }
}

fn std_cdf(kind: FamilyKind, z: f64, shapes: &[f64]) -> f64 {
    match kind {
        FamilyKind::Beta => cdf_at(Beta::new(shapes[0], shapes[1]), z),
        FamilyKind::Cauchy => cdf_at(Cauchy::new(0.0, 1.0), z),
        FamilyKind::Chi2 => cdf_at(ChiSquared::new(shapes[0]), z),
        FamilyKind::Expon => cdf_at(Exp::new(1.0), z),
        FamilyKind::Gamma => cdf_at(Gamma::new(shapes[0], 1.0), z),
        FamilyKind::Laplace => cdf_at(Laplace::new(0.0, 1.0), z),
        FamilyKind::LogNorm => cdf_at(LogNormal::new(0.0, shapes[0]), z),
        FamilyKind::Norm => cdf_at(Normal::new(0.0, 1.0), z),
        FamilyKind::Uniform => cdf_at(Uniform::new(0.0, 1.0), z),
        FamilyKind::WeibullMin => cdf_at(Weibull::new(shapes[0], 1.0), z),

        FamilyKind::ExponPow => {
            if z <= 0.0 {
                return 0.0;
            }
            -(-z.powf(shapes[0]).exp_m1()).exp_m1()
        }
        FamilyKind::GumbelR => (-(-z).exp()).exp(),
        FamilyKind::Logistic => 1.0 / (1.0 + (-z).exp()),
        FamilyKind::PowerLaw => z.clamp(0.0, 1.0).powf(shapes[0]),
        FamilyKind::Rayleigh => {
            if z <= 0.0 {
                return 0.0;
            }
            -(-z * z / 2.0).exp_m1()
        }
    }
}
