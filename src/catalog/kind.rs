//! Built-in distribution families.

use std::fmt;

/// A continuous family with `loc`/`scale` plus zero or more shape parameters.
///
/// Names follow the widely used SciPy identifiers so candidate lists are
/// portable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FamilyKind {
    Beta,
    Cauchy,
    Chi2,
    Expon,
    ExponPow,
    Gamma,
    GumbelR,
    Laplace,
    Logistic,
    LogNorm,
    Norm,
    PowerLaw,
    Rayleigh,
    Uniform,
    WeibullMin,
}

impl FamilyKind {
    pub const ALL: [FamilyKind; 15] = [
        FamilyKind::Beta,
        FamilyKind::Cauchy,
        FamilyKind::Chi2,
        FamilyKind::Expon,
        FamilyKind::ExponPow,
        FamilyKind::Gamma,
        FamilyKind::GumbelR,
        FamilyKind::Laplace,
        FamilyKind::Logistic,
        FamilyKind::LogNorm,
        FamilyKind::Norm,
        FamilyKind::PowerLaw,
        FamilyKind::Rayleigh,
        FamilyKind::Uniform,
        FamilyKind::WeibullMin,
    ];

    /// Quick default subset.
    pub const COMMON: [FamilyKind; 10] = [
        FamilyKind::Cauchy,
        FamilyKind::Chi2,
        FamilyKind::Expon,
        FamilyKind::ExponPow,
        FamilyKind::Gamma,
        FamilyKind::LogNorm,
        FamilyKind::Norm,
        FamilyKind::PowerLaw,
        FamilyKind::Rayleigh,
        FamilyKind::Uniform,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FamilyKind::Beta => "beta",
            FamilyKind::Cauchy => "cauchy",
            FamilyKind::Chi2 => "chi2",
            FamilyKind::Expon => "expon",
            FamilyKind::ExponPow => "exponpow",
            FamilyKind::Gamma => "gamma",
            FamilyKind::GumbelR => "gumbel_r",
            FamilyKind::Laplace => "laplace",
            FamilyKind::Logistic => "logistic",
            FamilyKind::LogNorm => "lognorm",
            FamilyKind::Norm => "norm",
            FamilyKind::PowerLaw => "powerlaw",
            FamilyKind::Rayleigh => "rayleigh",
            FamilyKind::Uniform => "uniform",
            FamilyKind::WeibullMin => "weibull_min",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Shape parameter names, in parameter-vector order.
    pub fn shape_names(self) -> &'static [&'static str] {
        match self {
            FamilyKind::Beta => &["a", "b"],
            FamilyKind::Chi2 => &["df"],
            FamilyKind::ExponPow => &["b"],
            FamilyKind::Gamma => &["a"],
            FamilyKind::LogNorm => &["s"],
            FamilyKind::PowerLaw => &["a"],
            FamilyKind::WeibullMin => &["c"],
            FamilyKind::Cauchy
            | FamilyKind::Expon
            | FamilyKind::GumbelR
            | FamilyKind::Laplace
            | FamilyKind::Logistic
            | FamilyKind::Norm
            | FamilyKind::Rayleigh
            | FamilyKind::Uniform => &[],
        }
    }

    /// Shapes plus `loc` and `scale`.
    pub fn param_count(self) -> usize {
        self.shape_names().len() + 2
    }

    /// Maximum-likelihood estimate has a closed form.
    pub fn has_closed_form(self) -> bool {
        matches!(
            self,
            FamilyKind::Norm | FamilyKind::Expon | FamilyKind::Uniform | FamilyKind::Laplace
        )
    }
}

impl fmt::Display for FamilyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
