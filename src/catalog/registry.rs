//! Estimator trait and the family registry.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, OnceLock};

use crate::domain::CandidateSet;
use crate::error::{EstimateError, FitError};
use crate::fit::CancelToken;

use super::density;
use super::estimate::fit_family;
use super::kind::FamilyKind;

/// A distribution family that can estimate its own parameters.
///
/// Parameter vectors use the layout `[shapes..., loc, scale]`. Implementations
/// must be callable from several threads at once; `fit` should poll `cancel`
/// during long computations and return [`EstimateError::Cancelled`] when set.
pub trait Estimator: Send + Sync {
    fn name(&self) -> &str;

    /// Names of the shape parameters (may be empty).
    fn shape_names(&self) -> &[&str] {
        &[]
    }

    fn fit(&self, sample: &[f64], cancel: &CancelToken) -> Result<Vec<f64>, EstimateError>;

    fn logpdf(&self, x: f64, params: &[f64]) -> f64;

    fn cdf(&self, x: f64, params: &[f64]) -> f64;

    fn pdf(&self, x: f64, params: &[f64]) -> f64 {
        self.logpdf(x, params).exp()
    }

    /// Shape names followed by `loc` and `scale`.
    fn param_names(&self) -> Vec<String> {
        self.shape_names()
            .iter()
            .map(|s| s.to_string())
            .chain(["loc".to_string(), "scale".to_string()])
            .collect()
    }

    /// `pdf` at each of `xs`.
    fn densities(&self, xs: &[f64], params: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.pdf(x, params)).collect()
    }
}

/// Built-in family backed by [`FamilyKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParametricFamily {
    kind: FamilyKind,
}

impl ParametricFamily {
    pub fn new(kind: FamilyKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> FamilyKind {
        self.kind
    }
}

impl Estimator for ParametricFamily {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn shape_names(&self) -> &[&str] {
        self.kind.shape_names()
    }

    fn fit(&self, sample: &[f64], cancel: &CancelToken) -> Result<Vec<f64>, EstimateError> {
        fit_family(self.kind, sample, cancel)
    }

    fn logpdf(&self, x: f64, params: &[f64]) -> f64 {
        density::logpdf(self.kind, x, params)
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        density::cdf(self.kind, x, params)
    }

    fn pdf(&self, x: f64, params: &[f64]) -> f64 {
        density::pdf(self.kind, x, params)
    }
}

/// Name → estimator lookup.
///
/// Enumerated once; the built-in instance is shared process-wide through
/// [`Registry::shared`].
#[derive(Clone, Default)]
pub struct Registry {
    estimators: BTreeMap<String, Arc<dyn Estimator>>,
    common: BTreeSet<String>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("estimators", &self.estimators.keys().collect::<Vec<_>>())
            .field("common", &self.common)
            .finish()
    }
}

impl Registry {
    /// A registry with no families.
    pub fn empty() -> Self {
        Self::default()
    }

    /// All built-in families.
    pub fn builtin() -> Self {
        let mut reg = Self::empty();
        for kind in FamilyKind::ALL {
            reg.register(Arc::new(ParametricFamily::new(kind)));
        }
        reg.common = FamilyKind::COMMON
            .iter()
            .map(|k| k.name().to_string())
            .collect();
        log::debug!("Registered {} built-in distribution families", reg.len());
        reg
    }

    /// Process-wide built-in registry.
    pub fn shared() -> Arc<Registry> {
        static SHARED: OnceLock<Arc<Registry>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(Registry::builtin())))
    }

    /// Add (or replace) an estimator under its own name.
    pub fn register(&mut self, estimator: Arc<dyn Estimator>) {
        self.estimators.insert(estimator.name().to_string(), estimator);
    }

    /// Include a registered family in the "common" subset.
    pub fn mark_common(&mut self, name: &str) -> Result<(), FitError> {
        if !self.estimators.contains_key(name) {
            return Err(FitError::UnknownFamily(name.to_string()));
        }
        self.common.insert(name.to_string());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Estimator>> {
        self.estimators.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.estimators.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.estimators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimators.is_empty()
    }

    /// Every registered family, sorted.
    pub fn names(&self) -> Vec<String> {
        self.estimators.keys().cloned().collect()
    }

    /// The common subset, sorted.
    pub fn common_names(&self) -> Vec<String> {
        self.common.iter().cloned().collect()
    }

    /// Fail on the first name that is not registered.
    pub fn validate<S: AsRef<str>>(&self, names: &[S]) -> Result<(), FitError> {
        match names.iter().find(|n| !self.contains(n.as_ref())) {
            Some(missing) => Err(FitError::UnknownFamily(missing.as_ref().to_string())),
            None => Ok(()),
        }
    }

    /// Expand a candidate set into validated, de-duplicated names.
    ///
    /// Explicit lists keep their first-seen order.
    pub fn resolve(&self, set: &CandidateSet) -> Result<Vec<String>, FitError> {
        match set {
            CandidateSet::All => Ok(self.names()),
            CandidateSet::Common => Ok(self.common_names()),
            CandidateSet::Named(names) => {
                self.validate(names.as_slice())?;
                let mut seen = BTreeSet::new();
                Ok(names
                    .iter()
                    .filter(|n| seen.insert(n.as_str()))
                    .cloned()
                    .collect())
            }
        }
    }
}

/// Names of every built-in family.
pub fn get_distributions() -> Vec<String> {
    Registry::shared().names()
}

/// Names of the common built-in subset.
pub fn get_common_distributions() -> Vec<String> {
    Registry::shared().common_names()
}
