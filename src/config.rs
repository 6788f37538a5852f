//! Engine configuration.
//!
//! Values come from code (`FitConfig::default()` plus field updates) or from the
//! environment / `.env` file via [`FitConfig::from_env`].

use std::str::FromStr;
use std::time::Duration;

use crate::domain::CandidateSet;
use crate::error::FitError;

pub const DEFAULT_BINS: usize = 100;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for a fitting session.
#[derive(Debug, Clone, PartialEq)]
pub struct FitConfig {
    /// Histogram bin count.
    pub bins: usize,
    /// Per-candidate wall-clock budget.
    pub timeout: Duration,
    pub candidates: CandidateSet,
    /// Worker threads for a batch. `None` uses rayon's default (one per core).
    pub workers: Option<usize>,
    pub xmin: Option<f64>,
    pub xmax: Option<f64>,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            bins: DEFAULT_BINS,
            timeout: DEFAULT_TIMEOUT,
            candidates: CandidateSet::All,
            workers: None,
            xmin: None,
            xmax: None,
        }
    }
}

impl FitConfig {
    /// Load from the process environment, reading `.env` first if present.
    ///
    /// Recognized keys: `DISTFIT_BINS`, `DISTFIT_TIMEOUT_SECS`,
    /// `DISTFIT_DISTRIBUTIONS`, `DISTFIT_WORKERS`, `DISTFIT_XMIN`, `DISTFIT_XMAX`.
    pub fn from_env() -> Result<Self, FitError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, FitError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("DISTFIT_BINS") {
            cfg.bins = parse_value("DISTFIT_BINS", &v)?;
        }
        if let Some(v) = get("DISTFIT_TIMEOUT_SECS") {
            let secs: f64 = parse_value("DISTFIT_TIMEOUT_SECS", &v)?;
            if !secs.is_finite() || secs <= 0.0 {
                return Err(FitError::InvalidConfig(format!(
                    "DISTFIT_TIMEOUT_SECS must be positive (got {v})."
                )));
            }
            cfg.timeout = Duration::try_from_secs_f64(secs).map_err(|_| {
                FitError::InvalidConfig(format!("DISTFIT_TIMEOUT_SECS out of range (got {v})."))
            })?;
        }
        if let Some(v) = get("DISTFIT_DISTRIBUTIONS") {
            cfg.candidates = v.parse()?;
        }
        if let Some(v) = get("DISTFIT_WORKERS") {
            cfg.workers = Some(parse_value("DISTFIT_WORKERS", &v)?);
        }
        if let Some(v) = get("DISTFIT_XMIN") {
            cfg.xmin = Some(parse_value("DISTFIT_XMIN", &v)?);
        }
        if let Some(v) = get("DISTFIT_XMAX") {
            cfg.xmax = Some(parse_value("DISTFIT_XMAX", &v)?);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), FitError> {
        if self.bins == 0 {
            return Err(FitError::InvalidConfig("Bin count must be >= 1.".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(FitError::InvalidConfig("Timeout must be positive.".to_string()));
        }
        if self.workers == Some(0) {
            return Err(FitError::InvalidConfig("Worker count must be >= 1.".to_string()));
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, FitError> {
    raw.trim()
        .parse()
        .map_err(|_| FitError::InvalidConfig(format!("Could not parse {key}={raw}.")))
}
