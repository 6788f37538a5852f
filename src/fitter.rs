//! Session-level façade: sample, bounds, histogram, candidates and results.
//!
//! `Fitter` keeps derived state consistent:
//!
//! - changing the bounds recomputes the trimmed sample and histogram together
//! - changing bounds or bins discards results computed on the old data
//! - a batch replaces the previous table wholesale
//!
//! Mutating methods take `&mut self`, so nothing can change the inputs while a
//! batch is running.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::catalog::Registry;
use crate::config::FitConfig;
use crate::data::{Histogram, Sample};
use crate::domain::{
    BestFit, CandidateFit, CandidateSet, FittedCurve, RankedRow, ResultTable, ScoreMethod,
};
use crate::error::FitError;
use crate::fit::{BatchOutcome, BatchRequest, fit_candidates, rank, select_best};

#[derive(Debug, Clone)]
pub struct Fitter {
    sample: Sample,
    bins: usize,
    histogram: Histogram,
    registry: Arc<Registry>,
    candidates: Vec<String>,
    timeout: Duration,
    workers: Option<usize>,
    outcome: BatchOutcome,
}

impl Fitter {
    /// Build a session over the built-in families.
    pub fn new(data: Vec<f64>, config: &FitConfig) -> Result<Self, FitError> {
        Self::with_registry(data, config, Registry::shared())
    }

    /// Build a session over a caller-supplied registry.
    pub fn with_registry(
        data: Vec<f64>,
        config: &FitConfig,
        registry: Arc<Registry>,
    ) -> Result<Self, FitError> {
        config.validate()?;
        let mut sample = Sample::new(data)?;
        sample.set_bounds(config.xmin, config.xmax)?;
        let histogram = Histogram::from_sample(sample.trimmed(), config.bins)?;
        let candidates = registry.resolve(&config.candidates)?;

        Ok(Self {
            sample,
            bins: config.bins,
            histogram,
            registry,
            candidates,
            timeout: config.timeout,
            workers: config.workers,
            outcome: BatchOutcome::default(),
        })
    }

    pub fn sample(&self) -> &Sample {
        &self.sample
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    pub fn xmin(&self) -> f64 {
        self.sample.xmin()
    }

    pub fn xmax(&self) -> f64 {
        self.sample.xmax()
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Set both bounds at once (`None` resets to the raw extreme).
    ///
    /// On error the previous bounds, histogram and results are kept.
    pub fn set_inclusion_bounds(
        &mut self,
        xmin: Option<f64>,
        xmax: Option<f64>,
    ) -> Result<(), FitError> {
        let mut sample = self.sample.clone();
        sample.set_bounds(xmin, xmax)?;
        let histogram = Histogram::from_sample(sample.trimmed(), self.bins)?;

        debug!(
            "Inclusion range now [{}, {}] ({} of {} observations)",
            sample.xmin(),
            sample.xmax(),
            sample.trimmed().len(),
            sample.raw().len()
        );
        self.sample = sample;
        self.histogram = histogram;
        self.discard_results();
        Ok(())
    }

    /// Set the lower bound, keeping the current upper bound.
    pub fn set_xmin(&mut self, xmin: Option<f64>) -> Result<(), FitError> {
        self.set_inclusion_bounds(xmin, Some(self.sample.xmax()))
    }

    /// Set the upper bound, keeping the current lower bound.
    pub fn set_xmax(&mut self, xmax: Option<f64>) -> Result<(), FitError> {
        self.set_inclusion_bounds(Some(self.sample.xmin()), xmax)
    }

    pub fn set_bins(&mut self, bins: usize) -> Result<(), FitError> {
        let histogram = Histogram::from_sample(self.sample.trimmed(), bins)?;
        debug!("Histogram recomputed with {bins} bins");
        self.bins = bins;
        self.histogram = histogram;
        self.discard_results();
        Ok(())
    }

    /// Replace the candidate list. Unknown names are rejected.
    pub fn set_candidates(&mut self, set: &CandidateSet) -> Result<(), FitError> {
        self.candidates = self.registry.resolve(set)?;
        Ok(())
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> Result<(), FitError> {
        if timeout.is_zero() {
            return Err(FitError::InvalidConfig("Timeout must be positive.".to_string()));
        }
        self.timeout = timeout;
        Ok(())
    }

    /// Fit every candidate and replace the result table.
    pub fn fit(&mut self) -> Result<&ResultTable, FitError> {
        let req = BatchRequest {
            candidates: &self.candidates,
            sample: self.sample.trimmed_shared(),
            histogram: &self.histogram,
            timeout: self.timeout,
            workers: self.workers,
        };
        self.outcome = fit_candidates(&self.registry, &req)?;
        Ok(&self.outcome.table)
    }

    pub fn table(&self) -> &ResultTable {
        &self.outcome.table
    }

    /// Parameters and fitted densities of the successful candidates.
    pub fn fitted(&self) -> &BTreeMap<String, CandidateFit> {
        &self.outcome.fits
    }

    /// Top `n_best` rows ordered by `method`.
    pub fn summary(&self, n_best: usize, method: ScoreMethod) -> Vec<RankedRow> {
        rank(&self.outcome.table, method)
            .into_iter()
            .take(n_best)
            .map(|(name, row)| RankedRow {
                name: name.to_string(),
                row: row.clone(),
            })
            .collect()
    }

    pub fn get_best(&self, method: ScoreMethod) -> Result<BestFit, FitError> {
        select_best(&self.outcome.table, &self.outcome.fits, method)
    }

    /// Fitted densities of the top `n_best` successful candidates.
    pub fn best_curves(&self, n_best: usize, method: ScoreMethod) -> Vec<FittedCurve> {
        rank(&self.outcome.table, method)
            .into_iter()
            .filter_map(|(name, _)| self.outcome.fits.get(name))
            .take(n_best)
            .map(|fit| FittedCurve {
                name: fit.name.clone(),
                x: self.histogram.x.clone(),
                pdf: fit.pdf_fitted.clone(),
            })
            .collect()
    }

    fn discard_results(&mut self) {
        if !self.outcome.table.is_empty() {
            debug!("Discarding {} stale results", self.outcome.table.len());
        }
        self.outcome = BatchOutcome::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> Vec<f64> {
        (0..2_000).map(|i| ((i * 7919) % 1000) as f64 / 100.0).collect()
    }

    fn config(names: &[&str]) -> FitConfig {
        FitConfig {
            bins: 25,
            candidates: CandidateSet::Named(names.iter().map(|s| s.to_string()).collect()),
            ..FitConfig::default()
        }
    }

    #[test]
    fn construction_applies_config() {
        let cfg = FitConfig {
            xmin: Some(1.0),
            xmax: Some(8.0),
            ..config(&["norm", "uniform", "norm"])
        };
        let f = Fitter::new(data(), &cfg).unwrap();
        assert_eq!(f.xmin(), 1.0);
        assert_eq!(f.xmax(), 8.0);
        assert_eq!(f.histogram().x.len(), 25);
        assert_eq!(f.candidates(), &["norm".to_string(), "uniform".to_string()]);
        assert!(f.table().is_empty());
    }

    #[test]
    fn bound_changes_discard_results() {
        let mut f = Fitter::new(data(), &config(&["norm", "uniform"])).unwrap();
        f.fit().unwrap();
        assert_eq!(f.table().len(), 2);

        f.set_xmin(Some(2.0)).unwrap();
        assert!(f.table().is_empty());
        assert!(f.fitted().is_empty());
        assert!(f.sample().trimmed().iter().all(|&v| v >= 2.0));

        f.set_xmin(None).unwrap();
        assert_eq!(f.xmin(), 0.0);
    }

    #[test]
    fn failed_bound_change_keeps_previous_state() {
        let mut f = Fitter::new(data(), &config(&["norm"])).unwrap();
        f.fit().unwrap();
        let before = f.histogram().clone();
        assert!(f.set_inclusion_bounds(Some(5.0), Some(1.0)).is_err());
        assert_eq!(f.histogram(), &before);
        assert_eq!(f.table().len(), 1);
    }

    #[test]
    fn set_bins_rebuilds_histogram() {
        let mut f = Fitter::new(data(), &config(&["norm"])).unwrap();
        f.set_bins(10).unwrap();
        assert_eq!(f.histogram().y.len(), 10);
        assert!(f.set_bins(0).is_err());
        assert_eq!(f.bins(), 10);
    }

    #[test]
    fn summary_and_curves_follow_ranking() {
        let mut f = Fitter::new(data(), &config(&["norm", "uniform"])).unwrap();
        f.fit().unwrap();
        // The data are spread evenly over [0, 10).
        let best = f.get_best(ScoreMethod::SumSquareError).unwrap();
        assert_eq!(best.name, "uniform");

        let rows = f.summary(1, ScoreMethod::SumSquareError);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "uniform");

        let curves = f.best_curves(5, ScoreMethod::SumSquareError);
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[0].x.len(), curves[0].pdf.len());
    }

    #[test]
    fn unknown_candidate_is_rejected_up_front() {
        let err = Fitter::new(data(), &config(&["norm", "nope"])).unwrap_err();
        assert_eq!(err, FitError::UnknownFamily("nope".to_string()));
        let mut f = Fitter::new(data(), &config(&["norm"])).unwrap();
        assert!(f.set_candidates(&CandidateSet::Named(vec!["nope".into()])).is_err());
        assert_eq!(f.candidates(), &["norm".to_string()]);
    }
}
