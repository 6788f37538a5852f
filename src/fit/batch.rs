//! Batch orchestration: fit every candidate in parallel and merge the results.
//!
//! Each candidate is an independent task on a rayon pool. Tasks share only
//! read-only inputs (sample, histogram). The merge waits for every task and
//! produces exactly one table row per candidate; failures become skipped rows.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::catalog::Registry;
use crate::data::Histogram;
use crate::domain::{CandidateFit, ResultTable, ScoreRow};
use crate::error::{CandidateFailure, FitError};

use super::candidate::fit_candidate;

/// Everything a batch produced.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub table: ResultTable,
    /// Successful fits keyed by candidate name.
    pub fits: BTreeMap<String, CandidateFit>,
}

/// Inputs shared by every task of a batch.
#[derive(Debug, Clone)]
pub struct BatchRequest<'a> {
    pub candidates: &'a [String],
    pub sample: Arc<[f64]>,
    pub histogram: &'a Histogram,
    pub timeout: Duration,
    /// Pool size; `None` uses rayon's default.
    pub workers: Option<usize>,
}

/// Fit all candidates.
///
/// Unknown names are rejected before any work starts. Per-candidate failures
/// never abort the batch.
pub fn fit_candidates(registry: &Registry, req: &BatchRequest<'_>) -> Result<BatchOutcome, FitError> {
    registry.validate(req.candidates)?;
    if req.workers == Some(0) {
        return Err(FitError::InvalidConfig("Worker count must be >= 1.".to_string()));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(req.workers.unwrap_or(0))
        .thread_name(|i| format!("distfit-worker-{i}"))
        .build()
        .map_err(|e| FitError::WorkerPool(e.to_string()))?;

    debug!(
        "Fitting {} candidates on {} workers (timeout {:?})",
        req.candidates.len(),
        pool.current_num_threads(),
        req.timeout
    );
    let started = Instant::now();
    let progress = Progress::new(req.candidates.len());

    let results: Vec<(String, Result<CandidateFit, CandidateFailure>)> = pool.install(|| {
        req.candidates
            .par_iter()
            .map(|name| {
                let outcome = match registry.get(name) {
                    Some(estimator) => fit_candidate(
                        estimator,
                        Arc::clone(&req.sample),
                        req.histogram,
                        req.timeout,
                    ),
                    None => Err(CandidateFailure::Estimation(format!("'{name}' is not registered"))),
                };
                log_outcome(name, &outcome);
                progress.tick();
                (name.clone(), outcome)
            })
            .collect()
    });

    let mut outcome = BatchOutcome::default();
    for (name, result) in results {
        match result {
            Ok(fit) => {
                outcome.table.insert(name.clone(), ScoreRow::fitted(fit.scores));
                outcome.fits.insert(name, fit);
            }
            Err(failure) => outcome.table.insert(name, ScoreRow::skipped(&failure)),
        }
    }

    debug!(
        "Batch finished in {:.2?}: {} fitted, {} skipped",
        started.elapsed(),
        outcome.table.fitted_count(),
        outcome.table.len() - outcome.table.fitted_count()
    );
    Ok(outcome)
}

/// Completion counter shared by the tasks of one batch.
struct Progress {
    done: AtomicUsize,
    total: usize,
}

impl Progress {
    fn new(total: usize) -> Self {
        Self {
            done: AtomicUsize::new(0),
            total,
        }
    }

    /// Record one finished candidate and return how many are done.
    fn tick(&self) -> usize {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("Progress: {done}/{} candidates", self.total);
        done
    }
}

fn log_outcome(name: &str, outcome: &Result<CandidateFit, CandidateFailure>) {
    match outcome {
        Ok(fit) => info!(
            "Fitted {name} distribution with error={}",
            round6(fit.scores.sumsquare_error)
        ),
        Err(failure) => warn!("SKIPPED {name} distribution ({failure})"),
    }
}

fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}
