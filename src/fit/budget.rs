//! Wall-clock budgets for parameter estimation.
//!
//! Each estimation runs on its own named thread and reports back over a
//! one-slot channel. The caller waits at most `budget`; on expiry it flips the
//! candidate's [`CancelToken`] and moves on. Estimators that poll the token
//! (all built-in families do, once per simplex iteration) stop promptly; a
//! custom estimator that never polls is abandoned and its thread is left to
//! finish in the background.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::catalog::Estimator;
use crate::error::{CandidateFailure, EstimateError};

/// Cooperative cancellation flag shared between a supervisor and an estimator.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Successful estimation plus the time it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    pub params: Vec<f64>,
    pub elapsed: Duration,
}

/// Run `estimator.fit(sample)` with a hard wall-clock budget.
pub fn estimate_within_budget(
    estimator: Arc<dyn Estimator>,
    sample: Arc<[f64]>,
    budget: Duration,
) -> Result<Estimate, CandidateFailure> {
    let token = CancelToken::new();
    let worker_token = token.clone();
    let (tx, rx) = mpsc::sync_channel::<Result<Vec<f64>, EstimateError>>(1);
    let started = Instant::now();

    let spawned = thread::Builder::new()
        .name(format!("estimate-{}", estimator.name()))
        .spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                estimator.fit(&sample, &worker_token)
            }));
            // A panic drops `tx` without sending, which the receiver sees as a
            // disconnect.
            if let Ok(result) = outcome {
                let _ = tx.send(result);
            }
        });
    if let Err(e) = spawned {
        return Err(CandidateFailure::Estimation(format!(
            "could not start estimation thread: {e}"
        )));
    }

    match rx.recv_timeout(budget) {
        Ok(Ok(params)) => Ok(Estimate {
            params,
            elapsed: started.elapsed(),
        }),
        Ok(Err(e)) => Err(e.into()),
        Err(RecvTimeoutError::Timeout) => {
            token.cancel();
            Err(CandidateFailure::Timeout(budget))
        }
        Err(RecvTimeoutError::Disconnected) => Err(CandidateFailure::Panicked),
    }
}
