//! `distfit` library crate.
//!
//! Fits a one-dimensional sample against a catalog of parametric distribution
//! families, scores every candidate against the sample's density histogram, and
//! selects the best one by a chosen criterion.
//!
//! Layout:
//!
//! - `data`: raw sample, inclusion bounds, density histogram
//! - `catalog`: families, densities, parameter estimation, registry
//! - `fit`: time-budgeted estimation, scoring, parallel batch, selection
//! - `fitter`: the session façade tying these together
//! - `report`: text summaries for terminals and logs
//!
//! ```no_run
//! use distfit::{FitConfig, Fitter, ScoreMethod};
//!
//! # fn main() -> Result<(), distfit::FitError> {
//! let data: Vec<f64> = vec![1.2, 3.4, 2.2, 5.1, 4.4, 2.9];
//! let mut fitter = Fitter::new(data, &FitConfig::default())?;
//! fitter.fit()?;
//! let best = fitter.get_best(ScoreMethod::SumSquareError)?;
//! println!("{}", distfit::report::format_best(&best));
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod fitter;
pub mod math;
pub mod report;

pub use catalog::{Estimator, Registry, get_common_distributions, get_distributions};
pub use config::FitConfig;
pub use domain::{BestFit, CandidateSet, ResultTable, ScoreMethod};
pub use error::{CandidateFailure, EstimateError, FitError};
pub use fit::CancelToken;
pub use fitter::Fitter;
