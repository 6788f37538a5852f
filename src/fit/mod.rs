//! Fitting orchestration.
//!
//! Responsibilities:
//!
//! - run parameter estimation under a wall-clock budget
//! - fit and score each candidate family (parallel)
//! - rank candidates and select the best by a score column
//! - Gaussian histogram fitting with noise resampling

pub mod batch;
pub mod budget;
pub mod candidate;
pub mod histfit;
pub mod selection;

pub use batch::*;
pub use budget::*;
pub use candidate::*;
pub use histfit::*;
pub use selection::*;
