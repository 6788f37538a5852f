//! Numerical utilities: simplex minimization, goodness-of-fit statistics and
//! sample summaries.

pub mod gof;
pub mod moments;
pub mod simplex;

pub use gof::*;
pub use moments::*;
pub use simplex::*;
