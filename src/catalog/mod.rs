//! Distribution catalog.
//!
//! - built-in families (`FamilyKind`) with densities and CDFs
//! - maximum-likelihood estimation (closed form or simplex)
//! - the `Estimator` trait and the name → estimator `Registry`

pub mod density;
pub mod estimate;
pub mod kind;
pub mod registry;

pub use estimate::fit_family;
pub use kind::*;
pub use registry::*;
