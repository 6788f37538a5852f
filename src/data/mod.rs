//! Data preparation: raw sample, inclusion bounds, density histogram.

pub mod histogram;
pub mod sample;

pub use histogram::*;
pub use sample::*;
