//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - candidate selection and score-column enums (`CandidateSet`, `ScoreMethod`)
//! - per-candidate fit outputs (`CandidateFit`, `FitScores`)
//! - the result table and best-fit types (`ResultTable`, `BestFit`)

pub mod types;

pub use types::*;
