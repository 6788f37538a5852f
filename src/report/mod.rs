//! Reporting utilities: ranked summaries and the best-fit message.

pub mod format;

pub use format::*;
