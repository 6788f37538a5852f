//! Density histogram of the trimmed sample.
//!
//! Bins are equal-width over the sample's value range, densities are normalized
//! so the total area is 1, and the `N + 1` edges are collapsed to `N` midpoints
//! so `x` and `y` always have the same length.

use serde::Serialize;

use crate::error::FitError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// Bin edges (length = bins + 1).
    pub edges: Vec<f64>,
    /// Bin centers (length = bins).
    pub x: Vec<f64>,
    /// Normalized densities (length = bins).
    pub y: Vec<f64>,
    pub bin_width: f64,
}

impl Histogram {
    /// Bin `data` into `bins` equal-width intervals.
    ///
    /// A constant sample gets a unit-wide range centered on the value.
    pub fn from_sample(data: &[f64], bins: usize) -> Result<Self, FitError> {
        if bins == 0 {
            return Err(FitError::InvalidConfig("Bin count must be >= 1.".to_string()));
        }
        if data.is_empty() {
            return Err(FitError::InvalidSample(
                "Cannot build a histogram of an empty sample.".to_string(),
            ));
        }

        let mut lo = data.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let range = hi - lo;
        if !range.is_finite() {
            return Err(FitError::InvalidSample(format!(
                "Sample range [{lo}, {hi}] overflows f64."
            )));
        }
        let width = range / bins as f64;
        let edges: Vec<f64> = (0..=bins)
            .map(|i| if i == bins { hi } else { lo + width * i as f64 })
            .collect();

        let mut counts = vec![0usize; bins];
        for &v in data {
            // The last bin is closed on the right.
            let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        let norm = data.len() as f64 * width;
        let y: Vec<f64> = counts.iter().map(|&c| c as f64 / norm).collect();
        let x: Vec<f64> = edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();

        Ok(Self {
            edges,
            x,
            y,
            bin_width: width,
        })
    }

    pub fn bins(&self) -> usize {
        self.x.len()
    }

    /// Total area under the histogram (≈ 1).
    pub fn area(&self) -> f64 {
        self.y.iter().map(|v| v * self.bin_width).sum()
    }
}

/// Collapse `N + 1` bin edges to `N` midpoints; `N` values are returned as-is.
pub fn edges_to_centers(edges: &[f64], n_values: usize) -> Option<Vec<f64>> {
    if edges.len() == n_values {
        return Some(edges.to_vec());
    }
    if edges.len() == n_values + 1 {
        return Some(edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect());
    }
    None
}
