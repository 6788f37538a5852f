//! Raw observations and the trimmed view used for fitting.

use std::sync::Arc;

use crate::error::FitError;

/// A raw sample plus its inclusion bounds.
///
/// The trimmed sample is recomputed eagerly whenever the bounds change, and is
/// shared (`Arc`) so estimation workers can hold it without copying.
#[derive(Debug, Clone)]
pub struct Sample {
    raw: Vec<f64>,
    raw_min: f64,
    raw_max: f64,
    xmin: f64,
    xmax: f64,
    trimmed: Arc<[f64]>,
}

impl Sample {
    /// Build a sample with bounds at the raw extremes.
    pub fn new(raw: Vec<f64>) -> Result<Self, FitError> {
        if raw.is_empty() {
            return Err(FitError::InvalidSample("Sample is empty.".to_string()));
        }
        if let Some(pos) = raw.iter().position(|v| !v.is_finite()) {
            return Err(FitError::InvalidSample(format!(
                "Non-finite value {} at position {pos}.",
                raw[pos]
            )));
        }

        let raw_min = raw.iter().copied().fold(f64::INFINITY, f64::min);
        let raw_max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let trimmed: Arc<[f64]> = raw.clone().into();

        Ok(Self {
            raw,
            raw_min,
            raw_max,
            xmin: raw_min,
            xmax: raw_max,
            trimmed,
        })
    }

    /// Set both inclusion bounds.
    ///
    /// `None` resets a bound to the raw extreme. A bound outside the raw range
    /// is clamped to it (bounds only narrow). Nothing changes on error.
    pub fn set_bounds(&mut self, xmin: Option<f64>, xmax: Option<f64>) -> Result<(), FitError> {
        let xmin = self.resolve_bound("xmin", xmin)?.max(self.raw_min);
        let xmax = self.resolve_bound("xmax", xmax)?.min(self.raw_max);

        if xmin > xmax {
            return Err(FitError::InvalidRange(format!(
                "xmin={xmin} is greater than xmax={xmax}."
            )));
        }

        let trimmed: Vec<f64> = self
            .raw
            .iter()
            .copied()
            .filter(|&v| v >= xmin && v <= xmax)
            .collect();
        if trimmed.is_empty() {
            return Err(FitError::InvalidRange(format!(
                "No observations within [{xmin}, {xmax}]."
            )));
        }

        self.xmin = xmin;
        self.xmax = xmax;
        self.trimmed = trimmed.into();
        Ok(())
    }

    fn resolve_bound(&self, label: &str, value: Option<f64>) -> Result<f64, FitError> {
        match value {
            None if label == "xmin" => Ok(self.raw_min),
            None => Ok(self.raw_max),
            Some(v) if v.is_finite() => Ok(v),
            Some(v) => Err(FitError::InvalidRange(format!("{label}={v} is not a finite number."))),
        }
    }

    pub fn raw(&self) -> &[f64] {
        &self.raw
    }

    pub fn raw_min(&self) -> f64 {
        self.raw_min
    }

    pub fn raw_max(&self) -> f64 {
        self.raw_max
    }

    /// Effective lower bound (after clamping).
    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    /// Effective upper bound (after clamping).
    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    /// Observations within `[xmin, xmax]`, in raw order.
    pub fn trimmed(&self) -> &[f64] {
        &self.trimmed
    }

    pub fn trimmed_shared(&self) -> Arc<[f64]> {
        Arc::clone(&self.trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Sample {
        Sample::new(vec![3.0, -1.0, 7.5, 2.0, 2.0, 10.0]).unwrap()
    }

    #[test]
    fn defaults_to_raw_extremes() {
        let s = sample();
        assert_eq!(s.xmin(), -1.0);
        assert_eq!(s.xmax(), 10.0);
        assert_eq!(s.trimmed(), s.raw());
    }

    #[test]
    fn trims_inclusively_and_keeps_order() {
        let mut s = sample();
        s.set_bounds(Some(2.0), Some(7.5)).unwrap();
        assert_eq!(s.trimmed(), &[3.0, 7.5, 2.0, 2.0]);
    }

    #[test]
    fn out_of_range_bounds_are_clamped() {
        let mut s = sample();
        s.set_bounds(Some(-100.0), Some(1e6)).unwrap();
        assert_eq!(s.xmin(), -1.0);
        assert_eq!(s.xmax(), 10.0);
    }

    #[test]
    fn none_resets_to_extremes() {
        let mut s = sample();
        s.set_bounds(Some(2.5), Some(8.0)).unwrap();
        s.set_bounds(None, None).unwrap();
        assert_eq!(s.xmin(), -1.0);
        assert_eq!(s.xmax(), 10.0);
        assert_eq!(s.trimmed().len(), 6);
    }

    #[test]
    fn inverted_or_nan_bounds_fail_and_leave_state_untouched() {
        let mut s = sample();
        s.set_bounds(Some(2.0), Some(7.5)).unwrap();

        let err = s.set_bounds(Some(8.0), Some(3.0)).unwrap_err();
        assert!(matches!(err, FitError::InvalidRange(_)));
        let err = s.set_bounds(Some(f64::NAN), None).unwrap_err();
        assert!(matches!(err, FitError::InvalidRange(_)));

        assert_eq!(s.xmin(), 2.0);
        assert_eq!(s.xmax(), 7.5);
    }

    #[test]
    fn empty_window_is_rejected() {
        let mut s = sample();
        let err = s.set_bounds(Some(4.0), Some(7.0)).unwrap_err();
        assert!(matches!(err, FitError::InvalidRange(_)));
    }

    #[test]
    fn rejects_empty_and_non_finite_samples() {
        assert!(matches!(Sample::new(vec![]), Err(FitError::InvalidSample(_))));
        assert!(matches!(
            Sample::new(vec![1.0, f64::INFINITY]),
            Err(FitError::InvalidSample(_))
        ));
    }
}
