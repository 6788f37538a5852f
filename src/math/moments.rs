//! Summary statistics used to seed parameter estimation.

use statrs::statistics::{Data, Median, OrderStatistics, Statistics};

/// Location/spread/shape summary of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleMoments {
    pub n: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation (divides by `n`).
    pub std: f64,
    pub skewness: f64,
    pub median: f64,
    pub iqr: f64,
}

impl SampleMoments {
    /// `None` for an empty sample.
    pub fn of(sample: &[f64]) -> Option<Self> {
        if sample.is_empty() {
            return None;
        }
        let mean = sample.iter().mean();
        let std = sample.iter().population_std_dev();
        let skewness = if std > 0.0 {
            let m3 = sample.iter().map(|v| (v - mean).powi(3)).sum::<f64>() / sample.len() as f64;
            m3 / std.powi(3)
        } else {
            0.0
        };

        let mut ordered = Data::new(sample.to_vec());
        let median = ordered.median();
        let iqr = ordered.interquartile_range();

        Some(Self {
            n: sample.len(),
            min: Statistics::min(sample.iter()),
            max: Statistics::max(sample.iter()),
            mean,
            std: if std.is_nan() { 0.0 } else { std },
            skewness,
            median,
            iqr: if iqr.is_nan() { 0.0 } else { iqr },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_sample() {
        let m = SampleMoments::of(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(m.n, 5);
        assert_eq!(m.min, 1.0);
        assert_eq!(m.max, 5.0);
        assert!((m.mean - 3.0).abs() < 1e-12);
        assert!((m.std - 2f64.sqrt()).abs() < 1e-12);
        assert!(m.skewness.abs() < 1e-12);
        assert!((m.median - 3.0).abs() < 1e-12);
        assert!(m.iqr > 0.0);
    }

    #[test]
    fn right_skewed_sample_has_positive_skewness() {
        let m = SampleMoments::of(&[0.0, 0.0, 0.0, 1.0, 10.0]).unwrap();
        assert!(m.skewness > 0.0);
    }

    #[test]
    fn single_value_has_zero_spread() {
        let m = SampleMoments::of(&[4.2]).unwrap();
        assert_eq!(m.std, 0.0);
        assert_eq!(m.skewness, 0.0);
        assert!(SampleMoments::of(&[]).is_none());
    }
}
