use std::time::Duration;

use distfit::data::{Histogram, Sample};
use distfit::domain::CandidateSet;
use distfit::math::{kl_divergence, ks_pvalue, ks_statistic};
use distfit::{FitConfig, Fitter};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

fn finite_sample(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0e3..1.0e3f64, 1..max_len)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn trimmed_sample_is_inclusive_subsequence(
        data in finite_sample(200),
        a in -1.2e3..1.2e3f64,
        b in -1.2e3..1.2e3f64,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let mut sample = Sample::new(data.clone()).unwrap();
        match sample.set_bounds(Some(lo), Some(hi)) {
            Ok(()) => {
                let expected: Vec<f64> = data
                    .iter()
                    .copied()
                    .filter(|&v| v >= sample.xmin() && v <= sample.xmax())
                    .collect();
                prop_assert_eq!(sample.trimmed(), expected.as_slice());
                prop_assert!(!sample.trimmed().is_empty());
                prop_assert!(sample.xmin() >= sample.raw_min());
                prop_assert!(sample.xmax() <= sample.raw_max());
            }
            Err(_) => {
                // Failed updates leave the full sample in place.
                prop_assert_eq!(sample.trimmed(), data.as_slice());
            }
        }
    }

    #[test]
    fn none_bounds_restore_raw_extremes(data in finite_sample(100)) {
        let mut sample = Sample::new(data.clone()).unwrap();
        sample.set_bounds(None, None).unwrap();
        prop_assert_eq!(sample.xmin(), sample.raw_min());
        prop_assert_eq!(sample.xmax(), sample.raw_max());
        prop_assert_eq!(sample.trimmed().len(), data.len());
    }

    #[test]
    fn histogram_shape_and_area(data in finite_sample(300), bins in 1usize..120) {
        let h = Histogram::from_sample(&data, bins).unwrap();
        prop_assert_eq!(h.x.len(), bins);
        prop_assert_eq!(h.y.len(), bins);
        prop_assert_eq!(h.edges.len(), bins + 1);
        prop_assert!((h.area() - 1.0).abs() < 1e-9);
        prop_assert!(h.x.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn kl_is_non_negative(p in prop::collection::vec(0.01..10.0f64, 1..50)) {
        let q: Vec<f64> = p.iter().rev().copied().collect();
        let d = kl_divergence(&p, &q);
        prop_assert!(d >= -1e-12, "kl={}", d);
    }

    #[test]
    fn ks_outputs_are_bounded(data in finite_sample(200)) {
        let d = ks_statistic(&data, |x| 1.0 / (1.0 + (-x / 100.0).exp()));
        prop_assert!((0.0..=1.0).contains(&d));
        let p = ks_pvalue(d, data.len());
        prop_assert!((0.0..=1.0).contains(&p));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn batch_has_one_row_per_candidate(data in prop::collection::vec(0.1..50.0f64, 20..200)) {
        let names = vec!["norm".to_string(), "expon".to_string(), "uniform".to_string(), "laplace".to_string()];
        let cfg = FitConfig {
            bins: 20,
            candidates: CandidateSet::Named(names.clone()),
            timeout: Duration::from_secs(10),
            ..FitConfig::default()
        };
        let mut fitter = Fitter::new(data, &cfg).unwrap();
        let table = fitter.fit().unwrap();
        prop_assert_eq!(table.len(), names.len());
        for name in &names {
            prop_assert!(table.get(name).is_some());
        }
    }
}
