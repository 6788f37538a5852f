//! Nelder–Mead downhill simplex minimizer.
//!
//! Used for maximum-likelihood estimation of families without a closed-form
//! estimator. The defaults follow the classic `fmin` settings:
//!
//! - initial simplex: each coordinate perturbed by 5 % (or 0.00025 when zero)
//! - reflection 1, expansion 2, contraction 0.5, shrink 0.5
//! - stop when both the simplex diameter and the spread of objective values
//!   fall below `xatol` / `fatol`, or after `200·N` iterations / evaluations
//!
//! Non-finite objective values are treated as `+∞`, so penalized objectives can
//! mark infeasible points by returning `f64::INFINITY` (or NaN).

use std::cell::Cell;

use nalgebra::DVector;
use thiserror::Error;

const RHO: f64 = 1.0;
const CHI: f64 = 2.0;
const PSI: f64 = 0.5;
const SIGMA: f64 = 0.5;
const NONZERO_DELTA: f64 = 0.05;
const ZERO_DELTA: f64 = 0.00025;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplexOptions {
    pub xatol: f64,
    pub fatol: f64,
    pub max_iter: usize,
    pub max_evals: usize,
}

impl SimplexOptions {
    /// Default tolerances and `200·dim` iteration/evaluation caps.
    pub fn for_dim(dim: usize) -> Self {
        Self {
            xatol: 1e-4,
            fatol: 1e-4,
            max_iter: 200 * dim.max(1),
            max_evals: 200 * dim.max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimplexMinimum {
    pub x: Vec<f64>,
    pub fval: f64,
    pub iterations: usize,
    pub evaluations: usize,
    /// `false` when an iteration/evaluation cap stopped the search.
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimplexError {
    #[error("minimization cancelled")]
    Cancelled,
    #[error("empty starting point")]
    EmptyStart,
}

/// Minimize `f` starting from `x0`.
///
/// `should_stop` is polled once per iteration; returning `true` aborts the
/// search with [`SimplexError::Cancelled`].
pub fn nelder_mead<F, S>(
    mut f: F,
    x0: &[f64],
    opts: &SimplexOptions,
    should_stop: S,
) -> Result<SimplexMinimum, SimplexError>
where
    F: FnMut(&[f64]) -> f64,
    S: Fn() -> bool,
{
    let n = x0.len();
    if n == 0 {
        return Err(SimplexError::EmptyStart);
    }

    let evaluations = Cell::new(0usize);
    let mut eval = |v: &DVector<f64>| -> f64 {
        evaluations.set(evaluations.get() + 1);
        let y = f(v.as_slice());
        if y.is_nan() { f64::INFINITY } else { y }
    };

    let start = DVector::from_column_slice(x0);
    let mut sim: Vec<DVector<f64>> = Vec::with_capacity(n + 1);
    sim.push(start.clone());
    for k in 0..n {
        let mut y = start.clone();
        y[k] = if y[k] != 0.0 { (1.0 + NONZERO_DELTA) * y[k] } else { ZERO_DELTA };
        sim.push(y);
    }
    let mut fsim: Vec<f64> = sim.iter().map(&mut eval).collect();
    sort_simplex(&mut sim, &mut fsim);

    let mut iterations = 1usize;
    let mut converged = false;

    while evaluations.get() < opts.max_evals && iterations < opts.max_iter {
        if should_stop() {
            return Err(SimplexError::Cancelled);
        }

        let x_spread = sim[1..]
            .iter()
            .map(|v| (v - &sim[0]).amax())
            .fold(0.0_f64, f64::max);
        let f_spread = fsim[1..]
            .iter()
            .map(|v| (v - fsim[0]).abs())
            .fold(0.0_f64, f64::max);
        if x_spread <= opts.xatol && f_spread <= opts.fatol {
            converged = true;
            break;
        }

        let worst = n;
        let centroid = sim[..n]
            .iter()
            .fold(DVector::<f64>::zeros(n), |acc, v| acc + v)
            / n as f64;

        let xr = &centroid * (1.0 + RHO) - &sim[worst] * RHO;
        let fxr = eval(&xr);
        let mut shrink = false;

        if fxr < fsim[0] {
            let xe = &centroid * (1.0 + RHO * CHI) - &sim[worst] * (RHO * CHI);
            let fxe = eval(&xe);
            if fxe < fxr {
                sim[worst] = xe;
                fsim[worst] = fxe;
            } else {
                sim[worst] = xr;
                fsim[worst] = fxr;
            }
        } else if fxr < fsim[worst - 1] {
            sim[worst] = xr;
            fsim[worst] = fxr;
        } else if fxr < fsim[worst] {
            // Outside contraction.
            let xc = &centroid * (1.0 + PSI * RHO) - &sim[worst] * (PSI * RHO);
            let fxc = eval(&xc);
            if fxc <= fxr {
                sim[worst] = xc;
                fsim[worst] = fxc;
            } else {
                shrink = true;
            }
        } else {
            // Inside contraction.
            let xcc = &centroid * (1.0 - PSI) + &sim[worst] * PSI;
            let fxcc = eval(&xcc);
            if fxcc < fsim[worst] {
                sim[worst] = xcc;
                fsim[worst] = fxcc;
            } else {
                shrink = true;
            }
        }

        if shrink {
            for j in 1..=n {
                let moved = &sim[0] + (&sim[j] - &sim[0]) * SIGMA;
                fsim[j] = eval(&moved);
                sim[j] = moved;
            }
        }

        sort_simplex(&mut sim, &mut fsim);
        iterations += 1;
    }

    Ok(SimplexMinimum {
        x: sim[0].iter().copied().collect(),
        fval: fsim[0],
        iterations,
        evaluations: evaluations.get(),
        converged,
    })
}

fn sort_simplex(sim: &mut Vec<DVector<f64>>, fsim: &mut Vec<f64>) {
    let mut order: Vec<usize> = (0..fsim.len()).collect();
    order.sort_by(|&a, &b| fsim[a].total_cmp(&fsim[b]));
    *sim = order.iter().map(|&i| sim[i].clone()).collect();
    *fsim = order.iter().map(|&i| fsim[i]).collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_quadratic_minimum() {
        let f = |p: &[f64]| (p[0] - 3.0).powi(2) + 2.0 * (p[1] + 1.0).powi(2);
        let opts = SimplexOptions {
            xatol: 1e-8,
            fatol: 1e-10,
            max_iter: 2_000,
            max_evals: 4_000,
        };
        let m = nelder_mead(f, &[0.0, 0.0], &opts, || false).unwrap();
        assert!(m.converged);
        assert!((m.x[0] - 3.0).abs() < 1e-4, "x={:?}", m.x);
        assert!((m.x[1] + 1.0).abs() < 1e-4, "x={:?}", m.x);
    }

    #[test]
    fn minimizes_rosenbrock_with_default_caps() {
        let f = |p: &[f64]| (1.0 - p[0]).powi(2) + 100.0 * (p[1] - p[0] * p[0]).powi(2);
        let opts = SimplexOptions {
            max_iter: 5_000,
            max_evals: 5_000,
            ..SimplexOptions::for_dim(2)
        };
        let m = nelder_mead(f, &[-1.2, 1.0], &opts, || false).unwrap();
        assert!(m.fval < 1e-3, "fval={}", m.fval);
    }

    #[test]
    fn infeasible_points_are_avoided() {
        // Minimum of (x-1)^2 restricted to x > 0.5.
        let f = |p: &[f64]| if p[0] <= 0.5 { f64::NAN } else { (p[0] - 1.0).powi(2) };
        let m = nelder_mead(f, &[2.0], &SimplexOptions::for_dim(1), || false).unwrap();
        assert!((m.x[0] - 1.0).abs() < 1e-2);
    }

    #[test]
    fn stop_flag_cancels_search() {
        let calls = Cell::new(0);
        let stop = || {
            calls.set(calls.get() + 1);
            calls.get() > 3
        };
        let f = |p: &[f64]| p[0].powi(2) + p[1].powi(2);
        let opts = SimplexOptions {
            xatol: 0.0,
            fatol: 0.0,
            max_iter: 10_000,
            max_evals: 10_000,
        };
        let err = nelder_mead(f, &[5.0, 5.0], &opts, stop).unwrap_err();
        assert_eq!(err, SimplexError::Cancelled);
    }

    #[test]
    fn empty_start_is_rejected() {
        let err = nelder_mead(|_| 0.0, &[], &SimplexOptions::for_dim(0), || false).unwrap_err();
        assert_eq!(err, SimplexError::EmptyStart);
    }
}
