//! Ranking and best-candidate selection.
//!
//! Ordering rules for a score column:
//! - lower is better, except for the KS p-value (higher is better)
//! - skipped candidates always rank last
//! - NaN scores rank after every comparable score
//! - ties break by candidate name

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::domain::{BestFit, CandidateFit, NamedParam, ResultTable, ScoreMethod, ScoreRow};
use crate::error::FitError;

/// Rows of `table` ordered best-first by `method`.
pub fn rank<'a>(table: &'a ResultTable, method: ScoreMethod) -> Vec<(&'a str, &'a ScoreRow)> {
    let mut rows: Vec<(&str, &ScoreRow)> = table.iter().collect();
    rows.sort_by(|a, b| compare_rows(a, b, method));
    rows
}

fn compare_rows(a: &(&str, &ScoreRow), b: &(&str, &ScoreRow), method: ScoreMethod) -> Ordering {
    let (a_name, a_row) = a;
    let (b_name, b_row) = b;

    b_row
        .is_fitted()
        .cmp(&a_row.is_fitted())
        .then_with(|| compare_scores(a_row.scores.get(method), b_row.scores.get(method), method))
        .then_with(|| a_name.cmp(b_name))
}

fn compare_scores(a: f64, b: f64, method: ScoreMethod) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = a.total_cmp(&b);
            if method.lower_is_better() { ord } else { ord.reverse() }
        }
    }
}

/// Pick the best successfully fitted candidate by `method`.
///
/// Fails with [`FitError::EmptyResult`] when the table is empty, every row was
/// skipped, or the winner has no stored fit.
pub fn select_best(
    table: &ResultTable,
    fits: &BTreeMap<String, CandidateFit>,
    method: ScoreMethod,
) -> Result<BestFit, FitError> {
    let (name, row) = rank(table, method)
        .into_iter()
        .find(|(_, row)| row.is_fitted())
        .ok_or_else(|| FitError::EmptyResult(method.to_string()))?;

    let fit = fits
        .get(name)
        .ok_or_else(|| FitError::EmptyResult(format!("{method} (no parameters for '{name}')")))?;

    let params = fit
        .param_names
        .iter()
        .zip(&fit.params)
        .map(|(n, v)| NamedParam {
            name: n.clone(),
            value: *v,
        })
        .collect();

    Ok(BestFit {
        name: name.to_string(),
        method,
        score: row.scores.get(method),
        params,
    })
}
