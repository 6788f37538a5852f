//! Shared domain types.
//!
//! Lightweight and serializable: used in-memory during fitting, handed to a
//! presentation layer, or exported by callers as JSON.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CandidateFailure, FitError};

/// Which families to attempt in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateSet {
    /// Every family in the catalog that exposes parameter estimation.
    All,
    /// The curated "common" subset, for fast default runs.
    Common,
    /// An explicit, user-supplied list.
    Named(Vec<String>),
}

impl FromStr for CandidateSet {
    type Err = FitError;

    /// Parses `all`, `common`, or a comma-separated list of family names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "all" => return Ok(CandidateSet::All),
            "common" => return Ok(CandidateSet::Common),
            _ => {}
        }
        let names: Vec<String> = s
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();
        if names.is_empty() {
            return Err(FitError::InvalidConfig(
                "Candidate list is empty.".to_string(),
            ));
        }
        Ok(CandidateSet::Named(names))
    }
}

/// Score column used for ranking and best-candidate selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMethod {
    #[default]
    #[serde(rename = "sumsquare_error")]
    SumSquareError,
    Aic,
    Bic,
    KlDiv,
    KsStatistic,
    KsPvalue,
}

impl ScoreMethod {
    pub const ALL: [ScoreMethod; 6] = [
        ScoreMethod::SumSquareError,
        ScoreMethod::Aic,
        ScoreMethod::Bic,
        ScoreMethod::KlDiv,
        ScoreMethod::KsStatistic,
        ScoreMethod::KsPvalue,
    ];

    /// Column name as shown in summaries.
    pub fn column_name(self) -> &'static str {
        match self {
            ScoreMethod::SumSquareError => "sumsquare_error",
            ScoreMethod::Aic => "aic",
            ScoreMethod::Bic => "bic",
            ScoreMethod::KlDiv => "kl_div",
            ScoreMethod::KsStatistic => "ks_statistic",
            ScoreMethod::KsPvalue => "ks_pvalue",
        }
    }

    /// `false` only for the KS p-value, where a larger value is a better fit.
    pub fn lower_is_better(self) -> bool {
        !matches!(self, ScoreMethod::KsPvalue)
    }
}

impl fmt::Display for ScoreMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for ScoreMethod {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ScoreMethod::ALL
            .into_iter()
            .find(|m| m.column_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| FitError::InvalidConfig(format!("Unknown score method '{s}'.")))
    }
}

/// Goodness-of-fit scores for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitScores {
    pub sumsquare_error: f64,
    pub aic: f64,
    pub bic: f64,
    pub kl_div: f64,
    pub ks_statistic: f64,
    pub ks_pvalue: f64,
}

impl FitScores {
    /// Scores of a skipped candidate: the worst possible value in every column.
    pub fn failed() -> Self {
        Self {
            sumsquare_error: f64::INFINITY,
            aic: f64::INFINITY,
            bic: f64::INFINITY,
            kl_div: f64::INFINITY,
            ks_statistic: f64::INFINITY,
            ks_pvalue: 0.0,
        }
    }

    pub fn get(&self, method: ScoreMethod) -> f64 {
        match method {
            ScoreMethod::SumSquareError => self.sumsquare_error,
            ScoreMethod::Aic => self.aic,
            ScoreMethod::Bic => self.bic,
            ScoreMethod::KlDiv => self.kl_div,
            ScoreMethod::KsStatistic => self.ks_statistic,
            ScoreMethod::KsPvalue => self.ks_pvalue,
        }
    }
}

/// Whether a candidate produced real scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FitStatus {
    Fitted,
    Skipped { reason: String },
}

/// One row of the result table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub status: FitStatus,
    pub scores: FitScores,
}

impl ScoreRow {
    pub fn fitted(scores: FitScores) -> Self {
        Self {
            status: FitStatus::Fitted,
            scores,
        }
    }

    pub fn skipped(failure: &CandidateFailure) -> Self {
        Self {
            status: FitStatus::Skipped {
                reason: failure.to_string(),
            },
            scores: FitScores::failed(),
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.status == FitStatus::Fitted
    }
}

/// Full output of a successful candidate fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateFit {
    pub name: String,
    /// Parameter vector in `[shapes..., loc, scale]` order.
    pub params: Vec<f64>,
    /// Names for each position of `params`.
    pub param_names: Vec<String>,
    /// Fitted density at the histogram bin centers.
    pub pdf_fitted: Vec<f64>,
    pub scores: FitScores,
    /// Wall time spent estimating parameters.
    #[serde(skip)]
    pub elapsed: Duration,
}

/// Candidate identifier → scores. Exactly one row per attempted candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    rows: BTreeMap<String, ScoreRow>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: impl IntoIterator<Item = (String, ScoreRow)>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, row: ScoreRow) {
        self.rows.insert(name.into(), row);
    }

    pub fn get(&self, name: &str) -> Option<&ScoreRow> {
        self.rows.get(name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScoreRow)> {
        self.rows.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of rows with real scores.
    pub fn fitted_count(&self) -> usize {
        self.rows.values().filter(|r| r.is_fitted()).count()
    }
}

/// A table row with its candidate name, as returned by rankings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRow {
    pub name: String,
    #[serde(flatten)]
    pub row: ScoreRow,
}

/// A fitted density sampled on the histogram grid, for plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedCurve {
    pub name: String,
    pub x: Vec<f64>,
    pub pdf: Vec<f64>,
}

/// A named parameter of the best fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedParam {
    pub name: String,
    pub value: f64,
}

/// Winner of best-candidate selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestFit {
    pub name: String,
    pub method: ScoreMethod,
    pub score: f64,
    pub params: Vec<NamedParam>,
}

impl BestFit {
    pub fn param(&self, name: &str) -> Option<f64> {
        self.params.iter().find(|p| p.name == name).map(|p| p.value)
    }
}
