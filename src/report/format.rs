//! Formatted terminal output for fit results.
//!
//! Formatting lives here so the fitting code stays free of presentation
//! concerns and output changes stay localized.

use crate::domain::{BestFit, FitStatus, RankedRow, ScoreMethod};
use crate::fitter::Fitter;

/// Session header (sample and histogram) followed by the ranked table.
pub fn format_session(fitter: &Fitter, n_best: usize, method: ScoreMethod) -> String {
    let mut out = String::new();
    let sample = fitter.sample();

    out.push_str("=== distfit - distribution fit ===\n");
    out.push_str(&format!(
        "Sample: n={} (of {}) | range=[{:.4}, {:.4}]\n",
        sample.trimmed().len(),
        sample.raw().len(),
        fitter.xmin(),
        fitter.xmax()
    ));
    out.push_str(&format!(
        "Histogram: bins={} | width={:.4}\n",
        fitter.bins(),
        fitter.histogram().bin_width
    ));
    out.push_str(&format!(
        "Candidates: {} attempted, {} fitted\n\n",
        fitter.table().len(),
        fitter.table().fitted_count()
    ));

    out.push_str(&format!("Ranked by {method}:\n"));
    out.push_str(&format_summary(&fitter.summary(n_best, method)));
    out
}

/// Fixed-width table of ranked rows.
pub fn format_summary(rows: &[RankedRow]) -> String {
    let mut out = String::new();

    let mut header = format!("{:<14}", "distribution");
    for m in ScoreMethod::ALL {
        header.push_str(&format!(" {:>15}", m.column_name()));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    let mut rule = format!("{:-<14}", "");
    for _ in ScoreMethod::ALL {
        rule.push_str(&format!(" {:-<15}", ""));
    }
    out.push_str(&rule);
    out.push('\n');

    for r in rows {
        let mut line = format!("{:<14}", truncate(&r.name, 14));
        for m in ScoreMethod::ALL {
            line.push_str(&format!(" {:>15}", fmt_score(r.row.scores.get(m))));
        }
        if let FitStatus::Skipped { reason } = &r.row.status {
            line.push_str(&format!("  (skipped: {reason})"));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// "Best fit is ..." message with the named parameters.
pub fn format_best(best: &BestFit) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Best fit is {} distribution ({}={})\n",
        best.name,
        best.method,
        fmt_score(best.score).trim()
    ));
    for p in &best.params {
        out.push_str(&format!("- {:<6} = {:.6}\n", p.name, p.value));
    }
    out
}

fn fmt_score(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if v != 0.0 && (v.abs() >= 1e6 || v.abs() < 1e-4) {
        format!("{v:.4e}")
    } else {
        format!("{v:.6}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max - 1).collect();
    out.push('.');
    out
}
