//! Repository quality scoring.
//!
//! Folds per-file results into a single [`MetricsResult`] and, when a
//! [`HistoricalBaseline`] is supplied, flags a regression against it.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::FileAnalysis;
use crate::graph::DependencyGraph;

/// Maintainability index and overall score weights.
pub mod weights {
    pub const MI_BASE: f64 = 100.0;
    /// Per point of average cyclomatic complexity.
    pub const MI_COMPLEXITY: f64 = 3.0;
    /// Per line of average function length.
    pub const MI_FUNCTION_LINES: f64 = 0.5;
    /// Per unit of comment ratio.
    pub const MI_COMMENTS: f64 = 50.0;

    pub const SCORE_MAINTAINABILITY: f64 = 0.6;
    pub const SCORE_DEBT: f64 = 0.4;
}

/// Recommendation triggers.
pub mod thresholds {
    pub const AVERAGE_COMPLEXITY: f64 = 10.0;
    pub const MAX_COMPLEXITY: u32 = 20;
    pub const COMMENT_RATIO: f64 = 0.05;
    pub const DEBT_RATIO: f64 = 0.10;
    pub const MAINTAINABILITY: f64 = 40.0;
}

/// Regression tolerances. A change must exceed these to count.
pub mod epsilon {
    pub const SCORE_DROP: f64 = 0.5;
    pub const DEBT_INCREASE: f64 = 0.05;
}

/// Presentation bands for the pretty report.
pub mod grades {
    pub const MAINTAINABILITY_GOOD: f64 = 20.0;
    pub const DEBT_GOOD: f64 = 0.05;
    pub const SCORE_GOOD: f64 = 7.0;
}

/// Repository-level quality metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    pub average_complexity: f64,
    pub max_complexity: u32,
    /// 0 to 100, higher is better.
    pub maintainability_index: f64,
    /// 0 to 1, share of functions carrying warnings.
    pub technical_debt_ratio: f64,
    /// 0 to 10, one decimal.
    pub overall_score: f64,
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub has_regression: bool,
}

/// A previously persisted result to compare against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalBaseline {
    /// Commit, branch or file the metrics came from.
    pub reference: String,
    pub metrics: MetricsResult,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BaselineFile {
    Keyed {
        #[serde(default)]
        reference: Option<String>,
        metrics: MetricsResult,
    },
    Bare(MetricsResult),
}

impl HistoricalBaseline {
    pub fn new(reference: impl Into<String>, metrics: MetricsResult) -> Self {
        Self {
            reference: reference.into(),
            metrics,
        }
    }

    /// Load a baseline from JSON.
    ///
    /// Accepts a `{reference, metrics}` object, a full saved report (its
    /// `metrics` field is used), or a bare metrics object. Without an
    /// explicit reference the file name stands in.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read baseline file: {}", path.display()))?;
        let fallback = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_json(&content, &fallback)
            .with_context(|| format!("Failed to parse baseline file: {}", path.display()))
    }

    pub fn from_json(content: &str, fallback_reference: &str) -> Result<Self> {
        let parsed: BaselineFile = serde_json::from_str(content)?;
        Ok(match parsed {
            BaselineFile::Keyed { reference, metrics } => Self {
                reference: reference.unwrap_or_else(|| fallback_reference.to_string()),
                metrics,
            },
            BaselineFile::Bare(metrics) => Self::new(fallback_reference, metrics),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Outcome of comparing a result with a baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionCheck {
    /// Current minus baseline overall score.
    pub score_delta: f64,
    /// Current minus baseline debt ratio.
    pub debt_delta: f64,
    pub regressed: bool,
}

/// Compare `current` against `baseline`.
pub fn compare(current: &MetricsResult, baseline: &MetricsResult) -> RegressionCheck {
    // Scores carry one decimal and debt ratios four; compare at that precision.
    let score_delta = round_to(current.overall_score - baseline.overall_score, 2);
    let debt_delta = round_to(current.technical_debt_ratio - baseline.technical_debt_ratio, 4);
    RegressionCheck {
        score_delta,
        debt_delta,
        regressed: -score_delta > epsilon::SCORE_DROP || debt_delta > epsilon::DEBT_INCREASE,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn ratio(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole
    } else {
        0.0
    }
}

/// Raw repository totals the score is derived from.
#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    functions: usize,
    complexity_sum: u64,
    max_complexity: u32,
    function_lines: u64,
    lines_of_code: usize,
    comment_lines: usize,
    debt_issues: usize,
}

impl Totals {
    fn collect(files: &[FileAnalysis]) -> Self {
        let mut totals = Self::default();
        for file in files {
            totals.lines_of_code += file.lines_of_code;
            totals.comment_lines += file.comment_lines;
            totals.debt_issues += file.debt_issue_count();
            for function in &file.functions {
                totals.functions += 1;
                totals.complexity_sum += u64::from(function.cyclomatic_complexity);
                totals.max_complexity = totals.max_complexity.max(function.cyclomatic_complexity);
                totals.function_lines += function.line_span() as u64;
            }
        }
        totals
    }

    fn average_complexity(&self) -> f64 {
        ratio(self.complexity_sum as f64, self.functions as f64)
    }

    fn average_function_lines(&self) -> f64 {
        ratio(self.function_lines as f64, self.functions as f64)
    }

    fn comment_ratio(&self) -> f64 {
        ratio(
            self.comment_lines as f64,
            (self.lines_of_code + self.comment_lines) as f64,
        )
    }

    fn debt_ratio(&self) -> f64 {
        ratio(self.debt_issues as f64, self.functions as f64).clamp(0.0, 1.0)
    }

    fn maintainability_index(&self) -> f64 {
        let mi = weights::MI_BASE - weights::MI_COMPLEXITY * self.average_complexity()
            - weights::MI_FUNCTION_LINES * self.average_function_lines()
            + weights::MI_COMMENTS * self.comment_ratio();
        mi.clamp(0.0, 100.0)
    }
}

/// Aggregate all file analyses into repository metrics.
///
/// Pure: the same inputs always produce the same result. Without a
/// baseline `has_regression` is false.
pub fn aggregate(
    files: &[FileAnalysis],
    graph: &DependencyGraph,
    baseline: Option<&HistoricalBaseline>,
) -> MetricsResult {
    let totals = Totals::collect(files);

    let average = totals.average_complexity();
    let mi = totals.maintainability_index();
    let tdr = totals.debt_ratio();
    let overall = round_to(
        weights::SCORE_MAINTAINABILITY * (mi / 10.0)
            + weights::SCORE_DEBT * (1.0 - tdr) * 10.0,
        1,
    );

    let mut result = MetricsResult {
        average_complexity: round_to(average, 2),
        max_complexity: totals.max_complexity,
        maintainability_index: round_to(mi, 2),
        technical_debt_ratio: round_to(tdr, 4),
        overall_score: overall,
        recommendations: Vec::new(),
        has_regression: false,
    };

    let check = baseline.map(|b| (b, compare(&result, &b.metrics)));
    result.has_regression = check.is_some_and(|(_, c)| c.regressed);
    result.recommendations = recommendations(&result, &totals, graph, check);
    result
}

fn recommendations(
    result: &MetricsResult,
    totals: &Totals,
    graph: &DependencyGraph,
    check: Option<(&HistoricalBaseline, RegressionCheck)>,
) -> Vec<String> {
    let mut out = Vec::new();

    if result.average_complexity > thresholds::AVERAGE_COMPLEXITY {
        out.push(format!(
            "Reduce average complexity below {} (currently {:.1})",
            thresholds::AVERAGE_COMPLEXITY,
            result.average_complexity
        ));
    }
    if result.max_complexity > thresholds::MAX_COMPLEXITY {
        out.push(format!(
            "Split the most complex function (complexity {}) below {}",
            result.max_complexity,
            thresholds::MAX_COMPLEXITY
        ));
    }
    let comment_ratio = totals.comment_ratio();
    if totals.lines_of_code > 0 && comment_ratio < thresholds::COMMENT_RATIO {
        out.push(format!(
            "Add documentation: comment ratio is {:.1}%, under {:.0}%",
            comment_ratio * 100.0,
            thresholds::COMMENT_RATIO * 100.0
        ));
    }
    if result.technical_debt_ratio > thresholds::DEBT_RATIO {
        out.push(format!(
            "Address flagged issues: debt ratio {:.1}% exceeds {:.0}%",
            result.technical_debt_ratio * 100.0,
            thresholds::DEBT_RATIO * 100.0
        ));
    }
    if result.maintainability_index < thresholds::MAINTAINABILITY {
        out.push(format!(
            "Improve maintainability: index {:.1} is below {}",
            result.maintainability_index,
            thresholds::MAINTAINABILITY
        ));
    }
    if graph.has_cycles() {
        let n = graph.cycles.len();
        out.push(format!(
            "Break {} circular dependenc{}",
            n,
            if n == 1 { "y" } else { "ies" }
        ));
    }
    if let Some((baseline, check)) = check.filter(|(_, c)| c.regressed) {
        out.push(format!(
            "Quality regressed against {}: score {:+.1}, debt ratio {:+.1}%",
            baseline.reference,
            check.score_delta,
            check.debt_delta * 100.0
        ));
    }

    out
}
