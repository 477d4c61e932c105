//! Output formatting for analysis reports.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption; a saved
//!   `quality` report can be passed back as `--baseline`

use colored::*;
use serde::{Deserialize, Serialize};

use crate::analysis::{CodeUnit, FileAnalysis};
use crate::engine::AnalysisReport;
use crate::graph::DependencyGraph;
use crate::score::{grades, MetricsResult, RegressionCheck};
use crate::structure::StructureSummary;

/// Which slice of the report a command presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Structure,
    Dependencies,
    Complexity,
    Quality,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Structure => "structure",
            View::Dependencies => "dependencies",
            View::Complexity => "complexity",
            View::Quality => "quality",
        }
    }
}

/// Context shared by every view.
#[derive(Debug, Clone, Copy)]
pub struct Header<'a> {
    pub path: &'a str,
    pub config: Option<&'a str>,
    pub threshold: u32,
}

// =============================================================================
// JSON Format
// =============================================================================

/// JSON document for one view. Sections not belonging to the view are
/// omitted.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub view: String,
    pub path: String,
    pub complexity_threshold: u32,
    pub unsupported_files: usize,
    pub unreadable_files: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<StructureSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<DependencyGraph>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regression: Option<RegressionCheck>,
}

impl JsonReport {
    pub fn build(
        view: View,
        header: &Header<'_>,
        report: &AnalysisReport,
        regression: Option<RegressionCheck>,
    ) -> Self {
        let mut json = JsonReport {
            version: env!("CARGO_PKG_VERSION").to_string(),
            view: view.as_str().to_string(),
            path: header.path.to_string(),
            complexity_threshold: header.threshold,
            unsupported_files: report.unsupported_files,
            unreadable_files: report.unreadable_files,
            structure: None,
            graph: None,
            files: Vec::new(),
            metrics: None,
            baseline_reference: None,
            regression: None,
        };
        match view {
            View::Structure => json.structure = Some(report.structure.clone()),
            View::Dependencies => json.graph = Some(report.graph.clone()),
            View::Complexity => {
                json.files = report.files.clone();
                json.metrics = Some(report.metrics.clone());
            }
            View::Quality => {
                json.metrics = Some(report.metrics.clone());
                json.baseline_reference = report.baseline_reference.clone();
                json.regression = regression;
            }
        }
        json
    }
}

/// Render a view as pretty-printed JSON.
pub fn render_json(
    view: View,
    header: &Header<'_>,
    report: &AnalysisReport,
    regression: Option<RegressionCheck>,
) -> anyhow::Result<String> {
    let json = JsonReport::build(view, header, report, regression);
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Write a view in JSON format.
pub fn write_json(
    view: View,
    header: &Header<'_>,
    report: &AnalysisReport,
    regression: Option<RegressionCheck>,
) -> anyhow::Result<()> {
    println!("{}", render_json(view, header, report, regression)?);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write a view as colored terminal output.
pub fn write_pretty(
    view: View,
    header: &Header<'_>,
    report: &AnalysisReport,
    regression: Option<RegressionCheck>,
) {
    println!();
    print!("  ");
    print!("{}", "repo-analyzer".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Analyzing: ".dimmed());
    println!("{}", header.path);
    if let Some(config) = header.config {
        print!("  {}", "Config:    ".dimmed());
        println!("{}", config);
    }
    if view == View::Quality {
        if let Some(ref baseline) = report.baseline_reference {
            print!("  {}", "Baseline:  ".dimmed());
            println!("{}", baseline);
        }
    }
    println!();

    match view {
        View::Structure => write_structure(&report.structure, report.unreadable_files),
        View::Dependencies => write_dependencies(&report.graph),
        View::Complexity => write_complexity(&report.files, &report.metrics, header.threshold),
        View::Quality => write_quality(&report.metrics, regression),
    }
    println!();
}

fn write_structure(structure: &StructureSummary, unreadable: usize) {
    println!("  {}", "Overview:".bold());
    println!("    {:<20} {}", "Files", structure.total_files);
    println!("    {:<20} {}", "Directories", structure.total_directories);
    println!("    {:<20} {}", "Lines of code", structure.total_lines);
    if let Some(ref primary) = structure.primary_language {
        println!("    {:<20} {}", "Primary language", primary.green());
    }
    if structure.unsupported_files > 0 {
        println!(
            "    {:<20} {}",
            "Unsupported files",
            structure.unsupported_files.to_string().yellow()
        );
    }
    if unreadable > 0 {
        println!("    {:<20} {}", "Unreadable files", unreadable.to_string().red());
    }
    println!();

    if !structure.languages.is_empty() {
        println!("  {}", "Languages:".bold());
        let mut langs: Vec<_> = structure.languages.iter().collect();
        langs.sort_by(|a, b| b.1.lines.cmp(&a.1.lines).then_with(|| a.0.cmp(b.0)));
        for (name, stats) in langs {
            let share = percent(stats.lines, structure.total_lines);
            println!(
                "    {:<14} {:>5} files {:>8} lines  {}",
                name,
                stats.files,
                stats.lines,
                format!("{:.1}%", share).dimmed()
            );
        }
        println!();
    }

    let dirs = structure.largest_directories(10);
    if !dirs.is_empty() {
        println!("  {}", "Largest directories:".bold());
        for (name, m) in dirs {
            println!(
                "    {:<32} {:>8} lines {:>5} functions  avg {:.1}  max {}",
                name.blue(),
                m.lines_of_code,
                m.functions,
                m.average_complexity,
                m.max_complexity
            );
        }
    }
}

fn write_dependencies(graph: &DependencyGraph) {
    let internal_edges = graph.internal_edges().count();
    let externals = graph.external_packages();

    println!("  {}", "Graph:".bold());
    println!("    {:<20} {}", "Modules", graph.internal_node_count());
    println!("    {:<20} {}", "Internal imports", internal_edges);
    println!("    {:<20} {}", "External packages", externals.len());
    println!();

    if graph.has_cycles() {
        println!(
            "  {} ({}):",
            "Circular dependencies".red().bold(),
            graph.cycles.len()
        );
        for cycle in &graph.cycles {
            let mut path = cycle.clone();
            if let Some(first) = cycle.first() {
                path.push(first.clone());
            }
            println!("    {}", path.join(" → ").red());
        }
    } else {
        println!("  {}", "✓ No circular dependencies".green());
    }
    println!();

    let mut imported: Vec<(&str, usize)> = graph
        .nodes
        .iter()
        .filter(|n| !n.is_external)
        .map(|n| (n.id.as_str(), graph.dependents_of(&n.id).len()))
        .filter(|(_, count)| *count > 0)
        .collect();
    imported.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    if !imported.is_empty() {
        println!("  {}", "Most imported modules:".bold());
        for (id, count) in imported.into_iter().take(10) {
            println!("    {:<40} {}", id.blue(), count);
        }
        println!();
    }

    if !externals.is_empty() {
        println!("  {}", "External packages:".bold());
        println!("    {}", externals.join(", ").dimmed());
    }
}

fn write_complexity(files: &[FileAnalysis], metrics: &MetricsResult, threshold: u32) {
    let total: usize = files.iter().map(|f| f.functions.len()).sum();
    println!("  {}", "Complexity:".bold());
    println!("    {:<20} {}", "Functions", total);
    println!("    {:<20} {:.2}", "Average", metrics.average_complexity);
    print!("    {:<20} ", "Maximum");
    write_colored_complexity(metrics.max_complexity, threshold);
    println!();
    println!();

    let mut flagged: Vec<(&FileAnalysis, &CodeUnit)> = files
        .iter()
        .flat_map(|f| f.functions.iter().map(move |u| (f, u)))
        .filter(|(_, u)| u.cyclomatic_complexity > threshold)
        .collect();
    flagged.sort_by(|a, b| {
        b.1.cyclomatic_complexity
            .cmp(&a.1.cyclomatic_complexity)
            .then_with(|| a.0.path.cmp(&b.0.path))
            .then_with(|| a.1.start_line.cmp(&b.1.start_line))
    });

    if flagged.is_empty() {
        println!(
            "  {}",
            format!("✓ No function exceeds complexity {}", threshold).green()
        );
        return;
    }

    println!(
        "  {} ({}):",
        format!("Functions above {}", threshold).bold(),
        flagged.len()
    );
    println!();
    for (file, unit) in flagged.into_iter().take(20) {
        print!("    ");
        write_colored_complexity(unit.cyclomatic_complexity, threshold);
        print!("  {:<28}", unit.name);
        print!("{}", file.path.blue());
        println!("{}", format!(":{}", unit.start_line).dimmed());
        println!(
            "          {}",
            format!(
                "cognitive {}, nesting {}, {} params, {} lines",
                unit.cognitive_complexity,
                unit.nesting_depth,
                unit.parameter_count,
                unit.line_span()
            )
            .dimmed()
        );
    }
}

fn write_colored_complexity(cc: u32, threshold: u32) {
    let text = format!("{:>3}", cc);
    match cc {
        c if c <= threshold => print!("{}", text.green()),
        c if c <= threshold * 2 => print!("{}", text.yellow()),
        _ => print!("{}", text.red().bold()),
    }
}

fn write_quality(metrics: &MetricsResult, regression: Option<RegressionCheck>) {
    print!("  {}  ", "Quality score:".bold());
    let score = format!("{:.1}/10", metrics.overall_score);
    if metrics.overall_score >= grades::SCORE_GOOD {
        println!("{}", score.green().bold());
    } else {
        println!("{}", score.red().bold());
    }
    println!();

    print!("    {:<24} ", "Maintainability index");
    let mi = format!("{:.1}", metrics.maintainability_index);
    if metrics.maintainability_index >= grades::MAINTAINABILITY_GOOD {
        println!("{}", mi.green());
    } else {
        println!("{}", mi.red());
    }

    print!("    {:<24} ", "Technical debt ratio");
    let tdr = format!("{:.1}%", metrics.technical_debt_ratio * 100.0);
    if metrics.technical_debt_ratio <= grades::DEBT_GOOD {
        println!("{}", tdr.green());
    } else {
        println!("{}", tdr.yellow());
    }
    println!("    {:<24} {:.2}", "Average complexity", metrics.average_complexity);
    println!("    {:<24} {}", "Max complexity", metrics.max_complexity);
    println!();

    if let Some(check) = regression {
        let line = format!(
            "score {:+.1}, debt ratio {:+.1}%",
            check.score_delta,
            check.debt_delta * 100.0
        );
        if check.regressed {
            println!("  {}  {}", "✗ REGRESSION".red(), line);
        } else {
            println!("  {}  {}", "✓ No regression".green(), line.dimmed());
        }
        println!();
    }

    if metrics.recommendations.is_empty() {
        println!("  {}", "No recommendations.".dimmed());
    } else {
        println!("  {}", "Recommendations:".bold());
        for (i, rec) in metrics.recommendations.iter().enumerate() {
            println!("    {}. {}", i + 1, rec);
        }
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Engine, EngineOptions, SourceFile};

    fn sample() -> AnalysisReport {
        Engine::new(EngineOptions::default())
            .analyze_sources(
                vec![
                    SourceFile::new("a.py", "python", "import b\ndef f(x):\n    if x:\n        return 1\n"),
                    SourceFile::new("b.py", "python", "import a\n"),
                ],
                None,
            )
            .unwrap()
    }

    fn header() -> Header<'static> {
        Header {
            path: "repo",
            config: None,
            threshold: 10,
        }
    }

    #[test]
    fn test_json_sections_per_view() {
        let report = sample();

        let json = JsonReport::build(View::Structure, &header(), &report, None);
        assert!(json.structure.is_some());
        assert!(json.graph.is_none() && json.metrics.is_none() && json.files.is_empty());

        let json = JsonReport::build(View::Dependencies, &header(), &report, None);
        assert_eq!(json.graph.as_ref().map(|g| g.cycles.len()), Some(1));

        let json = JsonReport::build(View::Complexity, &header(), &report, None);
        assert_eq!(json.files.len(), 2);

        let json = JsonReport::build(View::Quality, &header(), &report, None);
        assert!(json.metrics.is_some());
        assert_eq!(json.view, "quality");
    }

    #[test]
    fn test_json_omits_empty_sections() {
        let rendered = render_json(View::Structure, &header(), &sample(), None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert!(value.get("structure").is_some());
        assert!(value.get("graph").is_none());
        assert!(value.get("regression").is_none());
        assert_eq!(value["complexity_threshold"], 10);
    }

    #[test]
    fn test_pretty_does_not_panic() {
        let report = sample();
        for view in [View::Structure, View::Dependencies, View::Complexity, View::Quality] {
            write_pretty(view, &header(), &report, None);
        }
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(1, 4), 25.0);
        assert_eq!(percent(3, 0), 0.0);
    }
}
