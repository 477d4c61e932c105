//! Command-line interface for repo-analyzer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use tracing::debug;

use crate::analysis::capabilities;
use crate::config::{self, Config};
use crate::engine::{AnalysisReport, Engine};
use crate::report::{self, Header, View};
use crate::reporter::ProgressReporter;
use crate::score::{self, HistoricalBaseline, RegressionCheck};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Language-aware repository analysis.
///
/// Scans a source tree and reports its structure, module dependency graph
/// (with circular dependencies), function complexity and a composite
/// quality score that can gate on regressions against a saved baseline.
#[derive(Parser)]
#[command(name = "repo-analyzer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log progress details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize files, languages and directories
    Structure(AnalyzeArgs),
    /// Show the module dependency graph and circular dependencies
    #[command(visible_alias = "deps")]
    Dependencies(AnalyzeArgs),
    /// List functions above the complexity threshold
    Complexity(AnalyzeArgs),
    /// Compute the quality score, optionally against a baseline
    Quality(QualityArgs),
    /// List supported languages
    Info(InfoArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Pretty,
    Json,
}

/// Arguments shared by every analysing command.
#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Path to analyse (directory or single file)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Glob pattern to exclude (repeatable)
    #[arg(short, long = "exclude")]
    pub exclude: Vec<String>,

    /// Cyclomatic complexity above which a function is flagged
    #[arg(short, long)]
    pub threshold: Option<u32>,

    /// Analyse test files too
    #[arg(long)]
    pub include_tests: bool,

    /// Worker threads (default: available cores)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
    pub format: Format,
}

/// Arguments for the quality command.
#[derive(Args, Debug, Clone)]
pub struct QualityArgs {
    #[command(flatten)]
    pub common: AnalyzeArgs,

    /// Baseline metrics JSON to compare against
    #[arg(short, long)]
    pub baseline: Option<PathBuf>,

    /// Exit with code 1 when quality regressed against the baseline
    #[arg(long)]
    pub fail_on_regression: bool,
}

/// Arguments for the info command.
#[derive(Args, Debug, Clone)]
pub struct InfoArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
    pub format: Format,
}

/// Merge the config file with command-line overrides.
fn resolve_config(args: &AnalyzeArgs) -> anyhow::Result<(Config, Option<PathBuf>)> {
    let (mut config, path) = Config::load(args.config.as_deref(), &args.path)?;
    if let Some(threshold) = args.threshold {
        config.complexity_threshold = Some(threshold);
    }
    if let Some(jobs) = args.jobs {
        config.parallelism = Some(jobs);
    }
    if args.include_tests {
        config.include_tests = Some(true);
    }
    config.exclude_patterns.extend(args.exclude.iter().cloned());
    config::validate(&config)?;
    Ok((config, path))
}

fn run_engine(
    config: &Config,
    path: &Path,
    format: Format,
    baseline: Option<&HistoricalBaseline>,
) -> anyhow::Result<AnalysisReport> {
    let progress = Arc::new(ProgressReporter::new(format == Format::Pretty));
    let engine = Engine::new(config.engine_options()).with_reporter(progress);
    Ok(engine.analyze_path(path, baseline)?)
}

fn emit(
    view: View,
    args: &AnalyzeArgs,
    config: &Config,
    config_path: Option<&Path>,
    report: &AnalysisReport,
    regression: Option<RegressionCheck>,
) -> anyhow::Result<()> {
    let path = args.path.to_string_lossy().to_string();
    let config_path = config_path.map(|p| p.to_string_lossy().to_string());
    let header = Header {
        path: &path,
        config: config_path.as_deref(),
        threshold: config.threshold(),
    };
    match args.format {
        Format::Json => report::write_json(view, &header, report, regression)?,
        Format::Pretty => report::write_pretty(view, &header, report, regression),
    }
    Ok(())
}

/// Run the structure, dependencies or complexity command.
pub fn run_view(view: View, args: &AnalyzeArgs) -> anyhow::Result<i32> {
    let (config, config_path) = match resolve_config(args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let report = match run_engine(&config, &args.path, args.format, None) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    emit(view, args, &config, config_path.as_deref(), &report, None)?;
    Ok(EXIT_SUCCESS)
}

/// Run the quality command.
pub fn run_quality(args: &QualityArgs) -> anyhow::Result<i32> {
    let (config, config_path) = match resolve_config(&args.common) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let baseline_path = args.baseline.clone().or_else(|| config.baseline.clone());
    let baseline = match baseline_path {
        Some(ref p) => match HistoricalBaseline::from_file(p) {
            Ok(b) => {
                debug!(reference = %b.reference, "loaded baseline");
                Some(b)
            }
            Err(e) => {
                eprintln!("Error: {:#}", e);
                return Ok(EXIT_ERROR);
            }
        },
        None => None,
    };

    if args.fail_on_regression && baseline.is_none() {
        eprintln!(
            "{}",
            "Warning: --fail-on-regression has no effect without a baseline".yellow()
        );
    }

    let report = match run_engine(
        &config,
        &args.common.path,
        args.common.format,
        baseline.as_ref(),
    ) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let regression = baseline
        .as_ref()
        .map(|b| score::compare(&report.metrics, &b.metrics));
    emit(
        View::Quality,
        &args.common,
        &config,
        config_path.as_deref(),
        &report,
        regression,
    )?;

    if args.fail_on_regression && report.metrics.has_regression {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the info command.
pub fn run_info(args: &InfoArgs) -> anyhow::Result<i32> {
    let caps = capabilities();

    if args.format == Format::Json {
        println!("{}", serde_json::to_string_pretty(&caps)?);
        return Ok(EXIT_SUCCESS);
    }

    println!("Supported languages:");
    println!();
    for cap in &caps {
        let exts: Vec<String> = cap.extensions.iter().map(|e| format!(".{}", e)).collect();
        println!(
            "  {:<12} {:<12} {}",
            cap.language.bold(),
            format!("{:?}", cap.block_style).to_lowercase().dimmed(),
            exts.join(" ")
        );
        if !cap.aliases.is_empty() {
            println!("  {:<12} {}", "", format!("aliases: {}", cap.aliases.join(", ")).dimmed());
        }
    }

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_quality_args() {
        let cli = Cli::parse_from([
            "repo-analyzer",
            "quality",
            "src",
            "--baseline",
            "base.json",
            "--fail-on-regression",
            "-e",
            "gen/**",
            "-e",
            "*.min.js",
            "--format",
            "json",
        ]);
        let Commands::Quality(args) = cli.command else {
            panic!("expected quality");
        };
        assert_eq!(args.common.path, PathBuf::from("src"));
        assert_eq!(args.common.exclude, vec!["gen/**", "*.min.js"]);
        assert_eq!(args.common.format, Format::Json);
        assert!(args.fail_on_regression);
    }

    #[test]
    fn test_cli_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("repo-analyzer.yaml"),
            "complexity_threshold: 5\nexclude_patterns: [\"a/**\"]\n",
        )
        .unwrap();
        let cli = Cli::parse_from([
            "repo-analyzer",
            "complexity",
            dir.path().to_str().unwrap(),
            "--threshold",
            "12",
            "--exclude",
            "b/**",
        ]);
        let Commands::Complexity(args) = cli.command else {
            panic!("expected complexity");
        };
        let (config, path) = resolve_config(&args).unwrap();
        assert!(path.is_some());
        assert_eq!(config.threshold(), 12);
        assert_eq!(config.exclude_patterns, vec!["a/**", "b/**"]);
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let cli = Cli::parse_from(["repo-analyzer", "structure", ".", "--threshold", "0"]);
        let Commands::Structure(args) = cli.command else {
            panic!("expected structure");
        };
        assert!(resolve_config(&args).is_err());
    }
}
