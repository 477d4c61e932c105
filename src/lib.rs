//! repo-analyzer - language-aware repository analysis.
//!
//! Turns a source tree into typed per-file facts, a module dependency graph
//! with circular dependency detection, and a composite quality score that
//! can be compared against a saved baseline.
//!
//! # Architecture
//!
//! - `analysis`: token scanner, structural extractor and metrics, one
//!   profile per language behind the analyzer registry
//! - `graph`: import resolution, dependency graph and cycle detection
//! - `score`: repository metrics, quality score and regression checks
//! - `structure`: directory and language rollups
//! - `discover`: file discovery and language detection
//! - `engine`: parallel per-file pipeline and aggregation
//! - `config`: YAML configuration
//! - `report`: output formatting (pretty, JSON)
//!
//! # Adding a New Language
//!
//! See `src/analysis/languages/` for examples. Implement the
//! `LanguageAnalyzer` trait and register it in `languages/mod.rs`.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod discover;
pub mod engine;
pub mod error;
pub mod graph;
pub mod report;
pub mod reporter;
pub mod score;
pub mod structure;

pub use analysis::{
    analyze_source, for_language, CodeUnit, FileAnalysis, ImportEdge, Issue, LanguageAnalyzer,
    Severity, Token, TokenKind, TypeUnit,
};
pub use config::Config;
pub use engine::{analyze_path, AnalysisReport, CancelHandle, Engine, EngineOptions, SourceFile};
pub use error::AnalyzeError;
pub use graph::DependencyGraph;
pub use reporter::{LogReporter, NullReporter, ProgressReporter, Reporter};
pub use score::{HistoricalBaseline, MetricsResult, RegressionCheck};
pub use structure::{DirectoryMetrics, StructureSummary};
