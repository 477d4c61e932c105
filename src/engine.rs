//! Analysis orchestration.
//!
//! Per-file work (read, scan, extract, compute) runs on a bounded rayon
//! pool. Graph construction and scoring run once, after every worker has
//! returned. Cancellation is checked before each file and again at the
//! join; nothing shared is mutated before that point.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::{analyze_with, for_language, FileAnalysis};
use crate::discover::{self, Candidate, DiscoveryOptions};
use crate::error::AnalyzeError;
use crate::graph::{self, DependencyGraph};
use crate::reporter::{NullReporter, Reporter};
use crate::score::{self, HistoricalBaseline, MetricsResult};
use crate::structure::{self, StructureSummary};

/// Default cyclomatic complexity threshold.
pub const DEFAULT_COMPLEXITY_THRESHOLD: u32 = 10;

/// Engine settings.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub complexity_threshold: u32,
    /// Worker threads; None uses every available core.
    pub parallelism: Option<usize>,
    pub discovery: DiscoveryOptions,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            complexity_threshold: DEFAULT_COMPLEXITY_THRESHOLD,
            parallelism: None,
            discovery: DiscoveryOptions::default(),
        }
    }
}

/// A file supplied by the caller instead of discovered on disk.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub language: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, language: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            language: language.into(),
            bytes: bytes.into(),
        }
    }
}

/// Complete result of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Analysed files, sorted by path.
    pub files: Vec<FileAnalysis>,
    pub graph: DependencyGraph,
    pub metrics: MetricsResult,
    pub structure: StructureSummary,
    pub unsupported_files: usize,
    pub unreadable_files: usize,
    pub baseline_reference: Option<String>,
}

impl AnalysisReport {
    pub fn total_functions(&self) -> usize {
        self.files.iter().map(|f| f.functions.len()).sum()
    }
}

/// Cancels a running analysis from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

enum Outcome {
    Analysed(FileAnalysis),
    Unreadable,
    Skipped,
}

/// The analysis engine.
pub struct Engine {
    options: EngineOptions,
    reporter: Arc<dyn Reporter>,
    cancel: CancelHandle,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            reporter: Arc::new(NullReporter),
            cancel: CancelHandle::default(),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Discover, read and analyse every supported file under `root`.
    pub fn analyze_path(
        &self,
        root: &Path,
        baseline: Option<&HistoricalBaseline>,
    ) -> Result<AnalysisReport, AnalyzeError> {
        let discovery = discover::discover(root, &self.options.discovery)?;
        let attempted = discovery.candidates.len();
        info!(
            root = %root.display(),
            files = attempted,
            unsupported = discovery.unsupported_files(),
            "discovered source files"
        );
        self.reporter.started(attempted);

        let threshold = self.options.complexity_threshold;
        let outcomes = self.run_parallel(&discovery.candidates, |candidate: &Candidate| {
            match candidate.read() {
                Ok(bytes) => Outcome::Analysed(analyze_with(
                    candidate.analyzer,
                    &candidate.path,
                    &bytes,
                    threshold,
                )),
                Err(e) => {
                    warn!(path = %candidate.path, error = %e, "failed to read file");
                    Outcome::Unreadable
                }
            }
        })?;

        let (files, unreadable) = self.collect(&discovery.candidates, outcomes, |c| &c.path);
        if attempted > 0 && files.is_empty() {
            return Err(AnalyzeError::NoReadableFiles { attempted });
        }

        Ok(self.finish(
            files,
            discovery.unsupported_files(),
            unreadable,
            discovery.directories,
            baseline,
        ))
    }

    /// Analyse files already in memory.
    ///
    /// Files whose language has no analyzer count as unsupported.
    pub fn analyze_sources(
        &self,
        sources: Vec<SourceFile>,
        baseline: Option<&HistoricalBaseline>,
    ) -> Result<AnalysisReport, AnalyzeError> {
        let (supported, unsupported): (Vec<_>, Vec<_>) = sources
            .into_iter()
            .partition(|s| for_language(&s.language).is_some());
        self.reporter.started(supported.len());

        let threshold = self.options.complexity_threshold;
        let outcomes = self.run_parallel(&supported, |source: &SourceFile| {
            match for_language(&source.language) {
                Some(analyzer) => {
                    Outcome::Analysed(analyze_with(analyzer, &source.path, &source.bytes, threshold))
                }
                None => Outcome::Skipped,
            }
        })?;

        let (files, unreadable) = self.collect(&supported, outcomes, |s| &s.path);
        let directories = count_directories(&files);
        Ok(self.finish(files, unsupported.len(), unreadable, directories, baseline))
    }

    /// Map `work` over `items` on the worker pool, then check cancellation.
    fn run_parallel<T, F>(&self, items: &[T], work: F) -> Result<Vec<Outcome>, AnalyzeError>
    where
        T: Sync,
        F: Fn(&T) -> Outcome + Sync + Send,
    {
        let cancel = &self.cancel;
        let job = || -> Vec<Outcome> {
            items
                .par_iter()
                .map(|item| {
                    if cancel.is_cancelled() {
                        Outcome::Skipped
                    } else {
                        work(item)
                    }
                })
                .collect()
        };

        let outcomes = match self.options.parallelism {
            Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(job),
                Err(e) => {
                    warn!(error = %e, "falling back to the global thread pool");
                    job()
                }
            },
            None => job(),
        };

        if self.cancel.is_cancelled() {
            debug!("analysis cancelled before join");
            return Err(AnalyzeError::Cancelled);
        }
        Ok(outcomes)
    }

    fn collect<T>(
        &self,
        items: &[T],
        outcomes: Vec<Outcome>,
        path_of: impl Fn(&T) -> &String,
    ) -> (Vec<FileAnalysis>, usize) {
        let mut files = Vec::with_capacity(outcomes.len());
        let mut unreadable = 0;
        for (item, outcome) in items.iter().zip(outcomes) {
            match outcome {
                Outcome::Analysed(fa) => {
                    self.reporter.file_done(path_of(item), Some(&fa));
                    files.push(fa);
                }
                Outcome::Unreadable => {
                    self.reporter.file_done(path_of(item), None);
                    unreadable += 1;
                }
                Outcome::Skipped => {}
            }
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        (files, unreadable)
    }

    fn finish(
        &self,
        files: Vec<FileAnalysis>,
        unsupported_files: usize,
        unreadable_files: usize,
        directories: usize,
        baseline: Option<&HistoricalBaseline>,
    ) -> AnalysisReport {
        let graph = graph::build(&files);
        let metrics = score::aggregate(&files, &graph, baseline);
        let structure = structure::summarize(&files, directories, unsupported_files);
        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            cycles = graph.cycles.len(),
            score = metrics.overall_score,
            "aggregation complete"
        );
        self.reporter.finished();

        AnalysisReport {
            files,
            graph,
            metrics,
            structure,
            unsupported_files,
            unreadable_files,
            baseline_reference: baseline.map(|b| b.reference.clone()),
        }
    }
}

/// Distinct directories among in-memory file paths.
fn count_directories(files: &[FileAnalysis]) -> usize {
    let dirs: std::collections::BTreeSet<&str> = files.iter().map(|f| f.directory()).collect();
    dirs.len()
}

/// Analyse `root` with default settings.
pub fn analyze_path(root: &Path, options: EngineOptions) -> Result<AnalysisReport, AnalyzeError> {
    Engine::new(options).analyze_path(root, None)
}
