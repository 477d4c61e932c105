//! Directory-level aggregation of file analyses.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::FileAnalysis;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageStats {
    pub files: usize,
    pub lines: usize,
}

/// Rollup of the files directly inside one directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryMetrics {
    pub files: usize,
    pub lines_of_code: usize,
    pub functions: usize,
    pub average_complexity: f64,
    pub max_complexity: u32,
}

/// Shape of the analysed tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureSummary {
    pub total_files: usize,
    pub total_directories: usize,
    pub total_lines: usize,
    pub languages: BTreeMap<String, LanguageStats>,
    /// Language with the most lines; ties go to more files, then name.
    pub primary_language: Option<String>,
    pub unsupported_files: usize,
    pub directories: BTreeMap<String, DirectoryMetrics>,
}

impl StructureSummary {
    /// Directories sorted by lines of code, largest first.
    pub fn largest_directories(&self, limit: usize) -> Vec<(&str, &DirectoryMetrics)> {
        let mut dirs: Vec<_> = self
            .directories
            .iter()
            .map(|(name, m)| (name.as_str(), m))
            .collect();
        dirs.sort_by_key(|(name, m)| (Reverse(m.lines_of_code), *name));
        dirs.truncate(limit);
        dirs
    }
}

/// Summarize analysed files.
///
/// `total_directories` and `unsupported_files` come from discovery; the
/// rest is derived from `files`.
pub fn summarize(
    files: &[FileAnalysis],
    total_directories: usize,
    unsupported_files: usize,
) -> StructureSummary {
    let mut languages: BTreeMap<String, LanguageStats> = BTreeMap::new();
    let mut directories: BTreeMap<String, DirectoryMetrics> = BTreeMap::new();
    let mut complexity_sums: BTreeMap<String, u64> = BTreeMap::new();
    let mut total_lines = 0;

    for file in files {
        total_lines += file.lines_of_code;

        let lang = languages.entry(file.language.clone()).or_default();
        lang.files += 1;
        lang.lines += file.lines_of_code;

        let dir = file.directory().to_string();
        let metrics = directories.entry(dir.clone()).or_default();
        metrics.files += 1;
        metrics.lines_of_code += file.lines_of_code;
        metrics.functions += file.functions.len();
        metrics.max_complexity = metrics.max_complexity.max(file.max_complexity());
        *complexity_sums.entry(dir).or_default() += file
            .functions
            .iter()
            .map(|f| u64::from(f.cyclomatic_complexity))
            .sum::<u64>();
    }

    for (dir, metrics) in directories.iter_mut() {
        let sum = complexity_sums.get(dir).copied().unwrap_or(0);
        if metrics.functions > 0 {
            let avg = sum as f64 / metrics.functions as f64;
            metrics.average_complexity = (avg * 100.0).round() / 100.0;
        }
    }

    let primary_language = languages
        .iter()
        .max_by(|(a_name, a), (b_name, b)| {
            (a.lines, a.files)
                .cmp(&(b.lines, b.files))
                .then_with(|| b_name.cmp(a_name))
        })
        .map(|(name, _)| name.clone());

    StructureSummary {
        total_files: files.len(),
        total_directories,
        total_lines,
        languages,
        primary_language,
        unsupported_files,
        directories,
    }
}
