//! Source file discovery.
//!
//! Walks a root directory, prunes dependency and build directories, applies
//! exclude globs and the test-file filter, and sorts every remaining file
//! into supported candidates and unsupported source files.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use lazy_static::lazy_static;
use phf::phf_map;
use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use crate::analysis::{for_extension, LanguageAnalyzer};
use crate::error::AnalyzeError;

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &[
    "vendor",
    "node_modules",
    "target",
    "dist",
    "build",
    "__pycache__",
    ".git",
];

/// Source languages recognised by extension but without an analyzer.
static UNSUPPORTED_LANGUAGES: phf::Map<&'static str, &'static str> = phf_map! {
    "rb" => "ruby",
    "php" => "php",
    "kt" => "kotlin",
    "kts" => "kotlin",
    "swift" => "swift",
    "cs" => "csharp",
    "scala" => "scala",
    "sh" => "shell",
    "bash" => "shell",
    "zsh" => "shell",
    "pl" => "perl",
    "lua" => "lua",
    "r" => "r",
    "dart" => "dart",
    "ex" => "elixir",
    "exs" => "elixir",
    "erl" => "erlang",
    "hs" => "haskell",
    "clj" => "clojure",
    "m" => "objective-c",
    "vue" => "vue",
    "groovy" => "groovy",
    "fs" => "fsharp",
    "jl" => "julia",
    "zig" => "zig",
};

lazy_static! {
    static ref TEST_FILE_RE: Regex = Regex::new(
        r"(^|/)(tests?|__tests__)/|(^|/)test_[^/]*\.py$|_test\.(go|py)$|\.(test|spec)\.[jt]sx?$"
    )
    .unwrap();
}

/// Discovery settings.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    pub exclude_patterns: Vec<String>,
    pub include_tests: bool,
}

/// A file with a registered analyzer, not yet read.
#[derive(Clone)]
pub struct Candidate {
    /// Path relative to the root, `/`-separated.
    pub path: String,
    pub absolute: PathBuf,
    pub analyzer: &'static dyn LanguageAnalyzer,
}

impl Candidate {
    /// Read the whole file. Each candidate is read exactly once.
    pub fn read(&self) -> io::Result<Vec<u8>> {
        std::fs::read(&self.absolute)
    }

    pub fn language(&self) -> &'static str {
        self.analyzer.language_id()
    }
}

impl std::fmt::Debug for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate")
            .field("path", &self.path)
            .field("language", &self.language())
            .finish()
    }
}

/// Everything found under a root.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Supported files in path order.
    pub candidates: Vec<Candidate>,
    /// Unsupported source files per language name.
    pub unsupported: BTreeMap<&'static str, usize>,
    /// Directories visited, the root included.
    pub directories: usize,
}

impl Discovery {
    pub fn unsupported_files(&self) -> usize {
        self.unsupported.values().sum()
    }
}

/// Compile exclude patterns.
pub fn build_excludes(patterns: &[String]) -> Result<GlobSet, AnalyzeError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| AnalyzeError::Discovery(format!("invalid exclude pattern {:?}: {}", pattern, e)))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| AnalyzeError::Discovery(e.to_string()))
}

/// Whether a root-relative path names a test file.
pub fn is_test_path(relative: &str) -> bool {
    TEST_FILE_RE.is_match(relative)
}

fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn is_skipped_dir(name: &str) -> bool {
    name.starts_with('.') || SKIPPED_DIRS.contains(&name)
}

/// Discover source files under `root`.
///
/// A file root yields at most one candidate. A missing root is fatal;
/// unreadable directory entries are logged and skipped.
pub fn discover(root: &Path, options: &DiscoveryOptions) -> Result<Discovery, AnalyzeError> {
    let metadata =
        std::fs::metadata(root).map_err(|_| AnalyzeError::RootNotFound(root.to_path_buf()))?;
    let excludes = build_excludes(&options.exclude_patterns)?;
    let mut discovery = Discovery::default();

    if metadata.is_file() {
        let base = root.parent().unwrap_or(Path::new(""));
        classify(base, root, &mut discovery);
        return Ok(discovery);
    }

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            if is_skipped_dir(&name) {
                return false;
            }
            let rel = relative_path(root, e.path());
            !excludes.is_match(&rel)
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                if e.depth() == 0 {
                    return Err(e.into());
                }
                debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if entry.file_type().is_dir() {
            discovery.directories += 1;
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = relative_path(root, entry.path());
        if excludes.is_match(&rel) {
            continue;
        }
        if !options.include_tests && is_test_path(&rel) {
            continue;
        }
        classify(root, entry.path(), &mut discovery);
    }

    debug!(
        candidates = discovery.candidates.len(),
        unsupported = discovery.unsupported_files(),
        directories = discovery.directories,
        "discovery complete"
    );
    Ok(discovery)
}

fn classify(root: &Path, path: &Path, discovery: &mut Discovery) {
    let Some(ext) = extension_of(path) else {
        return;
    };
    if let Some(analyzer) = for_extension(&ext) {
        discovery.candidates.push(Candidate {
            path: relative_path(root, path),
            absolute: path.to_path_buf(),
            analyzer,
        });
    } else if let Some(language) = UNSUPPORTED_LANGUAGES.get(ext.as_str()) {
        *discovery.unsupported.entry(*language).or_default() += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, content: &str) {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn paths(discovery: &Discovery) -> Vec<&str> {
        discovery.candidates.iter().map(|c| c.path.as_str()).collect()
    }

    #[test]
    fn test_discover_classifies_files() {
        let dir = TempDir::new().unwrap();
        write(&dir, "src/main.rs", "fn main() {}");
        write(&dir, "src/util.py", "x = 1");
        write(&dir, "lib/app.rb", "puts 1");
        write(&dir, "README.md", "# readme");
        write(&dir, "node_modules/pkg/index.js", "x");
        write(&dir, ".hidden/a.py", "x");
        write(&dir, "target/debug/build.rs", "x");

        let discovery = discover(dir.path(), &DiscoveryOptions::default()).unwrap();
        assert_eq!(paths(&discovery), vec!["src/main.rs", "src/util.py"]);
        assert_eq!(discovery.candidates[0].language(), "rust");
        assert_eq!(discovery.unsupported.get("ruby"), Some(&1));
        assert_eq!(discovery.unsupported_files(), 1);
        // root, lib, src
        assert_eq!(discovery.directories, 3);
    }

    #[test]
    fn test_test_files_skipped_by_default() {
        let dir = TempDir::new().unwrap();
        write(&dir, "pkg/a.go", "package pkg");
        write(&dir, "pkg/a_test.go", "package pkg");
        write(&dir, "tests/it.rs", "fn t() {}");
        write(&dir, "web/app.spec.ts", "x");
        write(&dir, "test_app.py", "x");

        let discovery = discover(dir.path(), &DiscoveryOptions::default()).unwrap();
        assert_eq!(paths(&discovery), vec!["pkg/a.go"]);

        let options = DiscoveryOptions {
            include_tests: true,
            ..Default::default()
        };
        let discovery = discover(dir.path(), &options).unwrap();
        assert_eq!(discovery.candidates.len(), 5);
    }

    #[test]
    fn test_exclude_patterns() {
        let dir = TempDir::new().unwrap();
        write(&dir, "src/keep.rs", "fn a() {}");
        write(&dir, "src/gen/out.rs", "fn b() {}");
        write(&dir, "docs/example.py", "x = 1");

        let options = DiscoveryOptions {
            exclude_patterns: vec!["src/gen".to_string(), "**/*.py".to_string()],
            include_tests: false,
        };
        let discovery = discover(dir.path(), &options).unwrap();
        assert_eq!(paths(&discovery), vec!["src/keep.rs"]);
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let err = discover(&missing, &DiscoveryOptions::default()).unwrap_err();
        assert!(matches!(err, AnalyzeError::RootNotFound(_)));
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let err = build_excludes(&["a[".to_string()]).unwrap_err();
        assert!(matches!(err, AnalyzeError::Discovery(_)));
    }

    #[test]
    fn test_single_file_root() {
        let dir = TempDir::new().unwrap();
        write(&dir, "one.go", "package main");
        let discovery = discover(&dir.path().join("one.go"), &DiscoveryOptions::default()).unwrap();
        assert_eq!(paths(&discovery), vec!["one.go"]);
        assert_eq!(discovery.candidates[0].read().unwrap(), b"package main");
    }

    #[test]
    fn test_is_test_path() {
        assert!(is_test_path("tests/cli.rs"));
        assert!(is_test_path("a/test/b.java"));
        assert!(is_test_path("src/__tests__/x.js"));
        assert!(is_test_path("pkg/x_test.go"));
        assert!(is_test_path("test_x.py"));
        assert!(is_test_path("x.test.tsx"));
        assert!(!is_test_path("src/testing.rs"));
        assert!(!is_test_path("src/contest.py"));
    }
}
