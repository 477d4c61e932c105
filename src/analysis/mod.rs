//! Language-aware source analysis.
//!
//! Every file runs through the same three-stage pipeline, parameterised by
//! its language's [`LanguageProfile`]:
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌───────────────┐     ┌──────────────┐
//! │ bytes       │────▶│ Scanner     │────▶│ Extractor     │────▶│ Metrics      │
//! └─────────────┘     │ (tokens)    │     │ (units, depth)│     │ (complexity) │
//!                     └─────────────┘     └───────────────┘     └──────────────┘
//!                                                                       │
//!                                                                       ▼
//!                                                              ┌──────────────┐
//!                                                              │ FileAnalysis │
//!                                                              └──────────────┘
//! ```
//!
//! # Adding a New Language
//!
//! 1. Create a new module in `src/analysis/languages/` (e.g., `kotlin.rs`)
//! 2. Declare its keyword set and a static `LanguageProfile`
//! 3. Implement `LanguageAnalyzer` on a unit struct returning that profile
//! 4. Add it to the `ANALYZERS` table in `languages/mod.rs`

pub mod extract;
mod facts;
pub mod imports;
pub mod languages;
pub mod metrics;
mod profile;
pub mod scanner;
mod traits;

pub use extract::{FunctionSpan, Structure};
pub use facts::{
    CodeUnit, FileAnalysis, ImportEdge, Issue, Severity, Token, TokenKind, TypeKind, TypeUnit,
};
pub use languages::{
    capabilities, for_extension, for_language, registered_extensions, registered_languages,
    supports_language, CAnalyzer, CppAnalyzer, GoAnalyzer, JavaAnalyzer, JavaScriptAnalyzer,
    LanguageCapabilities, PythonAnalyzer, RustAnalyzer, TypeScriptAnalyzer,
};
pub use metrics::FileMetrics;
pub use profile::{BlockStyle, ImportSyntax, LanguageProfile, ModuleConvention};
pub use traits::LanguageAnalyzer;

use crate::graph::module_id;

/// Analyze one file's bytes.
///
/// Returns None when `language` has no registered analyzer; the caller
/// counts such files as unsupported.
pub fn analyze_source(
    path: &str,
    language: &str,
    source: &[u8],
    threshold: u32,
) -> Option<FileAnalysis> {
    let analyzer = for_language(language)?;
    Some(analyze_with(analyzer, path, source, threshold))
}

/// Run scan, extract and compute with a specific analyzer.
pub fn analyze_with(
    analyzer: &dyn LanguageAnalyzer,
    path: &str,
    source: &[u8],
    threshold: u32,
) -> FileAnalysis {
    let profile = analyzer.profile();
    let module = module_id(path, profile.module_convention);

    let tokens = analyzer.scan(source);
    if scanner::is_unscannable(&tokens) {
        return FileAnalysis::unscannable(path, analyzer.language_id(), &module);
    }

    let structure = analyzer.extract(&tokens);
    let metrics = analyzer.compute(&tokens, &structure, threshold);

    let mut issues = structure.issues;
    issues.extend(metrics.issues);
    if let Some(tail) = tokens.last().filter(|t| t.kind == TokenKind::Opaque) {
        issues.push(Issue::info(
            format!("content from line {} on could not be decoded", tail.line),
            tail.line,
        ));
    }
    issues.sort_by_key(|i| i.line);

    let imports = structure
        .imports
        .into_iter()
        .map(|raw| ImportEdge {
            source_module: module.clone(),
            target_reference: raw.target,
            is_external: false,
        })
        .collect();

    FileAnalysis {
        path: path.to_string(),
        language: analyzer.language_id().to_string(),
        module,
        lines_of_code: metrics.lines_of_code,
        comment_lines: metrics.comment_lines,
        functions: metrics.functions,
        types: structure.types,
        imports,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_source_unknown_language() {
        assert!(analyze_source("a.rb", "ruby", b"def x; end", 10).is_none());
    }

    #[test]
    fn test_analyze_source_python() {
        let src = b"import os\n\n# helper\ndef f(a):\n    if a:\n        return 1\n    return 0\n";
        let fa = analyze_source("pkg/mod.py", "Python", src, 10).expect("python");
        assert_eq!(fa.language, "python");
        assert_eq!(fa.module, "pkg.mod");
        assert_eq!(fa.lines_of_code, 5);
        assert_eq!(fa.comment_lines, 1);
        assert_eq!(fa.functions.len(), 1);
        assert_eq!(fa.functions[0].cyclomatic_complexity, 2);
        assert_eq!(fa.imports.len(), 1);
        assert_eq!(fa.imports[0].source_module, fa.module);
        assert_eq!(fa.imports[0].target_reference, "os");
        assert!(fa.issues.is_empty());
    }

    #[test]
    fn test_analyze_binary_degrades_to_info() {
        let fa = analyze_source("blob.c", "c", b"\x7fELF\x00\x01\x02", 10).expect("c");
        assert!(fa.functions.is_empty());
        assert!(fa.types.is_empty());
        assert_eq!(fa.issues.len(), 1);
        assert_eq!(fa.issues[0].severity, Severity::Info);
    }

    #[test]
    fn test_analyze_invalid_tail_keeps_prefix() {
        let mut src = b"fn ok() {}\n".to_vec();
        src.extend_from_slice(&[0xff, 0xfe, b'x']);
        let fa = analyze_source("src/lib.rs", "rust", &src, 10).expect("rust");
        assert_eq!(fa.functions.len(), 1);
        assert!(fa
            .issues
            .iter()
            .any(|i| i.severity == Severity::Info && i.message.contains("decoded")));
    }

    #[test]
    fn test_regex_literal_does_not_close_blocks() {
        let src = b"function clean(s) {\n  return s.replace(/}/g, '');\n}\n";
        let fa = analyze_source("clean.js", "javascript", src, 10).expect("js");
        assert_eq!(fa.functions.len(), 1);
        assert_eq!((fa.functions[0].start_line, fa.functions[0].end_line), (1, 3));
        assert!(fa.issues.is_empty(), "issues: {:?}", fa.issues);
    }

    #[test]
    fn test_units_within_file_lines() {
        let src = b"class A {\n  run() {\n    if (x) { y(); }\n  }\n}\n";
        let fa = analyze_source("a.js", "javascript", src, 10).expect("js");
        for f in &fa.functions {
            assert!(f.start_line <= f.end_line);
            assert!(f.end_line <= 5);
        }
        assert_eq!(fa.types[0].member_count, 1);
    }
}
