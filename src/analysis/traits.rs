//! Core trait for language analysis.

use super::extract::{self, Structure};
use super::facts::Token;
use super::metrics::{self, FileMetrics};
use super::profile::LanguageProfile;
use super::scanner;

/// Language-specific analyzer trait.
///
/// Each supported language implements this trait by supplying a static
/// [`LanguageProfile`]. The scan/extract/compute stages are shared and
/// driven entirely by that profile, so implementations rarely override them.
pub trait LanguageAnalyzer: Send + Sync {
    /// Returns the canonical language identifier (e.g., "python", "rust").
    fn language_id(&self) -> &'static str;

    /// Alternative names accepted by the registry (e.g., "py", "golang").
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Returns file extensions this analyzer handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Lexical and structural configuration for this language.
    fn profile(&self) -> &'static LanguageProfile;

    /// Tokenize source bytes. Never fails.
    fn scan(&self, source: &[u8]) -> Vec<Token> {
        scanner::scan(source, self.profile())
    }

    /// Recover functions, types, imports and block depth from tokens.
    fn extract(&self, tokens: &[Token]) -> Structure {
        extract::extract(tokens, self.profile())
    }

    /// Per-function metrics and the file-level line rollup.
    fn compute(&self, tokens: &[Token], structure: &Structure, threshold: u32) -> FileMetrics {
        metrics::compute(tokens, structure, self.profile(), threshold)
    }

    /// Check if this analyzer handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}
