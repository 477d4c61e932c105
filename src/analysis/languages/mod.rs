//! Language-specific analyzer implementations and the analyzer registry.

mod c;
mod cpp;
mod go;
mod java;
mod javascript;
mod python;
mod rust_lang;
mod typescript;

pub use c::CAnalyzer;
pub use cpp::CppAnalyzer;
pub use go::GoAnalyzer;
pub use java::JavaAnalyzer;
pub use javascript::JavaScriptAnalyzer;
pub use python::PythonAnalyzer;
pub use rust_lang::RustAnalyzer;
pub use typescript::TypeScriptAnalyzer;

use std::collections::HashMap;

use once_cell::sync::OnceCell;
use serde::Serialize;

use super::profile::BlockStyle;
use super::LanguageAnalyzer;

/// Every supported analyzer, in registry order.
static ANALYZERS: &[&dyn LanguageAnalyzer] = &[
    &CAnalyzer,
    &CppAnalyzer,
    &GoAnalyzer,
    &JavaAnalyzer,
    &JavaScriptAnalyzer,
    &PythonAnalyzer,
    &RustAnalyzer,
    &TypeScriptAnalyzer,
];

/// Lowercased language ids and aliases.
static BY_NAME: OnceCell<HashMap<&'static str, &'static dyn LanguageAnalyzer>> = OnceCell::new();

/// Lowercased file extensions.
static BY_EXTENSION: OnceCell<HashMap<&'static str, &'static dyn LanguageAnalyzer>> =
    OnceCell::new();

fn name_index() -> &'static HashMap<&'static str, &'static dyn LanguageAnalyzer> {
    BY_NAME.get_or_init(|| {
        let mut index = HashMap::new();
        for &analyzer in ANALYZERS {
            index.insert(analyzer.language_id(), analyzer);
            for alias in analyzer.aliases() {
                index.insert(*alias, analyzer);
            }
        }
        index
    })
}

fn extension_index() -> &'static HashMap<&'static str, &'static dyn LanguageAnalyzer> {
    BY_EXTENSION.get_or_init(|| {
        let mut index = HashMap::new();
        for &analyzer in ANALYZERS {
            for ext in analyzer.file_extensions() {
                index.entry(*ext).or_insert(analyzer);
            }
        }
        index
    })
}

/// Look up an analyzer by language id or alias, case-insensitively.
///
/// Returns None for languages without an analyzer; callers skip those files.
pub fn for_language(name: &str) -> Option<&'static dyn LanguageAnalyzer> {
    let key = name.trim().to_ascii_lowercase();
    name_index().get(key.as_str()).copied()
}

/// Look up an analyzer by file extension (without dot), case-insensitively.
pub fn for_extension(ext: &str) -> Option<&'static dyn LanguageAnalyzer> {
    let key = ext.trim_start_matches('.').to_ascii_lowercase();
    extension_index().get(key.as_str()).copied()
}

/// Whether `name` (id or alias) has an analyzer.
pub fn supports_language(name: &str) -> bool {
    for_language(name).is_some()
}

/// Get all registered language IDs.
pub fn registered_languages() -> Vec<&'static str> {
    ANALYZERS.iter().map(|a| a.language_id()).collect()
}

/// Get all registered file extensions.
pub fn registered_extensions() -> Vec<&'static str> {
    ANALYZERS
        .iter()
        .flat_map(|a| a.file_extensions().iter().copied())
        .collect()
}

/// What one registered analyzer can do, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageCapabilities {
    pub language: &'static str,
    pub aliases: &'static [&'static str],
    pub extensions: &'static [&'static str],
    pub block_style: BlockStyle,
}

/// Capabilities of every registered analyzer.
pub fn capabilities() -> Vec<LanguageCapabilities> {
    ANALYZERS
        .iter()
        .map(|a| LanguageCapabilities {
            language: a.language_id(),
            aliases: a.aliases(),
            extensions: a.file_extensions(),
            block_style: a.profile().block_style,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_language_case_insensitive() {
        assert_eq!(for_language("Python").map(|a| a.language_id()), Some("python"));
        assert_eq!(for_language("RUST").map(|a| a.language_id()), Some("rust"));
        assert_eq!(for_language(" go ").map(|a| a.language_id()), Some("go"));
    }

    #[test]
    fn test_for_language_aliases() {
        assert_eq!(for_language("py").map(|a| a.language_id()), Some("python"));
        assert_eq!(for_language("golang").map(|a| a.language_id()), Some("go"));
        assert_eq!(for_language("C++").map(|a| a.language_id()), Some("cpp"));
        assert_eq!(for_language("ts").map(|a| a.language_id()), Some("typescript"));
    }

    #[test]
    fn test_for_language_unknown() {
        assert!(for_language("cobol").is_none());
        assert!(!supports_language("ruby"));
        assert!(supports_language("java"));
    }

    #[test]
    fn test_for_extension() {
        assert_eq!(for_extension("rs").map(|a| a.language_id()), Some("rust"));
        assert_eq!(for_extension(".PY").map(|a| a.language_id()), Some("python"));
        assert_eq!(for_extension("h").map(|a| a.language_id()), Some("c"));
        assert_eq!(for_extension("hpp").map(|a| a.language_id()), Some("cpp"));
        assert!(for_extension("rb").is_none());
    }

    #[test]
    fn test_every_extension_maps_back() {
        for ext in registered_extensions() {
            let analyzer = for_extension(ext).expect("registered extension");
            assert!(analyzer.handles_extension(ext));
        }
    }

    #[test]
    fn test_capabilities() {
        let caps = capabilities();
        assert_eq!(caps.len(), registered_languages().len());
        let python = caps.iter().find(|c| c.language == "python").expect("python");
        assert_eq!(python.block_style, BlockStyle::Indentation);
        let rust = caps.iter().find(|c| c.language == "rust").expect("rust");
        assert_eq!(rust.block_style, BlockStyle::Braces);
    }
}
