//! Rust language profile.

use phf::phf_set;

use crate::analysis::profile::{BlockStyle, ImportSyntax, LanguageProfile, ModuleConvention};
use crate::analysis::LanguageAnalyzer;

static KEYWORDS: phf::Set<&'static str> = phf_set! {
    "as", "async", "await", "break", "const", "continue", "crate", "dyn",
    "else", "enum", "extern", "false", "fn", "for", "if", "impl", "in", "let",
    "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "self",
    "Self", "static", "struct", "super", "trait", "true", "type", "unsafe",
    "use", "where", "while",
};

static PROFILE: LanguageProfile = LanguageProfile {
    keywords: &KEYWORDS,
    line_comments: &["//"],
    block_comment: Some(("/*", "*/")),
    nested_block_comments: true,
    quotes: &['"', '\''],
    multiline_quotes: &[],
    raw_quotes: &[],
    triple_quoted_strings: false,
    raw_strings: true,
    lifetimes: true,
    regex_literals: false,
    block_style: BlockStyle::Braces,
    function_keywords: &["fn"],
    call_style_functions: false,
    arrow_functions: false,
    type_keywords: &["struct", "enum", "trait", "impl"],
    bodiless_types: true,
    newline_terminates: false,
    decision_keywords: &["if", "for", "while", "loop"],
    // Each match arm is a branch.
    decision_operators: &["&&", "||", "=>"],
    soft_decision_keywords: &[],
    receiver_params: &["self"],
    import_syntax: ImportSyntax::Rust,
    module_convention: ModuleConvention::Rust,
};

/// Rust analyzer.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustAnalyzer;

impl LanguageAnalyzer for RustAnalyzer {
    fn language_id(&self) -> &'static str {
        "rust"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["rs"]
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["rs"]
    }

    fn profile(&self) -> &'static LanguageProfile {
        &PROFILE
    }
}
