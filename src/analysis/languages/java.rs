//! Java language profile.

use phf::phf_set;

use crate::analysis::profile::{BlockStyle, ImportSyntax, LanguageProfile, ModuleConvention};
use crate::analysis::LanguageAnalyzer;

static KEYWORDS: phf::Set<&'static str> = phf_set! {
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char",
    "class", "const", "continue", "default", "do", "double", "else", "enum",
    "extends", "false", "final", "finally", "float", "for", "goto", "if",
    "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "null", "package", "private", "protected", "public",
    "return", "short", "static", "strictfp", "super", "switch",
    "synchronized", "this", "throw", "throws", "transient", "true", "try",
    "void", "volatile", "while",
};

static PROFILE: LanguageProfile = LanguageProfile {
    keywords: &KEYWORDS,
    line_comments: &["//"],
    block_comment: Some(("/*", "*/")),
    nested_block_comments: false,
    quotes: &['"', '\''],
    multiline_quotes: &[],
    raw_quotes: &[],
    triple_quoted_strings: true,
    raw_strings: false,
    lifetimes: false,
    regex_literals: false,
    block_style: BlockStyle::Braces,
    function_keywords: &[],
    call_style_functions: true,
    arrow_functions: false,
    type_keywords: &["class", "interface", "enum"],
    bodiless_types: false,
    newline_terminates: false,
    decision_keywords: &["if", "for", "while", "case", "catch"],
    decision_operators: &["&&", "||"],
    soft_decision_keywords: &[],
    receiver_params: &[],
    import_syntax: ImportSyntax::Java,
    module_convention: ModuleConvention::Java,
};

/// Java analyzer.
#[derive(Debug, Default, Clone, Copy)]
pub struct JavaAnalyzer;

impl LanguageAnalyzer for JavaAnalyzer {
    fn language_id(&self) -> &'static str {
        "java"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn profile(&self) -> &'static LanguageProfile {
        &PROFILE
    }
}
