//! TypeScript language profile.

use phf::phf_set;

use crate::analysis::profile::{BlockStyle, ImportSyntax, LanguageProfile, ModuleConvention};
use crate::analysis::LanguageAnalyzer;

static KEYWORDS: phf::Set<&'static str> = phf_set! {
    "abstract", "as", "async", "await", "break", "case", "catch", "class",
    "const", "continue", "debugger", "declare", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for",
    "function", "if", "implements", "import", "in", "instanceof", "interface",
    "keyof", "let", "namespace", "new", "null", "of", "private", "protected",
    "public", "readonly", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "undefined", "var", "void", "while",
    "with", "yield",
};

static PROFILE: LanguageProfile = LanguageProfile {
    keywords: &KEYWORDS,
    line_comments: &["//"],
    block_comment: Some(("/*", "*/")),
    nested_block_comments: false,
    quotes: &['"', '\''],
    multiline_quotes: &['`'],
    raw_quotes: &[],
    triple_quoted_strings: false,
    raw_strings: false,
    lifetimes: false,
    regex_literals: true,
    block_style: BlockStyle::Braces,
    function_keywords: &["function"],
    call_style_functions: true,
    arrow_functions: true,
    type_keywords: &["class", "interface", "enum"],
    bodiless_types: false,
    newline_terminates: false,
    decision_keywords: &["if", "for", "while", "case", "catch"],
    decision_operators: &["&&", "||", "??"],
    soft_decision_keywords: &[],
    receiver_params: &["this"],
    import_syntax: ImportSyntax::EcmaScript,
    module_convention: ModuleConvention::EcmaScript,
};

/// TypeScript analyzer. A `this:` annotation is not counted as a parameter.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeScriptAnalyzer;

impl LanguageAnalyzer for TypeScriptAnalyzer {
    fn language_id(&self) -> &'static str {
        "typescript"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["ts", "tsx"]
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["ts", "tsx", "mts", "cts"]
    }

    fn profile(&self) -> &'static LanguageProfile {
        &PROFILE
    }
}
