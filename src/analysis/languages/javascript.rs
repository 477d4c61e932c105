//! JavaScript language profile.

use phf::phf_set;

use crate::analysis::profile::{BlockStyle, ImportSyntax, LanguageProfile, ModuleConvention};
use crate::analysis::LanguageAnalyzer;

static KEYWORDS: phf::Set<&'static str> = phf_set! {
    "async", "await", "break", "case", "catch", "class", "const", "continue",
    "debugger", "default", "delete", "do", "else", "export", "extends",
    "false", "finally", "for", "function", "if", "import", "in", "instanceof",
    "let", "new", "null", "of", "return", "static", "super", "switch", "this",
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
    type_keywords: &["class"],
    bodiless_types: false,
    newline_terminates: false,
    decision_keywords: &["if", "for", "while", "case", "catch"],
    decision_operators: &["&&", "||", "??"],
    soft_decision_keywords: &[],
    receiver_params: &[],
    import_syntax: ImportSyntax::EcmaScript,
    module_convention: ModuleConvention::EcmaScript,
};

/// JavaScript analyzer, including JSX and ES module variants.
#[derive(Debug, Default, Clone, Copy)]
pub struct JavaScriptAnalyzer;

impl LanguageAnalyzer for JavaScriptAnalyzer {
    fn language_id(&self) -> &'static str {
        "javascript"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["js", "jsx", "node", "ecmascript"]
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["js", "jsx", "mjs", "cjs"]
    }

    fn profile(&self) -> &'static LanguageProfile {
        &PROFILE
    }
}
