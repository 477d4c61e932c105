//! Go language profile.

use phf::phf_set;

use crate::analysis::profile::{BlockStyle, ImportSyntax, LanguageProfile, ModuleConvention};
use crate::analysis::LanguageAnalyzer;

static KEYWORDS: phf::Set<&'static str> = phf_set! {
    "break", "case", "chan", "const", "continue", "default", "defer", "else",
    "fallthrough", "false", "for", "func", "go", "goto", "if", "import",
    "interface", "map", "nil", "package", "range", "return", "select",
    "struct", "switch", "true", "type", "var",
};

static PROFILE: LanguageProfile = LanguageProfile {
    keywords: &KEYWORDS,
    line_comments: &["//"],
    block_comment: Some(("/*", "*/")),
    nested_block_comments: false,
    quotes: &['"', '\''],
    multiline_quotes: &['`'],
    raw_quotes: &['`'],
    triple_quoted_strings: false,
    raw_strings: false,
    lifetimes: false,
    regex_literals: false,
    block_style: BlockStyle::Braces,
    function_keywords: &["func"],
    call_style_functions: false,
    arrow_functions: false,
    type_keywords: &["type"],
    bodiless_types: true,
    newline_terminates: true,
    decision_keywords: &["if", "for", "case"],
    decision_operators: &["&&", "||"],
    soft_decision_keywords: &[],
    receiver_params: &[],
    import_syntax: ImportSyntax::Go,
    module_convention: ModuleConvention::Go,
};

/// Go analyzer. Method receivers precede the name and are not counted as parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoAnalyzer;

impl LanguageAnalyzer for GoAnalyzer {
    fn language_id(&self) -> &'static str {
        "go"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["golang"]
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["go"]
    }

    fn profile(&self) -> &'static LanguageProfile {
        &PROFILE
    }
}
