//! Python language profile.

use phf::phf_set;

use crate::analysis::profile::{BlockStyle, ImportSyntax, LanguageProfile, ModuleConvention};
use crate::analysis::LanguageAnalyzer;

static KEYWORDS: phf::Set<&'static str> = phf_set! {
    "False", "None", "True", "and", "as", "assert", "async", "await", "break",
    "class", "continue", "def", "del", "elif", "else", "except", "finally",
    "for", "from", "global", "if", "import", "in", "is", "lambda", "nonlocal",
    "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
};

static PROFILE: LanguageProfile = LanguageProfile {
    keywords: &KEYWORDS,
    line_comments: &["#"],
    block_comment: None,
    nested_block_comments: false,
    quotes: &['"', '\''],
    multiline_quotes: &[],
    raw_quotes: &[],
    triple_quoted_strings: true,
    raw_strings: false,
    lifetimes: false,
    regex_literals: false,
    block_style: BlockStyle::Indentation,
    function_keywords: &["def"],
    call_style_functions: false,
    arrow_functions: false,
    type_keywords: &["class"],
    bodiless_types: false,
    newline_terminates: true,
    decision_keywords: &["if", "elif", "for", "while", "except", "and", "or"],
    decision_operators: &[],
    soft_decision_keywords: &["case"],
    receiver_params: &["self", "cls"],
    import_syntax: ImportSyntax::Python,
    module_convention: ModuleConvention::Python,
};

/// Python analyzer. Blocks follow indentation.
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonAnalyzer;

impl LanguageAnalyzer for PythonAnalyzer {
    fn language_id(&self) -> &'static str {
        "python"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["py", "python3"]
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["py", "pyw", "pyi"]
    }

    fn profile(&self) -> &'static LanguageProfile {
        &PROFILE
    }
}
