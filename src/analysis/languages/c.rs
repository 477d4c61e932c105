//! C language profile.

use phf::phf_set;

use crate::analysis::profile::{BlockStyle, ImportSyntax, LanguageProfile, ModuleConvention};
use crate::analysis::LanguageAnalyzer;

static KEYWORDS: phf::Set<&'static str> = phf_set! {
    "_Bool", "auto", "bool", "break", "case", "char", "const", "continue",
    "default", "do", "double", "else", "enum", "extern", "float", "for",
    "goto", "if", "inline", "int", "long", "register", "restrict", "return",
    "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while",
};

static PROFILE: LanguageProfile = LanguageProfile {
    keywords: &KEYWORDS,
    line_comments: &["//"],
    block_comment: Some(("/*", "*/")),
    nested_block_comments: false,
    quotes: &['"', '\''],
    multiline_quotes: &[],
    raw_quotes: &[],
    triple_quoted_strings: false,
    raw_strings: false,
    lifetimes: false,
    regex_literals: false,
    block_style: BlockStyle::Braces,
    function_keywords: &[],
    call_style_functions: true,
    arrow_functions: false,
    type_keywords: &["struct", "union", "enum"],
    bodiless_types: false,
    newline_terminates: false,
    decision_keywords: &["if", "for", "while", "case"],
    decision_operators: &["&&", "||"],
    soft_decision_keywords: &[],
    receiver_params: &[],
    import_syntax: ImportSyntax::CInclude,
    module_convention: ModuleConvention::CInclude,
};

/// C analyzer. Headers (`.h`) are analyzed as C.
#[derive(Debug, Default, Clone, Copy)]
pub struct CAnalyzer;

impl LanguageAnalyzer for CAnalyzer {
    fn language_id(&self) -> &'static str {
        "c"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["c", "h"]
    }

    fn profile(&self) -> &'static LanguageProfile {
        &PROFILE
    }
}
