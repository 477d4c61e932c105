//! C++ language profile.

use phf::phf_set;

use crate::analysis::profile::{BlockStyle, ImportSyntax, LanguageProfile, ModuleConvention};
use crate::analysis::LanguageAnalyzer;

static KEYWORDS: phf::Set<&'static str> = phf_set! {
    "auto", "bool", "break", "case", "catch", "char", "class", "const",
    "const_cast", "constexpr", "continue", "decltype", "default", "delete",
    "do", "double", "dynamic_cast", "else", "enum", "explicit", "extern",
    "false", "float", "for", "friend", "goto", "if", "inline", "int", "long",
    "mutable", "namespace", "new", "noexcept", "nullptr", "operator",
    "private", "protected", "public", "register", "reinterpret_cast",
    "return", "short", "signed", "sizeof", "static", "static_cast", "struct",
    "switch", "template", "this", "throw", "true", "try", "typedef",
    "typename", "union", "unsigned", "using", "virtual", "void", "volatile",
    "while",
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
    type_keywords: &["class", "struct", "union", "enum"],
    bodiless_types: false,
    newline_terminates: false,
    decision_keywords: &["if", "for", "while", "case", "catch"],
    decision_operators: &["&&", "||"],
    soft_decision_keywords: &[],
    receiver_params: &[],
    import_syntax: ImportSyntax::CInclude,
    module_convention: ModuleConvention::CInclude,
};

/// C++ analyzer. Out-of-class definitions keep their `Class::` qualifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct CppAnalyzer;

impl LanguageAnalyzer for CppAnalyzer {
    fn language_id(&self) -> &'static str {
        "cpp"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["c++", "cxx"]
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["cpp", "cc", "cxx", "hpp", "hh", "hxx"]
    }

    fn profile(&self) -> &'static LanguageProfile {
        &PROFILE
    }
}
