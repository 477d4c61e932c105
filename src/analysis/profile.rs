//! Declarative per-language lexical and structural configuration.
//!
//! A [`LanguageProfile`] is all the scanner, extractor and metrics calculator
//! need to know about a language. Each analyzer in `languages/` owns one
//! static profile.

use serde::Serialize;

/// How blocks are delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockStyle {
    /// `{` and `}` open and close blocks.
    Braces,
    /// Blocks follow indentation of logical lines.
    Indentation,
}

/// Import statement syntax recognised by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportSyntax {
    /// `import a.b`, `from .x import y`
    Python,
    /// `import x from 'y'`, `require('y')`, `export * from 'y'`
    EcmaScript,
    /// `use a::b::{c, d};`, `mod x;`, `extern crate x;`
    Rust,
    /// `import "fmt"`, `import ( ... )`
    Go,
    /// `import a.b.C;`, `import static a.b.C.m;`
    Java,
    /// `#include "x.h"`, `#include <x>`
    CInclude,
}

/// How file paths map to module identifiers and how references resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleConvention {
    /// Dotted path, `__init__` collapses to the package.
    Python,
    /// Path without extension, `index` collapses to the directory.
    EcmaScript,
    /// `crate::a::b` rooted at the nearest `src/` directory.
    Rust,
    /// One module per directory.
    Go,
    /// Dotted path of the compilation unit.
    Java,
    /// Path as-is, headers included.
    CInclude,
}

/// Static description of one language.
pub struct LanguageProfile {
    pub keywords: &'static phf::Set<&'static str>,
    pub line_comments: &'static [&'static str],
    pub block_comment: Option<(&'static str, &'static str)>,
    pub nested_block_comments: bool,
    /// Quote characters that delimit single-line strings.
    pub quotes: &'static [char],
    /// Quote characters whose strings may span lines (Go raw, JS templates).
    pub multiline_quotes: &'static [char],
    /// Quote characters whose strings treat `\` literally (Go raw strings).
    pub raw_quotes: &'static [char],
    /// `"""` and `'''` strings.
    pub triple_quoted_strings: bool,
    /// `r"..."` and `r#"..."#` strings.
    pub raw_strings: bool,
    /// `'` may start a lifetime rather than a char literal.
    pub lifetimes: bool,
    /// `/` may start a regular expression literal.
    pub regex_literals: bool,
    pub block_style: BlockStyle,
    /// Keywords that introduce a named function (`fn`, `def`, `func`).
    pub function_keywords: &'static [&'static str],
    /// `type name(params) {` definitions without a leading keyword.
    pub call_style_functions: bool,
    /// `const name = (params) => {` definitions.
    pub arrow_functions: bool,
    /// Keywords that introduce a type declaration.
    pub type_keywords: &'static [&'static str],
    /// Types may be declared without a body (`struct Unit;`, `type Id int`).
    pub bodiless_types: bool,
    /// A new line at bracket depth zero ends a pending declaration.
    pub newline_terminates: bool,
    /// Keywords that add a decision point.
    pub decision_keywords: &'static [&'static str],
    /// Operators that add a decision point.
    pub decision_operators: &'static [&'static str],
    /// Identifiers that add a decision point when they open a clause line
    /// (`case` inside a Python `match`).
    pub soft_decision_keywords: &'static [&'static str],
    /// Leading parameters that are receivers rather than arguments.
    pub receiver_params: &'static [&'static str],
    pub import_syntax: ImportSyntax,
    pub module_convention: ModuleConvention,
}

impl LanguageProfile {
    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(word)
    }

    pub fn is_function_keyword(&self, word: &str) -> bool {
        self.function_keywords.contains(&word)
    }

    pub fn is_type_keyword(&self, word: &str) -> bool {
        self.type_keywords.contains(&word)
    }

    pub fn is_decision_keyword(&self, word: &str) -> bool {
        self.decision_keywords.contains(&word)
    }

    pub fn is_decision_operator(&self, op: &str) -> bool {
        self.decision_operators.contains(&op)
    }

    pub fn is_soft_decision_keyword(&self, word: &str) -> bool {
        self.soft_decision_keywords.contains(&word)
    }
}
