//! Records produced by the per-file analysis pipeline.
//!
//! Tokens are owned by the scanner and consumed by the extractor. Everything
//! else in this module ends up inside a [`FileAnalysis`], which is built once
//! per file and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Identifier,
    Keyword,
    Comment,
    String,
    Number,
    Operator,
    BlockOpen,
    BlockClose,
    /// Bytes the scanner could not decode. Always the last token.
    Opaque,
}

impl TokenKind {
    /// Whether this token counts as code for line accounting.
    pub fn is_code(&self) -> bool {
        !matches!(
            self,
            TokenKind::Comment | TokenKind::String | TokenKind::Opaque
        )
    }
}

/// A single lexical token with its 1-indexed source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    /// Last line covered by this token (comments and strings may span lines).
    pub fn end_line(&self) -> usize {
        self.line + self.text.matches('\n').count()
    }

    /// Check kind and text in one go.
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    pub fn is_op(&self, text: &str) -> bool {
        self.is(TokenKind::Operator, text)
    }

    pub fn is_keyword(&self, text: &str) -> bool {
        self.is(TokenKind::Keyword, text)
    }
}

/// Severity of an [`Issue`]. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// A lint-like finding attached to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
    pub line: usize,
}

impl Issue {
    pub fn info(message: impl Into<String>, line: usize) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            line,
        }
    }

    pub fn warning(message: impl Into<String>, line: usize) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            line,
        }
    }

    /// Whether this issue counts toward the technical debt ratio.
    pub fn is_debt(&self) -> bool {
        self.severity >= Severity::Warning
    }
}

/// A function or method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeUnit {
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
    pub nesting_depth: u32,
    pub cyclomatic_complexity: u32,
    pub cognitive_complexity: u32,
    pub parameter_count: u32,
}

impl CodeUnit {
    /// Number of source lines spanned, signature included.
    pub fn line_span(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

/// Kind of type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
    Trait,
    Impl,
    Union,
    Type,
}

impl TypeKind {
    /// Map a declaration keyword to its kind.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "class" => Some(TypeKind::Class),
            "struct" => Some(TypeKind::Struct),
            "interface" => Some(TypeKind::Interface),
            "enum" => Some(TypeKind::Enum),
            "trait" => Some(TypeKind::Trait),
            "impl" => Some(TypeKind::Impl),
            "union" => Some(TypeKind::Union),
            "type" => Some(TypeKind::Type),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Trait => "trait",
            TypeKind::Impl => "impl",
            TypeKind::Union => "union",
            TypeKind::Type => "type",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A class, struct, interface or similar type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeUnit {
    pub name: String,
    pub kind: TypeKind,
    pub start_line: usize,
    pub end_line: usize,
    /// Functions declared directly inside the type body.
    pub member_count: u32,
    pub base_names: Vec<String>,
}

/// An import/require statement.
///
/// Inside a [`FileAnalysis`] the target is the textual reference as written.
/// The dependency graph carries resolved copies where `target_reference` is a
/// module identifier or external package name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportEdge {
    pub source_module: String,
    pub target_reference: String,
    pub is_external: bool,
}

/// Everything learned about one source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAnalysis {
    /// Path relative to the analysed root, `/`-separated.
    pub path: String,
    pub language: String,
    /// Module identifier derived from the path and language conventions.
    pub module: String,
    pub lines_of_code: usize,
    pub comment_lines: usize,
    pub functions: Vec<CodeUnit>,
    pub types: Vec<TypeUnit>,
    pub imports: Vec<ImportEdge>,
    pub issues: Vec<Issue>,
}

impl FileAnalysis {
    /// Result for a file whose bytes could not be scanned at all.
    pub fn unscannable(path: &str, language: &str, module: &str) -> Self {
        Self {
            path: path.to_string(),
            language: language.to_string(),
            module: module.to_string(),
            lines_of_code: 0,
            comment_lines: 0,
            functions: Vec::new(),
            types: Vec::new(),
            imports: Vec::new(),
            issues: vec![Issue::info(
                "file content could not be scanned (binary or invalid encoding)",
                1,
            )],
        }
    }

    /// Directory portion of the path, `.` for files at the root.
    pub fn directory(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[..idx],
            None => ".",
        }
    }

    /// Number of issues at warning severity or above.
    pub fn debt_issue_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_debt()).count()
    }

    /// Highest cyclomatic complexity among this file's functions.
    pub fn max_complexity(&self) -> u32 {
        self.functions
            .iter()
            .map(|f| f.cyclomatic_complexity)
            .max()
            .unwrap_or(0)
    }
}
