//! Import statement recognition.
//!
//! Each recogniser walks the significant tokens (comments dropped) and emits
//! the textual reference as written. Resolution to module identifiers
//! happens later, in the dependency graph.

use super::facts::{Token, TokenKind};
use super::profile::ImportSyntax;

/// An import reference as it appears in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImport {
    pub target: String,
    pub line: usize,
}

impl RawImport {
    fn new(target: impl Into<String>, line: usize) -> Self {
        Self {
            target: target.into(),
            line,
        }
    }
}

/// Extract imports with the recogniser for `syntax`.
pub fn extract_imports(tokens: &[Token], syntax: ImportSyntax) -> Vec<RawImport> {
    let sig: Vec<&Token> = tokens
        .iter()
        .filter(|t| !matches!(t.kind, TokenKind::Comment | TokenKind::Opaque))
        .collect();

    match syntax {
        ImportSyntax::Python => python_imports(&sig),
        ImportSyntax::EcmaScript => ecmascript_imports(&sig),
        ImportSyntax::Rust => rust_imports(&sig),
        ImportSyntax::Go => go_imports(&sig),
        ImportSyntax::Java => java_imports(&sig),
        ImportSyntax::CInclude => c_includes(&sig),
    }
}

/// Strip the surrounding quote characters of a string token.
pub fn unquote(text: &str) -> &str {
    let mut chars = text.chars();
    match (chars.next(), text.chars().last()) {
        (Some(open), Some(close)) if open == close && text.len() >= 2 && "\"'`".contains(open) => {
            &text[1..text.len() - 1]
        }
        _ => text,
    }
}

fn is_word(t: &Token) -> bool {
    matches!(t.kind, TokenKind::Identifier | TokenKind::Keyword)
}

/// Read `a.b.c` starting at `*pos`, advancing past it.
fn dotted_name(sig: &[&Token], pos: &mut usize) -> String {
    let mut name = String::new();
    while let Some(t) = sig.get(*pos) {
        if t.kind != TokenKind::Identifier {
            break;
        }
        name.push_str(&t.text);
        *pos += 1;
        match (sig.get(*pos), sig.get(*pos + 1)) {
            (Some(dot), Some(next)) if dot.is_op(".") && next.kind == TokenKind::Identifier => {
                name.push('.');
                *pos += 1;
            }
            _ => break,
        }
    }
    name
}

// -----------------------------------------------------------------------------
// Python
// -----------------------------------------------------------------------------

fn python_imports(sig: &[&Token]) -> Vec<RawImport> {
    let mut out = Vec::new();

    for i in 0..sig.len() {
        let t = sig[i];
        let line_start = i == 0 || sig[i - 1].end_line() < t.line || sig[i - 1].is_op(";");
        if !line_start {
            continue;
        }

        if t.is_keyword("import") {
            let mut pos = i + 1;
            loop {
                let name = dotted_name(sig, &mut pos);
                if name.is_empty() {
                    break;
                }
                out.push(RawImport::new(name, t.line));
                if sig.get(pos).map_or(false, |a| a.is_keyword("as")) {
                    pos += 2;
                }
                if sig.get(pos).map_or(false, |c| c.is_op(",") && c.line == t.line) {
                    pos += 1;
                } else {
                    break;
                }
            }
        } else if t.is_keyword("from") {
            let mut pos = i + 1;
            let mut module = String::new();
            while let Some(dot) = sig.get(pos) {
                if dot.is_op(".") || dot.is_op("...") {
                    module.push_str(&dot.text);
                    pos += 1;
                } else {
                    break;
                }
            }
            module.push_str(&dotted_name(sig, &mut pos));
            if module.is_empty() || !sig.get(pos).map_or(false, |k| k.is_keyword("import")) {
                continue;
            }
            pos += 1;

            let parenthesized = sig.get(pos).map_or(false, |p| p.is_op("("));
            if parenthesized {
                pos += 1;
            }

            let relative_package = module.chars().all(|c| c == '.');
            let mut names = Vec::new();
            while let Some(n) = sig.get(pos) {
                if !parenthesized && n.line != sig[pos - 1].end_line() {
                    break;
                }
                if n.is_op(")") {
                    break;
                }
                if n.is_op("*") {
                    names.clear();
                    break;
                }
                if n.kind == TokenKind::Identifier {
                    names.push(n.text.clone());
                    pos += 1;
                    if sig.get(pos).map_or(false, |a| a.is_keyword("as")) {
                        pos += 2;
                    }
                    continue;
                }
                if n.is_op(",") || n.is_op("\\") {
                    pos += 1;
                    continue;
                }
                break;
            }

            // `from pkg import name` may name a submodule; resolution drops
            // the last segment when it does not.
            if names.is_empty() {
                out.push(RawImport::new(module, t.line));
            } else {
                for name in names {
                    let target = if relative_package {
                        format!("{}{}", module, name)
                    } else {
                        format!("{}.{}", module, name)
                    };
                    out.push(RawImport::new(target, t.line));
                }
            }
        }
    }

    out
}

// -----------------------------------------------------------------------------
// JavaScript / TypeScript
// -----------------------------------------------------------------------------

fn ecmascript_imports(sig: &[&Token]) -> Vec<RawImport> {
    let mut out = Vec::new();

    for i in 0..sig.len() {
        let t = sig[i];
        if t.kind != TokenKind::String || t.text.contains("${") {
            continue;
        }
        let prev = i.checked_sub(1).map(|p| sig[p]);
        let prev2 = i.checked_sub(2).map(|p| sig[p]);

        let is_import = match (prev2, prev) {
            (_, Some(p)) if p.text == "from" || p.is_keyword("import") => true,
            (Some(callee), Some(paren)) if paren.is_op("(") => {
                (callee.text == "require" || callee.text == "import")
                    && sig.get(i + 1).map_or(false, |c| c.is_op(")"))
            }
            _ => false,
        };

        if is_import {
            out.push(RawImport::new(unquote(&t.text), t.line));
        }
    }

    out
}

// -----------------------------------------------------------------------------
// Rust
// -----------------------------------------------------------------------------

fn rust_imports(sig: &[&Token]) -> Vec<RawImport> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < sig.len() {
        let t = sig[i];

        if t.is_keyword("use") {
            let end = (i..sig.len())
                .find(|&k| sig[k].is_op(";"))
                .unwrap_or(sig.len());
            let mut targets = Vec::new();
            let mut pos = 0;
            use_tree(&sig[i + 1..end], &mut pos, "", &mut targets);
            out.extend(targets.into_iter().map(|target| RawImport::new(target, t.line)));
            i = end;
            continue;
        }

        if t.is_keyword("mod") && sig.get(i + 2).map_or(false, |s| s.is_op(";")) {
            if let Some(name) = sig.get(i + 1).filter(|n| n.kind == TokenKind::Identifier) {
                out.push(RawImport::new(format!("self::{}", name.text), t.line));
            }
        }

        if t.is_keyword("extern") && sig.get(i + 1).map_or(false, |c| c.is_keyword("crate")) {
            if let Some(name) = sig.get(i + 2).filter(|n| n.kind == TokenKind::Identifier) {
                out.push(RawImport::new(name.text.clone(), t.line));
            }
        }

        i += 1;
    }

    out
}

/// Expand one `use` tree (`a::{b, c::*, d as e}`) into flat paths.
fn use_tree(tokens: &[&Token], pos: &mut usize, prefix: &str, out: &mut Vec<String>) {
    let mut path = prefix.to_string();

    while let Some(t) = tokens.get(*pos) {
        if t.kind == TokenKind::BlockOpen {
            *pos += 1;
            while let Some(inner) = tokens.get(*pos) {
                if inner.kind == TokenKind::BlockClose {
                    *pos += 1;
                    return;
                }
                if inner.is_op(",") {
                    *pos += 1;
                    continue;
                }
                let before = *pos;
                use_tree(tokens, pos, &path, out);
                if *pos == before {
                    *pos += 1;
                }
            }
            return;
        }

        if t.is_op("::") && path.is_empty() {
            *pos += 1;
            continue;
        }

        if t.is_op("*") {
            *pos += 1;
            if !path.is_empty() {
                out.push(path);
            }
            return;
        }

        if !is_word(t) {
            return;
        }

        if !(t.text == "self" && !path.is_empty()) {
            if !path.is_empty() {
                path.push_str("::");
            }
            path.push_str(&t.text);
        }
        *pos += 1;

        if tokens.get(*pos).map_or(false, |s| s.is_op("::")) {
            *pos += 1;
            continue;
        }
        if tokens.get(*pos).map_or(false, |a| a.is_keyword("as")) {
            *pos += 2;
        }
        out.push(path);
        return;
    }
}

// -----------------------------------------------------------------------------
// Go
// -----------------------------------------------------------------------------

fn go_imports(sig: &[&Token]) -> Vec<RawImport> {
    let mut out = Vec::new();

    for i in 0..sig.len() {
        if !sig[i].is_keyword("import") {
            continue;
        }
        let mut pos = i + 1;
        let grouped = sig.get(pos).map_or(false, |p| p.is_op("("));
        if grouped {
            pos += 1;
        }

        while let Some(t) = sig.get(pos) {
            if t.is_op(")") {
                break;
            }
            if t.kind == TokenKind::String {
                out.push(RawImport::new(unquote(&t.text), t.line));
                if !grouped {
                    break;
                }
            } else if !(t.kind == TokenKind::Identifier || t.is_op(".") || t.is_op(";")) {
                break;
            }
            pos += 1;
        }
    }

    out
}

// -----------------------------------------------------------------------------
// Java
// -----------------------------------------------------------------------------

fn java_imports(sig: &[&Token]) -> Vec<RawImport> {
    let mut out = Vec::new();

    for i in 0..sig.len() {
        let t = sig[i];
        if !t.is_keyword("import") {
            continue;
        }
        let mut pos = i + 1;
        if sig.get(pos).map_or(false, |s| s.is_keyword("static")) {
            pos += 1;
        }
        let mut name = dotted_name(sig, &mut pos);
        if name.is_empty() {
            continue;
        }
        if sig.get(pos).map_or(false, |d| d.is_op("."))
            && sig.get(pos + 1).map_or(false, |s| s.is_op("*"))
        {
            name.push_str(".*");
        }
        out.push(RawImport::new(name, t.line));
    }

    out
}

// -----------------------------------------------------------------------------
// C / C++
// -----------------------------------------------------------------------------

fn c_includes(sig: &[&Token]) -> Vec<RawImport> {
    let mut out = Vec::new();

    for i in 0..sig.len() {
        let hash = sig[i];
        let directive = hash.is_op("#")
            && sig
                .get(i + 1)
                .map_or(false, |d| d.text == "include" && d.line == hash.line);
        if !directive {
            continue;
        }

        match sig.get(i + 2) {
            Some(s) if s.kind == TokenKind::String && s.line == hash.line => {
                out.push(RawImport::new(unquote(&s.text), hash.line));
            }
            Some(open) if open.is_op("<") && open.line == hash.line => {
                let mut header = String::new();
                let mut closed = false;
                for part in sig[i + 3..].iter().take_while(|p| p.line == hash.line) {
                    if part.is_op(">") {
                        closed = true;
                        break;
                    }
                    header.push_str(&part.text);
                }
                if closed && !header.is_empty() {
                    out.push(RawImport::new(format!("<{}>", header), hash.line));
                }
            }
            _ => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::languages::{
        CAnalyzer, GoAnalyzer, JavaAnalyzer, PythonAnalyzer, RustAnalyzer, TypeScriptAnalyzer,
    };
    use crate::analysis::scanner::scan;
    use crate::analysis::LanguageAnalyzer;

    fn targets(analyzer: &dyn LanguageAnalyzer, src: &str) -> Vec<String> {
        let profile = analyzer.profile();
        let tokens = scan(src.as_bytes(), profile);
        extract_imports(&tokens, profile.import_syntax)
            .into_iter()
            .map(|i| i.target)
            .collect()
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"fmt\""), "fmt");
        assert_eq!(unquote("'./a'"), "./a");
        assert_eq!(unquote("`x`"), "x");
        assert_eq!(unquote("bare"), "bare");
        assert_eq!(unquote("\""), "\"");
    }

    #[test]
    fn test_python_imports() {
        let src = "import os, sys as system\nimport pkg.sub\nfrom . import sibling, other\nfrom ..core.models import (\n    User,\n    Group as G,\n)\nfrom json import *\nx = 1  # import fake\n";
        assert_eq!(
            targets(&PythonAnalyzer, src),
            vec![
                "os",
                "sys",
                "pkg.sub",
                ".sibling",
                ".other",
                "..core.models.User",
                "..core.models.Group",
                "json"
            ]
        );
    }

    #[test]
    fn test_python_import_in_string_ignored() {
        let src = "doc = \"\"\"\nimport nothing\n\"\"\"\nimport real\n";
        assert_eq!(targets(&PythonAnalyzer, src), vec!["real"]);
    }

    #[test]
    fn test_ecmascript_imports() {
        let src = "import React from 'react';\nimport './side-effect.css';\nimport { a, b } from \"../lib/util\";\nexport * from './reexport';\nconst fs = require('fs');\nconst lazy = await import('./lazy');\nconst notImport = `${from}`;\n";
        assert_eq!(
            targets(&TypeScriptAnalyzer, src),
            vec![
                "react",
                "./side-effect.css",
                "../lib/util",
                "./reexport",
                "fs",
                "./lazy"
            ]
        );
    }

    #[test]
    fn test_rust_use_trees() {
        let src = "use std::collections::{HashMap, HashSet};\nuse crate::graph::{self, cycles::find_cycles as fc};\nuse super::*;\nuse ::serde::Serialize;\nmod config;\nmod inline { }\nextern crate alloc;\n";
        assert_eq!(
            targets(&RustAnalyzer, src),
            vec![
                "std::collections::HashMap",
                "std::collections::HashSet",
                "crate::graph",
                "crate::graph::cycles::find_cycles",
                "super",
                "serde::Serialize",
                "self::config",
                "alloc"
            ]
        );
    }

    #[test]
    fn test_go_imports() {
        let src = "package main\n\nimport \"fmt\"\n\nimport (\n\t\"os\"\n\tlog \"github.com/sirupsen/logrus\"\n\t_ \"example.com/app/internal/db\"\n)\n";
        assert_eq!(
            targets(&GoAnalyzer, src),
            vec![
                "fmt",
                "os",
                "github.com/sirupsen/logrus",
                "example.com/app/internal/db"
            ]
        );
    }

    #[test]
    fn test_java_imports() {
        let src = "package a;\nimport java.util.List;\nimport static org.junit.Assert.assertEquals;\nimport com.example.model.*;\n";
        assert_eq!(
            targets(&JavaAnalyzer, src),
            vec![
                "java.util.List",
                "org.junit.Assert.assertEquals",
                "com.example.model.*"
            ]
        );
    }

    #[test]
    fn test_c_includes() {
        let src = "#include <stdio.h>\n#include <sys/types.h>\n#include \"util/strings.h\"\n/* #include \"commented.h\" */\n#define X 1\n";
        assert_eq!(
            targets(&CAnalyzer, src),
            vec!["<stdio.h>", "<sys/types.h>", "util/strings.h"]
        );
    }
}
