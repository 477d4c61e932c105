//! Metrics calculator: complexity per function, line accounting per file.
//!
//! Complexity is a count over the token stream restricted to each function's
//! owned tokens. No control-flow graph is built, so cost is linear in the
//! number of tokens.

use super::extract::Structure;
use super::facts::{CodeUnit, Issue, Token, TokenKind};
use super::profile::LanguageProfile;

/// Per-function metrics plus the file-level line rollup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileMetrics {
    pub functions: Vec<CodeUnit>,
    pub lines_of_code: usize,
    pub comment_lines: usize,
    /// Complexity findings, one per function above the threshold.
    pub issues: Vec<Issue>,
}

/// Whether a token adds a decision point.
fn is_decision(token: &Token, profile: &LanguageProfile) -> bool {
    match token.kind {
        TokenKind::Keyword => profile.is_decision_keyword(&token.text),
        TokenKind::Operator => profile.is_decision_operator(&token.text),
        _ => false,
    }
}

/// Whether a soft keyword (Python's `case`) opens a clause here: first on its
/// line, with a `:` ending the clause outside brackets.
fn opens_soft_clause(tokens: &[Token], index: usize, profile: &LanguageProfile) -> bool {
    let token = &tokens[index];
    if token.kind != TokenKind::Identifier || !profile.is_soft_decision_keyword(&token.text) {
        return false;
    }
    let first_on_line = tokens[..index]
        .iter()
        .rev()
        .find(|t| t.kind != TokenKind::Comment)
        .map_or(true, |prev| prev.end_line() < token.line);
    if !first_on_line {
        return false;
    }

    let mut depth = 0usize;
    let mut line = token.line;
    let rest = tokens[index + 1..]
        .iter()
        .filter(|t| t.kind != TokenKind::Comment);
    for (n, next) in rest.enumerate() {
        if depth == 0 && next.line > line {
            return false;
        }
        line = next.end_line();
        if next.kind != TokenKind::Operator {
            continue;
        }
        match next.text.as_str() {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => depth = depth.saturating_sub(1),
            // `case: int` is an annotation, not a clause.
            ":" if depth == 0 => return n > 0,
            _ => {}
        }
    }
    false
}

/// Compute metrics for one file.
///
/// `threshold` is the cyclomatic complexity above which a function yields a
/// warning; it is a caller parameter, not a language default.
pub fn compute(
    tokens: &[Token],
    structure: &Structure,
    profile: &LanguageProfile,
    threshold: u32,
) -> FileMetrics {
    let count = structure.functions.len();
    let mut cyclomatic = vec![1u32; count];
    let mut cognitive = vec![1u32; count];
    let mut nesting = vec![0u32; count];

    for (i, token) in tokens.iter().enumerate() {
        let Some(owner) = structure.owners.get(i).copied().flatten() else {
            continue;
        };
        let Some(function) = structure.functions.get(owner) else {
            continue;
        };
        let depth = structure.depths.get(i).copied().unwrap_or(0);
        let relative = depth.saturating_sub(function.body_depth);

        match token.kind {
            TokenKind::Comment => {}
            // An opening brace sits one level above the block it opens.
            TokenKind::BlockOpen => nesting[owner] = nesting[owner].max(relative + 1),
            _ => nesting[owner] = nesting[owner].max(relative),
        }
        if is_decision(token, profile) || opens_soft_clause(tokens, i, profile) {
            cyclomatic[owner] += 1;
            cognitive[owner] += 1 + relative;
        }
    }

    let mut issues = Vec::new();
    let functions: Vec<CodeUnit> = structure
        .functions
        .iter()
        .enumerate()
        .map(|(idx, span)| {
            if cyclomatic[idx] > threshold {
                issues.push(Issue::warning(
                    format!(
                        "function '{}' has cyclomatic complexity {} (threshold {})",
                        span.name, cyclomatic[idx], threshold
                    ),
                    span.start_line,
                ));
            }
            CodeUnit {
                name: span.name.clone(),
                start_line: span.start_line,
                end_line: span.end_line.max(span.start_line),
                nesting_depth: nesting[idx],
                cyclomatic_complexity: cyclomatic[idx],
                cognitive_complexity: cognitive[idx],
                parameter_count: span.parameter_count,
            }
        })
        .collect();

    let (lines_of_code, comment_lines) = count_lines(tokens);

    FileMetrics {
        functions,
        lines_of_code,
        comment_lines,
        issues,
    }
}

/// Lines carrying code, and lines carrying only comments.
///
/// Blank lines and lines fully inside a string or comment count as neither
/// code nor (for strings) comment.
pub fn count_lines(tokens: &[Token]) -> (usize, usize) {
    let last_line = tokens.iter().map(Token::end_line).max().unwrap_or(0);
    let mut code = vec![false; last_line + 1];
    let mut comment = vec![false; last_line + 1];

    for token in tokens {
        match token.kind {
            TokenKind::Comment => {
                for line in token.line..=token.end_line() {
                    comment[line] = true;
                }
            }
            kind if kind.is_code() => code[token.line] = true,
            _ => {}
        }
    }

    let loc = code.iter().filter(|c| **c).count();
    let comments = comment
        .iter()
        .zip(code.iter())
        .filter(|(is_comment, is_code)| **is_comment && !**is_code)
        .count();
    (loc, comments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::languages::{GoAnalyzer, JavaScriptAnalyzer, PythonAnalyzer, RustAnalyzer};
    use crate::analysis::LanguageAnalyzer;

    fn metrics(analyzer: &dyn LanguageAnalyzer, src: &str, threshold: u32) -> FileMetrics {
        let tokens = analyzer.scan(src.as_bytes());
        let structure = analyzer.extract(&tokens);
        analyzer.compute(&tokens, &structure, threshold)
    }

    #[test]
    fn test_straight_line_function_is_one() {
        let m = metrics(&RustAnalyzer, "fn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n", 10);
        assert_eq!(m.functions.len(), 1);
        assert_eq!(m.functions[0].cyclomatic_complexity, 1);
        assert_eq!(m.functions[0].cognitive_complexity, 1);
        assert_eq!(m.functions[0].nesting_depth, 0);
        assert!(m.issues.is_empty());
    }

    #[test]
    fn test_two_ifs_and_a_for() {
        let src = "def f(items):\n    if a:\n        pass\n    if b:\n        pass\n    for i in items:\n        pass\n";
        let m = metrics(&PythonAnalyzer, src, 10);
        assert_eq!(m.functions[0].cyclomatic_complexity, 4);
        assert_eq!(m.functions[0].cognitive_complexity, 4);
        assert_eq!(m.functions[0].nesting_depth, 1);
    }

    #[test]
    fn test_cognitive_weights_nesting() {
        let src = "function f(x) {\n  if (x) {\n    for (;;) {\n      if (x && y) {}\n    }\n  }\n}\n";
        let m = metrics(&JavaScriptAnalyzer, src, 10);
        let f = &m.functions[0];
        // if, for, if, &&
        assert_eq!(f.cyclomatic_complexity, 5);
        // 1 + (1+0) + (1+1) + (1+2) + (1+2)
        assert_eq!(f.cognitive_complexity, 10);
        assert_eq!(f.nesting_depth, 3);
        assert!(f.cognitive_complexity >= f.cyclomatic_complexity);
    }

    #[test]
    fn test_nested_function_owns_its_decisions() {
        let src = "func outer() {\n\tinner := func() {\n\t\tif a {\n\t\t}\n\t}\n\tif b {\n\t}\n}\n";
        let m = metrics(&GoAnalyzer, src, 10);
        // Anonymous literals are not units; their decisions stay with `outer`.
        assert_eq!(m.functions.len(), 1);
        assert_eq!(m.functions[0].cyclomatic_complexity, 3);

        let src = "def outer():\n    def inner():\n        if x:\n            pass\n    if y:\n        pass\n";
        let m = metrics(&PythonAnalyzer, src, 10);
        assert_eq!(m.functions[0].cyclomatic_complexity, 2);
        assert_eq!(m.functions[1].cyclomatic_complexity, 2);
    }

    #[test]
    fn test_inline_python_function_counts_decisions() {
        let m = metrics(&PythonAnalyzer, "def f(x): return 1 if x and y else 2\n", 10);
        assert_eq!(m.functions.len(), 1);
        // if, and
        assert_eq!(m.functions[0].cyclomatic_complexity, 3);
        assert_eq!(m.functions[0].nesting_depth, 0);
    }

    #[test]
    fn test_python_case_clauses_are_branches() {
        let src = "def handle(cmd):\n    match cmd:\n        case \"start\":\n            return 1\n        case {\"stop\": _}:\n            return 2\n        case _:\n            return 0\n    case = 3\n    case: int = 4\n";
        let m = metrics(&PythonAnalyzer, src, 10);
        assert_eq!(m.functions.len(), 1);
        assert_eq!(m.functions[0].cyclomatic_complexity, 4);
        assert!(m.functions[0].cognitive_complexity > 4);
    }

    #[test]
    fn test_threshold_issue() {
        let src = "fn f(x: u8) {\n    if x == 1 {}\n    if x == 2 {}\n    if x == 3 {}\n}\n";
        let m = metrics(&RustAnalyzer, src, 3);
        assert_eq!(m.functions[0].cyclomatic_complexity, 4);
        assert_eq!(m.issues.len(), 1);
        assert!(m.issues[0].is_debt());
        assert_eq!(m.issues[0].line, 1);
        assert!(m.issues[0].message.contains("'f'"));

        let m = metrics(&RustAnalyzer, src, 4);
        assert!(m.issues.is_empty());
    }

    #[test]
    fn test_match_arms_are_branches() {
        let src = "fn f(x: u8) -> u8 {\n    match x {\n        1 => 10,\n        2 => 20,\n        _ => 0,\n    }\n}\n";
        let m = metrics(&RustAnalyzer, src, 10);
        assert_eq!(m.functions[0].cyclomatic_complexity, 4);
    }

    #[test]
    fn test_line_accounting() {
        let src = "// header\n\n/* block\n   comment */\nfn f() {\n    let s = \"x\"; // trailing\n}\n";
        let m = metrics(&RustAnalyzer, src, 10);
        assert_eq!(m.lines_of_code, 3);
        assert_eq!(m.comment_lines, 3);
    }

    #[test]
    fn test_string_only_lines_are_not_code() {
        let src = "def f():\n    \"\"\"Doc\n    more doc\n    \"\"\"\n    return 1\n";
        let m = metrics(&PythonAnalyzer, src, 10);
        assert_eq!(m.lines_of_code, 2);
        assert_eq!(m.comment_lines, 0);
    }

    #[test]
    fn test_empty_file() {
        let m = metrics(&RustAnalyzer, "", 10);
        assert!(m.functions.is_empty());
        assert_eq!((m.lines_of_code, m.comment_lines), (0, 0));
    }
}
