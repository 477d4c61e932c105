//! Lexical scanner shared by all languages.
//!
//! Produces a flat token stream classified by the language profile. The
//! scanner never fails: content that cannot be decoded is emitted as one
//! trailing [`TokenKind::Opaque`] token covering the rest of the input.

use super::facts::{Token, TokenKind};
use super::profile::{BlockStyle, LanguageProfile};

/// Leading bytes inspected for NUL when sniffing binary content.
const BINARY_SNIFF_LEN: usize = 8000;

/// Multi-character operators, longest first.
const OPERATORS: &[&str] = &[
    "...", "::", "->", "=>", "&&", "||", "==", "!=", "<=", ">=", "+=", "-=", "*=", "/=", "++",
    "--", "?.", "??", ":=",
];

/// Keywords after which `/` starts a regular expression rather than a division.
const REGEX_PRECEDING_KEYWORDS: &[&str] = &[
    "return", "typeof", "case", "do", "else", "in", "instanceof", "new", "delete", "void",
    "throw", "yield", "await", "of",
];

/// Scan source bytes into tokens.
pub fn scan(source: &[u8], profile: &LanguageProfile) -> Vec<Token> {
    let (text, opaque_from) = decode(source);

    let mut lexer = Lexer::new(text, profile);
    lexer.run();

    if let Some(offset) = opaque_from {
        let remainder = String::from_utf8_lossy(&source[offset..]).into_owned();
        let (line, column) = (lexer.line, lexer.column);
        lexer
            .tokens
            .push(Token::new(TokenKind::Opaque, remainder, line, column));
    }

    lexer.tokens
}

/// Whether the token stream is opaque from the very first byte.
pub fn is_unscannable(tokens: &[Token]) -> bool {
    matches!(tokens.first(), Some(t) if t.kind == TokenKind::Opaque)
}

/// Split input into the decodable prefix and the offset where decoding stopped.
fn decode(source: &[u8]) -> (&str, Option<usize>) {
    let sniff = &source[..source.len().min(BINARY_SNIFF_LEN)];
    if sniff.contains(&0) {
        return ("", Some(0));
    }

    match std::str::from_utf8(source) {
        Ok(text) => (text, None),
        Err(e) => {
            let valid = e.valid_up_to();
            let text = std::str::from_utf8(&source[..valid]).unwrap_or("");
            (text, Some(valid))
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

struct Lexer<'p> {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    profile: &'p LanguageProfile,
    tokens: Vec<Token>,
}

impl<'p> Lexer<'p> {
    fn new(text: &str, profile: &'p LanguageProfile) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            profile,
            tokens: Vec::new(),
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.peek(i) == Some(c))
    }

    fn advance(&mut self, out: &mut String) {
        if let Some(c) = self.peek(0) {
            self.pos += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            out.push(c);
        }
    }

    fn advance_n(&mut self, n: usize, out: &mut String) {
        for _ in 0..n {
            self.advance(out);
        }
    }

    fn run(&mut self) {
        while let Some(c) = self.peek(0) {
            let (line, column) = (self.line, self.column);

            if c.is_whitespace() || c == '\u{feff}' {
                let mut skipped = String::new();
                self.advance(&mut skipped);
                continue;
            }

            let (kind, text) = if let Some(text) = self.block_comment() {
                (TokenKind::Comment, text)
            } else if let Some(text) = self.line_comment() {
                (TokenKind::Comment, text)
            } else if let Some(token) = self.quote_or_lifetime() {
                token
            } else if let Some(text) = self.regex_literal() {
                (TokenKind::String, text)
            } else if is_ident_start(c) {
                let word = self.take_while(is_ident_continue);
                let kind = if self.profile.is_keyword(&word) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Identifier
                };
                (kind, word)
            } else if c.is_ascii_digit() {
                (TokenKind::Number, self.number())
            } else if self.profile.block_style == BlockStyle::Braces && (c == '{' || c == '}') {
                let mut text = String::new();
                self.advance(&mut text);
                let kind = if c == '{' {
                    TokenKind::BlockOpen
                } else {
                    TokenKind::BlockClose
                };
                (kind, text)
            } else {
                (TokenKind::Operator, self.operator())
            };

            self.tokens.push(Token::new(kind, text, line, column));
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek(0) {
            if !pred(c) {
                break;
            }
            self.advance(&mut out);
        }
        out
    }

    fn number(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek(0) {
            let fraction = c == '.' && self.peek(1).map_or(false, |n| n.is_ascii_digit());
            if !(c.is_alphanumeric() || c == '_' || fraction) {
                break;
            }
            self.advance(&mut out);
        }
        out
    }

    fn operator(&mut self) -> String {
        let mut out = String::new();
        match OPERATORS.iter().find(|op| self.starts_with(op)) {
            Some(op) => self.advance_n(op.chars().count(), &mut out),
            None => self.advance(&mut out),
        }
        out
    }

    fn line_comment(&mut self) -> Option<String> {
        let prefix = self
            .profile
            .line_comments
            .iter()
            .find(|p| self.starts_with(p))?;
        let mut out = String::new();
        self.advance_n(prefix.chars().count(), &mut out);
        while let Some(c) = self.peek(0) {
            if c == '\n' {
                break;
            }
            self.advance(&mut out);
        }
        Some(out)
    }

    fn block_comment(&mut self) -> Option<String> {
        let (open, close) = self.profile.block_comment?;
        if !self.starts_with(open) {
            return None;
        }

        let mut out = String::new();
        self.advance_n(open.chars().count(), &mut out);
        let mut depth = 1;
        while self.peek(0).is_some() {
            if self.profile.nested_block_comments && self.starts_with(open) {
                self.advance_n(open.chars().count(), &mut out);
                depth += 1;
            } else if self.starts_with(close) {
                self.advance_n(close.chars().count(), &mut out);
                depth -= 1;
                if depth == 0 {
                    break;
                }
            } else {
                self.advance(&mut out);
            }
        }
        Some(out)
    }

    /// String literals of every flavour, plus Rust lifetimes.
    fn quote_or_lifetime(&mut self) -> Option<(TokenKind, String)> {
        let c = self.peek(0)?;

        if self.profile.triple_quoted_strings && (self.starts_with("\"\"\"") || self.starts_with("'''")) {
            let delim: String = std::iter::repeat(c).take(3).collect();
            let mut out = String::new();
            self.advance_n(3, &mut out);
            while self.peek(0).is_some() && !self.starts_with(&delim) {
                if self.peek(0) == Some('\\') {
                    self.advance(&mut out);
                }
                self.advance(&mut out);
            }
            self.advance_n(3, &mut out);
            return Some((TokenKind::String, out));
        }

        if self.profile.raw_strings {
            if let Some(text) = self.raw_string() {
                return Some((TokenKind::String, text));
            }
        }

        if self.profile.lifetimes && c == '\'' {
            let is_char = self.peek(1) == Some('\\') || self.peek(2) == Some('\'');
            if !is_char {
                let mut out = String::new();
                self.advance(&mut out);
                out.push_str(&self.take_while(is_ident_continue));
                return Some((TokenKind::Identifier, out));
            }
        }

        let multiline = self.profile.multiline_quotes.contains(&c);
        if !multiline && !self.profile.quotes.contains(&c) {
            return None;
        }
        let raw = self.profile.raw_quotes.contains(&c);

        let mut out = String::new();
        self.advance(&mut out);
        while let Some(next) = self.peek(0) {
            if next == '\\' && !raw {
                self.advance_n(2, &mut out);
                continue;
            }
            if next == '\n' && !multiline {
                break;
            }
            self.advance(&mut out);
            if next == c {
                break;
            }
        }
        Some((TokenKind::String, out))
    }

    /// `/pattern/flags` in a position where an operand is expected.
    fn regex_literal(&mut self) -> Option<String> {
        if !self.profile.regex_literals || self.peek(0) != Some('/') || !self.expects_operand() {
            return None;
        }

        let mut len = 1;
        let mut in_class = false;
        loop {
            match self.peek(len)? {
                '\n' => return None,
                '\\' => len += 1,
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => break,
                _ => {}
            }
            len += 1;
        }

        let mut out = String::new();
        self.advance_n(len + 1, &mut out);
        out.push_str(&self.take_while(is_ident_continue));
        Some(out)
    }

    /// Whether the last significant token leaves an operand expected.
    fn expects_operand(&self) -> bool {
        let Some(prev) = self.tokens.iter().rev().find(|t| t.kind != TokenKind::Comment) else {
            return true;
        };
        match prev.kind {
            TokenKind::Operator => !matches!(prev.text.as_str(), ")" | "]" | "++" | "--"),
            TokenKind::BlockOpen | TokenKind::BlockClose => true,
            TokenKind::Keyword => REGEX_PRECEDING_KEYWORDS.contains(&prev.text.as_str()),
            _ => false,
        }
    }

    /// `r"..."`, `r#"..."#`, `br"..."` and friends.
    fn raw_string(&mut self) -> Option<String> {
        let mut i = 0;
        if self.peek(0) == Some('b') {
            i = 1;
        }
        if self.peek(i) != Some('r') {
            return None;
        }
        let mut j = i + 1;
        let mut hashes = 0;
        while self.peek(j) == Some('#') {
            hashes += 1;
            j += 1;
        }
        if self.peek(j) != Some('"') {
            return None;
        }

        let closing: String = std::iter::once('"')
            .chain(std::iter::repeat('#').take(hashes))
            .collect();
        let mut out = String::new();
        self.advance_n(j + 1, &mut out);
        while self.peek(0).is_some() && !self.starts_with(&closing) {
            self.advance(&mut out);
        }
        self.advance_n(closing.len(), &mut out);
        Some(out)
    }
}
