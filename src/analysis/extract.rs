//! Structural extraction from a token stream.
//!
//! Recovers function and type boundaries, imports and per-token block depth
//! without building a parse tree. Blocks come from brace tokens or, for
//! indentation-delimited languages, from the column of each logical line.
//! Declarations are recognised by their signature (declaration keyword or a
//! `name(params) {` shape) and bound to the next block that opens.

use super::facts::{Issue, Token, TokenKind, TypeKind, TypeUnit};
use super::imports::{extract_imports, RawImport};
use super::profile::{BlockStyle, LanguageProfile};

/// Tokens of lookahead allowed between a signature's `)` and its body.
const SIGNATURE_LOOKAHEAD: usize = 32;

/// Tokens scanned after a type name while collecting base names.
const BASES_LOOKAHEAD: usize = 64;

/// A function recovered by the extractor, before metrics are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpan {
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
    pub parameter_count: u32,
    /// Block depth of tokens sitting directly in the body.
    pub body_depth: u32,
}

/// Output of [`extract`].
#[derive(Debug, Clone, Default)]
pub struct Structure {
    pub functions: Vec<FunctionSpan>,
    pub types: Vec<TypeUnit>,
    pub imports: Vec<RawImport>,
    /// Block depth of every token, parallel to the token stream.
    pub depths: Vec<u32>,
    /// Index into `functions` of the innermost function owning each token.
    pub owners: Vec<Option<usize>>,
    pub issues: Vec<Issue>,
}

/// Extract functions, types, imports and the nesting series.
pub fn extract(tokens: &[Token], profile: &LanguageProfile) -> Structure {
    let mut extractor = Extractor::new(tokens, profile);
    extractor.run();
    let mut structure = extractor.finish();
    structure.imports = extract_imports(tokens, profile.import_syntax);
    structure
}

#[derive(Debug, Clone, Copy)]
enum BlockKind {
    Plain,
    Function(usize),
    Type(usize),
}

#[derive(Debug)]
enum Decl {
    Function {
        name: String,
        start_line: usize,
        params: u32,
    },
    Type {
        name: String,
        kind: TypeKind,
        start_line: usize,
        bases: Vec<String>,
    },
}

#[derive(Debug)]
struct Pending {
    decl: Decl,
    line: usize,
    paren_depth: usize,
    /// Token index of the body's opening brace when known from lookahead.
    open_at: Option<usize>,
}

struct Extractor<'a> {
    tokens: &'a [Token],
    profile: &'a LanguageProfile,
    blocks: Vec<BlockKind>,
    pending: Option<Pending>,
    functions: Vec<FunctionSpan>,
    types: Vec<TypeUnit>,
    depths: Vec<u32>,
    owners: Vec<Option<usize>>,
    issues: Vec<Issue>,
    paren_depth: usize,
    indent_stack: Vec<usize>,
    /// Last line touched by a significant token (end line for multi-line tokens).
    last_code_line: usize,
    last_significant: Option<usize>,
    unmatched_closes: Vec<usize>,
    inconsistent_indent: Option<usize>,
}

impl<'a> Extractor<'a> {
    fn new(tokens: &'a [Token], profile: &'a LanguageProfile) -> Self {
        Self {
            tokens,
            profile,
            blocks: Vec::new(),
            pending: None,
            functions: Vec::new(),
            types: Vec::new(),
            depths: Vec::with_capacity(tokens.len()),
            owners: Vec::with_capacity(tokens.len()),
            issues: Vec::new(),
            paren_depth: 0,
            indent_stack: vec![1],
            last_code_line: 1,
            last_significant: None,
            unmatched_closes: Vec::new(),
            inconsistent_indent: None,
        }
    }

    fn run(&mut self) {
        let tokens = self.tokens;
        for (i, tok) in tokens.iter().enumerate() {

            if matches!(tok.kind, TokenKind::Comment | TokenKind::Opaque) {
                self.record();
                continue;
            }

            if self.profile.block_style == BlockStyle::Indentation && self.starts_logical_line(tok) {
                self.indent(i);
            }

            // A signature spanning lines inside its parameter list is still one line.
            if let Some(p) = self.pending.as_mut() {
                if self.paren_depth > p.paren_depth {
                    p.line = p.line.max(tok.end_line());
                }
            }

            if self.profile.newline_terminates && tok.kind != TokenKind::BlockOpen {
                let stale = self
                    .pending
                    .as_ref()
                    .map_or(false, |p| tok.line > p.line && self.paren_depth <= p.paren_depth);
                if stale {
                    self.terminate_pending();
                }
            }

            match tok.kind {
                TokenKind::BlockOpen => {
                    self.record();
                    self.open_block(i);
                }
                TokenKind::BlockClose => {
                    self.close_block(tok.line);
                    self.record();
                }
                _ => {
                    self.record();
                    self.recognize(i);
                }
            }

            self.last_code_line = self.last_code_line.max(tok.end_line());
            self.last_significant = Some(i);
        }
    }

    fn finish(mut self) -> Structure {
        self.terminate_pending();

        if let Some(&line) = self.unmatched_closes.first() {
            self.issues.push(Issue::warning(
                format!(
                    "{} unmatched closing delimiter(s), first at line {}",
                    self.unmatched_closes.len(),
                    line
                ),
                line,
            ));
        }

        if let Some(line) = self.inconsistent_indent {
            self.issues.push(Issue::warning(
                format!("inconsistent indentation at line {}", line),
                line,
            ));
        }

        if !self.blocks.is_empty() && self.profile.block_style == BlockStyle::Braces {
            let line = self.last_code_line;
            self.issues.push(Issue::warning(
                format!("{} unclosed block(s) at end of input", self.blocks.len()),
                line,
            ));
        }
        while !self.blocks.is_empty() {
            let line = self.last_code_line;
            self.close_block(line);
        }

        Structure {
            functions: self.functions,
            types: self.types,
            imports: Vec::new(),
            depths: self.depths,
            owners: self.owners,
            issues: self.issues,
        }
    }

    fn record(&mut self) {
        self.depths.push(self.blocks.len() as u32);
        self.owners.push(self.current_function());
    }

    fn current_function(&self) -> Option<usize> {
        self.blocks.iter().rev().find_map(|b| match b {
            BlockKind::Function(idx) => Some(*idx),
            _ => None,
        })
    }

    /// Whether `name(...) {` here would be a definition rather than a call.
    fn in_declaration_context(&self) -> bool {
        match self
            .blocks
            .iter()
            .rev()
            .find(|b| !matches!(b, BlockKind::Plain))
        {
            None => true,
            Some(kind) => matches!(kind, BlockKind::Type(_)),
        }
    }

    // -------------------------------------------------------------------------
    // Blocks
    // -------------------------------------------------------------------------

    fn open_block(&mut self, index: usize) {
        let enclosing_type = match self.blocks.last() {
            Some(BlockKind::Type(t)) => Some(*t),
            _ => None,
        };

        let pending = match self.pending.take() {
            Some(p) if p.open_at.map_or(true, |at| at == index) => Some(p),
            other => {
                // A brace before the expected body (initializer lists) keeps waiting.
                self.pending = other;
                None
            }
        };

        let kind = match pending.map(|p| p.decl) {
            Some(Decl::Function {
                name,
                start_line,
                params,
            }) => {
                if let Some(t) = enclosing_type {
                    self.types[t].member_count += 1;
                }
                self.functions.push(FunctionSpan {
                    name,
                    start_line,
                    end_line: start_line,
                    parameter_count: params,
                    body_depth: self.blocks.len() as u32 + 1,
                });
                BlockKind::Function(self.functions.len() - 1)
            }
            Some(Decl::Type {
                name,
                kind,
                start_line,
                bases,
            }) => {
                self.types.push(TypeUnit {
                    name,
                    kind,
                    start_line,
                    end_line: start_line,
                    member_count: 0,
                    base_names: bases,
                });
                BlockKind::Type(self.types.len() - 1)
            }
            None => BlockKind::Plain,
        };

        self.blocks.push(kind);
    }

    fn close_block(&mut self, line: usize) {
        match self.blocks.pop() {
            Some(BlockKind::Function(idx)) => {
                let f = &mut self.functions[idx];
                f.end_line = line.max(f.start_line);
            }
            Some(BlockKind::Type(idx)) => {
                let t = &mut self.types[idx];
                t.end_line = line.max(t.start_line);
            }
            Some(BlockKind::Plain) => {}
            None => self.unmatched_closes.push(line),
        }
    }

    fn starts_logical_line(&self, tok: &Token) -> bool {
        if self.paren_depth > 0 {
            return false;
        }
        match self.last_significant {
            None => true,
            Some(prev) => {
                let prev = &self.tokens[prev];
                tok.line > self.last_code_line && !prev.is_op("\\")
            }
        }
    }

    /// Synthesize block opens/closes from the column of a logical line.
    fn indent(&mut self, index: usize) {
        let column = self.tokens[index].column;
        let top = self.indent_stack.last().copied().unwrap_or(1);

        if column > top {
            self.indent_stack.push(column);
            self.open_block(index);
            return;
        }

        while self.indent_stack.len() > 1 && column < self.indent_stack[self.indent_stack.len() - 1] {
            self.indent_stack.pop();
            let line = self.last_code_line;
            self.close_block(line);
        }

        let top = self.indent_stack.last().copied().unwrap_or(1);
        if column > top {
            self.inconsistent_indent.get_or_insert(self.tokens[index].line);
            self.indent_stack.push(column);
            self.open_block(index);
        }
    }

    /// End a declaration that never received a body.
    fn terminate_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let inline = self.profile.block_style == BlockStyle::Indentation;
        let end_line = self.last_code_line.max(pending.line);

        match pending.decl {
            Decl::Type {
                name,
                kind,
                start_line,
                bases,
            } if self.profile.bodiless_types || inline => {
                self.types.push(TypeUnit {
                    name,
                    kind,
                    start_line,
                    end_line: end_line.max(start_line),
                    member_count: 0,
                    base_names: bases,
                });
            }
            Decl::Function {
                name,
                start_line,
                params,
            } if inline => {
                if let Some(BlockKind::Type(t)) = self.blocks.last() {
                    self.types[*t].member_count += 1;
                }
                self.functions.push(FunctionSpan {
                    name,
                    start_line,
                    end_line: end_line.max(start_line),
                    parameter_count: params,
                    body_depth: self.blocks.len() as u32 + 1,
                });
                self.claim_inline_body(start_line, self.functions.len() - 1);
            }
            _ => {}
        }
    }

    /// Hand the tokens after a one-line signature's `:` to `function`.
    fn claim_inline_body(&mut self, start_line: usize, function: usize) {
        let tokens = self.tokens;
        let recorded = self.owners.len();
        let Some(keyword) = (0..recorded).rev().find(|&k| {
            tokens[k].line == start_line
                && tokens[k].kind == TokenKind::Keyword
                && self.profile.is_function_keyword(&tokens[k].text)
        }) else {
            return;
        };

        let mut depth = 0usize;
        let mut colon = None;
        for (k, tok) in tokens.iter().enumerate().take(recorded).skip(keyword + 1) {
            if tok.kind != TokenKind::Operator {
                continue;
            }
            match tok.text.as_str() {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => depth = depth.saturating_sub(1),
                ":" if depth == 0 => {
                    colon = Some(k);
                    break;
                }
                _ => {}
            }
        }

        if let Some(colon) = colon {
            for owner in &mut self.owners[colon + 1..recorded] {
                *owner = Some(function);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Declaration recognition
    // -------------------------------------------------------------------------

    fn recognize(&mut self, i: usize) {
        let tokens = self.tokens;
        let tok = &tokens[i];
        let brackets_are_braces = self.profile.block_style == BlockStyle::Indentation;

        match tok.kind {
            TokenKind::Operator => match tok.text.as_str() {
                "(" | "[" => self.paren_depth += 1,
                "{" if brackets_are_braces => self.paren_depth += 1,
                ")" | "]" => self.paren_depth = self.paren_depth.saturating_sub(1),
                "}" if brackets_are_braces => {
                    self.paren_depth = self.paren_depth.saturating_sub(1)
                }
                ";" if !brackets_are_braces => {
                    let ends = self
                        .pending
                        .as_ref()
                        .map_or(false, |p| self.paren_depth <= p.paren_depth);
                    if ends {
                        self.terminate_pending();
                    }
                }
                "=>" if self.profile.arrow_functions => self.arrow_function(i),
                _ => {}
            },
            TokenKind::Keyword => {
                if self.profile.is_function_keyword(&tok.text) {
                    self.keyword_function(i);
                } else if self.profile.is_type_keyword(&tok.text) && self.paren_depth == 0 {
                    self.type_declaration(i);
                }
            }
            TokenKind::Identifier => {
                if self.profile.call_style_functions && self.in_declaration_context() {
                    self.call_style_function(i);
                }
            }
            _ => {}
        }
    }

    fn set_pending(&mut self, decl: Decl, line: usize, open_at: Option<usize>) {
        self.pending = Some(Pending {
            decl,
            line,
            paren_depth: self.paren_depth,
            open_at,
        });
    }

    /// `fn name(...)`, `def name(...)`, `func (recv) name(...)`, `function name(...)`.
    fn keyword_function(&mut self, i: usize) {
        let tokens = self.tokens;
        let Some(mut j) = self.next_sig(i) else {
            return;
        };

        if tokens[j].is_op("(") {
            let Some(close) = self.match_forward(j, "(", ")") else {
                return;
            };
            let receiver = self
                .next_sig(close)
                .filter(|&n| tokens[n].kind == TokenKind::Identifier)
                .and_then(|n| self.next_sig(n).map(|after| (n, after)))
                .filter(|&(_, after)| tokens[after].is_op("(") || tokens[after].is_op("<"));
            match receiver {
                Some((name_idx, _)) => j = name_idx,
                None => {
                    // Anonymous function expression named by its assignment.
                    let body = self
                        .next_sig(close)
                        .filter(|&b| tokens[b].kind == TokenKind::BlockOpen);
                    if let (Some(body), Some(name_idx)) = (body, self.assignment_name(i)) {
                        let params = self.count_params(j, close);
                        let decl = Decl::Function {
                            name: tokens[name_idx].text.clone(),
                            start_line: tokens[name_idx].line,
                            params,
                        };
                        self.set_pending(decl, tokens[i].line, Some(body));
                    }
                    return;
                }
            }
        }

        if tokens[j].is_op("*") {
            let Some(next) = self.next_sig(j) else {
                return;
            };
            j = next;
        }

        if tokens[j].kind != TokenKind::Identifier {
            return;
        }
        let name_idx = j;

        let Some(mut k) = self.next_sig(name_idx) else {
            return;
        };
        if tokens[k].is_op("<") {
            let Some(close) = self.match_forward(k, "<", ">") else {
                return;
            };
            let Some(next) = self.next_sig(close) else {
                return;
            };
            k = next;
        }
        if !tokens[k].is_op("(") {
            return;
        }
        let Some(close) = self.match_forward(k, "(", ")") else {
            return;
        };

        let decl = Decl::Function {
            name: tokens[name_idx].text.clone(),
            start_line: tokens[i].line,
            params: self.count_params(k, close),
        };
        self.set_pending(decl, tokens[i].line, None);
    }

    /// `type name(params) qualifiers {` without a declaration keyword.
    fn call_style_function(&mut self, i: usize) {
        let tokens = self.tokens;
        let Some(open) = self.next_sig(i).filter(|&n| tokens[n].is_op("(")) else {
            return;
        };

        if let Some(prev) = self.prev_sig(i) {
            let p = &tokens[prev];
            let rejected = match p.kind {
                TokenKind::Operator => matches!(
                    p.text.as_str(),
                    "." | "->" | "?." | "=" | "(" | "[" | "," | "!" | "&&" | "||" | "?" | "+"
                        | "-" | "/" | "%" | "|" | "^" | "=>" | "@"
                ),
                TokenKind::Keyword => matches!(
                    p.text.as_str(),
                    "return" | "new" | "throw" | "await" | "typeof" | "case" | "else" | "do"
                        | "in" | "of" | "delete" | "yield"
                ),
                _ => false,
            };
            if rejected {
                return;
            }
        }

        let Some(close) = self.match_forward(open, "(", ")") else {
            return;
        };
        let Some(body) = self.find_body_open(close) else {
            return;
        };

        let mut name = tokens[i].text.clone();
        if let Some(prev) = self.prev_sig(i).filter(|&p| tokens[p].is_op("::")) {
            if let Some(owner) = self
                .prev_sig(prev)
                .filter(|&o| tokens[o].kind == TokenKind::Identifier)
            {
                name = format!("{}::{}", tokens[owner].text, name);
            }
        }

        let decl = Decl::Function {
            name,
            start_line: tokens[i].line,
            params: self.count_params(open, close),
        };
        self.set_pending(decl, tokens[i].line, Some(body));
    }

    /// Scan past qualifiers after a parameter list to the body's `{`.
    fn find_body_open(&self, close: usize) -> Option<usize> {
        let tokens = self.tokens;
        let mut j = close;
        for _ in 0..SIGNATURE_LOOKAHEAD {
            j = self.next_sig(j)?;
            let t = &tokens[j];
            match t.kind {
                TokenKind::BlockOpen => return Some(j),
                TokenKind::BlockClose | TokenKind::String | TokenKind::Number => return None,
                TokenKind::Operator => match t.text.as_str() {
                    ";" | "=" | "=>" | "," | "." => {
                        if t.text == "," && self.in_initializer_list(close, j) {
                            continue;
                        }
                        return None;
                    }
                    "(" => j = self.match_forward(j, "(", ")")?,
                    _ => {}
                },
                _ => {}
            }
        }
        None
    }

    /// Commas between `) :` and `{` belong to a C++ constructor initializer list.
    fn in_initializer_list(&self, close: usize, at: usize) -> bool {
        (close + 1..at).any(|k| self.tokens[k].is_op(":"))
    }

    /// `name = (params) => {` and `name: async x => {`.
    fn arrow_function(&mut self, i: usize) {
        let tokens = self.tokens;
        let Some(body) = self
            .next_sig(i)
            .filter(|&n| tokens[n].kind == TokenKind::BlockOpen)
        else {
            return;
        };
        let Some(mut p) = self.prev_sig(i) else {
            return;
        };

        // Skip a return type annotation: `(a): T =>`.
        if matches!(tokens[p].kind, TokenKind::Identifier | TokenKind::Keyword) {
            if let Some(colon) = self.prev_sig(p).filter(|&c| tokens[c].is_op(":")) {
                if let Some(paren) = self.prev_sig(colon).filter(|&c| tokens[c].is_op(")")) {
                    p = paren;
                }
            }
        }

        let (start, params) = if tokens[p].is_op(")") {
            let Some(open) = self.match_backward(p, "(", ")") else {
                return;
            };
            (open, self.count_params(open, p))
        } else if tokens[p].kind == TokenKind::Identifier {
            (p, 1)
        } else {
            return;
        };

        let Some(name_idx) = self.assignment_name(start) else {
            return;
        };

        let decl = Decl::Function {
            name: tokens[name_idx].text.clone(),
            start_line: tokens[name_idx].line,
            params,
        };
        self.set_pending(decl, tokens[i].line, Some(body));
    }

    /// Identifier assigned the expression starting at `start` (`x = ...`, `x: ...`).
    fn assignment_name(&self, start: usize) -> Option<usize> {
        let tokens = self.tokens;
        let mut b = self.prev_sig(start)?;
        if tokens[b].text == "async" {
            b = self.prev_sig(b)?;
        }
        if !(tokens[b].is_op("=") || tokens[b].is_op(":")) {
            return None;
        }
        self.prev_sig(b)
            .filter(|&n| tokens[n].kind == TokenKind::Identifier)
    }

    fn type_declaration(&mut self, i: usize) {
        let tokens = self.tokens;
        let keyword = tokens[i].text.as_str();

        if keyword == "impl" {
            self.impl_block(i);
            return;
        }
        if matches!(keyword, "class" | "struct")
            && self.prev_sig(i).map_or(false, |p| tokens[p].is_keyword("enum"))
        {
            return;
        }

        let Some(mut kind) = TypeKind::from_keyword(keyword) else {
            return;
        };
        let Some(mut j) = self.next_sig(i) else {
            return;
        };
        if keyword == "enum" && matches!(tokens[j].text.as_str(), "class" | "struct") {
            let Some(next) = self.next_sig(j) else {
                return;
            };
            j = next;
        }
        if tokens[j].kind != TokenKind::Identifier {
            return;
        }
        let name_idx = j;

        let after = self.next_sig(name_idx);
        if after.map_or(false, |a| tokens[a].is_op(">") || tokens[a].is_op(",")) {
            // Template parameter such as `template <class T>`.
            return;
        }

        // Go: `type Name struct {`
        if kind == TypeKind::Type {
            if let Some(a) = after {
                match tokens[a].text.as_str() {
                    "struct" => kind = TypeKind::Struct,
                    "interface" => kind = TypeKind::Interface,
                    _ => {}
                }
            }
        }

        let bases = if keyword == "type" {
            Vec::new()
        } else if self.profile.block_style == BlockStyle::Indentation {
            self.paren_bases(name_idx)
        } else {
            self.declared_bases(name_idx)
        };

        let decl = Decl::Type {
            name: tokens[name_idx].text.clone(),
            kind,
            start_line: tokens[i].line,
            bases,
        };
        self.set_pending(decl, tokens[i].line, None);
    }

    /// `impl<T> Trait for Type<T> where ... {`
    fn impl_block(&mut self, i: usize) {
        let tokens = self.tokens;
        let mut paths: Vec<String> = Vec::new();
        let mut has_for = false;
        let mut j = i;

        for _ in 0..BASES_LOOKAHEAD {
            let Some(next) = self.next_sig(j) else {
                break;
            };
            j = next;
            let t = &tokens[j];
            match t.kind {
                TokenKind::BlockOpen => break,
                TokenKind::Keyword if t.text == "where" => break,
                TokenKind::Keyword if t.text == "for" => has_for = true,
                TokenKind::Identifier if !t.text.starts_with('\'') => {
                    let (path, end) = self.qualified_name(j);
                    if paths.len() < if has_for { 2 } else { 1 } {
                        paths.push(path);
                    }
                    j = end;
                }
                TokenKind::Operator if t.text == "<" => match self.match_forward(j, "<", ">") {
                    Some(close) => j = close,
                    None => break,
                },
                TokenKind::Operator if t.text == ";" => return,
                _ => {}
            }
        }

        let (name, bases) = match (has_for, paths.len()) {
            (true, 2) => (paths[1].clone(), vec![paths[0].clone()]),
            (_, n) if n >= 1 => (paths[0].clone(), Vec::new()),
            _ => return,
        };

        let decl = Decl::Type {
            name,
            kind: TypeKind::Impl,
            start_line: tokens[i].line,
            bases,
        };
        self.set_pending(decl, tokens[i].line, None);
    }

    /// `class Name(Base, pkg.Other, metaclass=Meta):`
    fn paren_bases(&self, name_idx: usize) -> Vec<String> {
        let tokens = self.tokens;
        let Some(open) = self.next_sig(name_idx).filter(|&o| tokens[o].is_op("(")) else {
            return Vec::new();
        };
        let Some(close) = self.match_forward(open, "(", ")") else {
            return Vec::new();
        };

        let mut bases = Vec::new();
        let mut segment: Vec<&Token> = Vec::new();
        for t in tokens[open + 1..=close].iter().filter(|t| t.kind != TokenKind::Comment) {
            if t.is_op(",") || t.is_op(")") {
                let keyword_arg = segment.iter().any(|s| s.is_op("="));
                if !keyword_arg && !segment.is_empty() {
                    bases.push(segment.iter().map(|s| s.text.as_str()).collect::<String>());
                }
                segment.clear();
            } else {
                segment.push(t);
            }
        }
        bases
    }

    /// Base names after a type name: `extends`, `implements`, `:`, `+` lists.
    fn declared_bases(&self, name_idx: usize) -> Vec<String> {
        let tokens = self.tokens;
        let start_line = tokens[name_idx].line;
        let mut bases = Vec::new();
        let mut j = name_idx;

        for _ in 0..BASES_LOOKAHEAD {
            let Some(next) = self.next_sig(j) else {
                break;
            };
            j = next;
            let t = &tokens[j];
            if self.profile.newline_terminates && t.line > start_line {
                break;
            }
            match t.kind {
                TokenKind::BlockOpen | TokenKind::BlockClose => break,
                TokenKind::Keyword if t.text == "where" => break,
                TokenKind::Identifier => {
                    let (path, end) = self.qualified_name(j);
                    bases.push(path);
                    j = end;
                }
                TokenKind::Operator => match t.text.as_str() {
                    ";" | "=" => break,
                    "<" => match self.match_forward(j, "<", ">") {
                        Some(close) => j = close,
                        None => break,
                    },
                    "(" => match self.match_forward(j, "(", ")") {
                        Some(close) => j = close,
                        None => break,
                    },
                    _ => {}
                },
                _ => {}
            }
        }
        bases
    }

    /// Join `a.b.C` / `a::b::C` starting at `start`; returns the name and last index.
    fn qualified_name(&self, start: usize) -> (String, usize) {
        let tokens = self.tokens;
        let mut name = tokens[start].text.clone();
        let mut end = start;
        loop {
            let Some(sep) = self
                .next_sig(end)
                .filter(|&s| tokens[s].is_op(".") || tokens[s].is_op("::"))
            else {
                break;
            };
            let Some(part) = self
                .next_sig(sep)
                .filter(|&p| tokens[p].kind == TokenKind::Identifier)
            else {
                break;
            };
            name.push_str(&tokens[sep].text);
            name.push_str(&tokens[part].text);
            end = part;
        }
        (name, end)
    }

    // -------------------------------------------------------------------------
    // Token navigation
    // -------------------------------------------------------------------------

    fn next_sig(&self, i: usize) -> Option<usize> {
        (i + 1..self.tokens.len()).find(|&k| self.tokens[k].kind != TokenKind::Comment)
    }

    fn prev_sig(&self, i: usize) -> Option<usize> {
        (0..i).rev().find(|&k| self.tokens[k].kind != TokenKind::Comment)
    }

    /// Index of the token closing the group opened at `open`.
    fn match_forward(&self, open: usize, open_text: &str, close_text: &str) -> Option<usize> {
        let angle = open_text == "<";
        let mut depth = 0usize;
        for k in open..self.tokens.len() {
            let t = &self.tokens[k];
            if t.is_op(open_text) {
                depth += 1;
            } else if t.is_op(close_text) {
                depth -= 1;
                if depth == 0 {
                    return Some(k);
                }
            } else if angle
                && (t.is_op(";") || t.is_op("&&") || t.is_op("||") || t.kind == TokenKind::BlockOpen)
            {
                return None;
            }
        }
        None
    }

    fn match_backward(&self, close: usize, open_text: &str, close_text: &str) -> Option<usize> {
        let mut depth = 0usize;
        for k in (0..=close).rev() {
            let t = &self.tokens[k];
            if t.is_op(close_text) {
                depth += 1;
            } else if t.is_op(open_text) {
                depth -= 1;
                if depth == 0 {
                    return Some(k);
                }
            }
        }
        None
    }

    /// Count declared parameters between `open` and `close`, skipping receivers.
    fn count_params(&self, open: usize, close: usize) -> u32 {
        let mut segments: Vec<Vec<&Token>> = vec![Vec::new()];
        let mut depth = 0i32;

        for t in self.tokens[open + 1..close]
            .iter()
            .filter(|t| t.kind != TokenKind::Comment)
        {
            match t.text.as_str() {
                "(" | "[" | "<" | "{" => depth += 1,
                ")" | "]" | ">" | "}" => depth -= 1,
                "," if depth == 0 => {
                    segments.push(Vec::new());
                    continue;
                }
                _ => {}
            }
            if let Some(last) = segments.last_mut() {
                last.push(t);
            }
        }

        let mut count = 0u32;
        for (idx, segment) in segments.iter().enumerate() {
            if segment.is_empty() {
                continue;
            }
            if segment.len() == 1 && matches!(segment[0].text.as_str(), "*" | "/") {
                continue;
            }
            if segments.len() == 1 && segment.len() == 1 && segment[0].text == "void" {
                continue;
            }
            if idx == 0 && self.is_receiver(segment) {
                continue;
            }
            count += 1;
        }
        count
    }

    fn is_receiver(&self, segment: &[&Token]) -> bool {
        let core: Vec<&&Token> = segment
            .iter()
            .filter(|t| !(t.is_op("&") || t.text == "mut" || t.text.starts_with('\'')))
            .collect();
        match core.as_slice() {
            [only] => self.profile.receiver_params.contains(&only.text.as_str()),
            [first, second, ..] => {
                self.profile.receiver_params.contains(&first.text.as_str()) && second.is_op(":")
            }
            [] => false,
        }
    }
}
