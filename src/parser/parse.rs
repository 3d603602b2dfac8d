//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and the packrat engine under
//! the grammar rules:
//! - the token buffer: an append-only array of classified tokens pulled from
//!   the tokenizer on demand; backtracking only ever rewinds [`Parser::mark`]
//! - the memoization layer: per-token chains of `(rule, result, end)`
//!   entries with a failure sentinel distinct from absence
//! - the seed-growing combinator for left-recursive rules
//! - the driver: runs the entry rule for the parse mode and, on a bare
//!   failure, re-parses from position zero to compute a precise diagnostic
//!
//! Grammar rules live in `statements` and `expressions` as `impl Parser`
//! blocks, the split used across the parser module.
//!
//! # Error policy
//!
//! A rule that simply matches nothing returns `None` and leaves no trace. A
//! hard error (tokenizer error, AST field validation failure) stores a
//! pending [`ParseError`] and sets the sticky `error_indicator`; every rule
//! checks the flag on entry and at each alternative boundary, so no further
//! alternatives run once an error is pending.

use crate::parser::arena::AstArena;
use crate::parser::ast::{ExprRef, ModNode, Span, StmtRef};
use crate::parser::lexer::{TokStatus, Tokenizer};
use crate::parser::token::{keyword_or_name, Token, TokenKind};
use crate::runtime::ParseError;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// What to parse the input as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// A single interactive statement.
    Single,
    /// A whole file.
    File,
    /// A single expression for evaluation.
    Eval,
    /// An expression embedded in a string.
    StringExpr,
}

/// Identifiers for the memoized grammar rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    SimpleStatement,
    StarExpression,
    Expression,
    Disjunction,
    Conjunction,
    Inversion,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    ShiftExpr,
    Sum,
    Term,
    Factor,
    AwaitPrimary,
    Primary,
    Strings,
}

/// A cached rule result. `Failure` records that the rule matched nothing at
/// this position — distinct from having no entry at all.
#[derive(Debug, Clone, Copy)]
enum CacheItem {
    Failure,
    Expr(ExprRef),
    Stmt(StmtRef),
}

/// One memo chain entry: at most one per rule per token position.
#[derive(Debug)]
struct MemoEntry {
    rule: Rule,
    item: CacheItem,
    end: usize,
}

/// Instrumentation counters for the packrat engine.
///
/// `memo_hits` counts tokens skipped by memoization per rule (a cached
/// failure counts as one). `raw_invocations` counts runs of the raw body of
/// each left-recursive rule, which makes seed growth observable.
#[derive(Debug, Default)]
pub struct ParserStats {
    pub memo_hits: FxHashMap<Rule, i64>,
    pub raw_invocations: FxHashMap<Rule, i64>,
}

/// A successful parse: the arena owning every node and value, the module
/// root, and the engine statistics.
#[derive(Debug)]
pub struct ParseTree {
    pub arena: AstArena,
    pub root: ModNode,
    pub stats: ParserStats,
}

/// The memoizing recursive-descent parser.
pub struct Parser {
    mode: ParseMode,
    pub(crate) tok: Tokenizer,
    tokens: Vec<Token>,
    /// Memo chains, parallel to `tokens`.
    memos: Vec<Vec<MemoEntry>>,
    pub(crate) mark: usize,
    pub(crate) arena: AstArena,
    pub(crate) error_indicator: bool,
    error: Option<ParseError>,
    parsing_started: bool,
    eof_exit: bool,
    stats: ParserStats,
}

impl Parser {
    pub fn new(tok: Tokenizer, mode: ParseMode) -> Parser {
        Parser {
            mode,
            tok,
            tokens: Vec::new(),
            memos: Vec::new(),
            mark: 0,
            arena: AstArena::new(),
            error_indicator: false,
            error: None,
            parsing_started: false,
            eof_exit: false,
            stats: ParserStats::default(),
        }
    }

    /// Convenience constructor over complete source text.
    pub fn from_text(source: &str, mode: ParseMode) -> Parser {
        Parser::new(Tokenizer::from_text(source), mode)
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    // ===== Token buffer =====

    /// Pull one more token from the tokenizer into the buffer.
    fn fill_token(&mut self) -> Option<()> {
        let mut raw = self.tok.get();
        // Skip '# type: ignore' comments
        while raw.kind == TokenKind::TypeIgnore {
            raw = self.tok.get();
        }

        let mut kind = raw.kind;
        if kind == TokenKind::EndMarker && self.mode == ParseMode::Single && self.parsing_started {
            kind = TokenKind::Newline; // Add an extra newline
            self.parsing_started = false;
            if self.tok.indent_depth() > 0 {
                self.tok.force_pending_dedents();
            }
        } else {
            self.parsing_started = true;
        }

        let lexeme = match (raw.start, raw.end) {
            (Some(s), Some(e)) => self.tok.text(s, e),
            _ => String::new(),
        };
        if kind == TokenKind::Name {
            kind = keyword_or_name(&lexeme);
        }

        // Multi-line strings span from the line they started on.
        let is_string = raw.kind == TokenKind::Str;
        let lineno = if is_string {
            self.tok.first_lineno
        } else {
            self.tok.lineno
        };
        let line_start = if is_string {
            self.tok.multi_line_start
        } else {
            self.tok.line_start
        };
        let col_offset = raw.start.map_or(0, |s| s.saturating_sub(line_start));
        let end_col_offset = raw
            .end
            .map_or(0, |e| e.saturating_sub(self.tok.line_start));
        let span = Span::new(lineno, col_offset, self.tok.lineno, end_col_offset);

        trace!(?kind, %lineno, col_offset, "fill token");
        self.tokens.push(Token { kind, lexeme, span });
        self.memos.push(Vec::new());

        if raw.kind == TokenKind::ErrorToken {
            let err = self.tokenizer_error();
            self.error = Some(err);
            return None;
        }
        Some(())
    }

    /// Translate the tokenizer's status into the pending error it implies.
    fn tokenizer_error(&mut self) -> ParseError {
        let line = self.tok.lineno;
        match self.tok.done {
            TokStatus::BadToken => ParseError::syntax("invalid token", line),
            TokStatus::EofInString => {
                ParseError::syntax("EOF while scanning triple-quoted string literal", line)
            }
            TokStatus::EolInString => {
                ParseError::syntax("EOL while scanning string literal", line)
            }
            TokStatus::Eof => ParseError::syntax("unexpected EOF while parsing", line),
            TokStatus::DedentMismatch => ParseError::indentation(
                "unindent does not match any outer indentation level",
                line,
            ),
            TokStatus::Interrupted => ParseError::Interrupted,
            TokStatus::TabSpace => {
                ParseError::tab("inconsistent use of tabs and spaces in indentation", line)
            }
            TokStatus::TooDeep => {
                ParseError::indentation("too many levels of indentation", line)
            }
            TokStatus::BadContinuation => ParseError::syntax(
                "unexpected character after line continuation character",
                line,
            ),
            TokStatus::Error => {
                let msg = self
                    .tok
                    .take_message()
                    .unwrap_or_else(|| "unknown parsing error".to_string());
                ParseError::syntax(msg, line)
            }
            _ => ParseError::syntax("unknown parsing error", line),
        }
    }

    /// Make sure the token at `mark` exists, filling if needed.
    pub(crate) fn ensure_token(&mut self) -> Option<()> {
        if self.mark == self.tokens.len() {
            if self.fill_token().is_none() {
                self.error_indicator = true;
                return None;
            }
        }
        Some(())
    }

    pub(crate) fn token(&self, i: usize) -> &Token {
        &self.tokens[i]
    }

    /// Consume the token at `mark` if it has the expected kind.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Option<usize> {
        self.ensure_token()?;
        if self.tokens[self.mark].kind != kind {
            return None;
        }
        let i = self.mark;
        self.mark += 1;
        Some(i)
    }

    /// Run `f` without consuming input; true if its success matches
    /// `positive`.
    pub(crate) fn lookahead<T>(
        &mut self,
        positive: bool,
        f: impl FnOnce(&mut Self) -> Option<T>,
    ) -> bool {
        let mark = self.mark;
        let result = f(self);
        self.mark = mark;
        result.is_some() == positive
    }

    /// The most recently consumed token that is not a newline, indent,
    /// dedent or end marker; node end spans come from it.
    pub(crate) fn last_nonwhitespace_token(&self) -> Option<&Token> {
        let mut result = None;
        for m in (0..self.mark).rev() {
            let t = &self.tokens[m];
            result = Some(t);
            if !matches!(
                t.kind,
                TokenKind::EndMarker | TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent
            ) {
                break;
            }
        }
        result
    }

    // ===== Rule plumbing =====

    /// Entry bookkeeping shared by every rule: bail out if an error is
    /// pending, make sure the current token exists, and report the rule's
    /// start position.
    pub(crate) fn rule_start(&mut self) -> Option<(usize, usize)> {
        if self.error_indicator {
            return None;
        }
        self.ensure_token()?;
        let t = &self.tokens[self.mark];
        Some((t.span.lineno, t.span.col_offset))
    }

    /// Span from a rule's start position to the last non-whitespace token.
    pub(crate) fn node_span(&self, start: (usize, usize)) -> Option<Span> {
        let end = self.last_nonwhitespace_token()?;
        Some(Span::new(
            start.0,
            start.1,
            end.span.end_lineno,
            end.span.end_col_offset,
        ))
    }

    /// Try one alternative: on failure rewind to `mark`. The sticky error
    /// check makes a pending error abort the whole cascade.
    pub(crate) fn alt<T>(
        &mut self,
        mark: usize,
        f: impl FnOnce(&mut Self) -> Option<T>,
    ) -> Option<T> {
        if self.error_indicator {
            return None;
        }
        match f(self) {
            Some(r) => Some(r),
            None => {
                self.mark = mark;
                None
            }
        }
    }

    /// Lift an AST-builder result into the rule protocol: a validation
    /// failure becomes the pending error and trips the sticky flag.
    pub(crate) fn build<T>(&mut self, result: Result<T, ParseError>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.raise(e);
                None
            }
        }
    }

    /// Record a hard error and trip the sticky flag.
    pub(crate) fn raise(&mut self, err: ParseError) {
        debug!(%err, "hard parser error");
        if self.error.is_none() {
            self.error = Some(err);
        }
        self.error_indicator = true;
    }

    /// Flag the clean end of interactive input.
    pub(crate) fn interactive_exit(&mut self) -> Option<Vec<StmtRef>> {
        self.eof_exit = true;
        None
    }

    // ===== Memoization =====

    fn memo_lookup(&mut self, rule: Rule) -> Option<CacheItem> {
        let mark = self.mark;
        for entry in &self.memos[mark] {
            if entry.rule == rule {
                let skipped = (entry.end as i64 - mark as i64).max(1);
                let item = entry.item;
                let end = entry.end;
                *self.stats.memo_hits.entry(rule).or_insert(0) += skipped;
                self.mark = end;
                trace!(?rule, mark, end, "memo hit");
                return Some(item);
            }
        }
        None
    }

    /// Memo check for an expression rule. `Some(hit)` replays the cached
    /// result (which may itself be a recorded failure); `None` means the
    /// rule must run.
    pub(crate) fn memo_expr(&mut self, rule: Rule) -> Option<Option<ExprRef>> {
        if self.ensure_token().is_none() {
            return Some(None);
        }
        self.memo_lookup(rule).map(|item| match item {
            CacheItem::Expr(e) => Some(e),
            _ => None,
        })
    }

    /// Memo check for a statement rule.
    pub(crate) fn memo_stmt(&mut self, rule: Rule) -> Option<Option<StmtRef>> {
        if self.ensure_token().is_none() {
            return Some(None);
        }
        self.memo_lookup(rule).map(|item| match item {
            CacheItem::Stmt(s) => Some(s),
            _ => None,
        })
    }

    fn memo_set(&mut self, mark: usize, rule: Rule, item: CacheItem, update: bool) {
        let end = self.mark;
        if update {
            for entry in &mut self.memos[mark] {
                if entry.rule == rule {
                    entry.item = item;
                    entry.end = end;
                    return;
                }
            }
        }
        self.memos[mark].push(MemoEntry { rule, item, end });
    }

    /// Record an expression rule's result and pass it through.
    pub(crate) fn memo_done_expr(
        &mut self,
        mark: usize,
        rule: Rule,
        result: Option<ExprRef>,
    ) -> Option<ExprRef> {
        let item = match result {
            Some(e) => CacheItem::Expr(e),
            None => CacheItem::Failure,
        };
        self.memo_set(mark, rule, item, false);
        result
    }

    /// Record a statement rule's result and pass it through.
    pub(crate) fn memo_done_stmt(
        &mut self,
        mark: usize,
        rule: Rule,
        result: Option<StmtRef>,
    ) -> Option<StmtRef> {
        let item = match result {
            Some(s) => CacheItem::Stmt(s),
            None => CacheItem::Failure,
        };
        self.memo_set(mark, rule, item, false);
        result
    }

    /// Seed-growing engine for a left-recursive rule.
    ///
    /// The raw body's first alternative recursively invokes the memoized
    /// wrapper, which bottoms out through the memo: each iteration installs
    /// the best result so far at the start position, rewinds, and re-derives.
    /// The loop keeps going only while the raw body consumes strictly more
    /// input, which both guarantees termination and builds left-associative
    /// chains.
    pub(crate) fn left_rec(
        &mut self,
        rule: Rule,
        raw: fn(&mut Parser) -> Option<ExprRef>,
    ) -> Option<ExprRef> {
        if self.error_indicator {
            return None;
        }
        if let Some(hit) = self.memo_expr(rule) {
            return hit;
        }
        let mark = self.mark;
        let mut resmark = mark;
        let mut result: Option<ExprRef> = None;
        loop {
            let item = match result {
                Some(e) => CacheItem::Expr(e),
                None => CacheItem::Failure,
            };
            self.memo_set(mark, rule, item, true);
            self.mark = mark;
            let raw_result = raw(self);
            *self.stats.raw_invocations.entry(rule).or_insert(0) += 1;
            if self.error_indicator {
                return None;
            }
            match raw_result {
                Some(r) if self.mark > resmark => {
                    trace!(?rule, from = resmark, to = self.mark, "seed grew");
                    resmark = self.mark;
                    result = Some(r);
                }
                _ => break,
            }
        }
        self.mark = resmark;
        result
    }

    // ===== Driver =====

    fn run_mode(&mut self) -> Option<ModNode> {
        match self.mode {
            ParseMode::File => self.file_mode(),
            ParseMode::Single => self.interactive_mode(),
            ParseMode::Eval => self.eval_mode(),
            ParseMode::StringExpr => self.string_mode(),
        }
    }

    /// Clear every memo chain and rewind to the first token, leaving the
    /// token buffer itself intact.
    fn reset_state(&mut self) {
        for chain in &mut self.memos {
            chain.clear();
        }
        self.mark = 0;
    }

    /// Derive a diagnostic from post-parse state after the re-parse pass.
    fn diagnose(&self) -> ParseError {
        let line = self.tok.lineno;
        if self.tokens.is_empty() {
            return ParseError::syntax("error at start before reading any input", line);
        }
        if self.tok.done == TokStatus::Eof {
            return ParseError::syntax("unexpected EOF while parsing", line);
        }
        match self.tokens.last().map(|t| t.kind) {
            Some(TokenKind::Indent) => ParseError::indentation("unexpected indent", line),
            Some(TokenKind::Dedent) => ParseError::indentation("unexpected unindent", line),
            _ => ParseError::syntax("invalid syntax", line),
        }
    }

    /// Check that the source for a single input statement really is a single
    /// statement by looking at what is left in the buffer after parsing.
    /// Trailing whitespace and comments are OK.
    fn bad_single_statement(&self) -> bool {
        let buf = self.tok.buffer();
        let Some(newline_pos) = buf.iter().position(|&c| c == '\n') else {
            return false;
        };
        // Newlines are allowed if preceded by a line continuation character
        // or if they appear inside a string.
        if newline_pos > 0 && buf[newline_pos - 1] == '\\' {
            return false;
        }
        if buf[..=newline_pos].iter().any(|&c| c == '\'' || c == '"') {
            return false;
        }
        let mut cur = newline_pos;
        let mut c = buf[cur];
        loop {
            while matches!(c, ' ' | '\t' | '\n' | '\x0c') {
                cur += 1;
                if cur >= buf.len() {
                    return false;
                }
                c = buf[cur];
            }
            if c != '#' {
                return true;
            }
            // Suck up comment.
            while c != '\n' {
                cur += 1;
                if cur >= buf.len() {
                    return false;
                }
                c = buf[cur];
            }
        }
    }

    /// Run the parse to completion.
    ///
    /// On the happy path the entry rule runs once. On a bare failure the
    /// memo chains and the mark are reset and the entry rule re-runs purely
    /// to compute a precise diagnostic.
    pub fn parse(mut self) -> Result<ParseTree, ParseError> {
        let result = self.run_mode();
        let root = match result {
            Some(root) => root,
            None => {
                if let Some(err) = self.error.take() {
                    return Err(err);
                }
                if self.eof_exit {
                    return Err(ParseError::EndOfInput {
                        line: self.tok.lineno,
                    });
                }
                debug!("parse failed without a pending error; re-parsing for diagnosis");
                self.reset_state();
                let _ = self.run_mode();
                if let Some(err) = self.error.take() {
                    return Err(err);
                }
                return Err(self.diagnose());
            }
        };
        if self.mode == ParseMode::Single && self.bad_single_statement() {
            self.tok.done = TokStatus::BadSingle;
            return Err(ParseError::syntax(
                "multiple statements found while compiling a single statement",
                self.tok.lineno,
            ));
        }
        Ok(ParseTree {
            arena: self.arena,
            root,
            stats: self.stats,
        })
    }
}
