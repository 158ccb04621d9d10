// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The packrat parsing engine.
//!
//! Grammar rules are methods on [`Parser`] returning `PResult<Option<T>>`:
//! `Ok(Some(node))` on a match, `Ok(None)` when the rule does not match (the
//! cursor is then back where the rule started), and `Err` for a definite
//! syntax error that aborts the parse. Rules wrapped in [`Parser::memoize`]
//! run their body at most once per token position.

use std::cell::OnceCell;
use std::collections::{BTreeMap, HashMap};

use pyfront_core::{LineIndex, Span};
use tracing::debug;

use super::errors::{PResult, SyntaxError, SyntaxErrorKind};
use super::keywords::{is_reserved, is_soft_keyword};
use super::memo::{Memo, Memoized, ParseStats, RuleId};
use crate::ast::{Expr, Mod};
use crate::builder::{AstBuilder, FExprParser};
use crate::options::{InputMode, ParseOptions, PythonVersion};
use crate::tokenizer::{Mark, TokConfig, TokOrigin, Token, TokenKind, TokenStream, TypeIgnore};

/// Maximum number of nested memoized rule activations. Bracket nesting is
/// bounded by the tokenizer; this catches unbracketed chains such as
/// thousands of unary operators.
const MAX_DEPTH: usize = 6000;

/// Free stack required before a rule body runs; below it a new segment of
/// `STACK_SEGMENT` bytes is allocated.
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

/// Unwrap a sub-rule result inside a rule body; a non-match fails the body.
macro_rules! req {
    ($e:expr) => {
        match $e? {
            Some(value) => value,
            None => return Ok(None),
        }
    };
}
pub(crate) use req;

pub struct Parser<'t> {
    pub(crate) tokens: TokenStream<'t>,
    source: &'t str,
    config: TokConfig,
    version: PythonVersion,
    /// Diagnostic rules are active (second pass).
    pub(crate) call_invalid_rules: bool,
    invalid_pass_enabled: bool,
    memo: HashMap<(RuleId, Mark), (Memo, Mark)>,
    stats: ParseStats,
    depth: usize,
    line_index: OnceCell<LineIndex>,
}

impl<'t> Parser<'t> {
    pub fn new(source: &'t str, options: &ParseOptions) -> Self {
        let config = options.tok_config();
        Self::build(
            TokenStream::new(source, &config),
            source,
            config,
            options.version,
            options.call_invalid_rules,
        )
    }

    /// A parser over `origin.range` of `source`. Offsets and positions in the
    /// result refer to the whole of `source`.
    pub fn with_origin(
        source: &'t str,
        origin: TokOrigin,
        config: TokConfig,
        version: PythonVersion,
        call_invalid_rules: bool,
    ) -> Self {
        Self::build(
            TokenStream::with_origin(source, &config, origin),
            source,
            config,
            version,
            call_invalid_rules,
        )
    }

    fn build(
        tokens: TokenStream<'t>,
        source: &'t str,
        config: TokConfig,
        version: PythonVersion,
        invalid_pass_enabled: bool,
    ) -> Self {
        Parser {
            tokens,
            source,
            config,
            version,
            call_invalid_rules: false,
            invalid_pass_enabled,
            memo: HashMap::new(),
            stats: ParseStats::default(),
            depth: 0,
            line_index: OnceCell::new(),
        }
    }

    /// Parse the whole input with the start rule for `mode`.
    ///
    /// A failed first pass is retried with the diagnostic rules switched on
    /// (when enabled) so that common mistakes get a precise message; if that
    /// pass fails too, a generic error is reported at the furthest token
    /// the parser examined.
    pub fn parse(&mut self, mode: InputMode) -> PResult<Mod> {
        let first = self.run_start_rule(mode);
        let result = match first {
            Ok(Some(root)) => Ok(root),
            Err(err) => Err(err),
            Ok(None) if self.invalid_pass_enabled => {
                debug!(mode = ?mode, "first pass failed; retrying with diagnostic rules");
                self.reset_for_invalid_pass();
                match self.run_start_rule(mode) {
                    Ok(Some(root)) => Ok(root),
                    Ok(None) => Err(self.failure_error()),
                    Err(err) => Err(err),
                }
            }
            Ok(None) => Err(self.failure_error()),
        };
        self.stats.tokens = self.tokens.buffered();
        debug!(
            mode = ?mode,
            tokens = self.stats.tokens,
            memo_entries = self.memo.len(),
            memo_hits = self.stats.memo_hits,
            ok = result.is_ok(),
            "parse finished"
        );
        result
    }

    fn run_start_rule(&mut self, mode: InputMode) -> PResult<Option<Mod>> {
        match mode {
            InputMode::Module => self.file(),
            InputMode::Expression => self.eval(),
            InputMode::Interactive => self.interactive(),
            InputMode::FString => Ok(self.fstring()?.map(|body| Mod::Expression {
                body: Box::new(body),
            })),
        }
    }

    fn reset_for_invalid_pass(&mut self) {
        self.memo.clear();
        self.stats.clear();
        self.depth = 0;
        self.tokens.reset(0);
        self.call_invalid_rules = true;
    }

    /// The error for a parse in which no start rule matched.
    fn failure_error(&mut self) -> SyntaxError {
        let last = self.tokens.last_filled();
        // A lexical error among the tokens examined explains the failure
        // better than a generic message. Input past them is never read.
        let lexical = self
            .tokens
            .buffered_tokens()
            .iter()
            .find_map(|tok| tok.error.map(|err| SyntaxError::from_token(tok, err)));
        if let Some(err) = lexical {
            return err;
        }
        let tok = last.unwrap_or_else(|| self.tokens.peek());
        match tok.kind {
            TokenKind::Indent => SyntaxError::grammar("unexpected indent", &tok),
            TokenKind::Dedent => SyntaxError::grammar("unexpected unindent", &tok),
            TokenKind::EndMarker => SyntaxError::grammar("unexpected EOF while parsing", &tok),
            _ => SyntaxError::grammar("invalid syntax", &tok),
        }
    }

    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Move the captured `# type:` comments out of the parser.
    pub fn take_type_comments(&mut self) -> BTreeMap<usize, String> {
        self.tokens.take_type_comments()
    }

    pub(crate) fn type_ignores(&self) -> Vec<TypeIgnore> {
        self.tokens.type_ignores().to_vec()
    }

    pub(crate) fn version(&self) -> PythonVersion {
        self.version
    }

    pub(crate) fn line_index(&self) -> &LineIndex {
        self.line_index.get_or_init(|| LineIndex::new(self.source))
    }

    pub(crate) fn ast(&self) -> AstBuilder<'_> {
        AstBuilder::new(self)
    }

    // ------------------------------------------------------------------
    // Memoization and backtracking
    // ------------------------------------------------------------------

    /// Run `body` as rule `rule`, caching its outcome at the current position.
    pub(crate) fn memoize<T: Memoized + Clone>(
        &mut self,
        rule: RuleId,
        body: impl FnOnce(&mut Self) -> PResult<Option<T>>,
    ) -> PResult<Option<T>> {
        let start = self.tokens.mark();
        let cached = self
            .memo
            .get(&(rule, start))
            .and_then(|(memo, end)| T::unwrap(memo).map(|value| (value, *end)));
        if let Some((value, end)) = cached {
            #[cfg(feature = "trace")]
            tracing::trace!(?rule, start, end, "memo hit");
            self.stats.memo_hits += 1;
            self.tokens.reset(end);
            return Ok(value);
        }

        #[cfg(feature = "trace")]
        tracing::trace!(?rule, start, "enter");
        self.stats.memo_misses += 1;
        *self.stats.body_calls.entry((rule, start)).or_insert(0) += 1;

        self.depth += 1;
        if self.depth > MAX_DEPTH {
            self.depth -= 1;
            return Err(self.error_here("too many nested expressions"));
        }
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || body(self));
        self.depth -= 1;
        let result = result?;

        if result.is_none() {
            self.tokens.reset(start);
        }
        let end = self.tokens.mark();
        self.memo
            .insert((rule, start), (T::wrap(result.clone()), end));
        Ok(result)
    }

    /// Run `f`, rewinding to the starting position if it does not match.
    pub(crate) fn attempt<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> PResult<Option<T>>,
    ) -> PResult<Option<T>> {
        let mark = self.tokens.mark();
        let result = f(self)?;
        if result.is_none() {
            self.tokens.reset(mark);
        }
        Ok(result)
    }

    /// `elem (sep elem)*`; a trailing separator is left unconsumed.
    pub(crate) fn gather<T>(
        &mut self,
        sep: TokenKind,
        mut elem: impl FnMut(&mut Self) -> PResult<Option<T>>,
    ) -> PResult<Option<Vec<T>>> {
        let Some(first) = elem(self)? else {
            return Ok(None);
        };
        let mut items = vec![first];
        loop {
            let mark = self.tokens.mark();
            if self.expect(sep)?.is_none() {
                break;
            }
            match elem(self)? {
                Some(item) => items.push(item),
                None => {
                    self.tokens.reset(mark);
                    break;
                }
            }
        }
        Ok(Some(items))
    }

    /// `elem*`
    pub(crate) fn repeat0<T>(
        &mut self,
        mut elem: impl FnMut(&mut Self) -> PResult<Option<T>>,
    ) -> PResult<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = elem(self)? {
            items.push(item);
        }
        Ok(items)
    }

    /// `elem+`
    pub(crate) fn repeat1<T>(
        &mut self,
        elem: impl FnMut(&mut Self) -> PResult<Option<T>>,
    ) -> PResult<Option<Vec<T>>> {
        let items = self.repeat0(elem)?;
        Ok(if items.is_empty() { None } else { Some(items) })
    }

    // ------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------

    pub(crate) fn mark(&self) -> Mark {
        self.tokens.mark()
    }

    pub(crate) fn reset(&mut self, mark: Mark) {
        self.tokens.reset(mark);
    }

    /// The next token. Reaching an error token aborts the parse with the
    /// lexical error it carries.
    pub(crate) fn peek(&mut self) -> PResult<Token> {
        let tok = self.tokens.peek();
        match tok.error {
            Some(err) => Err(SyntaxError::from_token(&tok, err)),
            None => Ok(tok),
        }
    }

    pub(crate) fn peek_nth(&mut self, n: usize) -> PResult<Token> {
        let tok = self.tokens.peek_nth(n);
        match tok.error {
            Some(err) => Err(SyntaxError::from_token(&tok, err)),
            None => Ok(tok),
        }
    }

    pub(crate) fn text(&self, tok: &Token) -> &'t str {
        self.tokens.text_of(tok)
    }

    pub(crate) fn at(&mut self, kind: TokenKind) -> PResult<bool> {
        Ok(self.peek()?.kind == kind)
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> PResult<Option<Token>> {
        if self.at(kind)? {
            Ok(Some(self.tokens.next()))
        } else {
            Ok(None)
        }
    }

    /// A token that must be present; its absence is a syntax error, not a
    /// backtracking point.
    pub(crate) fn expect_forced(&mut self, kind: TokenKind) -> PResult<Token> {
        match self.expect(kind)? {
            Some(tok) => Ok(tok),
            None => Err(self.error_here(format!("expected {}", kind))),
        }
    }

    /// A NAME token spelling `word`.
    pub(crate) fn keyword(&mut self, word: &str) -> PResult<Option<Token>> {
        let tok = self.peek()?;
        if tok.kind == TokenKind::Name && self.text(&tok) == word {
            Ok(Some(self.tokens.next()))
        } else {
            Ok(None)
        }
    }

    pub(crate) fn at_keyword(&mut self, word: &str) -> PResult<bool> {
        let tok = self.peek()?;
        Ok(tok.kind == TokenKind::Name && self.text(&tok) == word)
    }

    /// A contextual keyword. Matches like [`Parser::keyword`], but the word
    /// stays available as an identifier everywhere else.
    pub(crate) fn soft_keyword(&mut self, word: &str) -> PResult<Option<Token>> {
        debug_assert!(is_soft_keyword(word), "'{word}' is not a soft keyword");
        self.keyword(word)
    }

    /// A NAME token that is not a reserved keyword.
    pub(crate) fn name_token(&mut self) -> PResult<Option<Token>> {
        let tok = self.peek()?;
        if tok.kind == TokenKind::Name && !is_reserved(self.text(&tok)) {
            Ok(Some(self.tokens.next()))
        } else {
            Ok(None)
        }
    }

    pub(crate) fn name(&mut self) -> PResult<Option<Expr>> {
        let Some(tok) = self.name_token()? else {
            return Ok(None);
        };
        Ok(Some(Expr::name(self.text(&tok), tok.span)))
    }

    // ------------------------------------------------------------------
    // Positions and errors
    // ------------------------------------------------------------------

    /// Start offset of the next token.
    pub(crate) fn start(&mut self) -> usize {
        self.tokens.peek().span.start
    }

    /// Span from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: usize) -> Span {
        let end = self.tokens.consumed_end().unwrap_or(start);
        Span::new(start, end.max(start))
    }

    pub(crate) fn error_here(&mut self, message: impl Into<String>) -> SyntaxError {
        let tok = self.tokens.peek();
        SyntaxError::grammar(message, &tok)
    }

    /// A grammar error covering `span`.
    pub(crate) fn error_at(&self, message: impl Into<String>, span: Span) -> SyntaxError {
        let (line, col) = self.line_index().position(span.start);
        SyntaxError::at_span(SyntaxErrorKind::Grammar, message, span, line, col)
    }
}

impl FExprParser for Parser<'_> {
    fn source(&self) -> &str {
        self.source
    }

    fn position(&self, offset: usize) -> (usize, usize) {
        self.line_index().position(offset)
    }

    fn parse_fexpr(&self, range: Span) -> PResult<Expr> {
        let (line, col) = self.position(range.start);
        let origin = TokOrigin {
            range,
            line,
            col,
            nested: true,
        };
        let mut sub = Parser::with_origin(
            self.source,
            origin,
            self.config,
            self.version,
            self.invalid_pass_enabled,
        );
        match sub.parse(InputMode::FString)? {
            Mod::Expression { body } => Ok(*body),
            _ => Err(sub.error_at("f-string: invalid expression", range)),
        }
    }
}
