// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! A restartable, randomly addressable view over the tokenizer.
//!
//! The parser never talks to [`TokState`] directly. [`TokenStream`] pulls
//! tokens lazily into a buffer so that `mark()`/`reset()` are O(1) and
//! repeated `peek()` calls are free of side effects. Type comments are
//! diverted into a per-line side channel instead of reaching the grammar.

use std::collections::BTreeMap;

use serde::Serialize;

use super::core::{classify_type_comment, TokConfig, TokOrigin, TokState};
use super::token::{Token, TokenKind};

/// Cursor into a [`TokenStream`].
pub type Mark = usize;

/// A `# type: ignore` comment, kept for `Module::type_ignores`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeIgnore {
    pub line: usize,
    pub tag: String,
}

pub struct TokenStream<'t> {
    source: &'t str,
    tokenizer: TokState<'t>,
    tokens: Vec<Token>,
    pos: Mark,
    exhausted: bool,
    type_comments: BTreeMap<usize, String>,
    type_ignores: Vec<TypeIgnore>,
}

impl<'t> TokenStream<'t> {
    pub fn new(source: &'t str, config: &TokConfig) -> Self {
        Self::from_state(source, TokState::new(source, config))
    }

    /// A stream over a sub-range of `source`, with positions relative to the
    /// whole of `source`.
    pub fn with_origin(source: &'t str, config: &TokConfig, origin: TokOrigin) -> Self {
        Self::from_state(source, TokState::with_origin(source, config, origin))
    }

    fn from_state(source: &'t str, tokenizer: TokState<'t>) -> Self {
        TokenStream {
            source,
            tokenizer,
            tokens: Vec::new(),
            pos: 0,
            exhausted: false,
            type_comments: BTreeMap::new(),
            type_ignores: Vec::new(),
        }
    }

    pub fn source(&self) -> &'t str {
        self.source
    }

    /// Ensure the buffer holds a token at `index`.
    fn fill(&mut self, index: usize) {
        while self.tokens.len() <= index && !self.exhausted {
            let tok = self.tokenizer.next_token();
            match tok.kind {
                TokenKind::TypeComment | TokenKind::TypeIgnore => self.divert(tok),
                TokenKind::EndMarker => {
                    self.exhausted = true;
                    self.tokens.push(tok);
                }
                _ => self.tokens.push(tok),
            }
        }
    }

    fn divert(&mut self, tok: Token) {
        let Some((kind, body)) = classify_type_comment(tok.text(self.source)) else {
            return;
        };
        if kind == TokenKind::TypeIgnore {
            self.type_ignores.push(TypeIgnore {
                line: tok.start_line,
                tag: body.to_string(),
            });
        } else {
            self.type_comments.insert(tok.start_line, body.to_string());
        }
    }

    /// The token at the cursor. Idempotent.
    pub fn peek(&mut self) -> Token {
        self.token_at(self.pos)
    }

    /// The token `n` places after the cursor.
    pub fn peek_nth(&mut self, n: usize) -> Token {
        self.token_at(self.pos + n)
    }

    /// Consume and return the token at the cursor. The cursor never moves past
    /// the ENDMARKER.
    pub fn next(&mut self) -> Token {
        let tok = self.peek();
        if tok.kind != TokenKind::EndMarker {
            self.pos += 1;
        }
        tok
    }

    pub fn mark(&self) -> Mark {
        self.pos
    }

    pub fn reset(&mut self, mark: Mark) {
        debug_assert!(mark <= self.tokens.len(), "reset past the buffered tokens");
        self.pos = mark;
    }

    /// The token at buffer index `index`, filling as needed. Indexes past the
    /// end of input yield the ENDMARKER.
    pub fn token_at(&mut self, index: usize) -> Token {
        self.fill(index);
        match self.tokens.get(index) {
            Some(tok) => *tok,
            None => self.last_token(),
        }
    }

    fn last_token(&self) -> Token {
        self.tokens
            .last()
            .copied()
            .unwrap_or_else(|| Token {
                kind: TokenKind::EndMarker,
                span: pyfront_core::Span::empty_at(self.source.len()),
                start_line: 1,
                start_col: 0,
                end_line: 1,
                end_col: 0,
                error: None,
            })
    }

    /// The most recently buffered token; error reports point here.
    pub fn last_filled(&self) -> Option<Token> {
        self.tokens.last().copied()
    }

    /// The token just before the cursor, used to close node spans.
    pub fn previous(&self) -> Option<Token> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i).copied())
    }

    /// End offset of the last consumed token that carries text, skipping
    /// NEWLINE, INDENT and DEDENT.
    pub fn consumed_end(&self) -> Option<usize> {
        self.tokens[..self.pos.min(self.tokens.len())]
            .iter()
            .rev()
            .find(|t| {
                !matches!(
                    t.kind,
                    TokenKind::Newline
                        | TokenKind::Indent
                        | TokenKind::Dedent
                        | TokenKind::EndMarker
                )
            })
            .map(|t| t.span.end)
    }

    pub fn text_of(&self, tok: &Token) -> &'t str {
        tok.text(self.source)
    }

    pub fn buffered(&self) -> usize {
        self.tokens.len()
    }

    /// Type comments captured so far, keyed by line.
    pub fn type_comments(&self) -> &BTreeMap<usize, String> {
        &self.type_comments
    }

    pub fn type_comment_on(&self, line: usize) -> Option<&str> {
        self.type_comments.get(&line).map(String::as_str)
    }

    pub fn type_ignores(&self) -> &[TypeIgnore] {
        &self.type_ignores
    }

    /// Move the captured type comments out, leaving the stream's map empty.
    pub fn take_type_comments(&mut self) -> BTreeMap<usize, String> {
        std::mem::take(&mut self.type_comments)
    }

    /// The tokens read so far: everything the parser has examined, and no
    /// further.
    pub fn buffered_tokens(&self) -> &[Token] {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(source: &str) -> TokenStream<'_> {
        TokenStream::new(
            source,
            &TokConfig {
                async_hacks: false,
                type_comments: true,
            },
        )
    }

    #[test]
    fn peek_is_idempotent() {
        let mut ts = stream("a + b\n");
        let first = ts.peek();
        assert_eq!(ts.peek(), first);
        assert_eq!(ts.text_of(&first), "a");
        assert_eq!(ts.mark(), 0);
    }

    #[test]
    fn mark_and_reset_rewind() {
        let mut ts = stream("a + b\n");
        let m = ts.mark();
        ts.next();
        ts.next();
        let tok = ts.peek();
        assert_eq!(ts.text_of(&tok), "b");
        ts.reset(m);
        let tok = ts.peek();
        assert_eq!(ts.text_of(&tok), "a");
    }

    #[test]
    fn next_stops_at_end_marker() {
        let mut ts = stream("x");
        let kinds: Vec<TokenKind> = (0..5).map(|_| ts.next().kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Name,
                TokenKind::Newline,
                TokenKind::EndMarker,
                TokenKind::EndMarker,
                TokenKind::EndMarker
            ]
        );
    }

    #[test]
    fn type_comments_go_to_side_channel() {
        let mut ts = stream("x = []  # type: List[int]\ny = 1  # type: ignore[misc]\n");
        ts.token_at(usize::MAX - 1);
        let kinds: Vec<TokenKind> = ts.buffered_tokens().iter().map(|t| t.kind).collect();
        assert!(!kinds.contains(&TokenKind::TypeComment));
        assert!(!kinds.contains(&TokenKind::TypeIgnore));
        assert_eq!(ts.type_comment_on(1), Some("List[int]"));
        assert_eq!(
            ts.type_ignores(),
            [TypeIgnore {
                line: 2,
                tag: "[misc]".to_string()
            }]
        );
        assert_eq!(ts.take_type_comments().len(), 1);
        assert!(ts.type_comments().is_empty());
    }
}
