// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use pyfront_core::Span;
use serde::Serialize;
use thiserror::Error;

use crate::tokenizer::{TokError, Token};

/// Which layer of the front end rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxErrorKind {
    /// The tokenizer produced an error token.
    Tokenize,
    /// No grammar rule matched, or a forced token was missing.
    Grammar,
    /// The input parsed but violates a rule checked while building nodes.
    Semantic,
}

/// A located syntax error. Offsets are byte offsets into the parsed source;
/// `start_line` is 1-based and `start_col` is a 0-based byte column.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message} (line {start_line}, column {start_col})")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub message: String,
    pub start_offset: usize,
    pub end_offset: usize,
    pub start_line: usize,
    pub start_col: usize,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, message: impl Into<String>, tok: &Token) -> Self {
        SyntaxError {
            kind,
            message: message.into(),
            start_offset: tok.span.start,
            end_offset: tok.span.end,
            start_line: tok.start_line,
            start_col: tok.start_col,
        }
    }

    pub fn grammar(message: impl Into<String>, tok: &Token) -> Self {
        Self::new(SyntaxErrorKind::Grammar, message, tok)
    }

    /// Convert an error token into the error it reports.
    pub fn from_token(tok: &Token, err: TokError) -> Self {
        Self::new(SyntaxErrorKind::Tokenize, err.to_string(), tok)
    }

    /// An error located at an arbitrary span whose start is at
    /// `(start_line, start_col)`.
    pub fn at_span(
        kind: SyntaxErrorKind,
        message: impl Into<String>,
        span: Span,
        start_line: usize,
        start_col: usize,
    ) -> Self {
        SyntaxError {
            kind,
            message: message.into(),
            start_offset: span.start,
            end_offset: span.end,
            start_line,
            start_col,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start_offset, self.end_offset.max(self.start_offset))
    }
}

#[allow(clippy::enum_variant_names)]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParserError<'a> {
    #[error("tokenizer error: {0}")]
    TokenizerError(SyntaxError, &'a str),
    #[error("parser error: {0}")]
    ParserError(SyntaxError, &'a str),
}

impl<'a> ParserError<'a> {
    pub fn new(err: SyntaxError, source: &'a str) -> Self {
        match err.kind {
            SyntaxErrorKind::Tokenize => ParserError::TokenizerError(err, source),
            SyntaxErrorKind::Grammar | SyntaxErrorKind::Semantic => {
                ParserError::ParserError(err, source)
            }
        }
    }

    pub fn syntax_error(&self) -> &SyntaxError {
        match self {
            ParserError::TokenizerError(err, _) | ParserError::ParserError(err, _) => err,
        }
    }

    pub fn into_syntax_error(self) -> SyntaxError {
        match self {
            ParserError::TokenizerError(err, _) | ParserError::ParserError(err, _) => err,
        }
    }

    /// The source text the error refers to.
    pub fn source_text(&self) -> &'a str {
        match self {
            ParserError::TokenizerError(_, src) | ParserError::ParserError(_, src) => src,
        }
    }
}

pub type Result<'a, T> = std::result::Result<T, ParserError<'a>>;

/// Result type of individual grammar rules.
pub type PResult<T> = std::result::Result<T, SyntaxError>;
