// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Token kinds and the immutable [`Token`] record.

use std::fmt;

use pyfront_core::Span;
use serde::Serialize;

use super::TokError;

/// The closed set of token kinds produced by the tokenizer.
///
/// Keywords are not distinguished here: `if`, `def`, `match` and friends are
/// all [`TokenKind::Name`]. The parser decides which names are reserved.
///
/// Serialized names follow Python's `token` module (`ENDMARKER`, `LPAR`,
/// `TYPE_COMMENT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenKind {
    EndMarker,
    Name,
    Number,
    String,
    Newline,
    Indent,
    Dedent,
    LPar,
    RPar,
    LSqb,
    RSqb,
    Colon,
    Comma,
    Semi,
    Plus,
    Minus,
    Star,
    Slash,
    VBar,
    Amper,
    Less,
    Greater,
    Equal,
    Dot,
    Percent,
    LBrace,
    RBrace,
    EqEqual,
    NotEqual,
    LessEqual,
    GreaterEqual,
    Tilde,
    Circumflex,
    LeftShift,
    RightShift,
    DoubleStar,
    PlusEqual,
    MinEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    AmperEqual,
    VBarEqual,
    CircumflexEqual,
    LeftShiftEqual,
    RightShiftEqual,
    DoubleStarEqual,
    DoubleSlash,
    DoubleSlashEqual,
    At,
    AtEqual,
    RArrow,
    Ellipsis,
    ColonEqual,
    /// `async` as a hard keyword (or inside `async def` with async hacks on).
    Async,
    /// `await` as a hard keyword (or inside `async def` with async hacks on).
    Await,
    #[serde(rename = "TYPE_COMMENT")]
    TypeComment,
    #[serde(rename = "TYPE_IGNORE")]
    TypeIgnore,
    ErrorToken,
}

impl TokenKind {
    /// The fixed source spelling of operator and punctuation kinds.
    pub fn punctuation(self) -> Option<&'static str> {
        use TokenKind::*;
        let s = match self {
            LPar => "(",
            RPar => ")",
            LSqb => "[",
            RSqb => "]",
            Colon => ":",
            Comma => ",",
            Semi => ";",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            VBar => "|",
            Amper => "&",
            Less => "<",
            Greater => ">",
            Equal => "=",
            Dot => ".",
            Percent => "%",
            LBrace => "{",
            RBrace => "}",
            EqEqual => "==",
            NotEqual => "!=",
            LessEqual => "<=",
            GreaterEqual => ">=",
            Tilde => "~",
            Circumflex => "^",
            LeftShift => "<<",
            RightShift => ">>",
            DoubleStar => "**",
            PlusEqual => "+=",
            MinEqual => "-=",
            StarEqual => "*=",
            SlashEqual => "/=",
            PercentEqual => "%=",
            AmperEqual => "&=",
            VBarEqual => "|=",
            CircumflexEqual => "^=",
            LeftShiftEqual => "<<=",
            RightShiftEqual => ">>=",
            DoubleStarEqual => "**=",
            DoubleSlash => "//",
            DoubleSlashEqual => "//=",
            At => "@",
            AtEqual => "@=",
            RArrow => "->",
            Ellipsis => "...",
            ColonEqual => ":=",
            _ => return None,
        };
        Some(s)
    }

    /// Whether this kind is an operator or punctuation token.
    pub fn is_operator(self) -> bool {
        self.punctuation().is_some()
    }

    /// Human-readable description used in "expected ..." diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::EndMarker => "end of input",
            TokenKind::Name => "a name",
            TokenKind::Number => "a number",
            TokenKind::String => "a string",
            TokenKind::Newline => "a newline",
            TokenKind::Indent => "an indented block",
            TokenKind::Dedent => "a dedent",
            TokenKind::Async => "'async'",
            TokenKind::Await => "'await'",
            TokenKind::TypeComment => "a type comment",
            TokenKind::TypeIgnore => "a type: ignore comment",
            TokenKind::ErrorToken => "an error token",
            other => other.punctuation().unwrap_or("a token"),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.punctuation() {
            Some(p) => write!(f, "'{}'", p),
            None => write!(f, "{}", self.describe()),
        }
    }
}

/// A single token. Tokens are plain values; the source text is owned by the
/// tokenizer's caller and recovered with [`Token::text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offsets of the token text.
    pub span: Span,
    /// 1-indexed line of the first byte.
    pub start_line: usize,
    /// 0-indexed byte column of the first byte.
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
    /// The lexical failure behind an [`TokenKind::ErrorToken`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<TokError>,
}

impl Token {
    /// The slice of `source` this token covers.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end]
    }

    pub fn is_error(&self) -> bool {
        self.kind == TokenKind::ErrorToken
    }
}
