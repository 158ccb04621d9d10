// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The tokenizer state machine.
//!
//! [`TokState`] turns source text into [`Token`]s one at a time. It tracks
//! line/column positions, the indentation stack and bracket nesting, and it
//! never fails: malformed input becomes a [`TokenKind::ErrorToken`] carrying
//! a [`TokError`], and scanning resumes after it.

use std::collections::VecDeque;
use std::sync::LazyLock;

use memchr::memchr2;
use pyfront_core::Span;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use super::token::{Token, TokenKind};

/// Maximum depth of the indentation stack.
const MAX_INDENT: usize = 100;
const MAX_PAREN_LEVEL: usize = 200;
const TAB_SIZE: usize = 8;

static TYPE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s*type:\s*(?P<body>.*?)\s*$").unwrap());

/// Operators and punctuation, longest spelling first so the first prefix
/// match is the longest match.
const OPERATORS: &[(&str, TokenKind)] = &[
    ("**=", TokenKind::DoubleStarEqual),
    ("//=", TokenKind::DoubleSlashEqual),
    (">>=", TokenKind::RightShiftEqual),
    ("<<=", TokenKind::LeftShiftEqual),
    ("...", TokenKind::Ellipsis),
    ("!=", TokenKind::NotEqual),
    ("%=", TokenKind::PercentEqual),
    ("&=", TokenKind::AmperEqual),
    ("**", TokenKind::DoubleStar),
    ("*=", TokenKind::StarEqual),
    ("+=", TokenKind::PlusEqual),
    ("-=", TokenKind::MinEqual),
    ("->", TokenKind::RArrow),
    ("//", TokenKind::DoubleSlash),
    ("/=", TokenKind::SlashEqual),
    (":=", TokenKind::ColonEqual),
    ("<<", TokenKind::LeftShift),
    ("<=", TokenKind::LessEqual),
    ("==", TokenKind::EqEqual),
    (">=", TokenKind::GreaterEqual),
    (">>", TokenKind::RightShift),
    ("@=", TokenKind::AtEqual),
    ("^=", TokenKind::CircumflexEqual),
    ("|=", TokenKind::VBarEqual),
    ("%", TokenKind::Percent),
    ("&", TokenKind::Amper),
    ("(", TokenKind::LPar),
    (")", TokenKind::RPar),
    ("*", TokenKind::Star),
    ("+", TokenKind::Plus),
    (",", TokenKind::Comma),
    ("-", TokenKind::Minus),
    (".", TokenKind::Dot),
    ("/", TokenKind::Slash),
    (":", TokenKind::Colon),
    (";", TokenKind::Semi),
    ("<", TokenKind::Less),
    ("=", TokenKind::Equal),
    (">", TokenKind::Greater),
    ("@", TokenKind::At),
    ("[", TokenKind::LSqb),
    ("]", TokenKind::RSqb),
    ("^", TokenKind::Circumflex),
    ("{", TokenKind::LBrace),
    ("|", TokenKind::VBar),
    ("}", TokenKind::RBrace),
    ("~", TokenKind::Tilde),
];

/// Lexical failures. Each one is attached to the ERRORTOKEN that reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum TokError {
    #[error("inconsistent use of tabs and spaces in indentation")]
    TabSpace,
    #[error("too many levels of indentation")]
    TooDeep,
    #[error("unindent does not match any outer indentation level")]
    Dedent,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated triple-quoted string literal")]
    UnterminatedTripleQuotedString,
    #[error("unexpected character after line continuation character")]
    UnexpectedCharacterAfterBackslash,
    #[error("unexpected EOF while parsing")]
    UnexpectedEof,
    #[error("invalid decimal literal")]
    BadDecimal,
    #[error(
        "leading zeros in decimal integer literals are not permitted; use an 0o prefix for octal integers"
    )]
    BadDecimalLeadingZeros,
    #[error("invalid hexadecimal literal")]
    BadHexadecimal,
    #[error("invalid octal literal")]
    BadOctal,
    #[error("invalid digit '{0}' in octal literal")]
    BadOctalDigit(char),
    #[error("invalid binary literal")]
    BadBinary,
    #[error("invalid digit '{0}' in binary literal")]
    BadBinaryDigit(char),
    #[error("invalid character '{0}'")]
    BadCharacter(char),
    #[error("'{0}' was never closed")]
    UnclosedBracket(char),
    #[error("unmatched '{0}'")]
    UnmatchedBracket(char),
    #[error("too many nested parentheses")]
    TooManyParentheses,
    #[error("closing parenthesis '{0}' does not match opening parenthesis '{1}'")]
    MismatchedBracket(char, char),
}

/// Tokenizer switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokConfig {
    /// Treat `async`/`await` as identifiers except inside `async def` bodies.
    pub async_hacks: bool,
    /// Emit `# type: ...` comments as TYPE_COMMENT / TYPE_IGNORE tokens.
    pub type_comments: bool,
}

/// Where a tokenizer starts and stops inside its source.
///
/// Nested origins tokenize a sub-slice (an f-string replacement field) as if
/// it were inside brackets: newlines and indentation are insignificant, and
/// positions stay relative to the enclosing source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokOrigin {
    pub range: Span,
    pub line: usize,
    pub col: usize,
    pub nested: bool,
}

#[derive(Debug, Clone, Copy)]
struct Bracket {
    ch: char,
    offset: usize,
    line: usize,
    col: usize,
}

/// Classify a comment as a type comment, returning its kind and payload.
///
/// `# type: int` yields `(TypeComment, "int")`; `# type: ignore[attr]`
/// yields `(TypeIgnore, "[attr]")`.
pub fn classify_type_comment(text: &str) -> Option<(TokenKind, &str)> {
    let caps = TYPE_COMMENT.captures(text)?;
    let body = caps.name("body")?.as_str();
    if let Some(tag) = body.strip_prefix("ignore") {
        if !tag.starts_with(is_identifier_continue) {
            return Some((TokenKind::TypeIgnore, tag.trim()));
        }
    }
    if body.is_empty() {
        None
    } else {
        Some((TokenKind::TypeComment, body))
    }
}

pub(crate) fn is_identifier_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

pub(crate) fn is_identifier_continue(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_continue(c)
}

fn is_string_prefix(prefix: &[u8]) -> bool {
    let lower: Vec<u8> = prefix.iter().map(u8::to_ascii_lowercase).collect();
    matches!(
        lower.as_slice(),
        b"r" | b"u" | b"b" | b"f" | b"br" | b"rb" | b"fr" | b"rf"
    )
}

/// Tokenizer state over one source text.
pub struct TokState<'t> {
    source: &'t str,
    bytes: &'t [u8],
    config: TokConfig,
    pos: usize,
    end: usize,
    line: usize,
    line_start: usize,
    /// Indentation levels as `(col, altcol)`; `altcol` counts a tab as one
    /// column so ambiguous tab/space mixes can be detected.
    indents: Vec<(usize, usize)>,
    brackets: Vec<Bracket>,
    pending: VecDeque<Token>,
    at_bol: bool,
    line_has_tokens: bool,
    nested: bool,
    async_def: bool,
    async_def_indent: usize,
    async_def_nl: bool,
    finished: bool,
    exhausted: bool,
}

impl<'t> TokState<'t> {
    pub fn new(source: &'t str, config: &TokConfig) -> Self {
        Self::with_origin(
            source,
            config,
            TokOrigin {
                range: Span::new(0, source.len()),
                line: 1,
                col: 0,
                nested: false,
            },
        )
    }

    pub fn with_origin(source: &'t str, config: &TokConfig, origin: TokOrigin) -> Self {
        TokState {
            source,
            bytes: source.as_bytes(),
            config: *config,
            pos: origin.range.start,
            end: origin.range.end.min(source.len()),
            line: origin.line,
            line_start: origin.range.start - origin.col,
            indents: vec![(0, 0)],
            brackets: Vec::new(),
            pending: VecDeque::new(),
            at_bol: !origin.nested,
            line_has_tokens: false,
            nested: origin.nested,
            async_def: false,
            async_def_indent: 0,
            async_def_nl: false,
            finished: false,
            exhausted: false,
        }
    }

    pub fn source(&self) -> &'t str {
        self.source
    }

    /// Current indentation depth (0 at module level).
    pub fn indent_depth(&self) -> usize {
        self.indents.len() - 1
    }

    /// Produce the next token. After the ENDMARKER every call returns
    /// another ENDMARKER.
    pub fn next_token(&mut self) -> Token {
        loop {
            if let Some(tok) = self.pending.pop_front() {
                return tok;
            }
            if self.finished {
                let (line, col) = self.here();
                return Token {
                    kind: TokenKind::EndMarker,
                    span: Span::empty_at(self.pos),
                    start_line: line,
                    start_col: col,
                    end_line: line,
                    end_col: col,
                    error: None,
                };
            }
            if self.at_bol {
                self.at_bol = false;
                self.indentation();
                continue;
            }
            if let Some(tok) = self.scan() {
                return tok;
            }
        }
    }

    // ------------------------------------------------------------------
    // Cursor helpers
    // ------------------------------------------------------------------

    fn here(&self) -> (usize, usize) {
        (self.line, self.pos - self.line_start)
    }

    fn peek_byte(&self) -> Option<u8> {
        self.peek_byte_at(0)
    }

    fn peek_byte_at(&self, n: usize) -> Option<u8> {
        let i = self.pos + n;
        if i < self.end {
            Some(self.bytes[i])
        } else {
            None
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..self.end].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        match c {
            '\n' => self.start_line(),
            '\r' if self.peek_byte() != Some(b'\n') => self.start_line(),
            _ => {}
        }
        Some(c)
    }

    fn start_line(&mut self) {
        self.line += 1;
        self.line_start = self.pos;
    }

    fn in_brackets(&self) -> bool {
        self.nested || !self.brackets.is_empty()
    }

    fn token(&self, kind: TokenKind, start: usize, line: usize, col: usize) -> Token {
        let (end_line, end_col) = self.here();
        Token {
            kind,
            span: Span::new(start, self.pos),
            start_line: line,
            start_col: col,
            end_line,
            end_col,
            error: None,
        }
    }

    fn error(&self, err: TokError, start: usize, line: usize, col: usize) -> Token {
        Token {
            error: Some(err),
            ..self.token(TokenKind::ErrorToken, start, line, col)
        }
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    fn scan(&mut self) -> Option<Token> {
        while let Some(b' ' | b'\t' | b'\x0c') = self.peek_byte() {
            self.pos += 1;
        }
        let start = self.pos;
        let (line, col) = self.here();
        let Some(c) = self.peek_char() else {
            self.at_eof();
            return None;
        };
        let tok = match c {
            '#' => return self.comment(start, line, col),
            '\n' | '\r' => return self.newline(start, line, col),
            '\\' => return self.continuation(start, line, col),
            '"' | '\'' => self.string(start, line, col),
            '0'..='9' => self.number(start, line, col),
            '.' if matches!(self.peek_byte_at(1), Some(b'0'..=b'9')) => {
                self.number(start, line, col)
            }
            c if is_identifier_start(c) => self.name_or_string(start, line, col),
            _ => self.operator(start, line, col),
        };
        if tok.kind != TokenKind::ErrorToken {
            self.line_has_tokens = true;
        }
        Some(tok)
    }

    fn at_eof(&mut self) {
        if let Some(open) = self.brackets.pop() {
            self.pending.push_back(Token {
                kind: TokenKind::ErrorToken,
                span: Span::new(open.offset, open.offset + open.ch.len_utf8()),
                start_line: open.line,
                start_col: open.col,
                end_line: open.line,
                end_col: open.col + 1,
                error: Some(TokError::UnclosedBracket(open.ch)),
            });
            self.brackets.clear();
        }
        let (line, col) = self.here();
        if !self.nested {
            if self.line_has_tokens {
                self.line_has_tokens = false;
                self.pending
                    .push_back(self.token(TokenKind::Newline, self.pos, line, col));
            }
            while self.indents.len() > 1 {
                self.indents.pop();
                self.pending
                    .push_back(self.token(TokenKind::Dedent, self.pos, line, col));
            }
        }
        self.finished = true;
    }

    // ------------------------------------------------------------------
    // Layout: indentation, newlines, comments, continuations
    // ------------------------------------------------------------------

    fn indentation(&mut self) {
        let ws_start = self.pos;
        let (line, start_col) = self.here();
        let (mut col, mut altcol) = (0usize, 0usize);
        loop {
            match self.peek_byte() {
                Some(b' ') => {
                    col += 1;
                    altcol += 1;
                }
                Some(b'\t') => {
                    col = (col / TAB_SIZE + 1) * TAB_SIZE;
                    altcol += 1;
                }
                Some(b'\x0c') => {
                    col = 0;
                    altcol = 0;
                }
                _ => break,
            }
            self.pos += 1;
        }
        if matches!(
            self.peek_byte(),
            None | Some(b'#') | Some(b'\n') | Some(b'\r') | Some(b'\\')
        ) {
            // Blank and comment-only lines do not affect indentation.
            return;
        }

        let (top, alt_top) = self.current_indent();
        if col == top {
            if altcol != alt_top {
                let err = self.error(TokError::TabSpace, ws_start, line, start_col);
                self.pending.push_back(err);
            }
        } else if col > top {
            if self.indents.len() >= MAX_INDENT {
                let err = self.error(TokError::TooDeep, ws_start, line, start_col);
                self.pending.push_back(err);
            } else if altcol <= alt_top {
                let err = self.error(TokError::TabSpace, ws_start, line, start_col);
                self.pending.push_back(err);
            } else {
                self.indents.push((col, altcol));
                let (l, c) = self.here();
                self.pending
                    .push_back(self.token(TokenKind::Indent, self.pos, l, c));
            }
        } else {
            let mut dedents = 0;
            while self.indents.len() > 1 && col < self.current_indent().0 {
                self.indents.pop();
                dedents += 1;
            }
            let (top, alt_top) = self.current_indent();
            if col != top {
                let err = self.error(TokError::Dedent, ws_start, line, start_col);
                self.pending.push_back(err);
            } else if altcol != alt_top {
                let err = self.error(TokError::TabSpace, ws_start, line, start_col);
                self.pending.push_back(err);
            } else {
                let (l, c) = self.here();
                for _ in 0..dedents {
                    self.pending
                        .push_back(self.token(TokenKind::Dedent, self.pos, l, c));
                }
            }
        }

        if self.async_def && self.async_def_nl && self.indent_depth() <= self.async_def_indent {
            self.async_def = false;
        }
    }

    fn current_indent(&self) -> (usize, usize) {
        self.indents.last().copied().unwrap_or((0, 0))
    }

    fn newline(&mut self, start: usize, line: usize, col: usize) -> Option<Token> {
        if self.peek_byte() == Some(b'\r') && self.peek_byte_at(1) == Some(b'\n') {
            self.bump();
        }
        self.bump();
        if self.in_brackets() {
            return None;
        }
        self.at_bol = true;
        if !self.line_has_tokens {
            return None;
        }
        self.line_has_tokens = false;
        if self.async_def {
            self.async_def_nl = true;
        }
        let len = self.pos - start;
        Some(Token {
            kind: TokenKind::Newline,
            span: Span::new(start, self.pos),
            start_line: line,
            start_col: col,
            end_line: line,
            end_col: col + len,
            error: None,
        })
    }

    fn comment(&mut self, start: usize, line: usize, col: usize) -> Option<Token> {
        let stop = memchr2(b'\n', b'\r', &self.bytes[self.pos..self.end])
            .map_or(self.end, |i| self.pos + i);
        self.pos = stop;
        if !self.config.type_comments {
            return None;
        }
        let text = &self.source[start..stop];
        classify_type_comment(text).map(|(kind, _)| self.token(kind, start, line, col))
    }

    fn continuation(&mut self, start: usize, line: usize, col: usize) -> Option<Token> {
        self.pos += 1;
        match self.peek_byte() {
            Some(b'\r' | b'\n') => {
                if self.peek_byte() == Some(b'\r') && self.peek_byte_at(1) == Some(b'\n') {
                    self.bump();
                }
                self.bump();
                // The joined line must continue with something.
                if self.pos >= self.end {
                    return Some(self.error(TokError::UnexpectedEof, start, line, col));
                }
                None
            }
            None => Some(self.error(TokError::UnexpectedEof, start, line, col)),
            Some(_) => Some(self.error(
                TokError::UnexpectedCharacterAfterBackslash,
                start,
                line,
                col,
            )),
        }
    }

    // ------------------------------------------------------------------
    // Names and strings
    // ------------------------------------------------------------------

    fn name_or_string(&mut self, start: usize, line: usize, col: usize) -> Token {
        if let Some(prefix_len) = self.string_prefix_len() {
            self.pos += prefix_len;
            return self.string(start, line, col);
        }
        while let Some(c) = self.peek_char() {
            if !is_identifier_continue(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        let kind = match &self.source[start..self.pos] {
            "async" => self.async_kind(),
            "await" => self.await_kind(),
            _ => TokenKind::Name,
        };
        self.token(kind, start, line, col)
    }

    fn string_prefix_len(&self) -> Option<usize> {
        let rest = &self.bytes[self.pos..self.end];
        [2, 1].into_iter().find(|&len| {
            rest.len() > len && matches!(rest[len], b'\'' | b'"') && is_string_prefix(&rest[..len])
        })
    }

    fn async_kind(&mut self) -> TokenKind {
        if !self.config.async_hacks || self.async_def {
            return TokenKind::Async;
        }
        if self.next_word_is("def") {
            self.async_def = true;
            self.async_def_indent = self.indent_depth();
            self.async_def_nl = false;
            return TokenKind::Async;
        }
        TokenKind::Name
    }

    fn await_kind(&self) -> TokenKind {
        if !self.config.async_hacks || self.async_def {
            TokenKind::Await
        } else {
            TokenKind::Name
        }
    }

    fn next_word_is(&self, word: &str) -> bool {
        let rest = self.source[self.pos..self.end].trim_start_matches([' ', '\t', '\x0c']);
        match rest.strip_prefix(word) {
            Some(after) => !after.starts_with(is_identifier_continue),
            None => false,
        }
    }

    fn string(&mut self, start: usize, line: usize, col: usize) -> Token {
        let quote = self.bytes[self.pos];
        let triple = self.peek_byte_at(1) == Some(quote) && self.peek_byte_at(2) == Some(quote);
        self.pos += if triple { 3 } else { 1 };
        loop {
            match self.peek_byte() {
                None => {
                    let err = if triple {
                        TokError::UnterminatedTripleQuotedString
                    } else {
                        TokError::UnterminatedString
                    };
                    return self.error(err, start, line, col);
                }
                Some(b'\\') => {
                    self.bump();
                    self.bump();
                }
                Some(b'\n' | b'\r') if !triple => {
                    return self.error(TokError::UnterminatedString, start, line, col);
                }
                Some(q) if q == quote => {
                    if !triple {
                        self.pos += 1;
                        break;
                    }
                    if self.peek_byte_at(1) == Some(quote) && self.peek_byte_at(2) == Some(quote) {
                        self.pos += 3;
                        break;
                    }
                    self.pos += 1;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        self.token(TokenKind::String, start, line, col)
    }

    // ------------------------------------------------------------------
    // Numbers
    // ------------------------------------------------------------------

    fn number(&mut self, start: usize, line: usize, col: usize) -> Token {
        match self.scan_number() {
            Ok(()) => self.token(TokenKind::Number, start, line, col),
            Err(err) => {
                while let Some(b) = self.peek_byte() {
                    if !(b.is_ascii_alphanumeric() || b == b'_' || b == b'.') {
                        break;
                    }
                    self.pos += 1;
                }
                self.error(err, start, line, col)
            }
        }
    }

    fn scan_number(&mut self) -> Result<(), TokError> {
        if self.peek_byte() == Some(b'.') {
            self.pos += 1;
            self.decimal_digits()?;
            return self.exponent_and_imaginary();
        }
        if self.peek_byte() == Some(b'0') {
            match self.peek_byte_at(1) {
                Some(b'x' | b'X') => {
                    self.pos += 2;
                    return self.radix_digits(16);
                }
                Some(b'o' | b'O') => {
                    self.pos += 2;
                    return self.radix_digits(8);
                }
                Some(b'b' | b'B') => {
                    self.pos += 2;
                    return self.radix_digits(2);
                }
                _ => {}
            }
        }

        let int_start = self.pos;
        self.decimal_digits()?;
        let int_text = &self.bytes[int_start..self.pos];
        let leading_zeros = int_text.len() > 1
            && int_text[0] == b'0'
            && int_text.iter().any(|b| matches!(b, b'1'..=b'9'));

        match self.peek_byte() {
            Some(b'.') => {
                self.pos += 1;
                match self.peek_byte() {
                    Some(b'_') => return Err(TokError::BadDecimal),
                    Some(b'0'..=b'9') => self.decimal_digits()?,
                    _ => {}
                }
                self.exponent_and_imaginary()
            }
            Some(b'e' | b'E' | b'j' | b'J') => self.exponent_and_imaginary(),
            _ if leading_zeros => Err(TokError::BadDecimalLeadingZeros),
            _ => Ok(()),
        }
    }

    /// Consume digits with single `_` separators strictly between digits.
    /// Returns the number of digits consumed.
    fn digits_with_separators(&mut self, is_digit: impl Fn(u8) -> bool) -> Result<usize, ()> {
        let mut count = 0;
        loop {
            match self.peek_byte() {
                Some(b) if is_digit(b) => {
                    self.pos += 1;
                    count += 1;
                }
                Some(b'_') => {
                    if count == 0 {
                        return Err(());
                    }
                    match self.peek_byte_at(1) {
                        Some(b) if is_digit(b) => self.pos += 1,
                        _ => return Err(()),
                    }
                }
                _ => return Ok(count),
            }
        }
    }

    fn decimal_digits(&mut self) -> Result<(), TokError> {
        match self.digits_with_separators(|b| b.is_ascii_digit()) {
            Ok(n) if n > 0 => Ok(()),
            _ => Err(TokError::BadDecimal),
        }
    }

    fn radix_digits(&mut self, radix: u32) -> Result<(), TokError> {
        let generic = match radix {
            16 => TokError::BadHexadecimal,
            8 => TokError::BadOctal,
            _ => TokError::BadBinary,
        };
        let scanned = self.digits_with_separators(|b| (b as char).is_digit(radix));
        if radix < 10 {
            if let Some(b @ b'0'..=b'9') = self.peek_byte() {
                let digit = b as char;
                return Err(if radix == 8 {
                    TokError::BadOctalDigit(digit)
                } else {
                    TokError::BadBinaryDigit(digit)
                });
            }
        }
        match scanned {
            Ok(n) if n > 0 => Ok(()),
            _ => Err(generic),
        }
    }

    fn exponent_and_imaginary(&mut self) -> Result<(), TokError> {
        if let Some(b'e' | b'E') = self.peek_byte() {
            let save = self.pos;
            self.pos += 1;
            if let Some(b'+' | b'-') = self.peek_byte() {
                self.pos += 1;
            }
            match self.peek_byte() {
                Some(b'0'..=b'9') => self.decimal_digits()?,
                Some(b'_') => return Err(TokError::BadDecimal),
                _ => {
                    // `1else`: the `e` starts the next token.
                    self.pos = save;
                    return Ok(());
                }
            }
        }
        if let Some(b'j' | b'J') = self.peek_byte() {
            self.pos += 1;
        }
        if self.peek_byte() == Some(b'_') {
            return Err(TokError::BadDecimal);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Operators and brackets
    // ------------------------------------------------------------------

    fn operator(&mut self, start: usize, line: usize, col: usize) -> Token {
        let rest = &self.source[self.pos..self.end];
        let Some(&(spelling, kind)) = OPERATORS.iter().find(|(op, _)| rest.starts_with(op)) else {
            let c = self.bump().unwrap_or('\0');
            return self.error(TokError::BadCharacter(c), start, line, col);
        };
        self.pos += spelling.len();
        let ch = spelling.chars().next().unwrap_or('\0');
        match kind {
            TokenKind::LPar | TokenKind::LSqb | TokenKind::LBrace => {
                if self.brackets.len() >= MAX_PAREN_LEVEL {
                    return self.error(TokError::TooManyParentheses, start, line, col);
                }
                self.brackets.push(Bracket {
                    ch,
                    offset: start,
                    line,
                    col,
                });
            }
            TokenKind::RPar | TokenKind::RSqb | TokenKind::RBrace => {
                match self.brackets.pop() {
                    None if !self.nested => {
                        return self.error(TokError::UnmatchedBracket(ch), start, line, col);
                    }
                    None => {}
                    Some(open) => {
                        let expected = match open.ch {
                            '(' => ')',
                            '[' => ']',
                            _ => '}',
                        };
                        if expected != ch {
                            return self.error(
                                TokError::MismatchedBracket(ch, open.ch),
                                start,
                                line,
                                col,
                            );
                        }
                    }
                }
            }
            _ => {}
        }
        self.token(kind, start, line, col)
    }
}

impl<'t> Iterator for TokState<'t> {
    type Item = Token;

    /// Yields every token up to and including the ENDMARKER.
    fn next(&mut self) -> Option<Token> {
        if self.exhausted {
            return None;
        }
        let tok = self.next_token();
        if tok.kind == TokenKind::EndMarker {
            self.exhausted = true;
        }
        Some(tok)
    }
}
