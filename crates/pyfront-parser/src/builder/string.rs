// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! String literals: prefixes, escape decoding, implicit concatenation and
//! f-string replacement fields.

use pyfront_core::Span;

use super::AstBuilder;
use crate::ast::{Constant, Expr, ExprKind};
use crate::parser::{PResult, SyntaxError};
use crate::tokenizer::Token;

/// Nesting limit for replacement fields inside format specs.
const MAX_FSTRING_DEPTH: u32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Prefix {
    pub raw: bool,
    pub bytes: bool,
    pub fstring: bool,
    pub unicode: bool,
}

/// A STRING token split into prefix and body.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Literal<'s> {
    pub prefix: Prefix,
    pub body: &'s str,
    /// Absolute offset of the first byte of `body`.
    pub body_offset: usize,
}

pub(crate) fn split_literal(text: &str, offset: usize) -> Literal<'_> {
    let prefix_len = text.find(['\'', '"']).unwrap_or(text.len());
    let mut prefix = Prefix::default();
    for c in text[..prefix_len].chars() {
        match c.to_ascii_lowercase() {
            'r' => prefix.raw = true,
            'b' => prefix.bytes = true,
            'f' => prefix.fstring = true,
            'u' => prefix.unicode = true,
            _ => {}
        }
    }
    let rest = &text[prefix_len..];
    let quote_len = if rest.len() >= 6 && (rest.starts_with("'''") || rest.starts_with("\"\"\"")) {
        3
    } else {
        1
    };
    let body = rest
        .get(quote_len..rest.len().saturating_sub(quote_len))
        .unwrap_or("");
    Literal {
        prefix,
        body,
        body_offset: offset + prefix_len + quote_len,
    }
}

/// The meaning of one backslash escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Escape {
    Char(char),
    Byte(u8),
    /// Backslash-newline: contributes nothing.
    Continuation,
    /// Not an escape; the backslash stands for itself.
    Unknown,
}

/// Decode the escape whose text (after the backslash) starts `rest`.
/// Returns the escape and the number of bytes of `rest` it consumed.
pub(crate) fn escape_at(rest: &str, bytes: bool) -> Result<(Escape, usize), String> {
    let Some(c) = rest.chars().next() else {
        return Ok((Escape::Unknown, 0));
    };
    let simple = |ch: char| Ok((Escape::Char(ch), 1));
    match c {
        '\n' => Ok((Escape::Continuation, 1)),
        '\r' => Ok((
            Escape::Continuation,
            if rest[1..].starts_with('\n') { 2 } else { 1 },
        )),
        '\\' | '\'' | '"' => simple(c),
        'a' => simple('\x07'),
        'b' => simple('\x08'),
        'f' => simple('\x0c'),
        'n' => simple('\n'),
        'r' => simple('\r'),
        't' => simple('\t'),
        'v' => simple('\x0b'),
        '0'..='7' => {
            let len = rest
                .bytes()
                .take(3)
                .take_while(|b| (b'0'..=b'7').contains(b))
                .count();
            let value = u32::from_str_radix(&rest[..len], 8).map_err(|e| e.to_string())?;
            if bytes {
                Ok((Escape::Byte((value & 0xff) as u8), len))
            } else {
                let ch = char::from_u32(value).ok_or("illegal Unicode character")?;
                Ok((Escape::Char(ch), len))
            }
        }
        'x' => {
            let value = hex_digits(&rest[1..], 2).ok_or("truncated \\xXX escape")?;
            if bytes {
                Ok((Escape::Byte(value as u8), 3))
            } else {
                let ch = char::from_u32(value).ok_or("illegal Unicode character")?;
                Ok((Escape::Char(ch), 3))
            }
        }
        'u' if !bytes => {
            let value = hex_digits(&rest[1..], 4).ok_or("truncated \\uXXXX escape")?;
            let ch = char::from_u32(value).ok_or("illegal Unicode character")?;
            Ok((Escape::Char(ch), 5))
        }
        'U' if !bytes => {
            let value = hex_digits(&rest[1..], 8).ok_or("truncated \\UXXXXXXXX escape")?;
            let ch = char::from_u32(value).ok_or("illegal Unicode character")?;
            Ok((Escape::Char(ch), 9))
        }
        'N' if !bytes => Err("\\N{...} escapes are not supported".to_string()),
        _ => Ok((Escape::Unknown, 0)),
    }
}

/// Exactly `count` hex digits at the start of `s`.
fn hex_digits(s: &str, count: usize) -> Option<u32> {
    let digits = s.get(..count)?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// Decode a `str` body. Errors carry the offset of the offending escape.
pub(crate) fn decode_str(body: &str, raw: bool) -> Result<String, (String, usize)> {
    if raw || !body.contains('\\') {
        return Ok(body.to_string());
    }
    let mut out = String::with_capacity(body.len());
    let mut i = 0;
    while let Some(c) = body[i..].chars().next() {
        if c != '\\' {
            out.push(c);
            i += c.len_utf8();
            continue;
        }
        let (escape, used) = escape_at(&body[i + 1..], false).map_err(|msg| (msg, i))?;
        match escape {
            Escape::Char(ch) => out.push(ch),
            Escape::Byte(b) => out.push(char::from(b)),
            Escape::Continuation => {}
            Escape::Unknown => out.push('\\'),
        }
        i += 1 + used;
    }
    Ok(out)
}

/// Decode a `bytes` body. Only ASCII may appear literally.
pub(crate) fn decode_bytes(body: &str, raw: bool) -> Result<Vec<u8>, (String, usize)> {
    let mut out = Vec::with_capacity(body.len());
    let mut i = 0;
    while let Some(c) = body[i..].chars().next() {
        if !c.is_ascii() {
            return Err((
                "bytes can only contain ASCII literal characters".to_string(),
                i,
            ));
        }
        if c != '\\' || raw {
            out.push(c as u8);
            i += 1;
            continue;
        }
        let (escape, used) = escape_at(&body[i + 1..], true).map_err(|msg| (msg, i))?;
        match escape {
            Escape::Byte(b) => out.push(b),
            Escape::Char(ch) => out.push(ch as u8),
            Escape::Continuation => {}
            Escape::Unknown => out.push(b'\\'),
        }
        i += 1 + used;
    }
    Ok(out)
}

/// Collects the pieces of a joined string, merging adjacent literal text.
#[derive(Debug, Default)]
struct Parts {
    values: Vec<Expr>,
    text: String,
    text_span: Option<Span>,
}

impl Parts {
    fn push_text(&mut self, text: &str, span: Span) {
        self.text.push_str(text);
        self.text_span = Some(match self.text_span {
            Some(prev) => prev.cover(&span),
            None => span,
        });
    }

    fn push_field(&mut self, field: Expr) {
        self.flush();
        self.values.push(field);
    }

    fn flush(&mut self) {
        let span = self.text_span.take();
        if let Some(span) = span {
            if !self.text.is_empty() {
                let text = std::mem::take(&mut self.text);
                self.values
                    .push(Expr::constant(Constant::Str(text), span));
            }
        }
        self.text.clear();
    }

    fn into_joined(mut self, span: Span) -> Expr {
        self.flush();
        Expr::new(
            ExprKind::JoinedStr {
                values: self.values,
            },
            span,
        )
    }
}

impl AstBuilder<'_> {
    /// Build the node for one or more adjacent STRING tokens.
    pub fn strings(&self, tokens: &[Token]) -> PResult<Expr> {
        let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
            return Err(self.error("expected a string", Span::default()));
        };
        let span = Span::new(first.span.start, last.span.end);
        let source = self.fexpr.source();
        let literals: Vec<Literal<'_>> = tokens
            .iter()
            .map(|tok| split_literal(tok.text(source), tok.span.start))
            .collect();

        let bytes_count = literals.iter().filter(|lit| lit.prefix.bytes).count();
        if bytes_count != 0 && bytes_count != literals.len() {
            return Err(self.error("cannot mix bytes and nonbytes literals", span));
        }

        if bytes_count > 0 {
            let mut value = Vec::new();
            for lit in &literals {
                let decoded = decode_bytes(lit.body, lit.prefix.raw)
                    .map_err(|(msg, at)| self.error(msg, Span::empty_at(lit.body_offset + at)))?;
                value.extend(decoded);
            }
            return Ok(Expr::constant(Constant::Bytes(value), span));
        }

        if !literals.iter().any(|lit| lit.prefix.fstring) {
            let mut value = String::new();
            for lit in &literals {
                value.push_str(&self.decode_literal(lit)?);
            }
            let kind = first_prefix(&literals).unicode.then(|| "u".to_string());
            return Ok(Expr::new(
                ExprKind::Constant {
                    value: Constant::Str(value),
                    kind,
                },
                span,
            ));
        }

        let mut parts = Parts::default();
        for lit in &literals {
            if lit.prefix.fstring {
                self.fstring_body(lit.body, lit.body_offset, lit.prefix.raw, 0, false, &mut parts)?;
            } else {
                let text = self.decode_literal(lit)?;
                let body_span = Span::new(lit.body_offset, lit.body_offset + lit.body.len());
                parts.push_text(&text, body_span);
            }
        }
        Ok(parts.into_joined(span))
    }

    fn decode_literal(&self, lit: &Literal<'_>) -> PResult<String> {
        decode_str(lit.body, lit.prefix.raw)
            .map_err(|(msg, at)| self.error(msg, Span::empty_at(lit.body_offset + at)))
    }

    /// Scan an f-string body (or a format spec, when `in_spec`) starting at
    /// absolute offset `base`. Returns the index where scanning stopped: the
    /// end of `body`, or the `}` that closes a format spec.
    fn fstring_body(
        &self,
        body: &str,
        base: usize,
        raw: bool,
        depth: u32,
        in_spec: bool,
        out: &mut Parts,
    ) -> PResult<usize> {
        let bytes = body.as_bytes();
        let mut i = 0;
        while let Some(c) = body[i..].chars().next() {
            let here = Span::new(base + i, base + i + c.len_utf8());
            match c {
                '{' if bytes.get(i + 1) == Some(&b'{') => {
                    out.push_text("{", Span::new(base + i, base + i + 2));
                    i += 2;
                }
                '{' => {
                    if depth >= MAX_FSTRING_DEPTH {
                        return Err(self.error("f-string: expressions nested too deeply", here));
                    }
                    i = self.replacement_field(body, base, i, raw, depth, out)?;
                }
                '}' if in_spec => return Ok(i),
                '}' if bytes.get(i + 1) == Some(&b'}') => {
                    out.push_text("}", Span::new(base + i, base + i + 2));
                    i += 2;
                }
                '}' => return Err(self.error("f-string: single '}' is not allowed", here)),
                '\\' if !raw => {
                    let (escape, used) = escape_at(&body[i + 1..], false)
                        .map_err(|msg| self.error(msg, here))?;
                    let span = Span::new(base + i, base + i + 1 + used);
                    match escape {
                        Escape::Char(ch) => out.push_text(ch.encode_utf8(&mut [0; 4]), span),
                        Escape::Byte(b) => out.push_text(char::from(b).encode_utf8(&mut [0; 4]), span),
                        Escape::Continuation => {}
                        Escape::Unknown => out.push_text("\\", span),
                    }
                    i += 1 + used;
                }
                _ => {
                    out.push_text(c.encode_utf8(&mut [0; 4]), here);
                    i += c.len_utf8();
                }
            }
        }
        Ok(i)
    }

    /// Parse the replacement field whose `{` is at `open`. Returns the index
    /// just past its closing `}`.
    fn replacement_field(
        &self,
        body: &str,
        base: usize,
        open: usize,
        raw: bool,
        depth: u32,
        out: &mut Parts,
    ) -> PResult<usize> {
        let bytes = body.as_bytes();
        let expr_start = open + 1;
        let expr_end = self.field_expression_end(body, base, expr_start)?;
        if body[expr_start..expr_end].trim().is_empty() {
            return Err(self.error(
                "f-string: empty expression not allowed",
                Span::new(base + open, base + expr_end),
            ));
        }
        let value = self
            .fexpr
            .parse_fexpr(Span::new(base + expr_start, base + expr_end))
            .map_err(fstring_error)?;

        let mut pos = expr_end;
        let mut debug_text = None;
        if bytes.get(pos) == Some(&b'=') {
            debug_text = Some((&body[expr_start..=pos], Span::new(base + expr_start, base + pos + 1)));
            pos += 1;
        }

        let mut conversion = None;
        if bytes.get(pos) == Some(&b'!') {
            match body[pos + 1..].chars().next() {
                Some(c @ ('r' | 's' | 'a')) => conversion = Some(c),
                _ => {
                    return Err(self.error(
                        "f-string: invalid conversion character: expected 's', 'r', or 'a'",
                        Span::new(base + pos, base + pos + 1),
                    ))
                }
            }
            pos += 2;
        }

        let mut format_spec = None;
        if bytes.get(pos) == Some(&b':') {
            let spec_start = pos + 1;
            let mut spec = Parts::default();
            let used = self.fstring_body(&body[spec_start..], base + spec_start, raw, depth + 1, true, &mut spec)?;
            pos = spec_start + used;
            let spec_span = Span::new(base + spec_start, base + pos);
            format_spec = Some(Box::new(spec.into_joined(spec_span)));
        }

        if bytes.get(pos) != Some(&b'}') {
            return Err(self.error(
                "f-string: expecting '}'",
                Span::new(base + open, base + pos),
            ));
        }
        pos += 1;

        if let Some((text, span)) = debug_text {
            out.push_text(text, span);
            if conversion.is_none() && format_spec.is_none() {
                conversion = Some('r');
            }
        }
        out.push_field(Expr::new(
            ExprKind::FormattedValue {
                value: Box::new(value),
                conversion,
                format_spec,
            },
            Span::new(base + open, base + pos),
        ));
        Ok(pos)
    }

    /// Find where the expression of a replacement field ends: the first `!`,
    /// `:`, `=` or `}` outside brackets and nested strings. Comparison
    /// operators containing `=` do not end it.
    fn field_expression_end(&self, body: &str, base: usize, start: usize) -> PResult<usize> {
        let bytes = body.as_bytes();
        let mut depth = 0usize;
        let mut quote: Option<(u8, bool)> = None;
        let mut i = start;
        while i < bytes.len() {
            let b = bytes[i];
            let here = Span::new(base + i, base + i + 1);
            if let Some((q, triple)) = quote {
                if triple && body[i..].as_bytes().starts_with(&[q, q, q]) {
                    quote = None;
                    i += 3;
                    continue;
                }
                if !triple && b == q {
                    quote = None;
                }
                i += 1;
                continue;
            }
            let next = bytes.get(i + 1).copied();
            match b {
                b'\\' => {
                    return Err(self.error(
                        "f-string expression part cannot include a backslash",
                        here,
                    ))
                }
                b'#' => {
                    return Err(self.error("f-string expression part cannot include '#'", here))
                }
                b'\'' | b'"' => {
                    let triple = body[i..].as_bytes().starts_with(&[b, b, b]);
                    quote = Some((b, triple));
                    i += if triple { 3 } else { 1 };
                    continue;
                }
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' if depth > 0 => depth -= 1,
                b'}' => return Ok(i),
                b')' | b']' => {
                    return Err(self.error(
                        format!("f-string: unmatched '{}'", char::from(b)),
                        here,
                    ))
                }
                b'=' | b'!' | b'<' | b'>' if next == Some(b'=') => {
                    i += 2;
                    continue;
                }
                b'!' | b':' | b'=' if depth == 0 => return Ok(i),
                _ => {}
            }
            i += 1;
        }
        if quote.is_some() {
            return Err(self.error(
                "f-string: unterminated string",
                Span::empty_at(base + bytes.len()),
            ));
        }
        Err(self.error(
            "f-string: expecting '}'",
            Span::empty_at(base + bytes.len()),
        ))
    }
}

fn first_prefix(literals: &[Literal<'_>]) -> Prefix {
    literals.first().map(|lit| lit.prefix).unwrap_or_default()
}

fn fstring_error(mut err: SyntaxError) -> SyntaxError {
    if !err.message.starts_with("f-string") {
        err.message = format!("f-string: {}", err.message);
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_handles_prefixes_and_triple_quotes() {
        let lit = split_literal("rb'x'", 10);
        assert!(lit.prefix.raw && lit.prefix.bytes);
        assert_eq!(lit.body, "x");
        assert_eq!(lit.body_offset, 13);

        let lit = split_literal("'''a'b'''", 0);
        assert_eq!(lit.body, "a'b");

        let lit = split_literal("''", 0);
        assert_eq!(lit.body, "");

        let lit = split_literal("''''''", 0);
        assert_eq!(lit.body, "");
    }

    #[test]
    fn escapes_decode() {
        assert_eq!(decode_str(r"a\tb\n", false).unwrap(), "a\tb\n");
        assert_eq!(decode_str(r"\x41\101é", false).unwrap(), "AAé");
        assert_eq!(decode_str(r"\U0001F600", false).unwrap(), "\u{1F600}");
        assert_eq!(decode_str("a\\\nb", false).unwrap(), "ab");
        assert_eq!(decode_str(r"\d", false).unwrap(), r"\d");
        assert_eq!(decode_str(r"\n", true).unwrap(), r"\n");
    }

    #[test]
    fn truncated_escapes_fail() {
        let (msg, at) = decode_str(r"ab\x4", false).unwrap_err();
        assert_eq!(msg, "truncated \\xXX escape");
        assert_eq!(at, 2);
        assert!(decode_str(r"\u12", false).is_err());
    }

    #[test]
    fn bytes_decode() {
        assert_eq!(decode_bytes(r"\xff\x00a", false).unwrap(), vec![0xff, 0, b'a']);
        assert_eq!(decode_bytes(r"\u1234", false).unwrap(), br"\u1234".to_vec());
        let (msg, _) = decode_bytes("é", false).unwrap_err();
        assert_eq!(msg, "bytes can only contain ASCII literal characters");
    }
}
