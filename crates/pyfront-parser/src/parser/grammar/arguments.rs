// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Call arguments and the parameter lists of `def` and `lambda`.

use crate::ast::{Arg, Expr, ParameterList};
use crate::builder::{CallArg, ParamParts, RawParam, SlashWithDefault, StarEtc};
use crate::parser::engine::{req, Parser};
use crate::parser::errors::PResult;
use crate::parser::keywords::is_reserved;
use crate::tokenizer::{Mark, TokenKind};

impl<'t> Parser<'t> {
    // ------------------------------------------------------------------
    // Call arguments
    // ------------------------------------------------------------------

    /// `','.arg+ [','] &')'`
    ///
    /// Ordering rules (no positional argument after a keyword, and so on) are
    /// checked when the call node is built.
    pub(super) fn arguments(&mut self) -> PResult<Option<Vec<CallArg>>> {
        self.attempt(|p| {
            let items = req!(p.gather(TokenKind::Comma, Self::argument));
            p.expect(TokenKind::Comma)?;
            if !p.at(TokenKind::RPar)? {
                return Ok(None);
            }
            Ok(Some(items))
        })
    }

    /// `'*' expression | '**' expression | NAME '=' expression | (assignment_expression | expression !':=') !'='`
    pub(super) fn argument(&mut self) -> PResult<Option<CallArg>> {
        let start = self.start();
        match self.peek()?.kind {
            TokenKind::Star => {
                let starred = req!(self.starred(Self::expression));
                Ok(Some(CallArg::Positional(starred)))
            }
            TokenKind::DoubleStar => self.attempt(|p| {
                p.tokens.next();
                let value = req!(p.expression());
                let span = p.span_from(start);
                Ok(Some(CallArg::Keyword(p.ast().keyword(None, value, span))))
            }),
            TokenKind::Name if self.peek_nth(1)?.kind == TokenKind::Equal => self.attempt(|p| {
                let name = p.tokens.next();
                let arg = p.text(&name);
                if is_reserved(arg) {
                    if p.call_invalid_rules {
                        return Err(p.error_at(
                            format!("cannot assign to {}", arg),
                            name.span,
                        ));
                    }
                    return Ok(None);
                }
                p.tokens.next();
                let value = req!(p.expression());
                let span = p.span_from(start);
                Ok(Some(CallArg::Keyword(p.ast().keyword(Some(arg), value, span))))
            }),
            _ => self.attempt(|p| {
                let value = req!(p.assignment_or_expression());
                if p.at(TokenKind::Equal)? {
                    if p.call_invalid_rules {
                        p.invalid_kwarg(&value)?;
                    }
                    return Ok(None);
                }
                Ok(Some(CallArg::Positional(value)))
            }),
        }
    }

    // ------------------------------------------------------------------
    // Parameters
    // ------------------------------------------------------------------

    /// A parameter list ending just before `closer` (`)` for `def`, `:` for
    /// `lambda`). `annotations` allows `name: expression` parameters.
    ///
    /// The closer itself is not consumed. Returns `None` when the list is
    /// malformed; the diagnostic pass explains why.
    pub(super) fn parameters(
        &mut self,
        closer: TokenKind,
        annotations: bool,
    ) -> PResult<Option<ParameterList>> {
        self.attempt(|p| {
            let mut positional: Vec<(Arg, Option<Expr>)> = Vec::new();
            let mut slash = None;
            let mut star: Option<StarEtc> = None;
            let mut bare_star = false;

            while !p.at(closer)? {
                match p.peek()?.kind {
                    TokenKind::Slash => {
                        if slash.is_some() || star.is_some() || positional.is_empty() {
                            return Ok(None);
                        }
                        p.tokens.next();
                        slash = Some(positional.len());
                    }
                    TokenKind::Star => {
                        if star.is_some() {
                            return Ok(None);
                        }
                        p.tokens.next();
                        let mut etc = StarEtc::default();
                        if p.at(TokenKind::Comma)? {
                            bare_star = true;
                        } else {
                            etc.vararg = Some(req!(p.param(annotations)));
                        }
                        star = Some(etc);
                    }
                    TokenKind::DoubleStar => {
                        p.tokens.next();
                        let mut kwarg = req!(p.param(annotations));
                        p.expect(TokenKind::Comma)?;
                        kwarg.type_comment = p.param_type_comment()?;
                        if !p.at(closer)? {
                            return Ok(None);
                        }
                        star.get_or_insert_with(StarEtc::default).kwarg = Some(kwarg);
                        break;
                    }
                    _ => {
                        let arg = req!(p.param(annotations));
                        let default = if p.expect(TokenKind::Equal)?.is_some() {
                            Some(req!(p.expression()))
                        } else {
                            None
                        };
                        match star.as_mut() {
                            Some(etc) => {
                                etc.kwonly.push((arg, default));
                            }
                            None => {
                                let after_default =
                                    positional.last().is_some_and(|(_, d)| d.is_some());
                                if after_default && default.is_none() {
                                    return Ok(None);
                                }
                                positional.push((arg, default));
                            }
                        }
                    }
                }
                let comma = p.expect(TokenKind::Comma)?.is_some();
                let comment = p.param_type_comment()?;
                if let Some(comment) = comment {
                    attach_type_comment(&mut positional, star.as_mut(), comment);
                }
                if !comma {
                    break;
                }
            }
            if !p.at(closer)? {
                return Ok(None);
            }
            if bare_star && star.as_ref().is_some_and(|etc| etc.kwonly.is_empty()) {
                return Ok(None);
            }
            Ok(Some(p.ast().parameters(split_positional(positional, slash, star))))
        })
    }

    /// `NAME [':' expression]`
    fn param(&mut self, annotations: bool) -> PResult<Option<Arg>> {
        self.attempt(|p| {
            let start = p.start();
            let name = req!(p.name_token());
            let annotation = if annotations && p.expect(TokenKind::Colon)?.is_some() {
                Some(req!(p.expression()))
            } else {
                None
            };
            let span = p.span_from(start);
            Ok(Some(p.ast().arg(p.text(&name), annotation, None, span)))
        })
    }

    /// A `# type:` comment closing the line of the previous token, when the
    /// next token starts a new line.
    fn param_type_comment(&mut self) -> PResult<Option<String>> {
        let Some(prev) = self.tokens.previous() else {
            return Ok(None);
        };
        let next = self.peek()?;
        if next.start_line <= prev.end_line {
            return Ok(None);
        }
        Ok(self.tokens.type_comment_on(prev.end_line).map(str::to_string))
    }

    /// Explain a malformed parameter list starting at `mark`. Scans the raw
    /// tokens up to `closer` and reports the first ordering problem found.
    pub(super) fn invalid_parameters(&mut self, mark: Mark, closer: TokenKind) -> PResult<()> {
        let resume = self.mark();
        self.reset(mark);
        let mut raw = Vec::new();
        let mut entry: Option<RawParam> = None;
        let mut previous = None;
        let mut depth = 0usize;
        loop {
            let tok = self.peek()?;
            if depth == 0 && (tok.kind == closer || tok.kind == TokenKind::EndMarker) {
                break;
            }
            match tok.kind {
                TokenKind::LPar | TokenKind::LSqb | TokenKind::LBrace => depth += 1,
                TokenKind::RPar | TokenKind::RSqb | TokenKind::RBrace => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                _ if depth > 0 => {}
                TokenKind::Newline => break,
                TokenKind::Comma => raw.extend(entry.take()),
                TokenKind::Slash if entry.is_none() => entry = Some(RawParam::Slash(tok.span)),
                TokenKind::Star if entry.is_none() => {
                    entry = Some(RawParam::Star {
                        span: tok.span,
                        named: false,
                        has_default: false,
                    })
                }
                TokenKind::DoubleStar if entry.is_none() => {
                    entry = Some(RawParam::DoubleStar {
                        span: tok.span,
                        has_default: false,
                    })
                }
                TokenKind::Name => match entry.as_mut() {
                    None => {
                        entry = Some(RawParam::Plain {
                            span: tok.span,
                            has_default: false,
                        })
                    }
                    Some(RawParam::Star { named, .. }) if previous == Some(TokenKind::Star) => {
                        *named = true;
                    }
                    _ => {}
                },
                TokenKind::Equal => match entry.as_mut() {
                    Some(RawParam::Plain { has_default, .. })
                    | Some(RawParam::Star { has_default, .. })
                    | Some(RawParam::DoubleStar { has_default, .. }) => *has_default = true,
                    _ => {}
                },
                _ => {}
            }
            previous = Some(tok.kind);
            self.tokens.next();
        }
        raw.extend(entry);
        self.reset(resume);
        self.ast().check_raw_parameters(&raw)
    }
}

/// Give `comment` to the parameter parsed last.
fn attach_type_comment(
    positional: &mut [(Arg, Option<Expr>)],
    star: Option<&mut StarEtc>,
    comment: String,
) {
    let last = match star {
        Some(etc) => match etc.kwonly.last_mut() {
            Some((arg, _)) => Some(arg),
            None => etc.vararg.as_mut(),
        },
        None => positional.last_mut().map(|(arg, _)| arg),
    };
    if let Some(arg) = last {
        if arg.type_comment.is_none() {
            arg.type_comment = Some(comment);
        }
    }
}

/// Sort positional parameters into the groups [`ParamParts`] expects.
/// `slash` is the number of parameters before `/`, if present.
fn split_positional(
    positional: Vec<(Arg, Option<Expr>)>,
    slash: Option<usize>,
    star_etc: Option<StarEtc>,
) -> ParamParts {
    let mut parts = ParamParts {
        star_etc,
        ..ParamParts::default()
    };
    let mut posonly = Vec::new();
    for (i, (arg, default)) in positional.into_iter().enumerate() {
        if slash.is_some_and(|n| i < n) {
            posonly.push((arg, default));
            continue;
        }
        match default {
            Some(default) => parts.with_default.push((arg, default)),
            None => parts.no_default.push(arg),
        }
    }
    if posonly.iter().all(|(_, d)| d.is_none()) {
        parts.slash_no_default = posonly.into_iter().map(|(arg, _)| arg).collect();
    } else {
        let mut group = SlashWithDefault::default();
        for (arg, default) in posonly {
            match default {
                Some(default) => group.defaulted.push((arg, default)),
                None => group.plain.push(arg),
            }
        }
        parts.slash_with_default = Some(group);
    }
    parts
}
