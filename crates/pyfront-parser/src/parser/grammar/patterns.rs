// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The `match` statement and its patterns.
//!
//! `match`, `case` and `_` are soft keywords: every rule here gives up
//! quietly on the first pass so that `match(x)` and `case = 1` still parse
//! as ordinary statements.

use crate::ast::{
    Constant, Expr, ExprKind, MatchCase, Operator, Pattern, PatternKind, Stmt, UnaryOp,
};
use crate::parser::engine::{req, Parser};
use crate::parser::errors::{PResult, SyntaxError};
use crate::parser::memo::RuleId;
use crate::tokenizer::TokenKind;

impl<'t> Parser<'t> {
    /// `"match" subject_expr ':' NEWLINE INDENT case_block+ DEDENT`
    pub(super) fn match_stmt(&mut self) -> PResult<Option<Stmt>> {
        self.attempt(|p| {
            let start = p.start();
            let tok = req!(p.soft_keyword("match"));
            let subject = req!(p.subject_expr());
            req!(p.expect(TokenKind::Colon));
            req!(p.expect(TokenKind::Newline));
            if p.expect(TokenKind::Indent)?.is_none() {
                if p.call_invalid_rules {
                    let next = p.peek()?;
                    return Err(SyntaxError::grammar(
                        format!(
                            "expected an indented block after 'match' statement on line {}",
                            tok.start_line
                        ),
                        &next,
                    ));
                }
                return Ok(None);
            }
            let cases = req!(p.repeat1(Self::case_block));
            req!(p.expect(TokenKind::Dedent));
            let span = p.span_from(start);
            Ok(Some(p.ast().match_stmt(subject, cases, span)))
        })
    }

    /// `star_named_expression ',' star_named_expressions? | named_expression`
    fn subject_expr(&mut self) -> PResult<Option<Expr>> {
        let tuple = self.attempt(|p| {
            let start = p.start();
            let first = req!(p.star_named_expression());
            req!(p.expect(TokenKind::Comma));
            let mut elts = vec![first];
            if let Some(rest) = p.star_named_expressions()? {
                elts.extend(rest);
            }
            let span = p.span_from(start);
            Ok(Some(p.ast().tuple(elts, span)))
        })?;
        if tuple.is_some() {
            return Ok(tuple);
        }
        self.named_expression()
    }

    /// `"case" patterns ['if' named_expression] ':' block`
    fn case_block(&mut self) -> PResult<Option<MatchCase>> {
        self.attempt(|p| {
            let tok = req!(p.soft_keyword("case"));
            let pattern = req!(p.patterns());
            let guard = if p.keyword("if")?.is_some() {
                Some(req!(p.named_expression()))
            } else {
                None
            };
            req!(p.block_colon());
            let body = req!(p.block_after("'case' statement", tok.start_line));
            Ok(Some(p.ast().match_case(pattern, guard, body)))
        })
    }

    /// `open_sequence_pattern | pattern`
    fn patterns(&mut self) -> PResult<Option<Pattern>> {
        let start = self.start();
        let open = self.attempt(|p| {
            let first = req!(p.maybe_star_pattern());
            req!(p.expect(TokenKind::Comma));
            let mut patterns = vec![first];
            if let Some(rest) = p.maybe_sequence_pattern()? {
                patterns.extend(rest);
            }
            let span = p.span_from(start);
            Ok(Some(p.ast().pattern(PatternKind::MatchSequence { patterns }, span)))
        })?;
        if open.is_some() {
            return Ok(open);
        }
        self.pattern()
    }

    /// `as_pattern | or_pattern`
    fn pattern(&mut self) -> PResult<Option<Pattern>> {
        self.memoize(RuleId::Pattern, |p| {
            let start = p.start();
            let pattern = req!(p.or_pattern());
            let mark = p.mark();
            if p.keyword("as")?.is_none() {
                return Ok(Some(pattern));
            }
            let target = p.peek()?;
            if target.kind == TokenKind::Name && p.text(&target) == "_" {
                if p.call_invalid_rules {
                    return Err(p.error_at("cannot use '_' as a target", target.span));
                }
                p.reset(mark);
                return Ok(Some(pattern));
            }
            let Some(name) = p.capture_target()? else {
                if p.call_invalid_rules {
                    let at = p.start();
                    if p.expression()?.is_some() {
                        return Err(p.error_at("invalid pattern target", p.span_from(at)));
                    }
                }
                p.reset(mark);
                return Ok(Some(pattern));
            };
            let span = p.span_from(start);
            Ok(Some(p.ast().pattern(
                PatternKind::MatchAs {
                    pattern: Some(Box::new(pattern)),
                    name: Some(name),
                },
                span,
            )))
        })
    }

    /// `'|'.closed_pattern+`
    fn or_pattern(&mut self) -> PResult<Option<Pattern>> {
        let start = self.start();
        let mut patterns = req!(self.gather(TokenKind::VBar, Self::closed_pattern));
        if patterns.len() == 1 {
            return Ok(patterns.pop());
        }
        let span = self.span_from(start);
        Ok(Some(self.ast().pattern(PatternKind::MatchOr { patterns }, span)))
    }

    fn closed_pattern(&mut self) -> PResult<Option<Pattern>> {
        self.memoize(RuleId::ClosedPattern, |p| {
            let start = p.start();
            let tok = p.peek()?;
            match tok.kind {
                TokenKind::LPar => p.paren_pattern(),
                TokenKind::LSqb => p.attempt(|p| {
                    p.tokens.next();
                    let patterns = p.maybe_sequence_pattern()?.unwrap_or_default();
                    req!(p.expect(TokenKind::RSqb));
                    let span = p.span_from(start);
                    Ok(Some(p.ast().pattern(PatternKind::MatchSequence { patterns }, span)))
                }),
                TokenKind::LBrace => p.mapping_pattern(),
                TokenKind::Name => {
                    match p.text(&tok) {
                        "None" | "True" | "False" => {
                            p.tokens.next();
                            let value = match p.text(&tok) {
                                "None" => Constant::None,
                                word => Constant::Bool(word == "True"),
                            };
                            return Ok(Some(
                                p.ast().pattern(PatternKind::MatchSingleton { value }, tok.span),
                            ));
                        }
                        "_" if !matches!(
                            p.peek_nth(1)?.kind,
                            TokenKind::Dot | TokenKind::LPar | TokenKind::Equal
                        ) =>
                        {
                            p.tokens.next();
                            return Ok(Some(p.ast().pattern(
                                PatternKind::MatchAs {
                                    pattern: None,
                                    name: None,
                                },
                                tok.span,
                            )));
                        }
                        _ => {}
                    }
                    if let Some(name) = p.capture_target()? {
                        let span = p.span_from(start);
                        return Ok(Some(p.ast().pattern(
                            PatternKind::MatchAs {
                                pattern: None,
                                name: Some(name),
                            },
                            span,
                        )));
                    }
                    let cls = req!(p.name_or_attr());
                    if p.at(TokenKind::LPar)? {
                        return p.class_pattern(cls, start);
                    }
                    if matches!(p.peek()?.kind, TokenKind::Dot | TokenKind::Equal)
                        || !matches!(cls.kind, ExprKind::Attribute { .. })
                    {
                        return Ok(None);
                    }
                    let span = p.span_from(start);
                    Ok(Some(p.ast().pattern(PatternKind::MatchValue { value: cls }, span)))
                }
                _ => {
                    let value = req!(p.literal_expr());
                    let span = p.span_from(start);
                    Ok(Some(p.ast().pattern(PatternKind::MatchValue { value }, span)))
                }
            }
        })
    }

    /// `!"_" NAME !('.' | '(' | '=')`
    fn capture_target(&mut self) -> PResult<Option<String>> {
        let tok = self.peek()?;
        if tok.kind != TokenKind::Name || self.text(&tok) == "_" {
            return Ok(None);
        }
        if matches!(
            self.peek_nth(1)?.kind,
            TokenKind::Dot | TokenKind::LPar | TokenKind::Equal
        ) {
            return Ok(None);
        }
        let Some(name) = self.name_token()? else {
            return Ok(None);
        };
        Ok(Some(self.text(&name).to_string()))
    }

    /// `NAME ('.' NAME)*`
    fn name_or_attr(&mut self) -> PResult<Option<Expr>> {
        self.attempt(|p| {
            let start = p.start();
            let mut value = req!(p.name());
            while p.at(TokenKind::Dot)? {
                p.tokens.next();
                let attr = req!(p.name_token());
                let span = p.span_from(start);
                value = p.ast().attribute(value, p.text(&attr), span);
            }
            Ok(Some(value))
        })
    }

    /// Signed numbers, complex literals, strings and the singletons, as
    /// expressions.
    fn literal_expr(&mut self) -> PResult<Option<Expr>> {
        let tok = self.peek()?;
        match tok.kind {
            TokenKind::String => self.strings(),
            TokenKind::Name => {
                let value = match self.text(&tok) {
                    "None" => Constant::None,
                    "True" => Constant::Bool(true),
                    "False" => Constant::Bool(false),
                    _ => return Ok(None),
                };
                self.tokens.next();
                Ok(Some(self.ast().constant(value, tok.span)))
            }
            TokenKind::Number | TokenKind::Minus => self.attempt(|p| {
                let start = p.start();
                let real = req!(p.signed_number());
                let op = match p.peek()?.kind {
                    TokenKind::Plus => Operator::Add,
                    TokenKind::Minus => Operator::Sub,
                    _ => return Ok(Some(real)),
                };
                p.tokens.next();
                let imag_tok = req!(p.expect(TokenKind::Number));
                let imag = p.ast().number(&imag_tok)?;
                if !matches!(
                    imag.kind,
                    ExprKind::Constant {
                        value: Constant::Complex { .. },
                        ..
                    }
                ) {
                    return Err(p.error_at("imaginary number required in complex literal", imag.span));
                }
                let span = p.span_from(start);
                Ok(Some(p.ast().bin_op(real, op, imag, span)))
            }),
            _ => Ok(None),
        }
    }

    /// `NUMBER | '-' NUMBER`
    fn signed_number(&mut self) -> PResult<Option<Expr>> {
        self.attempt(|p| {
            let start = p.start();
            let negative = p.expect(TokenKind::Minus)?.is_some();
            let tok = req!(p.expect(TokenKind::Number));
            let number = p.ast().number(&tok)?;
            if !negative {
                return Ok(Some(number));
            }
            let span = p.span_from(start);
            Ok(Some(p.ast().unary_op(UnaryOp::USub, number, span)))
        })
    }

    /// `'(' pattern ')' | '(' [open_sequence_pattern] ')'`
    fn paren_pattern(&mut self) -> PResult<Option<Pattern>> {
        let start = self.start();
        let group = self.attempt(|p| {
            req!(p.expect(TokenKind::LPar));
            let inner = req!(p.pattern());
            req!(p.expect(TokenKind::RPar));
            Ok(Some(inner))
        })?;
        if group.is_some() {
            return Ok(group);
        }
        self.attempt(|p| {
            req!(p.expect(TokenKind::LPar));
            let mut patterns = Vec::new();
            if !p.at(TokenKind::RPar)? {
                patterns.push(req!(p.maybe_star_pattern()));
                req!(p.expect(TokenKind::Comma));
                if let Some(rest) = p.maybe_sequence_pattern()? {
                    patterns.extend(rest);
                }
            }
            req!(p.expect(TokenKind::RPar));
            let span = p.span_from(start);
            Ok(Some(p.ast().pattern(PatternKind::MatchSequence { patterns }, span)))
        })
    }

    /// `','.maybe_star_pattern+ ','?`
    fn maybe_sequence_pattern(&mut self) -> PResult<Option<Vec<Pattern>>> {
        let patterns = req!(self.gather(TokenKind::Comma, Self::maybe_star_pattern));
        self.expect(TokenKind::Comma)?;
        Ok(Some(patterns))
    }

    /// `'*' (capture_target | '_') | pattern`
    fn maybe_star_pattern(&mut self) -> PResult<Option<Pattern>> {
        if !self.at(TokenKind::Star)? {
            return self.pattern();
        }
        self.attempt(|p| {
            let start = p.start();
            p.tokens.next();
            let tok = p.peek()?;
            let name = if tok.kind == TokenKind::Name && p.text(&tok) == "_" {
                p.tokens.next();
                None
            } else {
                Some(req!(p.capture_target()))
            };
            let span = p.span_from(start);
            Ok(Some(p.ast().pattern(PatternKind::MatchStar { name }, span)))
        })
    }

    /// `'{' [items_pattern] [','] ['**' capture_target] [','] '}'`
    fn mapping_pattern(&mut self) -> PResult<Option<Pattern>> {
        self.attempt(|p| {
            let start = p.start();
            req!(p.expect(TokenKind::LBrace));
            let mut keys = Vec::new();
            let mut patterns = Vec::new();
            let mut rest = None;
            while !p.at(TokenKind::RBrace)? {
                if p.expect(TokenKind::DoubleStar)?.is_some() {
                    rest = Some(req!(p.capture_target()));
                    p.expect(TokenKind::Comma)?;
                    break;
                }
                let key = match p.literal_expr()? {
                    Some(key) => key,
                    None => {
                        let key = req!(p.name_or_attr());
                        if !matches!(key.kind, ExprKind::Attribute { .. }) {
                            return Ok(None);
                        }
                        key
                    }
                };
                req!(p.expect(TokenKind::Colon));
                keys.push(key);
                patterns.push(req!(p.pattern()));
                if p.expect(TokenKind::Comma)?.is_none() {
                    break;
                }
            }
            req!(p.expect(TokenKind::RBrace));
            let span = p.span_from(start);
            Ok(Some(p.ast().pattern(
                PatternKind::MatchMapping {
                    keys,
                    patterns,
                    rest,
                },
                span,
            )))
        })
    }

    /// `name_or_attr '(' [positional_patterns] [keyword_patterns] [','] ')'`
    fn class_pattern(&mut self, cls: Expr, start: usize) -> PResult<Option<Pattern>> {
        req!(self.expect(TokenKind::LPar));
        let mut patterns = Vec::new();
        let mut kwd_attrs = Vec::new();
        let mut kwd_patterns = Vec::new();
        while !self.at(TokenKind::RPar)? {
            let tok = self.peek()?;
            if tok.kind == TokenKind::Name && self.peek_nth(1)?.kind == TokenKind::Equal {
                self.tokens.next();
                self.tokens.next();
                kwd_attrs.push(self.text(&tok).to_string());
                kwd_patterns.push(req!(self.pattern()));
            } else {
                let pattern = req!(self.pattern());
                if !kwd_attrs.is_empty() {
                    if self.call_invalid_rules {
                        return Err(self.error_at(
                            "positional patterns follow keyword patterns",
                            pattern.span,
                        ));
                    }
                    return Ok(None);
                }
                patterns.push(pattern);
            }
            if self.expect(TokenKind::Comma)?.is_none() {
                break;
            }
        }
        req!(self.expect(TokenKind::RPar));
        let span = self.span_from(start);
        Ok(Some(self.ast().pattern(
            PatternKind::MatchClass {
                cls,
                patterns,
                kwd_attrs,
                kwd_patterns,
            },
            span,
        )))
    }
}
