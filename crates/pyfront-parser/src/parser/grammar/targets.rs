// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Assignment and deletion targets.
//!
//! Targets reuse the expression trailers, but only a chain that ends in an
//! attribute or subscript can be assigned to, and a call may only appear in
//! the middle of the chain.

use crate::ast::{Expr, ExprContext};
use crate::parser::engine::{req, Parser};
use crate::parser::errors::PResult;
use crate::parser::memo::RuleId;
use crate::tokenizer::TokenKind;

impl<'t> Parser<'t> {
    /// `star_target !',' | star_target (',' star_target)* [',']`
    pub(super) fn star_targets(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::StarTargets, |p| {
            let targets = req!(p.comma_sequence(Self::star_target));
            Ok(Some(targets.with_context(ExprContext::Store)))
        })
    }

    /// `'*' (!'*' star_target) | target_with_star_atom`
    pub(super) fn star_target(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::StarTarget, |p| {
            if !p.at(TokenKind::Star)? {
                return p.target_with_star_atom();
            }
            let start = p.start();
            p.tokens.next();
            if p.at(TokenKind::Star)? {
                return Ok(None);
            }
            let inner = req!(p.star_target());
            let span = p.span_from(start);
            Ok(Some(p.ast().starred(inner, span).with_context(ExprContext::Store)))
        })
    }

    fn target_with_star_atom(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::TargetWithStarAtom, |p| {
            if let Some(target) = p.single_subscript_attribute_target()? {
                return Ok(Some(target));
            }
            p.star_atom()
        })
    }

    /// `NAME | '(' target_with_star_atom ')' | '(' [star_targets_tuple_seq] ')' | '[' [star_targets_list_seq] ']'`
    fn star_atom(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::StarAtom, |p| {
            let start = p.start();
            match p.peek()?.kind {
                TokenKind::LPar => {
                    let grouped = p.attempt(|p| {
                        p.tokens.next();
                        let inner = req!(p.target_with_star_atom());
                        req!(p.expect(TokenKind::RPar));
                        Ok(Some(inner))
                    })?;
                    if grouped.is_some() {
                        return Ok(grouped);
                    }
                    p.attempt(|p| {
                        p.tokens.next();
                        let mut elts = Vec::new();
                        if !p.at(TokenKind::RPar)? {
                            elts.push(req!(p.star_target()));
                            req!(p.expect(TokenKind::Comma));
                            if let Some(rest) = p.gather(TokenKind::Comma, Self::star_target)? {
                                elts.extend(rest);
                                p.expect(TokenKind::Comma)?;
                            }
                        }
                        req!(p.expect(TokenKind::RPar));
                        let span = p.span_from(start);
                        Ok(Some(p.ast().tuple(elts, span).with_context(ExprContext::Store)))
                    })
                }
                TokenKind::LSqb => p.attempt(|p| {
                    p.tokens.next();
                    let elts = p.gather(TokenKind::Comma, Self::star_target)?.unwrap_or_default();
                    if !elts.is_empty() {
                        p.expect(TokenKind::Comma)?;
                    }
                    req!(p.expect(TokenKind::RSqb));
                    let span = p.span_from(start);
                    Ok(Some(p.ast().list(elts, span).with_context(ExprContext::Store)))
                }),
                _ => Ok(p.name()?.map(|name| name.with_context(ExprContext::Store))),
            }
        })
    }

    /// `single_subscript_attribute_target | NAME | '(' single_target ')'`
    pub(super) fn single_target(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::SingleTarget, |p| {
            if let Some(target) = p.single_subscript_attribute_target()? {
                return Ok(Some(target));
            }
            if p.at(TokenKind::LPar)? {
                return p.attempt(|p| {
                    p.tokens.next();
                    let inner = req!(p.single_target());
                    req!(p.expect(TokenKind::RPar));
                    Ok(Some(inner))
                });
            }
            Ok(p.name()?.map(|name| name.with_context(ExprContext::Store)))
        })
    }

    /// `t_primary '.' NAME !t_lookahead | t_primary '[' slices ']' !t_lookahead`
    pub(super) fn single_subscript_attribute_target(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::SingleSubscriptAttributeTarget, |p| {
            let start = p.start();
            let value = req!(p.t_primary());
            if !matches!(p.peek()?.kind, TokenKind::Dot | TokenKind::LSqb) {
                return Ok(None);
            }
            let trailer = req!(p.trailer());
            if p.at_t_lookahead()? {
                return Ok(None);
            }
            let target = p.apply_trailer(value, trailer, start)?;
            Ok(Some(target.with_context(ExprContext::Store)))
        })
    }

    /// The longest primary that is still followed by `(`, `[` or `.`.
    fn t_primary(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::TPrimary, |p| {
            let start = p.start();
            let mut value = req!(p.atom());
            if !p.at_t_lookahead()? {
                return Ok(None);
            }
            loop {
                let mark = p.mark();
                let Some(trailer) = p.trailer()? else {
                    break;
                };
                if !p.at_t_lookahead()? {
                    p.reset(mark);
                    break;
                }
                value = p.apply_trailer(value, trailer, start)?;
            }
            Ok(Some(value))
        })
    }

    fn at_t_lookahead(&mut self) -> PResult<bool> {
        Ok(matches!(
            self.peek()?.kind,
            TokenKind::LPar | TokenKind::LSqb | TokenKind::Dot
        ))
    }

    /// `','.del_target+ [',']`
    pub(super) fn del_targets(&mut self) -> PResult<Option<Vec<Expr>>> {
        let targets = req!(self.gather(TokenKind::Comma, Self::del_target));
        self.expect(TokenKind::Comma)?;
        Ok(Some(targets))
    }

    /// `single_subscript_attribute_target | del_t_atom`, in `Del` context.
    fn del_target(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::DelTarget, |p| {
            if let Some(target) = p.single_subscript_attribute_target()? {
                return Ok(Some(target.with_context(ExprContext::Del)));
            }
            p.del_t_atom()
        })
    }

    /// `NAME | '(' del_target ')' | '(' [del_targets] ')' | '[' [del_targets] ']'`
    fn del_t_atom(&mut self) -> PResult<Option<Expr>> {
        let start = self.start();
        match self.peek()?.kind {
            TokenKind::LPar => {
                let grouped = self.attempt(|p| {
                    p.tokens.next();
                    let inner = req!(p.del_target());
                    req!(p.expect(TokenKind::RPar));
                    Ok(Some(inner))
                })?;
                if grouped.is_some() {
                    return Ok(grouped);
                }
                self.attempt(|p| {
                    p.tokens.next();
                    let elts = p.del_targets()?.unwrap_or_default();
                    req!(p.expect(TokenKind::RPar));
                    let span = p.span_from(start);
                    Ok(Some(p.ast().tuple(elts, span).with_context(ExprContext::Del)))
                })
            }
            TokenKind::LSqb => self.attempt(|p| {
                p.tokens.next();
                let elts = p.del_targets()?.unwrap_or_default();
                req!(p.expect(TokenKind::RSqb));
                let span = p.span_from(start);
                Ok(Some(p.ast().list(elts, span).with_context(ExprContext::Del)))
            }),
            _ => Ok(self.name()?.map(|name| name.with_context(ExprContext::Del))),
        }
    }
}
