// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Diagnostic rules.
//!
//! These run only on the second pass, after the regular grammar has already
//! failed somewhere in the input. Each rule recognizes one common mistake
//! and raises a precise error for it; when the shape does not match, the
//! rule restores the cursor and returns `Ok(())` so that parsing goes on.

use pyfront_core::Span;

use crate::ast::{CmpOp, Expr, ExprKind, Operator};
use crate::parser::engine::Parser;
use crate::parser::errors::PResult;
use crate::tokenizer::{Mark, TokenKind};

impl<'t> Parser<'t> {
    /// `a ':=' expression` where `a` is not a name, and `a '=' b` where a
    /// comparison or walrus was probably meant.
    pub(super) fn invalid_named_expression(&mut self) -> PResult<()> {
        let mark = self.mark();
        if let Some(target) = self.expression()? {
            if self.at(TokenKind::ColonEqual)? && !matches!(target.kind, ExprKind::Name { .. }) {
                return Err(self.error_at(
                    format!(
                        "cannot use assignment expressions with {}",
                        target.describe()
                    ),
                    target.span,
                ));
            }
        }
        self.reset(mark);

        let first = self.peek()?;
        let excluded = matches!(first.kind, TokenKind::LPar | TokenKind::LSqb)
            || (first.kind == TokenKind::Name
                && matches!(self.text(&first), "True" | "False" | "None"));
        if let Some(target) = self.bitwise_or()? {
            if self.expect(TokenKind::Equal)?.is_some()
                && self.bitwise_or()?.is_some()
                && !matches!(self.peek()?.kind, TokenKind::Equal | TokenKind::ColonEqual)
            {
                if matches!(target.kind, ExprKind::Name { .. }) {
                    return Err(self.error_at(
                        "invalid syntax. Maybe you meant '==' or ':=' instead of '='?",
                        self.span_from(target.span.start),
                    ));
                }
                if !excluded {
                    return Err(self.error_at(
                        format!(
                            "cannot assign to {} here. Maybe you meant '==' instead of '='?",
                            target.describe()
                        ),
                        target.span,
                    ));
                }
            }
        }
        self.reset(mark);
        Ok(())
    }

    /// A keyword argument whose "name" is an arbitrary expression.
    pub(super) fn invalid_kwarg(&mut self, value: &Expr) -> PResult<()> {
        let equal = self.peek()?;
        Err(self.error_at(
            "expression cannot contain assignment, perhaps you meant \"==\"?",
            Span::new(value.span.start, equal.span.end),
        ))
    }

    /// Call arguments that did not reach the closing parenthesis, starting
    /// at `mark` (just after the `(`).
    pub(super) fn invalid_arguments(&mut self, mark: Mark) -> PResult<()> {
        let resume = self.mark();
        self.reset(mark);
        let mut count = 0;
        loop {
            let start = self.start();
            if self.argument()?.is_none() {
                break;
            }
            count += 1;
            if self.at_keyword("for")? || self.at(TokenKind::Async)? {
                if self.for_if_clauses()?.is_some() && (count > 1 || self.at(TokenKind::Comma)?) {
                    return Err(self.error_at(
                        "Generator expression must be parenthesized",
                        self.span_from(start),
                    ));
                }
                break;
            }
            if self.expect(TokenKind::Comma)?.is_none() {
                break;
            }
        }
        self.reset(resume);
        Ok(())
    }

    /// `'for' star_expressions` that is not a valid loop target.
    pub(super) fn invalid_for_target(&mut self, mark: Mark) -> PResult<()> {
        let resume = self.mark();
        self.reset(mark);
        let target = self.star_expressions()?;
        self.reset(resume);
        let Some(target) = target else {
            return Ok(());
        };
        match self.invalid_for_target_part(&target) {
            Some(bad) => Err(self.error_at(format!("cannot assign to {}", bad.describe()), bad.span)),
            None => Ok(()),
        }
    }

    /// `x in y` parses as a comparison; only its left operand is the target.
    fn invalid_for_target_part<'e>(&self, expr: &'e Expr) -> Option<&'e Expr> {
        match &expr.kind {
            ExprKind::Compare { left, ops, .. } if ops.first() == Some(&CmpOp::In) => {
                self.ast().invalid_target(left, false)
            }
            ExprKind::Tuple { elts, .. } => elts
                .iter()
                .find_map(|elt| self.invalid_for_target_part(elt)),
            _ => self.ast().invalid_target(expr, false),
        }
    }

    /// Annotations of tuples and non-targets, assignments to non-targets,
    /// and augmented assignments to anything but a single target.
    pub(super) fn invalid_assignment(&mut self) -> PResult<()> {
        let mark = self.mark();

        if let Some(target) = self.star_expressions()? {
            let single = matches!(
                target.kind,
                ExprKind::Name { .. } | ExprKind::Attribute { .. } | ExprKind::Subscript { .. }
            );
            if !single
                && self.expect(TokenKind::Colon)?.is_some()
                && self.expression()?.is_some()
            {
                let message = match target.kind {
                    ExprKind::Tuple { .. } => "only single target (not tuple) can be annotated",
                    ExprKind::List { .. } => "only single target (not list) can be annotated",
                    _ => "illegal target for annotation",
                };
                return Err(self.error_at(message, target.span));
            }
            if !single && Operator::from_augassign(self.peek()?.kind).is_some() {
                return Err(self.error_at(
                    format!(
                        "'{}' is an illegal expression for augmented assignment",
                        target.describe()
                    ),
                    target.span,
                ));
            }
        }
        self.reset(mark);

        loop {
            let target = match self.yield_expr()? {
                Some(value) => {
                    if self.at(TokenKind::Equal)? {
                        return Err(self.error_at(
                            "assignment to yield expression not possible",
                            value.span,
                        ));
                    }
                    break;
                }
                None => match self.star_expressions()? {
                    Some(target) => target,
                    None => break,
                },
            };
            if self.expect(TokenKind::Equal)?.is_none() {
                break;
            }
            if let Some(bad) = self.ast().invalid_target(&target, false) {
                return Err(self.error_at(
                    format!("cannot assign to {}", bad.describe()),
                    bad.span,
                ));
            }
        }
        self.reset(mark);
        Ok(())
    }

    /// `'del' star_expressions` where something cannot be deleted.
    pub(super) fn invalid_del_stmt(&mut self) -> PResult<()> {
        let mark = self.mark();
        if self.keyword("del")?.is_some() {
            if let Some(targets) = self.star_expressions()? {
                if let Some(bad) = self.ast().invalid_target(&targets, true) {
                    return Err(self.error_at(
                        format!("cannot delete {}", bad.describe()),
                        bad.span,
                    ));
                }
            }
        }
        self.reset(mark);
        Ok(())
    }
}
