// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use crate::ast::{
    BoolOp, CmpOp, Comprehension, Constant, Expr, ExprKind, Operator, ParameterList, UnaryOp,
};
use crate::builder::{CallArg, DictEntry};
use crate::parser::engine::{req, Parser};
use crate::parser::errors::PResult;
use crate::parser::memo::RuleId;
use crate::tokenizer::TokenKind;

type Rule<'t, T> = fn(&mut Parser<'t>) -> PResult<Option<T>>;

/// A trailer applied to a primary: `.name`, `(args)` or `[slices]`.
pub(super) enum Trailer {
    Attribute(String),
    Call(Vec<CallArg>),
    Subscript(Expr),
}

impl<'t> Parser<'t> {
    // ------------------------------------------------------------------
    // Sequences
    // ------------------------------------------------------------------

    /// `elem (',' elem)* [',']`: a tuple, unless there is a single element
    /// and no comma.
    pub(super) fn comma_sequence(&mut self, elem: Rule<'t, Expr>) -> PResult<Option<Expr>> {
        let start = self.start();
        let first = req!(elem(self));
        if !self.at(TokenKind::Comma)? {
            return Ok(Some(first));
        }
        let mut elts = vec![first];
        while self.expect(TokenKind::Comma)?.is_some() {
            match elem(self)? {
                Some(elt) => elts.push(elt),
                None => break,
            }
        }
        let span = self.span_from(start);
        Ok(Some(self.ast().tuple(elts, span)))
    }

    pub(super) fn expressions(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::Expressions, |p| p.comma_sequence(Self::expression))
    }

    pub(super) fn star_expressions(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::StarExpressions, |p| {
            p.comma_sequence(Self::star_expression)
        })
    }

    /// `'*' bitwise_or | expression`
    pub(super) fn star_expression(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::StarExpression, |p| {
            if p.at(TokenKind::Star)? {
                return p.starred(Self::bitwise_or);
            }
            p.expression()
        })
    }

    /// `'*' bitwise_or | named_expression`
    pub(super) fn star_named_expression(&mut self) -> PResult<Option<Expr>> {
        if self.at(TokenKind::Star)? {
            return self.starred(Self::bitwise_or);
        }
        self.named_expression()
    }

    /// `','.star_named_expression+ [',']`
    pub(super) fn star_named_expressions(&mut self) -> PResult<Option<Vec<Expr>>> {
        let items = req!(self.gather(TokenKind::Comma, Self::star_named_expression));
        self.expect(TokenKind::Comma)?;
        Ok(Some(items))
    }

    /// `'*' operand`
    pub(super) fn starred(&mut self, operand: Rule<'t, Expr>) -> PResult<Option<Expr>> {
        self.attempt(|p| {
            let start = p.start();
            req!(p.expect(TokenKind::Star));
            let value = req!(operand(p));
            let span = p.span_from(start);
            Ok(Some(p.ast().starred(value, span)))
        })
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    /// `disjunction 'if' disjunction 'else' expression | disjunction | lambdef`
    pub(super) fn expression(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::Expression, |p| {
            if p.at_keyword("lambda")? {
                return p.lambdef();
            }
            let start = p.start();
            let body = req!(p.disjunction());
            let mark = p.mark();
            if p.keyword("if")?.is_some() {
                if let Some(test) = p.disjunction()? {
                    if p.keyword("else")?.is_some() {
                        if let Some(orelse) = p.expression()? {
                            let span = p.span_from(start);
                            return Ok(Some(p.ast().if_exp(body, test, orelse, span)));
                        }
                    } else if p.call_invalid_rules && !p.at(TokenKind::Colon)? {
                        return Err(p.error_at(
                            "expected 'else' after 'if' expression",
                            p.span_from(start),
                        ));
                    }
                }
                p.reset(mark);
            }
            Ok(Some(body))
        })
    }

    /// `'yield' 'from' expression | 'yield' [star_expressions]`
    pub(super) fn yield_expr(&mut self) -> PResult<Option<Expr>> {
        self.attempt(|p| {
            let start = p.start();
            req!(p.keyword("yield"));
            if p.keyword("from")?.is_some() {
                let value = req!(p.expression());
                let span = p.span_from(start);
                return Ok(Some(p.ast().yield_from(value, span)));
            }
            let value = p.star_expressions()?;
            let span = p.span_from(start);
            Ok(Some(p.ast().yield_expr(value, span)))
        })
    }

    /// `NAME ':=' ~ expression | expression !':='`
    pub(super) fn named_expression(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::NamedExpression, |p| {
            let start = p.start();
            let tok = p.peek()?;
            if tok.kind == TokenKind::Name && p.peek_nth(1)?.kind == TokenKind::ColonEqual {
                if let Some(target) = p.name()? {
                    p.expect(TokenKind::ColonEqual)?;
                    let value = req!(p.expression());
                    let span = p.span_from(start);
                    return Ok(Some(p.ast().named_expr(target, value, span)));
                }
            }
            if p.call_invalid_rules {
                p.invalid_named_expression()?;
            }
            let expr = req!(p.expression());
            if p.at(TokenKind::ColonEqual)? {
                return Ok(None);
            }
            Ok(Some(expr))
        })
    }

    /// `NAME ':=' expression | expression !':='`, without the diagnostics of
    /// [`Parser::named_expression`]. Used where `name=value` may legitimately
    /// follow, as in call arguments.
    pub(super) fn assignment_or_expression(&mut self) -> PResult<Option<Expr>> {
        let tok = self.peek()?;
        if tok.kind == TokenKind::Name && self.peek_nth(1)?.kind == TokenKind::ColonEqual {
            return self.named_expression();
        }
        self.attempt(|p| {
            let expr = req!(p.expression());
            if p.at(TokenKind::ColonEqual)? {
                return Ok(None);
            }
            Ok(Some(expr))
        })
    }

    pub(super) fn disjunction(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::Disjunction, |p| {
            p.bool_chain("or", BoolOp::Or, Self::conjunction)
        })
    }

    pub(super) fn conjunction(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::Conjunction, |p| {
            p.bool_chain("and", BoolOp::And, Self::inversion)
        })
    }

    fn bool_chain(&mut self, word: &str, op: BoolOp, operand: Rule<'t, Expr>) -> PResult<Option<Expr>> {
        let start = self.start();
        let first = req!(operand(self));
        let mut values = vec![first];
        loop {
            let mark = self.mark();
            if self.keyword(word)?.is_none() {
                break;
            }
            match operand(self)? {
                Some(value) => values.push(value),
                None => {
                    self.reset(mark);
                    break;
                }
            }
        }
        if values.len() == 1 {
            return Ok(values.pop());
        }
        let span = self.span_from(start);
        Ok(Some(self.ast().bool_op(op, values, span)))
    }

    /// `'not' inversion | comparison`
    pub(super) fn inversion(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::Inversion, |p| {
            let start = p.start();
            if p.keyword("not")?.is_some() {
                let operand = req!(p.inversion());
                let span = p.span_from(start);
                return Ok(Some(p.ast().unary_op(UnaryOp::Not, operand, span)));
            }
            p.comparison()
        })
    }

    /// `bitwise_or (compare_op bitwise_or)*`, one node for the whole chain.
    pub(super) fn comparison(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::Comparison, |p| {
            let start = p.start();
            let left = req!(p.bitwise_or());
            let mut pairs = Vec::new();
            loop {
                let mark = p.mark();
                let Some(op) = p.compare_op()? else {
                    break;
                };
                match p.bitwise_or()? {
                    Some(right) => pairs.push((op, right)),
                    None => {
                        p.reset(mark);
                        break;
                    }
                }
            }
            let span = p.span_from(start);
            Ok(Some(p.ast().compare(left, pairs, span)))
        })
    }

    fn compare_op(&mut self) -> PResult<Option<CmpOp>> {
        let tok = self.peek()?;
        let op = match tok.kind {
            TokenKind::EqEqual => CmpOp::Eq,
            TokenKind::NotEqual => CmpOp::NotEq,
            TokenKind::Less => CmpOp::Lt,
            TokenKind::LessEqual => CmpOp::LtE,
            TokenKind::Greater => CmpOp::Gt,
            TokenKind::GreaterEqual => CmpOp::GtE,
            TokenKind::Name => match self.text(&tok) {
                "in" => CmpOp::In,
                "is" => {
                    self.tokens.next();
                    if self.keyword("not")?.is_some() {
                        return Ok(Some(CmpOp::IsNot));
                    }
                    return Ok(Some(CmpOp::Is));
                }
                "not" => {
                    let next = self.peek_nth(1)?;
                    if next.kind != TokenKind::Name || self.text(&next) != "in" {
                        return Ok(None);
                    }
                    self.tokens.next();
                    CmpOp::NotIn
                }
                _ => return Ok(None),
            },
            _ => return Ok(None),
        };
        self.tokens.next();
        Ok(Some(op))
    }

    /// A left-associative chain of binary operators drawn from `ops`.
    fn binary_chain(
        &mut self,
        rule: RuleId,
        ops: &'static [TokenKind],
        operand: Rule<'t, Expr>,
    ) -> PResult<Option<Expr>> {
        self.memoize(rule, |p| {
            let start = p.start();
            let mut left = req!(operand(p));
            loop {
                let tok = p.peek()?;
                if !ops.contains(&tok.kind) {
                    break;
                }
                let Some(op) = Operator::from_token(tok.kind) else {
                    break;
                };
                let mark = p.mark();
                p.tokens.next();
                match operand(p)? {
                    Some(right) => {
                        let span = p.span_from(start);
                        left = p.ast().bin_op(left, op, right, span);
                    }
                    None => {
                        p.reset(mark);
                        break;
                    }
                }
            }
            Ok(Some(left))
        })
    }

    pub(super) fn bitwise_or(&mut self) -> PResult<Option<Expr>> {
        self.binary_chain(RuleId::BitwiseOr, &[TokenKind::VBar], Self::bitwise_xor)
    }

    fn bitwise_xor(&mut self) -> PResult<Option<Expr>> {
        self.binary_chain(RuleId::BitwiseXor, &[TokenKind::Circumflex], Self::bitwise_and)
    }

    fn bitwise_and(&mut self) -> PResult<Option<Expr>> {
        self.binary_chain(RuleId::BitwiseAnd, &[TokenKind::Amper], Self::shift_expr)
    }

    fn shift_expr(&mut self) -> PResult<Option<Expr>> {
        self.binary_chain(
            RuleId::ShiftExpr,
            &[TokenKind::LeftShift, TokenKind::RightShift],
            Self::sum,
        )
    }

    fn sum(&mut self) -> PResult<Option<Expr>> {
        self.binary_chain(RuleId::Sum, &[TokenKind::Plus, TokenKind::Minus], Self::term)
    }

    fn term(&mut self) -> PResult<Option<Expr>> {
        self.binary_chain(
            RuleId::Term,
            &[
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::DoubleSlash,
                TokenKind::Percent,
                TokenKind::At,
            ],
            Self::factor,
        )
    }

    /// `'+' factor | '-' factor | '~' factor | power`
    fn factor(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::Factor, |p| {
            let start = p.start();
            let op = match p.peek()?.kind {
                TokenKind::Plus => UnaryOp::UAdd,
                TokenKind::Minus => UnaryOp::USub,
                TokenKind::Tilde => UnaryOp::Invert,
                _ => return p.power(),
            };
            p.tokens.next();
            let operand = req!(p.factor());
            let span = p.span_from(start);
            Ok(Some(p.ast().unary_op(op, operand, span)))
        })
    }

    /// `await_primary '**' factor | await_primary`
    fn power(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::Power, |p| {
            let start = p.start();
            let base = req!(p.await_primary());
            let mark = p.mark();
            if p.expect(TokenKind::DoubleStar)?.is_some() {
                if let Some(exponent) = p.factor()? {
                    let span = p.span_from(start);
                    return Ok(Some(p.ast().bin_op(base, Operator::Pow, exponent, span)));
                }
                p.reset(mark);
            }
            Ok(Some(base))
        })
    }

    /// `AWAIT primary | primary`
    fn await_primary(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::AwaitPrimary, |p| {
            let start = p.start();
            if p.expect(TokenKind::Await)?.is_some() {
                let value = req!(p.primary());
                let span = p.span_from(start);
                return Ok(Some(p.ast().await_expr(value, span)));
            }
            p.primary()
        })
    }

    /// `primary ('.' NAME | genexp | '(' [arguments] ')' | '[' slices ']')*`
    pub(super) fn primary(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::Primary, |p| {
            let start = p.start();
            let mut expr = req!(p.atom());
            while let Some(trailer) = p.trailer()? {
                expr = p.apply_trailer(expr, trailer, start)?;
            }
            Ok(Some(expr))
        })
    }

    /// The trailer starting at the next token, if any. On the second pass a
    /// call whose closing parenthesis is missing is reported right away.
    pub(super) fn trailer(&mut self) -> PResult<Option<Trailer>> {
        match self.peek()?.kind {
            TokenKind::Dot => self.attempt(|p| {
                p.tokens.next();
                let name = req!(p.name_token());
                Ok(Some(Trailer::Attribute(p.text(&name).to_string())))
            }),
            TokenKind::LPar => {
                if let Some(genexp) = self.genexp()? {
                    return Ok(Some(Trailer::Call(vec![CallArg::Positional(genexp)])));
                }
                let open = self.mark();
                self.tokens.next();
                let args = self.mark();
                let items = self.arguments()?.unwrap_or_default();
                if self.expect(TokenKind::RPar)?.is_none() {
                    if !self.call_invalid_rules {
                        self.reset(open);
                        return Ok(None);
                    }
                    self.invalid_arguments(args)?;
                    // Report at the first token the argument list cannot absorb.
                    self.reset(args);
                    self.gather(TokenKind::Comma, Self::argument)?;
                    self.expect(TokenKind::Comma)?;
                    return Err(self.error_here("expected ')'"));
                }
                Ok(Some(Trailer::Call(items)))
            }
            TokenKind::LSqb => self.attempt(|p| {
                p.tokens.next();
                let slice = req!(p.slices());
                p.expect_forced(TokenKind::RSqb)?;
                Ok(Some(Trailer::Subscript(slice)))
            }),
            _ => Ok(None),
        }
    }

    pub(super) fn apply_trailer(&mut self, value: Expr, trailer: Trailer, start: usize) -> PResult<Expr> {
        let span = self.span_from(start);
        let ast = self.ast();
        Ok(match trailer {
            Trailer::Attribute(attr) => ast.attribute(value, &attr, span),
            Trailer::Call(items) => ast.call(value, items, span)?,
            Trailer::Subscript(slice) => ast.subscript(value, slice, span),
        })
    }

    /// `slice !',' | ','.(slice | starred_expression)+ [',']`
    pub(super) fn slices(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::Slices, |p| {
            let start = p.start();
            let first = req!(p.slice_or_starred());
            let starred = matches!(first.kind, ExprKind::Starred { .. });
            if !p.at(TokenKind::Comma)? && !starred {
                return Ok(Some(first));
            }
            let mut elts = vec![first];
            while p.expect(TokenKind::Comma)?.is_some() {
                match p.slice_or_starred()? {
                    Some(elt) => elts.push(elt),
                    None => break,
                }
            }
            let span = p.span_from(start);
            Ok(Some(p.ast().tuple(elts, span)))
        })
    }

    fn slice_or_starred(&mut self) -> PResult<Option<Expr>> {
        if self.at(TokenKind::Star)? {
            return self.starred(Self::expression);
        }
        self.slice()
    }

    /// `[expression] ':' [expression] [':' [expression]] | named_expression`
    fn slice(&mut self) -> PResult<Option<Expr>> {
        let start = self.start();
        let mark = self.mark();
        let lower = self.expression()?;
        if self.expect(TokenKind::Colon)?.is_none() {
            self.reset(mark);
            return self.named_expression();
        }
        let upper = self.expression()?;
        let step = if self.expect(TokenKind::Colon)?.is_some() {
            self.expression()?
        } else {
            None
        };
        let span = self.span_from(start);
        Ok(Some(self.ast().slice(lower, upper, step, span)))
    }

    // ------------------------------------------------------------------
    // Atoms
    // ------------------------------------------------------------------

    pub(super) fn atom(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::Atom, |p| {
            let tok = p.peek()?;
            match tok.kind {
                TokenKind::Name => {
                    let value = match p.text(&tok) {
                        "True" => Constant::Bool(true),
                        "False" => Constant::Bool(false),
                        "None" => Constant::None,
                        _ => return p.name(),
                    };
                    p.tokens.next();
                    Ok(Some(p.ast().constant(value, tok.span)))
                }
                TokenKind::Number => {
                    p.tokens.next();
                    Ok(Some(p.ast().number(&tok)?))
                }
                TokenKind::String => p.strings(),
                TokenKind::LPar => p.paren_atom(),
                TokenKind::LSqb => p.list_display(),
                TokenKind::LBrace => p.brace_display(),
                TokenKind::Ellipsis => {
                    p.tokens.next();
                    Ok(Some(p.ast().constant(Constant::Ellipsis, tok.span)))
                }
                _ => Ok(None),
            }
        })
    }

    /// One or more adjacent STRING tokens.
    pub(super) fn strings(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::Strings, |p| {
            let toks = p.repeat0(|p| p.expect(TokenKind::String))?;
            if toks.is_empty() {
                return Ok(None);
            }
            Ok(Some(p.ast().strings(&toks)?))
        })
    }

    /// `tuple | group | genexp`
    fn paren_atom(&mut self) -> PResult<Option<Expr>> {
        let start = self.start();
        let tuple = self.attempt(|p| {
            req!(p.expect(TokenKind::LPar));
            let mut elts = Vec::new();
            if !p.at(TokenKind::RPar)? {
                elts.push(req!(p.star_named_expression()));
                req!(p.expect(TokenKind::Comma));
                if let Some(rest) = p.star_named_expressions()? {
                    elts.extend(rest);
                }
            }
            req!(p.expect(TokenKind::RPar));
            let span = p.span_from(start);
            Ok(Some(p.ast().tuple(elts, span)))
        })?;
        if tuple.is_some() {
            return Ok(tuple);
        }
        let group = self.attempt(|p| {
            req!(p.expect(TokenKind::LPar));
            let inner = match p.yield_expr()? {
                Some(expr) => expr,
                None => req!(p.named_expression()),
            };
            req!(p.expect(TokenKind::RPar));
            Ok(Some(inner))
        })?;
        if group.is_some() {
            return Ok(group);
        }
        self.genexp()
    }

    /// `'(' (assignment_expression | expression !':=') for_if_clauses ')'`
    pub(super) fn genexp(&mut self) -> PResult<Option<Expr>> {
        self.attempt(|p| {
            let start = p.start();
            req!(p.expect(TokenKind::LPar));
            let elt = req!(p.assignment_or_expression());
            let generators = req!(p.for_if_clauses());
            req!(p.expect(TokenKind::RPar));
            let span = p.span_from(start);
            Ok(Some(p.ast().generator_exp(elt, generators, span)))
        })
    }

    /// `list | listcomp`
    fn list_display(&mut self) -> PResult<Option<Expr>> {
        let start = self.start();
        let list = self.attempt(|p| {
            req!(p.expect(TokenKind::LSqb));
            let elts = p.star_named_expressions()?.unwrap_or_default();
            req!(p.expect(TokenKind::RSqb));
            let span = p.span_from(start);
            Ok(Some(p.ast().list(elts, span)))
        })?;
        if list.is_some() {
            return Ok(list);
        }
        self.attempt(|p| {
            req!(p.expect(TokenKind::LSqb));
            let elt = req!(p.named_expression());
            let generators = req!(p.for_if_clauses());
            req!(p.expect(TokenKind::RSqb));
            let span = p.span_from(start);
            Ok(Some(p.ast().list_comp(elt, generators, span)))
        })
    }

    /// `dict | set | dictcomp | setcomp`
    fn brace_display(&mut self) -> PResult<Option<Expr>> {
        let start = self.start();
        let dict = self.attempt(|p| {
            req!(p.expect(TokenKind::LBrace));
            let entries = p
                .gather(TokenKind::Comma, Self::double_starred_kvpair)?
                .unwrap_or_default();
            if !entries.is_empty() {
                p.expect(TokenKind::Comma)?;
            }
            req!(p.expect(TokenKind::RBrace));
            let span = p.span_from(start);
            Ok(Some(p.ast().dict(entries, span)))
        })?;
        if dict.is_some() {
            return Ok(dict);
        }
        let set = self.attempt(|p| {
            req!(p.expect(TokenKind::LBrace));
            let elts = req!(p.star_named_expressions());
            req!(p.expect(TokenKind::RBrace));
            let span = p.span_from(start);
            Ok(Some(p.ast().set(elts, span)))
        })?;
        if set.is_some() {
            return Ok(set);
        }
        let dictcomp = self.attempt(|p| {
            req!(p.expect(TokenKind::LBrace));
            let key = req!(p.expression());
            req!(p.expect(TokenKind::Colon));
            let value = req!(p.expression());
            let generators = req!(p.for_if_clauses());
            req!(p.expect(TokenKind::RBrace));
            let span = p.span_from(start);
            Ok(Some(p.ast().dict_comp(key, value, generators, span)))
        })?;
        if dictcomp.is_some() {
            return Ok(dictcomp);
        }
        self.attempt(|p| {
            req!(p.expect(TokenKind::LBrace));
            let elt = req!(p.named_expression());
            let generators = req!(p.for_if_clauses());
            req!(p.expect(TokenKind::RBrace));
            let span = p.span_from(start);
            Ok(Some(p.ast().set_comp(elt, generators, span)))
        })
    }

    /// `'**' bitwise_or | expression ':' expression`
    fn double_starred_kvpair(&mut self) -> PResult<Option<DictEntry>> {
        self.attempt(|p| {
            if p.expect(TokenKind::DoubleStar)?.is_some() {
                let value = req!(p.bitwise_or());
                return Ok(Some(DictEntry::Unpack(value)));
            }
            let key = req!(p.expression());
            req!(p.expect(TokenKind::Colon));
            let value = req!(p.expression());
            Ok(Some(DictEntry::Pair(key, value)))
        })
    }

    /// `for_if_clause+`
    pub(super) fn for_if_clauses(&mut self) -> PResult<Option<Vec<Comprehension>>> {
        self.repeat1(Self::for_if_clause)
    }

    /// `[ASYNC] 'for' star_targets 'in' ~ disjunction ('if' disjunction)*`
    fn for_if_clause(&mut self) -> PResult<Option<Comprehension>> {
        self.attempt(|p| {
            let start = p.start();
            let is_async = p.expect(TokenKind::Async)?.is_some();
            req!(p.keyword("for"));
            let target_mark = p.mark();
            let target = match p.star_targets()? {
                Some(target) if p.keyword("in")?.is_some() => target,
                _ => {
                    if p.call_invalid_rules {
                        p.invalid_for_target(target_mark)?;
                    }
                    return Ok(None);
                }
            };
            let iter = req!(p.disjunction());
            let ifs = p.repeat0(|p| {
                p.attempt(|p| {
                    req!(p.keyword("if"));
                    p.disjunction()
                })
            })?;
            let span = p.span_from(start);
            Ok(Some(p.ast().comprehension(target, iter, ifs, is_async, span)))
        })
    }

    /// `'lambda' [lambda_params] ':' expression`
    fn lambdef(&mut self) -> PResult<Option<Expr>> {
        self.memoize(RuleId::Lambdef, |p| {
            let start = p.start();
            req!(p.keyword("lambda"));
            let mark = p.mark();
            let args = p
                .parameters(TokenKind::Colon, false)?
                .unwrap_or_else(ParameterList::default);
            if !p.at(TokenKind::Colon)? {
                if !p.call_invalid_rules {
                    return Ok(None);
                }
                p.invalid_parameters(mark, TokenKind::Colon)?;
                return Err(p.error_here("expected ':'"));
            }
            p.tokens.next();
            let body = req!(p.expression());
            let span = p.span_from(start);
            Ok(Some(p.ast().lambda(args, body, span)))
        })
    }
}
