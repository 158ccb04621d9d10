// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Start rules, simple statements and compound statements.

use crate::ast::{Alias, ExceptHandler, Expr, ExprContext, Mod, Operator, Stmt, StmtKind, WithItem};
use crate::parser::engine::{req, Parser};
use crate::parser::errors::{PResult, SyntaxError};
use crate::parser::memo::RuleId;
use crate::tokenizer::{Token, TokenKind};

impl<'t> Parser<'t> {
    // ------------------------------------------------------------------
    // Start rules
    // ------------------------------------------------------------------

    /// `[statements] ENDMARKER`
    pub(crate) fn file(&mut self) -> PResult<Option<Mod>> {
        let body = self.statements()?.unwrap_or_default();
        req!(self.expect(TokenKind::EndMarker));
        Ok(Some(Mod::Module {
            body,
            type_ignores: self.type_ignores(),
        }))
    }

    /// `expressions NEWLINE* ENDMARKER`
    pub(crate) fn eval(&mut self) -> PResult<Option<Mod>> {
        let body = req!(self.expressions());
        while self.expect(TokenKind::Newline)?.is_some() {}
        req!(self.expect(TokenKind::EndMarker));
        Ok(Some(Mod::Expression {
            body: Box::new(body),
        }))
    }

    /// One statement, as typed at an interactive prompt.
    pub(crate) fn interactive(&mut self) -> PResult<Option<Mod>> {
        while self.expect(TokenKind::Newline)?.is_some() {}
        if self.at(TokenKind::EndMarker)? {
            return Ok(Some(Mod::Interactive { body: Vec::new() }));
        }
        let body = req!(self.statement());
        while self.expect(TokenKind::Newline)?.is_some() {}
        if !self.at(TokenKind::EndMarker)? {
            return Err(self.error_here(
                "multiple statements found while compiling a single statement",
            ));
        }
        Ok(Some(Mod::Interactive { body }))
    }

    /// The expression inside an f-string replacement field.
    pub(crate) fn fstring(&mut self) -> PResult<Option<Expr>> {
        let expr = match self.yield_expr()? {
            Some(expr) => expr,
            None => req!(self.star_expressions()),
        };
        while self.expect(TokenKind::Newline)?.is_some() {}
        req!(self.expect(TokenKind::EndMarker));
        Ok(Some(expr))
    }

    // ------------------------------------------------------------------
    // Statement sequences
    // ------------------------------------------------------------------

    /// `statement+`
    fn statements(&mut self) -> PResult<Option<Vec<Stmt>>> {
        self.memoize(RuleId::Statements, |p| {
            let groups = req!(p.repeat1(Self::statement));
            Ok(Some(groups.into_iter().flatten().collect()))
        })
    }

    /// `compound_stmt | simple_stmts`
    fn statement(&mut self) -> PResult<Option<Vec<Stmt>>> {
        self.memoize(RuleId::Statement, |p| {
            if let Some(stmt) = p.compound_stmt()? {
                return Ok(Some(vec![stmt]));
            }
            p.simple_stmts()
        })
    }

    /// `';'.simple_stmt+ [';'] NEWLINE`
    fn simple_stmts(&mut self) -> PResult<Option<Vec<Stmt>>> {
        self.memoize(RuleId::SimpleStmts, |p| {
            let mut stmts = vec![req!(p.simple_stmt())];
            while p.expect(TokenKind::Semi)?.is_some() {
                if p.at(TokenKind::Newline)? {
                    break;
                }
                stmts.push(req!(p.simple_stmt()));
            }
            req!(p.expect(TokenKind::Newline));
            Ok(Some(stmts))
        })
    }

    fn simple_stmt(&mut self) -> PResult<Option<Stmt>> {
        self.memoize(RuleId::SimpleStmt, |p| {
            let start = p.start();
            let tok = p.peek()?;
            if tok.kind == TokenKind::Name {
                let kind = match p.text(&tok) {
                    "pass" => Some(StmtKind::Pass),
                    "break" => Some(StmtKind::Break),
                    "continue" => Some(StmtKind::Continue),
                    _ => None,
                };
                if let Some(kind) = kind {
                    p.tokens.next();
                    let span = p.span_from(start);
                    return Ok(Some(p.ast().keyword_stmt(kind, span)));
                }
                match p.text(&tok) {
                    "return" => return p.return_stmt(),
                    "raise" => return p.raise_stmt(),
                    "global" | "nonlocal" => return p.scope_stmt(),
                    "del" => return p.del_stmt(),
                    "assert" => return p.assert_stmt(),
                    "import" => return p.import_name(),
                    "from" => return p.import_from(),
                    _ => {}
                }
            }
            if let Some(stmt) = p.assignment()? {
                return Ok(Some(stmt));
            }
            let value = match p.yield_expr()? {
                Some(value) => value,
                None => req!(p.star_expressions()),
            };
            let span = p.span_from(start);
            Ok(Some(p.ast().expr_stmt(value, span)))
        })
    }

    // ------------------------------------------------------------------
    // Assignment
    // ------------------------------------------------------------------

    fn assignment(&mut self) -> PResult<Option<Stmt>> {
        let start = self.start();

        // NAME ':' expression ['=' annotated_rhs]
        let tok = self.peek()?;
        if tok.kind == TokenKind::Name && self.peek_nth(1)?.kind == TokenKind::Colon {
            let annotated = self.attempt(|p| {
                let target = req!(p.name()).with_context(ExprContext::Store);
                p.tokens.next();
                p.annotation_tail(target, true, start)
            })?;
            if annotated.is_some() {
                return Ok(annotated);
            }
        }

        // ('(' single_target ')' | single_subscript_attribute_target) ':' expression ['=' annotated_rhs]
        let annotated = self.attempt(|p| {
            let parenthesized = p.attempt(|p| {
                req!(p.expect(TokenKind::LPar));
                let inner = req!(p.single_target());
                req!(p.expect(TokenKind::RPar));
                Ok(Some(inner))
            })?;
            let target = match parenthesized {
                Some(target) => target,
                None => req!(p.single_subscript_attribute_target()),
            };
            req!(p.expect(TokenKind::Colon));
            p.annotation_tail(target, false, start)
        })?;
        if annotated.is_some() {
            return Ok(annotated);
        }

        // (star_targets '=')+ (yield_expr | star_expressions) !'=' [TYPE_COMMENT]
        let assigned = self.attempt(|p| {
            let targets = req!(p.repeat1(|p| {
                p.attempt(|p| {
                    let target = req!(p.star_targets());
                    req!(p.expect(TokenKind::Equal));
                    Ok(Some(target))
                })
            }));
            let value = req!(p.annotated_rhs());
            if p.at(TokenKind::Equal)? {
                return Ok(None);
            }
            let type_comment = p.trailing_type_comment()?;
            let span = p.span_from(start);
            Ok(Some(p.ast().assign(targets, value, type_comment, span)))
        })?;
        if assigned.is_some() {
            return Ok(assigned);
        }

        // single_target augassign ~ (yield_expr | star_expressions)
        let augmented = self.attempt(|p| {
            let target = req!(p.single_target());
            let Some(op) = Operator::from_augassign(p.peek()?.kind) else {
                return Ok(None);
            };
            p.tokens.next();
            let value = req!(p.annotated_rhs());
            let span = p.span_from(start);
            Ok(Some(p.ast().aug_assign(target, op, value, span)))
        })?;
        if augmented.is_some() {
            return Ok(augmented);
        }

        if self.call_invalid_rules {
            self.invalid_assignment()?;
        }
        Ok(None)
    }

    /// The annotation and optional value after `target ':'`.
    fn annotation_tail(&mut self, target: Expr, simple: bool, start: usize) -> PResult<Option<Stmt>> {
        let annotation = req!(self.expression());
        let value = if self.expect(TokenKind::Equal)?.is_some() {
            Some(req!(self.annotated_rhs()))
        } else {
            None
        };
        let span = self.span_from(start);
        Ok(Some(self.ast().ann_assign(target, annotation, value, simple, span)))
    }

    /// `yield_expr | star_expressions`
    fn annotated_rhs(&mut self) -> PResult<Option<Expr>> {
        if let Some(value) = self.yield_expr()? {
            return Ok(Some(value));
        }
        self.star_expressions()
    }

    /// A `# type:` comment ending the current line, when the next token is
    /// the NEWLINE.
    fn trailing_type_comment(&mut self) -> PResult<Option<String>> {
        if !self.at(TokenKind::Newline)? {
            return Ok(None);
        }
        let Some(prev) = self.tokens.previous() else {
            return Ok(None);
        };
        Ok(self.tokens.type_comment_on(prev.end_line).map(str::to_string))
    }

    // ------------------------------------------------------------------
    // Simple statements
    // ------------------------------------------------------------------

    fn return_stmt(&mut self) -> PResult<Option<Stmt>> {
        let start = self.start();
        req!(self.keyword("return"));
        let value = self.star_expressions()?;
        let span = self.span_from(start);
        Ok(Some(self.ast().return_stmt(value, span)))
    }

    /// `'raise' expression ['from' expression] | 'raise'`
    fn raise_stmt(&mut self) -> PResult<Option<Stmt>> {
        self.attempt(|p| {
            let start = p.start();
            req!(p.keyword("raise"));
            let mut cause = None;
            let exc = p.expression()?;
            if exc.is_some() && p.keyword("from")?.is_some() {
                cause = Some(req!(p.expression()));
            }
            let span = p.span_from(start);
            Ok(Some(p.ast().raise(exc, cause, span)))
        })
    }

    /// `'global' ','.NAME+ | 'nonlocal' ','.NAME+`
    fn scope_stmt(&mut self) -> PResult<Option<Stmt>> {
        self.attempt(|p| {
            let start = p.start();
            let global = p.keyword("global")?.is_some();
            if !global {
                req!(p.keyword("nonlocal"));
            }
            let names = req!(p.gather(TokenKind::Comma, Self::name_token));
            let names: Vec<String> = names.iter().map(|tok| p.text(tok).to_string()).collect();
            let span = p.span_from(start);
            Ok(Some(if global {
                p.ast().global(names, span)
            } else {
                p.ast().nonlocal(names, span)
            }))
        })
    }

    /// `'del' del_targets &(';' | NEWLINE)`
    fn del_stmt(&mut self) -> PResult<Option<Stmt>> {
        let start = self.start();
        let deleted = self.attempt(|p| {
            req!(p.keyword("del"));
            let targets = req!(p.del_targets());
            if !matches!(p.peek()?.kind, TokenKind::Semi | TokenKind::Newline) {
                return Ok(None);
            }
            let span = p.span_from(start);
            Ok(Some(p.ast().delete(targets, span)))
        })?;
        if deleted.is_none() && self.call_invalid_rules {
            self.invalid_del_stmt()?;
        }
        Ok(deleted)
    }

    /// `'assert' expression [',' expression]`
    fn assert_stmt(&mut self) -> PResult<Option<Stmt>> {
        self.attempt(|p| {
            let start = p.start();
            req!(p.keyword("assert"));
            let test = req!(p.expression());
            let msg = if p.expect(TokenKind::Comma)?.is_some() {
                Some(req!(p.expression()))
            } else {
                None
            };
            let span = p.span_from(start);
            Ok(Some(p.ast().assert(test, msg, span)))
        })
    }

    /// `'import' ','.dotted_as_name+`
    fn import_name(&mut self) -> PResult<Option<Stmt>> {
        self.attempt(|p| {
            let start = p.start();
            req!(p.keyword("import"));
            let names = req!(p.gather(TokenKind::Comma, |p| {
                p.import_alias(Self::dotted_name)
            }));
            let span = p.span_from(start);
            Ok(Some(p.ast().import(names, span)))
        })
    }

    /// `'from' ('.' | '...')* dotted_name 'import' targets | 'from' ('.' | '...')+ 'import' targets`
    fn import_from(&mut self) -> PResult<Option<Stmt>> {
        self.attempt(|p| {
            let start = p.start();
            req!(p.keyword("from"));
            let mut level = 0;
            loop {
                match p.peek()?.kind {
                    TokenKind::Dot => level += 1,
                    TokenKind::Ellipsis => level += 3,
                    _ => break,
                }
                p.tokens.next();
            }
            let module = p.dotted_name()?;
            if module.is_none() && level == 0 {
                return Ok(None);
            }
            req!(p.keyword("import"));
            let names = req!(p.import_from_targets());
            let span = p.span_from(start);
            Ok(Some(p.ast().import_from(module, names, level, span)))
        })
    }

    /// `'(' import_from_as_names [','] ')' | import_from_as_names !',' | '*'`
    fn import_from_targets(&mut self) -> PResult<Option<Vec<Alias>>> {
        let tok = self.peek()?;
        match tok.kind {
            TokenKind::Star => {
                self.tokens.next();
                Ok(Some(vec![self.ast().alias("*".to_string(), None, tok.span)]))
            }
            TokenKind::LPar => self.attempt(|p| {
                p.tokens.next();
                let names = req!(p.import_from_as_names());
                p.expect(TokenKind::Comma)?;
                req!(p.expect(TokenKind::RPar));
                Ok(Some(names))
            }),
            _ => self.attempt(|p| {
                let names = req!(p.import_from_as_names());
                if p.at(TokenKind::Comma)? {
                    if p.call_invalid_rules && p.peek_nth(1)?.kind == TokenKind::Newline {
                        return Err(p.error_here(
                            "trailing comma not allowed without surrounding parentheses",
                        ));
                    }
                    return Ok(None);
                }
                Ok(Some(names))
            }),
        }
    }

    fn import_from_as_names(&mut self) -> PResult<Option<Vec<Alias>>> {
        self.gather(TokenKind::Comma, |p| {
            p.import_alias(|p| Ok(p.name_token()?.map(|tok| p.text(&tok).to_string())))
        })
    }

    /// `name ['as' NAME]`
    fn import_alias(
        &mut self,
        name: fn(&mut Self) -> PResult<Option<String>>,
    ) -> PResult<Option<Alias>> {
        self.attempt(|p| {
            let start = p.start();
            let name = req!(name(p));
            let asname = if p.keyword("as")?.is_some() {
                let tok = req!(p.name_token());
                Some(p.text(&tok).to_string())
            } else {
                None
            };
            let span = p.span_from(start);
            Ok(Some(p.ast().alias(name, asname, span)))
        })
    }

    /// `NAME ('.' NAME)*`
    fn dotted_name(&mut self) -> PResult<Option<String>> {
        let first = req!(self.name_token());
        let mut name = self.text(&first).to_string();
        loop {
            let mark = self.mark();
            if self.expect(TokenKind::Dot)?.is_none() {
                break;
            }
            match self.name_token()? {
                Some(part) => {
                    name.push('.');
                    name.push_str(self.text(&part));
                }
                None => {
                    self.reset(mark);
                    break;
                }
            }
        }
        Ok(Some(name))
    }

    // ------------------------------------------------------------------
    // Compound statements
    // ------------------------------------------------------------------

    fn compound_stmt(&mut self) -> PResult<Option<Stmt>> {
        let tok = self.peek()?;
        match tok.kind {
            TokenKind::At => self.decorated(),
            TokenKind::Async => {
                let next = self.peek_nth(1)?;
                if next.kind != TokenKind::Name {
                    return Ok(None);
                }
                let start = tok.span.start;
                self.attempt(|p| {
                    p.tokens.next();
                    match p.text(&next) {
                        "def" => p.function_def(start, true),
                        "for" => p.for_stmt(start, true),
                        "with" => p.with_stmt(start, true),
                        _ => Ok(None),
                    }
                })
            }
            TokenKind::Name => {
                let start = tok.span.start;
                match self.text(&tok) {
                    "def" => self.function_def(start, false),
                    "class" => self.class_def(start),
                    "if" => self.if_stmt(),
                    "while" => self.while_stmt(),
                    "for" => self.for_stmt(start, false),
                    "with" => self.with_stmt(start, false),
                    "try" => self.try_stmt(),
                    "match" if self.version().has_match_statements() => self.match_stmt(),
                    _ => Ok(None),
                }
            }
            _ => Ok(None),
        }
    }

    /// `':'`, required on the second pass.
    pub(super) fn block_colon(&mut self) -> PResult<Option<Token>> {
        if let Some(tok) = self.expect(TokenKind::Colon)? {
            return Ok(Some(tok));
        }
        if self.call_invalid_rules {
            return Err(self.error_here("expected ':'"));
        }
        Ok(None)
    }

    /// `NEWLINE INDENT statements DEDENT | simple_stmts`
    fn block(&mut self) -> PResult<Option<Vec<Stmt>>> {
        self.memoize(RuleId::Block, |p| {
            let indented = p.attempt(|p| {
                req!(p.expect(TokenKind::Newline));
                req!(p.expect(TokenKind::Indent));
                let body = req!(p.statements());
                req!(p.expect(TokenKind::Dedent));
                Ok(Some(body))
            })?;
            if indented.is_some() {
                return Ok(indented);
            }
            p.simple_stmts()
        })
    }

    /// A block following the header `what` that started on `line`.
    pub(super) fn block_after(&mut self, what: &str, line: usize) -> PResult<Option<Vec<Stmt>>> {
        if self.call_invalid_rules && self.at(TokenKind::Newline)? {
            let next = self.peek_nth(1)?;
            if next.kind != TokenKind::Indent {
                return Err(SyntaxError::grammar(
                    format!("expected an indented block after {} on line {}", what, line),
                    &next,
                ));
            }
        }
        self.block()
    }

    /// `['else' ':' block]`; an absent clause is an empty body.
    fn else_block(&mut self) -> PResult<Option<Vec<Stmt>>> {
        let Some(tok) = self.keyword("else")? else {
            return Ok(Some(Vec::new()));
        };
        req!(self.block_colon());
        self.block_after("'else' statement", tok.start_line)
    }

    /// `('@' named_expression NEWLINE)+ (class_def | function_def)`
    fn decorated(&mut self) -> PResult<Option<Stmt>> {
        self.attempt(|p| {
            let at = p.start();
            let decorators = req!(p.repeat1(|p| {
                p.attempt(|p| {
                    req!(p.expect(TokenKind::At));
                    let decorator = req!(p.named_expression());
                    req!(p.expect(TokenKind::Newline));
                    Ok(Some(decorator))
                })
            }));
            let tok = p.peek()?;
            let start = tok.span.start;
            let def = match (tok.kind, p.text(&tok)) {
                (TokenKind::Name, "def") => req!(p.function_def(start, false)),
                (TokenKind::Name, "class") => req!(p.class_def(start)),
                (TokenKind::Async, _) => {
                    p.tokens.next();
                    req!(p.function_def(start, true))
                }
                _ => return Ok(None),
            };
            Ok(Some(p.ast().decorate(decorators, def, at)?))
        })
    }

    /// `'def' NAME '(' [params] ')' ['->' expression] ':' [TYPE_COMMENT] block`
    fn function_def(&mut self, start: usize, is_async: bool) -> PResult<Option<Stmt>> {
        self.attempt(|p| {
            let def = req!(p.keyword("def"));
            let name = req!(p.name_token());
            p.expect_forced(TokenKind::LPar)?;
            let params_mark = p.mark();
            let Some(args) = p.parameters(TokenKind::RPar, true)? else {
                if p.call_invalid_rules {
                    p.invalid_parameters(params_mark, TokenKind::RPar)?;
                }
                return Ok(None);
            };
            req!(p.expect(TokenKind::RPar));
            let returns = if p.expect(TokenKind::RArrow)?.is_some() {
                Some(req!(p.expression()))
            } else {
                None
            };
            p.expect_forced(TokenKind::Colon)?;
            let type_comment = p.trailing_type_comment()?;
            let body = req!(p.block_after("function definition", def.start_line));
            let span = p.span_from(start);
            Ok(Some(p.ast().function_def(
                p.text(&name),
                args,
                returns,
                body,
                type_comment,
                is_async,
                span,
            )))
        })
    }

    /// `'class' NAME ['(' [arguments] ')'] ':' block`
    fn class_def(&mut self, start: usize) -> PResult<Option<Stmt>> {
        self.attempt(|p| {
            let class = req!(p.keyword("class"));
            let name = req!(p.name_token());
            let (bases, keywords) = if p.expect(TokenKind::LPar)?.is_some() {
                let items = p.arguments()?.unwrap_or_default();
                req!(p.expect(TokenKind::RPar));
                p.ast().call_arguments(items)?
            } else {
                (Vec::new(), Vec::new())
            };
            req!(p.block_colon());
            let body = req!(p.block_after("class definition", class.start_line));
            let span = p.span_from(start);
            Ok(Some(p.ast().class_def(p.text(&name), bases, keywords, body, span)))
        })
    }

    /// `'if' named_expression ':' block (elif_stmt | [else_block])`
    fn if_stmt(&mut self) -> PResult<Option<Stmt>> {
        self.conditional("if")
    }

    /// Shared by `if` and `elif`: an `elif` becomes an `If` nested in the
    /// enclosing statement's `orelse`.
    fn conditional(&mut self, word: &'static str) -> PResult<Option<Stmt>> {
        self.attempt(|p| {
            let start = p.start();
            let tok = req!(p.keyword(word));
            let test = req!(p.named_expression());
            req!(p.block_colon());
            let what = if word == "if" {
                "'if' statement"
            } else {
                "'elif' statement"
            };
            let body = req!(p.block_after(what, tok.start_line));
            let orelse = if p.at_keyword("elif")? {
                vec![req!(p.conditional("elif"))]
            } else {
                req!(p.else_block())
            };
            let span = p.span_from(start);
            Ok(Some(p.ast().if_stmt(test, body, orelse, span)))
        })
    }

    /// `'while' named_expression ':' block [else_block]`
    fn while_stmt(&mut self) -> PResult<Option<Stmt>> {
        self.attempt(|p| {
            let start = p.start();
            let tok = req!(p.keyword("while"));
            let test = req!(p.named_expression());
            req!(p.block_colon());
            let body = req!(p.block_after("'while' statement", tok.start_line));
            let orelse = req!(p.else_block());
            let span = p.span_from(start);
            Ok(Some(p.ast().while_stmt(test, body, orelse, span)))
        })
    }

    /// `'for' star_targets 'in' ~ star_expressions ':' [TYPE_COMMENT] block [else_block]`
    fn for_stmt(&mut self, start: usize, is_async: bool) -> PResult<Option<Stmt>> {
        self.attempt(|p| {
            let tok = req!(p.keyword("for"));
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
            let iter = req!(p.star_expressions());
            req!(p.block_colon());
            let type_comment = p.trailing_type_comment()?;
            let body = req!(p.block_after("'for' statement", tok.start_line));
            let orelse = req!(p.else_block());
            let span = p.span_from(start);
            Ok(Some(p.ast().for_stmt(
                target,
                iter,
                body,
                orelse,
                type_comment,
                is_async,
                span,
            )))
        })
    }

    /// `'with' '(' ','.with_item+ ','? ')' ':' block | 'with' ','.with_item+ ':' [TYPE_COMMENT] block`
    fn with_stmt(&mut self, start: usize, is_async: bool) -> PResult<Option<Stmt>> {
        self.attempt(|p| {
            let tok = req!(p.keyword("with"));
            let parenthesized = p.attempt(|p| {
                req!(p.expect(TokenKind::LPar));
                let items = req!(p.gather(TokenKind::Comma, Self::with_item));
                p.expect(TokenKind::Comma)?;
                req!(p.expect(TokenKind::RPar));
                if !p.at(TokenKind::Colon)? {
                    return Ok(None);
                }
                Ok(Some(items))
            })?;
            let items = match parenthesized {
                Some(items) => items,
                None => req!(p.gather(TokenKind::Comma, Self::with_item)),
            };
            req!(p.block_colon());
            let type_comment = p.trailing_type_comment()?;
            let body = req!(p.block_after("'with' statement", tok.start_line));
            let span = p.span_from(start);
            Ok(Some(p.ast().with_stmt(items, body, type_comment, is_async, span)))
        })
    }

    /// `expression 'as' star_target &(',' | ')' | ':') | expression`
    fn with_item(&mut self) -> PResult<Option<WithItem>> {
        self.attempt(|p| {
            let context_expr = req!(p.expression());
            let mark = p.mark();
            if p.keyword("as")?.is_some() {
                if let Some(target) = p.star_target()? {
                    if matches!(
                        p.peek()?.kind,
                        TokenKind::Comma | TokenKind::RPar | TokenKind::Colon
                    ) {
                        return Ok(Some(p.ast().with_item(context_expr, Some(target))));
                    }
                }
                p.reset(mark);
            }
            Ok(Some(p.ast().with_item(context_expr, None)))
        })
    }

    /// `'try' ':' block finally_block | 'try' ':' block except_block+ [else_block] [finally_block]`
    fn try_stmt(&mut self) -> PResult<Option<Stmt>> {
        self.attempt(|p| {
            let start = p.start();
            let tok = req!(p.keyword("try"));
            req!(p.block_colon());
            let body = req!(p.block_after("'try' statement", tok.start_line));
            let handlers = p.repeat0(Self::except_block)?;
            let orelse = if handlers.is_empty() {
                Vec::new()
            } else {
                req!(p.else_block())
            };
            let finalbody = match p.keyword("finally")? {
                Some(fin) => {
                    req!(p.block_colon());
                    req!(p.block_after("'finally' statement", fin.start_line))
                }
                None if handlers.is_empty() => {
                    if p.call_invalid_rules {
                        return Err(p.error_here("expected 'except' or 'finally' block"));
                    }
                    return Ok(None);
                }
                None => Vec::new(),
            };
            let span = p.span_from(start);
            Ok(Some(p.ast().try_stmt(body, handlers, orelse, finalbody, span)))
        })
    }

    /// `'except' expression ['as' NAME] ':' block | 'except' ':' block`
    fn except_block(&mut self) -> PResult<Option<ExceptHandler>> {
        self.attempt(|p| {
            let start = p.start();
            let tok = req!(p.keyword("except"));
            let type_start = p.start();
            let type_ = p.expression()?;
            let mut name = None;
            if type_.is_some() {
                if p.call_invalid_rules && p.at(TokenKind::Comma)? {
                    let mark = p.mark();
                    p.tokens.next();
                    if p.expressions()?.is_some() {
                        return Err(p.error_at(
                            "multiple exception types must be parenthesized",
                            p.span_from(type_start),
                        ));
                    }
                    p.reset(mark);
                }
                if p.keyword("as")?.is_some() {
                    let tok = req!(p.name_token());
                    name = Some(p.text(&tok).to_string());
                }
            }
            req!(p.block_colon());
            let body = req!(p.block_after("'except' statement", tok.start_line));
            let span = p.span_from(start);
            Ok(Some(p.ast().except_handler(type_, name, body, span)))
        })
    }
}
