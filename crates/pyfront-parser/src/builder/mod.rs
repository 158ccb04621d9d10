// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Construction of AST nodes from matched grammar pieces.
//!
//! The grammar decides *what* matched; [`AstBuilder`] decides what node it
//! becomes. This is also where literal values are interpreted (numbers,
//! escapes, f-strings) and where checks that need a finished sub-tree run,
//! such as call-argument ordering and assignment-target validity.

mod number;
mod params;
mod string;

use pyfront_core::Span;

pub use number::parse_number;
pub use params::{ParamParts, RawParam, SlashWithDefault, StarEtc};

use crate::ast::{
    Alias, BoolOp, ClassDef, CmpOp, Comprehension, Constant, ExceptHandler, Expr,
    ExprContext, ExprKind, FunctionDef, Keyword, MatchCase, Operator, ParameterList, Pattern,
    PatternKind, Stmt, StmtKind, UnaryOp, WithItem,
};
use crate::parser::{PResult, SyntaxError, SyntaxErrorKind};
use crate::tokenizer::Token;

/// The services the builder needs from the parser that drives it.
///
/// f-string replacement fields are parsed on demand: the builder hands the
/// byte range of each field expression back through [`parse_fexpr`].
///
/// [`parse_fexpr`]: FExprParser::parse_fexpr
pub trait FExprParser {
    /// The complete source text being parsed.
    fn source(&self) -> &str;
    /// `(line, col)` of a byte offset in [`source`](FExprParser::source).
    fn position(&self, offset: usize) -> (usize, usize);
    /// Parse `range` of the source as a standalone expression.
    fn parse_fexpr(&self, range: Span) -> PResult<Expr>;
}

/// One argument of a call, in source order.
#[derive(Debug, Clone)]
pub enum CallArg {
    /// A plain or `*`-unpacked positional argument.
    Positional(Expr),
    /// `name=value` or `**mapping`.
    Keyword(Keyword),
}

/// One entry of a dict display.
#[derive(Debug, Clone)]
pub enum DictEntry {
    Pair(Expr, Expr),
    Unpack(Expr),
}

pub struct AstBuilder<'f> {
    fexpr: &'f dyn FExprParser,
}

impl<'f> AstBuilder<'f> {
    pub fn new(fexpr: &'f dyn FExprParser) -> Self {
        AstBuilder { fexpr }
    }

    pub(crate) fn error(&self, message: impl Into<String>, span: Span) -> SyntaxError {
        let (line, col) = self.fexpr.position(span.start);
        SyntaxError::at_span(SyntaxErrorKind::Semantic, message, span, line, col)
    }

    // ------------------------------------------------------------------
    // Atoms
    // ------------------------------------------------------------------

    pub fn number(&self, tok: &Token) -> PResult<Expr> {
        let value = parse_number(tok.text(self.fexpr.source()))
            .map_err(|msg| self.error(msg, tok.span))?;
        Ok(Expr::constant(value, tok.span))
    }

    pub fn constant(&self, value: Constant, span: Span) -> Expr {
        Expr::constant(value, span)
    }

    pub fn tuple(&self, elts: Vec<Expr>, span: Span) -> Expr {
        Expr::new(
            ExprKind::Tuple {
                elts,
                ctx: ExprContext::Load,
            },
            span,
        )
    }

    pub fn list(&self, elts: Vec<Expr>, span: Span) -> Expr {
        Expr::new(
            ExprKind::List {
                elts,
                ctx: ExprContext::Load,
            },
            span,
        )
    }

    pub fn set(&self, elts: Vec<Expr>, span: Span) -> Expr {
        Expr::new(ExprKind::Set { elts }, span)
    }

    pub fn dict(&self, entries: Vec<DictEntry>, span: Span) -> Expr {
        let mut keys = Vec::with_capacity(entries.len());
        let mut values = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                DictEntry::Pair(key, value) => {
                    keys.push(Some(key));
                    values.push(value);
                }
                DictEntry::Unpack(value) => {
                    keys.push(None);
                    values.push(value);
                }
            }
        }
        Expr::new(ExprKind::Dict { keys, values }, span)
    }

    pub fn comprehension(
        &self,
        target: Expr,
        iter: Expr,
        ifs: Vec<Expr>,
        is_async: bool,
        span: Span,
    ) -> Comprehension {
        Comprehension {
            target: target.with_context(ExprContext::Store),
            iter,
            ifs,
            is_async,
            span,
        }
    }

    pub fn list_comp(&self, elt: Expr, generators: Vec<Comprehension>, span: Span) -> Expr {
        Expr::new(
            ExprKind::ListComp {
                elt: Box::new(elt),
                generators,
            },
            span,
        )
    }

    pub fn set_comp(&self, elt: Expr, generators: Vec<Comprehension>, span: Span) -> Expr {
        Expr::new(
            ExprKind::SetComp {
                elt: Box::new(elt),
                generators,
            },
            span,
        )
    }

    pub fn dict_comp(
        &self,
        key: Expr,
        value: Expr,
        generators: Vec<Comprehension>,
        span: Span,
    ) -> Expr {
        Expr::new(
            ExprKind::DictComp {
                key: Box::new(key),
                value: Box::new(value),
                generators,
            },
            span,
        )
    }

    pub fn generator_exp(&self, elt: Expr, generators: Vec<Comprehension>, span: Span) -> Expr {
        Expr::new(
            ExprKind::GeneratorExp {
                elt: Box::new(elt),
                generators,
            },
            span,
        )
    }

    // ------------------------------------------------------------------
    // Operators
    // ------------------------------------------------------------------

    pub fn bool_op(&self, op: BoolOp, values: Vec<Expr>, span: Span) -> Expr {
        Expr::new(ExprKind::BoolOp { op, values }, span)
    }

    pub fn bin_op(&self, left: Expr, op: Operator, right: Expr, span: Span) -> Expr {
        Expr::new(
            ExprKind::BinOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            span,
        )
    }

    pub fn unary_op(&self, op: UnaryOp, operand: Expr, span: Span) -> Expr {
        Expr::new(
            ExprKind::UnaryOp {
                op,
                operand: Box::new(operand),
            },
            span,
        )
    }

    /// A comparison chain. With no operators the left operand is returned
    /// unchanged.
    pub fn compare(&self, left: Expr, pairs: Vec<(CmpOp, Expr)>, span: Span) -> Expr {
        if pairs.is_empty() {
            return left;
        }
        let (ops, comparators) = pairs.into_iter().unzip();
        Expr::new(
            ExprKind::Compare {
                left: Box::new(left),
                ops,
                comparators,
            },
            span,
        )
    }

    pub fn named_expr(&self, target: Expr, value: Expr, span: Span) -> Expr {
        Expr::new(
            ExprKind::NamedExpr {
                target: Box::new(target.with_context(ExprContext::Store)),
                value: Box::new(value),
            },
            span,
        )
    }

    pub fn if_exp(&self, body: Expr, test: Expr, orelse: Expr, span: Span) -> Expr {
        Expr::new(
            ExprKind::IfExp {
                test: Box::new(test),
                body: Box::new(body),
                orelse: Box::new(orelse),
            },
            span,
        )
    }

    pub fn lambda(&self, args: ParameterList, body: Expr, span: Span) -> Expr {
        Expr::new(
            ExprKind::Lambda {
                args: Box::new(args),
                body: Box::new(body),
            },
            span,
        )
    }

    pub fn await_expr(&self, value: Expr, span: Span) -> Expr {
        Expr::new(
            ExprKind::Await {
                value: Box::new(value),
            },
            span,
        )
    }

    pub fn yield_expr(&self, value: Option<Expr>, span: Span) -> Expr {
        Expr::new(
            ExprKind::Yield {
                value: value.map(Box::new),
            },
            span,
        )
    }

    pub fn yield_from(&self, value: Expr, span: Span) -> Expr {
        Expr::new(
            ExprKind::YieldFrom {
                value: Box::new(value),
            },
            span,
        )
    }

    pub fn starred(&self, value: Expr, span: Span) -> Expr {
        Expr::new(
            ExprKind::Starred {
                value: Box::new(value),
                ctx: ExprContext::Load,
            },
            span,
        )
    }

    // ------------------------------------------------------------------
    // Primaries
    // ------------------------------------------------------------------

    pub fn attribute(&self, value: Expr, attr: &str, span: Span) -> Expr {
        Expr::new(
            ExprKind::Attribute {
                value: Box::new(value),
                attr: attr.to_string(),
                ctx: ExprContext::Load,
            },
            span,
        )
    }

    pub fn subscript(&self, value: Expr, slice: Expr, span: Span) -> Expr {
        Expr::new(
            ExprKind::Subscript {
                value: Box::new(value),
                slice: Box::new(slice),
                ctx: ExprContext::Load,
            },
            span,
        )
    }

    pub fn slice(
        &self,
        lower: Option<Expr>,
        upper: Option<Expr>,
        step: Option<Expr>,
        span: Span,
    ) -> Expr {
        Expr::new(
            ExprKind::Slice {
                lower: lower.map(Box::new),
                upper: upper.map(Box::new),
                step: step.map(Box::new),
            },
            span,
        )
    }

    pub fn keyword(&self, arg: Option<&str>, value: Expr, span: Span) -> Keyword {
        Keyword {
            arg: arg.map(str::to_string),
            value,
            span,
        }
    }

    /// Split call arguments into positional and keyword lists, rejecting
    /// orderings Python does not allow.
    pub fn call_arguments(&self, items: Vec<CallArg>) -> PResult<(Vec<Expr>, Vec<Keyword>)> {
        let mut args = Vec::new();
        let mut keywords: Vec<Keyword> = Vec::new();
        for item in items {
            match item {
                CallArg::Positional(expr) => {
                    let starred = matches!(expr.kind, ExprKind::Starred { .. });
                    if keywords.iter().any(|k| k.arg.is_none()) {
                        let message = if starred {
                            "iterable argument unpacking follows keyword argument unpacking"
                        } else {
                            "positional argument follows keyword argument unpacking"
                        };
                        return Err(self.error(message, expr.span));
                    }
                    if !starred && !keywords.is_empty() {
                        return Err(self.error(
                            "positional argument follows keyword argument",
                            expr.span,
                        ));
                    }
                    args.push(expr);
                }
                CallArg::Keyword(keyword) => keywords.push(keyword),
            }
        }
        Ok((args, keywords))
    }

    pub fn call(&self, func: Expr, items: Vec<CallArg>, span: Span) -> PResult<Expr> {
        let (args, keywords) = self.call_arguments(items)?;
        Ok(Expr::new(
            ExprKind::Call {
                func: Box::new(func),
                args,
                keywords,
            },
            span,
        ))
    }

    /// The sub-expression that makes `expr` unusable as an assignment (or,
    /// with `delete`, a `del`) target, if any.
    pub fn invalid_target<'e>(&self, expr: &'e Expr, delete: bool) -> Option<&'e Expr> {
        match &expr.kind {
            ExprKind::Name { .. } | ExprKind::Attribute { .. } | ExprKind::Subscript { .. } => {
                None
            }
            ExprKind::Starred { value, .. } if !delete => self.invalid_target(value, delete),
            ExprKind::Tuple { elts, .. } | ExprKind::List { elts, .. } => {
                elts.iter().find_map(|e| self.invalid_target(e, delete))
            }
            _ => Some(expr),
        }
    }

    // ------------------------------------------------------------------
    // Simple statements
    // ------------------------------------------------------------------

    pub fn expr_stmt(&self, value: Expr, span: Span) -> Stmt {
        Stmt::new(StmtKind::Expr { value }, span)
    }

    /// `targets[0] = targets[1] = ... = value`
    pub fn assign(
        &self,
        targets: Vec<Expr>,
        value: Expr,
        type_comment: Option<String>,
        span: Span,
    ) -> Stmt {
        let targets = targets
            .into_iter()
            .map(|t| t.with_context(ExprContext::Store))
            .collect();
        Stmt::new(
            StmtKind::Assign {
                targets,
                value,
                type_comment,
            },
            span,
        )
    }

    pub fn aug_assign(&self, target: Expr, op: Operator, value: Expr, span: Span) -> Stmt {
        Stmt::new(
            StmtKind::AugAssign {
                target: target.with_context(ExprContext::Store),
                op,
                value,
            },
            span,
        )
    }

    pub fn ann_assign(
        &self,
        target: Expr,
        annotation: Expr,
        value: Option<Expr>,
        simple: bool,
        span: Span,
    ) -> Stmt {
        Stmt::new(
            StmtKind::AnnAssign {
                target: target.with_context(ExprContext::Store),
                annotation,
                value,
                simple,
            },
            span,
        )
    }

    pub fn return_stmt(&self, value: Option<Expr>, span: Span) -> Stmt {
        Stmt::new(StmtKind::Return { value }, span)
    }

    pub fn delete(&self, targets: Vec<Expr>, span: Span) -> Stmt {
        let targets = targets
            .into_iter()
            .map(|t| t.with_context(ExprContext::Del))
            .collect();
        Stmt::new(StmtKind::Delete { targets }, span)
    }

    pub fn raise(&self, exc: Option<Expr>, cause: Option<Expr>, span: Span) -> Stmt {
        Stmt::new(StmtKind::Raise { exc, cause }, span)
    }

    pub fn assert(&self, test: Expr, msg: Option<Expr>, span: Span) -> Stmt {
        Stmt::new(StmtKind::Assert { test, msg }, span)
    }

    pub fn alias(&self, name: String, asname: Option<String>, span: Span) -> Alias {
        Alias { name, asname, span }
    }

    pub fn import(&self, names: Vec<Alias>, span: Span) -> Stmt {
        Stmt::new(StmtKind::Import { names }, span)
    }

    pub fn import_from(
        &self,
        module: Option<String>,
        names: Vec<Alias>,
        level: u32,
        span: Span,
    ) -> Stmt {
        Stmt::new(
            StmtKind::ImportFrom {
                module,
                names,
                level,
            },
            span,
        )
    }

    pub fn global(&self, names: Vec<String>, span: Span) -> Stmt {
        Stmt::new(StmtKind::Global { names }, span)
    }

    pub fn nonlocal(&self, names: Vec<String>, span: Span) -> Stmt {
        Stmt::new(StmtKind::Nonlocal { names }, span)
    }

    /// `pass`, `break` or `continue`.
    pub fn keyword_stmt(&self, kind: StmtKind, span: Span) -> Stmt {
        Stmt::new(kind, span)
    }

    // ------------------------------------------------------------------
    // Compound statements
    // ------------------------------------------------------------------

    pub fn if_stmt(&self, test: Expr, body: Vec<Stmt>, orelse: Vec<Stmt>, span: Span) -> Stmt {
        Stmt::new(StmtKind::If { test, body, orelse }, span)
    }

    pub fn while_stmt(&self, test: Expr, body: Vec<Stmt>, orelse: Vec<Stmt>, span: Span) -> Stmt {
        Stmt::new(StmtKind::While { test, body, orelse }, span)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn for_stmt(
        &self,
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
        type_comment: Option<String>,
        is_async: bool,
        span: Span,
    ) -> Stmt {
        Stmt::new(
            StmtKind::For {
                target: target.with_context(ExprContext::Store),
                iter,
                body,
                orelse,
                type_comment,
                is_async,
            },
            span,
        )
    }

    pub fn with_item(&self, context_expr: Expr, optional_vars: Option<Expr>) -> WithItem {
        WithItem {
            context_expr,
            optional_vars: optional_vars.map(|v| v.with_context(ExprContext::Store)),
        }
    }

    pub fn with_stmt(
        &self,
        items: Vec<WithItem>,
        body: Vec<Stmt>,
        type_comment: Option<String>,
        is_async: bool,
        span: Span,
    ) -> Stmt {
        Stmt::new(
            StmtKind::With {
                items,
                body,
                type_comment,
                is_async,
            },
            span,
        )
    }

    pub fn except_handler(
        &self,
        type_: Option<Expr>,
        name: Option<String>,
        body: Vec<Stmt>,
        span: Span,
    ) -> ExceptHandler {
        ExceptHandler {
            type_,
            name,
            body,
            span,
        }
    }

    pub fn try_stmt(
        &self,
        body: Vec<Stmt>,
        handlers: Vec<ExceptHandler>,
        orelse: Vec<Stmt>,
        finalbody: Vec<Stmt>,
        span: Span,
    ) -> Stmt {
        Stmt::new(
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            },
            span,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn function_def(
        &self,
        name: &str,
        args: ParameterList,
        returns: Option<Expr>,
        body: Vec<Stmt>,
        type_comment: Option<String>,
        is_async: bool,
        span: Span,
    ) -> Stmt {
        Stmt::new(
            StmtKind::FunctionDef(FunctionDef {
                name: name.to_string(),
                args,
                body,
                decorator_list: Vec::new(),
                returns,
                type_comment,
                is_async,
            }),
            span,
        )
    }

    pub fn class_def(
        &self,
        name: &str,
        bases: Vec<Expr>,
        keywords: Vec<Keyword>,
        body: Vec<Stmt>,
        span: Span,
    ) -> Stmt {
        Stmt::new(
            StmtKind::ClassDef(ClassDef {
                name: name.to_string(),
                bases,
                keywords,
                body,
                decorator_list: Vec::new(),
            }),
            span,
        )
    }

    /// Attach decorators to a function or class definition. The span grows
    /// back to `at`, the first `@`.
    pub fn decorate(&self, decorators: Vec<Expr>, def: Stmt, at: usize) -> PResult<Stmt> {
        let Stmt { mut kind, span } = def;
        let span = Span::new(at.min(span.start), span.end);
        match &mut kind {
            StmtKind::FunctionDef(f) => f.decorator_list = decorators,
            StmtKind::ClassDef(c) => c.decorator_list = decorators,
            _ => {
                return Err(self.error(
                    "decorators may only be applied to function or class definitions",
                    span,
                ))
            }
        }
        Ok(Stmt::new(kind, span))
    }

    pub fn match_case(&self, pattern: Pattern, guard: Option<Expr>, body: Vec<Stmt>) -> MatchCase {
        MatchCase {
            pattern,
            guard,
            body,
        }
    }

    pub fn match_stmt(&self, subject: Expr, cases: Vec<MatchCase>, span: Span) -> Stmt {
        Stmt::new(StmtKind::Match { subject, cases }, span)
    }

    pub fn pattern(&self, kind: PatternKind, span: Span) -> Pattern {
        Pattern { kind, span }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyfront_core::LineIndex;

    /// Parses every replacement field as a bare name.
    struct NameOnly {
        source: &'static str,
    }

    impl FExprParser for NameOnly {
        fn source(&self) -> &str {
            self.source
        }

        fn position(&self, offset: usize) -> (usize, usize) {
            LineIndex::new(self.source).position(offset)
        }

        fn parse_fexpr(&self, range: Span) -> PResult<Expr> {
            let text = &self.source[range.start..range.end];
            let trimmed = text.trim();
            let start = range.start + (text.len() - text.trim_start().len());
            Ok(Expr::name(trimmed, Span::new(start, start + trimmed.len())))
        }
    }

    fn string_token(start: usize, end: usize) -> Token {
        Token {
            kind: crate::tokenizer::TokenKind::String,
            span: Span::new(start, end),
            start_line: 1,
            start_col: start,
            end_line: 1,
            end_col: end,
            error: None,
        }
    }

    fn joined_values(expr: &Expr) -> &[Expr] {
        match &expr.kind {
            ExprKind::JoinedStr { values } => values,
            other => panic!("expected JoinedStr, got {other:?}"),
        }
    }

    #[test]
    fn fstring_fields_and_literals() {
        let stub = NameOnly {
            source: "f'a{x}b{{c}}'",
        };
        let b = AstBuilder::new(&stub);
        let expr = b.strings(&[string_token(0, 13)]).unwrap();
        let values = joined_values(&expr);
        assert_eq!(values.len(), 3);
        assert_eq!(
            values[0].kind,
            ExprKind::Constant {
                value: Constant::Str("a".into()),
                kind: None
            }
        );
        let ExprKind::FormattedValue { value, conversion, .. } = &values[1].kind else {
            panic!("expected FormattedValue");
        };
        assert_eq!(value.span, Span::new(4, 5));
        assert_eq!(*conversion, None);
        assert_eq!(
            values[2].kind,
            ExprKind::Constant {
                value: Constant::Str("b{c}".into()),
                kind: None
            }
        );
    }

    #[test]
    fn self_documenting_field() {
        let stub = NameOnly {
            source: "f'{x=}'",
        };
        let b = AstBuilder::new(&stub);
        let expr = b.strings(&[string_token(0, 7)]).unwrap();
        let values = joined_values(&expr);
        assert_eq!(
            values[0].kind,
            ExprKind::Constant {
                value: Constant::Str("x=".into()),
                kind: None
            }
        );
        let ExprKind::FormattedValue { conversion, .. } = &values[1].kind else {
            panic!("expected FormattedValue");
        };
        assert_eq!(*conversion, Some('r'));
    }

    #[test]
    fn conversion_and_spec() {
        let stub = NameOnly {
            source: "f'{x!s:>{w}}'",
        };
        let b = AstBuilder::new(&stub);
        let expr = b.strings(&[string_token(0, 13)]).unwrap();
        let values = joined_values(&expr);
        let ExprKind::FormattedValue {
            conversion,
            format_spec,
            ..
        } = &values[0].kind
        else {
            panic!("expected FormattedValue");
        };
        assert_eq!(*conversion, Some('s'));
        let spec = format_spec.as_deref().expect("format spec");
        assert_eq!(joined_values(spec).len(), 2);
    }

    #[test]
    fn fstring_errors() {
        for (source, message) in [
            ("f'{}'", "f-string: empty expression not allowed"),
            ("f'{x!z}'", "f-string: invalid conversion character: expected 's', 'r', or 'a'"),
            ("f'}'", "f-string: single '}' is not allowed"),
            ("f'{a\\n}'", "f-string expression part cannot include a backslash"),
            ("f'{x'", "f-string: expecting '}'"),
        ] {
            let stub = NameOnly { source };
            let b = AstBuilder::new(&stub);
            let err = b.strings(&[string_token(0, source.len())]).unwrap_err();
            assert_eq!(err.message, message, "{source}");
        }
    }

    #[test]
    fn bytes_and_str_do_not_mix() {
        let stub = NameOnly {
            source: "b'a' 'b'",
        };
        let b = AstBuilder::new(&stub);
        let err = b
            .strings(&[string_token(0, 4), string_token(5, 8)])
            .unwrap_err();
        assert_eq!(err.message, "cannot mix bytes and nonbytes literals");
    }

    #[test]
    fn call_argument_order() {
        let stub = NameOnly { source: "" };
        let b = AstBuilder::new(&stub);
        let x = || Expr::name("x", Span::new(0, 1));
        let kw = b.keyword(Some("k"), x(), Span::new(0, 3));
        let err = b
            .call_arguments(vec![CallArg::Keyword(kw.clone()), CallArg::Positional(x())])
            .unwrap_err();
        assert_eq!(err.message, "positional argument follows keyword argument");

        let star = b.starred(x(), Span::new(0, 2));
        let (args, keywords) = b
            .call_arguments(vec![CallArg::Keyword(kw), CallArg::Positional(star.clone())])
            .unwrap();
        assert_eq!((args.len(), keywords.len()), (1, 1));

        let unpack = b.keyword(None, x(), Span::new(0, 3));
        let err = b
            .call_arguments(vec![CallArg::Keyword(unpack), CallArg::Positional(star)])
            .unwrap_err();
        assert_eq!(
            err.message,
            "iterable argument unpacking follows keyword argument unpacking"
        );
    }

    #[test]
    fn raw_parameter_checks() {
        let stub = NameOnly { source: "" };
        let b = AstBuilder::new(&stub);
        let s = Span::new(0, 1);
        let plain = |has_default| RawParam::Plain {
            span: s,
            has_default,
        };
        let check = |raw: &[RawParam]| b.check_raw_parameters(raw).err().map(|e| e.message);

        assert_eq!(
            check(&[plain(true), plain(false)]).as_deref(),
            Some("non-default argument follows default argument")
        );
        assert_eq!(
            check(&[RawParam::Star { span: s, named: false, has_default: false }]).as_deref(),
            Some("named arguments must follow bare *")
        );
        assert_eq!(
            check(&[plain(false), RawParam::Slash(s), RawParam::Slash(s)]).as_deref(),
            Some("/ may appear only once")
        );
        assert_eq!(
            check(&[RawParam::DoubleStar { span: s, has_default: false }, plain(false)]).as_deref(),
            Some("arguments cannot follow var-keyword argument")
        );
        assert_eq!(check(&[plain(false), plain(true)]), None);
    }

    #[test]
    fn parameters_merge_defaults_into_tail() {
        let stub = NameOnly { source: "" };
        let b = AstBuilder::new(&stub);
        let s = Span::new(0, 1);
        let arg = |n: &str| b.arg(n, None, None, s);
        let one = || Expr::constant(Constant::Int(1), s);
        let list = b.parameters(ParamParts {
            slash_with_default: Some(SlashWithDefault {
                plain: vec![arg("a")],
                defaulted: vec![(arg("b"), one())],
            }),
            with_default: vec![(arg("c"), one())],
            star_etc: Some(StarEtc {
                vararg: None,
                kwonly: vec![(arg("d"), None), (arg("e"), Some(one()))],
                kwarg: Some(arg("kw")),
            }),
            ..ParamParts::default()
        });
        let names: Vec<&str> = list.posonlyargs.iter().map(|a| a.arg.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(list.args.len(), 1);
        assert_eq!(list.defaults.len(), 2);
        assert_eq!(list.kw_defaults.len(), list.kwonlyargs.len());
        assert!(list.kw_defaults[0].is_none());
        assert!(list.kwarg.is_some());
    }

    #[test]
    fn decorators_need_a_definition() {
        let stub = NameOnly { source: "@d\npass\n" };
        let b = AstBuilder::new(&stub);
        let decorator = Expr::name("d", Span::new(1, 2));
        let err = b
            .decorate(vec![decorator], Stmt::new(StmtKind::Pass, Span::new(3, 7)), 0)
            .unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::Semantic);
        assert_eq!(
            err.message,
            "decorators may only be applied to function or class definitions"
        );
        assert_eq!(err.start_line, 1);
    }
}
