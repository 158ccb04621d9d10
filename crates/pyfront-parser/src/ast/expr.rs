// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Expression nodes and their auxiliary records.

use num_bigint::BigInt;
use pyfront_core::Span;
use serde::{Serialize, Serializer};

use super::ops::{BoolOp, CmpOp, ExprContext, Operator, UnaryOp};

/// An expression together with its source span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    #[serde(flatten)]
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node")]
pub enum ExprKind {
    BoolOp {
        op: BoolOp,
        values: Vec<Expr>,
    },
    NamedExpr {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    BinOp {
        left: Box<Expr>,
        op: Operator,
        right: Box<Expr>,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Lambda {
        args: Box<ParameterList>,
        body: Box<Expr>,
    },
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    /// `keys[i]` is `None` for a `**mapping` unpacking entry.
    Dict {
        keys: Vec<Option<Expr>>,
        values: Vec<Expr>,
    },
    Set {
        elts: Vec<Expr>,
    },
    ListComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    SetComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    DictComp {
        key: Box<Expr>,
        value: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    GeneratorExp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    Await {
        value: Box<Expr>,
    },
    Yield {
        value: Option<Box<Expr>>,
    },
    YieldFrom {
        value: Box<Expr>,
    },
    /// A comparison chain: `left ops[0] comparators[0] ops[1] comparators[1] ...`.
    Compare {
        left: Box<Expr>,
        ops: Vec<CmpOp>,
        comparators: Vec<Expr>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<Keyword>,
    },
    /// One replacement field of an f-string. `conversion` is `r`, `s` or `a`.
    FormattedValue {
        value: Box<Expr>,
        conversion: Option<char>,
        format_spec: Option<Box<Expr>>,
    },
    JoinedStr {
        values: Vec<Expr>,
    },
    /// `kind` is `Some("u")` for strings written with a `u` prefix.
    Constant {
        value: Constant,
        kind: Option<String>,
    },
    Attribute {
        value: Box<Expr>,
        attr: String,
        ctx: ExprContext,
    },
    Subscript {
        value: Box<Expr>,
        slice: Box<Expr>,
        ctx: ExprContext,
    },
    Starred {
        value: Box<Expr>,
        ctx: ExprContext,
    },
    Name {
        id: String,
        ctx: ExprContext,
    },
    List {
        elts: Vec<Expr>,
        ctx: ExprContext,
    },
    Tuple {
        elts: Vec<Expr>,
        ctx: ExprContext,
    },
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
}

/// Literal values interpreted at parse time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Constant {
    None,
    Bool(bool),
    Ellipsis,
    Int(i64),
    /// An integer too large for `i64`; serialized as its decimal digits.
    BigInt(#[serde(serialize_with = "serialize_bigint")] BigInt),
    Float(f64),
    /// Literal complex tokens are imaginary-only, so `real` is always 0.0
    /// coming out of the parser.
    Complex {
        real: f64,
        imag: f64,
    },
    Str(String),
    Bytes(Vec<u8>),
}

/// The literal-kind tag of a [`Constant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstantKind {
    None,
    Boolean,
    Ellipsis,
    Int,
    BigInt,
    Double,
    Complex,
    String,
    Bytes,
}

fn serialize_bigint<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

impl Constant {
    pub fn kind(&self) -> ConstantKind {
        match self {
            Constant::None => ConstantKind::None,
            Constant::Bool(_) => ConstantKind::Boolean,
            Constant::Ellipsis => ConstantKind::Ellipsis,
            Constant::Int(_) => ConstantKind::Int,
            Constant::BigInt(_) => ConstantKind::BigInt,
            Constant::Float(_) => ConstantKind::Double,
            Constant::Complex { .. } => ConstantKind::Complex,
            Constant::Str(_) => ConstantKind::String,
            Constant::Bytes(_) => ConstantKind::Bytes,
        }
    }
}

/// One `for ... in ... if ...` clause of a comprehension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comprehension {
    pub target: Expr,
    pub iter: Expr,
    pub ifs: Vec<Expr>,
    pub is_async: bool,
    pub span: Span,
}

/// A keyword argument in a call or class header. `arg` is `None` for `**kwargs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyword {
    pub arg: Option<String>,
    pub value: Expr,
    pub span: Span,
}

/// A formal parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arg {
    pub arg: String,
    pub annotation: Option<Box<Expr>>,
    pub type_comment: Option<String>,
    pub span: Span,
}

/// The merged parameter list of a `def` or `lambda`.
///
/// `defaults` holds the defaults of the trailing parameters of
/// `posonlyargs ++ args`; `kw_defaults` is aligned one-to-one with
/// `kwonlyargs`, with `None` where a keyword-only parameter has no default.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ParameterList {
    pub posonlyargs: Vec<Arg>,
    pub args: Vec<Arg>,
    pub vararg: Option<Box<Arg>>,
    pub kwonlyargs: Vec<Arg>,
    pub kw_defaults: Vec<Option<Expr>>,
    pub kwarg: Option<Box<Arg>>,
    pub defaults: Vec<Expr>,
}

impl ParameterList {
    pub fn is_empty(&self) -> bool {
        self.posonlyargs.is_empty()
            && self.args.is_empty()
            && self.vararg.is_none()
            && self.kwonlyargs.is_empty()
            && self.kwarg.is_none()
    }

    /// Every parameter in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arg> {
        self.posonlyargs
            .iter()
            .chain(self.args.iter())
            .chain(self.vararg.as_deref())
            .chain(self.kwonlyargs.iter())
            .chain(self.kwarg.as_deref())
    }
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    pub fn name(id: impl Into<String>, span: Span) -> Self {
        Expr::new(
            ExprKind::Name {
                id: id.into(),
                ctx: ExprContext::Load,
            },
            span,
        )
    }

    pub fn constant(value: Constant, span: Span) -> Self {
        Expr::new(ExprKind::Constant { value, kind: None }, span)
    }

    /// The expression context of names, attributes, subscripts, starred
    /// expressions, lists and tuples.
    pub fn context(&self) -> Option<ExprContext> {
        match &self.kind {
            ExprKind::Name { ctx, .. }
            | ExprKind::Attribute { ctx, .. }
            | ExprKind::Subscript { ctx, .. }
            | ExprKind::Starred { ctx, .. }
            | ExprKind::List { ctx, .. }
            | ExprKind::Tuple { ctx, .. } => Some(*ctx),
            _ => None,
        }
    }

    /// Rebuild this expression with `ctx`, recursing into the elements of
    /// starred expressions, lists and tuples. Other kinds are returned as-is.
    pub fn with_context(self, ctx: ExprContext) -> Expr {
        let Expr { kind, span } = self;
        let kind = match kind {
            ExprKind::Name { id, .. } => ExprKind::Name { id, ctx },
            ExprKind::Attribute { value, attr, .. } => ExprKind::Attribute { value, attr, ctx },
            ExprKind::Subscript { value, slice, .. } => ExprKind::Subscript { value, slice, ctx },
            ExprKind::Starred { value, .. } => ExprKind::Starred {
                value: Box::new(value.with_context(ctx)),
                ctx,
            },
            ExprKind::List { elts, .. } => ExprKind::List {
                elts: elts.into_iter().map(|e| e.with_context(ctx)).collect(),
                ctx,
            },
            ExprKind::Tuple { elts, .. } => ExprKind::Tuple {
                elts: elts.into_iter().map(|e| e.with_context(ctx)).collect(),
                ctx,
            },
            other => other,
        };
        Expr { kind, span }
    }

    /// Noun phrase for diagnostics such as "cannot assign to function call".
    pub fn describe(&self) -> &'static str {
        match &self.kind {
            ExprKind::BoolOp { .. } | ExprKind::BinOp { .. } | ExprKind::UnaryOp { .. } => {
                "expression"
            }
            ExprKind::NamedExpr { .. } => "named expression",
            ExprKind::Lambda { .. } => "lambda",
            ExprKind::IfExp { .. } => "conditional expression",
            ExprKind::Dict { .. } => "dict literal",
            ExprKind::Set { .. } => "set display",
            ExprKind::ListComp { .. } => "list comprehension",
            ExprKind::SetComp { .. } => "set comprehension",
            ExprKind::DictComp { .. } => "dict comprehension",
            ExprKind::GeneratorExp { .. } => "generator expression",
            ExprKind::Await { .. } => "await expression",
            ExprKind::Yield { .. } | ExprKind::YieldFrom { .. } => "yield expression",
            ExprKind::Compare { .. } => "comparison",
            ExprKind::Call { .. } => "function call",
            ExprKind::FormattedValue { .. } | ExprKind::JoinedStr { .. } => "f-string expression",
            ExprKind::Constant { value, .. } => match value {
                Constant::None => "None",
                Constant::Bool(true) => "True",
                Constant::Bool(false) => "False",
                Constant::Ellipsis => "ellipsis",
                _ => "literal",
            },
            ExprKind::Attribute { .. } => "attribute",
            ExprKind::Subscript { .. } => "subscript",
            ExprKind::Starred { .. } => "starred",
            ExprKind::Name { .. } => "name",
            ExprKind::List { .. } => "list",
            ExprKind::Tuple { .. } => "tuple",
            ExprKind::Slice { .. } => "slice",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_context_recurses_into_sequences() {
        let span = Span::new(0, 6);
        let tuple = Expr::new(
            ExprKind::Tuple {
                elts: vec![
                    Expr::name("a", Span::new(0, 1)),
                    Expr::new(
                        ExprKind::Starred {
                            value: Box::new(Expr::name("b", Span::new(4, 5))),
                            ctx: ExprContext::Load,
                        },
                        Span::new(3, 5),
                    ),
                ],
                ctx: ExprContext::Load,
            },
            span,
        );
        let stored = tuple.with_context(ExprContext::Store);
        let ExprKind::Tuple { elts, ctx } = &stored.kind else {
            panic!("expected tuple");
        };
        assert_eq!(*ctx, ExprContext::Store);
        assert_eq!(elts[0].context(), Some(ExprContext::Store));
        let ExprKind::Starred { value, .. } = &elts[1].kind else {
            panic!("expected starred");
        };
        assert_eq!(value.context(), Some(ExprContext::Store));
        assert_eq!(stored.span, span);
    }

    #[test]
    fn constant_kinds() {
        assert_eq!(Constant::Int(1).kind(), ConstantKind::Int);
        assert_eq!(
            Constant::BigInt(BigInt::from(1u8)).kind(),
            ConstantKind::BigInt
        );
        assert_eq!(
            Constant::Complex {
                real: 0.0,
                imag: 1.0
            }
            .kind(),
            ConstantKind::Complex
        );
    }

    #[test]
    fn bigint_serializes_as_digits() {
        let big: BigInt = "9223372036854775808".parse().unwrap();
        let json = serde_json::to_string(&Constant::BigInt(big)).unwrap();
        assert_eq!(json, r#"{"BigInt":"9223372036854775808"}"#);
    }
}
