// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The typed syntax tree.
//!
//! Every node carries a [`Span`](pyfront_core::Span) of byte offsets into the
//! parsed source. A node's span contains the spans of all of its children,
//! and sibling spans never decrease in document order. Nodes are plain owned
//! values: once [`parse_module`](crate::parse_module) returns, the tree holds
//! no references back into the parser.

mod expr;
mod ops;
mod stmt;

pub use expr::{
    Arg, Comprehension, Constant, ConstantKind, Expr, ExprKind, Keyword, ParameterList,
};
pub use ops::{BoolOp, CmpOp, ExprContext, Operator, UnaryOp};
pub use stmt::{
    Alias, ClassDef, ExceptHandler, FunctionDef, MatchCase, Mod, Pattern, PatternKind, Stmt,
    StmtKind, WithItem,
};
