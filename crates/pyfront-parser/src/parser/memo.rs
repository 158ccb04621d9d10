// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Packrat memo cache types and engine statistics.

use std::collections::HashMap;

use serde::Serialize;

use crate::ast::{Expr, Pattern, Stmt};
use crate::tokenizer::Mark;

/// Identifies a memoized grammar rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RuleId {
    Statements,
    Statement,
    SimpleStmts,
    SimpleStmt,
    Block,
    Expressions,
    Expression,
    StarExpressions,
    StarExpression,
    NamedExpression,
    Disjunction,
    Conjunction,
    Inversion,
    Comparison,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    ShiftExpr,
    Sum,
    Term,
    Factor,
    Power,
    AwaitPrimary,
    Primary,
    Atom,
    Slices,
    Strings,
    Lambdef,
    StarTargets,
    StarTarget,
    TargetWithStarAtom,
    StarAtom,
    TPrimary,
    SingleTarget,
    SingleSubscriptAttributeTarget,
    DelTarget,
    Pattern,
    ClosedPattern,
}

/// A cached rule outcome. `None` inside a variant records a failed match.
#[derive(Debug, Clone)]
pub(crate) enum Memo {
    Expr(Option<Expr>),
    Stmt(Option<Stmt>),
    Stmts(Option<Vec<Stmt>>),
    Pattern(Option<Pattern>),
}

/// Result types that can be stored in the memo cache.
pub(crate) trait Memoized: Sized {
    fn wrap(value: Option<Self>) -> Memo;
    /// `None` if `memo` holds a different result type.
    fn unwrap(memo: &Memo) -> Option<Option<Self>>;
}

macro_rules! memoized {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Memoized for $ty {
                fn wrap(value: Option<Self>) -> Memo {
                    Memo::$variant(value)
                }

                fn unwrap(memo: &Memo) -> Option<Option<Self>> {
                    match memo {
                        Memo::$variant(value) => Some(value.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

memoized! {
    Expr => Expr,
    Stmt => Stmt,
    Vec<Stmt> => Stmts,
    Pattern => Pattern,
}

/// Counters collected while parsing.
///
/// `body_calls` records how many times each memoized rule body actually ran
/// at each token position. With a working cache every entry is 1.
#[derive(Debug, Clone, Default)]
pub struct ParseStats {
    pub memo_hits: usize,
    pub memo_misses: usize,
    pub tokens: usize,
    pub(crate) body_calls: HashMap<(RuleId, Mark), u32>,
}

impl ParseStats {
    /// How many times `rule`'s body ran at token position `mark`.
    pub fn body_calls(&self, rule: RuleId, mark: Mark) -> u32 {
        self.body_calls.get(&(rule, mark)).copied().unwrap_or(0)
    }

    /// The largest body-invocation count over all `(rule, position)` pairs.
    pub fn max_body_calls(&self) -> u32 {
        self.body_calls.values().copied().max().unwrap_or(0)
    }

    /// Every `(rule, position)` pair whose body ran more than once.
    pub fn repeated(&self) -> Vec<(RuleId, Mark, u32)> {
        let mut out: Vec<_> = self
            .body_calls
            .iter()
            .filter(|(_, &n)| n > 1)
            .map(|(&(rule, mark), &n)| (rule, mark, n))
            .collect();
        out.sort();
        out
    }

    /// Number of distinct `(rule, position)` pairs evaluated.
    pub fn entries(&self) -> usize {
        self.body_calls.len()
    }

    pub(crate) fn clear(&mut self) {
        *self = ParseStats::default();
    }
}
