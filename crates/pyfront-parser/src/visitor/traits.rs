// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The visitor trait.

use crate::ast::{
    Alias, Arg, Comprehension, ExceptHandler, Expr, Keyword, MatchCase, Mod, ParameterList,
    Pattern, Stmt, WithItem,
};

/// Result of visiting a node; controls how the walker proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisitResult {
    /// Descend into children, then call `leave_*`.
    #[default]
    Continue,

    /// Skip children, continue with siblings. `leave_*` is still called.
    SkipChildren,

    /// Stop traversal entirely. No further `visit_*` or `leave_*` calls.
    Stop,
}

/// Generates `visit_*` and `leave_*` method pairs with default bodies.
macro_rules! visitor_methods {
    (
        $(
            $(#[$meta:meta])*
            $base_name:ident : $node_type:ty
        ),* $(,)?
    ) => {
        paste::paste! {
            $(
                $(#[$meta])*
                #[doc = concat!("Visit a [`", stringify!($node_type), "`] node before its children.")]
                #[allow(unused_variables)]
                fn [<visit_ $base_name>](&mut self, node: &$node_type) -> VisitResult {
                    VisitResult::Continue
                }

                #[doc = concat!("Leave a [`", stringify!($node_type), "`] node after its children.")]
                #[allow(unused_variables)]
                fn [<leave_ $base_name>](&mut self, node: &$node_type) {}
            )*
        }
    };
}

/// Immutable visitor over the syntax tree.
///
/// The tree is a closed set of node kinds, so there is one hook pair per
/// node type rather than per kind; match on `node.kind` inside the hook to
/// pick out the kinds of interest.
pub trait Visitor {
    visitor_methods! {
        module: Mod,
        stmt: Stmt,
        expr: Expr,
        pattern: Pattern,
        comprehension: Comprehension,
        /// Called for the parameter list of every `def` and `lambda`.
        parameters: ParameterList,
        arg: Arg,
        keyword: Keyword,
        alias: Alias,
        with_item: WithItem,
        except_handler: ExceptHandler,
        match_case: MatchCase,
    }
}
