// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Walk functions for syntax tree traversal.
//!
//! - **Pre-order**: `visit_*` is called before descending into children
//! - **Post-order**: `leave_*` is called after all children have been visited
//! - **Source order**: children are visited left-to-right, top-to-bottom,
//!   except that a call's positional arguments all come before its keywords
//!
//! A walker returns [`VisitResult::Stop`] when traversal was halted and
//! [`VisitResult::Continue`] otherwise.

use super::traits::{VisitResult, Visitor};
use crate::ast::{
    Alias, Arg, Comprehension, ExceptHandler, Expr, ExprKind, Keyword, MatchCase, Mod,
    ParameterList, Pattern, PatternKind, Stmt, StmtKind, WithItem,
};

/// Propagate a `Stop` from a child walk.
macro_rules! walk {
    ($e:expr) => {
        if $e == VisitResult::Stop {
            return VisitResult::Stop;
        }
    };
}

/// The common visit/children/leave shape of every walker.
macro_rules! walk_node {
    ($visitor:ident, $node:ident, $visit:ident, $leave:ident, $children:block) => {{
        match $visitor.$visit($node) {
            VisitResult::Stop => return VisitResult::Stop,
            VisitResult::SkipChildren => {}
            VisitResult::Continue => $children,
        }
        $visitor.$leave($node);
        VisitResult::Continue
    }};
}

fn walk_body<V: Visitor>(visitor: &mut V, body: &[Stmt]) -> VisitResult {
    for stmt in body {
        walk!(walk_stmt(visitor, stmt));
    }
    VisitResult::Continue
}

fn walk_exprs<V: Visitor>(visitor: &mut V, exprs: &[Expr]) -> VisitResult {
    for expr in exprs {
        walk!(walk_expr(visitor, expr));
    }
    VisitResult::Continue
}

fn walk_opt<V: Visitor>(visitor: &mut V, expr: Option<&Expr>) -> VisitResult {
    match expr {
        Some(expr) => walk_expr(visitor, expr),
        None => VisitResult::Continue,
    }
}

fn walk_comprehensions<V: Visitor>(visitor: &mut V, generators: &[Comprehension]) -> VisitResult {
    for generator in generators {
        walk!(walk_comprehension(visitor, generator));
    }
    VisitResult::Continue
}

fn walk_keywords<V: Visitor>(visitor: &mut V, keywords: &[Keyword]) -> VisitResult {
    for keyword in keywords {
        walk!(walk_keyword(visitor, keyword));
    }
    VisitResult::Continue
}

fn walk_patterns<V: Visitor>(visitor: &mut V, patterns: &[Pattern]) -> VisitResult {
    for pattern in patterns {
        walk!(walk_pattern(visitor, pattern));
    }
    VisitResult::Continue
}

// ============================================================================
// Roots and statements
// ============================================================================

/// Walk a parse root.
pub fn walk_module<V: Visitor>(visitor: &mut V, node: &Mod) -> VisitResult {
    walk_node!(visitor, node, visit_module, leave_module, {
        match node {
            Mod::Module { body, .. } | Mod::Interactive { body } => {
                walk!(walk_body(visitor, body));
            }
            Mod::Expression { body } => {
                walk!(walk_expr(visitor, body));
            }
        }
    })
}

/// Walk a statement and everything nested in it.
pub fn walk_stmt<V: Visitor>(visitor: &mut V, node: &Stmt) -> VisitResult {
    walk_node!(visitor, node, visit_stmt, leave_stmt, {
        match &node.kind {
            StmtKind::FunctionDef(def) => {
                walk!(walk_exprs(visitor, &def.decorator_list));
                walk!(walk_parameters(visitor, &def.args));
                walk!(walk_opt(visitor, def.returns.as_ref()));
                walk!(walk_body(visitor, &def.body));
            }
            StmtKind::ClassDef(class) => {
                walk!(walk_exprs(visitor, &class.decorator_list));
                walk!(walk_exprs(visitor, &class.bases));
                walk!(walk_keywords(visitor, &class.keywords));
                walk!(walk_body(visitor, &class.body));
            }
            StmtKind::Return { value } => {
                walk!(walk_opt(visitor, value.as_ref()));
            }
            StmtKind::Delete { targets } => {
                walk!(walk_exprs(visitor, targets));
            }
            StmtKind::Assign { targets, value, .. } => {
                walk!(walk_exprs(visitor, targets));
                walk!(walk_expr(visitor, value));
            }
            StmtKind::AugAssign { target, value, .. } => {
                walk!(walk_expr(visitor, target));
                walk!(walk_expr(visitor, value));
            }
            StmtKind::AnnAssign {
                target,
                annotation,
                value,
                ..
            } => {
                walk!(walk_expr(visitor, target));
                walk!(walk_expr(visitor, annotation));
                walk!(walk_opt(visitor, value.as_ref()));
            }
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
                ..
            } => {
                walk!(walk_expr(visitor, target));
                walk!(walk_expr(visitor, iter));
                walk!(walk_body(visitor, body));
                walk!(walk_body(visitor, orelse));
            }
            StmtKind::While { test, body, orelse } | StmtKind::If { test, body, orelse } => {
                walk!(walk_expr(visitor, test));
                walk!(walk_body(visitor, body));
                walk!(walk_body(visitor, orelse));
            }
            StmtKind::With { items, body, .. } => {
                for item in items {
                    walk!(walk_with_item(visitor, item));
                }
                walk!(walk_body(visitor, body));
            }
            StmtKind::Match { subject, cases } => {
                walk!(walk_expr(visitor, subject));
                for case in cases {
                    walk!(walk_match_case(visitor, case));
                }
            }
            StmtKind::Raise { exc, cause } => {
                walk!(walk_opt(visitor, exc.as_ref()));
                walk!(walk_opt(visitor, cause.as_ref()));
            }
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => {
                walk!(walk_body(visitor, body));
                for handler in handlers {
                    walk!(walk_except_handler(visitor, handler));
                }
                walk!(walk_body(visitor, orelse));
                walk!(walk_body(visitor, finalbody));
            }
            StmtKind::Assert { test, msg } => {
                walk!(walk_expr(visitor, test));
                walk!(walk_opt(visitor, msg.as_ref()));
            }
            StmtKind::Import { names } | StmtKind::ImportFrom { names, .. } => {
                for alias in names {
                    walk!(walk_alias(visitor, alias));
                }
            }
            StmtKind::Expr { value } => {
                walk!(walk_expr(visitor, value));
            }
            StmtKind::Global { .. }
            | StmtKind::Nonlocal { .. }
            | StmtKind::Pass
            | StmtKind::Break
            | StmtKind::Continue => {}
        }
    })
}

pub fn walk_with_item<V: Visitor>(visitor: &mut V, node: &WithItem) -> VisitResult {
    walk_node!(visitor, node, visit_with_item, leave_with_item, {
        walk!(walk_expr(visitor, &node.context_expr));
        walk!(walk_opt(visitor, node.optional_vars.as_ref()));
    })
}

pub fn walk_except_handler<V: Visitor>(visitor: &mut V, node: &ExceptHandler) -> VisitResult {
    walk_node!(visitor, node, visit_except_handler, leave_except_handler, {
        walk!(walk_opt(visitor, node.type_.as_ref()));
        walk!(walk_body(visitor, &node.body));
    })
}

pub fn walk_alias<V: Visitor>(visitor: &mut V, node: &Alias) -> VisitResult {
    walk_node!(visitor, node, visit_alias, leave_alias, {})
}

pub fn walk_match_case<V: Visitor>(visitor: &mut V, node: &MatchCase) -> VisitResult {
    walk_node!(visitor, node, visit_match_case, leave_match_case, {
        walk!(walk_pattern(visitor, &node.pattern));
        walk!(walk_opt(visitor, node.guard.as_ref()));
        walk!(walk_body(visitor, &node.body));
    })
}

// ============================================================================
// Parameters and arguments
// ============================================================================

/// Walk a parameter list. Each default is visited right after the
/// parameter it belongs to.
pub fn walk_parameters<V: Visitor>(visitor: &mut V, node: &ParameterList) -> VisitResult {
    walk_node!(visitor, node, visit_parameters, leave_parameters, {
        let positional: Vec<&Arg> = node.posonlyargs.iter().chain(&node.args).collect();
        let first_default = positional.len().saturating_sub(node.defaults.len());
        for (i, arg) in positional.into_iter().enumerate() {
            walk!(walk_arg(visitor, arg));
            if i >= first_default {
                walk!(walk_opt(visitor, node.defaults.get(i - first_default)));
            }
        }
        if let Some(vararg) = &node.vararg {
            walk!(walk_arg(visitor, vararg));
        }
        for (i, arg) in node.kwonlyargs.iter().enumerate() {
            walk!(walk_arg(visitor, arg));
            walk!(walk_opt(visitor, node.kw_defaults.get(i).and_then(Option::as_ref)));
        }
        if let Some(kwarg) = &node.kwarg {
            walk!(walk_arg(visitor, kwarg));
        }
    })
}

pub fn walk_arg<V: Visitor>(visitor: &mut V, node: &Arg) -> VisitResult {
    walk_node!(visitor, node, visit_arg, leave_arg, {
        walk!(walk_opt(visitor, node.annotation.as_deref()));
    })
}

pub fn walk_keyword<V: Visitor>(visitor: &mut V, node: &Keyword) -> VisitResult {
    walk_node!(visitor, node, visit_keyword, leave_keyword, {
        walk!(walk_expr(visitor, &node.value));
    })
}

// ============================================================================
// Expressions
// ============================================================================

/// Walk an expression and all of its subexpressions.
pub fn walk_expr<V: Visitor>(visitor: &mut V, node: &Expr) -> VisitResult {
    walk_node!(visitor, node, visit_expr, leave_expr, {
        match &node.kind {
            ExprKind::BoolOp { values, .. } => {
                walk!(walk_exprs(visitor, values));
            }
            ExprKind::NamedExpr { target, value } => {
                walk!(walk_expr(visitor, target));
                walk!(walk_expr(visitor, value));
            }
            ExprKind::BinOp { left, right, .. } => {
                walk!(walk_expr(visitor, left));
                walk!(walk_expr(visitor, right));
            }
            ExprKind::UnaryOp { operand, .. } => {
                walk!(walk_expr(visitor, operand));
            }
            ExprKind::Lambda { args, body } => {
                walk!(walk_parameters(visitor, args));
                walk!(walk_expr(visitor, body));
            }
            ExprKind::IfExp { test, body, orelse } => {
                // `body if test else orelse`
                walk!(walk_expr(visitor, body));
                walk!(walk_expr(visitor, test));
                walk!(walk_expr(visitor, orelse));
            }
            ExprKind::Dict { keys, values } => {
                for (key, value) in keys.iter().zip(values) {
                    walk!(walk_opt(visitor, key.as_ref()));
                    walk!(walk_expr(visitor, value));
                }
            }
            ExprKind::Set { elts } | ExprKind::List { elts, .. } | ExprKind::Tuple { elts, .. } => {
                walk!(walk_exprs(visitor, elts));
            }
            ExprKind::ListComp { elt, generators }
            | ExprKind::SetComp { elt, generators }
            | ExprKind::GeneratorExp { elt, generators } => {
                walk!(walk_expr(visitor, elt));
                walk!(walk_comprehensions(visitor, generators));
            }
            ExprKind::DictComp {
                key,
                value,
                generators,
            } => {
                walk!(walk_expr(visitor, key));
                walk!(walk_expr(visitor, value));
                walk!(walk_comprehensions(visitor, generators));
            }
            ExprKind::Await { value }
            | ExprKind::YieldFrom { value }
            | ExprKind::Attribute { value, .. }
            | ExprKind::Starred { value, .. } => {
                walk!(walk_expr(visitor, value));
            }
            ExprKind::Yield { value } => {
                walk!(walk_opt(visitor, value.as_deref()));
            }
            ExprKind::Compare {
                left, comparators, ..
            } => {
                walk!(walk_expr(visitor, left));
                walk!(walk_exprs(visitor, comparators));
            }
            ExprKind::Call {
                func,
                args,
                keywords,
            } => {
                walk!(walk_expr(visitor, func));
                walk!(walk_exprs(visitor, args));
                walk!(walk_keywords(visitor, keywords));
            }
            ExprKind::FormattedValue {
                value, format_spec, ..
            } => {
                walk!(walk_expr(visitor, value));
                walk!(walk_opt(visitor, format_spec.as_deref()));
            }
            ExprKind::JoinedStr { values } => {
                walk!(walk_exprs(visitor, values));
            }
            ExprKind::Subscript { value, slice, .. } => {
                walk!(walk_expr(visitor, value));
                walk!(walk_expr(visitor, slice));
            }
            ExprKind::Slice { lower, upper, step } => {
                walk!(walk_opt(visitor, lower.as_deref()));
                walk!(walk_opt(visitor, upper.as_deref()));
                walk!(walk_opt(visitor, step.as_deref()));
            }
            ExprKind::Constant { .. } | ExprKind::Name { .. } => {}
        }
    })
}

pub fn walk_comprehension<V: Visitor>(visitor: &mut V, node: &Comprehension) -> VisitResult {
    walk_node!(visitor, node, visit_comprehension, leave_comprehension, {
        walk!(walk_expr(visitor, &node.target));
        walk!(walk_expr(visitor, &node.iter));
        walk!(walk_exprs(visitor, &node.ifs));
    })
}

// ============================================================================
// Patterns
// ============================================================================

pub fn walk_pattern<V: Visitor>(visitor: &mut V, node: &Pattern) -> VisitResult {
    walk_node!(visitor, node, visit_pattern, leave_pattern, {
        match &node.kind {
            PatternKind::MatchValue { value } => {
                walk!(walk_expr(visitor, value));
            }
            PatternKind::MatchSequence { patterns } | PatternKind::MatchOr { patterns } => {
                walk!(walk_patterns(visitor, patterns));
            }
            PatternKind::MatchMapping { keys, patterns, .. } => {
                for (key, pattern) in keys.iter().zip(patterns) {
                    walk!(walk_expr(visitor, key));
                    walk!(walk_pattern(visitor, pattern));
                }
            }
            PatternKind::MatchClass {
                cls,
                patterns,
                kwd_patterns,
                ..
            } => {
                walk!(walk_expr(visitor, cls));
                walk!(walk_patterns(visitor, patterns));
                walk!(walk_patterns(visitor, kwd_patterns));
            }
            PatternKind::MatchAs { pattern, .. } => {
                if let Some(pattern) = pattern {
                    walk!(walk_pattern(visitor, pattern));
                }
            }
            PatternKind::MatchSingleton { .. } | PatternKind::MatchStar { .. } => {}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_expression, parse_module};

    /// Records the order of visits and leaves by node type.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        stop_at_call: bool,
        skip_lambdas: bool,
    }

    impl Visitor for Recorder {
        fn visit_stmt(&mut self, _node: &Stmt) -> VisitResult {
            self.events.push("stmt".to_string());
            VisitResult::Continue
        }

        fn visit_expr(&mut self, node: &Expr) -> VisitResult {
            match &node.kind {
                ExprKind::Name { id, .. } => self.events.push(id.clone()),
                ExprKind::Call { .. } if self.stop_at_call => return VisitResult::Stop,
                ExprKind::Lambda { .. } if self.skip_lambdas => {
                    return VisitResult::SkipChildren
                }
                _ => {}
            }
            VisitResult::Continue
        }

        fn leave_expr(&mut self, node: &Expr) {
            if let ExprKind::Lambda { .. } = node.kind {
                self.events.push("/lambda".to_string());
            }
        }

        fn visit_arg(&mut self, node: &Arg) -> VisitResult {
            self.events.push(format!("arg:{}", node.arg));
            VisitResult::Continue
        }
    }

    #[test]
    fn names_in_source_order() {
        let parsed = parse_module("a = b\nif c:\n    d(e)\n", None).unwrap();
        let mut recorder = Recorder::default();
        assert_eq!(walk_module(&mut recorder, &parsed.root), VisitResult::Continue);
        assert_eq!(
            recorder.events,
            ["stmt", "a", "b", "stmt", "c", "stmt", "d", "e"]
        );
    }

    #[test]
    fn defaults_follow_their_parameters() {
        let parsed = parse_module("def f(a, b=x, *, c=y, d): pass\n", None).unwrap();
        let mut recorder = Recorder::default();
        walk_module(&mut recorder, &parsed.root);
        assert_eq!(
            recorder.events,
            ["stmt", "arg:a", "arg:b", "x", "arg:c", "y", "arg:d", "stmt"]
        );
    }

    #[test]
    fn stop_halts_traversal() {
        let parsed = parse_module("a\nb(c)\nd\n", None).unwrap();
        let mut recorder = Recorder {
            stop_at_call: true,
            ..Recorder::default()
        };
        assert_eq!(walk_module(&mut recorder, &parsed.root), VisitResult::Stop);
        assert_eq!(recorder.events, ["stmt", "a", "stmt"]);
    }

    #[test]
    fn skip_children_still_leaves() {
        let parsed = parse_expression("(lambda x: y)(z)", None).unwrap();
        let mut recorder = Recorder {
            skip_lambdas: true,
            ..Recorder::default()
        };
        walk_module(&mut recorder, &parsed.root);
        assert_eq!(recorder.events, ["/lambda", "z"]);
    }

    #[test]
    fn patterns_are_walked() {
        #[derive(Default)]
        struct Captures(Vec<String>);

        impl Visitor for Captures {
            fn visit_pattern(&mut self, node: &Pattern) -> VisitResult {
                if let PatternKind::MatchAs { name: Some(name), .. } = &node.kind {
                    self.0.push(name.clone());
                }
                VisitResult::Continue
            }
        }

        let source = "match p:\n    case Point(x=a, y=[b, *_]) | {'k': c}:\n        pass\n";
        let parsed = parse_module(source, None).unwrap();
        let mut captures = Captures::default();
        walk_module(&mut captures, &parsed.root);
        assert_eq!(captures.0, ["a", "b", "c"]);
    }
}
