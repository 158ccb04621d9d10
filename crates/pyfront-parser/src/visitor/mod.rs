// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only traversal of the syntax tree.
//!
//! Implement [`Visitor`] and hand it to one of the `walk_*` functions. The
//! walkers call `visit_*` before a node's children and `leave_*` after them,
//! in source order.
//!
//! ```
//! use pyfront_parser::visitor::{walk_module, VisitResult, Visitor};
//! use pyfront_parser::{parse_module, ast::{Expr, ExprKind}};
//!
//! #[derive(Default)]
//! struct Names(Vec<String>);
//!
//! impl Visitor for Names {
//!     fn visit_expr(&mut self, node: &Expr) -> VisitResult {
//!         if let ExprKind::Name { id, .. } = &node.kind {
//!             self.0.push(id.clone());
//!         }
//!         VisitResult::Continue
//!     }
//! }
//!
//! let parsed = parse_module("x = y + z", None).unwrap();
//! let mut names = Names::default();
//! walk_module(&mut names, &parsed.root);
//! assert_eq!(names.0, ["x", "y", "z"]);
//! ```

mod dispatch;
mod traits;

pub use dispatch::{
    walk_alias, walk_arg, walk_comprehension, walk_except_handler, walk_expr, walk_keyword,
    walk_match_case, walk_module, walk_parameters, walk_pattern, walk_stmt, walk_with_item,
};
pub use traits::{VisitResult, Visitor};
