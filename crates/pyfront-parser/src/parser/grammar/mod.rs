// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Grammar rules as methods on [`Parser`](super::Parser).
//!
//! The rules follow the Python PEG grammar. Left-recursive rules
//! (`sum: sum '+' term | term` and friends) are written as loops that extend
//! the left operand for as long as the next operator and operand match.
//! Rules that may be invoked repeatedly at the same position go through
//! `memoize`; the rest use `attempt` for backtracking.

mod arguments;
mod expressions;
mod invalid;
mod patterns;
mod statements;
mod targets;
