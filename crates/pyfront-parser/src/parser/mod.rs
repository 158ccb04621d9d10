// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

mod engine;
mod errors;
mod grammar;
mod keywords;
mod memo;

pub use engine::Parser;
pub use errors::{PResult, ParserError, Result, SyntaxError, SyntaxErrorKind};
pub use keywords::{is_reserved, is_soft_keyword};
pub use memo::{ParseStats, RuleId};
