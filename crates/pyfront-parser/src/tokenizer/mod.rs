// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Indentation-aware Python tokenizer.

mod core;
mod stream;
mod token;

#[cfg(test)]
mod tests;

pub use self::core::{classify_type_comment, TokConfig, TokError, TokOrigin, TokState};
pub use self::stream::{Mark, TokenStream, TypeIgnore};
pub use self::token::{Token, TokenKind};

/// Tokenize `source` to completion. The last token is always the ENDMARKER.
///
/// Error tokens are returned in place; use [`first_error`] to find the first.
pub fn tokenize(source: &str, config: &TokConfig) -> Vec<Token> {
    TokState::new(source, config).collect()
}

/// The first lexical error in `tokens`, if any.
pub fn first_error(tokens: &[Token]) -> Option<(&Token, TokError)> {
    tokens
        .iter()
        .find_map(|tok| tok.error.map(|err| (tok, err)))
}
