// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Reserved and soft keyword tables.
//!
//! Both tables are built once on first use and only read afterwards, so any
//! number of parses on any number of threads can share them.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Words that can never be used as identifiers. `async` and `await` are
/// absent: the tokenizer gives them their own token kinds.
pub static RESERVED_KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "False", "None", "True", "and", "as", "assert", "break", "class", "continue", "def",
        "del", "elif", "else", "except", "finally", "for", "from", "global", "if", "import",
        "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
        "while", "with", "yield",
    ]
    .into_iter()
    .collect()
});

/// Words that are keywords only in particular grammar positions.
pub static SOFT_KEYWORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["_", "case", "match"].into_iter().collect());

pub fn is_reserved(word: &str) -> bool {
    RESERVED_KEYWORDS.contains(word)
}

pub fn is_soft_keyword(word: &str) -> bool {
    SOFT_KEYWORDS.contains(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_keywords_are_not_reserved() {
        for word in SOFT_KEYWORDS.iter() {
            assert!(!is_reserved(word), "{word} must stay usable as a name");
        }
        assert!(is_soft_keyword("match"));
        assert!(is_soft_keyword("case"));
        assert!(!is_soft_keyword("type"));
        assert!(is_reserved("lambda"));
        assert!(!is_reserved("print"));
    }
}
