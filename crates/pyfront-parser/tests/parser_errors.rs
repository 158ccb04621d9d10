// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Diagnostics produced for invalid input.

use pyfront_parser::{parse_module, prettify_error, SyntaxError, SyntaxErrorKind};

fn error(source: &str) -> SyntaxError {
    match parse_module(source, Some("input.py")) {
        Ok(parsed) => panic!("{source:?} parsed: {:?}", parsed.root),
        Err(e) => e.into_syntax_error(),
    }
}

fn assert_message(source: &str, message: &str) {
    let err = error(source);
    assert_eq!(err.message, message, "{source:?}");
}

#[test]
fn assignment_targets() {
    assert_message("f() = 1\n", "cannot assign to function call");
    assert_message("1 = x\n", "cannot assign to literal");
    assert_message("a + b = c\n", "cannot assign to expression");
    assert_message("x, f() = 1, 2\n", "cannot assign to function call");
    assert_message("None = 1\n", "cannot assign to None");
}

#[test]
fn assignment_target_span() {
    let err = error("x = f() = 1\n");
    assert_eq!((err.start_offset, err.end_offset), (4, 7));
    assert_eq!(err.kind, SyntaxErrorKind::Grammar);
}

#[test]
fn annotated_and_augmented_targets() {
    assert_message("a, b: int\n", "only single target (not tuple) can be annotated");
    assert_message("[a, b]: int\n", "only single target (not list) can be annotated");
    assert_message("a, b += 1\n", "'tuple' is an illegal expression for augmented assignment");
}

#[test]
fn delete_targets() {
    assert_message("del f()\n", "cannot delete function call");
}

#[test]
fn missing_indented_block() {
    let err = error("if x:\npass\n");
    assert_eq!(err.message, "expected an indented block after 'if' statement on line 1");
    assert_eq!(err.start_line, 2);

    assert_message(
        "def f():\n    while x:\n    pass\n",
        "expected an indented block after 'while' statement on line 2",
    );
}

#[test]
fn missing_colon() {
    assert_message("while x\n    pass\n", "expected ':'");
}

#[test]
fn parameter_ordering() {
    for (source, message) in [
        ("def f(a=1, b): pass\n", "non-default argument follows default argument"),
        ("def f(**k, a): pass\n", "arguments cannot follow var-keyword argument"),
        ("def f(*, **k): pass\n", "named arguments must follow bare *"),
        ("def f(*a, *b): pass\n", "* argument may appear only once"),
        ("def f(/, a): pass\n", "at least one argument must precede /"),
        ("def f(a, /, b, /): pass\n", "/ may appear only once"),
        ("def f(*a, b, /): pass\n", "/ must be ahead of *"),
    ] {
        let err = error(source);
        assert_eq!(err.message, message, "{source:?}");
        assert_eq!(err.kind, SyntaxErrorKind::Semantic, "{source:?}");
    }
}

#[test]
fn call_argument_ordering() {
    assert_message("f(a=1, b)\n", "positional argument follows keyword argument");
    assert_message("f(**a, b)\n", "positional argument follows keyword argument unpacking");
    assert_message("f(**a, *b)\n", "iterable argument unpacking follows keyword argument unpacking");
    assert_message("f(x for x in y, 1)\n", "Generator expression must be parenthesized");
}

#[test]
fn keyword_argument_name_must_be_a_name() {
    assert_message(
        "f(a.b=1)\n",
        "expression cannot contain assignment, perhaps you meant \"==\"?",
    );
    assert_message("f(True=1)\n", "cannot assign to True");
}

#[test]
fn walrus_target_must_be_a_name() {
    assert_message(
        "if (a.b := 1): pass\n",
        "cannot use assignment expressions with attribute",
    );
}

#[test]
fn equals_in_a_condition() {
    assert_message(
        "if x = 1:\n    pass\n",
        "invalid syntax. Maybe you meant '==' or ':=' instead of '='?",
    );
}

#[test]
fn string_errors() {
    assert_message("x = b'a' 'b'\n", "cannot mix bytes and nonbytes literals");
    assert_message("x = f'{}'\n", "f-string: empty expression not allowed");
}

#[test]
fn bracket_mismatch() {
    let err = error("x = (1]\n");
    assert_eq!(err.kind, SyntaxErrorKind::Tokenize);
    assert_eq!(
        err.message,
        "closing parenthesis ']' does not match opening parenthesis '('"
    );
    assert_message("x = 1)\n", "unmatched ')'");
}

#[test]
fn inconsistent_dedent() {
    let err = error("if x:\n        a\n    b\n");
    assert_eq!(err.kind, SyntaxErrorKind::Tokenize);
    assert_eq!(err.start_line, 3);
}

#[test]
fn generic_failure_is_invalid_syntax() {
    let err = error("x = = 1\n");
    assert_eq!(err.message, "invalid syntax");
    assert_eq!(err.kind, SyntaxErrorKind::Grammar);
}

#[test]
fn failure_ignores_input_never_reached() {
    // The unterminated string on line 2 is never tokenized.
    let err = error("x = = 1\ny = 'abc\n");
    assert_eq!(err.kind, SyntaxErrorKind::Grammar);
    assert_eq!(err.message, "invalid syntax");
    assert_eq!(err.start_line, 1);
}

#[test]
fn backslash_at_end_of_input() {
    let err = error("x = 1\\\n");
    assert_eq!(err.kind, SyntaxErrorKind::Tokenize);
    assert_eq!(err.message, "unexpected EOF while parsing");
}

#[test]
fn nesting_past_the_bracket_limit() {
    let text = format!("x = {}a{}\n", "(".repeat(201), ")".repeat(201));
    let err = error(&text);
    assert_eq!(err.kind, SyntaxErrorKind::Tokenize);
    assert_eq!(err.message, "too many nested parentheses");
    assert_eq!(err.start_line, 1);
}

#[test]
fn decorator_without_definition() {
    let err = error("@d\nx = 1\n");
    assert_eq!(err.message, "invalid syntax");
}

#[test]
fn rendered_error_shows_the_line() {
    let err = parse_module("def f(a=1, b):\n    pass\n", None).unwrap_err();
    let rendered = prettify_error(err, "params.py");
    assert!(rendered.contains("params.py"), "{rendered}");
    assert!(rendered.contains("non-default argument follows default argument"));
    assert!(rendered.contains("def f(a=1, b):"));
}
