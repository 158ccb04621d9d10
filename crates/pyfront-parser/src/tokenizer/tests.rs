// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

/// Tests for the tokenizer state machine in `tokenizer::core`.
use crate::tokenizer::core::{TokConfig, TokError, TokOrigin, TokState};
use crate::tokenizer::token::TokenKind;
use pyfront_core::Span;

fn default_config() -> TokConfig {
    TokConfig {
        async_hacks: false,
        type_comments: false,
    }
}

fn tokenize_with_end_marker<'t>(
    text: &'t str,
    config: &TokConfig,
) -> Result<Vec<(TokenKind, &'t str)>, TokError> {
    let mut result = Vec::new();
    for tok in TokState::new(text, config) {
        if let Some(err) = tok.error {
            return Err(err);
        }
        result.push((tok.kind, tok.text(text)));
    }
    Ok(result)
}

fn tokenize_all<'t>(
    text: &'t str,
    config: &TokConfig,
) -> Result<Vec<(TokenKind, &'t str)>, TokError> {
    let mut result = tokenize_with_end_marker(text, config)?;
    // Remove the EndMarker, since it's on every token stream.
    assert_eq!(result.pop().expect("EndMarker").0, TokenKind::EndMarker);
    // Also remove the synthesized newline at the end.
    if let Some((TokenKind::Newline, "")) = result.last() {
        result.pop();
    }
    Ok(result)
}

#[test]
fn test_identifier() {
    assert_eq!(
        tokenize_all("test input", &default_config()),
        Ok(vec![(TokenKind::Name, "test"), (TokenKind::Name, "input")])
    );

    assert_eq!(
        tokenize_all("__with_underscores", &default_config()),
        Ok(vec![(TokenKind::Name, "__with_underscores")])
    );

    assert_eq!(
        tokenize_all("{ends_with_op}", &default_config()),
        Ok(vec![
            (TokenKind::LBrace, "{"),
            (TokenKind::Name, "ends_with_op"),
            (TokenKind::RBrace, "}")
        ])
    );

    assert_eq!(
        tokenize_all("\u{0100}\u{0101}\u{0102}unicode", &default_config()),
        Ok(vec![(TokenKind::Name, "\u{0100}\u{0101}\u{0102}unicode")])
    );
}

#[test]
fn test_keywords_are_names() {
    assert_eq!(
        tokenize_all("if match case _ type", &default_config()),
        Ok(vec![
            (TokenKind::Name, "if"),
            (TokenKind::Name, "match"),
            (TokenKind::Name, "case"),
            (TokenKind::Name, "_"),
            (TokenKind::Name, "type"),
        ])
    );
}

#[test]
fn test_async_await() {
    // normally async/await are keywords
    assert_eq!(
        tokenize_all("async await", &default_config()),
        Ok(vec![(TokenKind::Async, "async"), (TokenKind::Await, "await")])
    );

    let hacks = TokConfig {
        async_hacks: true,
        ..default_config()
    };

    // with async_hacks, they're just identifiers outside of `async def`
    assert_eq!(
        tokenize_all("async await", &hacks),
        Ok(vec![(TokenKind::Name, "async"), (TokenKind::Name, "await")])
    );

    // inside an `async def` body they're keywords again
    assert_eq!(
        tokenize_all("async def foo():\n  await bar\nawait baz\n", &hacks),
        Ok(vec![
            (TokenKind::Async, "async"),
            (TokenKind::Name, "def"),
            (TokenKind::Name, "foo"),
            (TokenKind::LPar, "("),
            (TokenKind::RPar, ")"),
            (TokenKind::Colon, ":"),
            (TokenKind::Newline, "\n"),
            (TokenKind::Indent, ""),
            (TokenKind::Await, "await"),
            (TokenKind::Name, "bar"),
            (TokenKind::Newline, "\n"),
            (TokenKind::Dedent, ""),
            (TokenKind::Name, "await"),
            (TokenKind::Name, "baz"),
            (TokenKind::Newline, "\n"),
        ])
    );
}

#[test]
fn test_blankline() {
    assert_eq!(
        tokenize_all("\n    \n\t\n\x0c\n\n", &default_config()),
        Ok(vec![])
    );
}

#[test]
fn test_newline() {
    assert_eq!(
        tokenize_all("a\nb\rc\r\n", &default_config()),
        Ok(vec![
            (TokenKind::Name, "a"),
            (TokenKind::Newline, "\n"),
            (TokenKind::Name, "b"),
            (TokenKind::Newline, "\r"),
            (TokenKind::Name, "c"),
            (TokenKind::Newline, "\r\n")
        ])
    );
}

#[test]
fn test_newline_suppressed_in_brackets() {
    assert_eq!(
        tokenize_all("f(a,\n  b)\n", &default_config()),
        Ok(vec![
            (TokenKind::Name, "f"),
            (TokenKind::LPar, "("),
            (TokenKind::Name, "a"),
            (TokenKind::Comma, ","),
            (TokenKind::Name, "b"),
            (TokenKind::RPar, ")"),
            (TokenKind::Newline, "\n"),
        ])
    );
}

#[test]
fn test_line_continuation() {
    assert_eq!(
        tokenize_all("x = 1 + \\\n    2\n", &default_config()),
        Ok(vec![
            (TokenKind::Name, "x"),
            (TokenKind::Equal, "="),
            (TokenKind::Number, "1"),
            (TokenKind::Plus, "+"),
            (TokenKind::Number, "2"),
            (TokenKind::Newline, "\n"),
        ])
    );

    assert_eq!(
        tokenize_all("x = \\ 1", &default_config()),
        Err(TokError::UnexpectedCharacterAfterBackslash)
    );

    assert_eq!(
        tokenize_all("x = \\", &default_config()),
        Err(TokError::UnexpectedEof)
    );

    assert_eq!(
        tokenize_all("x = 1\\\n", &default_config()),
        Err(TokError::UnexpectedEof)
    );

    assert_eq!(
        tokenize_all("x = 1\\\r\n", &default_config()),
        Err(TokError::UnexpectedEof)
    );
}

#[test]
fn test_bracket_nesting_limit() {
    let nested = |n: usize| format!("{}a{}", "(".repeat(n), ")".repeat(n));

    let source = nested(200);
    let tokens = tokenize_all(&source, &default_config()).expect("200 levels are allowed");
    assert_eq!(tokens.len(), 401);

    assert_eq!(
        tokenize_all(&nested(201), &default_config()),
        Err(TokError::TooManyParentheses)
    );

    let mixed = format!("{}1{}", "[(".repeat(101), ")]".repeat(101));
    assert_eq!(
        tokenize_all(&mixed, &default_config()),
        Err(TokError::TooManyParentheses)
    );
}

#[test]
fn test_indent_dedent() {
    assert_eq!(
        tokenize_all("one\n  two\n  sameindent\n", &default_config()),
        Ok(vec![
            (TokenKind::Name, "one"),
            (TokenKind::Newline, "\n"),
            (TokenKind::Indent, ""),
            (TokenKind::Name, "two"),
            (TokenKind::Newline, "\n"),
            (TokenKind::Name, "sameindent"),
            (TokenKind::Newline, "\n"),
            (TokenKind::Dedent, "")
        ])
    );

    assert_eq!(
        tokenize_all("one\n  two\n  \tthree\n", &default_config()),
        Ok(vec![
            (TokenKind::Name, "one"),
            (TokenKind::Newline, "\n"),
            (TokenKind::Indent, ""),
            (TokenKind::Name, "two"),
            (TokenKind::Newline, "\n"),
            (TokenKind::Indent, ""),
            (TokenKind::Name, "three"),
            (TokenKind::Newline, "\n"),
            (TokenKind::Dedent, ""),
            (TokenKind::Dedent, "")
        ])
    );

    // indentation decreases to a level that was never on the stack
    assert_eq!(
        tokenize_all("    one\n  two", &default_config()),
        Err(TokError::Dedent),
    );

    // TabSpace error without change in indentation
    assert_eq!(
        tokenize_all("        one\n\ttwo\n", &default_config()),
        Err(TokError::TabSpace),
    );

    // TabSpace error with increase in indentation
    assert_eq!(
        tokenize_all("        one\n\t\ttwo\n", &default_config()),
        Err(TokError::TabSpace),
    );

    // TabSpace error with decrease in indentation
    assert_eq!(
        tokenize_all("        one\n        \ttwo\n\tthree\n", &default_config()),
        Err(TokError::TabSpace),
    );

    // looks like a TabSpace error, but the two lines agree in both widths
    assert!(tokenize_all("        \tone\n\t        two\n", &default_config()).is_ok());
}

#[test]
fn test_indent_depth_limit() {
    let mut source = String::new();
    for depth in 0..101 {
        source.push_str(&" ".repeat(depth));
        source.push_str("if x:\n");
    }
    assert_eq!(
        tokenize_all(&source, &default_config()),
        Err(TokError::TooDeep)
    );
}

#[test]
fn test_indentation_balances() {
    let source = "def f():\n    if x:\n        pass\n    return 1\n";
    let kinds: Vec<TokenKind> = tokenize_with_end_marker(source, &default_config())
        .unwrap()
        .into_iter()
        .map(|(kind, _)| kind)
        .collect();
    let indents = kinds.iter().filter(|k| **k == TokenKind::Indent).count();
    let dedents = kinds.iter().filter(|k| **k == TokenKind::Dedent).count();
    assert_eq!(indents, 2);
    assert_eq!(dedents, 2);
}

#[test]
fn test_integer_decimal() {
    assert_eq!(
        tokenize_all("123456789", &default_config()),
        Ok(vec![(TokenKind::Number, "123456789")])
    );

    assert_eq!(
        tokenize_all("1_2_3", &default_config()),
        Ok(vec![(TokenKind::Number, "1_2_3")])
    );

    assert_eq!(
        tokenize_all("123_", &default_config()),
        Err(TokError::BadDecimal),
    );

    assert_eq!(
        tokenize_all("1__000", &default_config()),
        Err(TokError::BadDecimal),
    );
}

#[test]
fn test_integer_leading_zeros() {
    assert_eq!(
        tokenize_all("000", &default_config()),
        Ok(vec![(TokenKind::Number, "000")])
    );

    assert_eq!(
        tokenize_all("0_0_0", &default_config()),
        Ok(vec![(TokenKind::Number, "0_0_0")])
    );

    assert_eq!(
        tokenize_all("00123", &default_config()),
        Err(TokError::BadDecimalLeadingZeros)
    );

    // leading zeros are fine on floats and imaginary literals
    assert_eq!(
        tokenize_all("0012.5 007j", &default_config()),
        Ok(vec![(TokenKind::Number, "0012.5"), (TokenKind::Number, "007j")])
    );
}

#[test]
fn test_integer_hexadecimal() {
    assert_eq!(
        tokenize_all("0x00Aa12Ff", &default_config()),
        Ok(vec![(TokenKind::Number, "0x00Aa12Ff")]),
    );

    assert_eq!(
        tokenize_all("0xA_B_C", &default_config()),
        Ok(vec![(TokenKind::Number, "0xA_B_C")]),
    );

    // no separator directly after the base prefix
    assert_eq!(
        tokenize_all("0x_1", &default_config()),
        Err(TokError::BadHexadecimal),
    );

    assert_eq!(
        tokenize_all("0x123_", &default_config()),
        Err(TokError::BadHexadecimal),
    );

    assert_eq!(
        tokenize_all("0x", &default_config()),
        Err(TokError::BadHexadecimal),
    );
}

#[test]
fn test_integer_octal() {
    assert_eq!(
        tokenize_all("0o45670", &default_config()),
        Ok(vec![(TokenKind::Number, "0o45670")]),
    );

    assert_eq!(
        tokenize_all("0O1_2", &default_config()),
        Ok(vec![(TokenKind::Number, "0O1_2")]),
    );

    assert_eq!(
        tokenize_all("0o_7", &default_config()),
        Err(TokError::BadOctal),
    );

    assert_eq!(
        tokenize_all("0o12_", &default_config()),
        Err(TokError::BadOctal),
    );

    assert_eq!(
        tokenize_all("0o789", &default_config()),
        Err(TokError::BadOctalDigit('8')),
    );
}

#[test]
fn test_integer_binary() {
    assert_eq!(
        tokenize_all("0b00101", &default_config()),
        Ok(vec![(TokenKind::Number, "0b00101")]),
    );

    assert_eq!(
        tokenize_all("0B1_0", &default_config()),
        Ok(vec![(TokenKind::Number, "0B1_0")]),
    );

    assert_eq!(
        tokenize_all("0b_1", &default_config()),
        Err(TokError::BadBinary),
    );

    assert_eq!(
        tokenize_all("0b0123", &default_config()),
        Err(TokError::BadBinaryDigit('2')),
    );
}

#[test]
fn test_fraction() {
    // fraction
    assert_eq!(
        tokenize_all("1.25", &default_config()),
        Ok(vec![(TokenKind::Number, "1.25")]),
    );

    // missing leading 0
    assert_eq!(
        tokenize_all(".25", &default_config()),
        Ok(vec![(TokenKind::Number, ".25")]),
    );

    // missing trailing 0
    assert_eq!(
        tokenize_all("1.", &default_config()),
        Ok(vec![(TokenKind::Number, "1.")]),
    );

    // exponents
    assert_eq!(
        tokenize_all("1e10 1.5E-3 2e+4", &default_config()),
        Ok(vec![
            (TokenKind::Number, "1e10"),
            (TokenKind::Number, "1.5E-3"),
            (TokenKind::Number, "2e+4"),
        ]),
    );

    // imaginary
    assert_eq!(
        tokenize_all("1j 2.5J 1e3j", &default_config()),
        Ok(vec![
            (TokenKind::Number, "1j"),
            (TokenKind::Number, "2.5J"),
            (TokenKind::Number, "1e3j"),
        ]),
    );

    // `e` that doesn't start an exponent belongs to the next token
    assert_eq!(
        tokenize_all("1else", &default_config()),
        Ok(vec![(TokenKind::Number, "1"), (TokenKind::Name, "else")]),
    );
}

#[test]
fn test_misplaced_underscores() {
    for bad in ["1_.5", "1._5", "1e_5", "1_e5", "1e+_5", "1_j", "1.5_", "1_000_"] {
        assert_eq!(
            tokenize_all(bad, &default_config()),
            Err(TokError::BadDecimal),
            "{bad} should be rejected"
        );
    }
    assert_eq!(
        tokenize_all("1_000", &default_config()),
        Ok(vec![(TokenKind::Number, "1_000")])
    );
}

#[test]
fn test_string() {
    // empty, single quote
    assert_eq!(
        tokenize_all("''", &default_config()),
        Ok(vec![(TokenKind::String, "''")]),
    );

    // empty, double quote
    assert_eq!(
        tokenize_all(r#""""#, &default_config()),
        Ok(vec![(TokenKind::String, r#""""#)]),
    );

    // simple string
    assert_eq!(
        tokenize_all("'test'", &default_config()),
        Ok(vec![(TokenKind::String, "'test'")]),
    );

    // mixed quotes
    assert_eq!(
        tokenize_all(r#""test'"#, &default_config()),
        Err(TokError::UnterminatedString),
    );

    // escaped quote
    assert_eq!(
        tokenize_all(r"'te\'st'", &default_config()),
        Ok(vec![(TokenKind::String, r"'te\'st'")]),
    );

    // escaped newline
    assert_eq!(
        tokenize_all("'one\\\ntwo'", &default_config()),
        Ok(vec![(TokenKind::String, "'one\\\ntwo'")]),
    );

    // newline ends a single-quoted string
    assert_eq!(
        tokenize_all("'one\ntwo'", &default_config()),
        Err(TokError::UnterminatedString),
    );

    // adjacent literals are separate tokens
    assert_eq!(
        tokenize_all("'a' \"b\"", &default_config()),
        Ok(vec![(TokenKind::String, "'a'"), (TokenKind::String, "\"b\"")]),
    );
}

#[test]
fn test_string_triple_quoted() {
    assert_eq!(
        tokenize_all("'''one\ntwo'''", &default_config()),
        Ok(vec![(TokenKind::String, "'''one\ntwo'''")]),
    );

    assert_eq!(
        tokenize_all("\"\"\"a \"quoted\" \"\" word\"\"\"", &default_config()),
        Ok(vec![(
            TokenKind::String,
            "\"\"\"a \"quoted\" \"\" word\"\"\""
        )]),
    );

    assert_eq!(
        tokenize_all("'''unterminated\n", &default_config()),
        Err(TokError::UnterminatedTripleQuotedString),
    );
}

#[test]
fn test_string_prefix() {
    for literal in [
        "r'x'", "R'x'", "b'x'", "B'x'", "u'x'", "f'x'", "F'x'", "br'x'", "Rb'x'", "rB'x'",
        "fr'x'", "rF'x'",
    ] {
        assert_eq!(
            tokenize_all(literal, &default_config()),
            Ok(vec![(TokenKind::String, literal)]),
        );
    }

    // not a prefix: name followed by string
    assert_eq!(
        tokenize_all("ub'x'", &default_config()),
        Ok(vec![(TokenKind::Name, "ub"), (TokenKind::String, "'x'")]),
    );
}

#[test]
fn test_unterminated_string_points_at_quote() {
    let source = "x = \"unterminated";
    let tok = TokState::new(source, &default_config())
        .find(|t| t.is_error())
        .expect("error token");
    assert_eq!(tok.error, Some(TokError::UnterminatedString));
    assert_eq!(tok.span.start, 4);
    assert_eq!((tok.start_line, tok.start_col), (1, 4));
}

#[test]
fn test_operator() {
    assert_eq!(
        tokenize_all("**= ** * -> . ... ... := //= <<=", &default_config()),
        Ok(vec![
            (TokenKind::DoubleStarEqual, "**="),
            (TokenKind::DoubleStar, "**"),
            (TokenKind::Star, "*"),
            (TokenKind::RArrow, "->"),
            (TokenKind::Dot, "."),
            (TokenKind::Ellipsis, "..."),
            (TokenKind::Ellipsis, "..."),
            (TokenKind::ColonEqual, ":="),
            (TokenKind::DoubleSlashEqual, "//="),
            (TokenKind::LeftShiftEqual, "<<="),
        ]),
    );

    assert_eq!(
        tokenize_all("....", &default_config()),
        Ok(vec![(TokenKind::Ellipsis, "..."), (TokenKind::Dot, ".")]),
    );
}

#[test]
fn test_bad_character() {
    assert_eq!(
        tokenize_all("a $ b", &default_config()),
        Err(TokError::BadCharacter('$')),
    );

    // error tokens always make progress
    let toks: Vec<_> = TokState::new("€€", &default_config()).collect();
    assert_eq!(toks[0].error, Some(TokError::BadCharacter('€')));
    assert_eq!(toks[1].error, Some(TokError::BadCharacter('€')));
    assert_eq!(toks[1].span.start, 3);
}

#[test]
fn test_brackets() {
    assert_eq!(
        tokenize_all("(1, 2", &default_config()),
        Err(TokError::UnclosedBracket('(')),
    );
    assert_eq!(
        tokenize_all("1)", &default_config()),
        Err(TokError::UnmatchedBracket(')')),
    );
    assert_eq!(
        tokenize_all("(1]", &default_config()),
        Err(TokError::MismatchedBracket(']', '(')),
    );
}

#[test]
fn test_fake_newline() {
    assert_eq!(
        tokenize_with_end_marker("foo", &default_config()),
        Ok(vec![
            (TokenKind::Name, "foo"),
            (TokenKind::Newline, ""),
            (TokenKind::EndMarker, "")
        ])
    );
}

#[test]
fn test_fake_newline_when_at_bol() {
    assert_eq!(
        tokenize_with_end_marker("(\n \\\n)", &default_config()),
        Ok(vec![
            (TokenKind::LPar, "("),
            (TokenKind::RPar, ")"),
            (TokenKind::Newline, ""),
            (TokenKind::EndMarker, "")
        ])
    )
}

#[test]
fn test_no_fake_newline_for_empty_input() {
    assert_eq!(
        tokenize_with_end_marker("", &default_config()),
        Ok(vec![(TokenKind::EndMarker, "")])
    );
}

#[test]
fn test_no_fake_newline_for_only_whitespaces() {
    assert_eq!(
        tokenize_with_end_marker("   ", &default_config()),
        Ok(vec![(TokenKind::EndMarker, "")])
    );
}

#[test]
fn test_add_dedents_after_fake_newline() {
    assert_eq!(
        tokenize_with_end_marker("if 1:\n  if 2:\n    foo", &default_config()),
        Ok(vec![
            (TokenKind::Name, "if"),
            (TokenKind::Number, "1"),
            (TokenKind::Colon, ":"),
            (TokenKind::Newline, "\n"),
            (TokenKind::Indent, ""),
            (TokenKind::Name, "if"),
            (TokenKind::Number, "2"),
            (TokenKind::Colon, ":"),
            (TokenKind::Newline, "\n"),
            (TokenKind::Indent, ""),
            (TokenKind::Name, "foo"),
            (TokenKind::Newline, ""),
            (TokenKind::Dedent, ""),
            (TokenKind::Dedent, ""),
            (TokenKind::EndMarker, "")
        ])
    );
}

#[test]
fn test_add_dedents_for_dangling_indent_with_comment() {
    assert_eq!(
        tokenize_with_end_marker("if 1:\n  if 2:\n    # foo", &default_config()),
        Ok(vec![
            (TokenKind::Name, "if"),
            (TokenKind::Number, "1"),
            (TokenKind::Colon, ":"),
            (TokenKind::Newline, "\n"),
            (TokenKind::Indent, ""),
            (TokenKind::Name, "if"),
            (TokenKind::Number, "2"),
            (TokenKind::Colon, ":"),
            (TokenKind::Newline, "\n"),
            (TokenKind::Dedent, ""),
            (TokenKind::EndMarker, "")
        ])
    );
}

#[test]
fn test_type_comments() {
    let config = TokConfig {
        type_comments: true,
        ..default_config()
    };
    assert_eq!(
        tokenize_all("x = 1  # type: int\n# type: ignore\n# plain\n", &config),
        Ok(vec![
            (TokenKind::Name, "x"),
            (TokenKind::Equal, "="),
            (TokenKind::Number, "1"),
            (TokenKind::TypeComment, "# type: int"),
            (TokenKind::Newline, "\n"),
            (TokenKind::TypeIgnore, "# type: ignore"),
        ])
    );

    // off by default: comments are skipped
    assert_eq!(
        tokenize_all("x = 1  # type: int\n", &default_config()),
        Ok(vec![
            (TokenKind::Name, "x"),
            (TokenKind::Equal, "="),
            (TokenKind::Number, "1"),
            (TokenKind::Newline, "\n"),
        ])
    );
}

#[test]
fn test_spans_cover_source() {
    let source = "def f(a, b=1):\n    # comment\n    return a + b  # tail\n\nx = f'{1}' b'y'\n";
    let mut rebuilt = String::new();
    let mut last = 0;
    for tok in TokState::new(source, &default_config()) {
        assert!(!tok.is_error());
        if tok.span.is_empty() {
            continue;
        }
        assert!(tok.span.start >= last);
        rebuilt.push_str(&source[last..tok.span.start]);
        rebuilt.push_str(tok.text(source));
        last = tok.span.end;
    }
    rebuilt.push_str(&source[last..]);
    assert_eq!(rebuilt, source);
}

#[test]
fn test_token_positions() {
    let source = "a = 1\nbb = \"é\" + c\n";
    let toks: Vec<_> = TokState::new(source, &default_config()).collect();
    let c = toks
        .iter()
        .find(|t| t.text(source) == "c")
        .expect("name c");
    assert_eq!((c.start_line, c.start_col), (2, 12));
    assert_eq!((c.end_line, c.end_col), (2, 13));

    let newline = toks[3];
    assert_eq!(newline.kind, TokenKind::Newline);
    assert_eq!((newline.start_line, newline.start_col), (1, 5));
    assert_eq!((newline.end_line, newline.end_col), (1, 6));
}

#[test]
fn test_nested_origin() {
    // tokenize just the `a +\n b` inside the braces, as an f-string field would
    let source = "f'{a +\n b}'";
    let origin = TokOrigin {
        range: Span::new(3, 9),
        line: 1,
        col: 3,
        nested: true,
    };
    let toks: Vec<_> = TokState::with_origin(source, &default_config(), origin).collect();
    let kinds: Vec<TokenKind> = toks.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Name,
            TokenKind::Plus,
            TokenKind::Name,
            TokenKind::EndMarker
        ]
    );
    assert_eq!(toks[0].span, Span::new(3, 4));
    assert_eq!((toks[2].start_line, toks[2].start_col), (2, 1));
}
