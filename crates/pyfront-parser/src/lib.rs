// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! A Python front end: tokenizer, packrat parser and AST builder.
//!
//! Source text goes in; a typed syntax tree or a located [`SyntaxError`]
//! comes out. Nothing is executed and no bytecode is produced.
//!
//! # Overview
//!
//! - **Tokenizing**: [`tokenize`] produces the raw token sequence, including
//!   INDENT/DEDENT and error tokens.
//! - **Parsing**: [`parse_module`], [`parse_expression`] and
//!   [`parse_interactive`] run the matching start rule; use
//!   [`parse_module_with_options`] for full control through [`ParseOptions`].
//! - **Traversal**: the [`visitor`] module walks the resulting tree.
//! - **Diagnostics**: [`prettify_error`] renders an error against its source.
//!
//! # Quick Start
//!
//! ```
//! use pyfront_parser::{parse_module, ast::StmtKind};
//!
//! let parsed = parse_module("def hello(): return 'world'\n", None).expect("parse error");
//! assert!(matches!(parsed.root.body()[0].kind, StmtKind::FunctionDef(_)));
//! ```
//!
//! # Version-Aware Parsing
//!
//! ```
//! use pyfront_parser::{parse_module_with_options, ParseOptions, PythonVersion};
//!
//! // Before 3.10 `match` is an ordinary identifier.
//! let options = ParseOptions::new(PythonVersion::V3_9);
//! assert!(parse_module_with_options("match = 1\n", &options).is_ok());
//! ```

use std::collections::BTreeMap;

use pyfront_core::{LineIndex, Span};
use tracing::debug;

pub mod ast;
pub mod builder;
pub mod options;
pub mod parser;
pub mod tokenizer;
pub mod visitor;

pub use ast::{Expr, Mod, Stmt};
pub use options::{InputMode, ParseOptions, PythonVersion};
pub use parser::{ParseStats, ParserError, Result, SyntaxError, SyntaxErrorKind};
pub use tokenizer::{TokError, Token, TokenKind};

use parser::Parser;
use tokenizer::{TokConfig, TokOrigin};

/// A successful parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub root: Mod,
    /// Every `# type:` comment body keyed by its 1-based line, including
    /// the ones already attached to nodes.
    pub type_comments: BTreeMap<usize, String>,
}

// ============================================================================
// Tokenizing
// ============================================================================

/// Tokenizes Python source code.
///
/// This is a low-level function; most callers want [`parse_module`]. The
/// last token is always the ENDMARKER.
///
/// # Errors
///
/// Returns a [`ParserError::TokenizerError`] for the first error token.
///
/// # Example
///
/// ```
/// use pyfront_parser::{tokenize, TokenKind};
///
/// let tokens = tokenize("x = 1").expect("tokenize error");
/// assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::EndMarker));
/// ```
pub fn tokenize(source: &str) -> Result<'_, Vec<Token>> {
    tokenize_with_config(source, &TokConfig::default())
}

/// Like [`tokenize`], with explicit tokenizer switches.
pub fn tokenize_with_config<'a>(source: &'a str, config: &TokConfig) -> Result<'a, Vec<Token>> {
    let tokens = tokenizer::tokenize(source, config);
    if let Some((tok, err)) = tokenizer::first_error(&tokens) {
        return Err(ParserError::new(SyntaxError::from_token(tok, err), source));
    }
    Ok(tokens)
}

// ============================================================================
// Parsing
// ============================================================================

/// Parses `source` as described by `options`.
///
/// A leading UTF-8 byte order mark is skipped; offsets in the result refer
/// to the text after it.
///
/// # Example
///
/// ```
/// use pyfront_parser::{parse_module_with_options, InputMode, Mod, ParseOptions};
///
/// let options = ParseOptions::default().with_mode(InputMode::Expression);
/// let parsed = parse_module_with_options("a + b", &options).expect("parse error");
/// assert!(matches!(parsed.root, Mod::Expression { .. }));
/// ```
pub fn parse_module_with_options<'a>(source: &'a str, options: &ParseOptions) -> Result<'a, Parsed> {
    parse_module_with_stats(source, options).map(|(parsed, _)| parsed)
}

/// Like [`parse_module_with_options`], also returning the engine counters.
pub fn parse_module_with_stats<'a>(
    mut source: &'a str,
    options: &ParseOptions,
) -> Result<'a, (Parsed, ParseStats)> {
    if let Some(stripped) = source.strip_prefix('\u{feff}') {
        source = stripped;
    }
    debug!(
        filename = %options.filename,
        mode = ?options.mode,
        bytes = source.len(),
        "parse start"
    );
    let mut parser = Parser::new(source, options);
    let root = parser
        .parse(options.mode)
        .map_err(|err| ParserError::new(err, source))?;
    let parsed = Parsed {
        root,
        type_comments: parser.take_type_comments(),
    };
    Ok((parsed, parser.stats().clone()))
}

/// Parses a module with default options.
///
/// `filename` is only used in diagnostics.
pub fn parse_module<'a>(source: &'a str, filename: Option<&str>) -> Result<'a, Parsed> {
    parse_module_with_options(source, &options_for(InputMode::Module, filename))
}

/// Parses a single expression (the `eval` start rule).
pub fn parse_expression<'a>(source: &'a str, filename: Option<&str>) -> Result<'a, Parsed> {
    parse_module_with_options(source, &options_for(InputMode::Expression, filename))
}

/// Parses one interactive statement (the `single` start rule).
pub fn parse_interactive<'a>(source: &'a str, filename: Option<&str>) -> Result<'a, Parsed> {
    parse_module_with_options(source, &options_for(InputMode::Interactive, filename))
}

/// Parses `range` of `source` as a standalone expression, the way an
/// f-string replacement field is parsed. Newlines inside the range are
/// insignificant, and every span and position in the result refers to
/// the whole of `source`.
///
/// # Example
///
/// ```
/// use pyfront_core::Span;
/// use pyfront_parser::{parse_expression_from, ParseOptions};
///
/// let source = "f'{a + b}'";
/// let expr = parse_expression_from(source, Span::new(3, 8), &ParseOptions::default()).unwrap();
/// assert_eq!(expr.span, Span::new(3, 8));
/// ```
pub fn parse_expression_from<'a>(
    source: &'a str,
    range: Span,
    options: &ParseOptions,
) -> Result<'a, Expr> {
    let invalid = |message: &str| {
        let err = SyntaxError::at_span(SyntaxErrorKind::Grammar, message, range, 1, 0);
        ParserError::new(err, source)
    };
    if range.start > range.end
        || range.end > source.len()
        || !source.is_char_boundary(range.start)
        || !source.is_char_boundary(range.end)
    {
        return Err(invalid("expression range is outside the source"));
    }
    let (line, col) = LineIndex::new(source).position(range.start);
    let origin = TokOrigin {
        range,
        line,
        col,
        nested: true,
    };
    let mut parser = Parser::with_origin(
        source,
        origin,
        options.tok_config(),
        options.version,
        options.call_invalid_rules,
    );
    match parser.parse(InputMode::FString) {
        Ok(Mod::Expression { body }) => Ok(*body),
        Ok(_) => Err(invalid("expected an expression")),
        Err(err) => Err(ParserError::new(err, source)),
    }
}

fn options_for(mode: InputMode, filename: Option<&str>) -> ParseOptions {
    let options = ParseOptions::default().with_mode(mode);
    match filename {
        Some(filename) => options.with_filename(filename),
        None => options,
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Renders a parse error as an annotated source excerpt, one line of
/// context on each side, titled `label` (usually the file name).
///
/// # Example
///
/// ```
/// use pyfront_parser::{parse_module, prettify_error};
///
/// let err = parse_module("x = (1,\n", None).unwrap_err();
/// let formatted = prettify_error(err, "example.py");
/// assert!(formatted.contains("example.py"));
/// ```
pub fn prettify_error(err: ParserError<'_>, label: &str) -> String {
    use annotate_snippets::{Level, Renderer, Snippet};

    let text = err.source_text();
    let error = err.syntax_error();
    let index = LineIndex::new(text);

    let context = 1;
    let first_line = error.start_line.saturating_sub(context).max(1);
    let (end_line, _) = index.position(error.end_offset.min(text.len()));
    let last_line = (end_line + context).min(index.line_count().max(1));
    let excerpt_start = index.line_start(first_line);
    let excerpt_end = index.line_end(last_line).max(excerpt_start);
    let Some(excerpt) = text.get(excerpt_start..excerpt_end) else {
        return format!("{}: {}", label, error);
    };

    let start = error.start_offset.saturating_sub(excerpt_start).min(excerpt.len());
    let end = error.end_offset.saturating_sub(excerpt_start).min(excerpt.len());
    // Zero-width errors (such as at EOF) still get a one-column marker.
    let end = if end <= start { start + 1 } else { end };

    let title = format!("{}: {}", label, error.message);
    let rendered = Renderer::plain()
        .render(
            Level::Error.title(&title).snippet(
                Snippet::source(excerpt)
                    .line_start(first_line)
                    .origin(label)
                    .fold(false)
                    .annotation(Level::Error.span(start..end).label(&error.message)),
            ),
        )
        .to_string();
    rendered
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExprKind, StmtKind};

    #[test]
    fn test_bom_is_skipped() {
        let parsed = parse_module("\u{feff}x = 1\n", None).unwrap();
        let stmt = &parsed.root.body()[0];
        assert_eq!(stmt.span, Span::new(0, 5));
    }

    #[test]
    fn test_tokenize_reports_first_error() {
        let err = tokenize("x = 'abc\ny = 1\n").unwrap_err();
        let syntax = err.syntax_error();
        assert_eq!(syntax.kind, SyntaxErrorKind::Tokenize);
        assert_eq!(syntax.start_offset, 4);
        assert!(matches!(err, ParserError::TokenizerError(..)));
    }

    #[test]
    fn test_parse_expression_mode() {
        let parsed = parse_expression("x if y else z\n", None).unwrap();
        let Mod::Expression { body } = parsed.root else {
            panic!("expected an expression root");
        };
        assert!(matches!(body.kind, ExprKind::IfExp { .. }));
    }

    #[test]
    fn test_parse_interactive_single_statement() {
        let parsed = parse_interactive("x = 1\n", None).unwrap();
        assert!(matches!(parsed.root, Mod::Interactive { .. }));

        let err = parse_interactive("x = 1\ny = 2\n", None).unwrap_err();
        assert_eq!(
            err.syntax_error().message,
            "multiple statements found while compiling a single statement"
        );
    }

    #[test]
    fn test_parse_expression_from_keeps_outer_positions() {
        let source = "value = compute(\n    a.b[c]\n)\n";
        let start = source.find("a.b").unwrap();
        let range = Span::new(start, start + "a.b[c]".len());
        let expr = parse_expression_from(source, range, &ParseOptions::default()).unwrap();
        assert!(matches!(expr.kind, ExprKind::Subscript { .. }));
        assert_eq!(expr.span, range);
    }

    #[test]
    fn test_parse_expression_from_rejects_bad_range() {
        let err = parse_expression_from("x", Span::new(0, 5), &ParseOptions::default());
        assert!(err.is_err());
    }

    #[test]
    fn test_type_comments_are_returned() {
        let source = "x = []  # type: List[int]\n";
        let parsed = parse_module(source, None).unwrap();
        let StmtKind::Assign { type_comment, .. } = &parsed.root.body()[0].kind else {
            panic!("expected an assignment");
        };
        assert_eq!(type_comment.as_deref(), Some("List[int]"));
        assert_eq!(parsed.type_comments.get(&1).map(String::as_str), Some("List[int]"));
    }

    #[test]
    fn test_prettify_error_names_the_file() {
        let err = parse_module("def f(:\n    pass\n", Some("bad.py")).unwrap_err();
        let message = err.syntax_error().message.clone();
        let formatted = prettify_error(err, "bad.py");
        assert!(formatted.contains("bad.py"));
        assert!(formatted.contains(&message));
        assert!(formatted.contains("def f(:"));
    }
}
