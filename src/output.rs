//! JSON output types and serialization for CLI responses.
//!
//! Every command prints exactly one JSON document to stdout. These types are
//! that contract:
//!
//! 1. **Always JSON:** no mixed text/JSON on stdout; logs go to stderr
//! 2. **Status first:** every response has `status` as its first field
//! 3. **Deterministic:** same input, same bytes
//! 4. **Versioned:** `schema_version` in every response

use std::collections::BTreeMap;
use std::io::{self, Write};

use pyfront_parser::{InputMode, Mod, SyntaxError, SyntaxErrorKind, Token, TokenKind};
use serde::Serialize;

use crate::error::{OutputErrorCode, PyfrontError};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Common Types
// ============================================================================

/// Location in a source file.
///
/// `line` is 1-based; `col` is a 0-based UTF-8 byte column, matching the
/// parser's own positions.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub col: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_start: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_end: Option<usize>,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize, col: usize) -> Self {
        Location {
            file: file.into(),
            line,
            col,
            byte_start: None,
            byte_end: None,
        }
    }

    /// The start of `err`, with its byte range.
    pub fn of_syntax_error(file: impl Into<String>, err: &SyntaxError) -> Self {
        Location {
            file: file.into(),
            line: err.start_line,
            col: err.start_col,
            byte_start: Some(err.start_offset),
            byte_end: Some(err.end_offset),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Numeric error code, also the process exit code.
    pub code: u8,
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl ErrorInfo {
    pub fn from_error(err: &PyfrontError) -> Self {
        let code = OutputErrorCode::from(err).code();
        match err {
            PyfrontError::Syntax {
                file,
                error,
                rendered,
            } => ErrorInfo {
                code,
                message: error.message.clone(),
                details: Some(serde_json::json!({
                    "kind": error.kind,
                    "rendered": rendered,
                })),
                location: Some(Location::of_syntax_error(file.clone(), error)),
            },
            PyfrontError::FileNotFound { path, .. } | PyfrontError::Config { path, .. } => {
                ErrorInfo {
                    code,
                    message: err.to_string(),
                    details: Some(serde_json::json!({ "path": path })),
                    location: None,
                }
            }
            _ => ErrorInfo {
                code,
                message: err.to_string(),
                details: None,
                location: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &PyfrontError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// tokens
// ============================================================================

/// One token of a `tokens` response.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TokenInfo {
    pub kind: TokenKind,
    pub text: String,
    /// `[line, col]` of the first byte.
    pub start: [usize; 2],
    /// `[line, col]` just past the last byte.
    pub end: [usize; 2],
    pub byte_start: usize,
    pub byte_end: usize,
}

impl TokenInfo {
    pub fn new(token: &Token, source: &str) -> Self {
        TokenInfo {
            kind: token.kind,
            text: token.text(source).to_string(),
            start: [token.start_line, token.start_col],
            end: [token.end_line, token.end_col],
            byte_start: token.span.start,
            byte_end: token.span.end,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokensResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub file: String,
    pub tokens: Vec<TokenInfo>,
}

impl TokensResponse {
    pub fn new(file: impl Into<String>, tokens: Vec<TokenInfo>) -> Self {
        TokensResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            file: file.into(),
            tokens,
        }
    }
}

// ============================================================================
// parse
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ParseResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub file: String,
    pub mode: InputMode,
    pub ast: Mod,
    /// `# type:` comments by line, when captured.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub type_comments: BTreeMap<usize, String>,
}

impl ParseResponse {
    pub fn new(
        file: impl Into<String>,
        mode: InputMode,
        ast: Mod,
        type_comments: BTreeMap<usize, String>,
    ) -> Self {
        ParseResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            file: file.into(),
            mode,
            ast,
            type_comments,
        }
    }
}

// ============================================================================
// check
// ============================================================================

/// The first syntax error found in one file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileDiagnostic {
    pub kind: SyntaxErrorKind,
    pub message: String,
    pub location: Location,
}

impl FileDiagnostic {
    pub fn new(file: impl Into<String>, err: &SyntaxError) -> Self {
        FileDiagnostic {
            kind: err.kind,
            message: err.message.clone(),
            location: Location::of_syntax_error(file, err),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckResponse {
    /// Status: "ok" when every file parsed, "error" otherwise.
    pub status: String,
    pub schema_version: String,
    pub files_checked: usize,
    /// Sorted by file path.
    pub diagnostics: Vec<FileDiagnostic>,
}

impl CheckResponse {
    pub fn new(files_checked: usize, mut diagnostics: Vec<FileDiagnostic>) -> Self {
        diagnostics.sort_by(|a, b| {
            a.location
                .file
                .cmp(&b.location.file)
                .then(a.location.line.cmp(&b.location.line))
        });
        let status = if diagnostics.is_empty() { "ok" } else { "error" };
        CheckResponse {
            status: status.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            files_checked,
            diagnostics,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

/// Emit a response as compact JSON (single line) to a writer.
pub fn emit_response_compact<T: Serialize>(
    response: &T,
    writer: &mut impl Write,
) -> io::Result<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn syntax_error() -> PyfrontError {
        let err = pyfront_parser::parse_module("x = (1, 2\n", None).unwrap_err();
        PyfrontError::syntax("t.py", err)
    }

    #[test]
    fn location_omits_absent_byte_offsets() {
        let json = serde_json::to_string(&Location::new("a.py", 3, 0)).unwrap();
        assert_eq!(json, r#"{"file":"a.py","line":3,"col":0}"#);
    }

    #[test]
    fn status_is_the_first_field() {
        let response = TokensResponse::new("a.py", Vec::new());
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.starts_with(r#"{"status":"ok""#), "{json}");
    }

    #[test]
    fn syntax_error_response_carries_location_and_rendering() {
        let response = ErrorResponse::from_error(&syntax_error());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"]["code"], 5);
        assert_eq!(json["error"]["message"], "'(' was never closed");
        assert_eq!(json["error"]["location"]["line"], 1);
        assert_eq!(json["error"]["location"]["byte_start"], 4);
        assert_eq!(json["error"]["details"]["kind"], "tokenize");
        assert!(json["error"]["details"]["rendered"]
            .as_str()
            .is_some_and(|r| r.contains("t.py")));
    }

    #[test]
    fn internal_error_has_no_details() {
        let response = ErrorResponse::from_error(&PyfrontError::internal("boom"));
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("details"));
        assert!(!json.contains("location"));
    }

    #[test]
    fn token_info_positions() {
        let source = "x = 1\n";
        let tokens = pyfront_parser::tokenize(source).unwrap();
        let info = TokenInfo::new(&tokens[2], source);
        assert_eq!(info.kind, TokenKind::Number);
        assert_eq!(info.text, "1");
        assert_eq!(info.start, [1, 4]);
        assert_eq!(info.end, [1, 5]);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["kind"], "NUMBER");
    }

    #[test]
    fn check_response_sorts_and_reports_status() {
        let err = syntax_error();
        let PyfrontError::Syntax { error, .. } = &err else {
            panic!("expected a syntax error");
        };
        let response = CheckResponse::new(
            3,
            vec![
                FileDiagnostic::new("z.py", error),
                FileDiagnostic::new("a.py", error),
            ],
        );
        assert_eq!(response.status, "error");
        assert!(!response.is_clean());
        assert_eq!(response.diagnostics[0].location.file, "a.py");
        assert_eq!(CheckResponse::new(1, Vec::new()).status, "ok");
    }

    #[test]
    fn parse_response_serializes_the_tree() {
        let parsed = pyfront_parser::parse_module("pass\n", None).unwrap();
        let response = ParseResponse::new("p.py", InputMode::Module, parsed.root, BTreeMap::new());
        let mut out = Vec::new();
        emit_response_compact(&response, &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["mode"], "module");
        assert_eq!(json["ast"]["node"], "Module");
        assert!(json.get("type_comments").is_none());
    }
}
