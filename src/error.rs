//! Error types and error code constants for pyfront.
//!
//! `PyfrontError` is the single error type behind every CLI response. Parser,
//! file and configuration failures are bridged into it, and each variant maps
//! to a stable `OutputErrorCode` that doubles as the process exit code:
//!
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Resolution errors (file or configuration not found or unreadable)
//! - `5`: Syntax errors in the input source
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;
use std::io;
use std::path::Path;

use pyfront_parser::{ParserError, SyntaxError};
use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output and process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad flag value, unknown mode).
    InvalidArguments = 2,
    /// A file or configuration could not be found, read or decoded.
    ResolutionError = 3,
    /// The input source is not valid Python.
    SyntaxError = 5,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum PyfrontError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// File not found or unreadable.
    #[error("cannot read {path}: {message}")]
    FileNotFound { path: String, message: String },

    /// A configuration file that exists but cannot be used.
    #[error("config error in {path}: {message}")]
    Config { path: String, message: String },

    /// The source failed to tokenize or parse.
    ///
    /// `rendered` is the annotated excerpt produced by `prettify_error`.
    #[error("{file}:{}:{}: {}", .error.start_line, .error.start_col, .error.message)]
    Syntax {
        file: String,
        error: Box<SyntaxError>,
        rendered: String,
    },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&PyfrontError> for OutputErrorCode {
    fn from(err: &PyfrontError) -> Self {
        match err {
            PyfrontError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            PyfrontError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            PyfrontError::Config { .. } => OutputErrorCode::ResolutionError,
            PyfrontError::Syntax { .. } => OutputErrorCode::SyntaxError,
            PyfrontError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<PyfrontError> for OutputErrorCode {
    fn from(err: PyfrontError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridges
// ============================================================================

impl From<serde_json::Error> for PyfrontError {
    fn from(err: serde_json::Error) -> Self {
        PyfrontError::InternalError {
            message: format!("JSON error: {}", err),
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl PyfrontError {
    pub fn invalid_args(message: impl Into<String>) -> Self {
        PyfrontError::InvalidArguments {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PyfrontError::InternalError {
            message: message.into(),
        }
    }

    /// A read failure for `path`.
    pub fn io(path: &Path, err: &io::Error) -> Self {
        PyfrontError::FileNotFound {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    /// Convert a parser error for `file`, keeping both the structured error
    /// and its rendered excerpt.
    pub fn syntax(file: &str, err: ParserError<'_>) -> Self {
        let error = Box::new(err.syntax_error().clone());
        let rendered = pyfront_parser::prettify_error(err, file);
        PyfrontError::Syntax {
            file: file.to_string(),
            error,
            rendered,
        }
    }

    /// The output error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod error_code_mapping {
        use super::*;

        #[test]
        fn invalid_arguments_maps_to_2() {
            let err = PyfrontError::invalid_args("unknown mode");
            assert_eq!(
                OutputErrorCode::from(&err),
                OutputErrorCode::InvalidArguments
            );
            assert_eq!(err.error_code().code(), 2);
        }

        #[test]
        fn missing_file_maps_to_resolution_error() {
            let io_err = io::Error::new(io::ErrorKind::NotFound, "no such file");
            let err = PyfrontError::io(Path::new("missing.py"), &io_err);
            assert_eq!(err.error_code(), OutputErrorCode::ResolutionError);
            assert_eq!(err.error_code().code(), 3);
            assert!(err.to_string().contains("missing.py"));
        }

        #[test]
        fn config_maps_to_resolution_error() {
            let err = PyfrontError::Config {
                path: "pyfront.toml".to_string(),
                message: "bad version".to_string(),
            };
            assert_eq!(err.error_code().code(), 3);
        }

        #[test]
        fn syntax_maps_to_5() {
            let source = "def f(:\n";
            let parse_err = pyfront_parser::parse_module(source, None).unwrap_err();
            let err = PyfrontError::syntax("bad.py", parse_err);
            assert_eq!(err.error_code(), OutputErrorCode::SyntaxError);
            assert_eq!(err.error_code().code(), 5);
            let PyfrontError::Syntax { rendered, .. } = &err else {
                panic!("expected a syntax error");
            };
            assert!(rendered.contains("bad.py"));
            assert!(err.to_string().starts_with("bad.py:1:"));
        }

        #[test]
        fn internal_maps_to_10() {
            let err = PyfrontError::internal("unexpected state");
            assert_eq!(err.error_code().code(), 10);
            assert_eq!(err.to_string(), "internal error: unexpected state");
        }
    }

    #[test]
    fn display_is_the_code() {
        assert_eq!(OutputErrorCode::SyntaxError.to_string(), "5");
    }
}
