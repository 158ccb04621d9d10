// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Parse options: input mode, target language version and feature switches.
//!
//! [`ParseOptions::default()`] parses a module permissively, captures type
//! comments and runs the diagnostic second pass on failure. The target
//! [`PythonVersion`] gates the syntax that depends on it (currently the
//! `match` statement); everything else is accepted in every version.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::tokenizer::TokConfig;

/// Target Python language version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum PythonVersion {
    /// Accept all syntax the grammar handles.
    #[default]
    Permissive,

    /// A specific target language version (e.g., 3.10).
    V { major: u8, minor: u8 },
}

impl PythonVersion {
    pub const V3_8: Self = Self::V { major: 3, minor: 8 };
    pub const V3_9: Self = Self::V { major: 3, minor: 9 };
    pub const V3_10: Self = Self::V {
        major: 3,
        minor: 10,
    };
    pub const V3_11: Self = Self::V {
        major: 3,
        minor: 11,
    };
    pub const V3_12: Self = Self::V {
        major: 3,
        minor: 12,
    };

    /// Returns whether match statements (and their soft keywords) are
    /// recognized. They were introduced in Python 3.10.
    #[must_use]
    pub fn has_match_statements(self) -> bool {
        match self {
            Self::Permissive => true,
            Self::V { major: 3, minor } => minor >= 10,
            Self::V { major, .. } => major > 3,
        }
    }

    #[must_use]
    pub fn is_permissive(self) -> bool {
        matches!(self, Self::Permissive)
    }

    /// Returns the major and minor version numbers, if this is a specific version.
    #[must_use]
    pub fn version_tuple(self) -> Option<(u8, u8)> {
        match self {
            Self::Permissive => None,
            Self::V { major, minor } => Some((major, minor)),
        }
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permissive => write!(f, "permissive"),
            Self::V { major, minor } => write!(f, "{}.{}", major, minor),
        }
    }
}

impl FromStr for PythonVersion {
    type Err = String;

    /// Accepts `permissive` or `MAJOR.MINOR`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("permissive") {
            return Ok(Self::Permissive);
        }
        let (major, minor) = s
            .split_once('.')
            .ok_or_else(|| format!("invalid Python version '{}': expected MAJOR.MINOR", s))?;
        let major = major
            .parse::<u8>()
            .map_err(|_| format!("invalid major version in '{}'", s))?;
        let minor = minor
            .parse::<u8>()
            .map_err(|_| format!("invalid minor version in '{}'", s))?;
        Ok(Self::V { major, minor })
    }
}

/// Which start rule to parse with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// A whole file of statements (`Mod::Module`).
    #[default]
    Module,
    /// A single expression (`Mod::Expression`).
    Expression,
    /// One interactive statement (`Mod::Interactive`).
    Interactive,
    /// The expression inside an f-string replacement field.
    FString,
}

impl FromStr for InputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "module" | "exec" | "file" => Ok(Self::Module),
            "expression" | "eval" => Ok(Self::Expression),
            "interactive" | "single" => Ok(Self::Interactive),
            "fstring" => Ok(Self::FString),
            other => Err(format!("unknown input mode '{}'", other)),
        }
    }
}

/// Configuration for a single parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub mode: InputMode,
    /// Used only in diagnostics.
    pub filename: String,
    /// Rerun a failed parse with the diagnostic rules switched on to produce
    /// a more precise message.
    pub call_invalid_rules: bool,
    /// Capture `# type:` comments into the side channel.
    pub type_comments: bool,
    /// Treat `async`/`await` as identifiers outside `async def`.
    pub async_hacks: bool,
    pub version: PythonVersion,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            mode: InputMode::Module,
            filename: "<unknown>".to_string(),
            call_invalid_rules: true,
            type_comments: true,
            async_hacks: false,
            version: PythonVersion::Permissive,
        }
    }
}

impl ParseOptions {
    /// Creates parse options targeting a specific Python version.
    #[must_use]
    pub fn new(version: PythonVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: InputMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    #[must_use]
    pub fn with_invalid_rules(mut self, enabled: bool) -> Self {
        self.call_invalid_rules = enabled;
        self
    }

    #[must_use]
    pub fn with_type_comments(mut self, enabled: bool) -> Self {
        self.type_comments = enabled;
        self
    }

    #[must_use]
    pub fn with_async_hacks(mut self, enabled: bool) -> Self {
        self.async_hacks = enabled;
        self
    }

    pub(crate) fn tok_config(&self) -> TokConfig {
        TokConfig {
            async_hacks: self.async_hacks,
            type_comments: self.type_comments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_feature_queries() {
        assert!(PythonVersion::Permissive.has_match_statements());
        assert!(!PythonVersion::V3_9.has_match_statements());
        assert!(PythonVersion::V3_10.has_match_statements());
        assert_eq!(PythonVersion::V3_12.version_tuple(), Some((3, 12)));
        assert_eq!(PythonVersion::Permissive.version_tuple(), None);
    }

    #[test]
    fn test_version_display_and_parse() {
        assert_eq!(PythonVersion::V3_10.to_string(), "3.10");
        assert_eq!("3.10".parse::<PythonVersion>(), Ok(PythonVersion::V3_10));
        assert_eq!(
            "Permissive".parse::<PythonVersion>(),
            Ok(PythonVersion::Permissive)
        );
        assert!("three".parse::<PythonVersion>().is_err());
        assert!("3.x".parse::<PythonVersion>().is_err());
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("eval".parse::<InputMode>(), Ok(InputMode::Expression));
        assert_eq!("single".parse::<InputMode>(), Ok(InputMode::Interactive));
        assert!("bogus".parse::<InputMode>().is_err());
    }

    #[test]
    fn test_parse_options_default() {
        let options = ParseOptions::default();
        assert_eq!(options.mode, InputMode::Module);
        assert!(options.call_invalid_rules);
        assert!(options.type_comments);
        assert!(!options.async_hacks);
        assert_eq!(options.version, PythonVersion::Permissive);
    }

    #[test]
    fn test_parse_options_builder() {
        let options = ParseOptions::new(PythonVersion::V3_9)
            .with_mode(InputMode::Expression)
            .with_filename("x.py")
            .with_invalid_rules(false);
        assert_eq!(options.version, PythonVersion::V3_9);
        assert_eq!(options.mode, InputMode::Expression);
        assert_eq!(options.filename, "x.py");
        assert!(!options.call_invalid_rules);
    }
}
