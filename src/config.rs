//! Configuration handling for pyfront.
//!
//! Settings come from `pyfront.toml` or `.pyfront/config.toml`, found by
//! searching upward from the working directory. Command-line flags override
//! file values.
//!
//! ```toml
//! [parse]
//! version = "3.12"
//! type_comments = true
//! invalid_rules = true
//! async_hacks = false
//!
//! [check]
//! exclude = [".venv", "build"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use pyfront_parser::{ParseOptions, PythonVersion};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PyfrontError;

/// File names searched for, in order, in each directory.
pub const CONFIG_FILES: &[&str] = &["pyfront.toml", ".pyfront/config.toml"];

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub parse: ParseConfig,
    #[serde(default)]
    pub check: CheckConfig,
}

/// Parser switches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseConfig {
    /// `permissive` or `MAJOR.MINOR`.
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "default_true")]
    pub type_comments: bool,

    /// Rerun failed parses with the diagnostic rules.
    #[serde(default = "default_true")]
    pub invalid_rules: bool,

    #[serde(default)]
    pub async_hacks: bool,
}

/// Settings for `pyfront check`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckConfig {
    /// Directory or file names skipped while walking.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// File extensions checked, without the dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_version() -> String {
    "permissive".to_string()
}

fn default_true() -> bool {
    true
}

fn default_exclude() -> Vec<String> {
    [".git", ".venv", "venv", "__pycache__", "node_modules"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_extensions() -> Vec<String> {
    vec!["py".to_string(), "pyi".to_string()]
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            type_comments: true,
            invalid_rules: true,
            async_hacks: false,
        }
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
            extensions: default_extensions(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, PyfrontError> {
        let content = fs::read_to_string(path).map_err(|e| PyfrontError::Config {
            path: path.display().to_string(),
            message: format!("failed to read config file: {}", e),
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| PyfrontError::Config {
            path: path.display().to_string(),
            message: format!("failed to parse config file: {}", e),
        })?;
        config.parse.python_version().map_err(|message| PyfrontError::Config {
            path: path.display().to_string(),
            message,
        })?;
        Ok(config)
    }

    /// Load the nearest configuration at or above `start`, or the defaults
    /// when there is none.
    pub fn discover(start: &Path) -> Result<(Self, Option<PathBuf>), PyfrontError> {
        match find_config_from(start) {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                Ok((Self::load(&path)?, Some(path)))
            }
            None => Ok((Config::default(), None)),
        }
    }

    /// True if a walked entry named `name` should be skipped.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.check.exclude.iter().any(|e| e == name)
    }

    /// True if `path` has one of the checked extensions.
    pub fn is_checked_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.check.extensions.iter().any(|e| e == ext))
    }
}

impl ParseConfig {
    pub fn python_version(&self) -> Result<PythonVersion, String> {
        self.version.parse()
    }

    /// Parse options for these settings. `version` is validated on load.
    pub fn to_parse_options(&self) -> Result<ParseOptions, PyfrontError> {
        let version = self
            .python_version()
            .map_err(PyfrontError::invalid_args)?;
        Ok(ParseOptions::new(version)
            .with_type_comments(self.type_comments)
            .with_invalid_rules(self.invalid_rules)
            .with_async_hacks(self.async_hacks))
    }
}

/// The nearest config file at or above `start`.
pub fn find_config_from(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        for name in CONFIG_FILES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        current = dir.parent();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_a_file() {
        let dir = TempDir::new().unwrap();
        let (config, path) = Config::discover(dir.path()).unwrap();
        // A config file in an ancestor of the temp dir would be picked up;
        // only check the defaults when none was found.
        if path.is_none() {
            assert_eq!(config, Config::default());
        }
        let options = Config::default().parse.to_parse_options().unwrap();
        assert_eq!(options.version, PythonVersion::Permissive);
        assert!(options.type_comments);
        assert!(options.call_invalid_rules);
        assert!(!options.async_hacks);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pyfront.toml");
        fs::write(&path, "[parse]\nversion = \"3.9\"\nasync_hacks = true\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.parse.version, "3.9");
        assert!(config.parse.async_hacks);
        assert!(config.parse.type_comments);
        assert_eq!(config.check, CheckConfig::default());

        let options = config.parse.to_parse_options().unwrap();
        assert_eq!(options.version, PythonVersion::V { major: 3, minor: 9 });
    }

    #[test]
    fn found_from_a_nested_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".pyfront")).unwrap();
        fs::write(
            dir.path().join(".pyfront/config.toml"),
            "[check]\nexclude = [\"generated\"]\n",
        )
        .unwrap();
        let nested = dir.path().join("src/pkg");
        fs::create_dir_all(&nested).unwrap();

        let (config, path) = Config::discover(&nested).unwrap();
        assert_eq!(path, Some(dir.path().join(".pyfront/config.toml")));
        assert!(config.is_excluded("generated"));
        assert!(!config.is_excluded(".git"));
    }

    #[test]
    fn pyfront_toml_wins_over_dot_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".pyfront")).unwrap();
        fs::write(dir.path().join(".pyfront/config.toml"), "").unwrap();
        fs::write(dir.path().join("pyfront.toml"), "").unwrap();
        assert_eq!(
            find_config_from(dir.path()),
            Some(dir.path().join("pyfront.toml"))
        );
    }

    #[test]
    fn bad_version_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pyfront.toml");
        fs::write(&path, "[parse]\nversion = \"three\"\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, PyfrontError::Config { .. }));
        assert_eq!(err.error_code().code(), 3);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pyfront.toml");
        fs::write(&path, "[parse\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }

    #[test]
    fn checked_extensions() {
        let config = Config::default();
        assert!(config.is_checked_file(Path::new("a/b.py")));
        assert!(config.is_checked_file(Path::new("stub.pyi")));
        assert!(!config.is_checked_file(Path::new("README.md")));
        assert!(!config.is_checked_file(Path::new("Makefile")));
    }
}
